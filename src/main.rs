use clap::Parser;
use miette::Result;
use printdesk::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => printdesk::cli::commands::init::run(args),
        Commands::Fil(cmd) => printdesk::cli::commands::fil::run(cmd, &global),
        Commands::Prod(cmd) => printdesk::cli::commands::prod::run(cmd, &global),
        Commands::Order(cmd) => printdesk::cli::commands::order::run(cmd, &global),
        Commands::Completions(args) => printdesk::cli::commands::completions::run(args),
    }
}
