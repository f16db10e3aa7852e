//! `printdesk init` command - project initialization

use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::Project;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let dir = match args.path {
        Some(path) => path,
        None => std::env::current_dir().into_diagnostic()?,
    };

    let project = Project::init(&dir).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Initialized printdesk project in {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!("   filaments/  filament spools you can print with");
    println!("   products/   reusable product templates");
    println!("   orders/     the order book");
    println!();
    println!(
        "Add your first filament with: {}",
        style("printdesk fil new --title \"Galaxy Black\" --brand Prusament --price-per-kilo 29.99").yellow()
    );

    Ok(())
}
