//! `printdesk fil` command - filament inventory management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{format_short_id, money, truncate_str};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::identity::EntityPrefix;
use crate::core::project::Project;
use crate::core::store::{self, UserIndex};
use crate::entities::filament::{Filament, FilamentType};

#[derive(Subcommand, Debug)]
pub enum FilCommands {
    /// List filaments
    List(ListArgs),

    /// Add a filament to the inventory
    New(NewArgs),

    /// Show a filament's details
    Show(ShowArgs),

    /// Edit a filament in your editor
    Edit(EditArgs),

    /// Set the number of spools on the shelf
    Spools(SpoolsArgs),

    /// Record filament usage in kilograms
    Use(UseArgs),

    /// Hide a filament (soft delete)
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Include hidden filaments
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Filament title
    #[arg(long)]
    pub title: String,

    /// Manufacturer
    #[arg(long)]
    pub brand: String,

    /// Cost per kilogram
    #[arg(long)]
    pub price_per_kilo: f64,

    /// Hex colors, or "rainbow" (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub colors: Vec<String>,

    /// Filament types: normal, multicolor, silk, matte, speed (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<String>,

    /// Product page or reorder link
    #[arg(long)]
    pub url: Option<String>,

    /// Spools currently on the shelf
    #[arg(long, default_value_t = 0)]
    pub spools: u32,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Filament id or title fragment
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Filament id or title fragment
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SpoolsArgs {
    /// Filament id or title fragment
    pub id: String,

    /// New spool count
    pub count: u32,
}

#[derive(clap::Args, Debug)]
pub struct UseArgs {
    /// Filament id or title fragment
    pub id: String,

    /// Kilograms to add to the cumulative usage
    pub kg: f64,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Filament id or title fragment
    pub id: String,
}

pub fn run(cmd: FilCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FilCommands::List(args) => run_list(args, global),
        FilCommands::New(args) => run_new(args, global),
        FilCommands::Show(args) => run_show(args, global),
        FilCommands::Edit(args) => run_edit(args),
        FilCommands::Spools(args) => run_spools(args),
        FilCommands::Use(args) => run_use(args),
        FilCommands::Rm(args) => run_rm(args),
    }
}

#[derive(Tabled)]
struct FilRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "BRAND")]
    brand: String,
    #[tabled(rename = "$/KG")]
    price: String,
    #[tabled(rename = "SPOOLS")]
    spools: u32,
    #[tabled(rename = "USED KG")]
    used: String,
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let filaments: Vec<Filament> = store::list::<Filament>(&project)
        .into_iter()
        .filter(|f| args.all || !f.hidden)
        .collect();

    if filaments.is_empty() {
        println!("No filaments found.");
        println!();
        println!("Add one with: {}", style("printdesk fil new").yellow());
        return Ok(());
    }

    match effective_format(global.format, true) {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&filaments).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&filaments).into_diagnostic()?
            );
        }
        OutputFormat::Id => {
            for f in &filaments {
                println!("{}", f.id);
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["id", "title", "brand", "price_per_kilo", "spools", "used_kg"])
                .into_diagnostic()?;
            for f in &filaments {
                wtr.write_record([
                    f.id.to_string(),
                    f.title.clone(),
                    f.brand.clone(),
                    format!("{:.2}", f.price_per_kilo),
                    f.num_spools_owned.to_string(),
                    format!("{:.2}", f.total_used_kg),
                ])
                .into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        _ => {
            let rows: Vec<FilRow> = filaments
                .iter()
                .map(|f| FilRow {
                    id: format_short_id(&f.id),
                    title: truncate_str(&f.title, 30),
                    brand: truncate_str(&f.brand, 20),
                    price: money(f.price_per_kilo),
                    spools: f.num_spools_owned,
                    used: format!("{:.2}", f.total_used_kg),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{}", table);
            println!();
            println!("{} filament(s) found", style(filaments.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load();

    let mut types = Vec::new();
    for raw in &args.types {
        let parsed: FilamentType = raw.parse().map_err(|e: String| miette::miette!("{}", e))?;
        types.push(parsed);
    }

    let author = config.author();
    let mut filament = Filament::new(
        args.title,
        args.brand,
        args.price_per_kilo,
        Some(author.clone()),
    );
    filament.colors = args.colors;
    filament.types = types;
    filament.url = args.url;
    filament.num_spools_owned = args.spools;

    let path = store::save(&project, &filament).map_err(|e| miette::miette!("{}", e))?;

    let mut index = UserIndex::load(&project).map_err(|e| miette::miette!("{}", e))?;
    index.append(&author, EntityPrefix::Fil, &filament.id.to_string());
    index.save(&project).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Id => println!("{}", filament.id),
        _ => {
            println!(
                "{} Created filament {}",
                style("✓").green(),
                style(format_short_id(&filament.id)).cyan()
            );
            println!("   {}", style(path.display()).dim());
            println!("   {}", style(&filament.title).yellow());
        }
    }

    if args.edit {
        config.run_editor(&path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (filament, _path) =
        store::load::<Filament>(&project, &args.id).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&filament).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&filament).into_diagnostic()?
            );
            return Ok(());
        }
        OutputFormat::Id => {
            println!("{}", filament.id);
            return Ok(());
        }
        _ => {}
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&filament.id).cyan());
    println!(
        "{}: {}",
        style("Title").bold(),
        style(&filament.title).yellow()
    );
    println!("{}: {}", style("Brand").bold(), filament.brand);
    println!(
        "{}: {}",
        style("Price").bold(),
        format!("{}/kg", money(filament.price_per_kilo))
    );
    if !filament.colors.is_empty() {
        println!("{}: {}", style("Colors").bold(), filament.colors.join(", "));
    }
    if !filament.types.is_empty() {
        let types: Vec<String> = filament.types.iter().map(|t| t.to_string()).collect();
        println!("{}: {}", style("Types").bold(), types.join(", "));
    }
    if let Some(ref url) = filament.url {
        println!("{}: {}", style("URL").bold(), url);
    }
    println!("{}: {}", style("Spools").bold(), filament.num_spools_owned);
    println!(
        "{}: {:.2} kg",
        style("Used").bold(),
        filament.total_used_kg
    );
    if filament.hidden {
        println!("{}: yes", style("Hidden").bold());
    }
    println!("{}", style("─".repeat(60)).dim());

    Ok(())
}

fn run_edit(args: EditArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load();

    let (filament, path) =
        store::load::<Filament>(&project, &args.id).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "Opening {} in {}...",
        style(format_short_id(&filament.id)).cyan(),
        style(config.editor()).yellow()
    );
    config.run_editor(&path).into_diagnostic()?;

    Ok(())
}

fn run_spools(args: SpoolsArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (mut filament, path) =
        store::load::<Filament>(&project, &args.id).map_err(|e| miette::miette!("{}", e))?;

    filament.num_spools_owned = args.count;
    crate::yaml::write_yaml_file(&path, &filament).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} {} now has {} spool(s)",
        style("✓").green(),
        style(&filament.title).yellow(),
        style(args.count).cyan()
    );
    Ok(())
}

fn run_use(args: UseArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (mut filament, path) =
        store::load::<Filament>(&project, &args.id).map_err(|e| miette::miette!("{}", e))?;

    filament.total_used_kg += args.kg;
    crate::yaml::write_yaml_file(&path, &filament).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Recorded {:.2} kg against {} ({:.2} kg total)",
        style("✓").green(),
        args.kg,
        style(&filament.title).yellow(),
        filament.total_used_kg
    );
    Ok(())
}

fn run_rm(args: RmArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (filament, _path) =
        store::hide::<Filament>(&project, &args.id).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Hidden filament {} (the file stays on disk)",
        style("✓").green(),
        style(&filament.title).yellow()
    );
    Ok(())
}
