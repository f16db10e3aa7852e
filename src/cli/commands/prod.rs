//! `printdesk prod` command - product template management

use std::collections::BTreeMap;

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{format_short_id, grams, money, truncate_str};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::identity::EntityPrefix;
use crate::core::project::Project;
use crate::core::store::{self, UserIndex};
use crate::entities::product::{Prices, Product};

#[derive(Subcommand, Debug)]
pub enum ProdCommands {
    /// List products
    List(ListArgs),

    /// Create a new product template
    New(NewArgs),

    /// Show a product's details
    Show(ShowArgs),

    /// Edit a product in your editor
    Edit(EditArgs),

    /// Hide a product (soft delete)
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Include hidden products
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Product title
    #[arg(long)]
    pub title: String,

    /// Part requirement as LABEL:GRAMS (repeatable)
    #[arg(long = "part")]
    pub parts: Vec<String>,

    /// Single per-unit price
    #[arg(long, conflicts_with = "price_for")]
    pub price: Option<f64>,

    /// Per-size price as SIZE=AMOUNT (repeatable)
    #[arg(long = "price-for")]
    pub price_for: Vec<String>,

    /// Estimated print time in hours for one unit
    #[arg(long, default_value_t = 0.0)]
    pub print_time: f64,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Product id or title fragment
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Product id or title fragment
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Product id or title fragment
    pub id: String,
}

pub fn run(cmd: ProdCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProdCommands::List(args) => run_list(args, global),
        ProdCommands::New(args) => run_new(args, global),
        ProdCommands::Show(args) => run_show(args, global),
        ProdCommands::Edit(args) => run_edit(args),
        ProdCommands::Rm(args) => run_rm(args),
    }
}

/// Parse a LABEL:GRAMS part spec
fn parse_part_spec(spec: &str) -> Result<(String, f64)> {
    let (label, grams) = spec
        .split_once(':')
        .ok_or_else(|| miette::miette!("invalid part spec '{}': expected LABEL:GRAMS", spec))?;
    let grams: f64 = grams
        .trim()
        .parse()
        .map_err(|_| miette::miette!("invalid grams in part spec '{}'", spec))?;
    if grams < 0.0 {
        return Err(miette::miette!("grams must be non-negative in '{}'", spec));
    }
    Ok((label.trim().to_string(), grams))
}

/// Parse a SIZE=AMOUNT price spec
fn parse_price_spec(spec: &str) -> Result<(String, f64)> {
    let (size, amount) = spec
        .split_once('=')
        .ok_or_else(|| miette::miette!("invalid price spec '{}': expected SIZE=AMOUNT", spec))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| miette::miette!("invalid amount in price spec '{}'", spec))?;
    Ok((size.trim().to_string(), amount))
}

fn describe_prices(prices: &Prices) -> String {
    match prices {
        Prices::Single(price) => money(*price),
        Prices::BySize(map) if map.is_empty() => "-".to_string(),
        Prices::BySize(map) => format!("{} size(s)", map.len()),
    }
}

#[derive(Tabled)]
struct ProdRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "PARTS")]
    parts: usize,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "PRINT H")]
    print_time: String,
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let products: Vec<Product> = store::list::<Product>(&project)
        .into_iter()
        .filter(|p| args.all || !p.hidden)
        .collect();

    if products.is_empty() {
        println!("No products found.");
        println!();
        println!("Create one with: {}", style("printdesk prod new").yellow());
        return Ok(());
    }

    match effective_format(global.format, true) {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&products).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&products).into_diagnostic()?
            );
        }
        OutputFormat::Id => {
            for p in &products {
                println!("{}", p.id);
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["id", "title", "parts", "price", "print_time_hours"])
                .into_diagnostic()?;
            for p in &products {
                wtr.write_record([
                    p.id.to_string(),
                    p.title.clone(),
                    p.parts.len().to_string(),
                    describe_prices(&p.prices),
                    format!("{:.1}", p.print_time_hours),
                ])
                .into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        _ => {
            let rows: Vec<ProdRow> = products
                .iter()
                .map(|p| ProdRow {
                    id: format_short_id(&p.id),
                    title: truncate_str(&p.title, 30),
                    parts: p.parts.len(),
                    price: describe_prices(&p.prices),
                    print_time: format!("{:.1}", p.print_time_hours),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{}", table);
            println!();
            println!("{} product(s) found", style(products.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load();
    let author = config.author();

    let mut product = Product::new(args.title, args.print_time, Some(author.clone()));

    for spec in &args.parts {
        let (label, grams) = parse_part_spec(spec)?;
        product.add_part(label, grams);
    }

    if let Some(price) = args.price {
        product.prices = Prices::Single(price);
    } else if !args.price_for.is_empty() {
        let mut map = BTreeMap::new();
        for spec in &args.price_for {
            let (size, amount) = parse_price_spec(spec)?;
            map.insert(size, amount);
        }
        product.prices = Prices::BySize(map);
    }

    let path = store::save(&project, &product).map_err(|e| miette::miette!("{}", e))?;

    let mut index = UserIndex::load(&project).map_err(|e| miette::miette!("{}", e))?;
    index.append(&author, EntityPrefix::Prod, &product.id.to_string());
    index.save(&project).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Id => println!("{}", product.id),
        _ => {
            println!(
                "{} Created product {}",
                style("✓").green(),
                style(format_short_id(&product.id)).cyan()
            );
            println!("   {}", style(path.display()).dim());
            println!("   {}", style(&product.title).yellow());
        }
    }

    if args.edit {
        config.run_editor(&path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (product, _path) =
        store::load::<Product>(&project, &args.id).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&product).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&product).into_diagnostic()?
            );
            return Ok(());
        }
        OutputFormat::Id => {
            println!("{}", product.id);
            return Ok(());
        }
        _ => {}
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&product.id).cyan());
    println!(
        "{}: {}",
        style("Title").bold(),
        style(&product.title).yellow()
    );
    println!(
        "{}: {:.1} h",
        style("Print time").bold(),
        product.print_time_hours
    );
    if product.hidden {
        println!("{}: yes", style("Hidden").bold());
    }

    if !product.parts.is_empty() {
        println!("{}:", style("Parts").bold());
        for part in &product.parts {
            println!("  - {} ({})", part.label, grams(part.grams));
        }
    }

    match &product.prices {
        Prices::Single(price) => {
            println!("{}: {}", style("Price").bold(), money(*price));
        }
        Prices::BySize(map) if !map.is_empty() => {
            println!("{}:", style("Prices").bold());
            for (size, amount) in map {
                println!("  - {}: {}", size, money(*amount));
            }
        }
        Prices::BySize(_) => {
            println!("{}: none declared", style("Price").bold());
        }
    }
    println!("{}", style("─".repeat(60)).dim());

    Ok(())
}

fn run_edit(args: EditArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load();

    let (product, path) =
        store::load::<Product>(&project, &args.id).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "Opening {} in {}...",
        style(format_short_id(&product.id)).cyan(),
        style(config.editor()).yellow()
    );
    config.run_editor(&path).into_diagnostic()?;

    Ok(())
}

fn run_rm(args: RmArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (product, _path) =
        store::hide::<Product>(&project, &args.id).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Hidden product {} (the file stays on disk)",
        style("✓").green(),
        style(&product.title).yellow()
    );
    Ok(())
}
