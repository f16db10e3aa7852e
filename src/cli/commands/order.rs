//! `printdesk order` command - the order book
//!
//! Every engine operation is surfaced 1:1 as a subcommand. Mutating
//! commands load the order and the filament catalog, run the engine, and
//! write the record back; the engine itself never touches the store.

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Select};
use miette::{IntoDiagnostic, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{format_short_id, grams, money, opt_money, truncate_str};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::identity::EntityPrefix;
use crate::core::project::Project;
use crate::core::store::{self, UserIndex};
use crate::engine::stats::{realized, visible, OrderBookStats};
use crate::engine::{composer, fulfillment};
use crate::entities::filament::{Filament, FilamentCatalog};
use crate::entities::order::{FulfillmentStatus, Order, UNASSIGNED_KEY};
use crate::entities::product::Product;

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// List orders
    List(ListArgs),

    /// Create a new order
    New(NewArgs),

    /// Show an order in full
    Show(ShowArgs),

    /// Append a product piece to an order
    AddPiece(AddPieceArgs),

    /// Duplicate a piece, selections included
    DupPiece(PieceArgs),

    /// Remove a piece
    RmPiece(PieceArgs),

    /// Change a piece's quantity
    Qty(QtyArgs),

    /// Set or clear a piece's unit price
    Price(PriceArgs),

    /// Assign or clear the filament for one part
    Material(MaterialArgs),

    /// Record how many copies of a piece are printed
    Progress(ProgressArgs),

    /// Mark every piece fully printed
    Printed(IdArg),

    /// Mark the order done
    Done(IdArg),

    /// Restore a done order back to printed
    Restore(IdArg),

    /// Hide an order (soft delete)
    Rm(IdArg),

    /// Order book statistics
    Stats(StatsArgs),
}

/// List sort keys
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    Due,
    Title,
    Status,
    Revenue,
    Profit,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Include done orders
    #[arg(long)]
    pub done: bool,

    /// Sort by field
    #[arg(long, value_enum, default_value = "due")]
    pub sort: SortKey,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Order title
    #[arg(long)]
    pub title: String,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Order id or title fragment
    pub order: String,
}

#[derive(clap::Args, Debug)]
pub struct AddPieceArgs {
    /// Order id or title fragment
    pub order: String,

    /// Product id or title fragment
    #[arg(long, short = 'p')]
    pub product: String,

    /// Copies of the product
    #[arg(long, short = 'q', default_value_t = 1)]
    pub qty: u32,

    /// Size name for a size-priced product
    #[arg(long)]
    pub size: Option<String>,

    /// Override the unit price
    #[arg(long)]
    pub price: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct PieceArgs {
    /// Order id or title fragment
    pub order: String,

    /// Piece position (0-based)
    #[arg(long)]
    pub piece: usize,
}

#[derive(clap::Args, Debug)]
pub struct QtyArgs {
    /// Order id or title fragment
    pub order: String,

    /// Piece position (0-based)
    #[arg(long)]
    pub piece: usize,

    /// New quantity (at least 1)
    #[arg(long)]
    pub qty: u32,
}

#[derive(clap::Args, Debug)]
pub struct PriceArgs {
    /// Order id or title fragment
    pub order: String,

    /// Piece position (0-based)
    #[arg(long)]
    pub piece: usize,

    /// New per-unit price
    #[arg(long, conflicts_with = "clear")]
    pub price: Option<f64>,

    /// Clear the price
    #[arg(long)]
    pub clear: bool,
}

#[derive(clap::Args, Debug)]
pub struct MaterialArgs {
    /// Order id or title fragment
    pub order: String,

    /// Piece position (0-based)
    #[arg(long)]
    pub piece: usize,

    /// Part position within the piece (0-based)
    #[arg(long)]
    pub part: usize,

    /// Filament id or title fragment
    #[arg(long, conflicts_with = "clear")]
    pub filament: Option<String>,

    /// Clear the selection
    #[arg(long)]
    pub clear: bool,

    /// Pick the filament interactively
    #[arg(long, short = 'i', conflicts_with_all = ["filament", "clear"])]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ProgressArgs {
    /// Order id or title fragment
    pub order: String,

    /// Piece position (0-based)
    #[arg(long)]
    pub piece: usize,

    /// Copies printed (clamped to the piece quantity)
    #[arg(long)]
    pub count: u32,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    /// Order id or title fragment
    pub order: String,
}

#[derive(clap::Args, Debug)]
pub struct StatsArgs {}

pub fn run(cmd: OrderCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OrderCommands::List(args) => run_list(args, global),
        OrderCommands::New(args) => run_new(args, global),
        OrderCommands::Show(args) => run_show(args, global),
        OrderCommands::AddPiece(args) => run_add_piece(args),
        OrderCommands::DupPiece(args) => run_dup_piece(args),
        OrderCommands::RmPiece(args) => run_rm_piece(args),
        OrderCommands::Qty(args) => run_qty(args),
        OrderCommands::Price(args) => run_price(args),
        OrderCommands::Material(args) => run_material(args),
        OrderCommands::Progress(args) => run_progress(args),
        OrderCommands::Printed(args) => run_printed(args),
        OrderCommands::Done(args) => run_done(args),
        OrderCommands::Restore(args) => run_restore(args),
        OrderCommands::Rm(args) => run_rm(args),
        OrderCommands::Stats(args) => run_stats(args),
    }
}

/// Load the filament catalog the engine prices against
fn load_catalog(project: &Project) -> FilamentCatalog {
    FilamentCatalog::new(store::list::<Filament>(project))
}

fn load_order(project: &Project, query: &str) -> Result<(Order, std::path::PathBuf)> {
    store::load::<Order>(project, query).map_err(|e| miette::miette!("{}", e))
}

fn save_order(path: &std::path::Path, order: &Order) -> Result<()> {
    crate::yaml::write_yaml_file(path, order).map_err(|e| miette::miette!("{}", e))
}

// =========================================================================
// list / new / show
// =========================================================================

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "DUE")]
    due: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "REVENUE")]
    revenue: String,
    #[tabled(rename = "PROFIT")]
    profit: String,
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let mut orders: Vec<Order> = store::list::<Order>(&project)
        .into_iter()
        .filter(|o| !o.hidden)
        .filter(|o| args.done || o.status != FulfillmentStatus::Done)
        .collect();

    // Missing due dates sort first, like an always-overdue reminder
    orders.sort_by(|a, b| match args.sort {
        SortKey::Due => a
            .due_date
            .unwrap_or(NaiveDate::MIN)
            .cmp(&b.due_date.unwrap_or(NaiveDate::MIN)),
        SortKey::Title => a.title.cmp(&b.title),
        SortKey::Status => a.status.cmp(&b.status),
        SortKey::Revenue => a.revenue.total_cmp(&b.revenue),
        SortKey::Profit => a.profit.total_cmp(&b.profit),
    });
    if args.reverse {
        orders.reverse();
    }

    if orders.is_empty() {
        println!("No orders found.");
        println!();
        println!("Create one with: {}", style("printdesk order new").yellow());
        return Ok(());
    }

    match effective_format(global.format, true) {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&orders).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&orders).into_diagnostic()?
            );
        }
        OutputFormat::Id => {
            for o in &orders {
                println!("{}", o.id);
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["id", "title", "due", "status", "revenue", "expenses", "profit"])
                .into_diagnostic()?;
            for o in &orders {
                wtr.write_record([
                    o.id.to_string(),
                    o.title.clone(),
                    o.due_date.map(|d| d.to_string()).unwrap_or_default(),
                    o.status.to_string(),
                    format!("{:.2}", o.revenue),
                    o.expenses.map(|e| format!("{:.2}", e)).unwrap_or_default(),
                    format!("{:.2}", o.profit),
                ])
                .into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        _ => {
            let rows: Vec<OrderRow> = orders
                .iter()
                .map(|o| OrderRow {
                    id: format_short_id(&o.id),
                    title: truncate_str(&o.title, 30),
                    due: o.due_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                    status: o.status.to_string(),
                    revenue: money(o.revenue),
                    profit: money(o.profit),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{}", table);
            println!();
            println!("{} order(s) found", style(orders.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load();
    let author = config.author();

    if args.title.trim().is_empty() {
        return Err(miette::miette!("order title must not be empty"));
    }

    let mut order = Order::new(args.title.trim(), Some(author.clone()));
    if let Some(ref due) = args.due {
        let due = NaiveDate::parse_from_str(due, "%Y-%m-%d")
            .map_err(|_| miette::miette!("invalid due date '{}', expected YYYY-MM-DD", due))?;
        order.due_date = Some(due);
    }

    let path = store::save(&project, &order).map_err(|e| miette::miette!("{}", e))?;

    let mut index = UserIndex::load(&project).map_err(|e| miette::miette!("{}", e))?;
    index.append(&author, EntityPrefix::Ord, &order.id.to_string());
    index.save(&project).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Id => println!("{}", order.id),
        _ => {
            println!(
                "{} Created order {}",
                style("✓").green(),
                style(format_short_id(&order.id)).cyan()
            );
            println!("   {}", style(path.display()).dim());
            println!("   {}", style(&order.title).yellow());
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (order, _path) = load_order(&project, &args.order)?;

    match global.format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&order).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&order).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            println!("{}", order.id);
            return Ok(());
        }
        _ => {}
    }

    let catalog = load_catalog(&project);

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&order.id).cyan());
    println!("{}: {}", style("Title").bold(), style(&order.title).yellow());
    println!("{}: {}", style("Status").bold(), order.status);
    if let Some(due) = order.due_date {
        println!("{}: {}", style("Due").bold(), due);
    }
    if let Some(ref owner) = order.owner {
        println!("{}: {}", style("Owner").bold(), owner);
    }
    if order.hidden {
        println!("{}: yes", style("Hidden").bold());
    }

    if !order.pieces.is_empty() {
        println!("{}:", style("Pieces").bold());
        for (index, piece) in order.pieces.iter().enumerate() {
            let price = piece
                .unit_price
                .map(|p| format!(" @ {}", money(p)))
                .unwrap_or_default();
            println!(
                "  [{}] {} x{}{}  printed {}/{}",
                index,
                style(&piece.product_title).yellow(),
                piece.quantity,
                price,
                order.printed_count(index),
                piece.quantity
            );
            for part in &piece.parts {
                let filament = match part.filament_id.as_deref() {
                    Some(id) => catalog.title_of(id).to_string(),
                    None => "(unassigned)".to_string(),
                };
                println!("      - {} {}  <- {}", part.label, grams(part.required_grams), filament);
            }
        }
    }

    if !order.totals_by_filament.is_empty() {
        println!("{}:", style("Totals by filament").bold());
        for (key, total) in &order.totals_by_filament {
            let name = if key == UNASSIGNED_KEY {
                "Unassigned".to_string()
            } else {
                catalog.title_of(key).to_string()
            };
            println!(
                "  {}: {} - {}",
                name,
                grams(total.total_grams),
                money(total.total_cost)
            );
        }
    }

    println!(
        "Revenue {} - Expenses {} = Profit {}",
        money(order.revenue),
        opt_money(order.expenses),
        money(order.profit)
    );
    println!("{}", style("─".repeat(60)).dim());

    Ok(())
}

// =========================================================================
// composer operations
// =========================================================================

fn run_add_piece(args: AddPieceArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let catalog = load_catalog(&project);
    let (mut order, path) = load_order(&project, &args.order)?;
    let (product, _prod_path) =
        store::load::<Product>(&project, &args.product).map_err(|e| miette::miette!("{}", e))?;

    let index = composer::add_piece(&mut order, &product, args.qty, &catalog)
        .map_err(|e| miette::miette!("{}", e))?;

    // Variant resolution stays outside the engine: a size-priced product
    // gets its price resolved here, against the catalog entry
    if let Some(price) = args.price {
        composer::set_piece_price(&mut order, index, Some(price), &catalog)
            .map_err(|e| miette::miette!("{}", e))?;
    } else if product.prices.single().is_none() {
        if let Some(ref size) = args.size {
            let price = product.prices.resolve(Some(size)).ok_or_else(|| {
                miette::miette!(
                    "product '{}' has no size '{}' (available: {})",
                    product.title,
                    size,
                    product.prices.sizes().join(", ")
                )
            })?;
            composer::set_piece_price(&mut order, index, Some(price), &catalog)
                .map_err(|e| miette::miette!("{}", e))?;
        } else if !product.prices.sizes().is_empty() {
            println!(
                "{} '{}' is priced by size; the piece is unpriced until you pass --size or set a price",
                style("!").yellow(),
                product.title
            );
        }
    }

    save_order(&path, &order)?;

    println!(
        "{} Added piece [{}] {} x{} to {}",
        style("✓").green(),
        index,
        style(&product.title).yellow(),
        args.qty,
        style(format_short_id(&order.id)).cyan()
    );
    println!(
        "   Revenue {} - Expenses {} = Profit {}",
        money(order.revenue),
        opt_money(order.expenses),
        money(order.profit)
    );
    Ok(())
}

fn run_dup_piece(args: PieceArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let catalog = load_catalog(&project);
    let (mut order, path) = load_order(&project, &args.order)?;

    let index = composer::duplicate_piece(&mut order, args.piece, &catalog)
        .map_err(|e| miette::miette!("{}", e))?;
    save_order(&path, &order)?;

    println!(
        "{} Duplicated piece [{}] as [{}] in {}",
        style("✓").green(),
        args.piece,
        index,
        style(format_short_id(&order.id)).cyan()
    );
    Ok(())
}

fn run_rm_piece(args: PieceArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let catalog = load_catalog(&project);
    let (mut order, path) = load_order(&project, &args.order)?;

    composer::remove_piece(&mut order, args.piece, &catalog)
        .map_err(|e| miette::miette!("{}", e))?;
    save_order(&path, &order)?;

    println!(
        "{} Removed piece [{}] from {} ({} piece(s) left)",
        style("✓").green(),
        args.piece,
        style(format_short_id(&order.id)).cyan(),
        order.pieces.len()
    );
    Ok(())
}

fn run_qty(args: QtyArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let catalog = load_catalog(&project);
    let (mut order, path) = load_order(&project, &args.order)?;

    composer::update_piece_quantity(&mut order, args.piece, args.qty, &catalog)
        .map_err(|e| miette::miette!("{}", e))?;
    save_order(&path, &order)?;

    println!(
        "{} Piece [{}] quantity set to {}",
        style("✓").green(),
        args.piece,
        style(args.qty).cyan()
    );
    Ok(())
}

fn run_price(args: PriceArgs) -> Result<()> {
    if args.price.is_none() && !args.clear {
        return Err(miette::miette!("pass --price AMOUNT or --clear"));
    }

    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let catalog = load_catalog(&project);
    let (mut order, path) = load_order(&project, &args.order)?;

    composer::set_piece_price(&mut order, args.piece, args.price, &catalog)
        .map_err(|e| miette::miette!("{}", e))?;
    save_order(&path, &order)?;

    match args.price {
        Some(price) => println!(
            "{} Piece [{}] priced at {}",
            style("✓").green(),
            args.piece,
            style(money(price)).cyan()
        ),
        None => println!("{} Piece [{}] price cleared", style("✓").green(), args.piece),
    }
    println!("   Revenue {}", money(order.revenue));
    Ok(())
}

fn run_material(args: MaterialArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let catalog = load_catalog(&project);
    let (mut order, path) = load_order(&project, &args.order)?;

    let filament_id: Option<String> = if args.clear {
        None
    } else if let Some(ref query) = args.filament {
        let (filament, _path) =
            store::load::<Filament>(&project, query).map_err(|e| miette::miette!("{}", e))?;
        Some(filament.id.to_string())
    } else if args.interactive {
        let choices: Vec<&Filament> = catalog.visible().collect();
        if choices.is_empty() {
            return Err(miette::miette!(
                "no filaments in the inventory; add one with 'printdesk fil new'"
            ));
        }
        let items: Vec<String> = choices
            .iter()
            .map(|f| format!("{} ({}) - {}/kg", f.title, f.brand, money(f.price_per_kilo)))
            .collect();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Filament")
            .items(&items)
            .default(0)
            .interact()
            .into_diagnostic()?;
        Some(choices[selection].id.to_string())
    } else {
        return Err(miette::miette!(
            "pass --filament ID, --clear, or --interactive"
        ));
    };

    composer::set_part_material(
        &mut order,
        args.piece,
        args.part,
        filament_id.as_deref(),
        &catalog,
    )
    .map_err(|e| miette::miette!("{}", e))?;
    save_order(&path, &order)?;

    match filament_id.as_deref() {
        Some(id) => println!(
            "{} Piece [{}] part [{}] uses {}",
            style("✓").green(),
            args.piece,
            args.part,
            style(catalog.title_of(id)).yellow()
        ),
        None => println!(
            "{} Piece [{}] part [{}] selection cleared",
            style("✓").green(),
            args.piece,
            args.part
        ),
    }
    println!(
        "   Revenue {} - Expenses {} = Profit {}",
        money(order.revenue),
        opt_money(order.expenses),
        money(order.profit)
    );
    Ok(())
}

// =========================================================================
// fulfillment operations
// =========================================================================

fn run_progress(args: ProgressArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (mut order, path) = load_order(&project, &args.order)?;

    fulfillment::set_printed_count(&mut order, args.piece, args.count)
        .map_err(|e| miette::miette!("{}", e))?;
    save_order(&path, &order)?;

    println!(
        "{} Piece [{}]: printed {}/{}",
        style("✓").green(),
        args.piece,
        order.printed_count(args.piece),
        order.pieces[args.piece].quantity
    );
    println!("   Status: {}", style(order.status).cyan());
    Ok(())
}

fn run_printed(args: IdArg) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (mut order, path) = load_order(&project, &args.order)?;

    fulfillment::mark_printed(&mut order);
    save_order(&path, &order)?;

    println!(
        "{} {} marked {}",
        style("✓").green(),
        style(format_short_id(&order.id)).cyan(),
        style("Printed").green()
    );
    Ok(())
}

fn run_done(args: IdArg) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (mut order, path) = load_order(&project, &args.order)?;

    fulfillment::mark_done(&mut order);
    save_order(&path, &order)?;

    println!(
        "{} {} marked {}",
        style("✓").green(),
        style(format_short_id(&order.id)).cyan(),
        style("Done").cyan()
    );
    Ok(())
}

fn run_restore(args: IdArg) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (mut order, path) = load_order(&project, &args.order)?;

    fulfillment::restore(&mut order).map_err(|e| miette::miette!("{}", e))?;
    save_order(&path, &order)?;

    println!(
        "{} {} restored to {}",
        style("✓").green(),
        style(format_short_id(&order.id)).cyan(),
        style("Printed").green()
    );
    Ok(())
}

fn run_rm(args: IdArg) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (order, _path) =
        store::hide::<Order>(&project, &args.order).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Hidden order {} (the file stays on disk)",
        style("✓").green(),
        style(&order.title).yellow()
    );
    Ok(())
}

// =========================================================================
// stats
// =========================================================================

fn print_stats_panel(label: &str, stats: &OrderBookStats) {
    println!("{}", style(label).bold());
    println!("  Orders:   {}", style(stats.count).cyan());
    println!("  Revenue:  {}", style(money(stats.revenue)).green());
    println!("  Expenses: {}", style(money(stats.expenses)).red());
    println!("  Profit:   {}", style(money(stats.profit)).cyan());
}

fn run_stats(_args: StatsArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let orders = store::list::<Order>(&project);

    let all = OrderBookStats::from_orders(visible(&orders));
    let done = OrderBookStats::from_orders(realized(&orders));

    print_stats_panel("All orders", &all);
    println!();
    print_stats_panel("Realized (done)", &done);

    Ok(())
}
