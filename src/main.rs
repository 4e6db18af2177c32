use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};

use door_orders::api::{ApiClient, Product, SearchSequencer, SearchTicket};
use door_orders::config::{
    config_dir, ensure_initialized, format_order_number, list_orders, load_config, load_order,
    load_ranges, load_state, resolve_order_number, save_order, save_ranges, save_state, Config,
    CONFIG_TEMPLATE, RANGES_TEMPLATE,
};
use door_orders::dimensions::{CasingFormula, CasingRange, CasingType, Deriver};
use door_orders::numeric::{format_money, format_percent, parse_number, parse_quantity};
use door_orders::order::{
    Accessory, CasingSpec, Crown, DoorSpec, Extension, Order, OrderEditor, OrderStatus,
    ProductRef, RangeChoice,
};
use door_orders::plan::YearlyPlan;
use door_orders::pricing::{DiscountEdit, DiscountField};
use door_orders::reference::{GlassType, Massif, Resource, Threshold};
use door_orders::{logging, OrderError, Result};

#[derive(Parser)]
#[command(name = "door-orders")]
#[command(version, about = "Order desk for door manufacturing", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config or ~/.door-orders)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Increase log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Show configuration and the next order number
    Status,

    /// Start a new draft order
    New {
        /// Customer name
        #[arg(short, long)]
        customer: String,

        /// Customer phone
        #[arg(short, long)]
        phone: Option<String>,

        /// Delivery deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,
    },

    /// List draft and submitted orders
    List {
        /// Number of orders to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show an order with its doors, prices and settlement
    Show {
        /// Order number or index from 'list' (e.g., 1 or ORD-2026-0001)
        order: String,
    },

    /// Add, resize or remove doors
    Door {
        #[command(subcommand)]
        action: DoorCommand,
    },

    /// Add casings or switch their formula
    Casing {
        #[command(subcommand)]
        action: CasingCommand,
    },

    /// Add a crown to a door
    Crown {
        #[command(subcommand)]
        action: CrownCommand,
    },

    /// Add an extension to a door
    Extension {
        #[command(subcommand)]
        action: ExtensionCommand,
    },

    /// Add an accessory to a door
    Accessory {
        #[command(subcommand)]
        action: AccessoryCommand,
    },

    /// Edit the discount of an order; the edited field is kept as typed
    Discount {
        /// Order number or index from 'list'
        order: String,

        #[command(flatten)]
        edit: DiscountArgs,
    },

    /// Price an order on the server
    Calculate {
        /// Order number or index from 'list'
        order: String,
    },

    /// Send an order to the server (recalculates first)
    Submit {
        /// Order number or index from 'list'
        order: String,

        /// Submit with the stored price instead of recalculating
        #[arg(long)]
        no_recalculate: bool,
    },

    /// View or edit yearly sales plans
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },

    /// Manage reference data (glass types, massifs, thresholds)
    Ref {
        /// Kind of reference record
        #[arg(value_enum)]
        kind: RefKind,

        #[command(subcommand)]
        action: RefCommand,
    },

    /// Manage casing ranges used by formula2 casings
    Ranges {
        #[command(subcommand)]
        action: RangesCommand,
    },

    /// Search the product catalog
    Search {
        /// Search text
        query: Option<String>,

        /// Read queries from stdin, one per line; only the latest is shown
        #[arg(short, long)]
        interactive: bool,
    },
}

/// Fields shared by every line item.
#[derive(Args)]
struct ItemArgs {
    /// Product as "id" or "id:name" (e.g., 42:Classic oak)
    #[arg(short, long)]
    model: Option<String>,

    /// Unit price
    #[arg(short, long, default_value = "0")]
    price: String,

    /// Quantity
    #[arg(short, long, default_value = "1")]
    quantity: String,
}

#[derive(Subcommand)]
enum DoorCommand {
    /// Add a door to an order
    Add {
        /// Order number or index from 'list'
        order: String,

        /// Door width
        #[arg(short, long)]
        width: String,

        /// Door height
        #[arg(short = 'H', long)]
        height: String,

        #[command(flatten)]
        item: ItemArgs,

        #[arg(long)]
        material: Option<String>,

        #[arg(long)]
        color: Option<String>,

        /// Glass type id
        #[arg(long)]
        glass_type: Option<u64>,

        /// Threshold id
        #[arg(long)]
        threshold: Option<u64>,
    },

    /// Change door dimensions; casings and crowns follow
    Resize {
        /// Order number or index from 'list'
        order: String,

        /// 1-based door number
        door: usize,

        #[arg(short, long)]
        width: Option<String>,

        #[arg(short = 'H', long)]
        height: Option<String>,
    },

    /// Remove a door and everything on it
    Remove {
        /// Order number or index from 'list'
        order: String,

        /// 1-based door number
        door: usize,
    },
}

#[derive(Subcommand)]
enum CasingCommand {
    /// Add a casing to a door
    Add {
        /// Order number or index from 'list'
        order: String,

        /// 1-based door number
        door: usize,

        /// Casing type: side (боковой) or straight (прямой)
        #[arg(short = 't', long = "type")]
        casing_type: CasingType,

        /// formula1 (from door) or formula2 (from range)
        #[arg(short, long, default_value = "formula1")]
        formula: CasingFormula,

        /// Range id for formula2, or "auto" to pick by door size
        #[arg(short, long, value_parser = parse_range_choice)]
        range: Option<RangeChoice>,

        #[command(flatten)]
        item: ItemArgs,
    },

    /// Switch a casing between formula1 and formula2
    Formula {
        /// Order number or index from 'list'
        order: String,

        /// 1-based door number
        door: usize,

        /// 1-based casing number on the door
        casing: usize,

        /// formula1 or formula2
        formula: CasingFormula,

        /// Range id for formula2, or "auto"
        #[arg(short, long, value_parser = parse_range_choice)]
        range: Option<RangeChoice>,
    },
}

#[derive(Subcommand)]
enum CrownCommand {
    /// Add a crown; its width follows the door
    Add {
        /// Order number or index from 'list'
        order: String,

        /// 1-based door number
        door: usize,

        #[arg(short = 'H', long, default_value = "0")]
        height: String,

        #[command(flatten)]
        item: ItemArgs,
    },
}

#[derive(Subcommand)]
enum ExtensionCommand {
    /// Add an extension
    Add {
        /// Order number or index from 'list'
        order: String,

        /// 1-based door number
        door: usize,

        #[arg(short, long, default_value = "0")]
        width: String,

        #[arg(short = 'H', long, default_value = "0")]
        height: String,

        #[command(flatten)]
        item: ItemArgs,
    },
}

#[derive(Subcommand)]
enum AccessoryCommand {
    /// Add an accessory
    Add {
        /// Order number or index from 'list'
        order: String,

        /// 1-based door number
        door: usize,

        #[command(flatten)]
        item: ItemArgs,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct DiscountArgs {
    /// Discount percentage
    #[arg(long)]
    percent: Option<String>,

    /// Discount amount (percentage is derived from it)
    #[arg(long)]
    amount: Option<String>,

    /// Negotiated agreement amount, added on top of the percentage
    #[arg(long)]
    agreement: Option<String>,

    /// Advance payment received
    #[arg(long)]
    advance: Option<String>,
}

impl DiscountArgs {
    fn edit(&self) -> Option<DiscountEdit> {
        let fields = [
            (DiscountField::Percentage, &self.percent),
            (DiscountField::Amount, &self.amount),
            (DiscountField::Agreement, &self.agreement),
            (DiscountField::Advance, &self.advance),
        ];
        fields.into_iter().find_map(|(field, value)| {
            value
                .as_deref()
                .map(|input| DiscountEdit::from_input(field, input))
        })
    }
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Show a user's yearly plan with progress
    Show {
        /// Backend user id (default: [user] id from config)
        #[arg(short, long)]
        user: Option<u64>,

        /// Plan year (default: current year)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Set the planned figures of one month and save the plan
    Set {
        #[arg(short, long)]
        user: Option<u64>,

        #[arg(short, long)]
        year: Option<i32>,

        /// Month 1-12
        #[arg(short, long)]
        month: u32,

        /// Planned sales amount
        #[arg(long, default_value = "0")]
        sales: String,

        /// Planned number of clients
        #[arg(long, default_value = "0")]
        clients: String,

        /// Planned number of sales
        #[arg(long, default_value = "0")]
        count: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RefKind {
    GlassTypes,
    Massifs,
    Thresholds,
}

#[derive(Subcommand)]
enum RefCommand {
    /// List records
    List,
    /// Show one record
    Get { id: u64 },
    /// Create a record
    Add { name: String },
    /// Rename a record
    Update { id: u64, name: String },
    /// Delete a record
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum RangesCommand {
    /// List locally cached casing ranges
    List,
    /// Replace the local cache with the server's ranges
    Sync,
    /// Create a range on the server and cache it
    Add {
        #[arg(long)]
        min: String,
        #[arg(long)]
        max: String,
        /// Casing height used by formula2 casings in this range
        #[arg(long)]
        size: String,
    },
    /// Delete a range on the server and from the cache
    Delete { id: u64 },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir),
        Commands::New {
            customer,
            phone,
            deadline,
        } => cmd_new(&cfg_dir, customer, phone, deadline),
        Commands::List { limit } => cmd_list(&cfg_dir, limit),
        Commands::Show { order } => cmd_show(&cfg_dir, &order),
        Commands::Door { action } => cmd_door(&cfg_dir, action),
        Commands::Casing { action } => cmd_casing(&cfg_dir, action),
        Commands::Crown {
            action:
                CrownCommand::Add {
                    order,
                    door,
                    height,
                    item,
                },
        } => with_editor(&cfg_dir, &order, |editor, _| {
            let crown = Crown {
                model: item.model()?,
                price: item.price(),
                quantity: item.quantity(),
                height: parse_number(&height, Decimal::ZERO),
                width: Decimal::ZERO,
            };
            let index = editor.add_crown(door, crown)?;
            let added = &editor.order().door(door)?.crowns[index - 1];
            println!("Added crown #{index} to door #{door}: width {}", added.width);
            Ok(())
        }),
        Commands::Extension {
            action:
                ExtensionCommand::Add {
                    order,
                    door,
                    width,
                    height,
                    item,
                },
        } => with_editor(&cfg_dir, &order, |editor, _| {
            let extension = Extension {
                model: item.model()?,
                price: item.price(),
                quantity: item.quantity(),
                height: parse_number(&height, Decimal::ZERO),
                width: parse_number(&width, Decimal::ZERO),
            };
            let index = editor.add_extension(door, extension)?;
            println!("Added extension #{index} to door #{door}");
            Ok(())
        }),
        Commands::Accessory {
            action: AccessoryCommand::Add { order, door, item },
        } => with_editor(&cfg_dir, &order, |editor, _| {
            let accessory = Accessory {
                model: item.model()?,
                price: item.price(),
                quantity: item.quantity(),
            };
            let index = editor.add_accessory(door, accessory)?;
            println!("Added accessory #{index} to door #{door}");
            Ok(())
        }),
        Commands::Discount { order, edit } => cmd_discount(&cfg_dir, &order, &edit),
        Commands::Calculate { order } => cmd_calculate(&cfg_dir, &order),
        Commands::Submit {
            order,
            no_recalculate,
        } => cmd_submit(&cfg_dir, &order, !no_recalculate),
        Commands::Plan { action } => cmd_plan(&cfg_dir, action),
        Commands::Ref { kind, action } => match kind {
            RefKind::GlassTypes => cmd_ref::<GlassType>(&cfg_dir, action),
            RefKind::Massifs => cmd_ref::<Massif>(&cfg_dir, action),
            RefKind::Thresholds => cmd_ref::<Threshold>(&cfg_dir, action),
        },
        Commands::Ranges { action } => cmd_ranges(&cfg_dir, action),
        Commands::Search { query, interactive } => cmd_search(&cfg_dir, query, interactive),
    }
}

impl ItemArgs {
    fn model(&self) -> Result<Option<ProductRef>> {
        self.model.as_deref().map(str::parse).transpose()
    }

    fn price(&self) -> Decimal {
        parse_number(&self.price, Decimal::ZERO)
    }

    fn quantity(&self) -> u32 {
        parse_quantity(&self.quantity, 1)
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(OrderError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir.join("orders"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("casing_ranges.toml"), RANGES_TEMPLATE)?;

    println!("Initialized door-orders config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set company, API and sizes:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Pull casing ranges:          door-orders ranges sync");
    println!();
    println!("Then start your first order:");
    println!("  door-orders new --customer <name>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "DOORS")]
    doors: usize,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct DoorRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "MODEL")]
    model: String,
    #[tabled(rename = "W x H")]
    size: String,
    #[tabled(rename = "QTY")]
    quantity: u32,
    #[tabled(rename = "PRICE")]
    price: String,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "DOOR")]
    door: usize,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "MODEL")]
    model: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
    #[tabled(rename = "W x H")]
    size: String,
    #[tabled(rename = "QTY")]
    quantity: u32,
}

#[derive(Tabled)]
struct AmountRow {
    #[tabled(rename = "")]
    label: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "MONTH")]
    month: String,
    #[tabled(rename = "SALES PLAN")]
    sales_plan: String,
    #[tabled(rename = "ACTUAL")]
    actual_sales: String,
    #[tabled(rename = "%")]
    sales_pct: String,
    #[tabled(rename = "CLIENTS")]
    clients: String,
    #[tabled(rename = "SALES")]
    sales_count: String,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
}

#[derive(Tabled)]
struct RangeRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "MIN")]
    min: String,
    #[tabled(rename = "MAX")]
    max: String,
    #[tabled(rename = "CASING HEIGHT")]
    casing_size: String,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "PRICE")]
    price: String,
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| OrderError::InvalidDate(value.to_string()))
}

fn load_ready_config(cfg_dir: &Path) -> Result<Config> {
    ensure_initialized(cfg_dir)?;
    load_config(cfg_dir)
}

fn api_client(config: &Config) -> ApiClient {
    ApiClient::new(&config.api)
}

/// Loads an order, opens an editor for it and saves it back on success.
fn with_editor<F>(cfg_dir: &Path, reference: &str, edit: F) -> Result<()>
where
    F: FnOnce(&mut OrderEditor<'_>, &Config) -> Result<()>,
{
    let config = load_ready_config(cfg_dir)?;
    let ranges = load_ranges(cfg_dir)?;
    let number = resolve_order_number(cfg_dir, reference)?;
    let mut order = load_order(cfg_dir, &number)?;

    let access = config.user.access();
    let deriver = Deriver::new(&config.calculation, &ranges);
    let mut editor = OrderEditor::new(&mut order, &access, deriver)?;
    edit(&mut editor, &config)?;

    save_order(cfg_dir, &order)?;
    tracing::info!(order = %number, "order saved");
    Ok(())
}

fn parse_range_choice(value: &str) -> std::result::Result<RangeChoice, String> {
    match value {
        "auto" => Ok(RangeChoice::Auto),
        id => id
            .parse()
            .map(RangeChoice::Id)
            .map_err(|_| format!("expected a range id or 'auto', got '{id}'")),
    }
}

/// Show configuration and next order number
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    let config = load_ready_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let ranges = load_ranges(cfg_dir)?;
    let orders = list_orders(cfg_dir)?;

    let current_year = chrono::Local::now().year() as u32;
    let next_number = format_order_number(
        &config.order.number_format,
        current_year,
        state.counter.next_seq(current_year),
    );
    let drafts = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Draft)
        .count();

    println!("Order Desk Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Company:          {}", config.company.name);
    println!("API:              {}", config.api.base_url);
    println!(
        "User:             #{} ({})",
        config.user.id, config.user.role
    );
    println!(
        "Sizes:            casing {} / crown {}",
        config.calculation.casing_size, config.calculation.crown_size
    );
    println!("Casing ranges:    {}", ranges.len());
    println!("Orders:           {} ({} draft)", orders.len(), drafts);
    println!("Next order:       {}", next_number);

    Ok(())
}

/// Start a new draft order
fn cmd_new(
    cfg_dir: &Path,
    customer: String,
    phone: Option<String>,
    deadline: Option<String>,
) -> Result<()> {
    let config = load_ready_config(cfg_dir)?;
    config.user.access().ensure_can_edit()?;
    let deadline = deadline.as_deref().map(parse_date).transpose()?;

    let today = chrono::Local::now().date_naive();
    let mut state = load_state(cfg_dir)?;
    let seq = state.counter.advance(today.year() as u32);
    let number = format_order_number(&config.order.number_format, today.year() as u32, seq);

    let mut order = Order::new(number.clone(), customer, today);
    order.phone = phone;
    order.deadline = deadline;

    save_order(cfg_dir, &order)?;
    save_state(cfg_dir, &state)?;

    println!("Created order {number}");
    println!();
    println!("Add a door:");
    println!("  door-orders door add {number} --width <w> --height <h>");
    Ok(())
}

/// List orders, newest first
fn cmd_list(cfg_dir: &Path, limit: Option<usize>) -> Result<()> {
    let config = load_ready_config(cfg_dir)?;
    let orders = list_orders(cfg_dir)?;

    if orders.is_empty() {
        println!("No orders yet.");
        println!("Create one with: door-orders new --customer <name>");
        return Ok(());
    }

    let limit = limit.unwrap_or(orders.len());
    let rows: Vec<OrderRow> = orders
        .iter()
        .rev()
        .take(limit)
        .enumerate()
        .map(|(i, order)| OrderRow {
            index: i + 1,
            number: order.number.clone(),
            date: order.date.to_string(),
            customer: order.customer.clone(),
            doors: order.doors.len(),
            total: match &order.pricing {
                Some(_) => format_money(
                    order.settlement().total_amount,
                    &config.display.currency_symbol,
                ),
                None => "-".to_string(),
            },
            status: order.status.to_string(),
        })
        .collect();

    print_table(rows);
    Ok(())
}

fn model_label(model: Option<&ProductRef>) -> String {
    model
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Show an order in full
fn cmd_show(cfg_dir: &Path, reference: &str) -> Result<()> {
    let config = load_ready_config(cfg_dir)?;
    let number = resolve_order_number(cfg_dir, reference)?;
    let order = load_order(cfg_dir, &number)?;
    let currency = &config.display.currency_symbol;

    println!("Order {} [{}]", order.number, order.status);
    println!("{}", "-".repeat(50));
    println!("Customer: {}", order.customer);
    if let Some(phone) = &order.phone {
        println!("Phone:    {phone}");
    }
    println!("Date:     {}", order.date);
    if let Some(deadline) = order.deadline {
        println!("Deadline: {deadline}");
    }
    if let Some(id) = order.remote_id {
        println!("Server:   #{id}");
    }
    println!();

    if order.doors.is_empty() {
        println!("No doors yet.");
    } else {
        let doors: Vec<DoorRow> = order
            .doors
            .iter()
            .enumerate()
            .map(|(i, door)| DoorRow {
                index: i + 1,
                model: model_label(door.model.as_ref()),
                size: format!("{} x {}", door.width, door.height),
                quantity: door.quantity,
                price: format_money(door.price, currency),
            })
            .collect();
        print_table(doors);

        let mut items = Vec::new();
        for (d, door) in order.doors.iter().enumerate() {
            for (i, casing) in door.casings.iter().enumerate() {
                let detail = match casing.casing_range {
                    Some(range) => format!(
                        "{} {} range {}",
                        casing.casing_type, casing.casing_formula, range
                    ),
                    None => format!("{} {}", casing.casing_type, casing.casing_formula),
                };
                items.push(ItemRow {
                    door: d + 1,
                    kind: "casing".to_string(),
                    index: i + 1,
                    model: model_label(casing.model.as_ref()),
                    detail,
                    size: format!("{} x {}", casing.width, casing.height),
                    quantity: casing.quantity,
                });
            }
            for (i, crown) in door.crowns.iter().enumerate() {
                items.push(ItemRow {
                    door: d + 1,
                    kind: "crown".to_string(),
                    index: i + 1,
                    model: model_label(crown.model.as_ref()),
                    detail: String::new(),
                    size: format!("{} x {}", crown.width, crown.height),
                    quantity: crown.quantity,
                });
            }
            for (i, extension) in door.extensions.iter().enumerate() {
                items.push(ItemRow {
                    door: d + 1,
                    kind: "extension".to_string(),
                    index: i + 1,
                    model: model_label(extension.model.as_ref()),
                    detail: String::new(),
                    size: format!("{} x {}", extension.width, extension.height),
                    quantity: extension.quantity,
                });
            }
            for (i, accessory) in door.accessories.iter().enumerate() {
                items.push(ItemRow {
                    door: d + 1,
                    kind: "accessory".to_string(),
                    index: i + 1,
                    model: model_label(accessory.model.as_ref()),
                    detail: String::new(),
                    size: String::new(),
                    quantity: accessory.quantity,
                });
            }
        }
        if !items.is_empty() {
            println!();
            print_table(items);
        }
    }

    println!();
    match &order.pricing {
        Some(pricing) => {
            let rows: Vec<AmountRow> = pricing
                .rows()
                .iter()
                .map(|(label, value)| AmountRow {
                    label: label.to_string(),
                    amount: format_money(*value, currency),
                })
                .collect();
            print_table(rows);
        }
        None => println!("Not priced yet. Run 'door-orders calculate {}'.", order.number),
    }

    let settlement = order.settlement();
    println!();
    println!(
        "Discount:          {} ({})",
        format_percent(order.discount.discount_percentage),
        format_money(order.discount.discount_amount, currency)
    );
    println!(
        "Agreement:         {}",
        format_money(order.discount.agreement_amount, currency)
    );
    println!(
        "Total discount:    {} ({})",
        format_money(settlement.total_discount_amount, currency),
        format_percent(settlement.equivalent_percentage)
    );
    println!(
        "Total amount:      {}",
        format_money(settlement.total_amount, currency)
    );
    println!(
        "Advance:           {}",
        format_money(settlement.advance_payment, currency)
    );
    println!(
        "Remaining balance: {}",
        format_money(settlement.remaining_balance, currency)
    );

    Ok(())
}

fn cmd_door(cfg_dir: &Path, action: DoorCommand) -> Result<()> {
    match action {
        DoorCommand::Add {
            order,
            width,
            height,
            item,
            material,
            color,
            glass_type,
            threshold,
        } => with_editor(cfg_dir, &order, |editor, _| {
            let spec = DoorSpec {
                model: item.model()?,
                price: item.price(),
                quantity: item.quantity(),
                width: parse_number(&width, Decimal::ZERO),
                height: parse_number(&height, Decimal::ZERO),
                material,
                color,
                glass_type,
                threshold,
            };
            let index = editor.add_door(spec);
            let door = editor.order().door(index)?;
            println!("Added door #{index}: {}", door.summary());
            Ok(())
        }),
        DoorCommand::Resize {
            order,
            door,
            width,
            height,
        } => with_editor(cfg_dir, &order, |editor, _| {
            let current = editor.order().door(door)?;
            let width = width.map(|w| parse_number(&w, current.width));
            let height = height.map(|h| parse_number(&h, current.height));
            editor.resize_door(door, width, height)?;
            let resized = editor.order().door(door)?;
            println!(
                "Resized door #{door} to {} x {}; {} casing(s) and {} crown(s) updated",
                resized.width,
                resized.height,
                resized.casings.len(),
                resized.crowns.len()
            );
            Ok(())
        }),
        DoorCommand::Remove { order, door } => with_editor(cfg_dir, &order, |editor, _| {
            let removed = editor.remove_door(door)?;
            println!("Removed door #{door}: {}", removed.summary());
            Ok(())
        }),
    }
}

fn cmd_casing(cfg_dir: &Path, action: CasingCommand) -> Result<()> {
    match action {
        CasingCommand::Add {
            order,
            door,
            casing_type,
            formula,
            range,
            item,
        } => with_editor(cfg_dir, &order, |editor, _| {
            let spec = CasingSpec {
                model: item.model()?,
                price: item.price(),
                quantity: item.quantity(),
                casing_type,
                formula,
                range: range.unwrap_or_default(),
            };
            let index = editor.add_casing(door, spec)?;
            let casing = &editor.order().door(door)?.casings[index - 1];
            println!(
                "Added {} casing #{index} to door #{door}: height {}, width {}",
                casing.casing_type, casing.height, casing.width
            );
            Ok(())
        }),
        CasingCommand::Formula {
            order,
            door,
            casing,
            formula,
            range,
        } => with_editor(cfg_dir, &order, |editor, _| {
            editor.switch_casing_formula(door, casing, formula, range.unwrap_or_default())?;
            let updated = &editor.order().door(door)?.casings[casing - 1];
            println!(
                "Casing #{casing} on door #{door} now uses {}: height {}",
                updated.casing_formula, updated.height
            );
            Ok(())
        }),
    }
}

/// Apply one discount edit and print the reconciled figures
fn cmd_discount(cfg_dir: &Path, reference: &str, args: &DiscountArgs) -> Result<()> {
    let Some(edit) = args.edit() else {
        return Ok(());
    };

    with_editor(cfg_dir, reference, |editor, config| {
        let currency = &config.display.currency_symbol;
        editor.edit_discount(edit);
        let order = editor.order();
        let settlement = order.settlement();
        println!(
            "Discount: {} = {}, agreement {}",
            format_percent(order.discount.discount_percentage),
            format_money(order.discount.discount_amount, currency),
            format_money(order.discount.agreement_amount, currency)
        );
        println!(
            "Remaining balance: {}",
            format_money(settlement.remaining_balance, currency)
        );
        if order.discount.amount_below_agreement() {
            eprintln!(
                "Warning: discount amount {} is below the agreement {}; the order is submitted with {}",
                format_money(order.discount.discount_amount, currency),
                format_money(order.discount.agreement_amount, currency),
                format_money(settlement.total_discount_amount, currency)
            );
        }
        Ok(())
    })
}

/// Price an order on the server and store the breakdown
fn cmd_calculate(cfg_dir: &Path, reference: &str) -> Result<()> {
    let config = load_ready_config(cfg_dir)?;
    config.user.access().ensure_can_edit()?;
    let number = resolve_order_number(cfg_dir, reference)?;
    let mut order = load_order(cfg_dir, &number)?;
    if order.doors.is_empty() {
        return Err(OrderError::EmptyOrder(number));
    }

    let breakdown = api_client(&config).calculate(&order)?;
    order.apply_pricing(breakdown);
    save_order(cfg_dir, &order)?;

    println!(
        "Priced {}: subtotal {}, total {}",
        order.number,
        format_money(order.total_sum(), &config.display.currency_symbol),
        format_money(
            order.settlement().total_amount,
            &config.display.currency_symbol
        )
    );
    Ok(())
}

/// Send an order to the server
fn cmd_submit(cfg_dir: &Path, reference: &str, recalculate: bool) -> Result<()> {
    let config = load_ready_config(cfg_dir)?;
    config.user.access().ensure_can_edit()?;
    let number = resolve_order_number(cfg_dir, reference)?;
    let mut order = load_order(cfg_dir, &number)?;
    if order.doors.is_empty() {
        return Err(OrderError::EmptyOrder(number));
    }

    let client = api_client(&config);
    if recalculate {
        let breakdown = client.calculate(&order)?;
        order.apply_pricing(breakdown);
    } else if order.pricing.is_none() {
        return Err(OrderError::NotPriced(number));
    }

    let id = client.submit_order(&order)?;
    order.remote_id = Some(id);
    order.status = OrderStatus::Submitted;
    save_order(cfg_dir, &order)?;

    println!(
        "Submitted {} as #{id}: total {}",
        order.number,
        format_money(
            order.settlement().total_amount,
            &config.display.currency_symbol
        )
    );
    Ok(())
}

fn month_label(month: u32) -> String {
    if month == 0 {
        return "TOTAL".to_string();
    }
    NaiveDate::from_ymd_opt(2000, month, 1)
        .map(|d| d.format("%b").to_string())
        .unwrap_or_else(|| month.to_string())
}

fn cmd_plan(cfg_dir: &Path, action: PlanCommand) -> Result<()> {
    let config = load_ready_config(cfg_dir)?;
    let client = api_client(&config);
    let current_year = chrono::Local::now().year();

    match action {
        PlanCommand::Show { user, year } => {
            let user = user.unwrap_or(config.user.id);
            let year = year.unwrap_or(current_year);
            let Some(plan) = client.find_yearly_plan(user, year)? else {
                println!("No plan for user #{user} in {year}.");
                return Ok(());
            };

            let currency = &config.display.currency_symbol;
            let totals = plan.totals();
            let rows: Vec<PlanRow> = plan
                .details
                .iter()
                .chain(std::iter::once(&totals))
                .map(|d| PlanRow {
                    month: month_label(d.month),
                    sales_plan: format_money(d.sales_plan, currency),
                    actual_sales: format_money(d.actual_sales, currency),
                    sales_pct: format_percent(d.sales_percentage()),
                    clients: format!(
                        "{}/{} ({})",
                        d.actual_clients,
                        d.clients_plan,
                        format_percent(d.clients_percentage())
                    ),
                    sales_count: format!(
                        "{}/{} ({})",
                        d.actual_sales_count,
                        d.sales_count_plan,
                        format_percent(d.sales_count_percentage())
                    ),
                })
                .collect();

            println!("Plan {year} for user #{user}");
            print_table(rows);
            Ok(())
        }
        PlanCommand::Set {
            user,
            year,
            month,
            sales,
            clients,
            count,
        } => {
            config.user.access().ensure_can_edit()?;
            let user = user.unwrap_or(config.user.id);
            let year = year.unwrap_or(current_year);

            let mut plan = client
                .find_yearly_plan(user, year)?
                .unwrap_or_else(|| YearlyPlan::new(user, year));
            plan.set_month(
                month,
                parse_number(&sales, Decimal::ZERO),
                parse_quantity(&clients, 0),
                parse_quantity(&count, 0),
            )?;
            let saved = client.save_yearly_plan(&plan)?;

            println!(
                "Saved {} plan for user #{user} ({} month(s))",
                saved.year,
                saved.details.len()
            );
            Ok(())
        }
    }
}

/// Reference records that are just a name.
trait NamedRecord: Resource {
    fn named(id: u64, name: String) -> Self;
}

impl NamedRecord for GlassType {
    fn named(id: u64, name: String) -> Self {
        GlassType { id, name }
    }
}

impl NamedRecord for Massif {
    fn named(id: u64, name: String) -> Self {
        Massif { id, name }
    }
}

impl NamedRecord for Threshold {
    fn named(id: u64, name: String) -> Self {
        Threshold { id, name }
    }
}

fn record_row<R: Resource>(record: &R) -> RecordRow {
    RecordRow {
        id: record
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
        name: record.display_name(),
    }
}

fn cmd_ref<R: NamedRecord>(cfg_dir: &Path, action: RefCommand) -> Result<()> {
    let config = load_ready_config(cfg_dir)?;
    let client = api_client(&config);

    match action {
        RefCommand::List => {
            let records: Vec<R> = client.list()?;
            if records.is_empty() {
                println!("No {} records.", R::LABEL);
                return Ok(());
            }
            print_table(records.iter().map(record_row).collect());
        }
        RefCommand::Get { id } => {
            let record: R = client.retrieve(id)?;
            print_table(vec![record_row(&record)]);
        }
        RefCommand::Add { name } => {
            config.user.access().ensure_can_edit()?;
            let created = client.create(&R::named(0, name))?;
            println!(
                "Created {} #{}: {}",
                R::LABEL,
                created.id().unwrap_or_default(),
                created.display_name()
            );
        }
        RefCommand::Update { id, name } => {
            config.user.access().ensure_can_edit()?;
            let updated = client.update(id, &R::named(id, name))?;
            println!("Updated {} #{id}: {}", R::LABEL, updated.display_name());
        }
        RefCommand::Delete { id } => {
            config.user.access().ensure_can_edit()?;
            client.remove::<R>(id)?;
            println!("Deleted {} #{id}", R::LABEL);
        }
    }
    Ok(())
}

fn range_rows(ranges: &[CasingRange]) -> Vec<RangeRow> {
    ranges
        .iter()
        .map(|r| RangeRow {
            id: r.id,
            min: r.min_size.to_string(),
            max: r.max_size.to_string(),
            casing_size: r.casing_size.to_string(),
        })
        .collect()
}

fn cmd_ranges(cfg_dir: &Path, action: RangesCommand) -> Result<()> {
    let config = load_ready_config(cfg_dir)?;

    match action {
        RangesCommand::List => {
            let ranges = load_ranges(cfg_dir)?;
            if ranges.is_empty() {
                println!("No casing ranges cached.");
                println!("Pull them with: door-orders ranges sync");
                return Ok(());
            }
            print_table(range_rows(&ranges));
        }
        RangesCommand::Sync => {
            let ranges: Vec<CasingRange> = api_client(&config).list()?;
            save_ranges(cfg_dir, &ranges)?;
            println!("Cached {} casing range(s)", ranges.len());
        }
        RangesCommand::Add { min, max, size } => {
            config.user.access().ensure_can_edit()?;
            let range = CasingRange {
                id: 0,
                min_size: parse_number(&min, Decimal::ZERO),
                max_size: parse_number(&max, Decimal::ZERO),
                casing_size: parse_number(&size, Decimal::ZERO),
            };
            let created = api_client(&config).create(&range)?;
            let mut ranges = load_ranges(cfg_dir)?;
            ranges.push(created.clone());
            save_ranges(cfg_dir, &ranges)?;
            println!("Created casing range #{}: {}", created.id, created.display_name());
        }
        RangesCommand::Delete { id } => {
            config.user.access().ensure_can_edit()?;
            api_client(&config).remove::<CasingRange>(id)?;
            let mut ranges = load_ranges(cfg_dir)?;
            ranges.retain(|r| r.id != id);
            save_ranges(cfg_dir, &ranges)?;
            println!("Deleted casing range #{id}");
        }
    }
    Ok(())
}

fn print_products(query: &str, products: &[Product], currency: &str) {
    if products.is_empty() {
        println!("No products match '{query}'.");
        return;
    }
    let rows: Vec<ProductRow> = products
        .iter()
        .map(|p| ProductRow {
            id: p.id,
            name: p.name.clone(),
            category: p.category.clone().unwrap_or_default(),
            price: format_money(p.price, currency),
        })
        .collect();
    print_table(rows);
}

/// Search the catalog once, or keep searching as lines arrive on stdin
fn cmd_search(cfg_dir: &Path, query: Option<String>, interactive: bool) -> Result<()> {
    let config = load_ready_config(cfg_dir)?;
    let client = api_client(&config);
    let currency = config.display.currency_symbol.clone();

    if !interactive {
        let query = query.unwrap_or_default();
        let products = client.search_products(&query)?;
        print_products(&query, &products, &currency);
        return Ok(());
    }

    let window = Duration::from_millis(config.api.search_debounce_ms);
    let sequencer = SearchSequencer::new();
    let (requests, queue) = mpsc::channel::<(SearchTicket, String)>();

    let worker = {
        let sequencer = sequencer.clone();
        thread::spawn(move || {
            sequencer.run_latest(
                queue,
                window,
                |text| client.search_products(text),
                |text, found| match found {
                    Ok(products) => print_products(text, &products, &currency),
                    Err(e) => eprintln!("Search failed: {e}"),
                },
            )
        })
    };

    let lines = query
        .into_iter()
        .map(Ok)
        .chain(std::io::stdin().lock().lines());
    for line in lines {
        let text = line?.trim().to_string();
        if requests.send((sequencer.issue(), text)).is_err() {
            break;
        }
    }

    // Closing the queue lets the worker finish the last query and exit.
    drop(requests);
    if worker.join().is_err() {
        tracing::error!("search worker panicked");
    }
    Ok(())
}
