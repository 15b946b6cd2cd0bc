use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::debug;
use serde::Deserialize;
use structopt::StructOpt;

use bazaar::admin::{AdminPanel, ChangePassword, ClearOrders, ExportOrders, ListOrders};
use bazaar::cart::CartLine;
use bazaar::config::EnvOverrides;
use bazaar::menu::{ShowCategories, ShowMenu};
use bazaar::money::Rupiah;
use bazaar::orders::PlaceOrder;
use bazaar::services::{Commandable, Queryable};
use bazaar::Bazaar;
use infra::persistence::Documents;

#[derive(Debug, StructOpt)]
#[structopt(name = "rb", about = "Bazaar point of sale")]
struct Opt {
    /// Configuration file
    #[structopt(short = "c", long = "config", parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    command: Commands,
}

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "setup", about = "Create any missing documents")]
    Setup,
    #[structopt(name = "show-menu", about = "Show menu")]
    ShowMenu {
        #[structopt(short = "k", long = "category")]
        category: Option<String>,
    },
    #[structopt(name = "categories", about = "List menu categories")]
    Categories,
    #[structopt(name = "order", about = "Place an order")]
    Order(OrderOpt),
    #[structopt(name = "admin", about = "Manage orders")]
    Admin(AdminOpt),
}

#[derive(Debug, StructOpt)]
struct OrderOpt {
    /// Buyer name; asked for when missing
    #[structopt(short = "b", long = "buyer")]
    buyer: Option<String>,
    /// Table, phone number or anything else worth noting
    #[structopt(short = "n", long = "note", default_value = "")]
    note: String,
    /// Items as ID or ID:QTY
    items: Vec<CartLine>,
}

#[derive(Debug, StructOpt)]
struct AdminOpt {
    /// Admin password; asked for when missing
    #[structopt(short = "p", long = "password")]
    password: Option<String>,
    #[structopt(subcommand)]
    command: AdminCommands,
}

#[derive(Debug, StructOpt)]
enum AdminCommands {
    #[structopt(name = "list", about = "List placed orders")]
    List,
    #[structopt(name = "export", about = "Write a timestamped copy of the orders")]
    Export,
    #[structopt(name = "clear", about = "Delete every order")]
    Clear {
        #[structopt(long = "yes")]
        yes: bool,
    },
    #[structopt(name = "change-password", about = "Change the admin password")]
    ChangePassword {
        #[structopt(long = "new")]
        new: Option<String>,
        #[structopt(long = "confirm")]
        confirm: Option<String>,
    },
}

#[derive(Deserialize, Debug, Default)]
struct Config {
    #[serde(flatten)]
    bazaar: bazaar::config::Config,
    #[serde(default)]
    env_logger: bazaar::config::EnvLogger,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None => return Ok(Config::default()),
    };
    let mut config_buf = String::new();
    File::open(path)
        .with_context(|| format!("open {:?}", path))?
        .read_to_string(&mut config_buf)?;
    let config = toml::from_str(&config_buf).with_context(|| format!("parse {:?}", path))?;
    Ok(config)
}

fn prompt(question: &str) -> Result<Option<String>> {
    eprint!("{} ", question);
    io::stderr().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

fn show_menu(rb: &Bazaar<Documents>, category: Option<String>) -> Result<()> {
    for item in rb.query(ShowMenu { category })? {
        println!(
            "{:>3}  {:<20} {:<10} {:>12}",
            item.id.0,
            item.name,
            item.category,
            Rupiah(item.price).to_string()
        );
    }
    Ok(())
}

fn place_order(rb: &mut Bazaar<Documents>, opt: OrderOpt) -> Result<()> {
    let OrderOpt { buyer, note, items } = opt;
    if items.is_empty() {
        bail!("the cart is empty, name at least one item");
    }
    let buyer = match buyer {
        Some(buyer) => buyer,
        None => match prompt("Buyer name:")? {
            Some(buyer) => buyer,
            None => bail!("order cancelled, a buyer name is required"),
        },
    };

    let record = rb.execute(PlaceOrder {
        lines: items,
        buyer,
        note,
    })?;
    for line in record.items.iter() {
        println!(
            "{:<20} x{:<3} {:>12}",
            line.name,
            line.qty,
            Rupiah(line.price.saturating_mul(u64::from(line.qty))).to_string()
        );
    }
    println!("Order received! Total {}", Rupiah(record.total));
    Ok(())
}

fn admin(rb: &mut Bazaar<Documents>, opt: AdminOpt) -> Result<()> {
    let AdminOpt { password, command } = opt;
    let password = match password {
        Some(p) => p,
        None => match prompt("Admin password:")? {
            Some(p) => p,
            None => bail!("cancelled, no admin password given"),
        },
    };
    let mut panel = match rb.unlock(&password)? {
        Some(panel) => panel,
        None => bail!("wrong password"),
    };

    match command {
        AdminCommands::List => list_orders(&panel)?,
        AdminCommands::Export => {
            let path = panel.execute(ExportOrders)?;
            println!("Exported to: {}", path.display());
        }
        AdminCommands::Clear { yes } => {
            let confirmed = yes
                || prompt("Delete all orders? This cannot be undone. [y/N]")?
                    .map(|a| a.trim().eq_ignore_ascii_case("y"))
                    .unwrap_or(false);
            if !confirmed {
                println!("Nothing deleted.");
                return Ok(());
            }
            let cleared = panel.execute(ClearOrders)?;
            println!("Deleted {} orders.", cleared);
        }
        AdminCommands::ChangePassword { new, confirm } => {
            let new_password = match new {
                Some(p) => p,
                None => prompt("New password:")?.unwrap_or_default(),
            };
            let confirmation = match confirm {
                Some(p) => p,
                None => prompt("Repeat new password:")?.unwrap_or_default(),
            };
            panel.execute(ChangePassword {
                new_password,
                confirmation,
            })?;
            println!("Admin password updated.");
        }
    }
    Ok(())
}

fn list_orders(panel: &AdminPanel<Documents>) -> Result<()> {
    let orders = panel.query(ListOrders)?;
    for order in orders.iter() {
        println!(
            "{} | {} | {} | {} | {}",
            order.timestamp,
            order.buyer,
            Rupiah(order.total),
            order.note,
            order.details()
        );
    }
    println!("{} orders", orders.len());
    Ok(())
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let mut config = load_config(opt.config.as_ref())?;
    config.env_logger.builder().init();
    config
        .bazaar
        .apply(EnvOverrides::from_env().context("read BAZAAR_* environment")?);
    debug!("Options: {:?}", opt);

    let mut rb = Bazaar::new(&config.bazaar).context("open bazaar")?;

    match opt.command {
        Commands::Setup => {
            println!("Documents ready in {}", rb.store().root().display());
        }
        Commands::ShowMenu { category } => show_menu(&rb, category)?,
        Commands::Categories => {
            for category in rb.query(ShowCategories)? {
                println!("{}", category);
            }
        }
        Commands::Order(order) => place_order(&mut rb, order)?,
        Commands::Admin(admin_opt) => admin(&mut rb, admin_opt)?,
    }

    Ok(())
}
