//! Casa Petrada CLI
//!
//! Command-line access to the storefront:
//! - Inspect routes and render pages
//! - Manage the persisted cart and wishlist
//! - Sign in against the shop backend
//! - Check a running storefront

use casapetrada::backend::{Backend, BackendClient, ProductQuery};
use casapetrada::catalog::Catalog;
use casapetrada::config::{generate_default_config, Config};
use casapetrada::router::{Region, Router};
use casapetrada::storage::FileStorage;
use casapetrada::store::Store;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "casapetrada")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Casa Petrada storefront tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: from config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all routes
    Routes,

    /// Render a page to stdout
    Render {
        /// Storefront path, e.g. /product/2
        path: String,
        /// Only print the main region
        #[arg(long)]
        main_only: bool,
    },

    /// Show the route parameters extracted from a path
    Params {
        path: String,
    },

    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },

    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistCommand,
    },

    /// Sign in and keep the session
    Login {
        email: String,
        /// Password (prompted via CASAPETRADA_PASSWORD if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out
    Logout,

    /// List products from the backend (or the built-in catalog)
    Products {
        /// Category slug
        #[arg(short, long)]
        category: Option<String>,
        /// Search text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show the status of a running storefront
    Status {
        /// Storefront URL
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        url: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart
    List,
    /// Add a product
    Add {
        id: u32,
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Set the quantity of a product (0 removes it)
    Set { id: u32, quantity: i64 },
    /// Remove a product
    Remove { id: u32 },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
pub enum WishlistCommand {
    List,
    Add { id: u32 },
    Remove { id: u32 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_default();
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.to_string_lossy().to_string();
    }

    match cli.command {
        Commands::Routes => {
            let store = open_store(&config)?;
            let router = Router::new(store, config.shop.clone());

            if cli.format == "json" {
                let routes: Vec<serde_json::Value> = router
                    .table()
                    .routes()
                    .iter()
                    .map(|r| serde_json::json!({ "pattern": r.pattern(), "view": r.view(), "title": r.title() }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&routes)?);
            } else {
                println!("{:<32} {:<22} {}", "Pattern", "View", "Title");
                println!("{}", "-".repeat(80));
                for route in router.table().routes() {
                    println!(
                        "{:<32} {:<22} {}",
                        route.pattern(),
                        format!("{:?}", route.view()),
                        route.title()
                    );
                }
            }
        }

        Commands::Render { path, main_only } => {
            let store = open_store(&config)?;
            let mut router = Router::new(store, config.shop.clone());
            let navigation = router.navigate(&path, true);

            if !navigation.found {
                eprintln!("No route for {}, rendered the not-found page", path);
            }

            if main_only {
                if let Some(main) = router.document().region(Region::Main) {
                    println!("{}", main);
                }
            } else {
                println!("{}", router.document().to_html());
            }
        }

        Commands::Params { path } => {
            let store = open_store(&config)?;
            let router = Router::new(store, config.shop.clone());
            let params = router.get_params(&path);

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&params)?);
            } else if params.is_empty() {
                println!("No parameters.");
            } else {
                for (name, value) in params {
                    println!("{} = {}", name, value);
                }
            }
        }

        Commands::Cart { action } => {
            let store = open_store(&config)?;
            let catalog = Catalog::builtin();

            match action {
                CartCommand::List => {}
                CartCommand::Add { id, quantity } => match catalog.find(id) {
                    Some(product) => store.add_to_cart(product, quantity),
                    None => {
                        eprintln!("Unknown product: {}", id);
                        std::process::exit(1);
                    }
                },
                CartCommand::Set { id, quantity } => store.update_cart_quantity(id, quantity),
                CartCommand::Remove { id } => store.remove_from_cart(id),
                CartCommand::Clear => store.clear_cart(),
            }

            let state = store.get_state();
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&state.cart)?);
            } else if state.cart.is_empty() {
                println!("Cart is empty.");
            } else {
                println!("{:<6} {:<50} {:>5} {:>12}", "ID", "Product", "Qty", "Total");
                println!("{}", "-".repeat(76));
                for item in &state.cart {
                    println!(
                        "{:<6} {:<50} {:>5} {:>12}",
                        item.id,
                        truncate(&item.name, 50),
                        item.quantity,
                        item.line_total().to_string()
                    );
                }
                println!("{}", "-".repeat(76));
                println!(
                    "{:<63} {:>12}",
                    format!("{} items", state.cart_count()),
                    state.cart_subtotal().to_string()
                );
            }
        }

        Commands::Wishlist { action } => {
            let store = open_store(&config)?;
            match action {
                WishlistCommand::List => {}
                WishlistCommand::Add { id } => store.add_to_wishlist(id),
                WishlistCommand::Remove { id } => store.remove_from_wishlist(id),
            }

            let catalog = Catalog::builtin();
            let wishlist = store.with_state(|s| s.wishlist.clone());
            if wishlist.is_empty() {
                println!("Wishlist is empty.");
            }
            for id in wishlist {
                let name = catalog.find(id).map(|p| p.name.as_str()).unwrap_or("-");
                println!("{:<6} {}", id, name);
            }
        }

        Commands::Login { email, password } => {
            let password = match password.or_else(|| std::env::var("CASAPETRADA_PASSWORD").ok()) {
                Some(p) => p,
                None => {
                    eprintln!("Pass --password or set CASAPETRADA_PASSWORD");
                    std::process::exit(1);
                }
            };

            let store = open_store(&config)?;
            match store.login_with_credentials(&email, &password).await {
                Ok(user) => println!("Signed in as {} <{}>", user.full_name(), user.email),
                Err(e) => {
                    eprintln!("Login failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Logout => {
            let store = open_store(&config)?;
            store.logout();
            println!("Signed out.");
        }

        Commands::Products { category, search } => {
            let backend = BackendClient::new(config.backend.client_config())?;
            let query = ProductQuery {
                category: category.clone(),
                search: search.clone(),
                ..Default::default()
            };

            let products: Vec<(u32, String, String)> = match backend.list_products(&query).await {
                Ok(list) => list
                    .products
                    .into_iter()
                    .map(casapetrada::Product::from)
                    .map(|p| (p.id, p.name, p.price.to_string()))
                    .collect(),
                Err(e) => {
                    eprintln!("Backend unavailable ({}), showing built-in catalog", e);
                    let catalog = Catalog::builtin();
                    let mut filter = casapetrada::catalog::ProductFilter::default();
                    filter.category = category;
                    filter.search = search;
                    catalog
                        .filter(&filter)
                        .into_iter()
                        .map(|p| (p.id, p.name.clone(), p.price.to_string()))
                        .collect()
                }
            };

            println!("{:<6} {:<60} {:>12}", "ID", "Name", "Price");
            println!("{}", "-".repeat(80));
            for (id, name, price) in products {
                println!("{:<6} {:<60} {:>12}", id, truncate(&name, 60), price);
            }
        }

        Commands::Status { url } => {
            let client = reqwest::Client::new();
            let response = client.get(format!("{}/health", url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Casa Petrada v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("Status:  {}", health["status"].as_str().unwrap_or("unknown"));
                    println!("Backend: {}", health["backend"].as_str().unwrap_or("unknown"));
                    println!("Storage: {}", health["storage"].as_str().unwrap_or("unknown"));
                    println!("Cart:    {} items", health["cart_items"].as_u64().unwrap_or(0));

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("Storefront returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to the storefront at {}", url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the storefront is running:");
                    eprintln!("  cargo run --bin casapetrada");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            if let Some(path) = output {
                std::fs::write(&path, &content)
                    .with_context(|| format!("writing {:?}", path))?;
                println!("Config written to {:?}", path);
            } else {
                println!("{}", content);
            }
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<Store> {
    let storage = Arc::new(
        FileStorage::in_dir(&config.storage.data_dir)
            .with_context(|| format!("opening data directory {}", config.storage.data_dir))?,
    );
    let backend = Arc::new(BackendClient::new(config.backend.client_config())?);
    Ok(Store::new(storage, backend))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max - 3).collect();
        format!("{}...", cut)
    }
}

fn format_duration(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
