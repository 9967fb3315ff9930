//! Storefront client CLI

use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storefront::{cart::CartItem, confirmation::format_minor};
use storefront_app::{
    auth::AuthService,
    cart::CartStore,
    config::AppConfig,
    context::AppContext,
    session::{SessionState, token},
};

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront client CLI", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect or mutate the persisted cart
    Cart(CartCommand),

    /// Inspect or recover the persisted session
    Session(SessionCommand),
}

#[derive(Debug, Args)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Add a line to the cart
    Add(AddArgs),

    /// Print the cart
    List,

    /// Remove every line
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Backend product identifier
    #[arg(long)]
    product_id: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Unit price in minor currency units
    #[arg(long)]
    price: u64,

    /// Advertised pre-discount unit price
    #[arg(long)]
    market_price: Option<u64>,

    /// Product image URL
    #[arg(long, default_value = "")]
    image: String,

    /// Size variant
    #[arg(long)]
    size: String,

    /// Color variant
    #[arg(long)]
    color: String,

    /// Quantity
    #[arg(long, default_value = "1")]
    qty: u32,
}

#[derive(Debug, Args)]
struct SessionCommand {
    #[command(subcommand)]
    command: SessionSubcommand,
}

#[derive(Debug, Subcommand)]
enum SessionSubcommand {
    /// Show who is signed in and whether the token is live
    Status,

    /// Mint a new access token from the refresh cookie
    Refresh,

    /// Clear the local session
    Logout,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.config.log_level)),
        )
        .init();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let Cli { config, command } = cli;

    let ctx = AppContext::from_config(config)
        .map_err(|error| format!("failed to initialize: {error}"))?;

    match command {
        Commands::Cart(CartCommand { command }) => cart_command(&ctx, command),
        Commands::Session(SessionCommand { command }) => session_command(&ctx, command).await,
    }
}

fn cart_command(ctx: &AppContext, command: CartSubcommand) -> Result<(), String> {
    let mut cart = CartStore::load(ctx.store.clone())
        .map_err(|error| format!("failed to load cart: {error}"))?;

    match command {
        CartSubcommand::Add(args) => {
            cart.add(CartItem {
                product_id: args.product_id,
                name: args.name,
                price: args.price,
                market_price: args.market_price,
                image: args.image,
                size: args.size,
                color: args.color,
                qty: args.qty,
            })
            .map_err(|error| format!("failed to add line: {error}"))?;

            println!("{} line(s) in cart", cart.cart().len());
        }
        CartSubcommand::List => {
            for line in cart.cart().items() {
                println!(
                    "{} x {} [{}/{}] @ {}",
                    line.qty,
                    line.name,
                    line.size,
                    line.color,
                    format_minor(line.price)
                );
            }

            if cart.cart().is_empty() {
                println!("cart is empty");
            }
        }
        CartSubcommand::Clear => {
            cart.clear()
                .map_err(|error| format!("failed to clear cart: {error}"))?;

            println!("cart cleared");
        }
    }

    Ok(())
}

async fn session_command(ctx: &AppContext, command: SessionSubcommand) -> Result<(), String> {
    match command {
        SessionSubcommand::Status => {
            match ctx.session.current() {
                Some(session) => {
                    println!("signed in as {} <{}>", session.user.name, session.user.email);

                    match token::decode_expiry(&session.access_token) {
                        Ok(expiry) => println!("access token expires at {expiry}"),
                        Err(error) => println!("access token unusable: {error}"),
                    }

                    if ctx.session.state() == SessionState::Expired {
                        println!("session is locked pending refresh");
                    }
                }
                None => println!("signed out"),
            }

            Ok(())
        }
        SessionSubcommand::Refresh => {
            let auth = AuthService::new(ctx.api.clone(), ctx.session.clone());

            auth.refresh()
                .await
                .map_err(|error| format!("refresh failed: {error}"))?;

            println!("access token refreshed");

            Ok(())
        }
        SessionSubcommand::Logout => {
            let auth = AuthService::new(ctx.api.clone(), ctx.session.clone());

            auth.logout()
                .map_err(|error| format!("logout failed: {error}"))?;

            println!("signed out");

            Ok(())
        }
    }
}
