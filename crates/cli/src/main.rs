//! Shopfront CLI - browse the catalog, fill the cart, and check out.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! shop products list
//! shop products show 3
//!
//! # Cart (kept in SHOPFRONT_DATA_DIR between runs)
//! shop cart add 3 --quantity 2
//! shop cart set 3 1
//! shop cart show
//!
//! # Shipping quote, optionally selecting an option
//! shop shipping 01310-100 --select 2
//!
//! # Checkout, then retry an unfinished order if needed
//! shop checkout --address 7
//! shop orders finish 42 --address 7
//!
//! # Admin
//! shop admin set-status 42 PAGO
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_API_URL` - backend base URL (required)
//! - `SHOPFRONT_API_TOKEN` - bearer token of the signed-in user
//! - `SHOPFRONT_DATA_DIR` - local storage directory (default `.shopfront`)
//! - `SHOPFRONT_TIMEOUT_SECS` - request timeout (default 30)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - error tracking

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_client::config::ClientConfig;
use shopfront_client::error::ClientError;
use shopfront_client::session::Shopfront;
use shopfront_core::{
    Address, AddressId, OrderId, OrderStatus, ProductId, Role, ShippingOptionId, UserId,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use commands::checkout::ShippingChoice;
use error::CliError;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Shopfront command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Edit the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Quote shipping for a postal code (CEP)
    Shipping {
        /// Postal code, with or without the dash
        cep: String,

        /// Select this option and show the cart total with shipping
        #[arg(short, long)]
        select: Option<ShippingOptionId>,
    },
    /// Place an order from the cart
    Checkout {
        /// Delivery address id (optional when only one is on file)
        #[arg(short, long)]
        address: Option<AddressId>,

        /// Quote shipping for this CEP before ordering
        #[arg(long, requires = "shipping")]
        cep: Option<String>,

        /// Shipping option to select from the quote
        #[arg(long, requires = "cep")]
        shipping: Option<ShippingOptionId>,

        /// Status requested when finalizing (default Concluído)
        #[arg(long)]
        final_status: Option<OrderStatus>,
    },
    /// Your orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Your address book
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Store administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List every product
    List,
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a product
    Add {
        id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line (0 removes it)
    Set {
        id: ProductId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List,
    /// Show one order
    Show { id: OrderId },
    /// Finish a pending order
    Finish {
        id: OrderId,

        #[arg(short, long)]
        address: Option<AddressId>,
    },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List your addresses
    List,
    /// Create an address, or update it with --id
    Save(AddressArgs),
    /// Delete an address
    Remove { id: AddressId },
}

#[derive(Args)]
struct AddressArgs {
    /// Update this address instead of creating one
    #[arg(long)]
    id: Option<AddressId>,

    /// Short name, e.g. "Home"
    #[arg(long, default_value = "")]
    description: String,

    #[arg(long)]
    zip_code: String,

    #[arg(long)]
    street: String,

    #[arg(long)]
    number: String,

    #[arg(long)]
    complement: Option<String>,

    #[arg(long)]
    neighborhood: String,

    #[arg(long)]
    city: String,

    /// Two-letter state code
    #[arg(long)]
    state: String,
}

impl From<AddressArgs> for Address {
    fn from(args: AddressArgs) -> Self {
        Self {
            id: args.id,
            description: args.description,
            zip_code: args.zip_code,
            street: args.street,
            number: args.number,
            complement: args.complement,
            neighborhood: args.neighborhood,
            city: args.city,
            state: args.state.to_uppercase(),
        }
    }
}

#[derive(Subcommand)]
enum AdminAction {
    /// List every order in the store
    Orders,
    /// Set an order's status
    SetStatus { id: OrderId, status: OrderStatus },
    /// List users
    Users,
    /// Replace a user's roles
    Grant {
        id: UserId,

        #[arg(short, long = "role", required = true)]
        roles: Vec<Role>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration is needed before tracing so Sentry can be wired in.
    let config = ClientConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_client=info,shopfront_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(ClientError::from(e).into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), CliError> {
    let mut session = Shopfront::from_config(config)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List => commands::products::list(&session).await?,
            ProductAction::Show { id } => commands::products::show(&session, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session),
            CartAction::Add { id, quantity } => {
                commands::cart::add(&mut session, id, quantity).await?;
            }
            CartAction::Set { id, quantity } => commands::cart::set(&mut session, id, quantity)?,
            CartAction::Remove { id } => commands::cart::remove(&mut session, id)?,
            CartAction::Clear => commands::cart::clear(&mut session),
        },
        Commands::Shipping { cep, select } => {
            commands::shipping::quote(&mut session, &cep, select).await?;
        }
        Commands::Checkout {
            address,
            cep,
            shipping,
            final_status,
        } => {
            let shipping_choice = cep
                .zip(shipping)
                .map(|(cep, option)| ShippingChoice { cep, option });
            commands::checkout::run(&mut session, address, shipping_choice, final_status).await?;
        }
        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list(&session).await?,
            OrderAction::Show { id } => commands::orders::show(&session, id).await?,
            OrderAction::Finish { id, address } => {
                commands::orders::finish(&mut session, id, address).await?;
            }
        },
        Commands::Address { action } => match action {
            AddressAction::List => commands::address::list(&session).await?,
            AddressAction::Save(args) => commands::address::save(&session, args.into()).await?,
            AddressAction::Remove { id } => commands::address::remove(&session, id).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Orders => commands::admin::orders(&session).await?,
            AdminAction::SetStatus { id, status } => {
                commands::admin::set_status(&session, id, status).await?;
            }
            AdminAction::Users => commands::admin::users(&session).await?,
            AdminAction::Grant { id, roles } => {
                commands::admin::grant(&session, id, &roles).await?;
            }
        },
    }
    Ok(())
}
