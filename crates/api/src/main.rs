//! Tonggwan CLI - Main entry point
//!
//! Usage:
//! ```bash
//! tonggwan evaluate --value 220 --currency USD --origin US --method express
//! tonggwan evaluate --value 100 --category health_food --json
//! tonggwan library
//! tonggwan notices list --limit 10 --category 합산과세
//! tonggwan notices refresh
//! tonggwan reload
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tonggwan_api::dto::EvaluateRequest;
use tonggwan_api::{commands, AppContext};
use tonggwan_core::{RecipientType, ShippingMethod};
use tonggwan_notices::NoticeQuery;

#[derive(Parser)]
#[command(name = "tonggwan")]
#[command(author, version, about = "Tonggwan - customs duty, tax and risk evaluation", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(long, default_value = "./data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a shipment declaration
    Evaluate {
        /// Declared value in the declaration currency
        #[arg(long)]
        value: f64,
        /// Currency code (e.g. USD, KRW, JPY)
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Origin country code
        #[arg(long, default_value = "US")]
        origin: String,
        /// Shipping method
        #[arg(long, default_value = "express")]
        method: ShippingMethodArg,
        /// Recipient type
        #[arg(long, default_value = "personal")]
        recipient: RecipientTypeArg,
        /// Product category id
        #[arg(long, default_value = "general_goods")]
        category: String,
        /// Same-day combined shipments from one origin
        #[arg(long)]
        combined: bool,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the rule library, category profiles and exchange rates
    Library {
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Regulation notice operations
    Notices {
        #[command(subcommand)]
        action: NoticeAction,
    },

    /// Reload the rule snapshot from disk
    Reload,
}

#[derive(Subcommand)]
enum NoticeAction {
    /// List aggregated notices, newest first
    List {
        /// Maximum notices to show
        #[arg(long)]
        limit: Option<usize>,
        /// Filter by classified category or tag
        #[arg(long)]
        category: Option<String>,
        /// Filter by source id
        #[arg(long)]
        source: Option<String>,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the highest-risk recent notices
    Highlights {
        /// Maximum highlights to show
        #[arg(long)]
        limit: Option<usize>,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch every configured feed now
    Refresh {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Refresh periodically until interrupted
    Watch {
        /// Seconds between refresh passes (default from config)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShippingMethodArg {
    Express,
    Postal,
    Freight,
}

impl ShippingMethodArg {
    fn to_core_type(self) -> ShippingMethod {
        match self {
            ShippingMethodArg::Express => ShippingMethod::Express,
            ShippingMethodArg::Postal => ShippingMethod::Postal,
            ShippingMethodArg::Freight => ShippingMethod::Freight,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RecipientTypeArg {
    Personal,
    Business,
}

impl RecipientTypeArg {
    fn to_core_type(self) -> RecipientType {
        match self {
            RecipientTypeArg::Personal => RecipientType::Personal,
            RecipientTypeArg::Business => RecipientType::Business,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let ctx = AppContext::new(&cli.data_dir)?;

    match cli.command {
        Commands::Evaluate {
            value,
            currency,
            origin,
            method,
            recipient,
            category,
            combined,
            json,
        } => {
            let request = EvaluateRequest {
                declared_value: value,
                currency,
                origin_country: origin,
                shipping_method: method.to_core_type().to_string(),
                recipient_type: recipient.to_core_type().to_string(),
                product_category: category,
                same_day_combined: combined,
            };
            commands::evaluate(&ctx, request, json)?;
        }

        Commands::Library { json } => {
            commands::rule_library(&ctx, json)?;
        }

        Commands::Notices { action } => match action {
            NoticeAction::List {
                limit,
                category,
                source,
                json,
            } => {
                let query = NoticeQuery {
                    category,
                    source,
                    limit,
                };
                commands::list_notices(&ctx, &query, json)?;
            }

            NoticeAction::Highlights { limit, json } => {
                commands::notice_highlights(&ctx, limit, json)?;
            }

            NoticeAction::Refresh { json } => {
                commands::refresh_notices(&ctx, json).await?;
            }

            NoticeAction::Watch { interval_secs } => {
                commands::watch_notices(&ctx, interval_secs).await?;
            }
        },

        Commands::Reload => {
            commands::reload_snapshot(&ctx)?;
        }
    }

    Ok(())
}
