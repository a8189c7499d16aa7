//! Rates CLI
//!
//! Command-line interface for the currency rates gateway API.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use rates_client::RatesClient;

#[derive(Parser)]
#[command(name = "rates")]
#[command(author, version, about = "Currency rates gateway CLI client", long_about = None)]
struct Cli {
    /// Base URL of the rates API
    #[arg(long, env = "RATES_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Bearer token for authenticated endpoints
    #[arg(long, env = "RATES_API_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Obtain a JWT for the given credentials
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Latest rates for a base currency
    Latest {
        /// Base currency code (e.g. USD)
        base: String,
    },
    /// Convert an amount between two currencies (admin only)
    Convert {
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Historical rate series for a date range (admin only)
    History {
        /// Base currency code (e.g. USD)
        base: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "50")]
        page_size: u32,
    },
    /// Check API health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = RatesClient::new(&cli.api_url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Login { username, password } => {
            let token = client.login(&username, &password).await?;
            println!("{token}");
        }

        Commands::Latest { base } => {
            let rates = client.latest_rates(&base).await?;
            println!("{}", serde_json::to_string_pretty(&rates)?);
        }

        Commands::Convert { amount, from, to } => {
            let resp = client.convert(amount, &from, &to).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }

        Commands::History {
            base,
            start,
            end,
            page,
            page_size,
        } => {
            let series = client.history(&base, start, end, page, page_size).await?;
            println!("{}", serde_json::to_string_pretty(&series)?);
        }
    }

    Ok(())
}
