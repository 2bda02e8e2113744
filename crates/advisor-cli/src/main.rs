//! Stock advisory CLI
//!
//! # Usage
//!
//! ```bash
//! # Provider keys are read from the environment
//! export ALPHA_VANTAGE_API_KEY="..."
//! export NEWS_API_KEY="..."
//! export HF_API_KEY="..."
//!
//! # Ask for a recommendation
//! cargo run --bin advisor -p advisor-cli -- advise AAPL --question "good entry point?"
//!
//! # Fetch history with indicators and fundamentals
//! cargo run --bin advisor -p advisor-cli -- snapshot AAPL --days 250
//! ```

use advisor_core::{Advisor, AdvisorConfig, MarketSnapshot};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use std::env;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How many trailing indicator rows the snapshot table shows
const TABLE_ROWS: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "advisor")]
#[command(about = "Stock recommendation and indicator pipeline", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a Buy/Sell/Hold recommendation for a symbol
    Advise {
        /// Stock ticker symbol (e.g. AAPL)
        symbol: String,

        /// Optional question to put to the analyst model
        #[arg(short, long)]
        question: Option<String>,
    },

    /// Fetch daily history enriched with indicators and fundamentals
    Snapshot {
        /// Stock ticker symbol (e.g. AAPL)
        symbol: String,

        /// Number of trailing days to fetch
        #[arg(short, long, default_value_t = 250)]
        days: i64,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,advisor_core=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_indicator_table(snapshot: &MarketSnapshot) {
    let format_opt = |value: Option<f64>| {
        value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
    };

    let mut table = Table::new();
    table.set_header(vec![
        "Date", "Close", "SMA(14)", "EMA(14)", "RSI(14)", "MACD", "Signal",
    ]);

    let start = snapshot.bars.len().saturating_sub(TABLE_ROWS);
    for i in start..snapshot.bars.len() {
        let bar = &snapshot.bars[i];
        table.add_row(vec![
            bar.date.to_string(),
            format!("{:.2}", bar.close),
            format_opt(snapshot.indicators.sma[i]),
            format!("{:.2}", snapshot.indicators.ema[i]),
            format_opt(snapshot.indicators.rsi[i]),
            format!("{:.4}", snapshot.indicators.macd[i]),
            format!("{:.4}", snapshot.indicators.signal[i]),
        ]);
    }

    println!("{table}");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    if env::var("NEWS_API_KEY").is_err() {
        eprintln!("Warning: NEWS_API_KEY not set, news will degrade to the sentinel");
    }

    let config = AdvisorConfig::builder().with_env_keys().build()?;
    let advisor = Advisor::from_config(&config)?;

    match args.command {
        Command::Advise { symbol, question } => {
            info!("Requesting advice for {symbol}");
            let advice = advisor.advise(&symbol, question.as_deref()).await?;

            println!("{}", serde_json::to_string_pretty(&advice)?);
            println!();
            println!("{}", advice.decision);
        }
        Command::Snapshot { symbol, days } => {
            info!("Requesting {days}-day snapshot for {symbol}");
            let snapshot = advisor.snapshot(&symbol, days).await?;

            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            println!();
            print_indicator_table(&snapshot);
        }
    }

    Ok(())
}
