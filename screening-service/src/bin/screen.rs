//! Command-line watchlist screening
//!
//! Screens one name against a reference list CSV and prints the result
//! as JSON on stdout. Intended for operations spot checks; the
//! transaction pipeline calls the screener in process.

use anyhow::{bail, Context};
use aml_core::SystemClock;
use chrono::NaiveDate;
use screening_service::{CsvSource, Screener, ScreeningConfig, ScreeningQuery};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    // Initialize tracing on stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 || args.len() > 5 {
        bail!("usage: vigil-screen <list.csv> <first-name> <last-name> [YYYY-MM-DD] [country]");
    }

    let date_of_birth = args
        .get(3)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("bad date of birth {:?}, expected YYYY-MM-DD", raw))
        })
        .transpose()?;

    let query = ScreeningQuery {
        first_name: args[1].clone(),
        last_name: args[2].clone(),
        date_of_birth,
        country: args.get(4).cloned(),
    };

    let screener = Screener::with_sources(
        ScreeningConfig::default(),
        vec![Arc::new(CsvSource::new("cli", &args[0]))],
        Arc::new(SystemClock),
    );

    let result = screener
        .screen(&query)
        .with_context(|| format!("cannot screen {}", query.full_name()))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
