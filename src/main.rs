//! RateDesk CLI binary

use clap::Parser;
use ratedesk::cli::{app, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            loadboard_rate,
            offer,
            round,
            miles,
            prev_counter,
            anchor_high,
            policy,
        } => {
            app::evaluate(
                loadboard_rate,
                offer,
                round,
                miles,
                prev_counter,
                anchor_high,
                policy.as_deref(),
            )?;
        }

        Commands::Replay { script } => {
            app::replay(&script)?;
        }

        Commands::Policy { policy } => {
            app::print_policy(policy.as_deref())?;
        }
    }

    Ok(())
}
