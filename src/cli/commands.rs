//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ratedesk")]
#[command(about = "RateDesk - carrier rate negotiation engine for freight brokers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a single carrier offer and print the decision as JSON
    Evaluate {
        /// Posted board rate for the load
        #[arg(short, long)]
        loadboard_rate: f64,

        /// Carrier's ask (0 = probe, no number yet)
        #[arg(short, long)]
        offer: f64,

        /// Negotiation round, 1-based
        #[arg(short, long, default_value = "1")]
        round: u32,

        /// Lane miles (widens tolerance on long lanes)
        #[arg(short, long)]
        miles: Option<f64>,

        /// Our previous counter, if any
        #[arg(long)]
        prev_counter: Option<f64>,

        /// Highest rate we have offered this session, if any
        #[arg(long)]
        anchor_high: Option<f64>,

        /// JSON policy file overriding the built-in defaults
        #[arg(short, long)]
        policy: Option<PathBuf>,
    },

    /// Replay a scripted negotiation through a session
    Replay {
        /// JSON script: { "loadboard_rate", "miles"?, "policy"?, "offers": [...] }
        script: PathBuf,
    },

    /// Print the effective policy as JSON
    Policy {
        /// JSON policy file overriding the built-in defaults
        #[arg(short, long)]
        policy: Option<PathBuf>,
    },
}
