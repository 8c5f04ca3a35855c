use clap::{command, Parser, Subcommand};

// ///////////// //
// CLI interface //
// ///////////// //

/// cups2webhook - Reports idle/active state of CUPS printers to a webhook and powers them back on on demand.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify each configured printer as idle or active, record the state and report it to the idle webhook.
    Monitor,
    /// Trigger the power-on webhook and wait for the printer to accept connections.
    PowerOn,
}
