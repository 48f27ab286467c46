use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ledger-node")]
#[command(version, about = "Ledger node peer transport with TLS trust anchors", long_about = None)]
#[command(author = "Ledger Node Team")]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize trust and dial every bootstrap peer (default mode)
    Run,

    /// Build the trust pool and report its roots
    CheckTrust,

    /// Dial a single peer
    Dial {
        #[arg(short, long, help = "Peer address (host:port)")]
        address: String,

        #[arg(short, long, help = "Expected server identity; defaults to the host")]
        server_name: Option<String>,
    },
}
