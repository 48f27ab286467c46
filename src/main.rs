mod app;
mod cli;
mod config;

use app::LedgerNode;
use clap::Parser;
use cli::{Cli, Commands};
use config::AppConfig;
use ledger_network::DialTarget;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXPIRY_REPORT_WINDOW: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[tokio::main]
async fn main() {
    // Install default crypto provider for rustls before any TLS operations
    let _ = rustls::crypto::ring::default_provider().install_default();

    if let Err(e) = run().await {
        error!("Application error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            return Err(e);
        }
    };
    init_tracing(&config.logging.level);

    info!("Configuration loaded successfully");
    info!("  Node:        {}", config.node.name);
    info!("  TLS:         {}", config.tls.enabled);
    info!("  Client auth: {}", config.tls.client_auth_enabled);
    info!("  Key store:   {}", config.keystore.root_dir);

    match cli.command {
        Some(Commands::Run) | None => run_node(config).await,
        Some(Commands::CheckTrust) => check_trust(config),
        Some(Commands::Dial {
            address,
            server_name,
        }) => dial_peer(config, address, server_name).await,
    }
}

async fn run_node(config: AppConfig) -> anyhow::Result<()> {
    let node = LedgerNode::new(config)?;
    info!("Starting ledger node: {}", node.name());

    let results = node.dial_bootstrap_peers().await;
    if results.is_empty() {
        warn!("No bootstrap peers configured");
        return Ok(());
    }

    let mut connected = 0;
    for (target, result) in &results {
        match result {
            Ok(channel) => {
                connected += 1;
                info!(
                    "Peer {} ({}) reachable, secure={}",
                    target.expected_identity,
                    target.address,
                    channel.is_secure()
                );
            }
            Err(e) => error!(
                "Peer {} ({}) unreachable: {}",
                target.expected_identity, target.address, e
            ),
        }
    }

    info!("Connected to {}/{} bootstrap peers", connected, results.len());
    Ok(())
}

fn check_trust(config: AppConfig) -> anyhow::Result<()> {
    let node = LedgerNode::new(config)?;

    println!("\n🔒 Trust Anchor");
    println!("─────────────────────────────────────");
    println!("  Secure transport: {}", node.trust_anchor().secure_transport_required);
    println!("  Mutual auth:      {}", node.trust_anchor().mutual_auth_required);
    if let Some(identity) = node.client_identity() {
        println!(
            "  Client identity:  {} ({} cert(s))",
            identity.subject().unwrap_or_else(|| "<unparsable>".to_string()),
            identity.cert_chain().len()
        );
    }

    let Some(pool) = node.trust_pool() else {
        println!("  Trust pool:       disabled");
        return Ok(());
    };

    println!("  Trust pool:       {} root(s)", pool.len());
    for subject in pool.subjects() {
        println!("    - {}", subject);
    }

    let expiring = pool.expiring_within(EXPIRY_REPORT_WINDOW);
    if !expiring.is_empty() {
        println!("\n⚠️  Expired or expiring within 30 days:");
        for subject in expiring {
            println!("    - {}", subject);
        }
    }

    Ok(())
}

async fn dial_peer(
    config: AppConfig,
    address: String,
    server_name: Option<String>,
) -> anyhow::Result<()> {
    let node = LedgerNode::new(config)?;

    let server_name = match server_name {
        Some(name) => name,
        None => address
            .rsplit_once(':')
            .map(|(host, _)| host.trim_matches(&['[', ']'][..]).to_string())
            .unwrap_or_else(|| address.clone()),
    };
    let target = DialTarget::new(address, server_name);

    let channel = node.dial(&target).await?;

    println!("\n📡 Dial Result");
    println!("─────────────────────────────────────");
    println!("  Address:     {}", target.address);
    println!("  Server name: {}", target.expected_identity);
    println!("  Peer addr:   {}", channel.peer_addr()?);
    println!("  Secure:      {}", channel.is_secure());
    if let Some(certs) = channel.peer_certificates() {
        println!("  Peer chain:  {} certificate(s)", certs.len());
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
