//! # Certpost — Certificate Generation Service
//!
//! Once a minute, sweeps a spreadsheet of course-completion records,
//! renders a certificate PDF for each due row, emails it, and writes the
//! outcome back to the sheet. A small HTTP gateway reports liveness.
//!
//! Usage:
//!   certpost                # sweep loop + health gateway
//!   certpost --once         # run a single sweep and exit
//!   certpost --port 9000    # override the gateway port

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use certpost_channels::SmtpMailer;
use certpost_core::AppConfig;
use certpost_render::HtmlCertificateRenderer;
use certpost_scheduler::{SweepEngine, spawn_sweeper};
use certpost_sheets::GoogleSheetStore;

#[derive(Parser)]
#[command(
    name = "certpost",
    version,
    about = "📜 Certpost — course certificate generation and delivery"
)]
struct Cli {
    /// Health gateway port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Run a single sweep and exit
    #[arg(long)]
    once: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Configuration is fatal-at-startup: no sweeping with half a config.
    let mut config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    std::fs::create_dir_all(&config.render.output_dir)?;

    println!("📜 Certpost v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "   📄 Sheet:      {}",
        config
            .sheet
            .spreadsheet_id
            .as_deref()
            .unwrap_or(&config.sheet.spreadsheet_name)
    );
    println!("   📂 Output Dir: {}", config.render.output_dir.display());
    println!("   🕐 Timezone:   {}", config.timezone);
    println!(
        "   🌐 Gateway:    http://{}:{}",
        config.gateway.host, config.gateway.port
    );

    // Wire the gateways. Template/asset problems surface here, not mid-sweep.
    let store = Arc::new(GoogleSheetStore::new(
        config.google.clone(),
        config.sheet.clone(),
    ));
    let renderer =
        Arc::new(HtmlCertificateRenderer::new(&config.render).map_err(|e| anyhow::anyhow!("{e}"))?);
    let mailer = Arc::new(SmtpMailer::new(
        config.smtp.clone(),
        config.unsubscribe_link.clone(),
    ));
    let engine = Arc::new(SweepEngine::new(store, renderer, mailer, &config));

    if cli.once {
        let stats = engine.run_sweep().await.map_err(|e| anyhow::anyhow!("{e}"))?;
        println!(
            "📬 Sweep done: {} sent, {} failed, {} skipped, {} invalid",
            stats.sent, stats.failed, stats.skipped, stats.invalid
        );
        return Ok(());
    }

    let sweep_engine = engine.clone();
    let interval = config.sweep_interval_secs;
    tokio::spawn(async move { spawn_sweeper(sweep_engine, interval).await });

    certpost_gateway::start(&config.gateway, config.timezone).await
}
