use anyhow::Result;
use clap::Parser;

use pagerpost_core::config::PagerpostConfig;
use pagerpost_daemon::cli::DaemonCli;
use pagerpost_daemon::logging;
use pagerpost_daemon::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // file -> environment -> command line, then validate
    let mut config = PagerpostConfig::from_file(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
    config.apply_env_overrides();
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    if cli.validate {
        println!("configuration is valid: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "pagerpost-daemon starting"
    );

    let mut orchestrator = Orchestrator::build_from_config(config)?;
    let summary = orchestrator.run().await?;

    if summary.interrupted {
        // stdin reads sit on a blocking thread the runtime would wait for
        std::process::exit(0);
    }
    Ok(())
}
