//! webping - measure network latency to a catalog of hosts
//!
//! Probes every host with TCP connects or HTTP requests in synchronized
//! waves, then prints the hosts ranked by average latency.

use clap::Parser;
use std::{io, process, sync::Arc};
use webping::{
    cli::Cli,
    client::{tls_supported, ClientIdentity, ProberFactory},
    config::{display_config_summary, load_config, EnvManager},
    dns::SystemResolver,
    error::{ErrorReporter, Result},
    executor::{ExecutionConfig, MeasurementEngine},
    logging::{LoggerFactory, ProbeLogger},
    models::Config,
    output::LatencyOutput,
    stats::rank,
    target::{TargetResolver, TargetTemplate, TokenGenerator},
    types::Verbosity,
    HostCatalog, BUILD_TIME, GIT_COMMIT, PKG_NAME, TARGET_TRIPLE, VERSION,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", VERSION);
        return;
    }

    let use_color = cli.use_colors();
    if let Err(e) = run_application(cli).await {
        ErrorReporter::new(use_color).report_error(&e);
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    let config = load_config(cli)?;
    let catalog = HostCatalog::from_config(&config)?;

    if config.verbosity == Verbosity::Regions {
        let output = LatencyOutput::new(Verbosity::Regions, config.repeats, false);
        output.show(&catalog.to_records(), &mut io::stdout())?;
        return Ok(());
    }

    let factory = LoggerFactory::new(config.clone());
    let logger = factory.create_logger("MAIN").await;
    logger.debug(&format!("{} v{} starting", PKG_NAME, VERSION))
        .field("build", format!("{} {} {}", GIT_COMMIT, TARGET_TRIPLE, BUILD_TIME))
        .field("config", display_config_summary(&config))
        .log()
        .await;
    for warning in EnvManager::validate_current_env() {
        logger.warn(&warning).log().await;
    }

    let mut engine = build_engine(&config, factory.create_probe_logger().await)?;
    let mut hosts = catalog.to_records();
    let report = engine.run(&mut hosts, config.repeats, config.check_mode()).await?;
    rank(&mut hosts);

    logger.debug("Run summary")
        .field("summary", &report.summary)
        .field("mode", report.mode.as_str())
        .field("probes", report.probe_invocations)
        .log()
        .await;

    let output = LatencyOutput::new(config.verbosity, config.repeats, config.enable_color);
    output.show(&hosts, &mut io::stdout())?;
    Ok(())
}

fn build_engine(config: &Config, probe_logger: ProbeLogger) -> Result<MeasurementEngine> {
    let mode = config.check_mode().negotiate(tls_supported());
    let identity = ClientIdentity::new(config.user_agent.clone());
    let prober = ProberFactory::for_mode(mode, &identity, config.probe_timeout())?;

    let resolver = TargetResolver::new(
        TargetTemplate::from_config(config),
        Arc::new(SystemResolver::new()),
        TokenGenerator::from_entropy(config.token_length),
    );

    Ok(MeasurementEngine::new(prober, resolver, probe_logger)
        .with_config(ExecutionConfig::from(config)))
}
