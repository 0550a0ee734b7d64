//! Measurement engine
//!
//! Runs `repeats` waves over the host list. Each wave spawns one task per host
//! into a `JoinSet` and joins all of them before the next wave starts. Tasks
//! own their inputs and hand back an indexed outcome; host records are only
//! touched by the engine between waves.

use crate::{
    client::{tls_supported, Prober},
    dns::HostResolver,
    error::{AppError, Result},
    logging::ProbeLogger,
    models::{Config, HostRecord},
    stats::RunSummary,
    target::{resolve_tcp, Target, TargetResolver, TargetTemplate},
    types::CheckMode,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::task::JoinSet;

/// Engine settings that do not change between runs
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Deadline for a single probe, `None` for no deadline
    pub probe_timeout: Option<Duration>,
    /// Whether HTTPS can be used; otherwise HTTPS requests fall back to HTTP
    pub tls_available: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Some(crate::defaults::DEFAULT_TIMEOUT),
            tls_available: tls_supported(),
        }
    }
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        Self {
            probe_timeout: config.probe_timeout(),
            tls_available: tls_supported(),
        }
    }
}

/// What happened during one measurement run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Mode actually used after TLS negotiation
    pub mode: CheckMode,
    pub waves: u32,
    /// Calls made to the prober
    pub probe_invocations: usize,
    pub elapsed: Duration,
    pub summary: RunSummary,
}

/// Result of one host's attempt in one wave
#[derive(Debug)]
struct ProbeOutcome {
    index: usize,
    result: Result<Duration>,
    /// Target found by a retried lookup, cached for later waves
    resolved: Option<Target>,
    probed: bool,
}

impl ProbeOutcome {
    fn skipped(index: usize, error: AppError) -> Self {
        Self {
            index,
            result: Err(error),
            resolved: None,
            probed: false,
        }
    }
}

/// Everything a wave task needs, owned by the task
enum TaskInput {
    Ready(Target),
    /// TCP host whose lookup failed; retried inside the task
    Unresolved {
        dns: Arc<dyn HostResolver>,
        template: TargetTemplate,
        host_id: String,
    },
    /// HTTP host whose URL could not be built
    Unavailable(AppError),
}

/// Drives probes over a host list in synchronized waves
pub struct MeasurementEngine {
    prober: Arc<dyn Prober>,
    resolver: TargetResolver,
    logger: ProbeLogger,
    config: ExecutionConfig,
}

impl MeasurementEngine {
    pub fn new(prober: Arc<dyn Prober>, resolver: TargetResolver, logger: ProbeLogger) -> Self {
        Self {
            prober,
            resolver,
            logger,
            config: ExecutionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Measure every host `repeats` times in `mode`.
    ///
    /// Per-host failures are stored on the records and never fail the run.
    /// Wave `w + 1` starts only after every task of wave `w` has finished.
    pub async fn run(
        &mut self,
        hosts: &mut [HostRecord],
        repeats: u32,
        mode: CheckMode,
    ) -> Result<RunReport> {
        if repeats == 0 {
            return Err(AppError::validation("Repeats must be greater than 0"));
        }

        let started = Instant::now();
        let mode = self.negotiate(mode).await;
        self.logger.log_run_start(mode, hosts.len(), repeats).await;

        self.resolve_targets(hosts, mode).await;

        let mut probe_invocations = 0;
        for wave in 1..=repeats {
            let wave_started = Instant::now();
            let outcomes = self.run_wave(hosts, mode).await;

            let mut successes = 0;
            let mut failures = 0;
            for outcome in outcomes {
                if outcome.probed {
                    probe_invocations += 1;
                }

                let host = &mut hosts[outcome.index];
                self.logger.log_probe(host.name(), wave, &outcome.result).await;

                if let Some(target) = outcome.resolved {
                    host.set_target(target);
                }
                match outcome.result {
                    Ok(duration) => {
                        host.record_sample(duration);
                        successes += 1;
                    }
                    Err(error) => {
                        host.record_failure(error);
                        failures += 1;
                    }
                }
            }

            self.logger
                .log_wave_complete(wave, successes, failures, wave_started.elapsed())
                .await;
        }

        let elapsed = started.elapsed();
        self.logger.log_run_complete(probe_invocations, elapsed).await;

        Ok(RunReport {
            mode,
            waves: repeats,
            probe_invocations,
            elapsed,
            summary: RunSummary::from_hosts(hosts),
        })
    }

    async fn negotiate(&self, requested: CheckMode) -> CheckMode {
        let mode = requested.negotiate(self.config.tls_available);
        if mode != requested {
            self.logger.log_mode_downgrade(requested, mode).await;
        }
        mode
    }

    async fn resolve_targets(&mut self, hosts: &mut [HostRecord], mode: CheckMode) {
        for host in hosts.iter_mut() {
            host.set_check_mode(mode);

            let result = self.resolver.resolve(host.host_id(), mode).await;
            let logged = result.as_ref().map(ToString::to_string).map_err(AppError::clone);
            self.logger.log_resolution(host.name(), &logged).await;

            match result {
                Ok(target) => host.set_target(target),
                Err(error) => host.set_resolution_error(error),
            }
        }
    }

    fn task_input(&self, host: &HostRecord, mode: CheckMode) -> TaskInput {
        if let Some(target) = host.target() {
            return TaskInput::Ready(target.clone());
        }

        match mode {
            CheckMode::Tcp => TaskInput::Unresolved {
                dns: self.resolver.dns(),
                template: self.resolver.template().clone(),
                host_id: host.host_id().to_string(),
            },
            CheckMode::Http | CheckMode::Https => TaskInput::Unavailable(
                host.last_error()
                    .cloned()
                    .unwrap_or_else(|| AppError::internal(format!("no target for {}", host.name()))),
            ),
        }
    }

    async fn run_wave(&self, hosts: &[HostRecord], mode: CheckMode) -> Vec<ProbeOutcome> {
        let mut tasks = JoinSet::new();
        for (index, host) in hosts.iter().enumerate() {
            let input = self.task_input(host, mode);
            let prober = Arc::clone(&self.prober);
            tasks.spawn(probe_task(index, input, prober, self.config.probe_timeout));
        }

        // Barrier: every task of this wave is joined here
        let mut slots: Vec<Option<ProbeOutcome>> = hosts.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    let index = outcome.index;
                    slots[index] = Some(outcome);
                }
                Err(error) => {
                    self.logger
                        .logger()
                        .error("Probe task failed")
                        .correlation_id(self.logger.run_id())
                        .field("error", error.to_string())
                        .log()
                        .await;
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| ProbeOutcome::skipped(index, AppError::internal("probe task failed")))
            })
            .collect()
    }
}

async fn probe_task(
    index: usize,
    input: TaskInput,
    prober: Arc<dyn Prober>,
    probe_timeout: Option<Duration>,
) -> ProbeOutcome {
    let (target, resolved) = match input {
        TaskInput::Ready(target) => (target, None),
        TaskInput::Unresolved { dns, template, host_id } => {
            match resolve_tcp(dns.as_ref(), &template, &host_id).await {
                Ok(target) => (target.clone(), Some(target)),
                Err(error) => return ProbeOutcome::skipped(index, error),
            }
        }
        TaskInput::Unavailable(error) => return ProbeOutcome::skipped(index, error),
    };

    // The prober runs in its own task so a panic is charged to this attempt
    let authority = target.authority();
    let call = tokio::spawn(async move { prober.probe(&target).await });
    let abort = call.abort_handle();

    let joined = match probe_timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(joined) => joined,
            Err(_) => {
                abort.abort();
                Ok(Err(AppError::timeout(format!(
                    "no response from {} within {} ms",
                    authority,
                    limit.as_millis()
                ))))
            }
        },
        None => call.await,
    };
    let result = joined
        .unwrap_or_else(|e| Err(AppError::internal(format!("probe of {} failed: {}", authority, e))));

    ProbeOutcome {
        index,
        result,
        resolved,
        probed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::StaticResolver;
    use crate::target::TokenGenerator;
    use async_trait::async_trait;
    use std::net::{IpAddr, Ipv4Addr};

    struct FixedProber(Duration);

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, _target: &Target) -> Result<Duration> {
            Ok(self.0)
        }

        fn mode(&self) -> CheckMode {
            CheckMode::Tcp
        }
    }

    struct PanickingProber;

    #[async_trait]
    impl Prober for PanickingProber {
        async fn probe(&self, target: &Target) -> Result<Duration> {
            panic!("no route to {}", target)
        }

        fn mode(&self) -> CheckMode {
            CheckMode::Tcp
        }
    }

    struct HangingProber;

    #[async_trait]
    impl Prober for HangingProber {
        async fn probe(&self, _target: &Target) -> Result<Duration> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Duration::ZERO)
        }

        fn mode(&self) -> CheckMode {
            CheckMode::Tcp
        }
    }

    fn engine(prober: Arc<dyn Prober>, dns: StaticResolver, config: ExecutionConfig) -> MeasurementEngine {
        let resolver = TargetResolver::new(
            TargetTemplate::default(),
            Arc::new(dns),
            TokenGenerator::seeded(5, 13),
        );
        MeasurementEngine::new(prober, resolver, ProbeLogger::silent()).with_config(config)
    }

    fn localhost_dns(ids: &[&str]) -> StaticResolver {
        ids.iter().fold(StaticResolver::new(), |dns, id| {
            dns.with_entry(*id, IpAddr::V4(Ipv4Addr::LOCALHOST))
        })
    }

    #[tokio::test]
    async fn test_zero_repeats_rejected() {
        let mut engine = engine(
            Arc::new(FixedProber(Duration::from_millis(1))),
            StaticResolver::new(),
            ExecutionConfig::default(),
        );
        let mut hosts = vec![HostRecord::new("A", "a")];
        let result = engine.run(&mut hosts, 0, CheckMode::Tcp).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_host_list() {
        let mut engine = engine(
            Arc::new(FixedProber(Duration::from_millis(1))),
            StaticResolver::new(),
            ExecutionConfig::default(),
        );
        let report = engine.run(&mut [], 3, CheckMode::Tcp).await.unwrap();
        assert_eq!(report.probe_invocations, 0);
        assert_eq!(report.summary.host_count, 0);
    }

    #[tokio::test]
    async fn test_samples_and_attempts_add_up() {
        let mut engine = engine(
            Arc::new(FixedProber(Duration::from_millis(7))),
            localhost_dns(&["a", "b"]),
            ExecutionConfig::default(),
        );
        let mut hosts = vec![HostRecord::new("A", "a"), HostRecord::new("B", "b")];
        let report = engine.run(&mut hosts, 4, CheckMode::Tcp).await.unwrap();

        assert_eq!(report.waves, 4);
        assert_eq!(report.probe_invocations, 8);
        for host in &hosts {
            assert_eq!(host.samples().len(), 4);
            assert_eq!(host.attempts(), 4);
            assert_eq!(host.check_mode(), CheckMode::Tcp);
            assert_eq!(host.latency_display(), "7.00 ms");
        }
    }

    #[tokio::test]
    async fn test_timeout_is_recorded_within_the_wave() {
        let config = ExecutionConfig {
            probe_timeout: Some(Duration::from_millis(50)),
            tls_available: true,
        };
        let mut engine = engine(Arc::new(HangingProber), localhost_dns(&["slow"]), config);
        let mut hosts = vec![HostRecord::new("Slow", "slow")];

        let report = engine.run(&mut hosts, 2, CheckMode::Tcp).await.unwrap();
        assert_eq!(report.probe_invocations, 2);
        assert_eq!(hosts[0].failures(), 2);
        assert!(matches!(hosts[0].last_error(), Some(AppError::Timeout(_))));
        assert!(hosts[0].average_ms().is_nan());
    }

    #[tokio::test]
    async fn test_panicking_prober_counts_as_invoked() {
        let mut engine = engine(
            Arc::new(PanickingProber),
            localhost_dns(&["a"]),
            ExecutionConfig::default(),
        );
        let mut hosts = vec![HostRecord::new("A", "a")];

        let report = engine.run(&mut hosts, 2, CheckMode::Tcp).await.unwrap();
        assert_eq!(report.probe_invocations, 2);
        assert_eq!(hosts[0].failures(), 2);
        assert!(matches!(hosts[0].last_error(), Some(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_https_downgrades_without_tls() {
        let config = ExecutionConfig {
            probe_timeout: None,
            tls_available: false,
        };
        let mut engine = engine(Arc::new(FixedProber(Duration::from_millis(3))), StaticResolver::new(), config);
        let mut hosts = vec![HostRecord::new("A", "a")];

        let report = engine.run(&mut hosts, 1, CheckMode::Https).await.unwrap();
        assert_eq!(report.mode, CheckMode::Http);
        assert_eq!(hosts[0].check_mode(), CheckMode::Http);
        let url = hosts[0].target().and_then(Target::url).unwrap();
        assert_eq!(url.scheme(), "http");
    }
}
