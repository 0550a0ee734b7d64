//! Benchmarks for the CPU-side work of a run: averaging, ranking,
//! listing layout and configuration parsing

use clap::Parser;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::{collections::HashMap, hint::black_box, time::Duration};
use webping::{
    cli::Cli,
    config::ConfigParser,
    output::LatencyOutput,
    stats::{average_ms, rank},
    AppError, HostRecord, TargetTemplate, TokenGenerator, Verbosity,
};

/// Hosts with a spread of averages; every tenth one never answered
fn measured_hosts(count: usize, repeats: u32) -> Vec<HostRecord> {
    (0..count)
        .map(|i| {
            let mut host = HostRecord::new(format!("Region {}", i), format!("latency-{}", i));
            for attempt in 0..repeats {
                if i % 10 == 0 {
                    host.record_failure(AppError::connect("connection refused"));
                } else {
                    let ms = 10 + (i as u64 * 37 + attempt as u64 * 11) % 400;
                    host.record_sample(Duration::from_millis(ms));
                }
            }
            host
        })
        .collect()
}

fn benchmark_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    for size in [10usize, 100, 1000].iter() {
        let samples: Vec<Duration> = (0..*size).map(|i| Duration::from_micros(i as u64 * 173)).collect();
        group.bench_with_input(BenchmarkId::new("average_ms", size), &samples, |b, samples| {
            b.iter(|| average_ms(black_box(samples)))
        });

        let hosts = measured_hosts(*size, 5);
        group.bench_with_input(BenchmarkId::new("rank", size), &hosts, |b, hosts| {
            b.iter(|| {
                let mut hosts = hosts.clone();
                rank(black_box(&mut hosts));
                hosts
            })
        });
    }

    group.finish();
}

fn benchmark_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("output");
    let mut hosts = measured_hosts(50, 10);
    rank(&mut hosts);

    for verbosity in [Verbosity::Summary, Verbosity::Detailed, Verbosity::Breakdown] {
        let name = format!("{:?}", verbosity).to_lowercase();
        let plain = LatencyOutput::new(verbosity, 10, false);
        group.bench_function(format!("{}_plain", name), |b| b.iter(|| plain.render(black_box(&hosts))));

        let colored = LatencyOutput::new(verbosity, 10, true);
        group.bench_function(format!("{}_colored", name), |b| b.iter(|| colored.render(black_box(&hosts))));
    }

    group.finish();
}

fn benchmark_targets(c: &mut Criterion) {
    let mut group = c.benchmark_group("targets");
    let template = TargetTemplate {
        domain_suffix: Some("latency.example.net".to_string()),
        ..TargetTemplate::default()
    };
    let mut tokens = TokenGenerator::seeded(7, 13);

    group.bench_function("next_token", |b| b.iter(|| tokens.next_token()));
    group.bench_function("build_url", |b| {
        b.iter(|| template.url(black_box("latency-ew1"), webping::CheckMode::Https, "abcdefghijklm"))
    });

    group.finish();
}

fn benchmark_config_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("config");
    let env: HashMap<String, String> = [
        ("WEBPING_REPEATS", "5"),
        ("WEBPING_TCP_PORT", "8080"),
        ("WEBPING_DOMAIN_SUFFIX", "latency.example.net"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    group.bench_function("parse_cli_args", |b| {
        b.iter(|| {
            Cli::parse_from(black_box([
                "webping", "--repeats", "3", "--https", "--verbose", "2", "--host", "Ireland=latency-ew1",
            ]))
        })
    });

    let cli = Cli::parse_from(["webping", "--repeats", "3", "--host", "Ireland=latency-ew1"]);
    let parser = ConfigParser::new(cli);
    group.bench_function("layered_config", |b| {
        b.iter(|| parser.parse_with_lookup(|key| env.get(key).cloned()))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_statistics,
    benchmark_output,
    benchmark_targets,
    benchmark_config_parsing
);
criterion_main!(benches);
