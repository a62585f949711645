//! Benchmark runner: drives every case through the sweeps and exports the
//! collected figures.
//!
//! The clock check happens before any scheduling state is touched. The
//! whole case loop then runs under one [`AffinityOptimizer`]; each sweep
//! adds its own priority scope inside [`Sweeper`].

use crate::config::BenchConfig;
use crate::error::Result;
use crate::measure::{BulkResult, ChunkResult, Sweeper};
use crate::registry::BenchmarkCase;

use super::clock::ensure_high_resolution;
use super::cpu_affinity::{AffinityOptimizer, NativeAffinity};
use super::optimizer::{AffinityBackend, PriorityBackend};
use super::priority::NativePriority;
use super::tui::{framed_title, Report};

/// Which sweeps to run for every case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub bulk: bool,
    pub chunks: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            bulk: true,
            chunks: true,
        }
    }
}

/// Everything measured for one case.
#[derive(Clone, Debug)]
pub struct CaseResult {
    pub name: &'static str,
    pub bulk: Option<BulkResult>,
    pub chunks: Option<ChunkResult>,
}

/// Run `cases` in order on the native scheduler.
pub fn run_benchmarks(
    cases: &[BenchmarkCase],
    config: &BenchConfig,
    options: RunOptions,
    report: &mut dyn Report,
) -> Result<Vec<CaseResult>> {
    run_benchmarks_with(cases, config, options, report, NativeAffinity, NativePriority)
}

/// Run `cases` in order using the given scheduling backends.
pub fn run_benchmarks_with<A, P>(
    cases: &[BenchmarkCase],
    config: &BenchConfig,
    options: RunOptions,
    report: &mut dyn Report,
    affinity: A,
    priority: P,
) -> Result<Vec<CaseResult>>
where
    A: AffinityBackend,
    P: PriorityBackend + Clone,
{
    config.validate()?;
    ensure_high_resolution()?;

    let _affinity = AffinityOptimizer::acquire_with(affinity);
    let mut sweeper = Sweeper::with_backend(config, priority);
    let mut results = Vec::with_capacity(cases.len());

    for (idx, case) in cases.iter().enumerate() {
        tracing::info!(hash = case.name, "running benchmark case");

        if idx > 0 {
            report.blank();
        }
        for line in framed_title(case.name) {
            report.line(&line);
        }
        report.blank();

        let bulk = options.bulk.then(|| sweeper.bulk(case.factory, report));
        if options.bulk && options.chunks {
            report.blank();
        }
        let chunks = options.chunks.then(|| sweeper.chunks(case.factory, report));

        results.push(CaseResult {
            name: case.name,
            bulk,
            chunks,
        });
    }

    Ok(results)
}

/// Export measured figures to a CSV file
pub fn export_csv(path: &str, results: &[CaseResult]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_csv(&mut file, results)
}

fn write_csv<W: std::io::Write>(out: &mut W, results: &[CaseResult]) -> std::io::Result<()> {
    writeln!(out, "hash,test,label,bytes_per_second")?;

    let speed = |value: Option<f64>| value.map(|v| format!("{:.3}", v)).unwrap_or_default();

    for case in results {
        if let Some(bulk) = &case.bulk {
            for alignment in &bulk.alignments {
                writeln!(
                    out,
                    "{},bulk,alignment-{},{}",
                    case.name,
                    alignment.alignment,
                    speed(alignment.speed)
                )?;
            }
            writeln!(out, "{},bulk,overall,{}", case.name, speed(bulk.overall))?;
        }

        if let Some(chunks) = &case.chunks {
            for band in &chunks.bands {
                writeln!(
                    out,
                    "{},chunks,{}-{},{}",
                    case.name,
                    band.start,
                    band.end.saturating_sub(1),
                    speed(band.speed)
                )?;
            }
            writeln!(out, "{},chunks,overall,{}", case.name, speed(chunks.overall))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChunkBand, Increment};
    use crate::error::BenchError;
    use crate::hashes::available_cases;
    use crate::measure::{AlignmentSpeed, BandResult};
    use crate::utils::clock::is_high_resolution;
    use crate::utils::optimizer::fake::{FakeScheduler, FakeState};

    fn small_config() -> BenchConfig {
        BenchConfig {
            key_length: 512,
            repetitions: 20,
            warmup_iterations: 1,
            seed: 7,
            chunk_bands: vec![
                ChunkBand::new(Increment::Add(4), 16, 10),
                ChunkBand::new(Increment::Double, 64, 10),
            ],
            ..BenchConfig::default()
        }
    }

    /// Run against a fake scheduler. On a coarse clock the run must fail
    /// with the clock error and leave the scheduler untouched; `None` is
    /// returned so the caller skips its measurement assertions.
    fn run_or_clock_error(
        cases: &[BenchmarkCase],
        config: &BenchConfig,
        options: RunOptions,
        report: &mut Vec<String>,
        fake: &FakeScheduler,
    ) -> Option<Vec<CaseResult>> {
        let before = fake.snapshot();
        let outcome =
            run_benchmarks_with(cases, config, options, &mut *report, fake.clone(), fake.clone());

        if is_high_resolution() {
            Some(outcome.expect("run should succeed"))
        } else {
            eprintln!("skipping measurement assertions: clock is not high resolution");
            assert!(matches!(outcome, Err(BenchError::ClockResolution { .. })));
            assert!(report.is_empty());
            assert_eq!(fake.snapshot(), before);
            None
        }
    }

    #[test]
    fn test_run_restores_scheduler_state() {
        let cases: Vec<BenchmarkCase> = available_cases().into_iter().take(2).collect();
        let fake = FakeScheduler::new(FakeState::default());
        let before = fake.snapshot();
        let mut report: Vec<String> = Vec::new();

        let Some(results) = run_or_clock_error(
            &cases,
            &small_config(),
            RunOptions::default(),
            &mut report,
            &fake,
        ) else {
            return;
        };

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.bulk.is_some() && r.chunks.is_some()));
        assert_eq!(fake.snapshot(), before);

        assert_eq!(report[1], format!("# HASH: {} #", cases[0].name));
        assert!(report.iter().any(|l| l == "[BULK SPEED TEST]"));
        assert!(report.iter().any(|l| l == "[CHUNKS SPEED TEST]"));
    }

    #[test]
    fn test_skipped_sweeps_are_absent() {
        let cases: Vec<BenchmarkCase> = available_cases().into_iter().take(1).collect();
        let fake = FakeScheduler::new(FakeState::default());
        let mut report: Vec<String> = Vec::new();

        let Some(results) = run_or_clock_error(
            &cases,
            &small_config(),
            RunOptions {
                bulk: false,
                chunks: true,
            },
            &mut report,
            &fake,
        ) else {
            return;
        };

        assert!(results[0].bulk.is_none());
        assert!(results[0].chunks.is_some());
        assert!(!report.iter().any(|l| l == "[BULK SPEED TEST]"));
    }

    #[test]
    fn test_zero_key_length_yields_empty_bulk() {
        let cases: Vec<BenchmarkCase> = available_cases().into_iter().take(1).collect();
        let fake = FakeScheduler::new(FakeState::default());
        let config = BenchConfig {
            key_length: 0,
            ..small_config()
        };
        let mut report: Vec<String> = Vec::new();

        let Some(results) = run_or_clock_error(
            &cases,
            &config,
            RunOptions {
                bulk: true,
                chunks: false,
            },
            &mut report,
            &fake,
        ) else {
            return;
        };

        let bulk = results[0].bulk.as_ref().expect("bulk sweep should run");
        assert_eq!(bulk.key_length, 0);
        assert_eq!(bulk.alignments.len(), 8);
        assert!(bulk.alignments.iter().all(|a| a.speed.is_none()));
        assert_eq!(bulk.overall, None);
        assert!(report.iter().any(|l| l == " - Average Speed Overall: n/a"));
    }

    #[test]
    fn test_invalid_config_touches_nothing() {
        let fake = FakeScheduler::new(FakeState::default());
        let before = fake.snapshot();
        let config = BenchConfig {
            chunk_bands: Vec::new(),
            ..small_config()
        };
        let mut report: Vec<String> = Vec::new();

        let err = run_benchmarks_with(
            &available_cases(),
            &config,
            RunOptions::default(),
            &mut report,
            fake.clone(),
            fake.clone(),
        )
        .unwrap_err();

        assert!(matches!(err, BenchError::InvalidConfig(_)));
        assert!(report.is_empty());
        assert_eq!(fake.snapshot(), before);
    }

    #[test]
    fn test_csv_rows() {
        let results = vec![CaseResult {
            name: "FNV-1a-32",
            bulk: Some(BulkResult {
                key_length: 1024,
                repetitions: 10,
                alignments: vec![
                    AlignmentSpeed {
                        alignment: 0,
                        speed: Some(1000.0),
                    },
                    AlignmentSpeed {
                        alignment: 1,
                        speed: None,
                    },
                ],
                overall: Some(1000.0),
            }),
            chunks: None,
        }];

        let mut out = Vec::new();
        write_csv(&mut out, &results).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "hash,test,label,bytes_per_second",
                "FNV-1a-32,bulk,alignment-0,1000.000",
                "FNV-1a-32,bulk,alignment-1,",
                "FNV-1a-32,bulk,overall,1000.000",
            ]
        );
    }

    #[test]
    fn test_csv_empty_band_label() {
        let results = vec![CaseResult {
            name: "DummyHash",
            bulk: None,
            chunks: Some(ChunkResult {
                bands: vec![BandResult {
                    start: 0,
                    end: 0,
                    increment: Increment::Add(1),
                    repetitions: 2,
                    points: 0,
                    speed: None,
                }],
                points: 0,
                overall: None,
            }),
        }];

        let mut out = Vec::new();
        write_csv(&mut out, &results).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.lines().any(|l| l == "DummyHash,chunks,0-0,"));
        assert!(text.lines().any(|l| l == "DummyHash,chunks,overall,"));
    }
}
