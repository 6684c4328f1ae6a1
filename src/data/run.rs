use crate::core::{Evaluator, EvaluatorConfig};
use crate::data::{read_instance, read_solution};
use anyhow::{anyhow, ensure, Context};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::path::Path;

/// Report of evaluating a directory of samples.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    penalty: u64,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
    const fn new(penalty: u64) -> Self {
        let entries = Vec::new();
        Self { penalty, entries }
    }

    /// Get the penalty used for the report.
    #[must_use]
    pub const fn penalty(&self) -> u64 {
        self.penalty
    }

    /// Get the entries.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Penalty: {}", self.penalty)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of evaluating a single sample.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub expected: u64,
    pub score: u64,
    pub makespan: u64,
    pub feasible: bool,
    pub precedence_violations: usize,
    pub capacity_excess: u64,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let verdict = if self.feasible { "feasible" } else { "infeasible" };
        write!(
            f,
            "{}: {} ({verdict}, makespan {}, {} violated edges, excess {}) in {:.6} sec",
            self.name,
            self.score,
            self.makespan,
            self.precedence_violations,
            self.capacity_excess,
            self.time
        )
    }
}

/// Evaluate all samples in the `samples` directory.
/// Print the report to stdout.
///
/// # Errors
/// - If a file cannot be read.
/// - If no samples are found.
/// - If a score differs from the one in the filename.
pub fn samples(config: EvaluatorConfig) -> anyhow::Result<()> {
    run("samples", true, config).and_then(|report| {
        if report.entries.is_empty() {
            Err(anyhow!("No samples found"))
        } else {
            println!("{report}");
            Ok(())
        }
    })
}

/// Evaluate all samples in the `dir` directory.
///
/// A sample is an instance file `<name>_<score>.rcp` with the start times in
/// `<name>_<score>.sol` next to it. Instances without a solution file are skipped.
///
/// # Arguments
/// - `valid` is true, check that every score matches the one in the filename.
/// - `config` configures the evaluator.
///
/// # Errors
/// - If a file cannot be read or parsed.
/// - If a solution is malformed.
/// - If a score is incorrect and `valid` is true.
pub fn run(dir: impl AsRef<Path>, valid: bool, config: EvaluatorConfig) -> anyhow::Result<Report> {
    let dir = dir.as_ref();
    let mut report = Report::new(config.penalty);

    let mut files = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    files.sort_unstable();

    for path in files {
        if path.extension().map_or(true, |ext| ext != "rcp") {
            continue;
        }
        let (name, expected) = parse_filename(&path)?;

        let solution_path = path.with_extension("sol");
        if !solution_path.try_exists()? {
            log::debug!("Skipping {name}, no solution file");
            continue;
        }

        let instance = read_instance(&path).with_context(|| format!("Cannot read {name}"))?;
        let starts = read_solution(&solution_path)
            .with_context(|| format!("Cannot read solution of {name}"))?;
        let evaluator = Evaluator::new(&instance, config);

        let time = std::time::Instant::now();
        let evaluation = evaluator
            .evaluate(&starts)
            .with_context(|| format!("Cannot evaluate {name}"))?;
        let time = time.elapsed().as_secs_f64();

        if valid {
            ensure!(
                evaluation.score == expected,
                "Invalid score {} of {name}, expected {expected}",
                evaluation.score
            );
        }

        report.entries.push(ReportEntry {
            name,
            expected,
            score: evaluation.score,
            makespan: evaluation.makespan,
            feasible: evaluation.feasible(),
            precedence_violations: evaluation.precedence.count(),
            capacity_excess: evaluation.capacity.weighted_excess(),
            time,
        });
    }

    Ok(report)
}

fn parse_filename(path: &Path) -> anyhow::Result<(String, u64)> {
    static NAME_ERR: &str = "Cannot read filename";

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow!(NAME_ERR))?;
    let (_, expected) = stem.rsplit_once('_').ok_or_else(|| anyhow!(NAME_ERR))?;
    Ok((stem.into(), expected.parse()?))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::DEFAULT_PENALTY;

    #[test]
    fn test_parse_filename() -> anyhow::Result<()> {
        let (name, expected) = parse_filename(Path::new("samples/serial_12.rcp"))?;
        assert_eq!(name, "serial_12");
        assert_eq!(expected, 12);

        let (name, expected) = parse_filename(Path::new("j30_1_1_43.rcp"))?;
        assert_eq!(name, "j30_1_1_43");
        assert_eq!(expected, 43);
        Ok(())
    }

    #[test]
    fn test_parse_filename_errors() {
        assert!(parse_filename(Path::new("")).is_err());
        assert!(parse_filename(Path::new(".rcp")).is_err());
        assert!(parse_filename(Path::new("serial.rcp")).is_err());
        assert!(parse_filename(Path::new("serial_.rcp")).is_err());
        assert!(parse_filename(Path::new("serial_1a2.rcp")).is_err());
    }

    #[test]
    fn test_samples() -> anyhow::Result<()> {
        let report = run("samples", true, EvaluatorConfig::default())?;

        let names: Vec<_> = report.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["overload_2000003", "parallel_7", "serial_12"]);
        assert!(!report.entries()[0].feasible);
        assert_eq!(report.entries()[0].capacity_excess, 2);
        assert!(report.entries()[1].feasible);
        assert_eq!(report.penalty(), DEFAULT_PENALTY);

        assert!(samples(EvaluatorConfig::default()).is_ok());
        Ok(())
    }

    #[test]
    fn test_invalid_score() {
        assert!(run("samples", true, EvaluatorConfig::new(10)).is_err());
        assert!(run("samples", false, EvaluatorConfig::new(10)).is_ok());
    }
}
