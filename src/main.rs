mod logger;

use anyhow::Context;
use clap::{Args, Parser};
use rand::prelude::*;
use rcpsp_evaluator::core::{
    random_solution, Evaluator, EvaluatorConfig, Instance, InstanceData, TaskData,
};
use rcpsp_evaluator::{data, run_reader};
use std::fs::File;
use std::io::{BufReader, Write};
use std::num::NonZero;
use std::path::{Path, PathBuf};

/// Evaluator settings shared by the subcommands.
#[derive(Debug, Args)]
struct Settings {
    /// Penalty per violated precedence edge and per unit of capacity excess.
    #[clap(short, long)]
    penalty: Option<u64>,
    /// JSON file with the evaluator config. The penalty flag takes precedence.
    #[clap(long)]
    config: Option<PathBuf>,
}

impl Settings {
    fn load(&self) -> anyhow::Result<EvaluatorConfig> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))
                .with_context(|| format!("Cannot read config {}", path.display()))?,
            None => EvaluatorConfig::default(),
        };
        if let Some(penalty) = self.penalty {
            config.penalty = penalty;
        }
        log::debug!("Using {config:?}");
        Ok(config)
    }
}

/// Application evaluating solutions of the resource-constrained project scheduling problem.
#[derive(Debug, Parser)]
#[command(version, about)]
enum Application {
    /// Evaluate start times of an instance in Patterson format.
    Evaluate {
        /// The instance file.
        instance: PathBuf,
        /// File with the start times. Used instead of the positional start times.
        #[clap(short, long)]
        solution: Option<PathBuf>,
        /// The start times, one per task.
        #[clap(allow_negative_numbers = true)]
        starts: Vec<i64>,
        #[clap(flatten)]
        settings: Settings,
    },
    /// Evaluate random start times within the horizon and print the best.
    Sample {
        /// The instance file.
        instance: PathBuf,
        /// Number of start time vectors to evaluate.
        #[clap(short, long, default_value = "1000")]
        amount: NonZero<usize>,
        /// Seed of the random generator.
        #[clap(long)]
        seed: Option<u64>,
        #[clap(flatten)]
        settings: Settings,
    },
    /// Evaluate every `<name>_<score>.rcp` instance with a matching `.sol` file.
    Bench {
        /// The input directory.
        input: PathBuf,
        /// Fail when a score differs from the one in the filename.
        #[clap(short, long)]
        valid: bool,
        /// Print the report as JSON.
        #[clap(short, long)]
        json: bool,
        #[clap(flatten)]
        settings: Settings,
    },
    /// Generate random instances with acyclic precedence graphs.
    Gen {
        /// The number of tasks.
        tasks: NonZero<usize>,
        /// The number of resources.
        resources: usize,
        /// The maximum duration of a task.
        max_duration: NonZero<u64>,
        /// The capacity of every resource, also the maximum requirement.
        capacity: NonZero<u64>,
        /// Probability that a task precedes a given later task.
        #[clap(short = 'r', long, default_value = "0.2")]
        successor_ratio: f64,
        /// Number of instances to generate.
        #[clap(short, long, default_value = "1")]
        amount: NonZero<u64>,
        /// Path to output the generated instances. If the directory does not exist, it will be created.
        #[clap(short, long, default_value = "output")]
        output: String,
    },
}

fn sample(
    path: &Path,
    amount: usize,
    seed: Option<u64>,
    config: EvaluatorConfig,
) -> anyhow::Result<()> {
    let instance = data::read_instance(path)?;
    let evaluator = Evaluator::new(&instance, config);
    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    let mut best: Option<(u64, Vec<i64>)> = None;
    let mut feasible = 0usize;
    for _ in 0..amount {
        let starts = random_solution(&instance, &mut rng);
        let evaluation = evaluator.evaluate(&starts)?;
        if evaluation.feasible() {
            feasible += 1;
        }
        if best.as_ref().map_or(true, |(score, _)| evaluation.score < *score) {
            best = Some((evaluation.score, starts));
        }
    }
    log::info!("{feasible} of {amount} random schedules are feasible");

    if let Some((_, starts)) = best {
        let line: Vec<_> = starts.iter().map(i64::to_string).collect();
        println!("{}", line.join(" "));
        println!("{}", evaluator.evaluate(&starts)?);
    }
    Ok(())
}

fn gen_instance(
    rng: &mut impl Rng,
    tasks: usize,
    resources: usize,
    max_duration: i64,
    capacity: i64,
    ratio: f64,
) -> anyhow::Result<Instance> {
    let tasks = (0..tasks)
        .map(|task| TaskData {
            duration: rng.gen_range(1..=max_duration),
            requirements: (0..resources).map(|_| rng.gen_range(0..=capacity)).collect(),
            successors: (task + 1..tasks).filter(|_| rng.gen_bool(ratio)).collect(),
        })
        .collect();
    let data = InstanceData {
        capacities: vec![capacity; resources],
        tasks,
    };
    Ok(Instance::new(data)?)
}

fn main() -> anyhow::Result<()> {
    logger::init();

    match Application::parse() {
        Application::Evaluate {
            instance,
            solution,
            starts,
            settings,
        } => {
            let starts = match solution {
                Some(path) => data::read_solution(path)?,
                None => starts,
            };
            let mut reader = BufReader::new(
                File::open(&instance)
                    .with_context(|| format!("Cannot open {}", instance.display()))?,
            );
            run_reader(&mut reader, &starts, settings.load()?)
        }
        Application::Sample {
            instance,
            amount,
            seed,
            settings,
        } => sample(&instance, amount.get(), seed, settings.load()?),
        Application::Bench {
            input,
            valid,
            json,
            settings,
        } => {
            let report = data::run(&input, valid, settings.load()?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
            Ok(())
        }
        Application::Gen {
            tasks,
            resources,
            max_duration,
            capacity,
            successor_ratio,
            amount,
            output,
        } => {
            anyhow::ensure!(
                (0.0..=1.0).contains(&successor_ratio),
                "Successor ratio must be within [0, 1]"
            );
            let max_duration = i64::try_from(max_duration.get())?;
            let capacity = i64::try_from(capacity.get())?;

            let output = Path::new(&output);
            if !output.try_exists()? {
                std::fs::create_dir_all(output)?;
            }

            let mut rng = thread_rng();
            for i in 0..amount.get() {
                let instance = gen_instance(
                    &mut rng,
                    tasks.get(),
                    resources,
                    max_duration,
                    capacity,
                    successor_ratio,
                )?;
                let filename = format!("{tasks}_{resources}_{i}.rcp");
                File::create(output.join(filename))?
                    .write_all(data::to_string(&instance).as_bytes())?;
            }
            log::info!("Generated {amount} instances in {}", output.display());
            Ok(())
        }
    }
}
