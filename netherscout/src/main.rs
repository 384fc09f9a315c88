use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use netherscout_benchmark::BenchmarkMetrics;
use netherscout_core::survey::{DEFAULT_THRESHOLD, Survey};
use netherscout_core::{ChestClassifier, ChunkPos, StablesRule};
use netherscout_gen::fixture::FixtureStructures;
use netherscout_gen::flat::FlatGenerator;
use netherscout_gen::nether::NetherGenerator;
use netherscout_gen::{NoStructures, StructureGenerator, TerrainGenerator};
use netherscout_protocol::Dispatcher;

/// Exit status for configuration and startup failures.
const STARTUP_FAILURE: u8 = 1;

#[derive(Parser)]
#[command(
    name = "netherscout",
    about = "Answers bastion obsidian and nether route queries from a seed-search host over stdin/stdout"
)]
pub struct Args {
    /// Terrain generator: "nether" or "flat"
    #[arg(short, long, env = "TERRAIN", default_value = "nether")]
    pub terrain: String,

    /// JSON file of bastion layouts to answer obsidian queries from
    #[arg(short, long, env = "STRUCTURES")]
    pub structures: Option<PathBuf>,

    /// Only count stables chests at y=35 and y=72
    #[arg(long, env = "STRICT_STABLES")]
    pub strict_stables: bool,

    /// Flat terrain: highest solid y below the open band
    #[arg(long, env = "FLAT_FLOOR", default_value = "31", allow_hyphen_values = true)]
    pub flat_floor: i32,

    /// Flat terrain: lowest solid y above the open band
    #[arg(long, env = "FLAT_CEILING", default_value = "101", allow_hyphen_values = true)]
    pub flat_ceiling: i32,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Tally how often each bastion variant reaches an obsidian threshold over a seed range
    Survey {
        /// First seed (inclusive)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        from: i64,

        /// Last seed (exclusive)
        #[arg(long, default_value = "100000", allow_hyphen_values = true)]
        to: i64,

        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        chunk_x: i32,

        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        chunk_z: i32,

        /// Obsidian needed, trades included
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u32,
    },
}

fn main() -> ExitCode {
    // env_logger writes to stderr; stdout carries the protocol
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            log::error!("FATAL: {:#}", e);
            ExitCode::from(STARTUP_FAILURE)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let benchmark = if std::env::var("BENCHMARK").is_ok() {
        log::info!("Benchmark mode enabled");
        Some(Arc::new(BenchmarkMetrics::new()))
    } else {
        None
    };

    let stables = if args.strict_stables { StablesRule::Strict } else { StablesRule::Standard };
    log::info!("Stables rule: {:?} (y in {:?})", stables, stables.altitudes());
    let classifier = ChestClassifier::new(stables);

    let structures = select_structures(args.structures.as_deref())?;

    match args.command {
        Some(Command::Survey { from, to, chunk_x, chunk_z, threshold }) => {
            let chunk = ChunkPos::new(chunk_x, chunk_z);
            let survey = run_survey(structures.as_ref(), &classifier, from..to, chunk)?;
            print!("{}", survey.report(threshold));
            Ok(ExitCode::SUCCESS)
        }
        None => {
            let terrain = select_terrain(&args.terrain, args.flat_floor, args.flat_ceiling, benchmark.clone())?;
            let mut dispatcher = Dispatcher::new(structures.as_ref(), terrain.as_ref(), classifier)
                .with_benchmark(benchmark.clone());

            let result = dispatcher.serve(std::io::stdin().lock(), std::io::stdout().lock());

            if let Some(bench) = benchmark {
                write_benchmark_report(&bench);
            }

            match result {
                Ok(_) => Ok(ExitCode::SUCCESS),
                Err(e) => {
                    log::error!("FATAL: {}", e);
                    Ok(ExitCode::from(e.exit_code()))
                }
            }
        }
    }
}

fn select_structures(path: Option<&Path>) -> Result<Box<dyn StructureGenerator>> {
    match path {
        Some(path) => {
            let fixture = FixtureStructures::load(path)?;
            log::info!("Using {} fixture bastions from {:?}", fixture.len(), path);
            Ok(Box::new(fixture))
        }
        None => {
            log::warn!("No structure source configured, every obsidian query answers 'no structure'");
            Ok(Box::new(NoStructures))
        }
    }
}

fn select_terrain(
    name: &str,
    floor: i32,
    ceiling: i32,
    benchmark: Option<Arc<BenchmarkMetrics>>,
) -> Result<Box<dyn TerrainGenerator>> {
    match name.to_lowercase().as_str() {
        "nether" | "vanilla" => {
            log::info!("Using Pumpkin nether terrain");
            let generator = NetherGenerator::new(benchmark).context("Failed to set up nether terrain")?;
            Ok(Box::new(generator))
        }
        "flat" => {
            log::info!("Using flat terrain, open for {} < y < {}", floor, ceiling);
            Ok(Box::new(FlatGenerator::new(floor, ceiling)))
        }
        other => anyhow::bail!("Unknown terrain generator {:?}, expected \"nether\" or \"flat\"", other),
    }
}

fn run_survey(
    structures: &dyn StructureGenerator,
    classifier: &ChestClassifier,
    seeds: std::ops::Range<i64>,
    chunk: ChunkPos,
) -> Result<Survey> {
    let mut survey = Survey::new();
    for seed in seeds {
        match structures.generate_bastion(seed, chunk)? {
            Some(bastion) => survey.record(&bastion, classifier),
            None => survey.record_missing(),
        }
    }
    Ok(survey)
}

fn write_benchmark_report(bench: &BenchmarkMetrics) {
    let report = bench.generate_report();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    // Ensure benchmarks directory exists
    if let Err(e) = std::fs::create_dir_all("benchmarks") {
        log::error!("Failed to create benchmarks directory: {}", e);
    }

    let filename = format!("benchmarks/benchmark-{}.txt", timestamp);
    if let Err(e) = std::fs::write(&filename, &report) {
        log::error!("Failed to write benchmark report: {}", e);
    } else {
        log::info!("Benchmark report written to {}\n{}", filename, report);
    }
}
