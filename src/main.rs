//! SA-TSP Solver - Command Line Interface
//!
//! Simulated annealing for the Euclidean Traveling Salesman Problem.

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sa_tsp_solver::error::Result;
use sa_tsp_solver::heuristics::annealing::{AnnealingConfig, SimulatedAnnealing};
use sa_tsp_solver::heuristics::construction::RandomTourHeuristic;
use sa_tsp_solver::instance::TspInstance;
use sa_tsp_solver::restarts::{run_restarts, RestartConfig};
use sa_tsp_solver::visualization::Visualizer;

use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sa-tsp-solver")]
#[command(version = "1.0")]
#[command(about = "Simulated annealing solver for the Euclidean TSP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Anneal once and print the best tour
    Solve {
        /// City file with `<id> <x> <y>` lines
        #[arg(short, long)]
        instance: PathBuf,

        #[command(flatten)]
        annealing: AnnealingArgs,

        /// Random seed (drawn from OS entropy when omitted)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output solution to JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write an SVG drawing of the tour
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run independent restarts with consecutive seeds
    Restarts {
        /// City file with `<id> <x> <y>` lines
        #[arg(short, long)]
        instance: PathBuf,

        #[command(flatten)]
        annealing: AnnealingArgs,

        /// Number of runs
        #[arg(short, long, default_value = "8")]
        runs: usize,

        /// Seed of the first run
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Run one restart at a time instead of on the thread pool
        #[arg(long)]
        sequential: bool,

        /// Output per-run CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output best solution to JSON file
        #[arg(long)]
        best: Option<PathBuf>,
    },

    /// Analyze an instance
    Analyze {
        /// City file with `<id> <x> <y>` lines
        #[arg(short, long)]
        instance: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct AnnealingArgs {
    /// Number of annealing iterations
    #[arg(short = 'n', long, default_value = "10000")]
    iterations: usize,

    /// Starting temperature
    #[arg(long, default_value = "10000.0")]
    initial_temp: f64,

    /// Per-iteration cooling factor in (0, 1]
    #[arg(long, default_value = "0.999")]
    cooling_rate: f64,
}

impl AnnealingArgs {
    fn to_config(self, seed: Option<u64>) -> AnnealingConfig {
        AnnealingConfig {
            initial_temperature: self.initial_temp,
            cooling_rate: self.cooling_rate,
            max_iterations: self.iterations,
            seed,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve { instance, annealing, seed, output, svg, verbose } => {
            solve_instance(&instance, annealing.to_config(seed), output, svg, verbose)
        }

        Commands::Restarts { instance, annealing, runs, seed, sequential, output, best } => {
            let config = RestartConfig {
                runs,
                base_seed: seed,
                parallel: !sequential,
                annealing: annealing.to_config(None),
            };
            run_restart_study(&instance, &config, output, best)
        }

        Commands::Analyze { instance } => analyze_instance(&instance),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn solve_instance(
    path: &PathBuf,
    config: AnnealingConfig,
    output: Option<PathBuf>,
    svg: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let instance = TspInstance::from_file(path)?;

    if verbose {
        println!("{}", instance.statistics());
        println!("Config: {:?}", config);
    }

    let result = SimulatedAnnealing::with_config(config).solve(&instance)?;
    let best_iteration = result.best_iteration;
    let final_temperature = result.final_temperature;
    let solution = result.into_solution();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    solution.write_report(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| sa_tsp_solver::SolverError::export(e.to_string()))?;

    if verbose {
        println!("\n{}", solution);
        println!("Best found at iteration: {}", best_iteration);
        println!("Final temperature: {:.6e}", final_temperature);
    }

    if let Some(out_path) = output {
        solution.save_json(&out_path)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    if let Some(svg_path) = svg {
        let viz = Visualizer::new();
        let drawing = viz.generate_svg(&instance, &solution);
        viz.save_svg(&drawing, &svg_path)?;
        println!("Visualization saved to {:?}", svg_path);
    }

    Ok(())
}

fn run_restart_study(
    path: &PathBuf,
    config: &RestartConfig,
    output: Option<PathBuf>,
    best: Option<PathBuf>,
) -> Result<()> {
    let instance = TspInstance::from_file(path)?;
    println!("Running {} restarts on {} (n={})...", config.runs, instance.name, instance.dimension());

    let pb = ProgressBar::new(config.runs as u64);
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} runs") {
        pb.set_style(style);
    }

    let study = run_restarts(&instance, config, Some(&pb))?;
    pb.finish_and_clear();

    println!("\n{}", study.generate_report());

    let solution = study.best_solution();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    solution.write_report(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| sa_tsp_solver::SolverError::export(e.to_string()))?;

    if let Some(csv_path) = output {
        study.export_to_csv(&csv_path)?;
        println!("\nResults exported to {:?}", csv_path);
    }

    if let Some(json_path) = best {
        solution.save_json(&json_path)?;
        println!("Best solution saved to {:?}", json_path);
    }

    Ok(())
}

fn analyze_instance(path: &PathBuf) -> Result<()> {
    let instance = TspInstance::from_file(path)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let mut solution = RandomTourHeuristic::new().construct(&instance)?;
    let random_cost = solution.cost;
    let sa = SimulatedAnnealing::with_config(AnnealingConfig::default().with_seed(42));
    sa.improve(&instance, &mut solution)?;

    println!("Quick Solution Estimates:");
    println!("  Random tour: {:.2}", random_cost);
    println!("  Simulated annealing ({} iterations): {:.2}", sa.config.max_iterations, solution.cost);

    Ok(())
}
