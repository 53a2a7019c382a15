//! Ant Tour - Command Line Interface
//!
//! Solves TSP instances with an ant colony and inspects the resulting trails.

use ant_tour::benchmark::{Benchmark, BenchmarkConfig};
use ant_tour::colony::{export_history_csv, AcoConfig, AntColony};
use ant_tour::graph::{Graph, LoggingObserver};
use ant_tour::instance::TspInstance;
use ant_tour::persistence;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ant-tour")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Ant Colony Optimization for the Traveling Salesman Problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Colony parameters shared by `solve` and `benchmark`
#[derive(clap::Args, Clone)]
struct ColonyArgs {
    /// Pheromone importance
    #[arg(long, default_value = "1.0")]
    alpha: f64,

    /// Heuristic (1/length) importance
    #[arg(long, default_value = "2.5")]
    beta: f64,

    /// Evaporation rate
    #[arg(long, default_value = "0.1")]
    rho: f64,

    /// Pheromone deposit factor
    #[arg(long, default_value = "100.0")]
    q: f64,

    /// Number of ants (0 = one per city)
    #[arg(long, default_value = "20")]
    ants: usize,

    /// Maximum number of rounds
    #[arg(long, default_value = "200")]
    rounds: usize,

    /// Stop after this many rounds without improvement
    #[arg(long, default_value = "50")]
    max_no_improve: usize,

    /// Time limit in seconds
    #[arg(short, long, default_value = "60")]
    time_limit: f64,

    /// Extra deposit on the best tour so far (0 = plain Ant System)
    #[arg(long, default_value = "0.0")]
    elitist: f64,

    /// Build tours in parallel
    #[arg(long)]
    parallel: bool,

    /// Keep the trails stored in the graph file instead of resetting them
    #[arg(long)]
    keep_trails: bool,
}

impl ColonyArgs {
    fn to_config(&self, seed: u64) -> AcoConfig {
        AcoConfig {
            num_ants: self.ants,
            max_rounds: self.rounds,
            max_no_improve: self.max_no_improve,
            alpha: self.alpha,
            beta: self.beta,
            evaporation_rate: self.rho,
            reset_pheromone: !self.keep_trails,
            q: self.q,
            elitist_weight: self.elitist,
            parallel: self.parallel,
            seed,
            time_limit: self.time_limit,
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Find a tour with the ant colony
    Solve {
        /// Graph file (.tsp instance or .json graph)
        #[arg(short, long)]
        graph: PathBuf,

        #[command(flatten)]
        colony: ColonyArgs,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output solution to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write per-round statistics to a CSV file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Save the graph with its final trails
        #[arg(long)]
        save_graph: Option<PathBuf>,

        /// Log every graph change at trace level
        #[arg(long)]
        trace_events: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Convert a TSPLIB instance to a JSON graph
    Convert {
        #[arg(short, long)]
        instance: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Pheromone level stored on every edge
        #[arg(long, default_value = "1.0")]
        initial_pheromone: f64,
    },

    /// Analyze a graph
    Analyze {
        #[arg(short, long)]
        graph: PathBuf,
    },

    /// Run the colony with several seeds and collect statistics
    Benchmark {
        #[arg(short, long)]
        graph: PathBuf,

        #[command(flatten)]
        colony: ColonyArgs,

        /// Number of runs
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Seed of the first run
        #[arg(long, default_value = "0")]
        first_seed: u64,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { graph, colony, seed, output, history, save_graph, trace_events, verbose } => {
            solve(&graph, &colony, seed, output, history, save_graph, trace_events, verbose);
        }

        Commands::Convert { instance, output, initial_pheromone } => {
            convert(&instance, &output, initial_pheromone);
        }

        Commands::Analyze { graph } => {
            analyze(&graph);
        }

        Commands::Benchmark { graph, colony, runs, first_seed, output } => {
            run_benchmark(&graph, &colony, runs, first_seed, &output);
        }
    }
}

/// Load a graph from a TSPLIB instance or a saved JSON graph
fn load_graph(path: &Path) -> Result<Graph, String> {
    let is_tsplib = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("tsp"));

    if is_tsplib {
        let instance = TspInstance::from_file(path).map_err(|e| e.to_string())?;
        instance
            .to_graph(AcoConfig::default().initial_pheromone)
            .map_err(|e| e.to_string())
    } else {
        persistence::load(path).map_err(|e| e.to_string())
    }
}

fn load_or_exit(path: &Path) -> Graph {
    println!("Loading graph from {:?}...", path);
    match load_graph(path) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error loading graph: {}", e);
            std::process::exit(1);
        }
    }
}

fn progress_bar(len: usize, template: &str) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar()));
    bar
}

#[allow(clippy::too_many_arguments)]
fn solve(
    path: &Path,
    args: &ColonyArgs,
    seed: u64,
    output: Option<PathBuf>,
    history: Option<PathBuf>,
    save_graph: Option<PathBuf>,
    trace_events: bool,
    verbose: bool,
) {
    let mut graph = load_or_exit(path);
    if trace_events {
        graph.set_observer(Some(Box::new(LoggingObserver)));
    }
    println!("Graph '{}': {} cities, {} edges", graph.name(), graph.len(), graph.edge_count());

    let mut colony = match AntColony::new(args.to_config(seed)) {
        Ok(colony) => colony,
        Err(e) => {
            eprintln!("Invalid parameters: {}", e);
            std::process::exit(1);
        }
    };

    let bar = progress_bar(args.rounds, "{bar:40} {pos}/{len} rounds {msg}");
    let result = colony.run_with_progress(&mut graph, |stats| {
        if let Some(best) = stats.global_best {
            bar.set_message(format!("best {:.2}", best));
        }
        bar.inc(1);
    });
    bar.finish_and_clear();

    let solution = match result {
        Ok(solution) => solution,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("\nBest tour length: {:.2}", solution.length);
    println!("Found in round {} of {}", solution.found_in_round, solution.rounds);
    println!("Computation time: {:.3}s", solution.computation_time);
    if verbose {
        println!("Tour: {}", solution.names.join(" -> "));
    }

    if let Some(path) = history {
        match export_history_csv(&solution.history, &path) {
            Ok(()) => println!("Round history saved to {:?}", path),
            Err(e) => eprintln!("Error writing history: {}", e),
        }
    }

    if let Some(path) = save_graph {
        match persistence::save(&graph, &path) {
            Ok(()) => println!("Graph with trails saved to {:?}", path),
            Err(e) => eprintln!("Error saving graph: {}", e),
        }
    }

    if let Some(path) = output {
        match serde_json::to_string_pretty(&solution) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json) {
                    eprintln!("Error writing solution: {}", e);
                } else {
                    println!("Solution saved to {:?}", path);
                }
            }
            Err(e) => eprintln!("Error serializing solution: {}", e),
        }
    }
}

fn convert(instance_path: &Path, output: &Path, initial_pheromone: f64) {
    let graph = TspInstance::from_file(instance_path).and_then(|i| i.to_graph(initial_pheromone));
    let graph = match graph {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = persistence::save(&graph, output) {
        eprintln!("Error saving graph: {}", e);
        std::process::exit(1);
    }
    println!("Converted {} cities and {} edges to {:?}", graph.len(), graph.edge_count(), output);
}

fn analyze(path: &Path) {
    let graph = load_or_exit(path);

    let lengths: Vec<f64> = graph.edges().map(|(_, e)| e.length()).collect();
    let trails: Vec<f64> = graph.edges().map(|(_, e)| e.pheromone()).collect();
    let n = graph.len();
    let isolated = graph.cities().filter(|(_, c)| !c.has_connections()).count();
    let degrees: Vec<usize> = graph.cities().map(|(_, c)| c.connection_count()).collect();

    println!("\n========================================");
    println!("Graph: {}", graph.name());
    println!("========================================");
    println!("Cities: {}", n);
    println!("Edges: {} (complete graph has {})", graph.edge_count(), n * n.saturating_sub(1) / 2);
    println!("Isolated cities: {}", isolated);
    if let (Some(min), Some(max)) = (degrees.iter().min(), degrees.iter().max()) {
        println!("Degree: min {}, max {}", min, max);
    }

    if !lengths.is_empty() {
        let count = lengths.len() as f64;
        println!("\nEdge length:");
        println!("  min:  {:.2}", lengths.iter().cloned().fold(f64::INFINITY, f64::min));
        println!("  max:  {:.2}", lengths.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
        println!("  mean: {:.2}", lengths.iter().sum::<f64>() / count);

        println!("\nPheromone:");
        println!("  min:   {:.4}", trails.iter().cloned().fold(f64::INFINITY, f64::min));
        println!("  max:   {:.4}", trails.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
        println!("  total: {:.4}", trails.iter().sum::<f64>());
    }

    let selected: Vec<String> = graph
        .edges()
        .filter(|(_, e)| e.is_selected())
        .map(|(_, e)| {
            let (a, b) = e.endpoints();
            format!(
                "{}-{}",
                graph.city_name(a).unwrap_or("?"),
                graph.city_name(b).unwrap_or("?")
            )
        })
        .collect();
    if !selected.is_empty() {
        println!("\nSelected edges: {}", selected.join(", "));
    }
}

fn run_benchmark(path: &Path, args: &ColonyArgs, runs: usize, first_seed: u64, output: &Path) {
    let graph = load_or_exit(path);

    if let Err(e) = fs::create_dir_all(output) {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    }

    let config = BenchmarkConfig {
        num_runs: runs,
        first_seed,
        aco: args.to_config(first_seed),
    };
    let mut benchmark = Benchmark::new(config);

    let bar = progress_bar(runs, "{bar:40} {pos}/{len} runs");
    let result = benchmark.run(&graph, |done| bar.set_position(done as u64));
    bar.finish_and_clear();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let report = benchmark.generate_report();
    println!("{}", report);

    if let Err(e) = benchmark.export_to_csv(output.join("results.csv")) {
        eprintln!("Error exporting results: {}", e);
    }
    if let Err(e) = benchmark.export_statistics_csv(output.join("statistics.csv")) {
        eprintln!("Error exporting statistics: {}", e);
    }
    if let Err(e) = fs::write(output.join("report.txt"), &report) {
        eprintln!("Error writing report: {}", e);
    }

    println!("Results saved to {:?}", output);
}
