//! Algoviz
//!
//! Serve the browser front end, or play a single algorithm in the terminal.

use std::io::{self, IsTerminal};
use std::net::SocketAddr;

use algoviz_core::model::{Combiner, HeapOrder};
use algoviz_core::source::bst::Traversal;
use algoviz_core::{Algorithm, GeneratorConfig};
use algoviz_player::{Player, PlayerConfig, PlayerEvent, SpeedLevel};
use algoviz_vis::{AlgorithmRequest, TerminalRenderer, VisConfig, VisServer, Workbench};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "algoviz", version, about = "Animated algorithm step player")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web front end.
    Serve {
        /// Listen address (overrides ALGOVIZ_ADDR).
        #[arg(long)]
        addr: Option<SocketAddr>,
        /// Generator seed (overrides ALGOVIZ_SEED).
        #[arg(long)]
        seed: Option<u64>,
        /// Initial speed level, 1 to 10 (overrides ALGOVIZ_SPEED).
        #[arg(long)]
        speed: Option<u8>,
    },

    /// Play one algorithm in the terminal.
    Play(PlayArgs),

    /// List every algorithm with its complexity.
    List,
}

#[derive(Args)]
struct PlayArgs {
    /// Algorithm name, e.g. quick_sort or dijkstra.
    algorithm: Algorithm,

    /// Comma-separated input values; generated when absent.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    values: Option<Vec<i64>>,

    /// Value to insert, delete or search for.
    #[arg(long, allow_hyphen_values = true)]
    value: Option<i64>,

    #[arg(long)]
    word: Option<String>,

    #[arg(long)]
    traversal: Option<Traversal>,

    /// Heap order: min or max.
    #[arg(long)]
    order: Option<HeapOrder>,

    /// Segment tree combiner: sum, min or max.
    #[arg(long)]
    combiner: Option<Combiner>,

    /// Graph start node index.
    #[arg(long)]
    start: Option<usize>,

    /// Graph target node index.
    #[arg(long)]
    target: Option<usize>,

    /// 1-based query range start.
    #[arg(long)]
    left: Option<usize>,

    /// 1-based query range end.
    #[arg(long)]
    right: Option<usize>,

    /// 1-based position to update.
    #[arg(long)]
    position: Option<usize>,

    #[arg(long)]
    capacity: Option<u32>,

    /// Knapsack items as weight:value pairs, e.g. 2:3,3:4.
    #[arg(long, value_delimiter = ',', value_parser = parse_item)]
    items: Option<Vec<(u32, i64)>>,

    /// First LCS string.
    #[arg(long)]
    first: Option<String>,

    /// Second LCS string.
    #[arg(long)]
    second: Option<String>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Speed level, 1 (slow) to 10 (fast).
    #[arg(long, default_value_t = 5)]
    speed: u8,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

impl PlayArgs {
    fn request(&self) -> AlgorithmRequest {
        AlgorithmRequest {
            algorithm: Some(self.algorithm),
            values: self.values.clone(),
            value: self.value,
            word: self.word.clone(),
            traversal: self.traversal,
            order: self.order,
            combiner: self.combiner,
            start: self.start,
            target: self.target,
            left: self.left,
            right: self.right,
            position: self.position,
            capacity: self.capacity,
            items: self.items.clone(),
            first: self.first.clone(),
            second: self.second.clone(),
        }
    }
}

fn parse_item(s: &str) -> Result<(u32, i64), String> {
    let (weight, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected weight:value, got '{}'", s))?;
    let weight = weight.trim().parse().map_err(|e| format!("weight '{}': {}", weight, e))?;
    let value = value.trim().parse().map_err(|e| format!("value '{}': {}", value, e))?;
    Ok((weight, value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so terminal frames stay readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algoviz=info,algoviz_vis=info,algoviz_player=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { addr, seed, speed } => serve(addr, seed, speed).await,
        Command::Play(args) => play(args).await,
        Command::List => {
            list();
            Ok(())
        }
    }
}

async fn serve(addr: Option<SocketAddr>, seed: Option<u64>, speed: Option<u8>) -> anyhow::Result<()> {
    let mut config = VisConfig::from_env().context("reading environment")?;
    if let Some(addr) = addr {
        config.addr = addr;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(speed) = speed {
        config.speed = SpeedLevel::new(speed);
    }

    println!("Algoviz");
    println!("=======");
    println!();
    println!("Serving on http://{}", config.addr);
    println!("Open in a browser to pick an algorithm and watch it run.");
    println!();

    VisServer::new(config)?.serve().await?;
    Ok(())
}

async fn play(args: PlayArgs) -> anyhow::Result<()> {
    let mut workbench = Workbench::new(GeneratorConfig {
        seed: args.seed,
        ..GeneratorConfig::default()
    })?;
    let request = args.request();
    if matches!(args.algorithm, Algorithm::SegmentQuery | Algorithm::SegmentUpdate) {
        let build = AlgorithmRequest {
            values: args.values.clone(),
            combiner: args.combiner,
            ..AlgorithmRequest::new(Algorithm::SegmentBuild)
        };
        workbench.prepare(&build).context("building the segment tree")?;
        workbench.commit();
    }
    let program = workbench
        .prepare(&request)
        .with_context(|| format!("preparing {}", args.algorithm))?;
    let outcome = program.outcome().clone();

    let color = !args.no_color && io::stdout().is_terminal();
    let player = Player::new(
        TerminalRenderer::new(io::stdout(), color),
        PlayerConfig {
            speed_level: SpeedLevel::new(args.speed),
            ..PlayerConfig::default()
        },
    );
    let mut events = player.subscribe();
    player.start(program).await;

    loop {
        match events.recv().await? {
            PlayerEvent::Completed { report } => {
                println!("{:?}", outcome);
                println!(
                    "{} steps in {} ms: {} comparisons, {} swaps, {} operations",
                    report.steps, report.duration_ms, report.comparisons, report.swaps, report.operations
                );
                return Ok(());
            }
            PlayerEvent::Failed { at, error } => bail!("run failed at step {}: {}", at, error),
            _ => {}
        }
    }
}

fn list() {
    for algorithm in Algorithm::ALL {
        let complexity = algorithm.complexity();
        println!(
            "{:<16} {:<20} time {} / {} / {}  space {}",
            algorithm.name(),
            format!("{:?}", algorithm.family()),
            complexity.time.best,
            complexity.time.average,
            complexity.time.worst,
            complexity.space.worst,
        );
    }
}
