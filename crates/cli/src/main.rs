//! taskweave CLI - compose and run demo task trees.

mod robot;
mod routines;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use robot::Robot;
use routines::Routine;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use taskweave_core::{CompositionStrategy, SystemClock, Task};
use taskweave_execution::{SchedulerConfig, SchedulerRegistrar, TaskScheduler};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskweave")]
#[command(about = "Compose cooperative tasks into trees and run them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List composition strategies
    Strategies,
    /// Print a routine's task tree as JSON
    Describe {
        /// Routine to describe
        #[arg(value_enum)]
        routine: Routine,
    },
    /// Run a routine against the simulated robot
    Run {
        /// Routine to run
        #[arg(value_enum)]
        routine: Routine,
        /// Scheduler config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Tick period in milliseconds
        #[arg(long)]
        period_ms: Option<u64>,
        /// Stop after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Strategies => {
            for strategy in CompositionStrategy::ALL {
                println!(
                    "  {:<18} {:<11} {}",
                    strategy,
                    strategy.primary_slot().unwrap_or("-"),
                    if strategy.is_concurrent() { "concurrent" } else { "serial" },
                );
            }
        }
        Commands::Describe { routine } => {
            let task = routine.build(&Robot::new(), Rc::new(SystemClock::new()))?;
            println!("{}", task.outline().to_json_pretty()?);
        }
        Commands::Run {
            routine,
            config,
            period_ms,
            max_ticks,
        } => {
            let mut config = match config {
                Some(path) => SchedulerConfig::from_json_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => SchedulerConfig::default(),
            };
            if let Some(ms) = period_ms {
                config = config.with_tick_period(Duration::from_millis(ms));
            }
            if max_ticks.is_some() {
                config = config.with_max_ticks(max_ticks);
            }
            config.validate()?;

            run(routine, config).await?;
        }
    }

    Ok(())
}

async fn run(routine: Routine, config: SchedulerConfig) -> Result<()> {
    let robot = Robot::new();
    let task = routine.build(&robot, Rc::new(SystemClock::new()))?;

    let mut interval = tokio::time::interval(config.tick_period());
    let max_ticks = config.max_ticks;
    let mut scheduler = TaskScheduler::new(config);
    let id = scheduler.register(task)?;
    info!(%id, ?routine, "Running routine");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = scheduler.tick();
                debug!(tick = report.tick, "{}", robot);
                if report.active == 0 {
                    info!(ticks = report.tick, "Routine complete");
                    break;
                }
                if max_ticks.is_some_and(|max| report.tick >= max) {
                    warn!(ticks = report.tick, "Tick limit reached, cancelling");
                    scheduler.cancel_all();
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("Interrupted");
                scheduler.cancel_all();
                break;
            }
        }
    }

    println!("{}", robot);
    Ok(())
}
