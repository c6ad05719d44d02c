use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use visitor_tracker::config::ConfigLoader;
use visitor_tracker::metrics::collector::MetricsCollector;
use visitor_tracker::metrics::snapshot::MetricsSnapshot;
use visitor_tracker::output::{console::ConsoleOutput, json::JsonOutput, LogWriter, OutputHandler};

#[derive(Parser)]
#[command(name = "visitor-tracker")]
#[command(version = "0.1.0")]
#[command(about = "Records live visitor counts from rendered pages into a CSV log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sweep over the configured targets and append it to the log
    Run {
        /// Path to the configuration file (JSON/YAML/TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Show a progress bar (stderr)
        #[arg(short, long, default_value_t = false)]
        progress: bool,

        /// Print the record as JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Override the log file from the configuration
        #[arg(short, long)]
        log_file: Option<PathBuf>,
    },
    /// Validate a configuration file
    Check {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info"); }
    }
    let cli = Cli::parse();
    let logger = env_logger::Builder::from_default_env().build();
    let multi = Arc::new(indicatif::MultiProgress::new());

    match cli.command {
        Commands::Run { config, progress, json, log_file } => {
            let level = logger.filter();
            if progress {
                indicatif_log_bridge::LogWrapper::new((*multi).clone(), logger).try_init()?;
            } else {
                log::set_boxed_logger(Box::new(logger))?;
            }
            log::set_max_level(level);

            log::info!("Loading config from {:?}", config);
            let config_data = ConfigLoader::load(&config)?;
            let targets = config_data.targets();
            log::info!("Loaded monitor {} with {} targets", config_data.name, targets.len());

            let log_path = log_file.unwrap_or_else(|| PathBuf::from(&config_data.log_path));
            let mut log_writer = LogWriter::new(&log_path, &targets, config_data.unavailable_marker.clone());

            let metrics = Arc::new(MetricsCollector::new());
            let renderer = ConfigLoader::create_renderer(&config_data);
            let collector = ConfigLoader::create_collector(&config_data, metrics);

            let mut progress_bar: Option<ProgressBar> = None;
            let mut progress_task = None;
            if progress {
                let pb = multi.add(ProgressBar::new(targets.len() as u64));
                pb.set_style(ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("#>-"));

                let mut metrics_rx = collector.watch_metrics();
                let pb_clone = pb.clone();
                progress_bar = Some(pb);
                progress_task = Some(tokio::spawn(async move {
                    while metrics_rx.changed().await.is_ok() {
                        let snapshot: MetricsSnapshot = metrics_rx.borrow().clone();
                        pb_clone.set_position(snapshot.targets_processed);
                        pb_clone.set_message(format!(
                            "Available: {} | Failed: {}",
                            snapshot.targets_succeeded, snapshot.targets_failed
                        ));
                    }
                }));
            }

            log::info!("Starting sweep...");
            let result = collector.run_sweep(&renderer, &targets).await;

            if let Some(task) = progress_task {
                task.abort();
            }
            if let Some(pb) = progress_bar {
                pb.finish_and_clear();
            }

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    log::error!("Sweep failed, nothing written to {}: {}", log_path.display(), e);
                    std::process::exit(1);
                }
            };

            log_writer.write(&record).await?;
            log::info!("Appended sweep to {}", log_path.display());

            if json {
                let mut out = JsonOutput::stdout(&targets);
                out.write(&record).await?;
                out.close().await?;
            } else {
                let mut out = ConsoleOutput::new(&targets, config_data.unavailable_marker.clone(), Some(multi.clone()));
                out.write(&record).await?;

                let final_metrics = collector.get_metrics();
                println!("\n✅ Sweep Completed:");
                println!("   Targets Available: {}/{}", final_metrics.targets_succeeded, final_metrics.targets_total);
                println!(
                    "   Failures: {} navigation, {} not found, {} timed out",
                    final_metrics.navigation_failures,
                    final_metrics.not_found_failures,
                    final_metrics.readiness_timeouts
                );
                println!("   Average Duration: {}ms", final_metrics.avg_extraction_ms);
                println!("   Total Time: {:.1}s", final_metrics.elapsed_seconds);
            }
        }
        Commands::Check { config } => {
            match ConfigLoader::load(&config) {
                Ok(cfg) => {
                    println!("✅ Config is valid:");
                    println!("   Name: {}", cfg.name);
                    println!("   Locator: {}", cfg.locator);
                    println!("   Log: {}", cfg.log_path);
                    for target in cfg.targets() {
                        println!("   {} -> {}", target.label, target.url);
                    }
                }
                Err(e) => {
                    eprintln!("❌ Config error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
