use std::path::PathBuf;
use structopt::StructOpt;

use accesswatch::config::DetectionConfig;
use accesswatch::detection::{Detector, SuspiciousActivityDetector};
use accesswatch::input::{JsonLoader, LogLoader};
use accesswatch::output::{OutputFormat, OutputHandler};

/// Suspicious access-log activity analyzer
#[derive(StructOpt, Debug)]
#[structopt(name = "accesswatch", about = "Batch analyzer for suspicious access-log activity")]
pub enum Cli {
    /// Analyze a batch of access logs and print a report
    Detect {
        /// Path to the JSON access-log file
        #[structopt(short, long, default_value = "logs.json")]
        file: PathBuf,
        /// Path to the detection config (.json or .toml)
        #[structopt(short, long, default_value = "config.json")]
        config: PathBuf,
        /// Report format: json, jsonl or console
        #[structopt(long, default_value = "json")]
        format: String,
        /// Write the report to this file instead of stdout
        #[structopt(short, long)]
        output: Option<PathBuf>,
        /// Enable debug logging
        #[structopt(short, long)]
        verbose: bool,
    },
    /// Generate a default detection config file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::from_args();

    let verbose = matches!(cli, Cli::Detect { verbose: true, .. });
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli {
        Cli::Detect { file, config: config_path, format, output, .. } => {
            let config = DetectionConfig::from_file(&config_path)?;
            log::info!("Configuration loaded from {:?}", config_path);

            let records = JsonLoader::new().load(&file)?;
            log::info!("Loaded {} record(s) from {:?}", records.len(), file);

            let report = SuspiciousActivityDetector::new().detect(&records, &config);

            let mut output_handler = OutputHandler::new(OutputFormat::from_str(&format), output)?;
            output_handler.write_report(&report)?;
            output_handler.flush()?;
        }
        Cli::Config { output } => {
            DetectionConfig::default().to_file(&output)?;
            println!("Default configuration written to: {:?}", output);
        }
    }

    Ok(())
}
