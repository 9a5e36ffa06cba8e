//! Restoreport CLI - turn deal exports into restaurant reports
//!
//! ```bash
//! restoreport transform deals.csv -o report.csv   # Build the report file
//! restoreport title "Ресторан 15.03.2024 13:30"   # Debug the title parser
//! restoreport serve                               # Start HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use restoreport::{
    api::logs::LOG_BROADCASTER, caption, error_chunks, parse_title, server::start_server,
    transform_file, Config, TransformOptions,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "restoreport")]
#[command(about = "Build restaurant discount reports from deal CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a deal CSV into the report CSV
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// CSV delimiter
        #[arg(short, long, default_value = ";")]
        delimiter: char,
    },

    /// Parse a single deal title and print what was extracted
    Title {
        /// Deal title text
        text: String,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match Config::from_env() {
        Ok(config) => {
            LOG_BROADCASTER.set_min_level(config.log_level);
            run(cli.command, config).await
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Transform {
            input,
            output,
            delimiter,
        } => cmd_transform(&input, output.as_deref(), delimiter, &config).await,

        Commands::Title { text } => cmd_title(&text),

        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            start_server(config).await?;
            Ok(())
        }
    }
}

async fn cmd_transform(
    input: &Path,
    output: Option<&Path>,
    delimiter: char,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| format!("Delimiter must be a single-byte character, got '{}'", delimiter))?;

    let result = transform_file(input, TransformOptions { delimiter }).await?;

    match output {
        Some(p) => {
            fs::write(p, &result.output_document)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => print!("{}", result.output_text()),
    }

    eprintln!("\n{}", caption(&result));
    for chunk in error_chunks(&result.errors, config.message_limit) {
        eprintln!("\n{}", chunk);
    }

    Ok(())
}

fn cmd_title(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_title(text)?;
    println!("Date:  {}", parsed.date.format("%d.%m.%Y"));
    println!("Time:  {}", parsed.time);
    println!("Order: {}", parsed.fallback_order);
    Ok(())
}
