use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use tribauto::crawler::Crawler;
use tribauto::export::{self, CheckpointStore};
use tribauto::normalize;
use tribauto::scraper::WebScraper;
use tribauto::types::Mode;
use tribauto::utils::CatalogStats;

#[derive(Parser)]
#[command(name = "tribauto")]
#[command(about = "A latribuneauto.com vehicle price scraper", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum ListFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, ValueEnum)]
enum CatalogFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the brands offered by the site's brand dropdown
    Brands {
        #[arg(long, value_parser = parse_mode, help = "Catalog to query: 'new' or 'used'")]
        mode: Mode,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: ListFormat,
    },
    /// List the models of one brand
    Models {
        #[arg(long, value_parser = parse_mode, help = "Catalog to query: 'new' or 'used'")]
        mode: Mode,

        #[arg(long, help = "Site-assigned brand id (see the brands command)")]
        brand: String,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: ListFormat,
    },
    /// Crawl the full catalog and write it as tabular output
    Crawl {
        #[arg(long, value_parser = parse_mode, help = "Catalog to crawl: 'new' or 'used'")]
        mode: Mode,

        #[arg(
            long,
            value_name = "PATH",
            help = "Output file (defaults to catalog-<mode>.<ext>)"
        )]
        output: Option<PathBuf>,

        #[arg(
            short = 'f',
            long = "format",
            value_enum,
            default_value = "csv",
            help = "Output format"
        )]
        format: CatalogFormat,

        #[arg(
            long,
            value_name = "DIR",
            help = "Persist per-brand progress here and resume from it"
        )]
        checkpoint_dir: Option<PathBuf>,

        #[arg(
            long,
            value_name = "N",
            help = "Crawl only the first N brands (smoke runs)"
        )]
        limit: Option<usize>,
    },
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_str(s).map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let scraper = WebScraper::new().unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    match cli.command {
        Commands::Brands { mode, format } => {
            let brands = scraper.fetch_brands(mode).await.unwrap_or_else(|e| {
                log::error!("Error fetching brand list: {}", e);
                process::exit(1);
            });

            match format {
                ListFormat::Json => serialize_json(&brands),
                ListFormat::Text => {
                    if brands.is_empty() {
                        println!("No brands to display.");
                    } else {
                        for (i, brand) in brands.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, brand);
                        }
                    }
                }
            }
        }

        Commands::Models {
            mode,
            brand,
            format,
        } => {
            let models = scraper.fetch_models(mode, &brand).await.unwrap_or_else(|e| {
                log::error!("Error fetching model list: {}", e);
                process::exit(1);
            });

            match format {
                ListFormat::Json => serialize_json(&models),
                ListFormat::Text => {
                    if models.is_empty() {
                        println!("No models to display.");
                    } else {
                        for (i, model) in models.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, model);
                        }
                    }
                }
            }
        }

        Commands::Crawl {
            mode,
            output,
            format,
            checkpoint_dir,
            limit,
        } => {
            if limit == Some(0) {
                log::error!("Invalid args: limit must be greater than 0");
                process::exit(1);
            }

            let mut crawler = Crawler::new(scraper);
            if let Some(dir) = checkpoint_dir {
                crawler = crawler.with_checkpoints(CheckpointStore::new(dir));
            }
            if let Some(limit) = limit {
                crawler = crawler.with_brand_limit(limit);
            }

            let catalog = crawler.crawl(mode).await.unwrap_or_else(|e| {
                log::error!("Crawl aborted: {}", e);
                process::exit(1);
            });

            let normalized = normalize::normalize(&catalog);
            for anomaly in &normalized.anomalies {
                log::warn!("Excluded record: {}", anomaly);
            }
            if !normalized.anomalies.is_empty() {
                log::warn!(
                    "{} record(s) excluded due to unparseable CO2 values",
                    normalized.anomalies.len()
                );
            }

            let output = output.unwrap_or_else(|| {
                let ext = match format {
                    CatalogFormat::Csv => "csv",
                    CatalogFormat::Json => "json",
                };
                PathBuf::from(format!("catalog-{}.{}", mode.slug(), ext))
            });

            let written = match format {
                CatalogFormat::Csv => export::write_csv_file(&output, &normalized.rows),
                CatalogFormat::Json => export::write_json_file(&output, &normalized.rows),
            };
            if let Err(e) = written {
                log::error!("Error writing {}: {}", output.display(), e);
                process::exit(1);
            }

            println!(
                "Wrote {} record(s) to {}",
                normalized.rows.len(),
                output.display()
            );
            print!("{}", CatalogStats::from_rows(&normalized.rows));
        }
    }
}
