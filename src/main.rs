//! `esam-report`: ESAM CSV exports to mpal/stops workbooks.
//!
//! ## Commands
//!
//! - `serve`: upload page and `POST /upload` endpoint
//! - `convert`: convert `<input-dir>/<name>.csv` or an explicit file

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use esam_report::config::{self, AppConfig};
use esam_report::{api, batch, import};

#[derive(Parser)]
#[command(name = "esam-report")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert ESAM CSV exports into mpal/stops Excel reports", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    report: ReportArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by both commands.
#[derive(Args)]
struct ReportArgs {
    /// Treat the first row of the export as data
    #[arg(long, global = true)]
    no_header: bool,

    /// Emit zero rows for missing calendar days in the stops sheet
    #[arg(long, global = true)]
    fill_date_gaps: bool,

    /// Accepted input extensions, comma-separated (e.g. csv,xlsx)
    #[arg(long, global = true)]
    accept: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the upload page and conversion endpoint
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Maximum upload size in megabytes
        #[arg(long)]
        max_upload_mb: Option<u64>,
    },

    /// Convert an export to a workbook
    Convert {
        /// Export name: reads <input-dir>/<NAME>.csv, writes <output-dir>/<NAME>.xlsx
        #[arg(required_unless_present = "file")]
        name: Option<String>,

        /// Convert this file instead of a named export
        #[arg(short, long, conflicts_with = "name")]
        file: Option<PathBuf>,

        /// Output workbook path (with --file; default: <output-dir>/<stem>.xlsx)
        #[arg(short, long, requires = "file")]
        output: Option<PathBuf>,

        #[arg(long)]
        input_dir: Option<PathBuf>,

        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print conversion stats as JSON
        #[arg(long)]
        stats: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    esam_report::init_tracing(cli.json, cli.verbose);

    let mut app_config = AppConfig::from_env().context("Invalid ESAM_* environment")?;
    apply_report_args(&mut app_config, &cli.report)?;

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    match cli.command {
        Commands::Serve {
            bind,
            max_upload_mb,
        } => {
            if let Some(bind) = bind {
                app_config.bind = bind;
            }
            if let Some(mb) = max_upload_mb {
                app_config.max_upload_bytes =
                    config::parse_upload_mb("--max-upload-mb", &mb.to_string())?;
            }
            api::serve(app_config, api::ctrl_c())
                .await
                .context("Upload server failed")
        }
        Commands::Convert {
            name,
            file,
            output,
            input_dir,
            output_dir,
            stats,
        } => {
            if let Some(dir) = input_dir {
                app_config.input_dir = dir;
            }
            if let Some(dir) = output_dir {
                app_config.output_dir = dir;
            }

            let conversion = tokio::task::spawn_blocking(move || match (file, name) {
                (Some(file), _) => {
                    let output = output.unwrap_or_else(|| {
                        let base = file
                            .file_name()
                            .and_then(|n| n.to_str())
                            .map(import::report_file_name)
                            .unwrap_or_else(|| import::report_file_name(""));
                        app_config.output_dir.join(base)
                    });
                    batch::convert_file(&file, &output, &app_config)
                        .with_context(|| format!("Failed to convert {}", file.display()))
                }
                (None, Some(name)) => batch::convert_named(&name, &app_config)
                    .with_context(|| format!("Failed to convert export {name:?}")),
                (None, None) => anyhow::bail!("Either NAME or --file is required"),
            })
            .await
            .context("Conversion task panicked")??;

            if stats {
                println!("{}", serde_json::to_string_pretty(&conversion)?);
            } else {
                println!("{}", conversion.output.display());
            }
            Ok(())
        }
    }
}

fn apply_report_args(app_config: &mut AppConfig, args: &ReportArgs) -> Result<()> {
    if args.no_header {
        app_config.has_header = false;
    }
    if args.fill_date_gaps {
        app_config.fill_date_gaps = true;
    }
    if let Some(list) = &args.accept {
        app_config.accepted_extensions = config::parse_accept("--accept", list)?;
    }
    Ok(())
}
