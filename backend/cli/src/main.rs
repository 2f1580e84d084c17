mod app;
mod config_cmd;
mod image_cmd;
mod render_cmd;
mod terminal_output;
mod todo_cmd;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use simpledo_understanding::ReportFormat;

use app::AppContext;
use config_cmd::ConfigCommands;
use image_cmd::OcrArgs;
use terminal_output::{note_error, supports_color};
use todo_cmd::TodoCommands;

#[derive(Parser)]
#[command(name = "simpledo")]
#[command(about = "SimpleDo: to-dos plus image-to-search")]
#[command(version)]
struct Cli {
    /// Config directory (defaults to $SIMPLEDO_CONFIG_DIR or ~/.simpledo)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the to-do list
    #[command(subcommand)]
    Todo(TodoCommands),
    /// Extract text from an image and search the web for it
    Ocr {
        image: PathBuf,
        /// Override the detected image type, e.g. image/png
        #[arg(long)]
        mime: Option<String>,
        /// Write the extracted text to this file
        #[arg(long)]
        copy_to: Option<PathBuf>,
        /// Stop after text extraction
        #[arg(long)]
        no_search: bool,
        /// ansi, html or plain
        #[arg(short, long)]
        format: Option<ReportFormat>,
    },
    /// Grounded web search for a query
    Search {
        query: String,
        #[arg(short, long)]
        format: Option<ReportFormat>,
    },
    /// Render a markdown file with unsafe content removed (`-` for stdin)
    Render {
        file: PathBuf,
        #[arg(short, long)]
        format: Option<ReportFormat>,
    },
    /// Inspect or edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            note_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_dir = cli.config_dir.unwrap_or_else(simpledo_config::config_dir);

    // config commands must work even when the file does not validate
    if let Commands::Config(cmd) = cli.command {
        return config_cmd::run(&config_dir, cmd).await;
    }

    let ctx = AppContext::load(config_dir).await?;
    ctx.init_logging()?;

    match cli.command {
        Commands::Todo(cmd) => todo_cmd::run(&ctx, cmd),
        Commands::Ocr { image, mime, copy_to, no_search, format } => {
            let args = OcrArgs { image, mime, copy_to, no_search, format: output_format(format) };
            image_cmd::run_ocr(&ctx, args).await
        }
        Commands::Search { query, format } => image_cmd::run_search(&ctx, &query, output_format(format)).await,
        Commands::Render { file, format } => render_cmd::run(&file, output_format(format)),
        Commands::Config(_) => Ok(()),
    }
}

fn output_format(requested: Option<ReportFormat>) -> ReportFormat {
    requested.unwrap_or(if supports_color() { ReportFormat::Ansi } else { ReportFormat::Plain })
}
