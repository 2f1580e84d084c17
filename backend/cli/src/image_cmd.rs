//! `simpledo ocr` and `simpledo search`: the image-to-search pipeline.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use markdown::strip_escapes;
use media::{CopyStatus, FileClipboard, PasteEvent};
use simpledo_understanding::{render_report, ReportFormat, RunSnapshot, RunStatus};
use tracing::info;

use crate::app::AppContext;
use crate::terminal_output::{heading, note_error, note_success, note_warn};

pub struct OcrArgs {
    pub image: PathBuf,
    pub mime: Option<String>,
    pub copy_to: Option<PathBuf>,
    pub no_search: bool,
    pub format: ReportFormat,
}

/// Treat `image` as a clipboard paste and run it through OCR and search.
/// Ctrl-C cancels the run.
pub async fn run_ocr(ctx: &AppContext, args: OcrArgs) -> Result<()> {
    warn_if_no_key(ctx);
    let paste = PasteEvent::from_file(&args.image, args.mime.as_deref())?;
    let pipeline = ctx.pipeline(!args.no_search, None);

    let snapshot = tokio::select! {
        snapshot = pipeline.paste(paste) => snapshot?,
        _ = tokio::signal::ctrl_c() => bail!("Cancelled"),
    };
    info!(run_id = snapshot.run_id, status = %snapshot.status, "pipeline run finished");

    print!("{}", snapshot_report(&snapshot, args.format));

    if let Some(path) = &args.copy_to {
        if let Some(status) = pipeline.copy_extracted(&FileClipboard::new(path)) {
            report_copy(&status, path);
        }
    }

    if snapshot.status == RunStatus::Failed {
        bail!(snapshot.error_message.unwrap_or_else(|| "Pipeline failed".to_string()));
    }
    Ok(())
}

/// Query-only grounded search.
pub async fn run_search(ctx: &AppContext, query: &str, format: ReportFormat) -> Result<()> {
    warn_if_no_key(ctx);
    let pipeline = ctx.pipeline(true, None);
    let outcome = tokio::select! {
        outcome = pipeline.search(query) => outcome?,
        _ = tokio::signal::ctrl_c() => bail!("Cancelled"),
    };
    print!("{}", ensure_newline(render_report(&outcome.text, &outcome.sources, format)));
    Ok(())
}

fn warn_if_no_key(ctx: &AppContext) {
    if ctx.config.gemini_api_key().is_none() {
        note_warn("No Gemini API key configured; set GEMINI_API_KEY or gemini.apiKey");
    }
}

fn snapshot_report(snapshot: &RunSnapshot, format: ReportFormat) -> String {
    let mut out = String::new();
    if format == ReportFormat::Html {
        if !snapshot.search_result.is_empty() {
            out.push_str(&render_report(&snapshot.search_result, &snapshot.sources, format));
        }
        return out;
    }

    if !snapshot.extracted_text.is_empty() {
        out.push_str(&format!("{}\n", heading("Extracted text")));
        out.push_str(&format!("{}\n\n", strip_escapes(&snapshot.extracted_text)));
    }
    if !snapshot.search_result.is_empty() {
        out.push_str(&format!("{}\n", heading("Search result")));
        out.push_str(&ensure_newline(render_report(&snapshot.search_result, &snapshot.sources, format)));
    }
    out
}

fn report_copy(status: &CopyStatus, path: &Path) {
    match status {
        CopyStatus::Copied => note_success(&format!("{} ({})", status.message(), path.display())),
        CopyStatus::Failed(reason) => note_error(&format!("{} {reason}", status.message())),
    }
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
