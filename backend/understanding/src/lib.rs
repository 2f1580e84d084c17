//! Image understanding for SimpleDo: OCR and grounded search against Gemini,
//! the retry policy they share, and the pipeline that chains them.

pub mod gemini;
pub mod ocr;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod search;

#[cfg(test)]
mod testing;

pub use gemini::{CallError, GeminiClient, GenerateRequest, GenerateResponse, GenerativeClient};
pub use ocr::{extract_text, OcrOutcome};
pub use pipeline::{ImageSearchPipeline, PipelineError, PipelineOptions, RunSnapshot, RunStatus, RunTicket};
pub use report::{render_report, report_nodes, ReportFormat};
pub use retry::{with_retry, RetryError, RetryPolicy, Sleeper, TokioSleeper};
pub use search::{grounded_search, SearchOutcome, Source, NO_RESULT_PLACEHOLDER};
