//! Optical Character Recognition via a vision-capable Gemini model.

use media::ImageBlob;
use tracing::info;

use crate::gemini::{CallError, Content, GenerateRequest, GenerativeClient, Part};

pub const OCR_SYSTEM_PROMPT: &str = "You are an Optical Character Recognition (OCR) expert. \
Read every piece of legible text in the provided image and reproduce it exactly, \
keeping the original line breaks where they carry meaning. \
Respond only with the extracted text, with no commentary, labels or formatting.";

pub const OCR_USER_PROMPT: &str = "Extract the text from this image.";

/// What one successful OCR call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrOutcome {
    Text(String),
    /// The call succeeded but nothing usable came back.
    Empty,
}

pub fn ocr_request(image: &ImageBlob) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content::user(vec![
            Part::text(OCR_USER_PROMPT),
            Part::inline(image.mime_type(), image.to_base64()),
        ])],
        tools: Vec::new(),
        system_instruction: Some(Content::text(OCR_SYSTEM_PROMPT)),
    }
}

/// One OCR attempt. Retrying is the caller's business.
pub async fn extract_text(client: &dyn GenerativeClient, image: &ImageBlob) -> Result<OcrOutcome, CallError> {
    info!(mime = %image.mime_type(), bytes = image.len(), "[OCR] extracting text");
    let response = client.generate(&ocr_request(image)).await?;

    Ok(match response.first_text().map(str::trim) {
        Some(text) if !text.is_empty() => OcrOutcome::Text(text.to_string()),
        _ => OcrOutcome::Empty,
    })
}
