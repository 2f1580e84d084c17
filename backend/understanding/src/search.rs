//! Grounded web search keyed on free text.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::gemini::{CallError, Content, GenerateRequest, GenerateResponse, GenerativeClient, Part, Tool};

pub const SEARCH_SYSTEM_PROMPT: &str = "You are a concise research assistant. \
Use Google Search to find what the user's text refers to and answer from the search results. \
Format the answer as Markdown: one `##` heading per distinct match, \
bold the key facts, and keep each section to a few sentences.";

pub const NO_RESULT_PLACEHOLDER: &str = "No meaningful response generated. Try a different query.";

/// A web citation backing a search answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Markdown answer, or the placeholder when none came back.
    pub text: String,
    pub sources: Vec<Source>,
}

impl SearchOutcome {
    pub fn is_placeholder(&self) -> bool {
        self.text == NO_RESULT_PLACEHOLDER
    }
}

pub fn search_request(query: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content { role: None, parts: vec![Part::text(query)] }],
        tools: vec![Tool::google_search()],
        system_instruction: Some(Content::text(SEARCH_SYSTEM_PROMPT)),
    }
}

/// Citations from the first candidate's grounding metadata.
///
/// Attributions come first, then chunks. Entries without both a uri and a
/// title are dropped, as are repeated uris.
pub fn extract_sources(response: &GenerateResponse) -> Vec<Source> {
    let Some(metadata) = response.first_candidate().and_then(|c| c.grounding_metadata.as_ref()) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    metadata
        .grounding_attributions
        .iter()
        .chain(&metadata.grounding_chunks)
        .filter_map(|r| {
            let web = r.web.as_ref()?;
            let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
            let title = web.title.as_deref().filter(|t| !t.is_empty())?;
            Some(Source { uri: uri.to_string(), title: title.to_string() })
        })
        .filter(|s| seen.insert(s.uri.clone()))
        .collect()
}

/// One search attempt. The query must already be validated.
pub async fn grounded_search(client: &dyn GenerativeClient, query: &str) -> Result<SearchOutcome, CallError> {
    info!(query_chars = query.chars().count(), "[Search] grounded search");
    let response = client.generate(&search_request(query)).await?;

    let text = match response.first_text() {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => NO_RESULT_PLACEHOLDER.to_string(),
    };
    Ok(SearchOutcome { text, sources: extract_sources(&response) })
}
