use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{null_as_default, text_units, OutputFormat, VocabularyEntry},
    error::ValidationError,
};

pub fn translate_route() -> &'static str {
    "/api/v1/translate"
}

pub fn health_route() -> &'static str {
    "/api/health"
}

pub fn downloads_route() -> &'static str {
    "/downloads"
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub output_format: OutputFormat,
    pub include_vocabulary: bool,
}

impl TranslationRequest {
    /// Trims `raw_text` and rejects it when empty or longer than `max_units`.
    pub fn new(
        raw_text: &str,
        output_format: OutputFormat,
        include_vocabulary: bool,
        max_units: usize,
    ) -> Result<Self, ValidationError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        let len = text_units(text);
        if len > max_units {
            return Err(ValidationError::TextTooLong {
                len,
                max: max_units,
            });
        }
        Ok(Self {
            text: text.to_string(),
            output_format,
            include_vocabulary,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslationResponse {
    /// Missing or null means the service did not report success.
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vec<VocabularyEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_document_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

impl TranslationResponse {
    pub fn vocabulary(&self) -> &[VocabularyEntry] {
        self.vocabulary.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: NaiveDateTime,
    pub service: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
