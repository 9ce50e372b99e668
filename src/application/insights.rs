//! Insight generation contract and prompt construction.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub const SYSTEM_PROMPT: &str = "You are a senior market analyst. Respond only with valid JSON.";

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("insight generation is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("insight request failed: {0}")]
    Request(String),
    #[error("insight service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("insight response was malformed: {0}")]
    Malformed(String),
}

/// Derives a JSON insight object from a serialized page record.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(&self, page: &Value) -> Result<Value, InsightError>;
}

/// User prompt describing the page fields the analysis relies on.
pub fn build_prompt(page: &Value) -> String {
    format!(
        "Analyze the LinkedIn company data below and generate business insights.\n\n\
         Company Name: {}\n\
         Industry: {}\n\
         Followers: {}\n\
         Employees: {}\n\
         Description: {}\n\
         Specialties: {}\n",
        field(page, "name"),
        field(page, "industry"),
        field(page, "followers"),
        field(page, "head_count"),
        field(page, "description"),
        field(page, "specialties"),
    )
}

fn field(page: &Value, key: &str) -> String {
    match page.get(key) {
        None | Some(Value::Null) => "unknown".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}
