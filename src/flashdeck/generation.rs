//! # Card Generation Contract
//!
//! Cards are written by an external service. The engine only builds the request and
//! validates what comes back:
//!
//! - Request: `{"prompt": ..., "number_of_cards": N, "mode": "basic" | "formula" | "code"}`
//!   with the credential in an `api-key` header.
//! - Response: a JSON array of objects with string `question` and `answer`, and
//!   optionally `hint`, `code` and `formula` (string or null).
//!
//! The response is untrusted: anything off-shape is a [`FlashdeckError::Format`] and no
//! cards are produced. Ids and progress fields are assigned locally, never by the service.

use crate::error::{FlashdeckError, Result};
use crate::model::NewCard;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Basic,
    Formula,
    Code,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Basic => "basic",
            GenerationMode::Formula => "formula",
            GenerationMode::Code => "code",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = FlashdeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(GenerationMode::Basic),
            "formula" => Ok(GenerationMode::Formula),
            "code" => Ok(GenerationMode::Code),
            other => Err(FlashdeckError::Api(format!(
                "Unknown generation mode '{}' (expected basic, formula or code)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub number_of_cards: u32,
    pub mode: GenerationMode,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, number_of_cards: u32, mode: GenerationMode) -> Self {
        Self {
            prompt: prompt.into(),
            number_of_cards,
            mode,
        }
    }
}

/// Anything that can turn a prompt into card text.
pub trait CardGenerator {
    fn generate(&self, request: &GenerationRequest, credential: &str) -> Result<Vec<NewCard>>;
}

/// Blocking HTTP client for the hosted generation service.
pub struct HttpGenerator {
    url: String,
    timeout: Duration,
}

impl HttpGenerator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl CardGenerator for HttpGenerator {
    fn generate(&self, request: &GenerationRequest, credential: &str) -> Result<Vec<NewCard>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| FlashdeckError::Generation(format!("could not build client: {}", e)))?;

        debug!(
            "Requesting {} {} cards from {}",
            request.number_of_cards, request.mode, self.url
        );
        let response = client
            .post(&self.url)
            .header("api-key", credential)
            .json(request)
            .send()
            .map_err(|e| FlashdeckError::Generation(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Generation service responded with status {}", status);
            return Err(FlashdeckError::Generation(format!(
                "service responded with status {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| FlashdeckError::Format(format!("response is not JSON: {}", e)))?;
        parse_generated_cards(&body)
    }
}

/// Validate a generation response and extract the card text.
pub fn parse_generated_cards(body: &Value) -> Result<Vec<NewCard>> {
    let Some(items) = body.as_array() else {
        return Err(FlashdeckError::Format(
            "expected an array of cards".to_string(),
        ));
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let object = item.as_object().ok_or_else(|| {
                FlashdeckError::Format(format!("card {} is not an object", i + 1))
            })?;
            Ok(NewCard {
                question: required_text(object, "question", i)?,
                answer: required_text(object, "answer", i)?,
                hint: optional_text(object, "hint", i)?,
                code: optional_text(object, "code", i)?,
                formula: optional_text(object, "formula", i)?,
            })
        })
        .collect()
}

fn required_text(object: &Map<String, Value>, field: &str, index: usize) -> Result<String> {
    match object.get(field) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(FlashdeckError::Format(format!(
            "card {}: {} must be text",
            index + 1,
            field
        ))),
        None => Err(FlashdeckError::Format(format!(
            "card {}: missing {}",
            index + 1,
            field
        ))),
    }
}

fn optional_text(object: &Map<String, Value>, field: &str, index: usize) -> Result<Option<String>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(FlashdeckError::Format(format!(
            "card {}: {} must be text",
            index + 1,
            field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_with_service_keys() {
        let request = GenerationRequest::new("Krebs cycle", 5, GenerationMode::Formula);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"prompt": "Krebs cycle", "number_of_cards": 5, "mode": "formula"})
        );
    }

    #[test]
    fn parses_full_and_minimal_cards() {
        let body = json!([
            {"question": "Q1", "answer": "A1", "hint": "H", "code": "fn main() {}", "formula": "E=mc^2"},
            {"question": "Q2", "answer": "A2", "hint": null, "formula": ""}
        ]);
        let cards = parse_generated_cards(&body).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].hint.as_deref(), Some("H"));
        assert_eq!(cards[0].code.as_deref(), Some("fn main() {}"));
        assert_eq!(cards[1].hint, None);
        assert_eq!(cards[1].formula, None);
    }

    #[test]
    fn rejects_missing_answer() {
        let body = json!([{"question": "Q1", "answer": "A1"}, {"question": "Q2"}]);
        let err = parse_generated_cards(&body).unwrap_err();
        assert!(matches!(err, FlashdeckError::Format(msg) if msg.contains("card 2: missing answer")));
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(parse_generated_cards(&json!({"question": "Q"})).is_err());
        assert!(parse_generated_cards(&json!([42])).is_err());
        assert!(parse_generated_cards(&json!([{"question": 1, "answer": "A"}])).is_err());
        assert!(parse_generated_cards(&json!([{"question": "Q", "answer": "A", "hint": 3}])).is_err());
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(parse_generated_cards(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn mode_parses() {
        assert_eq!("code".parse::<GenerationMode>().unwrap(), GenerationMode::Code);
        assert!("poetry".parse::<GenerationMode>().is_err());
    }
}
