use serde::{Deserialize, Serialize};

pub const ANALYZE_FALLBACK_MESSAGE: &str = "Error analyzing the text.";
pub const UPLOAD_FALLBACK_MESSAGE: &str = "Error uploading or summarizing the file.";
pub const EMPTY_TEXT_MESSAGE: &str = "Please enter or paste text to analyze.";
pub const NO_FILE_MESSAGE: &str = "Please select a file to upload.";
pub const LOGIN_REQUIRED_MESSAGE: &str =
    "You need to log in first to access the file upload feature.";
pub const CLIPBOARD_FAILURE_PREFIX: &str = "Failed to read clipboard contents: ";

/// Failure body returned by the backend alongside a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    /// Server message when present and non-empty, otherwise `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        match self.error.as_deref() {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_error_falls_back() {
        assert_eq!(
            ErrorPayload::default().message_or(ANALYZE_FALLBACK_MESSAGE),
            ANALYZE_FALLBACK_MESSAGE
        );
        assert_eq!(
            ErrorPayload::new("").message_or(UPLOAD_FALLBACK_MESSAGE),
            UPLOAD_FALLBACK_MESSAGE
        );
        assert_eq!(
            ErrorPayload::new("bad input").message_or(ANALYZE_FALLBACK_MESSAGE),
            "bad input"
        );
    }

    #[test]
    fn decodes_body_without_error_field() {
        let payload: ErrorPayload = serde_json::from_str("{}").expect("decode");
        assert_eq!(payload.error, None);
    }
}
