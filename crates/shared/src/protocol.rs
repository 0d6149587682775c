use serde::{Deserialize, Serialize};

pub const ANALYZE_PATH: &str = "/analyze";
pub const UPLOAD_PATH: &str = "/upload";
pub const UPLOAD_FIELD: &str = "file";
pub const SUMMARY_DOWNLOAD_NAME: &str = "summarized_output.pdf";
pub const SUMMARY_MIME_TYPE: &str = "application/pdf";
pub const HISTORY_VISIBLE_CLASS: &str = "show";
pub const UPLOAD_READY_MESSAGE: &str = "File summarized and ready for download.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub keywords: Vec<String>,
    pub topics: Vec<String>,
    pub sentiment: String,
}

impl AnalysisResult {
    pub fn keywords_line(&self) -> String {
        self.keywords.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_analysis_body() {
        let body = r#"{
            "summary": "S",
            "keywords": ["a", "b"],
            "topics": ["t1", "t2"],
            "sentiment": "POSITIVE (0.98)"
        }"#;
        let result: AnalysisResult = serde_json::from_str(body).expect("decode");
        assert_eq!(result.keywords_line(), "a, b");
        assert_eq!(result.topics, vec!["t1".to_string(), "t2".to_string()]);
        assert_eq!(result.sentiment, "POSITIVE (0.98)");
    }

    #[test]
    fn empty_keywords_render_as_empty_line() {
        let result = AnalysisResult {
            summary: String::new(),
            keywords: Vec::new(),
            topics: Vec::new(),
            sentiment: String::new(),
        };
        assert_eq!(result.keywords_line(), "");
    }
}
