use std::fmt;

use serde::{Deserialize, Serialize};

/// Element identifiers the page markup must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementId {
    ShowHistoryBtn,
    HistoryContainer,
    AnalyzeBtn,
    InputText,
    SummaryText,
    KeywordsText,
    TopicsList,
    SentimentText,
    UploadForm,
    FileInput,
    DownloadLink,
    PasteBtn,
}

impl ElementId {
    pub const ALL: [ElementId; 12] = [
        ElementId::ShowHistoryBtn,
        ElementId::HistoryContainer,
        ElementId::AnalyzeBtn,
        ElementId::InputText,
        ElementId::SummaryText,
        ElementId::KeywordsText,
        ElementId::TopicsList,
        ElementId::SentimentText,
        ElementId::UploadForm,
        ElementId::FileInput,
        ElementId::DownloadLink,
        ElementId::PasteBtn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementId::ShowHistoryBtn => "show-history-btn",
            ElementId::HistoryContainer => "history-container",
            ElementId::AnalyzeBtn => "analyze-btn",
            ElementId::InputText => "input-text",
            ElementId::SummaryText => "summary-text",
            ElementId::KeywordsText => "keywords-text",
            ElementId::TopicsList => "topics-list",
            ElementId::SentimentText => "sentiment-text",
            ElementId::UploadForm => "upload-form",
            ElementId::FileInput => "file-input",
            ElementId::DownloadLink => "download-link",
            ElementId::PasteBtn => "paste-btn",
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Validation,
    Backend,
    Auth,
    Clipboard,
    Info,
}

/// A message the user has to acknowledge before continuing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Validation, message)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Backend, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, message)
    }
}
