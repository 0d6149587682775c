use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use shared::{
    domain::{ElementId, Notice, NoticeKind},
    error::{
        ANALYZE_FALLBACK_MESSAGE, CLIPBOARD_FAILURE_PREFIX, EMPTY_TEXT_MESSAGE,
        LOGIN_REQUIRED_MESSAGE, NO_FILE_MESSAGE, UPLOAD_FALLBACK_MESSAGE,
    },
    protocol::{
        AnalysisRequest, AnalysisResult, HISTORY_VISIBLE_CLASS, SUMMARY_DOWNLOAD_NAME,
        SUMMARY_MIME_TYPE, UPLOAD_READY_MESSAGE,
    },
};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod backend;
pub mod clipboard;
pub mod object_url;
pub mod page;

pub use backend::{AnalyzeReply, BackendError, HttpBackend, SummarizerBackend, UploadReply};
pub use clipboard::{ClipboardError, ClipboardSource, MissingClipboard};
pub use object_url::{BlobRegistry, ObjectUrlStore};
pub use page::{DownloadLink, InMemoryPage, PageSurface, SelectedFile, SubmitEvent};

#[derive(Debug, Error)]
pub enum BindError {
    #[error("page is missing required element '{0}'")]
    MissingElement(ElementId),
}

/// How a single handler invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The response was rendered onto the page.
    Applied,
    /// Required input was missing; nothing was sent.
    Invalid,
    /// The backend answered with a failure status.
    Rejected,
    /// The backend required a login (401); the response body was not read.
    Unauthorized,
    /// A newer invocation of the same handler was issued before this one resolved.
    Superseded,
    /// Transport, decode or clipboard failure.
    Failed,
}

/// Per-handler ticket counter giving last-issued-wins semantics.
#[derive(Debug, Default)]
struct Generation(AtomicU64);

impl Generation {
    fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}

pub struct PageController {
    page: Arc<dyn PageSurface>,
    backend: Arc<dyn SummarizerBackend>,
    clipboard: Arc<dyn ClipboardSource>,
    object_urls: Arc<dyn ObjectUrlStore>,
    analyze_generation: Generation,
    upload_generation: Generation,
    paste_generation: Generation,
    download_url: Mutex<Option<String>>,
}

impl PageController {
    pub fn bind(
        page: Arc<dyn PageSurface>,
        backend: Arc<dyn SummarizerBackend>,
    ) -> Result<Self, BindError> {
        Self::bind_with_dependencies(
            page,
            backend,
            Arc::new(MissingClipboard),
            Arc::new(BlobRegistry::new()),
        )
    }

    pub fn bind_with_dependencies(
        page: Arc<dyn PageSurface>,
        backend: Arc<dyn SummarizerBackend>,
        clipboard: Arc<dyn ClipboardSource>,
        object_urls: Arc<dyn ObjectUrlStore>,
    ) -> Result<Self, BindError> {
        if let Some(missing) = ElementId::ALL
            .into_iter()
            .find(|id| !page.has_element(*id))
        {
            return Err(BindError::MissingElement(missing));
        }

        Ok(Self {
            page,
            backend,
            clipboard,
            object_urls,
            analyze_generation: Generation::default(),
            upload_generation: Generation::default(),
            paste_generation: Generation::default(),
            download_url: Mutex::new(None),
        })
    }

    /// Returns whether the history panel is shown afterwards.
    pub fn toggle_history(&self) -> bool {
        let shown = self
            .page
            .toggle_class(ElementId::HistoryContainer, HISTORY_VISIBLE_CLASS);
        debug!(shown, "toggled history panel");
        shown
    }

    pub async fn analyze(&self) -> Outcome {
        let text = self.page.value(ElementId::InputText);
        if text.is_empty() {
            self.page.notify(Notice::validation(EMPTY_TEXT_MESSAGE));
            return Outcome::Invalid;
        }

        let ticket = self.analyze_generation.issue();
        let reply = self.backend.analyze(&AnalysisRequest { text }).await;
        // Failures included: only the newest call may notify.
        if !self.analyze_generation.is_current(ticket) {
            warn!(ticket, "dropping stale analyze response");
            return Outcome::Superseded;
        }

        match reply {
            Ok(AnalyzeReply::Completed(result)) => {
                self.render_results(&result);
                info!(
                    ticket,
                    keywords = result.keywords.len(),
                    topics = result.topics.len(),
                    "rendered analysis result"
                );
                Outcome::Applied
            }
            Ok(AnalyzeReply::Rejected { status, payload }) => {
                warn!(status, error = ?payload.error, "analyze request rejected");
                self.page
                    .notify(Notice::backend(payload.message_or(ANALYZE_FALLBACK_MESSAGE)));
                Outcome::Rejected
            }
            Err(err) => {
                warn!(%err, "analyze request failed");
                self.page
                    .notify(Notice::backend(format!("{ANALYZE_FALLBACK_MESSAGE} ({err})")));
                Outcome::Failed
            }
        }
    }

    fn render_results(&self, result: &AnalysisResult) {
        self.page.set_text(ElementId::SummaryText, &result.summary);
        self.page
            .set_text(ElementId::KeywordsText, &result.keywords_line());
        self.page
            .replace_list_items(ElementId::TopicsList, &result.topics);
        self.page.set_text(ElementId::SentimentText, &result.sentiment);
    }

    pub async fn upload(&self, event: &mut SubmitEvent) -> Outcome {
        event.prevent_default();

        let mut files = self.page.selected_files(ElementId::FileInput);
        if files.is_empty() {
            self.page.notify(Notice::validation(NO_FILE_MESSAGE));
            return Outcome::Invalid;
        }
        if files.len() > 1 {
            debug!(count = files.len(), "multiple files selected; sending the first");
        }
        let file = files.swap_remove(0);

        let ticket = self.upload_generation.issue();
        let reply = self.backend.upload(file).await;
        if !self.upload_generation.is_current(ticket) {
            warn!(ticket, "dropping stale upload response");
            return Outcome::Superseded;
        }

        match reply {
            Ok(UploadReply::Document(bytes)) => {
                let size_bytes = bytes.len();
                let url = self.object_urls.create(bytes, SUMMARY_MIME_TYPE);
                self.replace_download_url(url.clone());
                self.page.set_visible(ElementId::DownloadLink, true);
                self.page
                    .set_link(ElementId::DownloadLink, &url, SUMMARY_DOWNLOAD_NAME);
                info!(ticket, size_bytes, "summary document ready for download");
                self.page.notify(Notice::info(UPLOAD_READY_MESSAGE));
                Outcome::Applied
            }
            Ok(UploadReply::Unauthorized) => {
                self.page
                    .notify(Notice::new(NoticeKind::Auth, LOGIN_REQUIRED_MESSAGE));
                Outcome::Unauthorized
            }
            Ok(UploadReply::Rejected { status, payload }) => {
                warn!(status, error = ?payload.error, "upload request rejected");
                self.page
                    .notify(Notice::backend(payload.message_or(UPLOAD_FALLBACK_MESSAGE)));
                Outcome::Rejected
            }
            Err(err) => {
                warn!(%err, "upload request failed");
                self.page
                    .notify(Notice::backend(format!("{UPLOAD_FALLBACK_MESSAGE} ({err})")));
                Outcome::Failed
            }
        }
    }

    fn replace_download_url(&self, url: String) {
        let previous = self
            .download_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(url);
        if let Some(previous) = previous {
            self.object_urls.revoke(&previous);
        }
    }

    pub async fn paste_from_clipboard(&self) -> Outcome {
        let ticket = self.paste_generation.issue();
        let read = self.clipboard.read_text().await;
        if !self.paste_generation.is_current(ticket) {
            warn!(ticket, "dropping stale clipboard read");
            return Outcome::Superseded;
        }

        match read {
            Ok(text) => {
                self.page.set_value(ElementId::InputText, &text);
                debug!(chars = text.chars().count(), "pasted clipboard text");
                Outcome::Applied
            }
            Err(err) => {
                warn!(%err, "clipboard read failed");
                self.page.notify(Notice::new(
                    NoticeKind::Clipboard,
                    format!("{CLIPBOARD_FAILURE_PREFIX}{err}"),
                ));
                Outcome::Failed
            }
        }
    }

    pub fn download_url(&self) -> Option<String> {
        self.download_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Releases the current download reference. Safe to call more than once.
    pub fn unload(&self) {
        let current = self
            .download_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(url) = current {
            self.object_urls.revoke(&url);
        }
    }
}

impl Drop for PageController {
    fn drop(&mut self) {
        self.unload();
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
