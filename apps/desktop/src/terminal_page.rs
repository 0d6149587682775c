//! Page surface that keeps element state in memory and echoes renders to the terminal.

use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use client_core::{DownloadLink, InMemoryPage, PageSurface, SelectedFile};
use shared::domain::{ElementId, Notice, NoticeKind};

type Sink = Mutex<Box<dyn Write + Send>>;

pub struct TerminalPage {
    page: InMemoryPage,
    out: Sink,
    err: Sink,
}

impl TerminalPage {
    pub fn stdio() -> Self {
        Self::with_writers(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_writers(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            page: InMemoryPage::with_all_elements(),
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    pub fn set_files(&self, files: Vec<SelectedFile>) {
        self.page.set_files(ElementId::FileInput, files);
    }

    pub fn download_link(&self) -> Option<DownloadLink> {
        self.page.link(ElementId::DownloadLink)
    }

    pub fn history_shown(&self) -> bool {
        self.page
            .has_class(ElementId::HistoryContainer, shared::protocol::HISTORY_VISIBLE_CLASS)
    }

    fn print(sink: &Sink, line: &str) {
        let mut writer = sink.lock().unwrap_or_else(PoisonError::into_inner);
        // Terminal output is best effort; a closed pipe must not abort rendering.
        let _ = writeln!(writer, "{line}");
        let _ = writer.flush();
    }
}

fn label(id: ElementId) -> Option<&'static str> {
    match id {
        ElementId::SummaryText => Some("Summary"),
        ElementId::KeywordsText => Some("Keywords"),
        ElementId::SentimentText => Some("Sentiment"),
        _ => None,
    }
}

fn notice_label(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Validation => "input",
        NoticeKind::Backend => "error",
        NoticeKind::Auth => "login required",
        NoticeKind::Clipboard => "clipboard",
        NoticeKind::Info => "info",
    }
}

impl PageSurface for TerminalPage {
    fn has_element(&self, id: ElementId) -> bool {
        self.page.has_element(id)
    }

    fn value(&self, id: ElementId) -> String {
        self.page.value(id)
    }

    fn set_value(&self, id: ElementId, value: &str) {
        self.page.set_value(id, value);
    }

    fn set_text(&self, id: ElementId, text: &str) {
        self.page.set_text(id, text);
        if let Some(label) = label(id) {
            Self::print(&self.out, &format!("{label}: {text}"));
        }
    }

    fn replace_list_items(&self, id: ElementId, items: &[String]) {
        self.page.replace_list_items(id, items);
        if id == ElementId::TopicsList {
            Self::print(&self.out, "Topics:");
            for (index, item) in items.iter().enumerate() {
                Self::print(&self.out, &format!("  {}. {item}", index + 1));
            }
        }
    }

    fn toggle_class(&self, id: ElementId, class: &str) -> bool {
        self.page.toggle_class(id, class)
    }

    fn set_visible(&self, id: ElementId, visible: bool) {
        self.page.set_visible(id, visible);
    }

    fn set_link(&self, id: ElementId, href: &str, download_name: &str) {
        self.page.set_link(id, href, download_name);
    }

    fn selected_files(&self, id: ElementId) -> Vec<SelectedFile> {
        self.page.selected_files(id)
    }

    fn notify(&self, notice: Notice) {
        Self::print(
            &self.err,
            &format!("[{}] {}", notice_label(notice.kind), notice.message),
        );
        self.page.notify(notice);
    }
}
