//! Page surface the controller renders into, plus an in-memory implementation.

use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard, PoisonError},
};

use shared::domain::{ElementId, Notice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Form submission whose default navigation can be suppressed.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub href: String,
    pub file_name: String,
    pub visible: bool,
}

/// Everything the controller is allowed to read from or write to the page.
///
/// Writes are synchronous; the controller never holds page state across an
/// await point.
pub trait PageSurface: Send + Sync {
    fn has_element(&self, id: ElementId) -> bool;
    fn value(&self, id: ElementId) -> String;
    fn set_value(&self, id: ElementId, value: &str);
    fn set_text(&self, id: ElementId, text: &str);
    /// Drops the current children of a list element and appends one item per entry.
    fn replace_list_items(&self, id: ElementId, items: &[String]);
    /// Returns whether the class is present after toggling.
    fn toggle_class(&self, id: ElementId, class: &str) -> bool;
    fn set_visible(&self, id: ElementId, visible: bool);
    fn set_link(&self, id: ElementId, href: &str, download_name: &str);
    fn selected_files(&self, id: ElementId) -> Vec<SelectedFile>;
    fn notify(&self, notice: Notice);
}

#[derive(Debug, Clone)]
struct ElementState {
    value: String,
    text: String,
    items: Vec<String>,
    classes: HashSet<String>,
    visible: bool,
    href: Option<String>,
    download_name: Option<String>,
    files: Vec<SelectedFile>,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            value: String::new(),
            text: String::new(),
            items: Vec::new(),
            classes: HashSet::new(),
            visible: true,
            href: None,
            download_name: None,
            files: Vec::new(),
        }
    }
}

#[derive(Default)]
struct PageState {
    elements: HashMap<ElementId, ElementState>,
    notices: Vec<Notice>,
}

/// Page held entirely in memory. Used by headless hosts and tests.
///
/// Writes to an element that was never registered are ignored, mirroring a
/// lookup that finds nothing.
#[derive(Default)]
pub struct InMemoryPage {
    state: Mutex<PageState>,
}

impl InMemoryPage {
    /// Page with the full element contract; the download link starts hidden.
    pub fn with_all_elements() -> Self {
        let page = Self::default();
        {
            let mut state = page.lock();
            for id in ElementId::ALL {
                state.elements.insert(id, ElementState::default());
            }
            if let Some(link) = state.elements.get_mut(&ElementId::DownloadLink) {
                link.visible = false;
            }
        }
        page
    }

    pub fn without(self, id: ElementId) -> Self {
        self.lock().elements.remove(&id);
        self
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_element<R>(&self, id: ElementId, f: impl FnOnce(&mut ElementState) -> R) -> Option<R> {
        self.lock().elements.get_mut(&id).map(f)
    }

    fn read_element<R>(&self, id: ElementId, f: impl FnOnce(&ElementState) -> R) -> Option<R> {
        self.lock().elements.get(&id).map(f)
    }

    pub fn set_files(&self, id: ElementId, files: Vec<SelectedFile>) {
        self.with_element(id, |element| element.files = files);
    }

    pub fn text(&self, id: ElementId) -> String {
        self.read_element(id, |element| element.text.clone())
            .unwrap_or_default()
    }

    pub fn list_items(&self, id: ElementId) -> Vec<String> {
        self.read_element(id, |element| element.items.clone())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.read_element(id, |element| element.classes.contains(class))
            .unwrap_or(false)
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.read_element(id, |element| element.visible)
            .unwrap_or(false)
    }

    pub fn link(&self, id: ElementId) -> Option<DownloadLink> {
        self.read_element(id, |element| {
            element.href.clone().map(|href| DownloadLink {
                href,
                file_name: element.download_name.clone().unwrap_or_default(),
                visible: element.visible,
            })
        })
        .flatten()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.lock().notices.clone()
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.lock().notices)
    }
}

impl PageSurface for InMemoryPage {
    fn has_element(&self, id: ElementId) -> bool {
        self.lock().elements.contains_key(&id)
    }

    fn value(&self, id: ElementId) -> String {
        self.read_element(id, |element| element.value.clone())
            .unwrap_or_default()
    }

    fn set_value(&self, id: ElementId, value: &str) {
        self.with_element(id, |element| element.value = value.to_string());
    }

    fn set_text(&self, id: ElementId, text: &str) {
        self.with_element(id, |element| element.text = text.to_string());
    }

    fn replace_list_items(&self, id: ElementId, items: &[String]) {
        self.with_element(id, |element| {
            element.items.clear();
            element.items.extend(items.iter().cloned());
        });
    }

    fn toggle_class(&self, id: ElementId, class: &str) -> bool {
        self.with_element(id, |element| {
            if element.classes.remove(class) {
                false
            } else {
                element.classes.insert(class.to_string());
                true
            }
        })
        .unwrap_or(false)
    }

    fn set_visible(&self, id: ElementId, visible: bool) {
        self.with_element(id, |element| element.visible = visible);
    }

    fn set_link(&self, id: ElementId, href: &str, download_name: &str) {
        self.with_element(id, |element| {
            element.href = Some(href.to_string());
            element.download_name = Some(download_name.to_string());
        });
    }

    fn selected_files(&self, id: ElementId) -> Vec<SelectedFile> {
        self.read_element(id, |element| element.files.clone())
            .unwrap_or_default()
    }

    fn notify(&self, notice: Notice) {
        self.lock().notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacing_list_items_discards_previous_children() {
        let page = InMemoryPage::with_all_elements();
        page.replace_list_items(ElementId::TopicsList, &["old".to_string()]);
        page.replace_list_items(
            ElementId::TopicsList,
            &["t1".to_string(), "t2".to_string()],
        );
        assert_eq!(page.list_items(ElementId::TopicsList), vec!["t1", "t2"]);
    }

    #[test]
    fn writes_to_missing_elements_are_ignored() {
        let page = InMemoryPage::with_all_elements().without(ElementId::SummaryText);
        page.set_text(ElementId::SummaryText, "S");
        assert!(!page.has_element(ElementId::SummaryText));
        assert_eq!(page.text(ElementId::SummaryText), "");
    }

    #[test]
    fn download_link_starts_hidden_without_target() {
        let page = InMemoryPage::with_all_elements();
        assert!(!page.is_visible(ElementId::DownloadLink));
        assert_eq!(page.link(ElementId::DownloadLink), None);
    }
}
