//! Headless regions that only remember what was written to them.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};

use shared::domain::VocabularyEntry;

use super::{FormView, LinkTarget, Region, SubmitTrigger, TextSink, VocabularyTable};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct MemoryRegion {
    visible: AtomicBool,
    text: Mutex<String>,
}

impl MemoryRegion {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn text(&self) -> String {
        lock(&self.text).clone()
    }
}

impl Region for MemoryRegion {
    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}

impl TextSink for MemoryRegion {
    fn set_text(&self, text: &str) {
        *lock(&self.text) = text.to_string();
    }
}

#[derive(Debug, Default)]
pub struct MemoryTable {
    rows: Mutex<Vec<VocabularyEntry>>,
}

impl MemoryTable {
    pub fn rows(&self) -> Vec<VocabularyEntry> {
        lock(&self.rows).clone()
    }
}

impl VocabularyTable for MemoryTable {
    fn clear(&self) {
        lock(&self.rows).clear();
    }

    fn append_row(&self, entry: &VocabularyEntry) {
        lock(&self.rows).push(entry.clone());
    }
}

#[derive(Debug, Default)]
pub struct MemoryLink {
    href: Mutex<Option<String>>,
}

impl MemoryLink {
    pub fn href(&self) -> Option<String> {
        lock(&self.href).clone()
    }
}

impl LinkTarget for MemoryLink {
    fn set_href(&self, href: &str) {
        *lock(&self.href) = Some(href.to_string());
    }
}

#[derive(Debug)]
pub struct MemoryTrigger {
    enabled: AtomicBool,
    label: Mutex<String>,
}

impl Default for MemoryTrigger {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            label: Mutex::new(String::new()),
        }
    }
}

impl MemoryTrigger {
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn label(&self) -> String {
        lock(&self.label).clone()
    }
}

impl SubmitTrigger for MemoryTrigger {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn set_label(&self, label: &str) {
        *lock(&self.label) = label.to_string();
    }
}

/// A complete in-memory form; keeps handles so callers can inspect what the
/// controller rendered.
#[derive(Debug, Default, Clone)]
pub struct MemoryForm {
    pub trigger: Arc<MemoryTrigger>,
    pub loading: Arc<MemoryRegion>,
    pub result: Arc<MemoryRegion>,
    pub output: Arc<MemoryRegion>,
    pub error: Arc<MemoryRegion>,
    pub vocabulary_section: Arc<MemoryRegion>,
    pub vocabulary_table: Arc<MemoryTable>,
    pub download_section: Arc<MemoryRegion>,
    pub download_link: Arc<MemoryLink>,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the required regions.
    pub fn minimal_view(&self) -> FormView {
        FormView::new(
            self.trigger.clone(),
            self.loading.clone(),
            self.result.clone(),
            self.output.clone(),
            self.error.clone(),
        )
    }

    pub fn view(&self) -> FormView {
        self.minimal_view()
            .with_vocabulary(
                self.vocabulary_section.clone(),
                self.vocabulary_table.clone(),
            )
            .with_download(self.download_section.clone(), self.download_link.clone())
    }
}
