//! Region abstractions the form controller writes to.
//!
//! A front end hands these to the controller at construction time; the
//! controller never looks anything up on its own.

use std::sync::Arc;

use shared::domain::VocabularyEntry;

pub mod memory;

pub trait Region: Send + Sync {
    fn set_visible(&self, visible: bool);
}

pub trait TextSink: Send + Sync {
    fn set_text(&self, text: &str);
}

pub trait TextRegion: Region + TextSink {}

impl<T: Region + TextSink> TextRegion for T {}

pub trait VocabularyTable: Send + Sync {
    fn clear(&self);
    fn append_row(&self, entry: &VocabularyEntry);
}

pub trait LinkTarget: Send + Sync {
    fn set_href(&self, href: &str);
}

pub trait SubmitTrigger: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    fn set_label(&self, label: &str);
}

#[derive(Clone)]
pub struct VocabularyView {
    pub section: Arc<dyn Region>,
    pub table: Arc<dyn VocabularyTable>,
}

#[derive(Clone)]
pub struct DownloadView {
    pub section: Arc<dyn Region>,
    pub link: Arc<dyn LinkTarget>,
}

/// Every region of the translation form. Vocabulary and download regions are
/// optional; rendering skips them when absent.
#[derive(Clone)]
pub struct FormView {
    pub trigger: Arc<dyn SubmitTrigger>,
    pub loading: Arc<dyn Region>,
    pub result: Arc<dyn Region>,
    pub output: Arc<dyn TextSink>,
    pub error: Arc<dyn TextRegion>,
    pub vocabulary: Option<VocabularyView>,
    pub download: Option<DownloadView>,
}

impl FormView {
    pub fn new(
        trigger: Arc<dyn SubmitTrigger>,
        loading: Arc<dyn Region>,
        result: Arc<dyn Region>,
        output: Arc<dyn TextSink>,
        error: Arc<dyn TextRegion>,
    ) -> Self {
        Self {
            trigger,
            loading,
            result,
            output,
            error,
            vocabulary: None,
            download: None,
        }
    }

    pub fn with_vocabulary(
        mut self,
        section: Arc<dyn Region>,
        table: Arc<dyn VocabularyTable>,
    ) -> Self {
        self.vocabulary = Some(VocabularyView { section, table });
        self
    }

    pub fn with_download(mut self, section: Arc<dyn Region>, link: Arc<dyn LinkTarget>) -> Self {
        self.download = Some(DownloadView { section, link });
        self
    }
}
