//! Form regions rendered to the terminal. Results go to stdout, status and
//! errors to stderr.

use std::sync::{Arc, Mutex, MutexGuard};

use client_core::view::{FormView, LinkTarget, Region, SubmitTrigger, TextSink, VocabularyTable};
use shared::domain::VocabularyEntry;
use tracing::trace;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Submit trigger and loading indicator share the busy label.
#[derive(Default)]
pub struct StatusLine {
    label: Mutex<String>,
}

impl SubmitTrigger for StatusLine {
    fn set_enabled(&self, enabled: bool) {
        trace!(enabled, "submit trigger toggled");
    }

    fn set_label(&self, label: &str) {
        *lock(&self.label) = label.to_string();
    }
}

impl Region for StatusLine {
    fn set_visible(&self, visible: bool) {
        if visible {
            eprintln!("{}", lock(&self.label));
        }
    }
}

#[derive(Default)]
struct PanelState {
    output: String,
    rows: Vec<VocabularyEntry>,
    show_vocabulary: bool,
    href: Option<String>,
    show_download: bool,
}

/// Buffers the result regions and prints them once the result is shown.
#[derive(Default)]
pub struct ResultPanel {
    state: Mutex<PanelState>,
}

impl ResultPanel {
    pub fn render(&self) -> String {
        let state = lock(&self.state);
        let mut out = state.output.clone();
        if state.show_vocabulary && !state.rows.is_empty() {
            out.push_str("\n\n");
            out.push_str(&format_table(&state.rows));
        }
        if state.show_download {
            if let Some(href) = &state.href {
                out.push_str("\n\nDocument: ");
                out.push_str(href);
            }
        }
        out
    }
}

impl TextSink for ResultPanel {
    fn set_text(&self, text: &str) {
        lock(&self.state).output = text.to_string();
    }
}

impl VocabularyTable for ResultPanel {
    fn clear(&self) {
        lock(&self.state).rows.clear();
    }

    fn append_row(&self, entry: &VocabularyEntry) {
        lock(&self.state).rows.push(entry.clone());
    }
}

impl LinkTarget for ResultPanel {
    fn set_href(&self, href: &str) {
        lock(&self.state).href = Some(href.to_string());
    }
}

struct ResultRegion(Arc<ResultPanel>);

impl Region for ResultRegion {
    fn set_visible(&self, visible: bool) {
        if visible {
            println!("{}", self.0.render());
        }
    }
}

struct VocabularySection(Arc<ResultPanel>);

impl Region for VocabularySection {
    fn set_visible(&self, visible: bool) {
        lock(&self.0.state).show_vocabulary = visible;
    }
}

struct DownloadSection(Arc<ResultPanel>);

impl Region for DownloadSection {
    fn set_visible(&self, visible: bool) {
        lock(&self.0.state).show_download = visible;
    }
}

#[derive(Default)]
pub struct ErrorLine {
    text: Mutex<String>,
}

impl TextSink for ErrorLine {
    fn set_text(&self, text: &str) {
        *lock(&self.text) = text.to_string();
    }
}

impl Region for ErrorLine {
    fn set_visible(&self, visible: bool) {
        if visible {
            eprintln!("error: {}", lock(&self.text));
        }
    }
}

pub fn terminal_view() -> FormView {
    let status = Arc::new(StatusLine::default());
    let panel = Arc::new(ResultPanel::default());
    FormView::new(
        status.clone(),
        status,
        Arc::new(ResultRegion(panel.clone())),
        panel.clone(),
        Arc::new(ErrorLine::default()),
    )
    .with_vocabulary(Arc::new(VocabularySection(panel.clone())), panel.clone())
    .with_download(Arc::new(DownloadSection(panel.clone())), panel)
}

fn format_table(rows: &[VocabularyEntry]) -> String {
    let english_width = column_width("English", rows.iter().map(|r| r.english.as_str()));
    let chinese_width = column_width("Chinese", rows.iter().map(|r| r.chinese.as_str()));
    let mut lines = vec![format!(
        "{:english_width$}  {:chinese_width$}  Explanation",
        "English", "Chinese"
    )];
    for row in rows {
        lines.push(format!(
            "{:english_width$}  {}  {}",
            row.english,
            pad_display(&row.chinese, chinese_width),
            row.explanation
        ));
    }
    lines.join("\n")
}

/// Terminal cell width, counting CJK characters as two cells.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| match c as u32 {
            0x1100..=0x115F
            | 0x2E80..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6 => 2,
            _ => 1,
        })
        .sum()
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(display_width)
        .chain(std::iter::once(display_width(header)))
        .max()
        .unwrap_or(0)
}

fn pad_display(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(padding))
}
