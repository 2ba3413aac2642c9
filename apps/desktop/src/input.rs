/// Collects stdin lines into paragraphs; a blank line ends a paragraph.
#[derive(Debug, Default)]
pub struct ParagraphBuffer {
    lines: Vec<String>,
}

impl ParagraphBuffer {
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return self.take();
        }
        self.lines.push(line.to_string());
        None
    }

    pub fn finish(&mut self) -> Option<String> {
        self.take()
    }

    fn take(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.lines).join("\n"))
    }
}

/// File name for a downloaded document, taken from the last path segment.
pub fn document_filename(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != ".." => name.to_string(),
        _ => "translation.docx".to_string(),
    }
}
