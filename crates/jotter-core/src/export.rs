//! PDF export
//!
//! Export is split in two steps. [`layout`] is a pure function that places
//! every line of a note on A4 pages; [`render`] paints a layout with the
//! built-in Helvetica fonts and returns the PDF bytes.

use printpdf::{BuiltinFont, Mm, PdfDocument};
use scraper::{ElementRef, Html, Node};
use thiserror::Error;

use crate::models::Note;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;

const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 12.0;

/// Millimetres per typographic point
const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph width as a fraction of the font size
const AVG_GLYPH_EM: f32 = 0.5;
const LINE_SPACING: f32 = 1.4;

/// Elements that end a line when flattened to text
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "tr",
];

/// Errors from PDF rendering
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to render PDF: {0}")]
    Pdf(String),
}

/// One line of text at a fixed position, measured from the bottom-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub size: f32,
    pub bold: bool,
    pub x_mm: f32,
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// A note laid out on one or more pages
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub pages: Vec<PageLayout>,
}

impl Layout {
    /// All text in reading order
    pub fn text(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter().map(|l| l.text.as_str()))
            .collect()
    }
}

/// Running cursor that starts new pages as the flow reaches the bottom margin
struct Flow {
    pages: Vec<PageLayout>,
    /// Distance already used from the top margin, in mm
    used_mm: f32,
}

impl Flow {
    fn new() -> Self {
        Self {
            pages: vec![PageLayout::default()],
            used_mm: 0.0,
        }
    }

    fn usable_height() -> f32 {
        PAGE_HEIGHT_MM - 2.0 * MARGIN_MM
    }

    fn push(&mut self, text: String, size: f32, bold: bool, x_mm: f32) {
        let line_height = size * LINE_SPACING * PT_TO_MM;
        if self.used_mm + line_height > Self::usable_height() {
            self.pages.push(PageLayout::default());
            self.used_mm = 0.0;
        }
        self.used_mm += line_height;

        let y_mm = PAGE_HEIGHT_MM - MARGIN_MM - self.used_mm;
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PlacedLine {
                text,
                size,
                bold,
                x_mm,
                y_mm,
            });
        }
    }

    fn skip(&mut self, size: f32) {
        self.used_mm += size * LINE_SPACING * PT_TO_MM;
    }
}

/// Compute page placement for `note` without touching any PDF machinery
pub fn layout(note: &Note) -> Layout {
    let mut flow = Flow::new();

    let title_chars = chars_per_line(TITLE_SIZE);
    for line in wrap(&to_pdf_text(&note.title), title_chars) {
        let width = text_width_mm(&line, TITLE_SIZE);
        let x = ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_MM);
        flow.push(line, TITLE_SIZE, true, x);
    }
    flow.skip(BODY_SIZE);

    let body_chars = chars_per_line(BODY_SIZE);
    let body = flatten_markup(&note.content);
    for paragraph in body.lines() {
        for line in wrap(&to_pdf_text(paragraph), body_chars) {
            flow.push(line, BODY_SIZE, false, MARGIN_MM);
        }
    }

    Layout { pages: flow.pages }
}

/// Render `note` to PDF bytes
pub fn render(note: &Note) -> Result<Vec<u8>, ExportError> {
    let layout = layout(note);

    let doc_title = if note.title.trim().is_empty() {
        "Untitled".to_string()
    } else {
        to_pdf_text(&note.title)
    };

    let (doc, first_page, first_layer) = PdfDocument::new(
        doc_title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            let font = if line.bold { &bold } else { &regular };
            layer.use_text(line.text.as_str(), line.size, Mm(line.x_mm), Mm(line.y_mm), font);
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

/// Attachment filename for a note title
pub fn filename(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return "untitled.pdf".to_string();
    }

    let safe: String = trimmed
        .chars()
        .map(|c| {
            if !c.is_ascii() || c.is_ascii_control() || matches!(c, '"' | ';' | '\\' | '/') {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{}.pdf", safe)
}

/// Flatten rich-text markup to plain lines
///
/// Content without any tags is returned as is.
pub fn flatten_markup(content: &str) -> String {
    if !content.contains('<') {
        return content.to_string();
    }

    let fragment = Html::parse_fragment(content);
    let mut out = String::new();
    collect_text(fragment.root_element(), &mut out);
    out.trim_end_matches('\n').to_string()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if BLOCK_ELEMENTS.contains(&name) && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Replace characters the built-in fonts cannot encode
fn to_pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if c.is_control() => '?',
            c if (c as u32) > 0xFF => '?',
            c => c,
        })
        .collect()
}

fn chars_per_line(size: f32) -> usize {
    let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let glyph = size * AVG_GLYPH_EM * PT_TO_MM;
    ((usable / glyph) as usize).max(1)
}

fn text_width_mm(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_EM * PT_TO_MM
}

/// Greedy word wrap; words longer than a line are split
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewNote, OwnerId};

    fn note(title: &str, content: &str) -> Note {
        Note::new(OwnerId::parse("alice").unwrap(), NewNote::new(title, content))
    }

    #[test]
    fn test_empty_content_still_has_title() {
        let layout = layout(&note("Groceries", ""));
        assert_eq!(layout.pages.len(), 1);

        let first = &layout.pages[0].lines[0];
        assert_eq!(first.text, "Groceries");
        assert_eq!(first.size, TITLE_SIZE);
        assert!(first.bold);
    }

    #[test]
    fn test_title_is_centered() {
        let layout = layout(&note("Hi", "body"));
        let title = &layout.pages[0].lines[0];
        let width = text_width_mm("Hi", TITLE_SIZE);
        assert!((title.x_mm + width / 2.0 - PAGE_WIDTH_MM / 2.0).abs() < 0.01);
    }

    #[test]
    fn test_body_follows_title() {
        let layout = layout(&note("Title", "first line\nsecond line"));
        assert_eq!(layout.text(), vec!["Title", "first line", "second line"]);

        let lines = &layout.pages[0].lines;
        assert!(lines[1].y_mm < lines[0].y_mm);
        assert!(lines[2].y_mm < lines[1].y_mm);
        assert_eq!(lines[1].size, BODY_SIZE);
        assert_eq!(lines[1].x_mm, MARGIN_MM);
    }

    #[test]
    fn test_long_content_breaks_pages() {
        let content = (0..200)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let layout = layout(&note("Long", &content));

        assert!(layout.pages.len() > 1);
        for page in &layout.pages {
            for line in &page.lines {
                assert!(line.y_mm >= MARGIN_MM - 0.01);
                assert!(line.y_mm <= PAGE_HEIGHT_MM - MARGIN_MM);
            }
        }
        // Flow is continuous: nothing lost across breaks
        assert_eq!(layout.text().len(), 201);
        assert_eq!(layout.text().last(), Some(&"line 199"));
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "word ".repeat(100);
        let lines = wrap(&text, 20);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
        assert_eq!(lines.join(" ").split_whitespace().count(), 100);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap(&"x".repeat(25), 10);
        assert_eq!(lines, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn test_wrap_empty_keeps_blank_line() {
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn test_flatten_markup() {
        let html = "<h1>Heading</h1><p>One &amp; two</p><p>a<br>b</p>";
        assert_eq!(flatten_markup(html), "Heading\nOne & two\na\nb");
    }

    #[test]
    fn test_flatten_plain_text_unchanged() {
        assert_eq!(flatten_markup("milk, eggs\nbread"), "milk, eggs\nbread");
    }

    #[test]
    fn test_unencodable_characters_replaced() {
        assert_eq!(to_pdf_text("café ☕"), "café ?");
    }

    #[test]
    fn test_filename() {
        assert_eq!(filename("Groceries"), "Groceries.pdf");
        assert_eq!(filename("a\"b;c/d"), "a_b_c_d.pdf");
        assert_eq!(filename("Ünïcode"), "_n_code.pdf");
        assert_eq!(filename("   "), "untitled.pdf");
        assert_eq!(filename(""), "untitled.pdf");
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render(&note("Groceries", "milk, eggs")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_empty_note() {
        let bytes = render(&note("", "")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_multi_page() {
        let content = "paragraph\n".repeat(300);
        let bytes = render(&note("Many", &content)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
