//! Layout config – the intermediate representation between pagination and
//! PDF rendering. This is the "frozen" structure that encodes exactly what
//! goes on each page.

use serde::{Deserialize, Serialize};

use crate::style::TextAlign;

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "LayoutConfig::default_title")]
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One page of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub boxes: Vec<LayoutBox>,
}

/// What a box represents on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxRole {
    Title,
    Heading,
    TableHeader,
    TableRow,
    TableCell,
    InstructionLabel,
    Step,
    Rule,
    Footer,
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    /// Position relative to page top-left, in points.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<BoxRole>,

    /// Visual styling
    #[serde(default)]
    pub background_color: Option<[f32; 4]>,
    #[serde(default)]
    pub border: Option<BorderStyle>,
    /// Horizontal rule through the vertical centre of the box.
    #[serde(default)]
    pub rule: Option<RuleStyle>,

    #[serde(default)]
    pub text: Option<TextContent>,

    /// Children (nested boxes)
    #[serde(default)]
    pub children: Vec<LayoutBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    pub width: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleStyle {
    pub thickness: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// Pre-wrapped lines of text.
    pub lines: Vec<TextLine>,
    pub font_size: f32,
    pub bold: bool,
    pub color: [f32; 4],
    pub line_height: f32,
    #[serde(default)]
    pub text_align: TextAlign,
    /// Numbered-list prefix (e.g. "1."), drawn `marker_indent` pt to the left
    /// of the box on the first line.
    #[serde(default)]
    pub list_marker: Option<String>,
    #[serde(default)]
    pub marker_indent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// X offset within the layout box (for alignment)
    pub x_offset: f32,
    /// Y offset from the top of the text content area
    pub y_offset: f32,
}

impl LayoutConfig {
    /// Create an empty US Letter layout config.
    pub fn letter() -> Self {
        Self {
            title: Self::default_title(),
            // Letter: 8.5in × 11in
            page_width_pt: 612.0,
            page_height_pt: 792.0,
            pages: Vec::new(),
        }
    }

    fn default_title() -> String {
        "Recipe".to_string()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// All text on every page in reading order, one entry per box.
    pub fn texts(&self) -> Vec<String> {
        self.pages.iter().flat_map(PageLayout::texts).collect()
    }
}

impl PageLayout {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            boxes: Vec::new(),
        }
    }

    /// Text of every box on this page in reading order, one entry per box.
    /// Table rows are joined as `cell | cell`; steps carry their marker.
    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        for lbox in &self.boxes {
            lbox.collect_texts(&mut out);
        }
        out
    }

    /// Boxes with the given role, searched depth-first.
    pub fn find_role(&self, role: BoxRole) -> Vec<&LayoutBox> {
        let mut found = Vec::new();
        for lbox in &self.boxes {
            lbox.find_role(role, &mut found);
        }
        found
    }
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            role: None,
            background_color: None,
            border: None,
            rule: None,
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: BoxRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Move this box and all its descendants down by `dy` points.
    pub fn translate_y(&mut self, dy: f32) {
        self.y += dy;
        for child in &mut self.children {
            child.translate_y(dy);
        }
    }

    /// Plain text of this box, lines joined with spaces.
    pub fn plain_text(&self) -> Option<String> {
        let text = self.text.as_ref()?;
        let body = text
            .lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Some(match &text.list_marker {
            Some(marker) => format!("{marker} {body}"),
            None => body,
        })
    }

    fn collect_texts(&self, out: &mut Vec<String>) {
        if matches!(self.role, Some(BoxRole::TableRow | BoxRole::TableHeader)) {
            let cells: Vec<String> = self
                .children
                .iter()
                .filter_map(LayoutBox::plain_text)
                .collect();
            out.push(cells.join(" | "));
            return;
        }
        if let Some(t) = self.plain_text() {
            out.push(t);
        }
        for child in &self.children {
            child.collect_texts(out);
        }
    }

    fn find_role<'a>(&'a self, role: BoxRole, found: &mut Vec<&'a LayoutBox>) {
        if self.role == Some(role) {
            found.push(self);
        }
        for child in &self.children {
            child.find_role(role, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(s: &str, role: BoxRole) -> LayoutBox {
        let mut b = LayoutBox::new(0.0, 0.0, 100.0, 12.0).with_role(role);
        b.text = Some(TextContent {
            lines: vec![TextLine {
                text: s.to_string(),
                x_offset: 0.0,
                y_offset: 0.0,
            }],
            font_size: 10.0,
            bold: false,
            color: [0.0, 0.0, 0.0, 1.0],
            line_height: 12.0,
            text_align: TextAlign::Left,
            list_marker: None,
            marker_indent: 0.0,
        });
        b
    }

    #[test]
    fn row_text_is_joined_with_bars() {
        let mut row = LayoutBox::new(0.0, 0.0, 200.0, 12.0).with_role(BoxRole::TableRow);
        row.children.push(text_box("Flour", BoxRole::TableCell));
        row.children.push(text_box("100 g", BoxRole::TableCell));
        let page = PageLayout {
            page_index: 0,
            boxes: vec![row],
        };
        assert_eq!(page.texts(), vec!["Flour | 100 g".to_string()]);
        assert_eq!(page.find_role(BoxRole::TableCell).len(), 2);
    }

    #[test]
    fn translate_moves_children() {
        let mut row = LayoutBox::new(0.0, 5.0, 200.0, 12.0);
        row.children.push(LayoutBox::new(0.0, 5.0, 100.0, 12.0));
        row.translate_y(10.0);
        assert_eq!(row.y, 15.0);
        assert_eq!(row.children[0].y, 15.0);
    }

    #[test]
    fn json_roundtrip_keeps_roles() {
        let mut config = LayoutConfig::letter();
        config.pages.push(PageLayout {
            page_index: 0,
            boxes: vec![text_box("Test Cake", BoxRole::Title)],
        });
        let parsed = LayoutConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(parsed, config);
    }
}
