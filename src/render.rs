//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use printpdf::*;

use crate::error::{RecipeError, Result};
use crate::fonts::FontMetrics;
use crate::layout_config::{BorderStyle, LayoutBox, LayoutConfig, RuleStyle};

/// Render a LayoutConfig into PDF bytes.
pub fn render_pdf(config: &LayoutConfig) -> Result<Vec<u8>> {
    if !(config.page_width_pt > 0.0 && config.page_height_pt > 0.0) {
        return Err(RecipeError::Render(format!(
            "page size must be positive, got {} x {} pt",
            config.page_width_pt, config.page_height_pt
        )));
    }

    let page_w = Mm(config.page_width_pt * 0.352778); // pt → mm
    let page_h = Mm(config.page_height_pt * 0.352778);
    let metrics = FontMetrics::default();

    let mut doc = PdfDocument::new(&config.title);

    let mut pages = Vec::new();
    for page_layout in &config.pages {
        let mut ops = Vec::new();
        for lbox in &page_layout.boxes {
            render_box(&mut ops, lbox, config.page_height_pt, &metrics);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    // Ensure at least one page.
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    log::debug!("rendering {} page(s) for '{}'", pages.len(), config.title);
    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());

    Ok(bytes)
}

/// Map text to Windows-1252 bytes, the code page behind the builtin fonts'
/// WinAnsiEncoding. Characters outside it become `?`.
fn winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{201A}' => 0x82, // single low-9 quote
            '\u{201E}' => 0x84, // double low-9 quote
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{2122}' => 0x99, // trademark
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Wrap [`winansi_bytes`] in a `String` for `TextItem::Text`.
///
/// printpdf 0.8 writes builtin-font text with `str::as_bytes`, so the bytes
/// must reach it unchanged. The result is only ever read back as bytes and
/// is never inspected as UTF-8.
fn to_winlatin(s: &str) -> String {
    match String::from_utf8(winansi_bytes(s)) {
        Ok(text) => text,
        // SAFETY: the bytes are not UTF-8; the string is handed straight to
        // printpdf, which only calls `as_bytes` on it.
        #[allow(unsafe_code)]
        Err(e) => unsafe { String::from_utf8_unchecked(e.into_bytes()) },
    }
}

fn rgb(c: &[f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

fn write_text(ops: &mut Vec<Op>, text: &str, x: f32, y: f32, size: f32, font: BuiltinFont, color: &[f32; 4]) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point { x: Pt(x), y: Pt(y) },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::SetFillColor { col: rgb(color) });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(to_winlatin(text))],
        font,
    });
    ops.push(Op::EndTextSection);
}

/// Recursively render a LayoutBox and its children into PDF ops.
fn render_box(ops: &mut Vec<Op>, lbox: &LayoutBox, page_height: f32, metrics: &FontMetrics) {
    // PDF coordinate system: origin at bottom-left.
    // Our layout uses origin at top-left. Convert:
    let pdf_y = page_height - lbox.y;
    let x1 = lbox.x;
    let y1 = pdf_y - lbox.height;
    let x2 = lbox.x + lbox.width;
    let y2 = pdf_y;

    if let Some(bg) = &lbox.background_color {
        ops.push(Op::SetFillColor { col: rgb(bg) });
        ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![point(x1, y1), point(x2, y1), point(x2, y2), point(x1, y2)],
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    if let Some(border) = &lbox.border {
        ops.push(Op::SetOutlineColor { col: rgb(&border.color) });
        ops.push(Op::SetOutlineThickness { pt: Pt(border.width) });
        ops.push(Op::DrawLine {
            line: Line {
                points: vec![point(x1, y2), point(x2, y2), point(x2, y1), point(x1, y1)],
                is_closed: true,
            },
        });
    }

    if let Some(rule) = &lbox.rule {
        let mid = pdf_y - lbox.height / 2.0;
        ops.push(Op::SetOutlineColor { col: rgb(&rule.color) });
        ops.push(Op::SetOutlineThickness { pt: Pt(rule.thickness) });
        ops.push(Op::DrawLine {
            line: Line {
                points: vec![point(x1, mid), point(x2, mid)],
                is_closed: false,
            },
        });
    }

    if let Some(text) = &lbox.text {
        let font = if text.bold {
            BuiltinFont::HelveticaBold
        } else {
            BuiltinFont::Helvetica
        };
        // Baseline sits inside each line box with the spare leading split
        // evenly above and below the glyphs.
        let half_leading = (text.line_height - metrics.text_height_pt(text.font_size)) / 2.0;
        let baseline_offset = half_leading + metrics.ascender_pt(text.font_size);

        for tline in &text.lines {
            if tline.text.is_empty() {
                continue;
            }
            let text_x = lbox.x + tline.x_offset;
            let text_y = pdf_y - tline.y_offset - baseline_offset;
            write_text(ops, &tline.text, text_x, text_y, text.font_size, font, &text.color);
        }

        if let Some(marker) = &text.list_marker {
            let first_y = text.lines.first().map_or(0.0, |l| l.y_offset);
            write_text(
                ops,
                marker,
                lbox.x - text.marker_indent,
                pdf_y - first_y - baseline_offset,
                text.font_size,
                BuiltinFont::Helvetica,
                &text.color,
            );
        }
    }

    for child in &lbox.children {
        render_box(ops, child, page_height, metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_empty_page() {
        let config = LayoutConfig::letter();
        let bytes = render_pdf(&config).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        // PDF magic number
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut config = LayoutConfig::letter();
        config.page_width_pt = 0.0;
        assert!(matches!(render_pdf(&config), Err(RecipeError::Render(_))));
    }

    #[test]
    fn winlatin_maps_common_glyphs() {
        assert_eq!(to_winlatin("Mix.").as_bytes(), b"Mix.");
        assert_eq!(to_winlatin("\u{2013}").as_bytes(), &[0x96u8]);
        assert_eq!(to_winlatin("\u{00E9}").as_bytes(), &[0xE9u8]);
        assert_eq!(to_winlatin("\u{4E2D}").as_bytes(), b"?");
    }

    #[test]
    fn winansi_covers_quotes_and_trademark() {
        assert_eq!(winansi_bytes("\u{201A}\u{201E}"), vec![0x82u8, 0x84]);
        assert_eq!(winansi_bytes("Brand\u{2122}"), b"Brand\x99".to_vec());
        assert_eq!(winansi_bytes("\u{20AC}5"), vec![0x80u8, b'5']);
    }

    #[test]
    fn rule_and_border_emit_lines() {
        let mut lbox = LayoutBox::new(72.0, 100.0, 420.0, 2.8);
        lbox.rule = Some(RuleStyle {
            thickness: 2.8,
            color: [0.0, 0.0, 0.0, 1.0],
        });
        lbox.border = Some(BorderStyle {
            width: 0.25,
            color: [0.5, 0.5, 0.5, 1.0],
        });
        let mut ops = Vec::new();
        render_box(&mut ops, &lbox, 792.0, &FontMetrics::default());
        let lines = ops.iter().filter(|op| matches!(op, Op::DrawLine { .. })).count();
        assert_eq!(lines, 2);
    }
}
