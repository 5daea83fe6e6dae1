//! Pagination – places laid-out blocks onto pages.
//!
//! Handles:
//! - Page boundaries (content area between the top and bottom margins)
//! - Keep-with-next chains, so a heading never ends a page without its
//!   first row
//! - Forced breaks before a block
//! - The version footer on every page

use crate::fonts::{Face, FontMetrics};
use crate::layout::Block;
use crate::layout_config::*;
use crate::pipeline::PipelineConfig;

/// Height of the run starting at `start` that must stay on one page: the
/// block itself plus every following block linked by `keep_with_next`.
fn keep_chain_height(blocks: &[Block], start: usize) -> f32 {
    let mut height = 0.0;
    for block in &blocks[start..] {
        height += block.height;
        if !block.keep_with_next {
            break;
        }
    }
    height
}

/// Convert blocks into a paginated LayoutConfig.
pub fn paginate(
    blocks: &[Block],
    title: &str,
    version: &str,
    config: &PipelineConfig,
    metrics: &FontMetrics,
) -> LayoutConfig {
    let mut layout = LayoutConfig {
        title: title.to_string(),
        page_width_pt: config.effective_width(),
        page_height_pt: config.effective_height(),
        pages: Vec::new(),
    };

    let content_height = config.content_height();
    let mut current_page = PageLayout::new(0);
    // Vertical position within the content area of the current page.
    let mut cursor = 0.0f32;

    for (i, block) in blocks.iter().enumerate() {
        if block.break_before && !current_page.boxes.is_empty() {
            layout.pages.push(current_page);
            current_page = PageLayout::new(layout.pages.len());
            cursor = 0.0;
        }

        // A chain taller than a page can never fit; fall back to the block
        // alone so the break still happens at a sensible place.
        let mut needed = keep_chain_height(blocks, i);
        if needed > content_height {
            needed = block.height;
        }

        if cursor + needed > content_height && !current_page.boxes.is_empty() {
            layout.pages.push(current_page);
            current_page = PageLayout::new(layout.pages.len());
            cursor = 0.0;
        }

        if block.height > content_height {
            log::warn!(
                "block of {:.1} pt exceeds the {:.1} pt content area on page {}; it will be clipped",
                block.height,
                content_height,
                current_page.page_index + 1
            );
        }

        let dy = config.margin_top + cursor;
        for lbox in &block.boxes {
            let mut placed = lbox.clone();
            placed.translate_y(dy);
            current_page.boxes.push(placed);
        }
        cursor += block.height;
    }

    if !current_page.boxes.is_empty() || layout.pages.is_empty() {
        layout.pages.push(current_page);
    }

    if !version.is_empty() {
        for page in &mut layout.pages {
            page.boxes.push(footer_box(version, config, metrics));
        }
    }

    layout
}

/// Version text right-aligned to the right margin, baseline at half the
/// bottom margin.
fn footer_box(version: &str, config: &PipelineConfig, metrics: &FontMetrics) -> LayoutBox {
    let style = &config.theme.footer;
    let width = config.content_width();
    let text_height = metrics.text_height_pt(style.font_size);
    let baseline = config.effective_height() - config.margin_bottom / 2.0;
    let top = baseline - metrics.ascender_pt(style.font_size);

    let text_w = metrics.measure_text_width(version, style.font_size, Face::from_bold(style.bold));
    let mut lbox = LayoutBox::new(config.margin_left, top, width, text_height).with_role(BoxRole::Footer);
    lbox.text = Some(TextContent {
        lines: vec![TextLine {
            text: version.to_string(),
            x_offset: (width - text_w).max(0.0),
            y_offset: 0.0,
        }],
        font_size: style.font_size,
        bold: style.bold,
        color: style.color.to_array(),
        line_height: text_height,
        text_align: style.align,
        list_marker: None,
        marker_indent: 0.0,
    });
    lbox
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(height: f32, role: BoxRole, keep: bool) -> Block {
        Block {
            height,
            boxes: vec![LayoutBox::new(72.0, 0.0, 100.0, height).with_role(role)],
            keep_with_next: keep,
            break_before: false,
        }
    }

    fn paginate_default(blocks: &[Block], version: &str) -> LayoutConfig {
        paginate(blocks, "T", version, &PipelineConfig::default(), &FontMetrics::default())
    }

    #[test]
    fn single_page() {
        let blocks = vec![block(40.0, BoxRole::Title, false), block(20.0, BoxRole::Step, false)];
        let layout = paginate_default(&blocks, "");
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.pages[0].boxes[0].y, 36.0);
        assert_eq!(layout.pages[0].boxes[1].y, 76.0);
    }

    #[test]
    fn empty_input_still_has_a_page() {
        let layout = paginate_default(&[], "");
        assert_eq!(layout.pages.len(), 1);
        assert!(layout.pages[0].boxes.is_empty());
    }

    #[test]
    fn overflow_starts_new_page() {
        // 720 pt content area: 10 × 100 pt blocks need two pages.
        let blocks: Vec<Block> = (0..10).map(|_| block(100.0, BoxRole::Step, false)).collect();
        let layout = paginate_default(&blocks, "");
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[0].boxes.len(), 7);
        assert_eq!(layout.pages[1].boxes[0].y, 36.0);
        assert_eq!(layout.pages[1].page_index, 1);
    }

    #[test]
    fn heading_moves_with_its_first_row() {
        // 680 pt used; heading (30) fits alone but heading + row (30 + 20) does not.
        let blocks = vec![
            block(680.0, BoxRole::Step, false),
            block(30.0, BoxRole::Heading, true),
            block(20.0, BoxRole::TableRow, false),
        ];
        let layout = paginate_default(&blocks, "");
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[0].boxes.len(), 1);
        assert_eq!(layout.pages[1].boxes[0].role, Some(BoxRole::Heading));
    }

    #[test]
    fn forced_break_is_skipped_on_empty_page() {
        let mut first = block(10.0, BoxRole::Title, false);
        first.break_before = true;
        let mut second = block(10.0, BoxRole::Title, false);
        second.break_before = true;
        let layout = paginate_default(&[first, second], "");
        assert_eq!(layout.pages.len(), 2);
    }

    #[test]
    fn oversized_block_gets_its_own_page() {
        let blocks = vec![block(100.0, BoxRole::Step, false), block(900.0, BoxRole::Step, false)];
        let layout = paginate_default(&blocks, "");
        assert_eq!(layout.pages.len(), 2);
    }

    #[test]
    fn footer_on_every_page() {
        let blocks: Vec<Block> = (0..10).map(|_| block(100.0, BoxRole::Step, false)).collect();
        let layout = paginate_default(&blocks, "v0.0.1");
        for page in &layout.pages {
            let footers = page.find_role(BoxRole::Footer);
            assert_eq!(footers.len(), 1);
            let text = footers[0].text.as_ref().unwrap();
            assert_eq!(text.lines[0].text, "v0.0.1");
            // right edge of the text sits on the right margin
            let m = FontMetrics::default();
            let w = m.measure_text_width("v0.0.1", 8.0, Face::Regular);
            let right = footers[0].x + text.lines[0].x_offset + w;
            assert!((right - 540.0).abs() < 1e-3);
        }
    }

    #[test]
    fn no_footer_without_version() {
        let layout = paginate_default(&[block(10.0, BoxRole::Title, false)], "");
        assert!(layout.pages[0].find_role(BoxRole::Footer).is_empty());
    }
}
