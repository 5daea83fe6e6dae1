//! Layout – turns a [`Recipe`] into an ordered list of [`Block`]s.
//!
//! A block is the unit pagination works with: it has a fixed height, never
//! splits across pages, and carries its boxes with `y` measured from the
//! block's own top edge. `x` is already page-absolute.
//!
//! Steps and table rows too tall for one page are cut at line boundaries
//! into several blocks here, so pagination never has to clip text.

use std::ops::Range;

use crate::fonts::{wrap_text, Face, FontMetrics};
use crate::layout_config::{BorderStyle, BoxRole, LayoutBox, RuleStyle, TextContent, TextLine};
use crate::pipeline::{ComponentMode, PipelineConfig};
use crate::recipe::{Component, Recipe};
use crate::style::{Color, TextAlign, TextStyle, Theme};

/// An unbreakable slice of vertical flow.
#[derive(Debug, Clone)]
pub struct Block {
    /// Total vertical space consumed, including spacing around the boxes.
    pub height: f32,
    pub boxes: Vec<LayoutBox>,
    /// Pagination must keep this block on the same page as the next one.
    pub keep_with_next: bool,
    /// Start a new page before this block unless the page is still empty.
    pub break_before: bool,
}

impl Block {
    fn new(height: f32, boxes: Vec<LayoutBox>) -> Self {
        Self {
            height,
            boxes,
            keep_with_next: false,
            break_before: false,
        }
    }

    fn keep_with_next(mut self, keep: bool) -> Self {
        self.keep_with_next = keep;
        self
    }
}

struct LayoutBuilder<'a> {
    metrics: &'a FontMetrics,
    theme: &'a Theme,
    content_x: f32,
    content_width: f32,
    content_height: f32,
    line_length: f32,
    blocks: Vec<Block>,
}

/// Lines that fit in `available` pt after `fixed` pt of spacing, at least one.
fn line_capacity(available: f32, fixed: f32, leading: f32) -> usize {
    ((available - fixed) / leading).floor().max(1.0) as usize
}

/// Cut `total` lines into runs of `first_cap`, then `cap` lines each.
/// Always yields at least one (possibly empty) range.
fn split_ranges(total: usize, first_cap: usize, cap: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut take = first_cap;
    while start < total {
        let end = (start + take).min(total);
        ranges.push(start..end);
        start = end;
        take = cap;
    }
    if ranges.is_empty() {
        ranges.push(0..0);
    }
    ranges
}

impl<'a> LayoutBuilder<'a> {
    fn text_content(
        &self,
        lines: &[String],
        style: &TextStyle,
        box_width: f32,
        color: Color,
    ) -> TextContent {
        let face = Face::from_bold(style.bold);
        let text_lines = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let w = self.metrics.measure_text_width(line, style.font_size, face);
                let x_offset = match style.align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => ((box_width - w) / 2.0).max(0.0),
                    TextAlign::Right => (box_width - w).max(0.0),
                };
                TextLine {
                    text: line.clone(),
                    x_offset,
                    y_offset: i as f32 * style.leading,
                }
            })
            .collect();

        TextContent {
            lines: text_lines,
            font_size: style.font_size,
            bold: style.bold,
            color: color.to_array(),
            line_height: style.leading,
            text_align: style.align,
            list_marker: None,
            marker_indent: 0.0,
        }
    }

    /// Height of the trailing keep-with-next chain that the next block will
    /// have to share a page with.
    fn chain_reserve(&self) -> f32 {
        self.blocks
            .iter()
            .rev()
            .take_while(|b| b.keep_with_next)
            .map(|b| b.height)
            .sum()
    }

    /// Line ranges for a run of `total` lines at `leading` with `fixed` pt of
    /// spacing. A single range unless the run, together with the chain it
    /// joins, would overflow the content area.
    fn line_ranges(&self, total: usize, fixed: f32, leading: f32) -> Vec<Range<usize>> {
        let reserve = self.chain_reserve();
        let full = fixed + total.max(1) as f32 * leading;
        if reserve + full <= self.content_height {
            return vec![0..total];
        }
        let first_cap = line_capacity(self.content_height - reserve, fixed, leading);
        let cap = line_capacity(self.content_height, fixed, leading);
        log::debug!(
            "splitting {total} line(s) of {:.1} pt across pages ({first_cap} then {cap} per page)",
            full
        );
        split_ranges(total, first_cap, cap)
    }

    /// A wrapped paragraph at `x` with the style's spacing folded into the
    /// block height.
    fn paragraph(&self, text: &str, style: &TextStyle, x: f32, width: f32, role: BoxRole) -> (LayoutBox, f32) {
        let lines = wrap_text(
            text,
            style.font_size,
            Face::from_bold(style.bold),
            width,
            self.metrics,
        );
        let text_height = lines.len() as f32 * style.leading;
        let mut lbox = LayoutBox::new(x, style.space_before, width, text_height).with_role(role);
        lbox.text = Some(self.text_content(&lines, style, width, style.color));
        (lbox, style.space_before + text_height + style.space_after)
    }

    fn push_title(&mut self, title: &str, keep_with_next: bool, break_before: bool) {
        let style = &self.theme.title;
        let (lbox, height) = self.paragraph(title, style, self.content_x, self.content_width, BoxRole::Title);
        let mut block = Block::new(height, vec![lbox]).keep_with_next(keep_with_next);
        block.break_before = break_before;
        self.blocks.push(block);
    }

    /// Component name centred between two rules of `line_length`.
    fn push_banner(&mut self, name: &str, keep_with_next: bool) {
        let b = &self.theme.banner;
        let text_height = self.metrics.text_height_pt(b.font_size);
        let band = b.padding_top + text_height + b.padding_bottom;

        let rule_len = self.line_length.min(self.content_width);
        let rule_x = self.content_x + (self.content_width - rule_len) / 2.0;
        let upper_rule_y = b.gap_above;
        let lower_rule_y = upper_rule_y + band;

        let rule_box = |center_y: f32| {
            let mut r = LayoutBox::new(
                rule_x,
                center_y - b.rule_thickness / 2.0,
                rule_len,
                b.rule_thickness,
            )
            .with_role(BoxRole::Rule);
            r.rule = Some(RuleStyle {
                thickness: b.rule_thickness,
                color: b.color.to_array(),
            });
            r
        };

        let text_style = TextStyle {
            font_size: b.font_size,
            bold: true,
            color: b.color,
            leading: text_height,
            space_before: 0.0,
            space_after: 0.0,
            align: TextAlign::Center,
        };
        let mut heading = LayoutBox::new(
            self.content_x,
            upper_rule_y + b.padding_top,
            self.content_width,
            text_height,
        )
        .with_role(BoxRole::Heading);
        heading.text = Some(self.text_content(
            &[name.to_string()],
            &text_style,
            self.content_width,
            b.color,
        ));

        let height = lower_rule_y + b.rule_thickness / 2.0 + b.gap_below + b.space_after;
        let boxes = vec![rule_box(upper_rule_y), heading, rule_box(lower_rule_y)];
        self.blocks
            .push(Block::new(height, boxes).keep_with_next(keep_with_next));
    }

    fn wrap_cells(&self, cells: &[&str], widths: &[f32], header: bool) -> Vec<Vec<String>> {
        let t = &self.theme.table;
        let face = Face::from_bold(header);
        cells
            .iter()
            .zip(widths)
            .map(|(text, w)| wrap_text(text, t.font_size, face, w - 2.0 * t.padding_x, self.metrics))
            .collect()
    }

    /// One table row from already wrapped cell lines. Each cell gets its own
    /// bordered box.
    fn table_row(&self, wrapped: &[Vec<String>], widths: &[f32], header: bool) -> (LayoutBox, f32) {
        let t = &self.theme.table;
        let pad_bottom = if header { t.header_padding_bottom } else { t.padding_y };
        let max_lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let row_height = t.padding_y + max_lines as f32 * t.leading + pad_bottom;

        let table_width: f32 = widths.iter().sum();
        let role = if header { BoxRole::TableHeader } else { BoxRole::TableRow };
        let mut row = LayoutBox::new(self.content_x, 0.0, table_width, row_height).with_role(role);
        if header {
            row.background_color = Some(t.header_background.to_array());
        }

        let text_style = TextStyle {
            font_size: t.font_size,
            bold: header,
            color: if header { t.header_text } else { t.text_color },
            leading: t.leading,
            space_before: 0.0,
            space_after: 0.0,
            align: TextAlign::Left,
        };

        let mut x = self.content_x;
        for (lines, w) in wrapped.iter().zip(widths) {
            let mut cell = LayoutBox::new(x, 0.0, *w, row_height).with_role(BoxRole::TableCell);
            cell.border = Some(BorderStyle {
                width: t.grid_width,
                color: t.grid_color.to_array(),
            });
            let mut content = self.text_content(lines, &text_style, w - 2.0 * t.padding_x, text_style.color);
            for line in &mut content.lines {
                line.x_offset += t.padding_x;
                line.y_offset += t.padding_y;
            }
            cell.text = Some(content);
            row.children.push(cell);
            x += w;
        }
        (row, row_height)
    }

    /// Header row plus one block per data row. The header is kept with the
    /// first data row. A data row taller than a page continues as further
    /// rows holding the remaining lines of each cell.
    fn push_table(&mut self, header: &[&str], rows: &[Vec<&str>], widths: &[f32], space_after: f32) {
        let head_cells = self.wrap_cells(header, widths, true);
        let (head, head_h) = self.table_row(&head_cells, widths, true);
        self.blocks
            .push(Block::new(head_h, vec![head]).keep_with_next(!rows.is_empty()));

        let (padding_y, leading) = (self.theme.table.padding_y, self.theme.table.leading);
        for (i, cells) in rows.iter().enumerate() {
            let wrapped = self.wrap_cells(cells, widths, false);
            let max_lines = wrapped.iter().map(Vec::len).max().unwrap_or(0);
            let ranges = self.line_ranges(max_lines, 2.0 * padding_y + space_after, leading);
            let last = ranges.len() - 1;

            for (k, range) in ranges.into_iter().enumerate() {
                let piece: Vec<Vec<String>> = wrapped
                    .iter()
                    .map(|lines| {
                        let end = range.end.min(lines.len());
                        lines[range.start.min(end)..end].to_vec()
                    })
                    .collect();
                let (row, mut h) = self.table_row(&piece, widths, false);
                if i + 1 == rows.len() && k == last {
                    h += space_after;
                }
                self.blocks.push(Block::new(h, vec![row]));
            }
        }
    }

    fn push_instructions(&mut self, steps: &[String]) {
        let label_style = self.theme.instruction_header.clone();
        let (label, label_h) = self.paragraph(
            "Instructions",
            &label_style,
            self.content_x,
            self.content_width,
            BoxRole::InstructionLabel,
        );
        self.blocks
            .push(Block::new(label_h, vec![label]).keep_with_next(!steps.is_empty()));

        let style = self.theme.step.clone();
        let indent = self.theme.step_indent;
        let x = self.content_x + indent;
        let width = self.content_width - indent;
        for (i, step) in steps.iter().enumerate() {
            let lines = wrap_text(step, style.font_size, Face::from_bold(style.bold), width, self.metrics);
            let ranges = self.line_ranges(lines.len(), style.space_before + style.space_after, style.leading);
            let last = ranges.len() - 1;

            // Only the first piece carries the number and the space above.
            for (k, range) in ranges.into_iter().enumerate() {
                let top = if k == 0 { style.space_before } else { 0.0 };
                let bottom = if k == last { style.space_after } else { 0.0 };
                let text_height = range.len() as f32 * style.leading;

                let mut text = self.text_content(&lines[range], &style, width, style.color);
                if k == 0 {
                    text.list_marker = Some(format!("{}.", i + 1));
                    text.marker_indent = indent;
                }
                let mut lbox = LayoutBox::new(x, top, width, text_height).with_role(BoxRole::Step);
                lbox.text = Some(text);
                self.blocks.push(Block::new(top + text_height + bottom, vec![lbox]));
            }
        }
    }

    fn push_component(&mut self, component: &Component) {
        let has_body = !component.equipment.is_empty()
            || !component.ingredients.is_empty()
            || !component.instructions.is_empty();
        self.push_banner(&component.name, has_body);

        if !component.equipment.is_empty() {
            let rows: Vec<Vec<&str>> = component
                .equipment
                .iter()
                .map(|e| vec![e.as_str()])
                .collect();
            let space = self.theme.table.space_after;
            self.push_table(&["Equipment"], &rows, &[self.content_width], space);
        }

        if !component.ingredients.is_empty() {
            let rows: Vec<Vec<&str>> = component
                .ingredients
                .iter()
                .map(|i| vec![i.label.as_str(), i.quantity.as_str()])
                .collect();
            let label_w = self.content_width * self.theme.table.label_fraction;
            let widths = [label_w, self.content_width - label_w];
            self.push_table(&["Ingredient", "Amount"], &rows, &widths, 0.0);
        }

        if !component.instructions.is_empty() {
            self.push_instructions(&component.instructions);
        }
    }
}

/// Lay out a recipe into blocks, in input order.
pub fn layout_recipe(recipe: &Recipe, config: &PipelineConfig, metrics: &FontMetrics) -> Vec<Block> {
    let mut builder = LayoutBuilder {
        metrics,
        theme: &config.theme,
        content_x: config.margin_left,
        content_width: config.content_width(),
        content_height: config.content_height(),
        line_length: recipe.line_length,
        blocks: Vec::new(),
    };

    let has_components = !recipe.components.is_empty();
    match config.component_mode {
        ComponentMode::Flow => {
            builder.push_title(&recipe.title, has_components, false);
            for component in &recipe.components {
                builder.push_component(component);
            }
        }
        ComponentMode::PagePerComponent => {
            if !has_components {
                builder.push_title(&recipe.title, false, false);
            }
            for (i, component) in recipe.components.iter().enumerate() {
                builder.push_title(&recipe.title, true, i > 0);
                builder.push_component(component);
            }
        }
    }

    builder.blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Component;

    fn cake() -> Recipe {
        Recipe::new(
            "Test Cake",
            "v1",
            vec![Component::new("Base")
                .with_ingredient("Flour", "100 g")
                .with_ingredient("Sugar", "50 g")
                .with_step("Mix.")],
        )
        .unwrap()
    }

    fn roles(blocks: &[Block]) -> Vec<BoxRole> {
        blocks
            .iter()
            .map(|b| b.boxes.iter().find_map(|x| x.role.filter(|r| *r != BoxRole::Rule)).unwrap())
            .collect()
    }

    #[test]
    fn block_sequence_follows_recipe() {
        let blocks = layout_recipe(&cake(), &PipelineConfig::default(), &FontMetrics::default());
        assert_eq!(
            roles(&blocks),
            vec![
                BoxRole::Title,
                BoxRole::Heading,
                BoxRole::TableHeader,
                BoxRole::TableRow,
                BoxRole::TableRow,
                BoxRole::InstructionLabel,
                BoxRole::Step,
            ]
        );
    }

    #[test]
    fn headings_keep_with_first_row() {
        let blocks = layout_recipe(&cake(), &PipelineConfig::default(), &FontMetrics::default());
        let keeps: Vec<bool> = blocks.iter().map(|b| b.keep_with_next).collect();
        assert_eq!(keeps, vec![true, true, true, false, false, true, false]);
    }

    #[test]
    fn title_is_centred() {
        let config = PipelineConfig::default();
        let blocks = layout_recipe(&cake(), &config, &FontMetrics::default());
        let title = blocks[0].boxes[0].text.as_ref().unwrap();
        let line = &title.lines[0];
        let w = FontMetrics::default().measure_text_width("Test Cake", 24.0, Face::Bold);
        assert!((line.x_offset - (config.content_width() - w) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn banner_rules_are_clamped_and_centred() {
        let mut recipe = cake();
        recipe.line_length = 10_000.0;
        let config = PipelineConfig::default();
        let blocks = layout_recipe(&recipe, &config, &FontMetrics::default());
        let rules: Vec<&LayoutBox> = blocks[1]
            .boxes
            .iter()
            .filter(|b| b.role == Some(BoxRole::Rule))
            .collect();
        assert_eq!(rules.len(), 2);
        for r in rules {
            assert_eq!(r.width, config.content_width());
            assert_eq!(r.x, config.margin_left);
        }
    }

    #[test]
    fn ingredient_columns_split_65_35() {
        let config = PipelineConfig::default();
        let blocks = layout_recipe(&cake(), &config, &FontMetrics::default());
        let row = &blocks[3].boxes[0];
        assert_eq!(row.children.len(), 2);
        let cw = config.content_width();
        assert!((row.children[0].width - cw * 0.65).abs() < 1e-3);
        assert!((row.children[1].width - cw * 0.35).abs() < 1e-3);
        assert!((row.children[1].x - (config.margin_left + cw * 0.65)).abs() < 1e-3);
    }

    #[test]
    fn long_step_wraps_and_grows() {
        let long = "Stir ".repeat(80);
        let recipe = Recipe::new("T", "", vec![Component::new("A").with_step(long)]).unwrap();
        let blocks = layout_recipe(&recipe, &PipelineConfig::default(), &FontMetrics::default());
        let step = blocks.last().unwrap();
        let text = step.boxes[0].text.as_ref().unwrap();
        assert!(text.lines.len() > 1);
        assert_eq!(text.list_marker.as_deref(), Some("1."));
        assert!(step.height > 14.0 * text.lines.len() as f32);
    }

    #[test]
    fn oversized_step_is_split_at_line_boundaries() {
        let long = "Fold the batter gently and keep going. ".repeat(150);
        let recipe = Recipe::new("T", "", vec![Component::new("A").with_step(long.clone())]).unwrap();
        let config = PipelineConfig::default();
        let metrics = FontMetrics::default();
        let blocks = layout_recipe(&recipe, &config, &metrics);

        let steps: Vec<&Block> = blocks
            .iter()
            .filter(|b| b.boxes[0].role == Some(BoxRole::Step))
            .collect();
        assert!(steps.len() > 1, "expected the step to be split");
        for b in &steps {
            assert!(b.height <= config.content_height());
        }

        let markers: Vec<Option<&str>> = steps
            .iter()
            .map(|b| b.boxes[0].text.as_ref().unwrap().list_marker.as_deref())
            .collect();
        assert_eq!(markers[0], Some("1."));
        assert!(markers[1..].iter().all(Option::is_none));

        let pieces: Vec<String> = steps
            .iter()
            .flat_map(|b| b.boxes[0].text.as_ref().unwrap().lines.iter().map(|l| l.text.clone()))
            .collect();
        let whole = wrap_text(&long, 11.0, Face::Regular, config.content_width() - 18.0, &metrics);
        assert_eq!(pieces, whole);

        // Label + first piece still fit together on one page.
        let label = blocks.iter().position(|b| b.boxes[0].role == Some(BoxRole::InstructionLabel)).unwrap();
        let chain: f32 = blocks[..=label].iter().rev().take_while(|b| b.keep_with_next).map(|b| b.height).sum();
        assert!(chain + steps[0].height <= config.content_height());
    }

    #[test]
    fn oversized_table_row_continues_in_new_rows() {
        let label = "Very finely chopped toasted pecans ".repeat(200);
        let recipe = Recipe::new("T", "", vec![Component::new("A").with_ingredient(label, "1 cup")]).unwrap();
        let config = PipelineConfig::default();
        let blocks = layout_recipe(&recipe, &config, &FontMetrics::default());

        let rows: Vec<&Block> = blocks
            .iter()
            .filter(|b| b.boxes[0].role == Some(BoxRole::TableRow))
            .collect();
        assert!(rows.len() > 1);
        for b in &rows {
            assert!(b.height <= config.content_height());
        }
        // The short quantity cell appears once, in the first piece.
        let amounts: Vec<usize> = rows
            .iter()
            .map(|b| b.boxes[0].children[1].text.as_ref().unwrap().lines.len())
            .collect();
        assert_eq!(amounts[0], 1);
        assert!(amounts[1..].iter().all(|n| *n == 0));
    }

    #[test]
    fn split_ranges_cover_every_line() {
        assert_eq!(split_ranges(0, 3, 5), vec![0..0]);
        assert_eq!(split_ranges(4, 3, 5), vec![0..3, 3..4]);
        assert_eq!(split_ranges(12, 2, 5), vec![0..2, 2..7, 7..12]);
        assert_eq!(line_capacity(10.0, 20.0, 14.0), 1);
    }

    #[test]
    fn equipment_table_precedes_ingredients() {
        let recipe = Recipe::new(
            "T",
            "",
            vec![Component::new("A")
                .with_equipment("Pan")
                .with_ingredient("Salt", "1 g")],
        )
        .unwrap();
        let blocks = layout_recipe(&recipe, &PipelineConfig::default(), &FontMetrics::default());
        let header = blocks[2].boxes[0].children[0].plain_text().unwrap();
        assert_eq!(header, "Equipment");
        let ingredient_header = blocks[4].boxes[0].children[0].plain_text().unwrap();
        assert_eq!(ingredient_header, "Ingredient");
    }

    #[test]
    fn empty_component_heading_does_not_chain() {
        let recipe = Recipe::new("T", "", vec![Component::new("Empty"), Component::new("B")]).unwrap();
        let blocks = layout_recipe(&recipe, &PipelineConfig::default(), &FontMetrics::default());
        assert!(!blocks[1].keep_with_next);
    }

    #[test]
    fn page_per_component_repeats_title() {
        let recipe = Recipe::new("T", "", vec![Component::new("A"), Component::new("B")]).unwrap();
        let config = PipelineConfig {
            component_mode: ComponentMode::PagePerComponent,
            ..PipelineConfig::default()
        };
        let blocks = layout_recipe(&recipe, &config, &FontMetrics::default());
        let titles: Vec<&Block> = blocks
            .iter()
            .filter(|b| b.boxes[0].role == Some(BoxRole::Title))
            .collect();
        assert_eq!(titles.len(), 2);
        assert!(!titles[0].break_before);
        assert!(titles[1].break_before);
    }
}
