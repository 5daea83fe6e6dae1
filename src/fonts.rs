//! Text measurement for the builtin Helvetica faces.
//!
//! Only the PDF base-14 Helvetica family is used, so no font files are
//! embedded; advance widths come from the standard AFM tables (units of
//! 1/1000 em) for printable ASCII.

/// Advance widths for U+0020..=U+007E, Helvetica.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Advance widths for U+0020..=U+007E, Helvetica-Bold.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// Width used for anything outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

/// One of the two faces the recipe pages use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

impl Face {
    pub fn from_bold(bold: bool) -> Self {
        if bold {
            Face::Bold
        } else {
            Face::Regular
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            Face::Regular => &HELVETICA_WIDTHS,
            Face::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

/// Font metrics (shared by both Helvetica faces), in 1/1000 em.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            units_per_em: 1000.0,
            ascender: 718.0,
            descender: -207.0,
        }
    }
}

impl FontMetrics {
    /// Measure the width of a string at a given font size (in pt).
    pub fn measure_text_width(&self, text: &str, font_size: f32, face: Face) -> f32 {
        let widths = face.widths();
        let units: u32 = text
            .chars()
            .map(|c| match c as u32 {
                cp @ 0x20..=0x7E => u32::from(widths[(cp - 0x20) as usize]),
                // no-break space
                0xA0 => u32::from(widths[0]),
                _ => u32::from(FALLBACK_WIDTH),
            })
            .sum();
        units as f32 * font_size / self.units_per_em
    }

    /// Ascender in pt for the given size.
    pub fn ascender_pt(&self, font_size: f32) -> f32 {
        self.ascender * font_size / self.units_per_em
    }

    /// Descender depth in pt (positive number).
    pub fn descender_pt(&self, font_size: f32) -> f32 {
        self.descender.abs() * font_size / self.units_per_em
    }

    /// Ascender + descender in pt.
    pub fn text_height_pt(&self, font_size: f32) -> f32 {
        self.ascender_pt(font_size) + self.descender_pt(font_size)
    }
}

/// Word-wrap text to fit within `max_width` points. Returns a vec of lines.
///
/// A single word wider than `max_width` is kept on its own line rather than
/// broken mid-word.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    face: Face,
    max_width: f32,
    metrics: &FontMetrics,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in &words {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current_line, word)
            };
            let w = metrics.measure_text_width(&candidate, font_size, face);
            if w > max_width && !current_line.is_empty() {
                lines.push(current_line);
                current_line = word.to_string();
            } else {
                current_line = candidate;
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_text_width() {
        let m = FontMetrics::default();
        // H(722) e(556) l(222) l(222) o(556) = 2278 units
        let w = m.measure_text_width("Hello", 10.0, Face::Regular);
        assert!((w - 22.78).abs() < 0.01, "got {w}");
    }

    #[test]
    fn bold_is_wider() {
        let m = FontMetrics::default();
        let regular = m.measure_text_width("Flour", 12.0, Face::Regular);
        let bold = m.measure_text_width("Flour", 12.0, Face::Bold);
        assert!(bold > regular);
    }

    #[test]
    fn non_ascii_uses_fallback() {
        let m = FontMetrics::default();
        let w = m.measure_text_width("é", 1000.0, Face::Regular);
        assert_eq!(w, 556.0);
    }

    #[test]
    fn word_wrap_basic() {
        let m = FontMetrics::default();
        let lines = wrap_text("Hello world foo bar", 16.0, Face::Regular, 60.0, &m);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
        assert_eq!(lines.join(" "), "Hello world foo bar");
    }

    #[test]
    fn long_word_stays_whole() {
        let m = FontMetrics::default();
        let lines = wrap_text("Supercalifragilistic", 12.0, Face::Regular, 10.0, &m);
        assert_eq!(lines, vec!["Supercalifragilistic".to_string()]);
    }

    #[test]
    fn ascender_scales_with_size() {
        let m = FontMetrics::default();
        assert!((m.ascender_pt(10.0) - 7.18).abs() < 1e-4);
        assert!((m.text_height_pt(10.0) - 9.25).abs() < 1e-4);
    }
}
