//! Page theme – the fixed set of text, banner and table styles a recipe page
//! is drawn with.

use serde::{Deserialize, Serialize};

/// RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// 50 % grey (`#808080`), used for the table grid and footer.
    pub const GREY: Self = Self::rgb(0.501_960_8, 0.501_960_8, 0.501_960_8);
    /// `#112c4c`, title and banner colour.
    pub const NAVY: Self = Self::rgb(0.066_666_67, 0.172_549_02, 0.298_039_2);
    /// `#4682b4`, table headers and the "Instructions" label.
    pub const STEEL_BLUE: Self = Self::rgb(0.274_509_8, 0.509_803_9, 0.705_882_4);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Paragraph style: font, colour, leading and vertical spacing (pt).
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub font_size: f32,
    pub bold: bool,
    pub color: Color,
    pub leading: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub align: TextAlign,
}

/// Component heading: the name centred between two horizontal rules.
#[derive(Debug, Clone)]
pub struct BannerStyle {
    pub font_size: f32,
    pub color: Color,
    pub rule_thickness: f32,
    pub gap_above: f32,
    /// Space between the upper rule and the text, including the optical
    /// correction.
    pub padding_top: f32,
    pub padding_bottom: f32,
    pub gap_below: f32,
    /// Spacer after the banner block.
    pub space_after: f32,
}

#[derive(Debug, Clone)]
pub struct TableStyle {
    pub font_size: f32,
    pub leading: f32,
    pub text_color: Color,
    pub header_background: Color,
    pub header_text: Color,
    pub header_padding_bottom: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub grid_width: f32,
    pub grid_color: Color,
    /// Fraction of the content width given to the ingredient label column.
    pub label_fraction: f32,
    /// Space after the equipment table.
    pub space_after: f32,
}

/// Every style used on a recipe page.
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: TextStyle,
    pub banner: BannerStyle,
    pub table: TableStyle,
    pub instruction_header: TextStyle,
    pub step: TextStyle,
    pub footer: TextStyle,
    /// Width reserved for the "N." marker before each step.
    pub step_indent: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: TextStyle {
                font_size: 24.0,
                bold: true,
                color: Color::NAVY,
                leading: 28.8,
                space_before: 0.0,
                space_after: 12.0,
                align: TextAlign::Center,
            },
            banner: BannerStyle {
                font_size: 16.0,
                color: Color::NAVY,
                rule_thickness: 2.83465, // 1 mm
                gap_above: 16.0,
                padding_top: 6.0 + 2.0,
                padding_bottom: 6.0,
                gap_below: 8.0,
                space_after: 12.0,
            },
            table: TableStyle {
                font_size: 10.0,
                leading: 12.0,
                text_color: Color::BLACK,
                header_background: Color::STEEL_BLUE,
                header_text: Color::WHITE,
                header_padding_bottom: 6.0,
                padding_x: 6.0,
                padding_y: 3.0,
                grid_width: 0.25,
                grid_color: Color::GREY,
                label_fraction: 0.65,
                space_after: 12.0,
            },
            instruction_header: TextStyle {
                font_size: 12.0,
                bold: true,
                color: Color::STEEL_BLUE,
                leading: 14.4,
                space_before: 12.0,
                space_after: 6.0,
                align: TextAlign::Left,
            },
            step: TextStyle {
                font_size: 11.0,
                bold: false,
                color: Color::BLACK,
                leading: 14.0,
                space_before: 2.0,
                space_after: 6.0,
                align: TextAlign::Left,
            },
            footer: TextStyle {
                font_size: 8.0,
                bold: false,
                color: Color::GREY,
                leading: 9.6,
                space_before: 0.0,
                space_after: 0.0,
                align: TextAlign::Right,
            },
            step_indent: 18.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colours() {
        let navy = Color::NAVY.to_array();
        assert!((navy[0] - 17.0 / 255.0).abs() < 1e-6);
        assert!((navy[2] - 76.0 / 255.0).abs() < 1e-6);
        assert_eq!(Color::WHITE.to_array(), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn align_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&TextAlign::Center).unwrap(), "\"center\"");
    }
}
