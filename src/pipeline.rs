//! Pipeline – ties together loading, layout, pagination, rendering and the
//! atomic file write into single function calls.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{RecipeError, Result};
use crate::fonts::FontMetrics;
use crate::layout::layout_recipe;
use crate::layout_config::LayoutConfig;
use crate::pagination::paginate;
use crate::recipe::Recipe;
use crate::render::render_pdf;
use crate::style::Theme;

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width > height.
    Landscape,
}

/// Paper size in portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperSize {
    /// US Letter, 612 × 792 pt (default).
    #[default]
    Letter,
    /// A4, 595.28 × 841.89 pt.
    A4,
}

impl PaperSize {
    /// `(width, height)` in points, portrait.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::A4 => (595.28, 841.89),
        }
    }
}

/// How components are placed relative to page boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentMode {
    /// Components flow continuously; a page break is inserted only when the
    /// next heading and its first row do not fit.
    #[default]
    Flow,
    /// Every component after the first starts a new page, and the title is
    /// repeated at the top of each component page.
    PagePerComponent,
}

/// Configuration for the PDF generation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub paper: PaperSize,
    /// Page orientation; swaps effective width/height when `Landscape`.
    pub orientation: PageOrientation,
    /// Margins in points (default: 72 left/right, 36 top/bottom).
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub component_mode: ComponentMode,
    pub theme: Theme,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paper: PaperSize::Letter,
            orientation: PageOrientation::Portrait,
            margin_left: 72.0,
            margin_right: 72.0,
            margin_top: 36.0,
            margin_bottom: 36.0,
            component_mode: ComponentMode::Flow,
            theme: Theme::default(),
        }
    }
}

impl PipelineConfig {
    /// Effective page width after applying orientation.
    pub fn effective_width(&self) -> f32 {
        let (w, h) = self.paper.dimensions();
        match self.orientation {
            PageOrientation::Portrait => w,
            PageOrientation::Landscape => h,
        }
    }

    /// Effective page height after applying orientation.
    pub fn effective_height(&self) -> f32 {
        let (w, h) = self.paper.dimensions();
        match self.orientation {
            PageOrientation::Portrait => h,
            PageOrientation::Landscape => w,
        }
    }

    /// Width between the left and right margins.
    pub fn content_width(&self) -> f32 {
        (self.effective_width() - self.margin_left - self.margin_right).max(0.0)
    }

    /// Height between the top and bottom margins.
    pub fn content_height(&self) -> f32 {
        (self.effective_height() - self.margin_top - self.margin_bottom).max(0.0)
    }
}

/// Lay out and paginate a recipe without rendering.
pub fn compute_layout_config(recipe: &Recipe, config: &PipelineConfig) -> LayoutConfig {
    let metrics = FontMetrics::default();
    let blocks = layout_recipe(recipe, config, &metrics);
    log::debug!("laid out {} block(s) for '{}'", blocks.len(), recipe.title);
    let layout = paginate(&blocks, &recipe.title, &recipe.version, config, &metrics);
    log::debug!("paginated into {} page(s)", layout.pages.len());
    layout
}

/// Full pipeline: recipe → PDF bytes.
///
/// Returns `(pdf_bytes, layout_config)`.
pub fn generate_pdf(recipe: &Recipe, config: &PipelineConfig) -> Result<(Vec<u8>, LayoutConfig)> {
    recipe.validate()?;
    let layout = compute_layout_config(recipe, config);
    let bytes = render_pdf(&layout)?;
    Ok((bytes, layout))
}

/// Convenience: recipe JSON text → PDF bytes with the default config.
pub fn generate_pdf_from_json(json: &str) -> Result<Vec<u8>> {
    let recipe = Recipe::from_json(json)?;
    let (bytes, _) = generate_pdf(&recipe, &PipelineConfig::default())?;
    Ok(bytes)
}

/// Write `bytes` to `path` atomically.
///
/// The data goes to a temporary file in the destination directory which is
/// then renamed over `path`, so a failure never leaves a truncated file and
/// never disturbs an existing one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| RecipeError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RecipeError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| RecipeError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| RecipeError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| RecipeError::io(path, e.error))?;
    Ok(())
}

/// Read a recipe file, render it and write the PDF to `output`.
///
/// Nothing is written unless the whole document rendered successfully.
pub fn render_file(
    input: &Path,
    output: &Path,
    config: &PipelineConfig,
) -> Result<(Vec<u8>, LayoutConfig)> {
    let recipe = Recipe::load(input)?;
    let (bytes, layout) = generate_pdf(&recipe, config)?;
    write_atomic(output, &bytes)?;
    log::info!("wrote {} bytes to '{}'", bytes.len(), output.display());
    Ok((bytes, layout))
}
