//! recipe-forge – command-line recipe JSON → PDF converter.
//!
//! Usage:
//!   recipe-forge --json <recipe.json> [--output recipe.pdf] [--paper a4]
//!                [--landscape] [--page-per-component] [--layout-json layout.json]
//!
//! If `--output` is omitted the PDF is written next to the input file with
//! the same stem (e.g. `cake.json` → `cake.pdf`). An output path equal to
//! the input is refused.

use std::path::{Path, PathBuf};
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};

use recipe_forge::layout_config::LayoutConfig;
use recipe_forge::pipeline::{
    generate_pdf, write_atomic, ComponentMode, PageOrientation, PaperSize, PipelineConfig,
};
use recipe_forge::{Recipe, RecipeError};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Paper {
    Letter,
    A4,
}

#[derive(Parser, Debug)]
#[command(name = "recipe-forge", version, about = "Render a recipe PDF from JSON")]
struct Cli {
    /// Path to the recipe JSON file
    #[arg(long = "json", value_name = "FILE")]
    input: PathBuf,

    /// Output PDF path (default: input path with a .pdf extension)
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Paper size
    #[arg(long, value_enum, default_value_t = Paper::Letter)]
    paper: Paper,

    /// Use landscape orientation
    #[arg(long, short)]
    landscape: bool,

    /// Start every component on a new page under a repeated title
    #[arg(long)]
    page_per_component: bool,

    /// Also write the computed page layout as JSON
    #[arg(long, value_name = "FILE")]
    layout_json: Option<PathBuf>,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            paper: match self.paper {
                Paper::Letter => PaperSize::Letter,
                Paper::A4 => PaperSize::A4,
            },
            orientation: if self.landscape {
                PageOrientation::Landscape
            } else {
                PageOrientation::Portrait
            },
            component_mode: if self.page_per_component {
                ComponentMode::PagePerComponent
            } else {
                ComponentMode::Flow
            },
            ..PipelineConfig::default()
        }
    }
}

/// Render the recipe, then write the layout JSON (if asked for) before the
/// PDF so a failed layout write never leaves a PDF behind.
fn run(cli: &Cli, output: &Path) -> Result<(Vec<u8>, LayoutConfig), RecipeError> {
    let recipe = Recipe::load(&cli.input)?;
    let (bytes, layout) = generate_pdf(&recipe, &cli.pipeline_config())?;

    if let Some(path) = &cli.layout_json {
        write_atomic(path, layout.to_json().as_bytes())?;
    }
    write_atomic(output, &bytes)?;
    log::info!("wrote {} bytes to '{}'", bytes.len(), output.display());
    Ok((bytes, layout))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    // Default output: same directory + same stem as input, but with .pdf
    let output = cli.output.clone().unwrap_or_else(|| {
        let mut o = cli.input.clone();
        o.set_extension("pdf");
        o
    });
    if output == cli.input {
        Cli::command()
            .error(
                ErrorKind::ArgumentConflict,
                format!(
                    "output '{}' would overwrite the input; pass a different --output",
                    output.display()
                ),
            )
            .exit();
    }

    let (bytes, layout) = match run(&cli, &output) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(e.exit_code());
        }
    };

    let pages = layout.pages.len();
    eprintln!(
        "Wrote '{}' ({} bytes, {} page{})",
        output.display(),
        bytes.len(),
        pages,
        if pages == 1 { "" } else { "s" }
    );
}
