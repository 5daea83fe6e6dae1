//! # recipe-forge – recipe JSON → printable PDF pipeline
//!
//! This crate turns a declarative recipe record (title, version, ordered
//! components with ingredients and steps) into a paginated PDF. The
//! pipeline stages are:
//!
//! 1. **Load** – JSON → validated [`Recipe`] ([`recipe`])
//! 2. **Layout** – recipe → unbreakable blocks with wrapped text ([`layout`])
//! 3. **Paginate** – blocks → pages with keep-together rules ([`pagination`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//! 5. **Write** – atomic file output ([`pipeline::write_atomic`])
//!
//! A C-compatible FFI surface is exposed via the [`ffi`] module.

pub mod error;
pub mod ffi;
pub mod fonts;
pub mod layout;
pub mod layout_config;
pub mod pagination;
pub mod pipeline;
pub mod recipe;
pub mod render;
pub mod samples;
pub mod style;

// Re-exports for convenience
pub use error::RecipeError;
pub use pipeline::{generate_pdf, generate_pdf_from_json, render_file, PipelineConfig};
pub use recipe::{Component, Ingredient, Recipe};
