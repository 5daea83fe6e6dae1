//! C-compatible FFI API for cross-language bindings.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Memory management
//! - Buffers returned by `rforge_*` functions are allocated on the Rust heap.
//! - Callers **must** free them with `rforge_free_buffer` / `rforge_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int` (0 = success, non-zero = error):
//!   `1` null argument, `2` invalid UTF-8, `3` invalid recipe, `4` render
//!   failure, `5` invalid layout JSON.
//! - Error details can be retrieved via `rforge_last_error`.
//!
//! ## Thread safety
//! - `rforge_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::error::RecipeError;
use crate::layout_config::LayoutConfig;
use crate::pipeline::{
    compute_layout_config, generate_pdf, ComponentMode, PageOrientation, PaperSize, PipelineConfig,
};
use crate::recipe::Recipe;
use crate::render::render_pdf;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn error_code(e: &RecipeError) -> c_int {
    match e {
        RecipeError::Validation { .. } => 3,
        RecipeError::Render(_) | RecipeError::Io { .. } => 4,
    }
}

// ---------------------------------------------------------------------------
// C-compatible configuration types
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum RforgePaperSize {
    Letter = 0,
    A4 = 1,
}

#[repr(C)]
pub enum RforgeComponentMode {
    /// Components flow continuously (default).
    Flow = 0,
    /// Each component starts a new page under a repeated title.
    PagePerComponent = 1,
}

/// Optional configuration passed to the `*_ex` functions.
///
/// Margins set to `0` fall back to the defaults (72 pt left/right,
/// 36 pt top/bottom).
#[repr(C)]
pub struct RforgePipelineConfig {
    pub paper: RforgePaperSize,
    /// `0` = portrait, anything else = landscape.
    pub landscape: c_int,
    pub margin_horizontal: f32,
    pub margin_vertical: f32,
    pub component_mode: RforgeComponentMode,
}

fn pipeline_config_from_c(cfg: &RforgePipelineConfig) -> PipelineConfig {
    let defaults = PipelineConfig::default();
    let horizontal = if cfg.margin_horizontal > 0.0 { Some(cfg.margin_horizontal) } else { None };
    let vertical = if cfg.margin_vertical > 0.0 { Some(cfg.margin_vertical) } else { None };

    PipelineConfig {
        paper: match cfg.paper {
            RforgePaperSize::Letter => PaperSize::Letter,
            RforgePaperSize::A4 => PaperSize::A4,
        },
        orientation: if cfg.landscape != 0 {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        },
        margin_left: horizontal.unwrap_or(defaults.margin_left),
        margin_right: horizontal.unwrap_or(defaults.margin_right),
        margin_top: vertical.unwrap_or(defaults.margin_top),
        margin_bottom: vertical.unwrap_or(defaults.margin_bottom),
        component_mode: match cfg.component_mode {
            RforgeComponentMode::Flow => ComponentMode::Flow,
            RforgeComponentMode::PagePerComponent => ComponentMode::PagePerComponent,
        },
        theme: defaults.theme,
    }
}

/// Borrow `len` bytes at `ptr` as UTF-8 and parse them as a recipe.
///
/// # Safety
/// `ptr` must point to `len` valid bytes.
unsafe fn recipe_from_raw(ptr: *const u8, len: u32) -> Result<Recipe, c_int> {
    let bytes = slice::from_raw_parts(ptr, len as usize);
    let json = std::str::from_utf8(bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        2
    })?;
    Recipe::from_json(json).map_err(|e| {
        set_last_error(&e.to_string());
        error_code(&e)
    })
}

/// Hand a byte vector to the caller.
///
/// # Safety
/// `out_buf` and `out_len` must be valid pointers.
unsafe fn emit_buffer(bytes: Vec<u8>, out_buf: *mut *mut u8, out_len: *mut u32) {
    let len = bytes.len() as u32;
    let buf = bytes.into_boxed_slice();
    *out_buf = Box::into_raw(buf) as *mut u8;
    *out_len = len;
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Render recipe JSON to PDF bytes with an optional config.
///
/// # Parameters
/// - `json_ptr`, `json_len`: UTF-8 recipe JSON (not necessarily null-terminated)
/// - `cfg`: pointer to an [`RforgePipelineConfig`]; pass `NULL` for defaults
/// - `out_buf`, `out_len`: on success, the heap-allocated PDF bytes
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `rforge_last_error`.
///
/// # Safety
/// - `json_ptr` must point to `json_len` valid bytes.
/// - `cfg`, if non-null, must point to a fully-initialised config.
/// - The caller must free `*out_buf` with `rforge_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn rforge_generate_pdf(
    json_ptr: *const u8,
    json_len: u32,
    cfg: *const RforgePipelineConfig,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let recipe = match recipe_from_raw(json_ptr, json_len) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let config = if cfg.is_null() {
        PipelineConfig::default()
    } else {
        pipeline_config_from_c(&*cfg)
    };

    match generate_pdf(&recipe, &config) {
        Ok((pdf_bytes, _)) => {
            emit_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            error_code(&e)
        }
    }
}

/// Compute only the layout config (no PDF rendering). Returns JSON.
///
/// # Safety
/// Same as `rforge_generate_pdf`; `*out_json_ptr` must be freed with
/// `rforge_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rforge_compute_layout(
    json_ptr: *const u8,
    json_len: u32,
    cfg: *const RforgePipelineConfig,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || out_json_ptr.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let recipe = match recipe_from_raw(json_ptr, json_len) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let config = if cfg.is_null() {
        PipelineConfig::default()
    } else {
        pipeline_config_from_c(&*cfg)
    };

    let json = compute_layout_config(&recipe, &config).to_json();
    match CString::new(json) {
        Ok(cs) => {
            *out_json_ptr = cs.into_raw();
            0
        }
        Err(_) => {
            set_last_error("JSON contained null byte");
            4
        }
    }
}

/// Render a PDF from a layout config JSON string.
///
/// This allows pre-computing the layout and rendering separately.
///
/// # Safety
/// `json_ptr` must be a valid null-terminated string; `out_buf` and
/// `out_len` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn rforge_render_from_layout(
    json_ptr: *const c_char,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let json = match CStr::from_ptr(json_ptr).to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8 in JSON: {e}"));
            return 2;
        }
    };

    let layout_config = match LayoutConfig::from_json(json) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&format!("Invalid layout JSON: {e}"));
            return 5;
        }
    };

    match render_pdf(&layout_config) {
        Ok(pdf_bytes) => {
            emit_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            error_code(&e)
        }
    }
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a PDF buffer returned by `rforge_generate_pdf`.
///
/// # Safety
/// `buf` must have been returned by a previous `rforge_*` call, and `len`
/// must be the corresponding length.
#[no_mangle]
pub unsafe extern "C" fn rforge_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a layout JSON string.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn rforge_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next failing `rforge_*` call on
/// the same thread and must **not** be freed. Returns null if no error has
/// occurred.
#[no_mangle]
pub extern "C" fn rforge_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn rforge_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    #[test]
    fn ffi_generate_pdf() {
        let json = samples::minimal_recipe().as_bytes();
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe {
            rforge_generate_pdf(
                json.as_ptr(),
                json.len() as u32,
                ptr::null(),
                &mut out_buf,
                &mut out_len,
            )
        };

        assert_eq!(rc, 0, "Expected success");
        assert!(!out_buf.is_null());
        assert!(out_len > 100);

        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        assert_eq!(&bytes[0..5], b"%PDF-");

        unsafe { rforge_free_buffer(out_buf, out_len) };
    }

    #[test]
    fn ffi_invalid_recipe_reports_field() {
        let json = br#"{"components": []}"#;
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe {
            rforge_generate_pdf(
                json.as_ptr(),
                json.len() as u32,
                ptr::null(),
                &mut out_buf,
                &mut out_len,
            )
        };

        assert_eq!(rc, 3);
        assert!(out_buf.is_null());
        let msg = unsafe { CStr::from_ptr(rforge_last_error()) }.to_str().unwrap();
        assert!(msg.contains("title"), "unexpected message: {msg}");
    }

    #[test]
    fn ffi_null_input() {
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe {
            rforge_generate_pdf(ptr::null(), 0, ptr::null(), &mut out_buf, &mut out_len)
        };

        assert_eq!(rc, 1, "Should fail on null input");
    }

    #[test]
    fn ffi_compute_layout_landscape_a4() {
        let json = samples::minimal_recipe().as_bytes();
        let cfg = RforgePipelineConfig {
            paper: RforgePaperSize::A4,
            landscape: 1,
            margin_horizontal: 0.0,
            margin_vertical: 0.0,
            component_mode: RforgeComponentMode::Flow,
        };
        let mut json_ptr: *mut c_char = ptr::null_mut();

        let rc = unsafe { rforge_compute_layout(json.as_ptr(), json.len() as u32, &cfg, &mut json_ptr) };

        assert_eq!(rc, 0);
        assert!(!json_ptr.is_null());
        let layout = unsafe { CStr::from_ptr(json_ptr) }.to_str().unwrap();
        // In landscape the effective width = A4 height (841.89)
        assert!(layout.contains("841.89"), "Expected landscape width in JSON: {layout}");
        assert!(layout.contains("Flour"));
        unsafe { rforge_free_string(json_ptr) };
    }

    #[test]
    fn ffi_render_from_layout() {
        let layout = LayoutConfig::letter().to_json();
        let c_json = CString::new(layout).unwrap();
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe { rforge_render_from_layout(c_json.as_ptr(), &mut out_buf, &mut out_len) };
        assert_eq!(rc, 0);
        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        assert_eq!(&bytes[0..5], b"%PDF-");
        unsafe { rforge_free_buffer(out_buf, out_len) };
    }

    #[test]
    fn ffi_version() {
        let v = rforge_version();
        let version = unsafe { CStr::from_ptr(v) }.to_str().unwrap();
        assert_eq!(version, env!("CARGO_PKG_VERSION"));
    }
}
