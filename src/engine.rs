//! Binding to the pdfium shared library.
//!
//! Lookup order (first match wins):
//!
//! 1. `PDFIUM_LIB_PATH`: explicit path to `libpdfium.{so,dylib}` / `pdfium.dll`
//! 2. the platform library name in the current working directory
//! 3. the system library search path
//!
//! A fresh [`Pdfium`] is bound per operation; the `thread_safe` feature of
//! `pdfium-render` serialises access to the underlying library.

use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::debug;

/// Bind to pdfium, returning a human-readable reason on failure.
pub fn bind_pdfium() -> Result<Pdfium, String> {
    if let Ok(env_path) = std::env::var("PDFIUM_LIB_PATH") {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            debug!("Binding pdfium from PDFIUM_LIB_PATH={}", path.display());
            return Pdfium::bind_to_library(&path)
                .map(Pdfium::new)
                .map_err(|e| format!("failed to bind '{}': {}", path.display(), e));
        }
        debug!("PDFIUM_LIB_PATH '{}' not found; trying defaults", env_path);
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| format!("pdfium library not found: {e}"))
}
