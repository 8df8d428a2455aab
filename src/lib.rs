//! # Sitemap Studio
//!
//! A visual sitemap editor that drafts websites through a remote generation
//! backend. Pages form a tree on an interactive canvas:
//! - **Root pages** list their content sections and receive a first child
//! - **Child pages** grow the tree sideways through sibling insertion
//!
//! ## Features
//! - Tree layout with automatic levels and subtree widths
//! - Inline page renaming and a page dialog with prompts
//! - Sitemap generation from a business prompt
//! - Website generation, HTML preview and export
//! - Zipped deployment of the generated website
//! - Undo/redo and persistent state between sessions

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod storage;
pub mod tree;
pub mod types;
mod ui;

pub use error::{ApiError, StorageError, TreeError, ValidationError};
pub use tree::{RemovedSubtree, Side};
pub use types::*;
pub use ui::SitemapApp;

/// Title of the application window.
pub const APP_TITLE: &str = "Sitemap Studio";

/// Runs the sitemap editor in a native window.
///
/// The backend location is read from `SITEMAP_BACKEND_URL`. Background requests
/// are spawned on the tokio runtime entered by the caller.
///
/// # Returns
///
/// Returns `Ok(())` when the window is closed, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// fn main() -> Result<(), eframe::Error> {
///     let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
///     let _guard = runtime.enter();
///     sitemap_studio::run_app()
/// }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    let config = config::BackendConfig::from_env();
    log::info!("using generation backend at {}", config.base_url);
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(SitemapApp::new(cc.storage, config)))),
    )
}

/// Starts the editor on the canvas with the given element id (web only).
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub async fn start(canvas_id: String) -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::JsCast;

    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(&canvas_id)
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("canvas not found"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;

    let config = config::BackendConfig::from_env();
    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(move |cc| Ok(Box::new(SitemapApp::new(cc.storage, config)))),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_default() {
        let sitemap = Sitemap::default();
        assert_eq!(sitemap.nodes.len(), 1);
        assert!(sitemap.edges.is_empty());
        assert!(sitemap.contains(ROOT_PAGE_ID));
    }

    #[test]
    fn test_page_creation() {
        let page = PageNode::new("node-x", "Pricing", Position::new(1.0, 2.0));
        assert_eq!(page.data.label, "Pricing");
        assert_eq!(page.position.x, 1.0);
        assert!(page.data.sections.is_empty());
    }
}
