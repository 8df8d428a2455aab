//! Exporting and opening the generated website HTML.
//!
//! Native builds use a file dialog and the system browser; web builds create
//! a blob URL and either download or open it.

use super::state::{BackendEvent, SitemapApp};
use eframe::egui;

/// File name suggested when exporting the generated website.
pub const EXPORT_FILE_NAME: &str = "index.html";

impl SitemapApp {
    /// Queues an export of the generated HTML for the next frame.
    pub fn export_html(&mut self) {
        match self.website.html() {
            Some(code) => self.requests.pending_export = Some(code.to_string()),
            None => log::warn!("nothing to export yet"),
        }
    }

    /// Runs a queued export.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for requesting repaints
    pub fn handle_pending_export(&mut self, ctx: &egui::Context) {
        let Some(html) = self.requests.pending_export.take() else {
            return;
        };
        let sender = self.requests.sender.clone();

        #[cfg(target_arch = "wasm32")]
        {
            let event = match Self::trigger_download(EXPORT_FILE_NAME, &html) {
                Ok(()) => BackendEvent::ExportCompleted(EXPORT_FILE_NAME.to_string()),
                Err(e) => BackendEvent::ExportFailed(e),
            };
            if let Some(tx) = sender {
                let _ = tx.send(event);
            }
            ctx.request_repaint();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = ctx.clone();
            let task = async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("HTML", &["html", "htm"])
                    .set_file_name(EXPORT_FILE_NAME)
                    .save_file()
                    .await
                {
                    let path = handle.path();
                    let event = match std::fs::write(path, html) {
                        Ok(()) => BackendEvent::ExportCompleted(path.display().to_string()),
                        Err(e) => BackendEvent::ExportFailed(format!("Failed to save file: {e}")),
                    };
                    if let Some(tx) = sender {
                        let _ = tx.send(event);
                    }
                }
                ctx.request_repaint();
            };
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(task);
                }
                Err(e) => log::error!("cannot open the save dialog without a runtime: {e}"),
            }
        }
    }

    /// Opens the generated website in the browser.
    pub fn open_in_browser(&mut self, ctx: &egui::Context) {
        let Some(html) = self.website.html() else {
            return;
        };
        match Self::preview_url(html) {
            Ok(url) => {
                log::info!("opening preview at {url}");
                ctx.open_url(egui::OpenUrl::new_tab(url));
            }
            Err(e) => {
                log::error!("failed to open preview: {e}");
                self.website.error = Some(e);
            }
        }
    }

    /// Writes the preview to a temporary file and returns its `file://` URL.
    #[cfg(not(target_arch = "wasm32"))]
    fn preview_url(html: &str) -> Result<String, String> {
        let path = std::env::temp_dir().join("sitemap_studio_preview.html");
        std::fs::write(&path, html).map_err(|e| format!("Failed to write preview: {e}"))?;
        Ok(format!("file://{}", path.display()))
    }

    /// Creates an object URL for the preview (WASM only).
    #[cfg(target_arch = "wasm32")]
    fn preview_url(html: &str) -> Result<String, String> {
        Self::html_blob_url(html)
    }

    #[cfg(target_arch = "wasm32")]
    fn html_blob_url(html: &str) -> Result<String, String> {
        let blob_parts = js_sys::Array::new();
        blob_parts.push(&wasm_bindgen::JsValue::from_str(html));

        let blob_options = web_sys::BlobPropertyBag::new();
        blob_options.set_type("text/html");

        let blob = web_sys::Blob::new_with_str_sequence_and_options(&blob_parts, &blob_options)
            .map_err(|_| "Failed to create blob".to_string())?;
        web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Failed to create object URL".to_string())
    }

    /// Triggers a file download in the browser (WASM only).
    ///
    /// Creates a temporary anchor element with a blob URL and clicks it.
    ///
    /// # Arguments
    ///
    /// * `filename` - The name to give the downloaded file
    /// * `content` - The HTML to download
    #[cfg(target_arch = "wasm32")]
    fn trigger_download(filename: &str, content: &str) -> Result<(), String> {
        use wasm_bindgen::JsCast;

        let window = web_sys::window().ok_or("No window found")?;
        let document = window.document().ok_or("No document found")?;
        let url = Self::html_blob_url(content)?;

        let anchor = document
            .create_element("a")
            .map_err(|_| "Failed to create anchor element")?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| "Failed to cast to anchor element")?;

        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        let body = document.body().ok_or("No body found")?;
        body.append_child(&anchor)
            .map_err(|_| "Failed to append anchor")?;
        anchor.click();
        body.remove_child(&anchor)
            .map_err(|_| "Failed to remove anchor")?;

        web_sys::Url::revoke_object_url(&url).map_err(|_| "Failed to revoke object URL")?;
        Ok(())
    }
}
