//! Requests against the generation backend.
//!
//! Buttons only validate input and queue a [`PendingRequest`]. Once per frame
//! the queue is dispatched onto the async runtime, and results come back as
//! [`BackendEvent`]s over a channel.

use super::state::{BackendEvent, PendingRequest, RequestKind, SitemapApp};
use crate::api::{self, BackendClient, SitemapRequest, WebsiteRequest};
use crate::error::{ApiError, ValidationError};
use eframe::egui;
use std::future::Future;

/// Error box text for a failed sitemap request.
pub fn sitemap_failure_message(error: &ApiError) -> String {
    match error {
        ApiError::Status { detail, .. } => format!(
            "Failed to generate sitemap: {}",
            detail.as_deref().unwrap_or("Unknown error")
        ),
        _ => "Failed to generate sitemap. Please try again.".to_string(),
    }
}

/// Error box text for a failed deployment.
pub fn deployment_failure_message(error: &ApiError) -> String {
    match error.detail() {
        Some(detail) => format!("Deployment failed: {detail}"),
        None => format!("Deployment failed: {error}"),
    }
}

impl SitemapApp {
    /// Validates the setup form and queues a sitemap request.
    pub fn generate_sitemap(&mut self) {
        if self.requests.generating_sitemap {
            return;
        }
        let pages = api::parse_page_count(&self.setup_form.pages);
        match SitemapRequest::from_form(&self.setup_form.prompt, pages, &self.setup_form.language) {
            Ok(request) => {
                self.setup_form.error = None;
                self.requests.generating_sitemap = true;
                self.requests.pending.push(PendingRequest::GenerateSitemap(request));
            }
            Err(e) => {
                log::warn!("setup form rejected: {e}");
                self.setup_form.error = Some(e.to_string());
            }
        }
    }

    /// Queues website generation from the root page of the current sitemap.
    pub fn generate_website(&mut self) {
        if self.requests.generating_website {
            return;
        }
        match WebsiteRequest::from_sitemap(Some(&self.sitemap)) {
            Ok(request) => {
                self.website.error = None;
                self.website.deployment_url = None;
                self.requests.generating_website = true;
                self.requests.pending.push(PendingRequest::GenerateWebsite(request));
            }
            Err(e) => {
                log::warn!("cannot generate website: {e}");
                self.website.error = Some(e.to_string());
            }
        }
    }

    /// Queues deployment of the generated website.
    pub fn deploy_website(&mut self) {
        if self.requests.deploying {
            return;
        }
        let Some(html) = self.website.html().map(str::to_string) else {
            self.website.error = Some(ValidationError::NoWebsite.to_string());
            return;
        };
        let sitemap_id = self
            .website
            .website
            .as_ref()
            .and_then(|w| w.sitemap_id.clone());
        self.website.error = None;
        self.website.deployment_url = None;
        self.requests.deploying = true;
        self.requests.pending.push(PendingRequest::Deploy { html, sitemap_id });
    }

    /// Returns the backend client, creating it on first use.
    fn backend_client(&mut self) -> Result<BackendClient, ApiError> {
        if let Some(client) = &self.requests.client {
            return Ok(client.clone());
        }
        let client = BackendClient::new(self.requests.config.clone())?;
        log::info!("backend client created for {}", client.config().base_url);
        self.requests.client = Some(client.clone());
        Ok(client)
    }

    /// Applies finished results and dispatches queued requests.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for requesting repaints
    pub fn handle_pending_requests(&mut self, ctx: &egui::Context) {
        let mut events = Vec::new();
        if let Some(rx) = &self.requests.receiver {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }
        for event in events {
            self.handle_backend_event(event);
        }

        for request in std::mem::take(&mut self.requests.pending) {
            self.dispatch(ctx, request);
        }
    }

    /// Applies one result from a background task.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::SitemapGenerated(generated) => {
                self.requests.finish(RequestKind::Sitemap);
                match self.sitemap.apply_generated(&generated) {
                    Ok(()) => {
                        log::info!(
                            "sitemap generated with {} pages, homepage applied",
                            generated.pages.len()
                        );
                        self.setup_form.reset_fields();
                        self.setup_form.open = false;
                        self.setup_form.error = None;
                        self.interaction.selected_page = None;
                        self.interaction.editing_label = None;
                        self.page_dialog.page = None;
                        self.undo_history.clear();
                        self.canvas.fit_requested = true;
                    }
                    Err(e) => {
                        log::error!("generated sitemap could not be applied: {e}");
                        self.setup_form.error =
                            Some("Failed to generate sitemap. Please try again.".to_string());
                    }
                }
            }
            BackendEvent::WebsiteGenerated(website) => {
                self.requests.finish(RequestKind::Website);
                if website.html().is_none() {
                    log::warn!("backend returned a website without code");
                }
                self.website.website = Some(website);
                self.website.error = None;
                self.website.deployment_url = None;
            }
            BackendEvent::Deployed(deployment) => {
                self.requests.finish(RequestKind::Deploy);
                log::info!("website deployed to {}", deployment.deployment_url);
                self.website.deployment_url = Some(deployment.deployment_url);
            }
            BackendEvent::Failed { kind, message } => {
                self.requests.finish(kind);
                log::error!("{kind:?} request failed: {message}");
                match kind {
                    RequestKind::Sitemap => self.setup_form.error = Some(message),
                    RequestKind::Website | RequestKind::Deploy => {
                        self.website.error = Some(message)
                    }
                }
            }
            BackendEvent::ExportCompleted(path) => {
                log::info!("website exported to {path}");
                self.website.export_status = Some(format!("Exported to {path}"));
            }
            BackendEvent::ExportFailed(message) => {
                log::error!("export failed: {message}");
                self.website.error = Some(message);
            }
        }
    }

    fn dispatch(&mut self, ctx: &egui::Context, request: PendingRequest) {
        let kind = match &request {
            PendingRequest::GenerateSitemap(_) => RequestKind::Sitemap,
            PendingRequest::GenerateWebsite(_) => RequestKind::Website,
            PendingRequest::Deploy { .. } => RequestKind::Deploy,
        };
        let client = match self.backend_client() {
            Ok(client) => client,
            Err(e) => {
                self.handle_backend_event(BackendEvent::Failed {
                    kind,
                    message: e.to_string(),
                });
                return;
            }
        };

        match request {
            PendingRequest::GenerateSitemap(body) => self.spawn_task(ctx, kind, async move {
                match client.generate_sitemap(&body).await {
                    Ok(generated) => BackendEvent::SitemapGenerated(generated),
                    Err(e) => BackendEvent::Failed {
                        kind,
                        message: sitemap_failure_message(&e),
                    },
                }
            }),
            PendingRequest::GenerateWebsite(body) => self.spawn_task(ctx, kind, async move {
                match client.generate_website(&body).await {
                    Ok(website) => BackendEvent::WebsiteGenerated(website),
                    Err(e) => BackendEvent::Failed {
                        kind,
                        message: e.to_string(),
                    },
                }
            }),
            PendingRequest::Deploy { html, sitemap_id } => self.spawn_task(ctx, kind, async move {
                match client.deploy_website(&html, sitemap_id.as_deref()).await {
                    Ok(deployment) => BackendEvent::Deployed(deployment),
                    Err(e) => BackendEvent::Failed {
                        kind,
                        message: deployment_failure_message(&e),
                    },
                }
            }),
        }
    }

    /// Runs a request on the tokio runtime and reports back over the channel.
    #[cfg(not(target_arch = "wasm32"))]
    fn spawn_task<F>(&mut self, ctx: &egui::Context, kind: RequestKind, task: F)
    where
        F: Future<Output = BackendEvent> + Send + 'static,
    {
        let Some(sender) = self.requests.sender.clone() else {
            self.requests.finish(kind);
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let ctx = ctx.clone();
                runtime.spawn(async move {
                    let _ = sender.send(task.await);
                    ctx.request_repaint();
                });
            }
            Err(e) => {
                log::error!("no async runtime for {kind:?} request: {e}");
                let _ = sender.send(BackendEvent::Failed {
                    kind,
                    message: "Background tasks are unavailable. Please restart the app.".to_string(),
                });
            }
        }
    }

    /// Runs a request on the browser event loop and reports back over the channel.
    #[cfg(target_arch = "wasm32")]
    fn spawn_task<F>(&mut self, ctx: &egui::Context, kind: RequestKind, task: F)
    where
        F: Future<Output = BackendEvent> + 'static,
    {
        let Some(sender) = self.requests.sender.clone() else {
            self.requests.finish(kind);
            return;
        };
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let _ = sender.send(task.await);
            ctx.request_repaint();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Deployment, GeneratedPage, GeneratedSitemap, GeneratedWebsite};
    use crate::types::ROOT_PAGE_ID;

    fn homepage_sitemap() -> GeneratedSitemap {
        GeneratedSitemap {
            business_name: Some("Bakery".into()),
            business_description: None,
            pages: vec![GeneratedPage {
                page_title: "Home".into(),
                sections: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_sitemap_failure_message_uses_detail() {
        let with_detail = ApiError::Status {
            status: 422,
            detail: Some("prompt too short".into()),
        };
        let without_detail = ApiError::Status {
            status: 500,
            detail: None,
        };

        assert_eq!(
            sitemap_failure_message(&with_detail),
            "Failed to generate sitemap: prompt too short"
        );
        assert_eq!(
            sitemap_failure_message(&without_detail),
            "Failed to generate sitemap: Unknown error"
        );
        assert_eq!(
            sitemap_failure_message(&ApiError::ClientBuild("tls".into())),
            "Failed to generate sitemap. Please try again."
        );
    }

    #[test]
    fn test_deployment_failure_message() {
        let error = ApiError::Status {
            status: 400,
            detail: Some("bad archive".into()),
        };

        assert_eq!(deployment_failure_message(&error), "Deployment failed: bad archive");
    }

    #[test]
    fn test_generate_sitemap_validates_form() {
        let mut app = SitemapApp::default();
        app.setup_form.prompt = "   ".into();

        app.generate_sitemap();
        assert_eq!(app.setup_form.error.as_deref(), Some("Sitemap Prompt is required."));
        assert!(app.requests.pending.is_empty());

        app.setup_form.prompt = "A bakery".into();
        app.setup_form.pages = "0".into();
        app.generate_sitemap();
        assert_eq!(
            app.setup_form.error.as_deref(),
            Some("Number of Pages must be greater than 0.")
        );
        assert!(!app.requests.generating_sitemap);
    }

    #[test]
    fn test_generate_sitemap_queues_request() {
        let mut app = SitemapApp::default();
        app.setup_form.prompt = "A bakery".into();
        app.setup_form.pages = "3".into();

        app.generate_sitemap();
        app.generate_sitemap();

        assert!(app.requests.generating_sitemap);
        assert_eq!(
            app.requests.pending,
            vec![PendingRequest::GenerateSitemap(SitemapRequest {
                prompt: "A bakery".into(),
                page: 3,
                language: "english".into(),
            })]
        );
    }

    #[test]
    fn test_generate_website_requires_sitemap() {
        let mut app = SitemapApp::default();
        app.sitemap.clear();

        app.generate_website();

        assert_eq!(
            app.website.error.as_deref(),
            Some("No sitemap data found. Please generate a sitemap first.")
        );
        assert!(app.requests.pending.is_empty());
    }

    #[test]
    fn test_deploy_without_website_fails() {
        let mut app = SitemapApp::default();

        app.deploy_website();

        assert_eq!(
            app.website.error.as_deref(),
            Some("No generated website available to deploy.")
        );
        assert!(!app.requests.deploying);
    }

    #[test]
    fn test_sitemap_result_replaces_tree_and_closes_form() {
        let mut app = SitemapApp::default();
        app.sitemap.add_child(ROOT_PAGE_ID).unwrap();
        app.setup_form.open = true;
        app.setup_form.prompt = "A bakery".into();
        app.requests.generating_sitemap = true;
        app.canvas.fit_requested = false;

        app.handle_backend_event(BackendEvent::SitemapGenerated(homepage_sitemap()));

        assert_eq!(app.sitemap.nodes.len(), 1);
        assert_eq!(app.sitemap.business_name, "Bakery");
        assert!(!app.setup_form.open);
        assert!(app.setup_form.prompt.is_empty());
        assert!(!app.requests.generating_sitemap);
        assert!(app.canvas.fit_requested);
        assert!(!app.undo_history.can_undo());
    }

    #[test]
    fn test_empty_sitemap_result_reports_failure() {
        let mut app = SitemapApp::default();
        app.requests.generating_sitemap = true;

        app.handle_backend_event(BackendEvent::SitemapGenerated(GeneratedSitemap {
            business_name: None,
            business_description: None,
            pages: Vec::new(),
        }));

        assert_eq!(
            app.setup_form.error.as_deref(),
            Some("Failed to generate sitemap. Please try again.")
        );
        assert!(!app.requests.generating_sitemap);
    }

    #[test]
    fn test_failures_are_routed_by_kind() {
        let mut app = SitemapApp::default();
        app.requests.deploying = true;

        app.handle_backend_event(BackendEvent::Failed {
            kind: RequestKind::Deploy,
            message: "Deployment failed: nope".into(),
        });

        assert!(!app.requests.deploying);
        assert_eq!(app.website.error.as_deref(), Some("Deployment failed: nope"));
        assert!(app.setup_form.error.is_none());
    }

    #[test]
    fn test_website_then_deployment_results() {
        let mut app = SitemapApp::default();
        app.website.error = Some("old".into());

        app.handle_backend_event(BackendEvent::WebsiteGenerated(GeneratedWebsite {
            code: Some("<html></html>".into()),
            sitemap_id: Some("42".into()),
        }));
        assert_eq!(app.website.html(), Some("<html></html>"));
        assert!(app.website.error.is_none());

        app.deploy_website();
        assert_eq!(
            app.requests.pending,
            vec![PendingRequest::Deploy {
                html: "<html></html>".into(),
                sitemap_id: Some("42".into()),
            }]
        );

        app.handle_backend_event(BackendEvent::Deployed(Deployment {
            deployment_url: "https://example.test/site".into(),
        }));
        assert_eq!(
            app.website.deployment_url.as_deref(),
            Some("https://example.test/site")
        );
    }

    #[test]
    fn test_dispatch_without_runtime_reports_failure() {
        let ctx = egui::Context::default();
        let mut app = SitemapApp::default();
        app.setup_form.prompt = "A bakery".into();
        app.generate_sitemap();

        // First frame dispatches, second frame drains the failure.
        app.handle_pending_requests(&ctx);
        app.handle_pending_requests(&ctx);

        assert!(app.requests.pending.is_empty());
        assert!(!app.requests.generating_sitemap);
        assert!(app.setup_form.error.is_some());
    }
}
