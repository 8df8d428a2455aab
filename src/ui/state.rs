//! Application state management structures.
//!
//! This module contains the state structures that track the editor's UI:
//! canvas navigation, page interactions, the page dialog, the setup form, the
//! website view, and requests running against the generation backend.

use super::undo::UndoHistory;
use crate::api::{BackendClient, Deployment, GeneratedSitemap, GeneratedWebsite, SitemapRequest, WebsiteRequest};
use crate::config::BackendConfig;
use crate::storage::{self, Preferences};
use crate::types::*;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Top-level views selected in the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// The sitemap canvas
    #[default]
    Sitemap,
    /// Website generation, preview and deployment
    Website,
}

/// State related to canvas navigation and display.
pub struct CanvasState {
    /// Current canvas pan offset (in screen space)
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = 100%)
    pub zoom_factor: f32,
    /// Whether the background grid is drawn
    pub show_grid: bool,
    /// Whether the minimap overlay is drawn
    pub show_minimap: bool,
    /// Fit the sitemap into view on the next canvas frame
    pub fit_requested: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            show_grid: true,
            show_minimap: true,
            fit_requested: true,
        }
    }
}

/// State related to user interactions with pages on the canvas.
#[derive(Default)]
pub struct InteractionState {
    /// Page highlighted by the last click
    pub selected_page: Option<PageId>,
    /// Page whose label is being edited inline
    pub editing_label: Option<PageId>,
    /// Label text while editing
    pub temp_label: String,
    /// Select the whole label once the editor gains focus
    pub should_select_text: bool,
    /// Focus was already requested for the current edit session
    pub focus_requested_for_edit: bool,
    /// Whether the user is currently panning the canvas
    pub is_panning: bool,
    /// Last pointer position during panning
    pub last_pan_pos: Option<egui::Pos2>,
    /// Page whose "⋯" menu is open
    pub menu_page: Option<PageId>,
    /// Screen position of the open page menu
    pub menu_pos: egui::Pos2,
    /// Keeps a freshly opened menu from closing on the same click
    pub menu_just_opened: bool,
}

/// The page dialog opened from a card header.
#[derive(Default)]
pub struct PageDialogState {
    /// Page being edited; the dialog is open while this is set
    pub page: Option<PageId>,
    /// "Page name" field
    pub name: String,
    /// "Page prompt" field
    pub prompt: String,
}

/// The primary setup form that requests a generated sitemap.
pub struct SetupFormState {
    /// Whether the form window is visible
    pub open: bool,
    /// "Sitemap Prompt" field
    pub prompt: String,
    /// "Number of Pages" field
    pub pages: String,
    /// "Language" field
    pub language: String,
    /// Validation or request error shown under the fields
    pub error: Option<String>,
}

impl Default for SetupFormState {
    fn default() -> Self {
        Self {
            open: false,
            prompt: String::new(),
            pages: "1".to_string(),
            language: String::new(),
            error: None,
        }
    }
}

impl SetupFormState {
    /// Clears the fields after a successful generation.
    pub fn reset_fields(&mut self) {
        *self = Self {
            open: self.open,
            ..Self::default()
        };
    }
}

/// State of the website view.
#[derive(Default)]
pub struct WebsiteState {
    /// Last generated website
    pub website: Option<GeneratedWebsite>,
    /// Error box content
    pub error: Option<String>,
    /// URL of the last successful deployment
    pub deployment_url: Option<String>,
    /// Preview fills the whole view
    pub fullscreen: bool,
    /// Status line of the last export
    pub export_status: Option<String>,
}

impl WebsiteState {
    /// HTML of the generated website, if any.
    pub fn html(&self) -> Option<&str> {
        self.website.as_ref().and_then(GeneratedWebsite::html)
    }
}

/// Which backend request a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Sitemap generation
    Sitemap,
    /// Website generation
    Website,
    /// Website deployment
    Deploy,
}

/// A request waiting to be dispatched to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingRequest {
    /// Generate a sitemap from the setup form
    GenerateSitemap(SitemapRequest),
    /// Generate the website from the root page
    GenerateWebsite(WebsiteRequest),
    /// Deploy the generated HTML
    Deploy {
        /// The HTML document to publish
        html: String,
        /// Identifier returned with the website
        sitemap_id: Option<String>,
    },
}

/// Messages sent from background tasks back to the app.
#[derive(Debug)]
pub enum BackendEvent {
    /// A sitemap arrived
    SitemapGenerated(GeneratedSitemap),
    /// A website arrived
    WebsiteGenerated(GeneratedWebsite),
    /// The website was published
    Deployed(Deployment),
    /// An HTML export was written
    ExportCompleted(String),
    /// A request failed with a user-facing message
    Failed {
        /// Which request failed
        kind: RequestKind,
        /// Message for the error box
        message: String,
    },
    /// An export failed
    ExportFailed(String),
}

/// Backend connection, queued requests and in-flight flags.
pub struct RequestState {
    /// Where the backend lives
    pub config: BackendConfig,
    /// Lazily created HTTP client
    pub client: Option<BackendClient>,
    /// Requests to dispatch on the next frame
    pub pending: Vec<PendingRequest>,
    /// HTML exports to run on the next frame
    pub pending_export: Option<String>,
    /// Channel for receiving results from async contexts
    pub sender: Option<Sender<BackendEvent>>,
    pub receiver: Option<Receiver<BackendEvent>>,
    /// A sitemap request is running
    pub generating_sitemap: bool,
    /// A website request is running
    pub generating_website: bool,
    /// A deployment is running
    pub deploying: bool,
}

impl RequestState {
    /// Creates the request state for a backend.
    pub fn new(config: BackendConfig) -> Self {
        let (sender, receiver) = channel();
        Self {
            config,
            client: None,
            pending: Vec::new(),
            pending_export: None,
            sender: Some(sender),
            receiver: Some(receiver),
            generating_sitemap: false,
            generating_website: false,
            deploying: false,
        }
    }

    /// Clears the in-flight flag of a finished request.
    pub fn finish(&mut self, kind: RequestKind) {
        match kind {
            RequestKind::Sitemap => self.generating_sitemap = false,
            RequestKind::Website => self.generating_website = false,
            RequestKind::Deploy => self.deploying = false,
        }
    }
}

/// The main application structure containing UI state and the sitemap.
///
/// Implements `eframe::App`; see `ui/mod.rs` for the frame logic.
pub struct SitemapApp {
    /// The sitemap being edited
    pub sitemap: Sitemap,
    /// Visible top-level view
    pub view: View,
    /// Canvas navigation and display state
    pub canvas: CanvasState,
    /// Page interaction state
    pub interaction: InteractionState,
    /// Page dialog
    pub page_dialog: PageDialogState,
    /// Primary setup form
    pub setup_form: SetupFormState,
    /// Website view
    pub website: WebsiteState,
    /// Backend requests
    pub requests: RequestState,
    /// Undo/redo history
    pub undo_history: UndoHistory,
    /// Whether the "delete sitemap" confirmation is showing
    pub confirm_delete: bool,
    /// Whether dark visuals are enabled
    pub dark_mode: bool,
    /// Remembered width of the left sidebar
    pub sidebar_width: f32,
}

impl Default for SitemapApp {
    fn default() -> Self {
        Self::new(None, BackendConfig::default())
    }
}

impl SitemapApp {
    /// Creates the app, restoring whatever the storage holds.
    ///
    /// # Arguments
    ///
    /// * `storage` - Persistent storage, if the platform provides one
    /// * `config` - Backend location
    pub fn new(storage: Option<&dyn eframe::Storage>, config: BackendConfig) -> Self {
        let prefs = Preferences::load(storage);
        let website = storage::load_website_code(storage).map(|code| GeneratedWebsite {
            code: Some(code),
            sitemap_id: None,
        });
        Self {
            sitemap: storage::load_sitemap(storage),
            view: View::default(),
            canvas: CanvasState {
                show_grid: prefs.show_grid,
                show_minimap: prefs.show_minimap,
                ..CanvasState::default()
            },
            interaction: InteractionState::default(),
            page_dialog: PageDialogState::default(),
            setup_form: SetupFormState::default(),
            website: WebsiteState {
                website,
                ..WebsiteState::default()
            },
            requests: RequestState::new(config),
            undo_history: UndoHistory::new(),
            confirm_delete: false,
            dark_mode: prefs.dark_mode,
            sidebar_width: prefs.sidebar_width,
        }
    }

    /// Current UI preferences.
    pub fn preferences(&self) -> Preferences {
        Preferences {
            dark_mode: self.dark_mode,
            show_grid: self.canvas.show_grid,
            show_minimap: self.canvas.show_minimap,
            sidebar_width: self.sidebar_width,
        }
    }
}
