//! Shared application-wide constants.
//! Centralizes tweakable values used across layout, rendering and persistence.

// Page cards
/// Width of a page card in world units.
pub const NODE_WIDTH: f32 = 180.0;
/// Height of the card header holding the page label.
pub const NODE_HEADER_HEIGHT: f32 = 32.0;
/// Height of a single section block on the root card.
pub const NODE_SECTION_HEIGHT: f32 = 56.0;
/// Height of the card footer holding the Generate button.
pub const NODE_FOOTER_HEIGHT: f32 = 44.0;
/// Corner radius of page cards in screen pixels at 100% zoom.
pub const NODE_CORNER_RADIUS: f32 = 6.0;
/// Radius of the "+" handles around a card.
pub const HANDLE_RADIUS: f32 = 10.0;

// Tree layout
/// Horizontal distance between the left edges of neighbouring siblings.
pub const HORIZONTAL_SPACING: f32 = 400.0;
/// Vertical distance between tree levels.
pub const VERTICAL_SPACING: f32 = 300.0;
/// Where the first page is placed on a fresh sitemap.
pub const ROOT_POSITION: (f32, f32) = (100.0, 100.0);

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;
/// Size of the minimap overlay in screen pixels.
pub const MINIMAP_SIZE: (f32, f32) = (200.0, 140.0);
/// Margin between overlays and the canvas edge.
pub const OVERLAY_MARGIN: f32 = 12.0;

// Canvas interactions
/// Lower zoom bound.
pub const MIN_ZOOM: f32 = 0.25;
/// Upper zoom bound.
pub const MAX_ZOOM: f32 = 2.5;
/// Padding in screen pixels kept around the sitemap by "fit view".
pub const FIT_VIEW_PADDING: f32 = 60.0;

// Undo/redo
/// Maximum number of undo history entries to retain.
pub const MAX_UNDO_HISTORY: usize = 100;

// Persistence
/// Storage key of the sitemap snapshot.
pub const SITEMAP_STORAGE_KEY: &str = "sitemap_data";
/// Storage key of the last generated website HTML.
pub const WEBSITE_CODE_STORAGE_KEY: &str = "websiteCode";
/// Storage key of the UI preferences.
pub const PREFS_STORAGE_KEY: &str = "app_prefs";
