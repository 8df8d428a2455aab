//! Persistence of the sitemap, the last generated website and UI preferences.
//!
//! Everything goes through [`eframe::Storage`], which is backed by
//! `localStorage` on the web and by a RON file in the app data directory on
//! native targets. Values are stored as JSON strings.

use crate::constants::{PREFS_STORAGE_KEY, SITEMAP_STORAGE_KEY, WEBSITE_CODE_STORAGE_KEY};
use crate::error::StorageError;
use crate::layout;
use crate::types::{Edge, PageNode, Sitemap};
use serde::{Deserialize, Serialize};

fn default_page_count() -> u32 {
    1
}

/// On-disk shape of a sitemap snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSitemap {
    /// Pages with id, type, position, label and sections
    #[serde(default)]
    pub saved_nodes: Vec<PageNode>,
    /// Parent-to-child edges; a snapshot without this key is not restored
    #[serde(default)]
    pub saved_edges: Option<Vec<Edge>>,
    /// Next page number
    #[serde(default = "default_page_count")]
    pub saved_page_count: u32,
    /// Business name
    #[serde(default)]
    pub business_name: String,
    /// Business description
    #[serde(default)]
    pub business_description: String,
    /// Reference image
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<&Sitemap> for SavedSitemap {
    fn from(sitemap: &Sitemap) -> Self {
        Self {
            saved_nodes: sitemap.nodes.clone(),
            saved_edges: Some(sitemap.edges.clone()),
            saved_page_count: sitemap.page_count,
            business_name: sitemap.business_name.clone(),
            business_description: sitemap.business_description.clone(),
            image_url: sitemap.image_url.clone(),
        }
    }
}

impl From<SavedSitemap> for Sitemap {
    fn from(saved: SavedSitemap) -> Self {
        let mut sitemap = Sitemap {
            nodes: saved.saved_nodes,
            edges: saved.saved_edges.unwrap_or_default(),
            page_count: saved.saved_page_count.max(1),
            business_name: saved.business_name,
            business_description: saved.business_description,
            image_url: saved.image_url,
        };
        // Drop edges whose endpoints did not survive.
        let ids: std::collections::HashSet<String> =
            sitemap.nodes.iter().map(|n| n.id.clone()).collect();
        sitemap
            .edges
            .retain(|e| ids.contains(&e.source) && ids.contains(&e.target));
        layout::assign_levels(&mut sitemap);
        sitemap
    }
}

/// Serializes a sitemap snapshot. A deleted sitemap encodes to an empty string.
pub fn encode_sitemap(sitemap: &Sitemap) -> Result<String, StorageError> {
    if sitemap.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_json::to_string(&SavedSitemap::from(sitemap))?)
}

/// Parses a stored snapshot.
///
/// Blank input and snapshots without pages are reported as [`StorageError::Empty`];
/// snapshots without an edge list as [`StorageError::MissingEdges`].
pub fn decode_sitemap(json: &str) -> Result<Sitemap, StorageError> {
    if json.trim().is_empty() {
        return Err(StorageError::Empty);
    }
    let saved: SavedSitemap = serde_json::from_str(json)?;
    if saved.saved_nodes.is_empty() {
        return Err(StorageError::Empty);
    }
    if saved.saved_edges.is_none() {
        return Err(StorageError::MissingEdges);
    }
    Ok(saved.into())
}

/// Loads the sitemap, falling back to the default one.
pub fn load_sitemap(storage: Option<&dyn eframe::Storage>) -> Sitemap {
    let Some(json) = storage.and_then(|s| s.get_string(SITEMAP_STORAGE_KEY)) else {
        return Sitemap::default();
    };
    match decode_sitemap(&json) {
        Ok(sitemap) => {
            log::info!("restored sitemap with {} pages", sitemap.nodes.len());
            sitemap
        }
        Err(StorageError::Empty) => Sitemap::default(),
        Err(e) => {
            log::error!("Error loading sitemap data: {e}");
            Sitemap::default()
        }
    }
}

/// Writes the sitemap snapshot; a deleted sitemap clears the key.
pub fn save_sitemap(storage: &mut dyn eframe::Storage, sitemap: &Sitemap) {
    match encode_sitemap(sitemap) {
        Ok(json) => storage.set_string(SITEMAP_STORAGE_KEY, json),
        Err(e) => log::error!("Error saving sitemap data: {e}"),
    }
}

/// Reads the last generated website HTML.
pub fn load_website_code(storage: Option<&dyn eframe::Storage>) -> Option<String> {
    storage
        .and_then(|s| s.get_string(WEBSITE_CODE_STORAGE_KEY))
        .filter(|code| !code.is_empty())
}

/// Stores the last generated website HTML.
pub fn save_website_code(storage: &mut dyn eframe::Storage, code: Option<&str>) {
    storage.set_string(WEBSITE_CODE_STORAGE_KEY, code.unwrap_or_default().to_string());
}

/// UI preferences that survive restarts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Dark visuals
    pub dark_mode: bool,
    /// Background grid on the canvas
    pub show_grid: bool,
    /// Minimap overlay
    pub show_minimap: bool,
    /// Remembered width of the left sidebar
    pub sidebar_width: f32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            show_grid: true,
            show_minimap: true,
            sidebar_width: 64.0,
        }
    }
}

impl Preferences {
    /// Loads preferences, using defaults for anything missing or unreadable.
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        storage
            .and_then(|s| s.get_string(PREFS_STORAGE_KEY))
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(prefs) => Some(prefs),
                Err(e) => {
                    log::warn!("ignoring unreadable preferences: {e}");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Stores the preferences.
    pub fn save(&self, storage: &mut dyn eframe::Storage) {
        match serde_json::to_string(self) {
            Ok(json) => storage.set_string(PREFS_STORAGE_KEY, json),
            Err(e) => log::error!("Error saving preferences: {e}"),
        }
    }
}

/// A process-local [`eframe::Storage`], used by tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryStorage {
    pub values: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl eframe::Storage for MemoryStorage {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Side;
    use crate::types::{Section, ROOT_PAGE_ID};
    use serde_json::json;

    fn populated() -> Sitemap {
        let mut sitemap = Sitemap::default();
        sitemap.business_name = "Bakery".into();
        sitemap
            .node_mut(ROOT_PAGE_ID)
            .unwrap()
            .data
            .sections
            .push(Section::new("Hero", "Welcome"));
        let child = sitemap.add_child(ROOT_PAGE_ID).unwrap();
        sitemap.add_sibling(&child, Side::Right).unwrap();
        sitemap
    }

    #[test]
    fn test_snapshot_uses_camel_case_keys() {
        let json = encode_sitemap(&populated()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["savedNodes"].as_array().unwrap().len(), 3);
        assert_eq!(value["savedEdges"].as_array().unwrap().len(), 2);
        assert_eq!(value["savedPageCount"], 3);
        assert_eq!(value["businessName"], "Bakery");
        assert_eq!(value["businessDescription"], "");
        assert!(value["imageUrl"].is_null());
    }

    #[test]
    fn test_storage_round_trip_restores_levels() {
        let original = populated();
        let mut storage = MemoryStorage::default();

        save_sitemap(&mut storage, &original);
        let restored = load_sitemap(Some(&storage));

        assert_eq!(restored, original);
        let child = &restored.children_of(ROOT_PAGE_ID)[0];
        assert_eq!(child.level, 1);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let json = json!({
            "savedNodes": [{
                "id": "root",
                "data": {"label": "Start"},
                "position": {"x": 5.0, "y": 6.0}
            }],
            "savedEdges": []
        })
        .to_string();

        let sitemap = decode_sitemap(&json).unwrap();

        assert_eq!(sitemap.page_count, 1);
        assert_eq!(sitemap.business_name, "");
        assert_eq!(sitemap.nodes[0].node_type, "custom");
        assert_eq!(sitemap.nodes[0].data.label, "Start");
    }

    #[test]
    fn test_snapshot_without_edge_list_falls_back_to_default() {
        let json = json!({
            "savedNodes": [{"id": "root", "data": {"label": "Start"}, "position": {"x": 0, "y": 0}}],
            "savedPageCount": 2
        })
        .to_string();
        let mut storage = MemoryStorage::default();
        storage.values.insert(SITEMAP_STORAGE_KEY.into(), json.clone());

        assert!(matches!(decode_sitemap(&json), Err(StorageError::MissingEdges)));
        assert_eq!(load_sitemap(Some(&storage)), Sitemap::default());
    }

    #[test]
    fn test_dangling_edges_are_dropped() {
        let json = json!({
            "savedNodes": [{"id": "root", "data": {"label": "Home"}, "position": {"x": 0, "y": 0}}],
            "savedEdges": [{"id": "edge-root-gone", "source": "root", "target": "gone"}],
            "savedPageCount": 4
        })
        .to_string();

        let sitemap = decode_sitemap(&json).unwrap();

        assert!(sitemap.edges.is_empty());
        assert_eq!(sitemap.page_count, 4);
    }

    #[test]
    fn test_invalid_snapshot_falls_back_to_default() {
        let mut storage = MemoryStorage::default();
        storage
            .values
            .insert(SITEMAP_STORAGE_KEY.into(), "{not json".into());

        assert!(matches!(decode_sitemap("{not json"), Err(StorageError::Parse(_))));
        assert_eq!(load_sitemap(Some(&storage)), Sitemap::default());
    }

    #[test]
    fn test_node_less_snapshot_falls_back_to_default() {
        assert!(matches!(
            decode_sitemap(r#"{"savedNodes": []}"#),
            Err(StorageError::Empty)
        ));
        assert_eq!(load_sitemap(None), Sitemap::default());
    }

    #[test]
    fn test_deleted_sitemap_clears_key() {
        let mut storage = MemoryStorage::default();
        save_sitemap(&mut storage, &populated());

        let mut deleted = populated();
        deleted.clear();
        save_sitemap(&mut storage, &deleted);

        assert_eq!(storage.values[SITEMAP_STORAGE_KEY], "");
        assert_eq!(load_sitemap(Some(&storage)), Sitemap::default());
    }

    #[test]
    fn test_website_code_round_trip() {
        let mut storage = MemoryStorage::default();
        assert_eq!(load_website_code(Some(&storage)), None);

        save_website_code(&mut storage, Some("<h1>Hi</h1>"));
        assert_eq!(load_website_code(Some(&storage)).as_deref(), Some("<h1>Hi</h1>"));

        save_website_code(&mut storage, None);
        assert_eq!(load_website_code(Some(&storage)), None);
    }

    #[test]
    fn test_preferences_round_trip_and_defaults() {
        let mut storage = MemoryStorage::default();
        assert_eq!(Preferences::load(Some(&storage)), Preferences::default());

        let prefs = Preferences {
            dark_mode: true,
            show_grid: false,
            ..Preferences::default()
        };
        prefs.save(&mut storage);

        assert_eq!(Preferences::load(Some(&storage)), prefs);

        storage.values.insert(PREFS_STORAGE_KEY.into(), "garbage".into());
        assert_eq!(Preferences::load(Some(&storage)), Preferences::default());
    }
}
