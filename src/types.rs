//! Core data types for the sitemap editor.
//!
//! This module defines the page tree that is edited on the canvas: pages with
//! their content sections, the parent-to-child edges between them, and the
//! [`Sitemap`] container that also carries business metadata used when the
//! website is generated.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Identifier of a page node. The first page always uses [`ROOT_PAGE_ID`].
pub type PageId = String;

/// Id of the page every sitemap starts from.
pub const ROOT_PAGE_ID: &str = "root";

/// Default edge style, drawn as an orthogonal polyline.
pub const SMOOTHSTEP_EDGE: &str = "smoothstep";

/// Generates a fresh, collision-free page id.
pub fn new_page_id() -> PageId {
    format!("node-{}", Uuid::new_v4().simple())
}

/// Builds the id of the edge linking `source` to `target`.
pub fn edge_id(source: &str, target: &str) -> String {
    format!("edge-{source}-{target}")
}

/// Accepts ids that were written either as JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

/// A block of content on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier unique within the page
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Short heading
    #[serde(default, alias = "sectionTitle")]
    pub title: String,
    /// Body text; also holds free-form page prompts
    #[serde(default, alias = "sectionDescription", alias = "content")]
    pub description: String,
}

impl Section {
    /// Creates a section with a fresh id.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// The editable content of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    /// Page name shown in the card header
    pub label: String,
    /// Content sections, in display order
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Top-left corner of a page card in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Position {
    /// Creates a position from its coordinates.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

fn default_node_type() -> String {
    "custom".to_string()
}

/// A page in the sitemap tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    /// Unique identifier
    pub id: PageId,
    /// Renderer kind, kept for compatibility with stored snapshots
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    /// Label and sections
    pub data: PageData,
    /// Card position on the canvas
    pub position: Position,
    /// Depth in the tree (roots are level 0); derived
    #[serde(skip)]
    pub level: usize,
    /// Horizontal room needed by this page and its descendants; derived
    #[serde(skip)]
    pub subtree_width: f32,
}

impl PageNode {
    /// Creates an empty page with the given id, label and position.
    pub fn new(id: impl Into<PageId>, label: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            node_type: default_node_type(),
            data: PageData {
                label: label.into(),
                sections: Vec::new(),
            },
            position,
            level: 0,
            subtree_width: crate::constants::NODE_WIDTH,
        }
    }

    /// Height of the rendered card in world units.
    ///
    /// Only the root card lists its sections, so only it grows with content.
    pub fn height(&self) -> f32 {
        let sections = if self.id == ROOT_PAGE_ID {
            self.data.sections.len() as f32
        } else {
            0.0
        };
        crate::constants::NODE_HEADER_HEIGHT
            + sections * crate::constants::NODE_SECTION_HEIGHT
            + crate::constants::NODE_FOOTER_HEIGHT
    }
}

fn default_edge_type() -> String {
    SMOOTHSTEP_EDGE.to_string()
}

/// A directed parent-to-child link between two pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier, `edge-<source>-<target>`
    pub id: String,
    /// Parent page
    pub source: PageId,
    /// Child page
    pub target: PageId,
    /// Drawing style
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
}

impl Edge {
    /// Creates a smooth-step edge from `source` to `target`.
    pub fn new(source: impl Into<PageId>, target: impl Into<PageId>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            source,
            target,
            edge_type: default_edge_type(),
        }
    }
}

/// The whole page tree plus the business metadata it was generated for.
#[derive(Debug, Clone, PartialEq)]
pub struct Sitemap {
    /// All pages, in insertion order
    pub nodes: Vec<PageNode>,
    /// Parent-to-child edges
    pub edges: Vec<Edge>,
    /// Number handed to the next "Page N" label
    pub page_count: u32,
    /// Business name returned by the sitemap generator
    pub business_name: String,
    /// Business description returned by the sitemap generator
    pub business_description: String,
    /// Optional reference image forwarded to the website generator
    pub image_url: Option<String>,
}

impl Default for Sitemap {
    /// A single "Home" root page and a page counter of one.
    fn default() -> Self {
        let (x, y) = crate::constants::ROOT_POSITION;
        Self {
            nodes: vec![PageNode::new(ROOT_PAGE_ID, "Home", Position::new(x, y))],
            edges: Vec::new(),
            page_count: 1,
            business_name: String::new(),
            business_description: String::new(),
            image_url: None,
        }
    }
}

impl Sitemap {
    /// Creates the initial sitemap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the sitemap holds no pages (after a delete).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks a page up by id.
    pub fn node(&self, id: &str) -> Option<&PageNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Looks a page up by id for modification.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut PageNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Returns `true` if a page with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }
}
