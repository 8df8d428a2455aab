//! Error types shared across the crate.

use thiserror::Error;

/// Errors raised by sitemap tree mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The referenced page does not exist.
    #[error("page `{0}` does not exist")]
    UnknownPage(String),
    /// Children can only be attached to a root page.
    #[error("only root pages can receive a child")]
    NotRoot,
    /// The root page already has its child.
    #[error("page `{0}` already has a child")]
    AlreadyHasChild(String),
    /// Root pages have no parent to attach a sibling to.
    #[error("root pages cannot have siblings")]
    RootHasNoSiblings,
    /// A page name was empty after trimming.
    #[error("page name must not be empty")]
    EmptyLabel,
    /// A generated sitemap contained no pages.
    #[error("generated sitemap contains no pages")]
    EmptySitemap,
}

/// Validation failures shown to the user before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The sitemap prompt was blank.
    #[error("Sitemap Prompt is required.")]
    MissingPrompt,
    /// The requested page count was zero or negative.
    #[error("Number of Pages must be greater than 0.")]
    InvalidPageCount,
    /// There is no sitemap to build a website from.
    #[error("No sitemap data found. Please generate a sitemap first.")]
    NoSitemapData,
    /// The sitemap has no root page.
    #[error("Root node not found in sitemap data.")]
    RootNotFound,
    /// Deployment was requested before any website was generated.
    #[error("No generated website available to deploy.")]
    NoWebsite,
}

/// Errors returned by the generation backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    ClientBuild(String),
    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("request failed with status code {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `detail` field of the error body, when present.
        detail: Option<String>,
    },
    /// The response body did not match the expected shape.
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
    /// Building the deployment archive failed.
    #[error("failed to package website: {0}")]
    Package(#[from] zip::result::ZipError),
    /// Writing into the deployment archive failed.
    #[error("failed to package website: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// The backend-provided error detail, if the failure carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Errors raised while decoding a persisted sitemap snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The snapshot could not be parsed.
    #[error("stored sitemap is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The snapshot parsed but holds no pages.
    #[error("stored sitemap has no pages")]
    Empty,
    /// The snapshot has pages but no edge list.
    #[error("stored sitemap has no edge list")]
    MissingEdges,
}
