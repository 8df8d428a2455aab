//! Typed client for the remote generation backend.
//!
//! The backend turns a business prompt into a sitemap, turns the homepage into
//! a complete HTML document, and publishes a zipped website. It is treated as
//! an opaque collaborator: this module only shapes requests and responses.

use crate::config::BackendConfig;
use crate::error::{ApiError, ValidationError};
use crate::types::{Sitemap, ROOT_PAGE_ID};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Write;

/// Language used when the form leaves it blank.
pub const DEFAULT_LANGUAGE: &str = "english";

/// Body of a sitemap generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapRequest {
    /// Description of the business and its goals
    pub prompt: String,
    /// Number of pages to generate
    pub page: u32,
    /// Content language
    pub language: String,
}

impl SitemapRequest {
    /// Validates the setup form and builds the request.
    ///
    /// The prompt is required, the page count must be positive and a blank
    /// language falls back to [`DEFAULT_LANGUAGE`].
    pub fn from_form(prompt: &str, pages: i64, language: &str) -> Result<Self, ValidationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ValidationError::MissingPrompt);
        }
        if pages <= 0 {
            return Err(ValidationError::InvalidPageCount);
        }
        let page = u32::try_from(pages).unwrap_or(u32::MAX);
        let language = match language.trim() {
            "" => DEFAULT_LANGUAGE,
            other => other,
        };
        Ok(Self {
            prompt: prompt.to_string(),
            page,
            language: language.to_string(),
        })
    }
}

/// Parses the "Number of Pages" field; anything unparsable counts as zero.
///
/// Counts too large for an `i64` saturate instead of wrapping to zero.
pub fn parse_page_count(input: &str) -> i64 {
    let trimmed = input.trim();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let number = &trimmed[..end];
    match number.parse::<i64>() {
        Ok(n) => n,
        Err(e) if matches!(e.kind(), std::num::IntErrorKind::PosOverflow) => i64::MAX,
        Err(e) if matches!(e.kind(), std::num::IntErrorKind::NegOverflow) => i64::MIN,
        Err(_) => 0,
    }
}

/// A content section as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSection {
    /// Section heading
    #[serde(default, alias = "title")]
    pub section_title: String,
    /// Section body
    #[serde(default, alias = "description")]
    pub section_description: String,
}

/// One page of a generated sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPage {
    /// Page title, e.g. "Home"
    pub page_title: String,
    /// Suggested sections
    #[serde(default)]
    pub sections: Vec<GeneratedSection>,
}

/// Response of the sitemap generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSitemap {
    /// Business name inferred from the prompt
    #[serde(default)]
    pub business_name: Option<String>,
    /// Business description inferred from the prompt
    #[serde(default)]
    pub business_description: Option<String>,
    /// Generated pages
    pub pages: Vec<GeneratedPage>,
}

/// Body of a website generation request, built from the root page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteRequest {
    /// Business name
    pub business_name: String,
    /// Business description
    pub business_description: String,
    /// Optional reference image
    pub image_url: Option<String>,
    /// Title of the root page
    pub page_title: String,
    /// Sections of the root page
    pub sections: Vec<GeneratedSection>,
}

impl WebsiteRequest {
    /// Builds the request from the current sitemap.
    ///
    /// A missing or deleted sitemap and a sitemap without a root page are
    /// reported as validation errors.
    pub fn from_sitemap(sitemap: Option<&Sitemap>) -> Result<Self, ValidationError> {
        let sitemap = sitemap
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::NoSitemapData)?;
        let root = sitemap
            .node(ROOT_PAGE_ID)
            .ok_or(ValidationError::RootNotFound)?;
        Ok(Self {
            business_name: sitemap.business_name.clone(),
            business_description: sitemap.business_description.clone(),
            image_url: sitemap.image_url.clone(),
            page_title: root.data.label.clone(),
            sections: root
                .data
                .sections
                .iter()
                .map(|s| GeneratedSection {
                    section_title: s.title.clone(),
                    section_description: s.description.clone(),
                })
                .collect(),
        })
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Response of the website generator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedWebsite {
    /// Complete HTML document
    #[serde(default)]
    pub code: Option<String>,
    /// Identifier the backend associates with this site
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub sitemap_id: Option<String>,
}

impl GeneratedWebsite {
    /// The HTML document, if the backend produced a non-empty one.
    pub fn html(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }
}

/// Response of the deploy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Deployment {
    /// Public URL of the published site
    pub deployment_url: String,
}

/// Extracts the `detail` field from an error body.
///
/// Structured details (validation error lists) are returned as compact JSON.
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Packs an HTML document into a zip archive holding `index.html`.
pub fn package_website(html: &str) -> Result<Vec<u8>, ApiError> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    writer.start_file("index.html", options)?;
    writer.write_all(html.as_bytes())?;
    Ok(writer.finish()?.into_inner())
}

/// Milliseconds since the Unix epoch, used to name uploads.
pub fn unix_millis() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// HTTP client for the generation backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Creates a client for the configured backend.
    pub fn new(config: BackendConfig) -> Result<Self, ApiError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout);
        let http = builder
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// The configuration this client talks to.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Asks the backend for a sitemap.
    pub async fn generate_sitemap(
        &self,
        request: &SitemapRequest,
    ) -> Result<GeneratedSitemap, ApiError> {
        log::info!(
            "generating sitemap: {} pages in {}",
            request.page,
            request.language
        );
        let response = self
            .http
            .post(self.config.sitemap_generator_url())
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    /// Asks the backend for the HTML of the homepage.
    pub async fn generate_website(
        &self,
        request: &WebsiteRequest,
    ) -> Result<GeneratedWebsite, ApiError> {
        log::info!("generating website for page `{}`", request.page_title);
        let response = self
            .http
            .post(self.config.website_generator_url())
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    /// Uploads the generated HTML as `index.html` inside a zip archive.
    pub async fn deploy_website(&self, html: &str, sitemap_id: Option<&str>) -> Result<Deployment, ApiError> {
        let stamp = unix_millis().to_string();
        let archive = package_website(html)?;
        log::info!("deploying website archive of {} bytes", archive.len());

        let part = reqwest::multipart::Part::bytes(archive)
            .file_name(format!("website_{stamp}.zip"))
            .mime_str("application/zip")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("sitemap_id", sitemap_id.unwrap_or(&stamp).to_string());

        let response = self
            .http
            .post(self.config.deploy_url())
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let detail = error_detail(&body);
        log::warn!("backend answered {status}: {}", detail.as_deref().unwrap_or("no detail"));
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Section, Sitemap};
    use serde_json::json;
    use std::io::Read;

    #[test]
    fn test_sitemap_request_trims_and_defaults_language() {
        let request = SitemapRequest::from_form("  A cosy bakery  ", 4, "   ").unwrap();

        assert_eq!(request.prompt, "A cosy bakery");
        assert_eq!(request.page, 4);
        assert_eq!(request.language, "english");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"prompt": "A cosy bakery", "page": 4, "language": "english"})
        );
    }

    #[test]
    fn test_sitemap_request_requires_prompt() {
        let result = SitemapRequest::from_form("   ", 3, "french");

        assert_eq!(result, Err(ValidationError::MissingPrompt));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Sitemap Prompt is required."
        );
    }

    #[test]
    fn test_sitemap_request_requires_positive_page_count() {
        assert_eq!(
            SitemapRequest::from_form("bakery", 0, ""),
            Err(ValidationError::InvalidPageCount)
        );
        assert_eq!(
            SitemapRequest::from_form("bakery", -2, ""),
            Err(ValidationError::InvalidPageCount)
        );
    }

    #[test]
    fn test_parse_page_count_behaves_like_leading_integer_parse() {
        assert_eq!(parse_page_count("5"), 5);
        assert_eq!(parse_page_count(" 12 pages"), 12);
        assert_eq!(parse_page_count("-3"), -3);
        assert_eq!(parse_page_count("abc"), 0);
        assert_eq!(parse_page_count(""), 0);
    }

    #[test]
    fn test_huge_page_count_saturates_instead_of_failing_validation() {
        let huge = parse_page_count("99999999999999999999");
        assert_eq!(huge, i64::MAX);
        assert_eq!(parse_page_count("-99999999999999999999"), i64::MIN);

        let request = SitemapRequest::from_form("bakery", huge, "").unwrap();
        assert_eq!(request.page, u32::MAX);
        assert_eq!(
            SitemapRequest::from_form("bakery", 5_000_000_000, "").unwrap().page,
            u32::MAX
        );
        assert!(matches!(
            SitemapRequest::from_form("bakery", i64::MIN, ""),
            Err(ValidationError::InvalidPageCount)
        ));
    }

    #[test]
    fn test_generated_sitemap_deserialization() {
        let generated: GeneratedSitemap = serde_json::from_value(json!({
            "businessName": "Bakery",
            "businessDescription": "Fresh bread daily",
            "pages": [
                {"pageTitle": "Home", "sections": [
                    {"sectionTitle": "Hero", "sectionDescription": "Warm welcome"}
                ]},
                {"pageTitle": "Menu"}
            ]
        }))
        .unwrap();

        assert_eq!(generated.business_name.as_deref(), Some("Bakery"));
        assert_eq!(generated.pages.len(), 2);
        assert_eq!(generated.pages[0].sections[0].section_title, "Hero");
        assert!(generated.pages[1].sections.is_empty());
    }

    #[test]
    fn test_generated_sitemap_requires_pages() {
        let result: Result<GeneratedSitemap, _> =
            serde_json::from_value(json!({"businessName": "Bakery"}));

        assert!(result.is_err());
    }

    #[test]
    fn test_website_request_from_root_page() {
        let mut sitemap = Sitemap::default();
        sitemap.business_name = "Bakery".into();
        sitemap.business_description = "Bread".into();
        sitemap
            .node_mut(ROOT_PAGE_ID)
            .unwrap()
            .data
            .sections
            .push(Section::new("Hero", "Welcome in"));

        let request = WebsiteRequest::from_sitemap(Some(&sitemap)).unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "businessName": "Bakery",
                "businessDescription": "Bread",
                "imageUrl": null,
                "pageTitle": "Home",
                "sections": [{"sectionTitle": "Hero", "sectionDescription": "Welcome in"}]
            })
        );
    }

    #[test]
    fn test_website_request_without_sitemap() {
        let mut deleted = Sitemap::default();
        deleted.clear();

        assert_eq!(
            WebsiteRequest::from_sitemap(None),
            Err(ValidationError::NoSitemapData)
        );
        assert_eq!(
            WebsiteRequest::from_sitemap(Some(&deleted)),
            Err(ValidationError::NoSitemapData)
        );
    }

    #[test]
    fn test_website_request_without_root() {
        let mut sitemap = Sitemap::default();
        sitemap.nodes[0].id = "node-other".into();

        assert_eq!(
            WebsiteRequest::from_sitemap(Some(&sitemap)),
            Err(ValidationError::RootNotFound)
        );
    }

    #[test]
    fn test_generated_website_accepts_numeric_id() {
        let site: GeneratedWebsite =
            serde_json::from_value(json!({"code": "<html></html>", "sitemap_id": 42})).unwrap();

        assert_eq!(site.sitemap_id.as_deref(), Some("42"));
        assert_eq!(site.html(), Some("<html></html>"));
    }

    #[test]
    fn test_generated_website_without_code() {
        let site: GeneratedWebsite = serde_json::from_value(json!({"code": ""})).unwrap();

        assert_eq!(site.html(), None);
        assert_eq!(site.sitemap_id, None);
    }

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(
            error_detail(r#"{"detail": "Quota exceeded"}"#).as_deref(),
            Some("Quota exceeded")
        );
        assert_eq!(
            error_detail(r#"{"detail": [{"loc": ["body", "page"]}]}"#).as_deref(),
            Some(r#"[{"loc":["body","page"]}]"#)
        );
        assert_eq!(error_detail(r#"{"message": "nope"}"#), None);
        assert_eq!(error_detail("Internal Server Error"), None);
    }

    #[test]
    fn test_package_website_contains_index_html() {
        let html = "<!doctype html><h1>Bakery</h1>";

        let bytes = package_website(html).unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);
        let mut file = archive.by_name("index.html").unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, html);
    }

    #[test]
    fn test_client_uses_configured_endpoints() {
        let client = BackendClient::new(BackendConfig::with_base_url("http://backend:9000/")).unwrap();

        assert_eq!(client.config().base_url, "http://backend:9000");
    }
}
