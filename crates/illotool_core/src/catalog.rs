use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ToolConfig;
use crate::error::{Error, Result};

/// One remote illustration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub image_url: String,
    /// Derived locally after the whole catalog is collected; empty until then.
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    pub has_more: bool,
    pub next_page: Option<u64>,
}

/// Read side of the remote catalog.
pub trait CatalogApi {
    fn fetch_page(&mut self, page_index: u64) -> Result<CatalogPage>;
    fn fetch_asset(&mut self, url: &str) -> Result<Vec<u8>>;
    fn request_count(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct HttpCatalogConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl HttpCatalogConfig {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            api_url: config.api_url(),
            user_agent: config.user_agent(),
            timeout_ms: config.timeout_ms(),
        }
    }
}

pub struct HttpCatalogClient {
    client: Client,
    config: HttpCatalogConfig,
    request_count: usize,
}

impl HttpCatalogClient {
    pub fn new(config: HttpCatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|source| Error::Transport {
                url: config.api_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            config,
            request_count: 0,
        })
    }

    fn get(&mut self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        self.request_count += 1;
        debug!(url, ?query, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl CatalogApi for HttpCatalogClient {
    fn fetch_page(&mut self, page_index: u64) -> Result<CatalogPage> {
        let api_url = self.config.api_url.clone();
        let response = self.get(&api_url, &[("page", page_index.to_string())])?;
        let body = response.bytes().map_err(|source| Error::Transport {
            url: api_url.clone(),
            source,
        })?;
        decode_page(&api_url, &body)
    }

    fn fetch_asset(&mut self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url, &[])?;
        let body = response.bytes().map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }

    fn request_count(&self) -> usize {
        self.request_count
    }
}

/// Decode one page body. `url` is only used to label errors.
pub fn decode_page(url: &str, body: &[u8]) -> Result<CatalogPage> {
    let parsed: PageResponse = serde_json::from_slice(body).map_err(|source| Error::Decode {
        url: url.to_string(),
        source,
    })?;

    Ok(CatalogPage {
        entries: parsed
            .illos
            .into_iter()
            .map(|item| CatalogEntry {
                title: item.title,
                image_url: item.image,
                id: String::new(),
            })
            .collect(),
        has_more: parsed.has_more,
        next_page: parsed.next_page,
    })
}

/// Fetch pages 0, 1, 2, ... until one reports no further pages.
///
/// There is no page cap: an API that always answers `hasMore: true` keeps
/// this loop running.
pub fn collect_catalog<A: CatalogApi>(api: &mut A) -> Result<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    let mut page_index = 0u64;

    loop {
        info!(page = page_index, "downloading catalog page");
        let page = api.fetch_page(page_index)?;
        entries.extend(page.entries);
        if !page.has_more {
            break;
        }
        page_index += 1;
    }

    info!(count = entries.len(), "collected catalog entries");
    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    illos: Vec<IllustrationItem>,
    #[serde(default, rename = "hasMore")]
    has_more: bool,
    #[serde(default, rename = "nextPage")]
    next_page: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct IllustrationItem {
    title: String,
    image: String,
}
