use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::SeedConfig;

/// API-maximum page size for `list=categorymembers`.
pub const PAGE_LIMIT: u32 = 500;

pub const NS_ARTICLE: i32 = 0;
pub const NS_TALK: i32 = 1;
pub const NS_SUBCATEGORY: i32 = 14;

/// One entry of a category membership page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMember {
    pub title: String,
    pub ns: i32,
}

/// One page of category members plus the cursor for the next page of the
/// same category, if any. The token is opaque and must be passed back
/// verbatim; it is never valid for a different category.
#[derive(Debug, Clone, Default)]
pub struct MemberPage {
    pub members: Vec<CategoryMember>,
    pub continuation: Option<String>,
}

/// Seam between the traversal and the network. The production
/// implementation is [`CategoryMemberClient`]; tests substitute a stub.
pub trait CategoryMemberSource {
    /// Fetch a single page of members for `category`, resuming from
    /// `continuation` when present.
    fn fetch_page(&mut self, category: &str, continuation: Option<&str>) -> Result<MemberPage>;

    fn request_count(&self) -> usize;
}

pub struct CategoryMemberClient {
    client: Client,
    api_url: Url,
    user_agent: String,
    request_count: usize,
}

impl CategoryMemberClient {
    pub fn new(config: &SeedConfig) -> Result<Self> {
        let api_url = config.api_url();
        let api_url = Url::parse(&api_url)
            .with_context(|| format!("invalid MediaWiki API URL: {api_url}"))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms()))
            .build()
            .context("failed to build MediaWiki HTTP client")?;

        Ok(Self {
            client,
            api_url,
            user_agent: config.user_agent(),
            request_count: 0,
        })
    }

    fn request_json_get(&mut self, params: &[(&str, String)]) -> Result<Value> {
        let mut pairs = Vec::with_capacity(params.len() + 2);
        pairs.push(("format".to_string(), "json".to_string()));
        pairs.push(("formatversion".to_string(), "2".to_string()));
        for (key, value) in params {
            if !value.is_empty() {
                pairs.push(((*key).to_string(), value.clone()));
            }
        }

        self.request_count += 1;
        let response = self
            .client
            .get(self.api_url.clone())
            .header("User-Agent", self.user_agent.clone())
            .query(&pairs)
            .send()
            .context("failed to call MediaWiki API")?;

        let status = response.status();
        if !status.is_success() {
            bail!("MediaWiki API request failed with HTTP {status}");
        }

        let payload: Value = response
            .json()
            .context("failed to decode MediaWiki API JSON response")?;
        if let Some(error) = payload.get("error") {
            let code = error
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            let info = error
                .get("info")
                .and_then(Value::as_str)
                .unwrap_or("unknown info");
            bail!("MediaWiki API error [{code}]: {info}");
        }
        Ok(payload)
    }
}

impl CategoryMemberSource for CategoryMemberClient {
    fn fetch_page(&mut self, category: &str, continuation: Option<&str>) -> Result<MemberPage> {
        let mut params = vec![
            ("action", "query".to_string()),
            ("list", "categorymembers".to_string()),
            ("cmtitle", category.to_string()),
            ("cmlimit", PAGE_LIMIT.to_string()),
            ("cmtype", "page|subcat".to_string()),
        ];
        if let Some(token) = continuation {
            params.push(("cmcontinue", token.to_string()));
        }

        let response = self.request_json_get(&params)?;
        let parsed: QueryResponse = serde_json::from_value(response)
            .context("failed to decode categorymembers API response")?;
        Ok(page_from_response(parsed))
    }

    fn request_count(&self) -> usize {
        self.request_count
    }
}

fn page_from_response(parsed: QueryResponse) -> MemberPage {
    MemberPage {
        members: parsed
            .query
            .categorymembers
            .into_iter()
            .map(|item| CategoryMember {
                title: item.title,
                ns: item.ns,
            })
            .collect(),
        continuation: parsed.continuation.and_then(|cont| cont.cmcontinue),
    }
}

#[derive(Debug, Deserialize, Default)]
struct QueryResponse {
    #[serde(default)]
    query: QueryPayload,
    #[serde(default, rename = "continue")]
    continuation: Option<ContinuationPayload>,
}

#[derive(Debug, Deserialize, Default)]
struct QueryPayload {
    #[serde(default)]
    categorymembers: Vec<MemberQueryItem>,
}

#[derive(Debug, Deserialize, Default)]
struct ContinuationPayload {
    cmcontinue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MemberQueryItem {
    title: String,
    ns: i32,
}
