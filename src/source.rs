//! Sources of raw report trees.
//!
//! A source is named by a single string: `demo` for the built-in report, an `http://` or
//! `https://` URL for a data endpoint, or otherwise the path of a JSON file.

use crate::model::{demo, RawNode};
use crate::{utils, Result};
use anyhow::{bail, Context};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;
use url::Url;

const DEMO: &str = "demo";

/// Where the raw tree is loaded from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Source {
    /// The built-in "Annual Report".
    Demo,
    /// A JSON document on disk.
    File(PathBuf),
    /// A JSON document served over HTTP, e.g. the `/api/data` endpoint of `report serve`.
    Url(Url),
}

impl FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("The report source cannot be empty")
        }
        if s == DEMO {
            return Ok(Source::Demo);
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s).with_context(|| format!("Invalid report URL '{s}'"))?;
            return Ok(Source::Url(url));
        }
        if let Some((scheme, _)) = s.split_once("://") {
            bail!("Unsupported report source scheme '{scheme}', expected http or https")
        }
        Ok(Source::File(PathBuf::from(s)))
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Demo => f.write_str(DEMO),
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{url}"),
        }
    }
}

impl Source {
    /// Returns a loader for this source.
    pub fn loader(&self) -> Box<dyn RawSource + Send + Sync> {
        match self {
            Source::Demo => Box::new(DemoSource),
            Source::File(path) => Box::new(FileSource { path: path.clone() }),
            Source::Url(url) => Box::new(HttpSource {
                url: url.clone(),
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Loads the raw tree from this source.
    pub async fn load(&self) -> Result<RawNode> {
        debug!("Loading report from {self}");
        self.loader().load().await
    }
}

/// Something that can produce one complete raw tree.
#[async_trait::async_trait]
pub trait RawSource {
    async fn load(&self) -> Result<RawNode>;
}

struct DemoSource;

#[async_trait::async_trait]
impl RawSource for DemoSource {
    async fn load(&self) -> Result<RawNode> {
        Ok(demo::annual_report())
    }
}

struct FileSource {
    path: PathBuf,
}

#[async_trait::async_trait]
impl RawSource for FileSource {
    async fn load(&self) -> Result<RawNode> {
        let content = utils::read(&self.path).await?;
        RawNode::from_json(&content)
            .with_context(|| format!("Failed to parse the report in {}", self.path.display()))
    }
}

struct HttpSource {
    url: Url,
    client: reqwest::Client,
}

#[async_trait::async_trait]
impl RawSource for HttpSource {
    async fn load(&self) -> Result<RawNode> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to request the report from {}", self.url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!(
                "Request for the report at {} failed with status {}: {}",
                self.url,
                status,
                body
            );
        }

        let body = response
            .text()
            .await
            .context("Failed to read the report response body")?;
        RawNode::from_json(&body)
            .with_context(|| format!("Failed to parse the report from {}", self.url))
    }
}
