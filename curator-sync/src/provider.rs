//! Release providers: enumerate an origin's releases and download assets.
//!
//! Providers return releases in whatever order the origin lists them; window
//! selection and ordering happen in the core.
//!
//! ## Mirror layout
//!
//! ```text
//! <root>/
//!   <org>/<repo>/<tag>/<asset>...          (github origins)
//!   <bucket>/<prefix...>/<tag>/<asset>...  (s3 origins)
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use curator_core::{Asset, Origin, Release};

use crate::error::{http_err, io_err, SyncError};

/// Source of releases for the pipeline.
pub trait ReleaseProvider {
    /// Every release the origin currently lists, in any order.
    fn releases(&self, origin: &Origin) -> Result<Vec<Release>, SyncError>;

    /// Raw bytes of one asset.
    fn download(&self, asset: &Asset) -> Result<Vec<u8>, SyncError>;
}

// ---------------------------------------------------------------------------
// Local mirror
// ---------------------------------------------------------------------------

/// Serves releases from a directory tree laid out like the upstream origins.
#[derive(Debug, Clone)]
pub struct MirrorProvider {
    root: PathBuf,
}

impl MirrorProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one subdirectory per release tag of `origin`.
    pub fn origin_dir(&self, origin: &Origin) -> PathBuf {
        match origin {
            Origin::GitHub { org, repo } => self.root.join(org).join(repo),
            Origin::S3 { bucket, prefix } => prefix
                .split('/')
                .filter(|segment| !segment.is_empty())
                .fold(self.root.join(bucket), |dir, segment| dir.join(segment)),
        }
    }
}

impl ReleaseProvider for MirrorProvider {
    fn releases(&self, origin: &Origin) -> Result<Vec<Release>, SyncError> {
        let dir = self.origin_dir(origin);
        if !dir.is_dir() {
            return Err(SyncError::OriginNotFound {
                origin: origin.key(),
                path: dir,
            });
        }

        let (org, repo) = origin.owner_and_name();
        let mut releases = Vec::new();
        for tag_dir in sorted_entries(&dir)? {
            if !tag_dir.is_dir() {
                continue;
            }
            let Some(tag_name) = tag_dir.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            let modified = std::fs::metadata(&tag_dir)
                .and_then(|m| m.modified())
                .map_err(|e| io_err(&tag_dir, e))?;

            let assets = sorted_entries(&tag_dir)?
                .into_iter()
                .filter(|path| path.is_file())
                .filter_map(|path| {
                    let name = path.file_name()?.to_string_lossy().into_owned();
                    Some(Asset::new(name, file_url(&path)))
                })
                .collect();

            releases.push(Release {
                org: org.to_owned(),
                repo: repo.to_owned(),
                tag_name,
                assets,
                created: DateTime::<Utc>::from(modified),
            });
        }
        tracing::debug!("{}: {} release(s) in mirror", origin, releases.len());
        Ok(releases)
    }

    fn download(&self, asset: &Asset) -> Result<Vec<u8>, SyncError> {
        match file_path(&asset.url) {
            Some(path) => std::fs::read(&path).map_err(|e| io_err(path, e)),
            None => Err(SyncError::UnsupportedUrl {
                url: asset.url.clone(),
            }),
        }
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn file_path(url: &str) -> Option<PathBuf> {
    url.strip_prefix("file://").map(PathBuf::from)
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// Public GitHub REST endpoint.
pub const GITHUB_API: &str = "https://api.github.com";

const PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("curator/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: String,
    browser_download_url: String,
}

/// Lists releases through the GitHub REST API. Object-storage origins are not
/// supported; use a mirror for those.
pub struct GitHubProvider {
    agent: ureq::Agent,
    api_base: String,
    token: Option<String>,
}

impl GitHubProvider {
    /// Provider against the public API, authenticated with `GITHUB_TOKEN` when set.
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(60))
                .build(),
            api_base: GITHUB_API.to_owned(),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    /// Point at another API root (GitHub Enterprise).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    fn get(&self, url: &str) -> Result<ureq::Response, SyncError> {
        let mut request = self.agent.get(url).set("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        request.call().map_err(|e| http_err(url, e))
    }
}

impl Default for GitHubProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseProvider for GitHubProvider {
    fn releases(&self, origin: &Origin) -> Result<Vec<Release>, SyncError> {
        let Origin::GitHub { org, repo } = origin else {
            return Err(SyncError::UnsupportedOrigin {
                origin: origin.key(),
            });
        };

        let mut releases = Vec::new();
        for page in 1.. {
            let url = format!(
                "{}/repos/{org}/{repo}/releases?per_page={PER_PAGE}&page={page}",
                self.api_base
            );
            let body = self
                .get(&url)?
                .into_string()
                .map_err(|e| http_err(&url, e))?;
            let (batch, listed) = releases_from_json(org, repo, &body)?;
            releases.extend(batch);
            if listed < PER_PAGE {
                break;
            }
        }
        tracing::debug!("{}: {} release(s) listed", origin, releases.len());
        Ok(releases)
    }

    fn download(&self, asset: &Asset) -> Result<Vec<u8>, SyncError> {
        if let Some(path) = file_path(&asset.url) {
            return std::fs::read(&path).map_err(|e| io_err(path, e));
        }
        if !(asset.url.starts_with("https://") || asset.url.starts_with("http://")) {
            return Err(SyncError::UnsupportedUrl {
                url: asset.url.clone(),
            });
        }
        let mut body = Vec::new();
        self.get(&asset.url)?
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| http_err(&asset.url, e))?;
        Ok(body)
    }
}

/// Decode one page of the releases listing. Drafts are skipped. Also returns
/// how many entries the page held, for pagination.
pub(crate) fn releases_from_json(
    org: &str,
    repo: &str,
    body: &str,
) -> Result<(Vec<Release>, usize), SyncError> {
    let page: Vec<GitHubRelease> = serde_json::from_str(body)?;
    let listed = page.len();
    let releases = page
        .into_iter()
        .filter(|r| !r.draft)
        .map(|r| Release {
            org: org.to_owned(),
            repo: repo.to_owned(),
            tag_name: r.tag_name,
            assets: r
                .assets
                .into_iter()
                .map(|a| Asset::new(a.name, a.browser_download_url))
                .collect(),
            created: r.created_at,
        })
        .collect();
    Ok((releases, listed))
}
