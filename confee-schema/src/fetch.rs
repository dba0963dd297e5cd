//! Remote fetch with an on-disk cache.
//!
//! The cache file is authoritative once written: a present
//! `.confee/config.json` short-circuits the network entirely, so a stale
//! schema is refreshed by deleting the file.

use crate::{SchemaBundle, SchemaError};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ACCESS_TOKEN_VAR: &str = "CONFEE_ACCESS_TOKEN";
pub const CACHE_DIR: &str = ".confee";
pub const CACHE_FILE: &str = "config.json";

/// Where and what to fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Schema service endpoint.
    pub url: String,
    pub project_id: String,
    /// Persist the fetched bundle to the cache file.
    pub cache: bool,
    /// Directory holding the cache file, `.confee` by default.
    pub cache_dir: PathBuf,
}

impl FetchOptions {
    pub fn new(url: impl Into<String>, project_id: impl Into<String>) -> Self {
        FetchOptions {
            url: url.into(),
            project_id: project_id.into(),
            cache: false,
            cache_dir: PathBuf::from(CACHE_DIR),
        }
    }

    pub fn cache_pathname(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }
}

/// Service response envelope.
#[derive(Debug, Deserialize)]
struct FetchResponse {
    success: bool,
    data: Option<SchemaBundle>,
}

/// Load the schema bundle, preferring the on-disk cache.
///
/// On a cache miss the service is called with a bearer token taken from the
/// `CONFEE_ACCESS_TOKEN` environment variable; an unset token is an error
/// before any request is made.
pub async fn fetch_schema(options: &FetchOptions) -> Result<SchemaBundle, SchemaError> {
    let cache_pathname = options.cache_pathname();
    if cache_pathname.exists() {
        info!(path = %cache_pathname.display(), "configuration cache hit");
        return load_cached(&cache_pathname);
    }

    let token =
        std::env::var(ACCESS_TOKEN_VAR).map_err(|_| SchemaError::MissingAccessToken)?;

    let response = reqwest::Client::new()
        .post(&options.url)
        .bearer_auth(token)
        .json(&json!({ "id": options.project_id }))
        .send()
        .await?
        .error_for_status()?
        .json::<FetchResponse>()
        .await?;

    let bundle = match response {
        FetchResponse {
            success: true,
            data: Some(bundle),
        } => bundle,
        _ => return Err(SchemaError::RejectedByServer),
    };

    if options.cache {
        std::fs::create_dir_all(&options.cache_dir)?;
        std::fs::write(&cache_pathname, serde_json::to_string(&bundle)?)?;
        info!(path = %cache_pathname.display(), "configuration cached");
    }

    Ok(bundle)
}

/// Read a previously cached bundle without touching the network.
pub fn load_cached(pathname: &Path) -> Result<SchemaBundle, SchemaError> {
    let text = std::fs::read_to_string(pathname)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_in(dir: &Path) -> FetchOptions {
        let mut options = FetchOptions::new("http://127.0.0.1:9/confee", "p1");
        options.cache_dir = dir.to_path_buf();
        options
    }

    #[tokio::test]
    async fn test_cache_hit_skips_the_network() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pathname = dir.path().join(CACHE_FILE);
        std::fs::write(&pathname, r#"{ "project": [{ "id": "p1", "name": "shop" }] }"#)
            .expect("seed cache");

        // The url is unroutable; a network attempt would fail loudly.
        let bundle = fetch_schema(&options_in(dir.path())).await.expect("cache hit");
        assert_eq!(bundle.project[0].name, "shop");
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_a_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CACHE_FILE), "not json").expect("seed cache");

        let err = fetch_schema(&options_in(dir.path())).await.unwrap_err();
        assert!(matches!(err, SchemaError::Decode(_)));
    }

    #[test]
    fn test_cache_pathname_joins_dir_and_file() {
        let options = options_in(Path::new("/tmp/x"));
        assert_eq!(options.cache_pathname(), PathBuf::from("/tmp/x/config.json"));
    }
}
