//! Adapter configuration.
//!
//! Everything the embedder decides lives here: which template file serves
//! which pagination option, which import-path prefixes the adapter
//! intercepts, how route/module metadata is derived, and the dev channel
//! address.

use confee_schema::{MainPage, Pagination, SchemaBundle};
use std::path::PathBuf;

/// One template file and the pagination option it renders.
#[derive(Debug, Clone, Default)]
pub struct TemplateSource {
    pub pagination_option_name: String,
    /// Read at setup (and re-read on demand) when `content` is absent.
    pub pathname: Option<PathBuf>,
    pub content: Option<String>,
}

/// Route/module metadata derived from a main page / pagination pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeResult {
    pub url: String,
    /// Module stem; the configured suffix is appended to form the module
    /// name.
    pub mod_name: String,
    pub codes: Vec<String>,
}

/// What an id resolver reports back for an intercepted id.
#[derive(Debug, Clone, Default)]
pub struct ResolvedId {
    /// When set, the id loads the named option's rendered template;
    /// otherwise it gets a stub module.
    pub pagination_option_name: Option<String>,
}

pub type MakeFn = Box<dyn Fn(&MainPage, &Pagination) -> MakeResult + Send + Sync>;
pub type ComputedFn = Box<dyn Fn(&mut SchemaBundle, &[crate::state::PaginationDetail]) + Send + Sync>;
pub type IdResolver = Box<dyn Fn(&str) -> Option<ResolvedId> + Send + Sync>;

/// Dev route channel address. Off unless `open` is set.
#[derive(Debug, Clone)]
pub struct DevServerOptions {
    pub open: bool,
    pub host: String,
    pub port: u16,
}

impl Default for DevServerOptions {
    fn default() -> Self {
        DevServerOptions {
            open: false,
            host: "localhost".to_string(),
            port: 3001,
        }
    }
}

pub struct PluginOptions {
    /// Persist the fetched schema under `.confee/`.
    pub cache: bool,
    /// Schema service endpoint.
    pub url: String,
    pub project_id: String,
    /// Suffix appended to generated module names, `tsx` by default.
    pub mod_suffix: String,
    pub templates: Vec<TemplateSource>,
    /// Overrides [`default_make`] when set.
    pub make: Option<MakeFn>,
    /// Runs once after setup with the full detail list; fills
    /// `computed.hotModuleByRoute`.
    pub computed: Option<ComputedFn>,
    pub dev_server: DevServerOptions,
    /// Import-path prefix → resolver for intercepted ids.
    pub ids_resolve: Vec<(String, IdResolver)>,
    /// Module specifier of the dev-time runtime shim, whose import is
    /// stripped from transformed files.
    pub runtime_module: String,
}

impl PluginOptions {
    pub fn new(url: impl Into<String>, project_id: impl Into<String>) -> Self {
        PluginOptions {
            cache: false,
            url: url.into(),
            project_id: project_id.into(),
            mod_suffix: "tsx".to_string(),
            templates: Vec::new(),
            make: None,
            computed: None,
            dev_server: DevServerOptions::default(),
            ids_resolve: Vec::new(),
            runtime_module: "@confee/runtime".to_string(),
        }
    }
}

impl std::fmt::Debug for PluginOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginOptions")
            .field("cache", &self.cache)
            .field("url", &self.url)
            .field("project_id", &self.project_id)
            .field("mod_suffix", &self.mod_suffix)
            .field("templates", &self.templates)
            .field("dev_server", &self.dev_server)
            .field("runtime_module", &self.runtime_module)
            .finish_non_exhaustive()
    }
}

/// Default route/module derivation: the url drops the first `-` of each
/// code, the module stem joins the two codes with one.
pub fn default_make(main_page: &MainPage, pagination: &Pagination) -> MakeResult {
    MakeResult {
        url: format!(
            "{}/{}",
            main_page.code.replacen('-', "", 1),
            pagination.code.replacen('-', "", 1)
        ),
        mod_name: format!("{}-{}", main_page.code, pagination.code),
        codes: vec![main_page.code.clone(), pagination.code.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn main_page(code: &str) -> MainPage {
        serde_json::from_value(json!({ "id": "m", "name": "n", "code": code }))
            .expect("main page")
    }

    fn pagination(code: &str) -> Pagination {
        serde_json::from_value(json!({ "id": "g", "code": code })).expect("pagination")
    }

    #[test]
    fn test_default_make_drops_one_dash_per_code() {
        let result = default_make(&main_page("sup-pliers"), &pagination("in-dex"));
        assert_eq!(result.url, "suppliers/index");
        assert_eq!(result.mod_name, "sup-pliers-in-dex");
        assert_eq!(result.codes, vec!["sup-pliers", "in-dex"]);
    }

    #[test]
    fn test_default_make_only_drops_the_first_dash() {
        let result = default_make(&main_page("a-b-c"), &pagination("x"));
        assert_eq!(result.url, "ab-c/x");
    }

    #[test]
    fn test_dev_server_defaults() {
        let dev = DevServerOptions::default();
        assert!(!dev.open);
        assert_eq!((dev.host.as_str(), dev.port), ("localhost", 3001));
    }
}
