//! Module hooks.
//!
//! Hook names and call shapes follow the host bundler: `resolve_id` claims
//! ids, `load` synthesizes module source, `transform` rewrites files that
//! opted in via their name, and `handle_hot_update` decides whether a file
//! change needs a full dev-server restart.

use crate::options::{default_make, PluginOptions};
use crate::state::{self, PaginationDetail, PluginState, SharedState};
use crate::PluginError;
use confee_schema::{fetch_schema, FetchOptions, Pagination, SchemaComputed};
use confee_tpl::{extract, render};
use regex::Regex;
use serde_json::json;
use std::path::Path;
use tracing::debug;

/// Source of the dev-time runtime shim module. The real symbols only exist
/// while templates are being authored; production code never calls them.
const RUNTIME_SHIM: &str = "export const confee = {}";

pub struct ConfeePlugin {
    options: PluginOptions,
    state: SharedState,
    /// Matches the shim import in transformed files, e.g.
    /// `import { confee } from '@confee/runtime'`.
    runtime_import: Regex,
}

impl ConfeePlugin {
    pub fn new(options: PluginOptions) -> Result<Self, PluginError> {
        let runtime_import = Regex::new(&format!(
            r#"import\s+\{{[^}}]*confee[^}}]*\}}\s+from\s+['"]{}['"]"#,
            regex::escape(&options.runtime_module)
        ))?;
        Ok(ConfeePlugin {
            options,
            state: state::shared(PluginState::default()),
            runtime_import,
        })
    }

    /// Shared handle to the adapter state, for the route channel and for
    /// embedder diagnostics.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Fetch the schema and join every configured template to its
    /// paginations. Must run before any module hook fires.
    ///
    /// A template naming an unknown pagination option aborts setup; a
    /// pagination whose main page is missing is skipped.
    pub async fn setup(&self) -> Result<(), PluginError> {
        let mut fetch = FetchOptions::new(&self.options.url, &self.options.project_id);
        fetch.cache = self.options.cache;
        let mut schema = fetch_schema(&fetch).await?;
        schema.computed = SchemaComputed::default();

        let mut templates = self.options.templates.clone();
        let mut details = Vec::new();
        let mut mods = Vec::new();

        for template in &mut templates {
            let option = schema
                .pagination_option_by_name(&template.pagination_option_name)?
                .clone();

            if template.content.is_none() {
                if let Some(pathname) = &template.pathname {
                    template.content = Some(std::fs::read_to_string(pathname)?);
                }
            }

            let paginations: Vec<Pagination> = schema
                .paginations_for_option(&option.id)
                .into_iter()
                .cloned()
                .collect();

            for pagination in paginations {
                let main_page = match schema.main_page_by_code(&pagination.group_code) {
                    Some(page) => page.clone(),
                    None => continue,
                };

                let make = match &self.options.make {
                    Some(make) => make(&main_page, &pagination),
                    None => default_make(&main_page, &pagination),
                };
                mods.push(format!("{}.{}", make.mod_name, self.options.mod_suffix));

                let pagination_fields = schema
                    .fields_for_pagination(&pagination)
                    .into_iter()
                    .cloned()
                    .collect();

                details.push(PaginationDetail {
                    pagination_of_main_page_codes: make.codes,
                    mod_name_of_main_page: make.mod_name,
                    template: template.clone(),
                    main_page,
                    pagination,
                    pagination_fields,
                    pagination_option: option.clone(),
                });
            }
        }

        if let Some(computed) = &self.options.computed {
            computed(&mut schema, &details);
        }

        let mut locked = state::write(&self.state);
        locked.schema = schema;
        locked.details = details;
        locked.mods = mods;
        Ok(())
    }

    /// Claim configured prefixes, generated module names and the runtime
    /// shim; everything else falls through to the host resolver.
    pub fn resolve_id(&self, id: &str) -> Option<String> {
        for (prefix, _) in &self.options.ids_resolve {
            if id.starts_with(prefix) {
                return Some(id.to_string());
            }
        }
        if id.starts_with(&self.options.runtime_module) {
            return Some(id.to_string());
        }
        if state::read(&self.state).mods.iter().any(|m| m == id) {
            return Some(id.to_string());
        }
        None
    }

    /// Synthesize module source for a claimed id. `Ok(None)` passes the id
    /// through to the host loader.
    pub fn load(&self, id: &str) -> Result<Option<String>, PluginError> {
        for (prefix, resolver) in &self.options.ids_resolve {
            if !id.starts_with(prefix) {
                continue;
            }
            let resolved = resolver(id).unwrap_or_default();
            let name = match resolved.pagination_option_name {
                Some(name) => name,
                None => return Ok(stub_module(id)),
            };
            for template in &self.options.templates {
                if template.pagination_option_name != name {
                    continue;
                }
                let content = match (&template.content, &template.pathname) {
                    (Some(content), _) => content.clone(),
                    // re-read so edits show up without a full restart
                    (None, Some(pathname)) => std::fs::read_to_string(pathname)?,
                    (None, None) => {
                        return Err(PluginError::MissingTemplateContent {
                            pagination_option_name: name,
                        })
                    }
                };
                return Ok(Some(self.render_source(&content, id, true)?));
            }
            return Ok(None);
        }

        if id.starts_with(&self.options.runtime_module) {
            return Ok(Some(RUNTIME_SHIM.to_string()));
        }
        if state::read(&self.state).mods.iter().any(|m| m == id) {
            return Ok(stub_module(id));
        }
        Ok(None)
    }

    /// Rewrite files that opt in by name: the segment before the final
    /// extension must end with `confee` (`route.confee.ts`,
    /// `page.confee.vue`). Other files pass through untouched.
    pub fn transform(&self, code: &str, id: &str) -> Result<Option<String>, PluginError> {
        let names: Vec<&str> = id.split('.').collect();
        let marked = names
            .len()
            .checked_sub(2)
            .and_then(|i| names.get(i))
            .map(|segment| segment.ends_with("confee"))
            .unwrap_or(false);
        if !marked {
            return Ok(None);
        }

        let code = self.runtime_import.replace(code, "");
        Ok(Some(self.render_source(&code, id, false)?))
    }

    /// A change to a configured template file invalidates every module
    /// rendered from it; request a full restart.
    pub fn handle_hot_update(&self, file: &Path) -> bool {
        for template in &self.options.templates {
            if template.pathname.as_deref() == Some(file) {
                debug!(file = %file.display(), "template hot update");
                return true;
            }
        }
        false
    }

    /// Extract and render one source text against the schema context.
    /// `with_global` adds the per-module dev data (`currentMod`,
    /// `currentUrl`, `hotModuleByRoute`) used by generated route modules.
    fn render_source(
        &self,
        source: &str,
        id: &str,
        with_global: bool,
    ) -> Result<String, PluginError> {
        let extraction = extract(source, id)?;

        let context = {
            let locked = state::read(&self.state);
            let confee_data = serde_json::to_value(&locked.schema)?;
            if with_global {
                json!({
                    "confeeData": confee_data,
                    "globalData": {
                        "currentMod": id,
                        "currentUrl": locked.current_route,
                        "hotModuleByRoute": locked.hot_modules,
                    },
                })
            } else {
                json!({ "confeeData": confee_data })
            }
        };

        Ok(render(&extraction, &context)?)
    }
}

/// Placeholder module for a pagination without a template. Unknown suffixes
/// get nothing and fall through.
fn stub_module(id: &str) -> Option<String> {
    if id.ends_with(".vue") {
        Some(format!(
            "<template>\n    {id}\n</template>\n<script lang=\"ts\" setup></script>\n<script lang=\"ts\">\nexport default {{\n  name: '{id}'\n}};\n</script>\n"
        ))
    } else if id.ends_with(".tsx") {
        Some(format!(
            "export default function () {{\n    return <div>{id}</div>\n}}"
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{IdResolver, ResolvedId, TemplateSource};
    use confee_schema::SchemaBundle;
    use rstest::rstest;
    use serde_json::json;

    fn sample_schema() -> SchemaBundle {
        serde_json::from_value(json!({
            "mainPages": [{ "id": "m1", "name": "Suppliers", "code": "sup-pliers" }],
            "paginationOptions": [{ "id": "o1", "name": "crud" }],
            "paginations": [{
                "id": "g1", "code": "index",
                "groupCode": "sup-pliers",
                "projectTableCode": "suppliers",
                "projectPaginationOptionId": "o1"
            }]
        }))
        .expect("sample schema")
    }

    fn resolver(option: Option<&str>) -> IdResolver {
        let option = option.map(String::from);
        Box::new(move |_id| {
            Some(ResolvedId {
                pagination_option_name: option.clone(),
            })
        })
    }

    fn plugin_with(options: PluginOptions, schema: SchemaBundle) -> ConfeePlugin {
        let plugin = ConfeePlugin::new(options).expect("plugin builds");
        {
            let state = plugin.state();
            let mut locked = state::write(&state);
            locked.schema = schema;
            locked.mods = vec!["sup-pliers-index.tsx".to_string()];
        }
        plugin
    }

    fn base_options() -> PluginOptions {
        PluginOptions::new("http://localhost/confee", "p1")
    }

    #[test]
    fn test_resolve_id_claims_prefixes_and_mods() {
        let mut options = base_options();
        options
            .ids_resolve
            .push(("virtual:pages/".to_string(), resolver(None)));
        let plugin = plugin_with(options, sample_schema());

        assert!(plugin.resolve_id("virtual:pages/anything").is_some());
        assert!(plugin.resolve_id("sup-pliers-index.tsx").is_some());
        assert!(plugin.resolve_id("@confee/runtime").is_some());
        assert!(plugin.resolve_id("./src/main.ts").is_none());
    }

    #[test]
    fn test_load_renders_matched_template() {
        let mut options = base_options();
        options
            .ids_resolve
            .push(("virtual:pages/".to_string(), resolver(Some("crud"))));
        options.templates.push(TemplateSource {
            pagination_option_name: "crud".to_string(),
            pathname: None,
            content: Some(
                "confee.tpl(`\n// mod: <%- globalData.currentMod %>\ntpl`)".to_string(),
            ),
        });
        let plugin = plugin_with(options, sample_schema());

        let out = plugin
            .load("virtual:pages/sup-pliers-index.tsx")
            .expect("loads")
            .expect("renders");
        assert_eq!(out, "// mod: virtual:pages/sup-pliers-index.tsx");
    }

    #[test]
    fn test_load_without_option_gets_a_stub() {
        let mut options = base_options();
        options
            .ids_resolve
            .push(("virtual:pages/".to_string(), resolver(None)));
        let plugin = plugin_with(options, sample_schema());

        let out = plugin
            .load("virtual:pages/thing.tsx")
            .expect("loads")
            .expect("stubbed");
        assert!(out.contains("virtual:pages/thing.tsx"));
        assert!(out.starts_with("export default function"));
    }

    #[test]
    fn test_load_runtime_shim() {
        let plugin = plugin_with(base_options(), sample_schema());
        let out = plugin.load("@confee/runtime").expect("loads").expect("shim");
        assert_eq!(out, "export const confee = {}");
    }

    #[test]
    fn test_load_generated_mod_gets_vue_stub_for_vue_suffix() {
        let mut options = base_options();
        options.mod_suffix = "vue".to_string();
        let plugin = plugin_with(options, sample_schema());
        {
            let state = plugin.state();
            state::write(&state).mods = vec!["sup-pliers-index.vue".to_string()];
        }

        let out = plugin
            .load("sup-pliers-index.vue")
            .expect("loads")
            .expect("stubbed");
        assert!(out.starts_with("<template>"));
    }

    #[rstest]
    #[case("route.confee.ts", true)]
    #[case("page.confee.vue", true)]
    #[case("page.confee.tsx", true)]
    #[case("myconfee.ts", true)]
    #[case("route.confee2.ts", false)]
    #[case("plain.ts", false)]
    #[case("noext", false)]
    fn test_transform_gating(#[case] id: &str, #[case] fires: bool) {
        let plugin = plugin_with(base_options(), sample_schema());
        let out = plugin.transform("const a = 1;\n", id).expect("transforms");
        assert_eq!(out.is_some(), fires);
    }

    #[test]
    fn test_transform_strips_runtime_import_and_renders() {
        let plugin = plugin_with(base_options(), sample_schema());
        let code = concat!(
            "import { confee } from '@confee/runtime'\n",
            "confee.tpl(`\n",
            "export const page = '<%- confeeData.mainPages[0].code %>';\n",
            "tpl`)\n",
        );
        let out = plugin
            .transform(code, "route.confee.ts")
            .expect("transforms")
            .expect("fires");
        assert!(!out.contains("@confee/runtime"));
        assert!(out.contains("export const page = 'sup-pliers';"));
    }

    #[test]
    fn test_hot_update_only_for_configured_templates() {
        let mut options = base_options();
        options.templates.push(TemplateSource {
            pagination_option_name: "crud".to_string(),
            pathname: Some("/work/tpl/crud.tsx".into()),
            content: None,
        });
        let plugin = plugin_with(options, sample_schema());

        assert!(plugin.handle_hot_update(Path::new("/work/tpl/crud.tsx")));
        assert!(!plugin.handle_hot_update(Path::new("/work/src/main.ts")));
    }
}
