//! Explicit adapter state.
//!
//! Everything the hooks share lives in one [`PluginState`] value behind a
//! lock, created by setup and dropped with the adapter. Hooks only ever
//! derive read-only context data from it per call.

use crate::options::TemplateSource;
use confee_schema::{MainPage, Pagination, PaginationField, PaginationOption, SchemaBundle};
use std::sync::{Arc, RwLock};

/// One pagination joined to everything templates need to know about it.
#[derive(Debug, Clone)]
pub struct PaginationDetail {
    /// `[main page code, pagination code]` as derived by the make hook.
    pub pagination_of_main_page_codes: Vec<String>,
    /// Module stem, e.g. `suppliers-index`.
    pub mod_name_of_main_page: String,
    pub template: TemplateSource,
    pub main_page: MainPage,
    pub pagination: Pagination,
    pub pagination_fields: Vec<PaginationField>,
    pub pagination_option: PaginationOption,
}

#[derive(Debug, Default)]
pub struct PluginState {
    pub schema: SchemaBundle,
    pub details: Vec<PaginationDetail>,
    /// Generated module names (stem + suffix), e.g. `suppliers-index.tsx`.
    pub mods: Vec<String>,
    pub current_route: String,
    /// Module names that must hot-reload for the current route.
    pub hot_modules: Vec<String>,
    /// The route channel starts at most once.
    pub channel_started: bool,
}

pub type SharedState = Arc<RwLock<PluginState>>;

pub fn shared(state: PluginState) -> SharedState {
    Arc::new(RwLock::new(state))
}

/// Read the state, recovering from a poisoned lock (a panicked hook never
/// leaves the state half-written; each field is replaced wholesale).
pub fn read(state: &SharedState) -> std::sync::RwLockReadGuard<'_, PluginState> {
    match state.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub fn write(state: &SharedState) -> std::sync::RwLockWriteGuard<'_, PluginState> {
    match state.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
