//! # confee-plugin
//!
//! Bundler hook adapter over the confee core. The embedder constructs a
//! [`ConfeePlugin`] from [`PluginOptions`], runs [`ConfeePlugin::setup`]
//! once at config time, and forwards its module hooks
//! (`resolve_id` / `load` / `transform` / `handle_hot_update`) to the
//! adapter. During development a WebSocket [`channel`](crate::channel)
//! reports the active route and drives selective hot reloading.
//!
//! All shared state is explicit: setup fills a [`PluginState`] behind a
//! lock, and every hook derives read-only context data from it per call.

pub mod channel;
pub mod hooks;
pub mod options;
pub mod state;

pub use channel::RouteChannel;
pub use hooks::ConfeePlugin;
pub use options::{
    default_make, DevServerOptions, MakeResult, PluginOptions, ResolvedId, TemplateSource,
};
pub use state::{PaginationDetail, PluginState};

use confee_schema::SchemaError;
use confee_tpl::{RenderError, TranspileError};

/// Failure inside the adapter.
#[derive(Debug)]
pub enum PluginError {
    Schema(SchemaError),
    Render(RenderError),
    Extract(TranspileError),
    Encode(serde_json::Error),
    Io(std::io::Error),
    Pattern(regex::Error),
    /// A template names a pagination option but carries neither inline
    /// content nor a readable pathname.
    MissingTemplateContent { pagination_option_name: String },
    /// The route channel was already started by an earlier call.
    ChannelAlreadyStarted,
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginError::Schema(err) => write!(f, "{}", err),
            PluginError::Render(err) => write!(f, "template render failed: {}", err),
            PluginError::Extract(err) => write!(f, "template extraction failed: {}", err),
            PluginError::Encode(err) => write!(f, "schema context encoding failed: {}", err),
            PluginError::Io(err) => write!(f, "{}", err),
            PluginError::Pattern(err) => write!(f, "invalid runtime module pattern: {}", err),
            PluginError::MissingTemplateContent {
                pagination_option_name,
            } => write!(
                f,
                "template for pagination option '{}' has no content and no pathname",
                pagination_option_name
            ),
            PluginError::ChannelAlreadyStarted => {
                write!(f, "the route channel is already running")
            }
        }
    }
}

impl std::error::Error for PluginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PluginError::Schema(err) => Some(err),
            PluginError::Render(err) => Some(err),
            PluginError::Extract(err) => Some(err),
            PluginError::Encode(err) => Some(err),
            PluginError::Io(err) => Some(err),
            PluginError::Pattern(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for PluginError {
    fn from(err: SchemaError) -> Self {
        PluginError::Schema(err)
    }
}

impl From<RenderError> for PluginError {
    fn from(err: RenderError) -> Self {
        PluginError::Render(err)
    }
}

impl From<TranspileError> for PluginError {
    fn from(err: TranspileError) -> Self {
        PluginError::Extract(err)
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        PluginError::Encode(err)
    }
}

impl From<std::io::Error> for PluginError {
    fn from(err: std::io::Error) -> Self {
        PluginError::Io(err)
    }
}

impl From<regex::Error> for PluginError {
    fn from(err: regex::Error) -> Self {
        PluginError::Pattern(err)
    }
}
