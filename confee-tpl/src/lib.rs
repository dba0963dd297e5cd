//! # confee-tpl
//!
//! Template extraction and code synthesis engine for the confee toolchain.
//!
//! Pipeline
//!
//! Raw file text flows through three stages:
//!
//! 1. [`extract`](extract::extract) scans the text for paired sentinel markers
//!    (`confee.preTpl` blocks, `<!-- … tpl-->` comments, and friends), lifts
//!    each region out into a lookup table keyed by a unique token, and leaves
//!    the token behind in the skeleton. Prescript regions are transpiled to
//!    the executable dialect on capture.
//! 2. [`render`](render::render) re-inserts every region at its token —
//!    prescripts wrapped as `<% … %>` logic blocks, templates verbatim — and
//!    hands the assembled text to the evaluator.
//! 3. The [`eval`] module runs the assembled template against a read-only
//!    context value: `<% %>` statement blocks, `<%= %>` escaped and `<%- %>`
//!    raw interpolation.
//!
//! Extraction is regex-driven by design. Nested markers and markers inside
//! string literals are not special-cased; exact matching behavior (including
//! its edge cases) is part of the compatibility contract.

pub mod dialect;
pub mod eval;
pub mod extract;
pub mod render;
pub mod transpile;

pub use extract::{extract, ExtractionResult};
pub use render::{render, RenderError};
pub use transpile::{to_executable_dialect, TranspileError};
