//! Sentinel extractor
//!
//! Scans raw source text for paired start/end markers, lifts each enclosed
//! region into a lookup table keyed by a fresh uuid token, and replaces the
//! region in the running skeleton with that token. Rules run in a fixed,
//! significant order: prescript styles first, then template styles, with the
//! markup-comment style gated on the file extension.
//!
//! Matching is intentionally regex-driven and non-greedy: adjacent regions of
//! the same style extract individually, and an absent closing marker simply
//! means the rule does not match (most files contain no regions at all).
//! Trim rules are applied to the captured text sequentially, not as one
//! combined pattern; all but the doc-comment continuation strip replace only
//! the first occurrence of their pattern.

use crate::transpile::{to_executable_dialect, TranspileError};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Which lookup table a rule routes its regions into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Prescript,
    Template,
}

/// A leading/trailing strip applied to captured region text.
struct TrimRule {
    pattern: Regex,
    /// Replace every occurrence instead of just the first (used to undo
    /// doc-comment line prefixing).
    all: bool,
}

impl TrimRule {
    fn first(pattern: &str) -> Self {
        TrimRule {
            pattern: Regex::new(pattern).expect("static trim pattern"),
            all: false,
        }
    }

    fn every(pattern: &str) -> Self {
        TrimRule {
            pattern: Regex::new(pattern).expect("static trim pattern"),
            all: true,
        }
    }

    fn apply(&self, text: &str) -> String {
        if self.all {
            self.pattern.replace_all(text, "").into_owned()
        } else {
            self.pattern.replace(text, "").into_owned()
        }
    }
}

/// One paired-marker style.
struct SentinelRule {
    pattern: Regex,
    trims: Vec<TrimRule>,
    target: Target,
    transpile: bool,
    /// Only applied when the file identifier carries this extension.
    gate: Option<&'static str>,
}

/// The fixed rule table. Order is significant: call-style prescripts must run
/// before the bare style (the bare pattern would otherwise match inside the
/// call markers), and prescript styles before template styles.
static RULES: Lazy<Vec<SentinelRule>> = Lazy::new(|| {
    vec![
        // confee.preTpl() … confee.preTplEnd()
        SentinelRule {
            pattern: Regex::new(r"confee\.preTpl\(\)(;?)([\s\S]*?)confee\.preTplEnd\(\)(;?)")
                .expect("static rule pattern"),
            trims: vec![
                TrimRule::first(r"[\n\s]*confee\.preTpl\(\)(;?)[\n\s]+"),
                TrimRule::first(r"[\n\s]+confee\.preTplEnd\(\)(;?)[\n\s]*"),
            ],
            target: Target::Prescript,
            transpile: true,
            gate: None,
        },
        // confee.preTpl … confee.preTplEnd
        SentinelRule {
            pattern: Regex::new(r"confee\.preTpl(;?)([\s\S]*?)confee\.preTplEnd(;?)")
                .expect("static rule pattern"),
            trims: vec![
                TrimRule::first(r"[\n\s]*confee\.preTpl(;?)[\n\s]+"),
                TrimRule::first(r"[\n\s]*confee\.preTplEnd(;?)[\n\s]*"),
            ],
            target: Target::Prescript,
            transpile: true,
            gate: None,
        },
        // <!-- … tpl-->  (markup-template files only)
        SentinelRule {
            pattern: Regex::new(r"<!--([\s\S]*?)tpl-->").expect("static rule pattern"),
            trims: vec![
                TrimRule::first(r"[\n\s]*<!--[\n\s]+"),
                TrimRule::first(r"[\n\s]*tpl-->[\n\s]*"),
            ],
            target: Target::Template,
            transpile: false,
            gate: Some("vue"),
        },
        // {/* … tpl*/}
        SentinelRule {
            pattern: Regex::new(r"\{/\*([\s\S]*?)tpl\*/\}").expect("static rule pattern"),
            trims: vec![
                TrimRule::first(r"[\n\s]*\{/\*[\n\s]+"),
                TrimRule::first(r"[\n\s]*tpl\*/\}[\n\s]*"),
            ],
            target: Target::Template,
            transpile: false,
            gate: None,
        },
        // /** … tpl*/  with per-line leading `*` stripped
        SentinelRule {
            pattern: Regex::new(r"/\*\*([\s\S]*?)tpl\*/").expect("static rule pattern"),
            trims: vec![
                TrimRule::first(r"[\n\s]*/\*\*[\n\s]+"),
                TrimRule::first(r"[\n\s]*tpl\*/[\n\s]*"),
                TrimRule::every(r"[\n\s]*\*[\n\s]+"),
            ],
            target: Target::Template,
            transpile: false,
            gate: None,
        },
        // confee.tpl(` … tpl`)
        SentinelRule {
            pattern: Regex::new(r"confee\.tpl\(`([\s\S]*?)tpl`\)").expect("static rule pattern"),
            trims: vec![
                TrimRule::first(r"[\n\s]*confee\.tpl\(`[\n\s]+"),
                TrimRule::first(r"[\n\s]*tpl`\)[;,\n\s]*"),
            ],
            target: Target::Template,
            transpile: false,
            gate: None,
        },
    ]
});

/// The outcome of one extraction pass over one file.
///
/// Every token appearing in `skeleton` has exactly one entry in exactly one
/// of the two maps; tokens are uuid-v4 strings and cannot collide with
/// pre-existing text or be substrings of one another.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Input text with every matched region replaced by its token.
    pub skeleton: String,
    /// Token → transpiled prescript content.
    pub prescripts: IndexMap<String, String>,
    /// Token → raw template content.
    pub templates: IndexMap<String, String>,
}

/// Extract all sentinel-delimited regions from `source`.
///
/// `file_identifier` is used only to select file-type-specific rules, by
/// suffix. A malformed prescript aborts the whole call; files without any
/// regions come back unchanged with empty tables.
pub fn extract(source: &str, file_identifier: &str) -> Result<ExtractionResult, TranspileError> {
    let ext = file_identifier.rsplit('.').next().unwrap_or("");

    let mut result = ExtractionResult {
        skeleton: source.to_string(),
        ..Default::default()
    };

    for rule in RULES.iter() {
        if let Some(gate) = rule.gate {
            if ext != gate {
                continue;
            }
        }
        apply_rule(rule, &mut result)?;
    }

    Ok(result)
}

/// Run one rule over the current skeleton, moving each match into its table.
fn apply_rule(rule: &SentinelRule, result: &mut ExtractionResult) -> Result<(), TranspileError> {
    // Collect the full match texts first; each is then replaced at its first
    // remaining literal occurrence, so identical regions resolve one by one.
    let matches: Vec<String> = rule
        .pattern
        .find_iter(&result.skeleton)
        .map(|m| m.as_str().to_string())
        .collect();

    for mut matched in matches {
        let token = Uuid::new_v4().to_string();
        result.skeleton = replace_first(&result.skeleton, &matched, &token);

        for trim in &rule.trims {
            matched = trim.apply(&matched);
        }
        if rule.transpile {
            matched = to_executable_dialect(&matched)?;
        }
        // The trims are not guaranteed to leave the edges clean.
        let content = matched.trim().to_string();

        match rule.target {
            Target::Prescript => result.prescripts.insert(token, content),
            Target::Template => result.templates.insert(token, content),
        };
    }

    Ok(())
}

/// Replace the first literal occurrence of `needle` in `haystack`.
pub(crate) fn replace_first(haystack: &str, needle: &str, replacement: &str) -> String {
    match haystack.find(needle) {
        Some(pos) => {
            let mut out = String::with_capacity(haystack.len());
            out.push_str(&haystack[..pos]);
            out.push_str(replacement);
            out.push_str(&haystack[pos + needle.len()..]);
            out
        }
        None => haystack.to_string(),
    }
}
