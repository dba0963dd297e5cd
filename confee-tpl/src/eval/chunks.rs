//! Tag scanner
//!
//! Splits template text into literal text, statement and interpolation
//! segments. This stage is purely lexical; segment contents are parsed later
//! so that statement blocks may span tags.

use super::SyntaxError;

/// One scanned piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, emitted verbatim.
    Text(String),
    /// `<% … %>` statement code.
    Stmt(String),
    /// `<%= … %>` (escaped) or `<%- … %>` (raw) interpolation.
    Expr { src: String, escape: bool },
}

/// Scan a template into segments.
///
/// `<%%` produces a literal `<%`. A tag without a closing `%>` is a
/// [`SyntaxError::UnclosedTag`].
pub fn scan(template: &str) -> Result<Vec<Segment>, SyntaxError> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut cursor = 0;

    while let Some(rel) = template[cursor..].find("<%") {
        let open = cursor + rel;
        text.push_str(&template[cursor..open]);

        let after = &template[open + 2..];
        if let Some(stripped) = after.strip_prefix('%') {
            // literal `<%`
            text.push_str("<%");
            cursor = template.len() - stripped.len();
            continue;
        }

        if !text.is_empty() {
            segments.push(Segment::Text(std::mem::take(&mut text)));
        }

        let (kind, body_start) = match after.as_bytes().first() {
            Some(b'=') => (Some(true), open + 3),
            Some(b'-') => (Some(false), open + 3),
            _ => (None, open + 2),
        };

        let close = template[body_start..]
            .find("%>")
            .ok_or(SyntaxError::UnclosedTag { offset: open })?;
        let body = &template[body_start..body_start + close];

        segments.push(match kind {
            Some(escape) => Segment::Expr {
                src: body.to_string(),
                escape,
            },
            None => Segment::Stmt(body.to_string()),
        });
        cursor = body_start + close + 2;
    }

    text.push_str(&template[cursor..]);
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }

    Ok(segments)
}
