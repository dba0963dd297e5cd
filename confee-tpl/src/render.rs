//! Recombiner
//!
//! Reassembles an extraction result into one renderable template and
//! evaluates it. Each prescript token in the skeleton is replaced with its
//! code wrapped in a `<% … %>` logic block; each template token is replaced
//! with its raw content. Variables declared by a prescript are therefore in
//! scope for every template region that follows it in the file.

use crate::eval::{render_template, EvalError};
use crate::extract::{replace_first, ExtractionResult};
use serde_json::Value;

/// Failure while recombining or evaluating an extracted file.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A token present in a lookup table no longer occurs in the skeleton.
    MissingToken { token: String },
    Eval(EvalError),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::MissingToken { token } => {
                write!(f, "token '{}' does not occur in the skeleton", token)
            }
            RenderError::Eval(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<EvalError> for RenderError {
    fn from(err: EvalError) -> Self {
        RenderError::Eval(err)
    }
}

/// Re-inline every extracted region and render the assembled text against
/// `context`.
///
/// An extraction with no regions degenerates to rendering the skeleton
/// itself, which for marker-free files is the identity (modulo any `<%`
/// sequences the file legitimately contains).
pub fn render(extraction: &ExtractionResult, context: &Value) -> Result<String, RenderError> {
    let assembled = assemble(extraction)?;
    Ok(render_template(&assembled, context)?)
}

/// Splice region contents back over their tokens without evaluating.
pub fn assemble(extraction: &ExtractionResult) -> Result<String, RenderError> {
    let mut text = extraction.skeleton.clone();
    for (token, code) in &extraction.prescripts {
        let block = format!("<%\n{}\n%>", code);
        text = splice(&text, token, &block)?;
    }
    for (token, template) in &extraction.templates {
        text = splice(&text, token, template)?;
    }
    Ok(text)
}

fn splice(text: &str, token: &str, replacement: &str) -> Result<String, RenderError> {
    if !text.contains(token) {
        return Err(RenderError::MissingToken {
            token: token.to_string(),
        });
    }
    Ok(replace_first(text, token, replacement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use serde_json::json;

    #[test]
    fn test_marker_free_file_renders_unchanged() {
        let source = "export const routes = [];\n";
        let extraction = extract(source, "route.ts").expect("extracts");
        let out = render(&extraction, &json!({})).expect("renders");
        assert_eq!(out, source);
    }

    #[test]
    fn test_prescript_variables_reach_later_templates() {
        let source = concat!(
            "confee.preTpl();\n",
            "const greeting: string = 'hi';\n",
            "confee.preTplEnd();\n",
            "{/*\n",
            "<%- greeting %> there\n",
            "tpl*/}\n",
        );
        let extraction = extract(source, "page.tsx").expect("extracts");
        let out = render(&extraction, &json!({})).expect("renders");
        assert_eq!(out.trim(), "hi there");
    }

    #[test]
    fn test_template_reads_context() {
        let source = "confee.tpl(`\n<%- confeeData.app.name %>\ntpl`)";
        let extraction = extract(source, "route.ts").expect("extracts");
        let ctx = json!({ "confeeData": { "app": { "name": "shop" } } });
        let out = render(&extraction, &ctx).expect("renders");
        assert_eq!(out, "shop");
    }

    #[test]
    fn test_missing_token_is_reported() {
        let source = "confee.tpl(`\nx\ntpl`)";
        let mut extraction = extract(source, "route.ts").expect("extracts");
        extraction.skeleton = "token went missing".to_string();
        let err = render(&extraction, &json!({})).unwrap_err();
        assert!(matches!(err, RenderError::MissingToken { .. }));
    }

    #[test]
    fn test_evaluation_error_surfaces() {
        let source = "confee.tpl(`\n<%- nope %>\ntpl`)";
        let extraction = extract(source, "route.ts").expect("extracts");
        let err = render(&extraction, &json!({})).unwrap_err();
        assert_eq!(
            err,
            RenderError::Eval(EvalError::UndefinedVariable("nope".to_string()))
        );
    }

    #[test]
    fn test_assemble_round_trips_without_markers() {
        let source = "a\nconfee.tpl(`\nbody\ntpl`);\nc\n";
        let extraction = extract(source, "route.ts").expect("extracts");
        let assembled = assemble(&extraction).expect("assembles");
        assert!(assembled.contains("body"));
        assert!(!assembled.contains("confee.tpl"));
    }
}
