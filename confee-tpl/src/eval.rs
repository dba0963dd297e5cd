//! Template evaluator
//!
//! Renders assembled template text against a read-only context value. The
//! surface is the classic embedded-template triple:
//!
//! - `<% statements %>` — logic blocks; a block statement may span tags
//!   (`<% for (k in m) { %>row<% } %>`).
//! - `<%= expr %>` — interpolation with HTML escaping.
//! - `<%- expr %>` — raw interpolation.
//!
//! The executable language is a restricted statement/expression subset of the
//! plain scripting dialect, evaluated against the supplied context only — no
//! host capability. Supported: `var`/`let`/`const` declarations (all
//! block-scoped here), assignment, `if`/`else`, `for … in`, `for … of`,
//! `while`, `return` (inside callbacks), literals, member/index access,
//! built-in string and array methods (including callback-taking `find`,
//! `filter`, `map`, `forEach`), arithmetic, comparison, logical operators and
//! the ternary. User-defined functions are outside the subset.
//!
//! Failure modes: a root identifier missing from every scope and the context
//! raises [`EvalError::UndefinedVariable`]; a missing object property reads
//! as null and interpolates as the empty string.

mod ast;
mod chunks;
mod interp;
mod parser;

use crate::dialect::DialectError;
use serde_json::Value;

pub use chunks::{scan, Segment};

/// Structural failure while compiling a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A `<%` tag without a matching `%>`.
    UnclosedTag { offset: usize },
    /// A token that does not fit the grammar at its position.
    Unexpected { found: String },
    /// Input ended mid-construct.
    UnexpectedEnd,
    /// The embedded code failed to lex.
    Lex(DialectError),
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxError::UnclosedTag { offset } => {
                write!(f, "tag opened at offset {} is never closed", offset)
            }
            SyntaxError::Unexpected { found } => write!(f, "unexpected {}", found),
            SyntaxError::UnexpectedEnd => write!(f, "unexpected end of template code"),
            SyntaxError::Lex(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SyntaxError {}

impl From<DialectError> for SyntaxError {
    fn from(err: DialectError) -> Self {
        SyntaxError::Lex(err)
    }
}

/// Failure while compiling or evaluating a template.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    Syntax(SyntaxError),
    /// An identifier resolved against neither the local scopes nor the
    /// render context. This is a template-authoring error and is surfaced
    /// uncaught.
    UndefinedVariable(String),
    /// An operation applied to a value that cannot support it.
    Type(String),
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::Syntax(err) => write!(f, "template syntax error: {}", err),
            EvalError::UndefinedVariable(name) => {
                write!(f, "'{}' is not defined", name)
            }
            EvalError::Type(msg) => write!(f, "type error: {}", msg),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<SyntaxError> for EvalError {
    fn from(err: SyntaxError) -> Self {
        EvalError::Syntax(err)
    }
}

/// Render `template` with `context` as the variable scope.
///
/// The context must be a JSON object; its keys resolve as root identifiers.
pub fn render_template(template: &str, context: &Value) -> Result<String, EvalError> {
    let ctx = context
        .as_object()
        .ok_or_else(|| EvalError::Type("render context must be an object".to_string()))?;
    let program = parser::compile(template)?;
    let mut machine = interp::Interp::new(ctx);
    machine.exec(&program)?;
    Ok(machine.into_output())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(template: &str, context: Value) -> String {
        render_template(template, &context).expect("template renders")
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(render("hello\nworld\n", json!({})), "hello\nworld\n");
    }

    #[test]
    fn test_escaped_and_raw_interpolation() {
        let ctx = json!({ "html": "<b>&</b>" });
        assert_eq!(
            render("<%= html %>", ctx.clone()),
            "&lt;b&gt;&amp;&lt;/b&gt;"
        );
        assert_eq!(render("<%- html %>", ctx), "<b>&</b>");
    }

    #[test]
    fn test_loop_spanning_tags() {
        let out = render(
            "<% for (const k in ctx) { %>line-<%- k %><% } %>",
            json!({ "ctx": { "p": 1, "q": 2 } }),
        );
        assert_eq!(out, "line-pline-q");
    }

    #[test]
    fn test_statement_block_declares_variable() {
        let out = render("<% var n = 2 + 3; %><%= n %>", json!({}));
        assert_eq!(out, "5");
    }

    #[test]
    fn test_undefined_root_identifier_is_an_error() {
        let err = render_template("<%= missing %>", &json!({})).unwrap_err();
        assert_eq!(err, EvalError::UndefinedVariable("missing".to_string()));
    }

    #[test]
    fn test_missing_property_renders_empty() {
        assert_eq!(render("[<%= obj.absent %>]", json!({ "obj": {} })), "[]");
    }

    #[test]
    fn test_null_renders_empty() {
        assert_eq!(render("[<%= v %>]", json!({ "v": null })), "[]");
    }

    #[test]
    fn test_integral_numbers_have_no_fraction() {
        assert_eq!(render("<%= a %> <%= b %>", json!({ "a": 3.0, "b": 2.5 })), "3 2.5");
    }

    #[test]
    fn test_unclosed_tag_is_a_syntax_error() {
        let err = render_template("a <% var x = 1;", &json!({})).unwrap_err();
        assert!(matches!(
            err,
            EvalError::Syntax(SyntaxError::UnclosedTag { offset: 2 })
        ));
    }

    #[test]
    fn test_array_iteration_and_methods() {
        let out = render(
            "<%- items.map((s) => s.toUpperCase()).join('-') %>",
            json!({ "items": ["a", "b"] }),
        );
        assert_eq!(out, "A-B");
    }

    #[test]
    fn test_find_with_predicate() {
        let out = render(
            "<%- rows.find((r) => r.code === 'b').label %>",
            json!({ "rows": [
                { "code": "a", "label": "first" },
                { "code": "b", "label": "second" }
            ] }),
        );
        assert_eq!(out, "second");
    }

    #[test]
    fn test_for_each_builds_local_map() {
        let out = render(
            concat!(
                "<% var views = {}; ",
                "pages.forEach((p) => { views[p.code.replace('-', '')] = p.id; }); %>",
                "<% for (var k in views) { %><%- k %>=<%- views[k] %>;<% } %>"
            ),
            json!({ "pages": [
                { "code": "sup-pliers", "id": 1 },
                { "code": "orders", "id": 2 }
            ] }),
        );
        assert_eq!(out, "suppliers=1;orders=2;");
    }

    #[test]
    fn test_context_is_read_only() {
        let err = render_template("<% a = 1; %>", &json!({ "a": 0 })).unwrap_err();
        assert!(matches!(err, EvalError::Type(_)));
    }

    #[test]
    fn test_string_concatenation() {
        let out = render(
            "<%- a + '-' + b %>",
            json!({ "a": "x", "b": 7 }),
        );
        assert_eq!(out, "x-7");
    }

    #[test]
    fn test_conditional_rendering() {
        let t = "<% if (n > 1) { %>many<% } else { %>one<% } %>";
        assert_eq!(render(t, json!({ "n": 3 })), "many");
        assert_eq!(render(t, json!({ "n": 1 })), "one");
    }

    #[test]
    fn test_literal_tag_escape() {
        assert_eq!(render("a <%% b", json!({})), "a <% b");
    }
}
