//! Prescript transpiler
//!
//! Lowers one extracted prescript block from the annotated dialect to the
//! plain executable dialect: `const`/`let` become `var`, static type
//! annotations (declarations, function parameters, return types, `as` casts)
//! are dropped. The transform is a single token-stream pass over the isolated
//! block; no cross-file information is needed or consulted.
//!
//! Output is a directly runnable statement list. Malformed input (unbalanced
//! delimiters, unterminated strings) is an error that propagates to the
//! caller; there is no fallback.

use crate::dialect::{self, DialectError, Tok};
use std::ops::Range;

/// Failure to lower a prescript block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranspileError {
    /// A string literal opened but never closed.
    UnterminatedString { offset: usize },
    /// A character outside the dialect's alphabet.
    UnexpectedCharacter { offset: usize },
    /// Mismatched or unclosed `()`, `[]` or `{}`.
    UnbalancedDelimiters { offset: usize },
}

impl std::fmt::Display for TranspileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranspileError::UnterminatedString { offset } => {
                write!(f, "unterminated string literal at offset {}", offset)
            }
            TranspileError::UnexpectedCharacter { offset } => {
                write!(f, "unexpected character at offset {}", offset)
            }
            TranspileError::UnbalancedDelimiters { offset } => {
                write!(f, "unbalanced delimiters at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for TranspileError {}

impl From<DialectError> for TranspileError {
    fn from(err: DialectError) -> Self {
        match err {
            DialectError::UnterminatedString { offset } => {
                TranspileError::UnterminatedString { offset }
            }
            DialectError::UnexpectedCharacter { offset } => {
                TranspileError::UnexpectedCharacter { offset }
            }
        }
    }
}

/// Lower a prescript block to the executable dialect.
///
/// Inter-token spacing is copied from the source, so the output reads like
/// the input with the typed surface removed: `const x: number = 1;` becomes
/// `var x = 1;`.
pub fn to_executable_dialect(code: &str) -> Result<String, TranspileError> {
    let toks = dialect::lex(code)?;
    check_balance(&toks)?;

    let mut r = Rewriter {
        src: code,
        toks: &toks,
        out: String::new(),
        last_end: 0,
    };

    // Depth over emitted (), [], {} tokens.
    let mut depth: i32 = 0;
    // Depth of the declarator list opened by the last `var`/`let`/`const`.
    let mut decl_depth: Option<i32> = None;
    // The next identifier is a declarator name.
    let mut expect_declarator = false;
    // Depth of the parameter list of the last `function` or arrow.
    let mut param_depth: Option<i32> = None;
    // `function` seen, its `(` not yet.
    let mut pending_function = false;

    // One-token lookbehind flags; valid only for the immediately following
    // significant token.
    let mut after_declarator = false;
    let mut after_params = false;

    let mut i = 0;
    while i < toks.len() {
        let (tok, _) = toks[i];
        if tok.is_trivia() {
            r.emit(i);
            i += 1;
            continue;
        }
        let was_after_declarator = after_declarator;
        let was_after_params = after_params;
        after_declarator = false;
        after_params = false;

        match tok {
            Tok::Ident => {
                let s = r.slice(i);
                if expect_declarator {
                    expect_declarator = false;
                    after_declarator = true;
                    r.emit(i);
                } else if (s == "const" || s == "let" || s == "var")
                    && matches!(
                        r.next_significant(i + 1),
                        Some(Tok::Ident | Tok::LBrace | Tok::LBracket)
                    )
                {
                    if r.next_significant(i + 1) == Some(Tok::Ident) {
                        decl_depth = Some(depth);
                        expect_declarator = true;
                    }
                    r.emit_as(i, "var");
                } else if s == "function" {
                    pending_function = true;
                    r.emit(i);
                } else if s == "as" && r.prev_ends_value(i) {
                    i = r.skip_cast(i);
                    continue;
                } else {
                    r.emit(i);
                }
                i += 1;
            }
            Tok::Colon => {
                if was_after_declarator && decl_depth == Some(depth) {
                    r.skip(i);
                    i = r.skip_type(i + 1, &[Tok::Assign, Tok::Comma, Tok::Semi]);
                } else if param_depth == Some(depth) {
                    r.skip(i);
                    i = r.skip_type(i + 1, &[Tok::Comma, Tok::RParen]);
                } else if was_after_params {
                    r.skip(i);
                    i = r.skip_type(i + 1, &[Tok::LBrace, Tok::Arrow, Tok::Semi]);
                } else {
                    r.emit(i);
                    i += 1;
                }
            }
            Tok::LParen => {
                r.emit(i);
                depth += 1;
                if pending_function {
                    pending_function = false;
                    param_depth = Some(depth);
                } else if param_depth.is_none() && r.starts_arrow_params(i) {
                    param_depth = Some(depth);
                }
                i += 1;
            }
            Tok::RParen => {
                if param_depth == Some(depth) {
                    param_depth = None;
                    after_params = true;
                }
                r.emit(i);
                depth -= 1;
                i += 1;
            }
            Tok::LBrace | Tok::LBracket => {
                r.emit(i);
                depth += 1;
                i += 1;
            }
            Tok::RBrace | Tok::RBracket => {
                r.emit(i);
                depth -= 1;
                i += 1;
            }
            Tok::Comma => {
                if decl_depth == Some(depth) {
                    expect_declarator = true;
                }
                r.emit(i);
                i += 1;
            }
            Tok::Semi => {
                if decl_depth == Some(depth) {
                    decl_depth = None;
                }
                r.emit(i);
                i += 1;
            }
            _ => {
                r.emit(i);
                i += 1;
            }
        }
    }

    Ok(r.out)
}

/// Verify (), [], {} nesting before rewriting.
fn check_balance(toks: &[(Tok, Range<usize>)]) -> Result<(), TranspileError> {
    let mut stack: Vec<(Tok, usize)> = Vec::new();
    for (tok, span) in toks {
        match tok {
            Tok::LParen | Tok::LBrace | Tok::LBracket => stack.push((*tok, span.start)),
            Tok::RParen | Tok::RBrace | Tok::RBracket => {
                let expected = match tok {
                    Tok::RParen => Tok::LParen,
                    Tok::RBrace => Tok::LBrace,
                    _ => Tok::LBracket,
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    _ => {
                        return Err(TranspileError::UnbalancedDelimiters { offset: span.start })
                    }
                }
            }
            _ => {}
        }
    }
    if let Some((_, offset)) = stack.pop() {
        return Err(TranspileError::UnbalancedDelimiters { offset });
    }
    Ok(())
}

struct Rewriter<'a> {
    src: &'a str,
    toks: &'a [(Tok, Range<usize>)],
    out: String,
    last_end: usize,
}

impl<'a> Rewriter<'a> {
    fn slice(&self, i: usize) -> &'a str {
        &self.src[self.toks[i].1.clone()]
    }

    /// Copy the gap since the last kept token, then the token itself.
    fn emit(&mut self, i: usize) {
        let span = self.toks[i].1.clone();
        self.out.push_str(&self.src[self.last_end..span.start]);
        self.out.push_str(&self.src[span.clone()]);
        self.last_end = span.end;
    }

    /// Copy the gap, then a replacement text instead of the token.
    fn emit_as(&mut self, i: usize, text: &str) {
        let span = self.toks[i].1.clone();
        self.out.push_str(&self.src[self.last_end..span.start]);
        self.out.push_str(text);
        self.last_end = span.end;
    }

    /// Drop the token and its preceding gap.
    fn skip(&mut self, i: usize) {
        self.last_end = self.toks[i].1.end;
    }

    fn next_significant(&self, mut i: usize) -> Option<Tok> {
        while i < self.toks.len() {
            if !self.toks[i].0.is_trivia() {
                return Some(self.toks[i].0);
            }
            i += 1;
        }
        None
    }

    /// Whether the significant token before `i` can end a value expression
    /// (which makes a following `as` a cast keyword).
    fn prev_ends_value(&self, i: usize) -> bool {
        let mut j = i;
        while j > 0 {
            j -= 1;
            if self.toks[j].0.is_trivia() {
                continue;
            }
            return matches!(
                self.toks[j].0,
                Tok::Ident
                    | Tok::Str
                    | Tok::TemplateStr
                    | Tok::Num
                    | Tok::RParen
                    | Tok::RBracket
            );
        }
        false
    }

    /// Whether the group opened at `i` is an arrow function's parameter
    /// list: its matching `)` is followed by `=>`, possibly through a
    /// return annotation (`): T =>`).
    fn starts_arrow_params(&self, i: usize) -> bool {
        let mut depth = 0i32;
        let mut j = i;
        while j < self.toks.len() {
            match self.toks[j].0 {
                Tok::LParen => depth += 1,
                Tok::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.arrow_after_group(j + 1);
                    }
                }
                _ => {}
            }
            j += 1;
        }
        false
    }

    /// After a candidate parameter list's `)`: an immediate `=>`, or a
    /// `:` whose annotation reaches `=>` before the statement can end.
    /// A ternary else branch (`ok ? (a) : b`) never reaches an arrow.
    fn arrow_after_group(&self, mut i: usize) -> bool {
        while i < self.toks.len() && self.toks[i].0.is_trivia() {
            i += 1;
        }
        match self.toks.get(i).map(|(t, _)| *t) {
            Some(Tok::Arrow) => true,
            Some(Tok::Colon) => {
                let mut depth = 0i32;
                let mut j = i + 1;
                while j < self.toks.len() {
                    let tok = self.toks[j].0;
                    if depth == 0 {
                        match tok {
                            Tok::Arrow => return true,
                            Tok::Semi | Tok::Comma | Tok::Question | Tok::Colon => return false,
                            _ => {}
                        }
                    }
                    match tok {
                        Tok::LParen | Tok::LBracket | Tok::LBrace | Tok::Lt => depth += 1,
                        Tok::RParen | Tok::RBracket | Tok::RBrace | Tok::Gt => {
                            if depth == 0 {
                                return false;
                            }
                            depth -= 1;
                        }
                        _ => {}
                    }
                    j += 1;
                }
                false
            }
            _ => false,
        }
    }

    /// Skip a type annotation starting after its `:`. Stops (without
    /// consuming) at the first terminator token at annotation depth, at a
    /// closer that would leave the annotation's nesting, or at a line break
    /// at annotation depth (an uninitialized `const x: number` ends there).
    fn skip_type(&mut self, mut i: usize, terminators: &[Tok]) -> usize {
        let mut depth: i32 = 0;
        let mut consumed = false;
        while i < self.toks.len() {
            let tok = self.toks[i].0;
            if depth == 0 {
                if terminators.contains(&tok) {
                    return i;
                }
                if consumed && self.src[self.last_end..self.toks[i].1.start].contains('\n') {
                    return i;
                }
            }
            match tok {
                Tok::LParen | Tok::LBracket | Tok::LBrace | Tok::Lt => depth += 1,
                Tok::RParen | Tok::RBracket | Tok::RBrace | Tok::Gt => {
                    if depth == 0 {
                        return i;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.skip(i);
            consumed = true;
            i += 1;
        }
        i
    }

    /// Skip an `as T` cast: the keyword, a type name with dotted path,
    /// generic arguments and array suffixes.
    fn skip_cast(&mut self, mut i: usize) -> usize {
        self.skip(i); // `as`
        i += 1;
        if i < self.toks.len() && self.toks[i].0 == Tok::Ident {
            self.skip(i);
            i += 1;
        }
        loop {
            match (
                self.toks.get(i).map(|(t, _)| *t),
                self.toks.get(i + 1).map(|(t, _)| *t),
            ) {
                (Some(Tok::Dot), Some(Tok::Ident)) => {
                    self.skip(i);
                    self.skip(i + 1);
                    i += 2;
                }
                (Some(Tok::LBracket), Some(Tok::RBracket)) => {
                    self.skip(i);
                    self.skip(i + 1);
                    i += 2;
                }
                (Some(Tok::Lt), _) => {
                    // balanced generic argument list
                    let mut depth = 0i32;
                    while i < self.toks.len() {
                        match self.toks[i].0 {
                            Tok::Lt => depth += 1,
                            Tok::Gt => {
                                depth -= 1;
                                if depth == 0 {
                                    self.skip(i);
                                    i += 1;
                                    break;
                                }
                            }
                            _ => {}
                        }
                        self.skip(i);
                        i += 1;
                    }
                }
                _ => return i,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowers_annotated_declaration() {
        assert_eq!(
            to_executable_dialect("const x: number = 1;").expect("transpiles"),
            "var x = 1;"
        );
    }

    #[test]
    fn test_lowers_let_and_generic_annotation() {
        assert_eq!(
            to_executable_dialect("let views: Record<string, string> = {};").expect("transpiles"),
            "var views = {};"
        );
    }

    #[test]
    fn test_strips_cast_after_call() {
        let out = to_executable_dialect(
            "const id = (options.find((o) => o.name === 'x') as PaginationOption).id;",
        )
        .expect("transpiles");
        assert_eq!(
            out,
            "var id = (options.find((o) => o.name === 'x')).id;"
        );
    }

    #[test]
    fn test_strips_function_annotations() {
        let out = to_executable_dialect("function pad(s: string, n: number): string { return s; }")
            .expect("transpiles");
        assert_eq!(out, "function pad(s, n) { return s; }");
    }

    #[test]
    fn test_strips_arrow_parameter_annotations() {
        let out = to_executable_dialect("const names = pages.map((p: MainPage) => p.code);")
            .expect("transpiles");
        assert_eq!(out, "var names = pages.map((p) => p.code);");
    }

    #[test]
    fn test_strips_arrow_param_and_return_annotations() {
        let out = to_executable_dialect("var f = (a: number, b: number): number => a + b;")
            .expect("transpiles");
        assert_eq!(out, "var f = (a, b) => a + b;");
    }

    #[test]
    fn test_parenthesized_ternary_branch_is_not_a_parameter_list() {
        assert_eq!(
            to_executable_dialect("var pick = ok ? (a) : b;").expect("transpiles"),
            "var pick = ok ? (a) : b;"
        );
    }

    #[test]
    fn test_keeps_object_literals_intact() {
        assert_eq!(
            to_executable_dialect("var m = { a: 1, b: 'two' };").expect("transpiles"),
            "var m = { a: 1, b: 'two' };"
        );
    }

    #[test]
    fn test_multiple_declarators() {
        assert_eq!(
            to_executable_dialect("const a: number = 1, b: string = 'x';").expect("transpiles"),
            "var a = 1, b = 'x';"
        );
    }

    #[test]
    fn test_ternary_initializer_is_not_an_annotation() {
        assert_eq!(
            to_executable_dialect("var flag = ready ? 1 : 2;").expect("transpiles"),
            "var flag = ready ? 1 : 2;"
        );
    }

    #[test]
    fn test_uninitialized_annotation_ends_at_line_break() {
        let out = to_executable_dialect("const total: number\ntotal = 0;").expect("transpiles");
        assert_eq!(out, "var total\ntotal = 0;");
    }

    #[test]
    fn test_unterminated_string_propagates() {
        let err = to_executable_dialect("var s = 'open").unwrap_err();
        assert!(matches!(err, TranspileError::UnterminatedString { .. }));
    }

    #[test]
    fn test_unbalanced_braces_propagate() {
        let err = to_executable_dialect("if (a) { b;").unwrap_err();
        assert!(matches!(err, TranspileError::UnbalancedDelimiters { .. }));
    }

    #[test]
    fn test_preserves_comments_and_layout() {
        let out = to_executable_dialect("// note\nconst a: number = 1;\nconst b = a;")
            .expect("transpiles");
        assert_eq!(out, "// note\nvar a = 1;\nvar b = a;");
    }
}
