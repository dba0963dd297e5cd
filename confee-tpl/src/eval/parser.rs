//! Recursive-descent parser for the executable template dialect.
//!
//! The compile step merges scanned segments into a single statement stream:
//! literal text becomes an `Emit` statement, interpolation tags become
//! `EmitExpr` statements, and statement-tag code is lexed into tokens. A
//! control-flow block opened in one tag can therefore close in a later one —
//! the parser never sees tag boundaries.

use super::ast::*;
use super::chunks::{scan, Segment};
use super::SyntaxError;
use crate::dialect::{self, Tok};

/// One element of the merged program stream.
#[derive(Debug, Clone)]
enum Item {
    Tok(Tok, String),
    /// A pre-compiled statement (emitted text or interpolation).
    Ready(Stmt),
}

/// Compile template text into a statement list.
pub fn compile(template: &str) -> Result<Vec<Stmt>, SyntaxError> {
    let mut items = Vec::new();
    for segment in scan(template)? {
        match segment {
            Segment::Text(text) => items.push(Item::Ready(Stmt::Emit(text))),
            Segment::Expr { src, escape } => {
                let expr = parse_expression(&src)?;
                items.push(Item::Ready(Stmt::EmitExpr { expr, escape }));
            }
            Segment::Stmt(src) => lex_into(&src, &mut items)?,
        }
    }
    let mut parser = Parser { items, pos: 0 };
    parser.parse_program()
}

/// Parse one standalone expression (an interpolation tag body).
pub fn parse_expression(src: &str) -> Result<Expr, SyntaxError> {
    let mut items = Vec::new();
    lex_into(src, &mut items)?;
    let mut parser = Parser { items, pos: 0 };
    let expr = parser.parse_expr()?;
    if parser.pos != parser.items.len() {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

fn lex_into(src: &str, items: &mut Vec<Item>) -> Result<(), SyntaxError> {
    for (tok, span) in dialect::lex(src)? {
        if tok.is_trivia() {
            continue;
        }
        items.push(Item::Tok(tok, src[span].to_string()));
    }
    Ok(())
}

struct Parser {
    items: Vec<Item>,
    pos: usize,
}

impl Parser {
    fn parse_program(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut stmts = Vec::new();
        while self.pos < self.items.len() {
            if self.eat(Tok::Semi) {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        if let Some(Item::Ready(stmt)) = self.items.get(self.pos) {
            let stmt = stmt.clone();
            self.pos += 1;
            return Ok(stmt);
        }
        match self.peek_ident() {
            Some("var") | Some("let") | Some("const") => {
                self.pos += 1;
                return self.parse_var_decl();
            }
            Some("if") => {
                self.pos += 1;
                return self.parse_if();
            }
            Some("for") => {
                self.pos += 1;
                return self.parse_for();
            }
            Some("while") => {
                self.pos += 1;
                return self.parse_while();
            }
            Some("return") => {
                self.pos += 1;
                let value = if self.at_end()
                    || self.check(Tok::Semi)
                    || self.check(Tok::RBrace)
                {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.eat(Tok::Semi);
                return Ok(Stmt::Return(value));
            }
            _ => {}
        }

        let expr = self.parse_expr()?;
        let op = if self.eat(Tok::Assign) {
            Some(AssignOp::Set)
        } else if self.eat(Tok::PlusAssign) {
            Some(AssignOp::Add)
        } else {
            None
        };
        let stmt = match op {
            Some(op) => {
                if !matches!(expr, Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. }) {
                    return Err(SyntaxError::Unexpected {
                        found: "invalid assignment target".to_string(),
                    });
                }
                Stmt::Assign {
                    target: expr,
                    op,
                    value: self.parse_expr()?,
                }
            }
            None => Stmt::Expr(expr),
        };
        self.eat(Tok::Semi);
        Ok(stmt)
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, SyntaxError> {
        let mut decls = Vec::new();
        loop {
            let name = self.expect_ident()?;
            let init = if self.eat(Tok::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            decls.push((name, init));
            if !self.eat(Tok::Comma) {
                break;
            }
        }
        self.eat(Tok::Semi);
        Ok(Stmt::VarDecl(decls))
    }

    fn parse_if(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect(Tok::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(Tok::RParen)?;
        let then = self.parse_body()?;
        let otherwise = if self.peek_ident() == Some("else") {
            self.pos += 1;
            if self.peek_ident() == Some("if") {
                self.pos += 1;
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_body()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then,
            otherwise,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect(Tok::LParen)?;
        if matches!(self.peek_ident(), Some("var") | Some("let") | Some("const")) {
            self.pos += 1;
        }
        let var = self.expect_ident()?;
        let kind = match self.peek_ident() {
            Some("in") => true,
            Some("of") => false,
            _ => {
                return Err(SyntaxError::Unexpected {
                    found: "for loop without 'in' or 'of' (classic for is not supported)"
                        .to_string(),
                })
            }
        };
        self.pos += 1;
        let expr = self.parse_expr()?;
        self.expect(Tok::RParen)?;
        let body = self.parse_body()?;
        Ok(if kind {
            Stmt::ForIn {
                var,
                object: expr,
                body,
            }
        } else {
            Stmt::ForOf {
                var,
                iterable: expr,
                body,
            }
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect(Tok::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(Tok::RParen)?;
        let body = self.parse_body()?;
        Ok(Stmt::While { cond, body })
    }

    /// A braced statement list, or a single statement.
    fn parse_body(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        if self.eat(Tok::LBrace) {
            let mut stmts = Vec::new();
            loop {
                if self.eat(Tok::RBrace) {
                    return Ok(stmts);
                }
                if self.at_end() {
                    return Err(SyntaxError::UnexpectedEnd);
                }
                if self.eat(Tok::Semi) {
                    continue;
                }
                stmts.push(self.parse_stmt()?);
            }
        }
        Ok(vec![self.parse_stmt()?])
    }

    // Expressions, lowest precedence first.

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let cond = self.parse_or()?;
        if self.eat(Tok::Question) {
            let then = self.parse_expr()?;
            self.expect(Tok::Colon)?;
            let otherwise = self.parse_expr()?;
            return Ok(Expr::Ternary {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }
        Ok(cond)
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_and()?;
        while self.eat(Tok::OrOr) {
            let rhs = self.parse_and()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_equality()?;
        while self.eat(Tok::AndAnd) {
            let rhs = self.parse_equality()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = if self.eat(Tok::StrictEq) || self.eat(Tok::EqEq) {
                BinaryOp::Eq
            } else if self.eat(Tok::StrictNotEq) || self.eat(Tok::NotEq) {
                BinaryOp::NotEq
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_relational()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_relational(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = if self.eat(Tok::Lt) {
                BinaryOp::Lt
            } else if self.eat(Tok::Le) {
                BinaryOp::Le
            } else if self.eat(Tok::Gt) {
                BinaryOp::Gt
            } else if self.eat(Tok::Ge) {
                BinaryOp::Ge
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = if self.eat(Tok::Plus) {
                BinaryOp::Add
            } else if self.eat(Tok::Minus) {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = if self.eat(Tok::Star) {
                BinaryOp::Mul
            } else if self.eat(Tok::Slash) {
                BinaryOp::Div
            } else if self.eat(Tok::Percent) {
                BinaryOp::Rem
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.eat(Tok::Bang) {
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(self.parse_unary()?),
            });
        }
        if self.eat(Tok::Minus) {
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(self.parse_unary()?),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(Tok::Dot) {
                let property = self.expect_ident()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.eat(Tok::LBracket) {
                let index = self.parse_expr()?;
                self.expect(Tok::RBracket)?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat(Tok::LParen) {
                let mut args = Vec::new();
                if !self.check(Tok::RParen) {
                    loop {
                        args.push(self.parse_expr()?);
                        if !self.eat(Tok::Comma) {
                            break;
                        }
                    }
                }
                self.expect(Tok::RParen)?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let (tok, text) = match self.items.get(self.pos) {
            Some(Item::Tok(tok, text)) => (*tok, text.clone()),
            Some(Item::Ready(_)) | None => return Err(self.unexpected()),
        };
        match tok {
            Tok::Num => {
                self.pos += 1;
                // the lexer guarantees a valid decimal literal
                Ok(Expr::Num(text.parse::<f64>().unwrap_or(f64::NAN)))
            }
            Tok::Str | Tok::TemplateStr => {
                self.pos += 1;
                Ok(Expr::Str(unescape(&text)))
            }
            Tok::Ident => {
                self.pos += 1;
                match text.as_str() {
                    "true" => Ok(Expr::Bool(true)),
                    "false" => Ok(Expr::Bool(false)),
                    "null" | "undefined" => Ok(Expr::Null),
                    _ => {
                        if self.eat(Tok::Arrow) {
                            let body = self.parse_arrow_body()?;
                            Ok(Expr::Arrow {
                                params: vec![text],
                                body,
                            })
                        } else {
                            Ok(Expr::Ident(text))
                        }
                    }
                }
            }
            Tok::LParen => {
                self.pos += 1;
                if let Some(params) = self.try_arrow_params() {
                    let body = self.parse_arrow_body()?;
                    return Ok(Expr::Arrow { params, body });
                }
                let expr = self.parse_expr()?;
                self.expect(Tok::RParen)?;
                Ok(expr)
            }
            Tok::LBracket => {
                self.pos += 1;
                let mut elements = Vec::new();
                loop {
                    if self.eat(Tok::RBracket) {
                        return Ok(Expr::Array(elements));
                    }
                    elements.push(self.parse_expr()?);
                    if !self.eat(Tok::Comma) {
                        self.expect(Tok::RBracket)?;
                        return Ok(Expr::Array(elements));
                    }
                }
            }
            Tok::LBrace => {
                self.pos += 1;
                let mut entries = Vec::new();
                loop {
                    if self.eat(Tok::RBrace) {
                        return Ok(Expr::Object(entries));
                    }
                    let key = match self.items.get(self.pos) {
                        Some(Item::Tok(Tok::Ident, name)) => name.clone(),
                        Some(Item::Tok(Tok::Str, raw)) => unescape(raw),
                        _ => return Err(self.unexpected()),
                    };
                    self.pos += 1;
                    let value = if self.eat(Tok::Colon) {
                        self.parse_expr()?
                    } else {
                        // shorthand property
                        Expr::Ident(key.clone())
                    };
                    entries.push((key, value));
                    if !self.eat(Tok::Comma) {
                        self.expect(Tok::RBrace)?;
                        return Ok(Expr::Object(entries));
                    }
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_arrow_body(&mut self) -> Result<ArrowBody, SyntaxError> {
        if self.eat(Tok::LBrace) {
            let mut stmts = Vec::new();
            loop {
                if self.eat(Tok::RBrace) {
                    return Ok(ArrowBody::Block(stmts));
                }
                if self.at_end() {
                    return Err(SyntaxError::UnexpectedEnd);
                }
                if self.eat(Tok::Semi) {
                    continue;
                }
                stmts.push(self.parse_stmt()?);
            }
        }
        Ok(ArrowBody::Expr(Box::new(self.parse_expr()?)))
    }

    /// After an already-consumed `(`: if the items form a parameter list
    /// followed by `=>`, consume through the arrow and return the names.
    fn try_arrow_params(&mut self) -> Option<Vec<String>> {
        let start = self.pos;
        let mut params = Vec::new();
        if !self.check(Tok::RParen) {
            loop {
                match self.items.get(self.pos) {
                    Some(Item::Tok(Tok::Ident, name)) => {
                        params.push(name.clone());
                        self.pos += 1;
                    }
                    _ => {
                        self.pos = start;
                        return None;
                    }
                }
                if !self.eat(Tok::Comma) {
                    break;
                }
            }
        }
        if self.eat(Tok::RParen) && self.eat(Tok::Arrow) {
            return Some(params);
        }
        self.pos = start;
        None
    }

    // Stream helpers.

    fn at_end(&self) -> bool {
        self.pos >= self.items.len()
    }

    fn check(&self, tok: Tok) -> bool {
        matches!(self.items.get(self.pos), Some(Item::Tok(t, _)) if *t == tok)
    }

    fn eat(&mut self, tok: Tok) -> bool {
        if self.check(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Tok) -> Result<(), SyntaxError> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.items.get(self.pos) {
            Some(Item::Tok(Tok::Ident, text)) => Some(text.as_str()),
            _ => None,
        }
    }

    fn expect_ident(&mut self) -> Result<String, SyntaxError> {
        match self.items.get(self.pos) {
            Some(Item::Tok(Tok::Ident, text)) => {
                let name = text.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn unexpected(&self) -> SyntaxError {
        match self.items.get(self.pos) {
            Some(Item::Tok(_, text)) => SyntaxError::Unexpected {
                found: format!("'{}'", text),
            },
            Some(Item::Ready(Stmt::Emit(_))) => SyntaxError::Unexpected {
                found: "template text inside an expression".to_string(),
            },
            Some(Item::Ready(_)) => SyntaxError::Unexpected {
                found: "interpolation tag inside an expression".to_string(),
            },
            None => SyntaxError::UnexpectedEnd,
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Strip quotes and resolve escape sequences.
fn unescape(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_loop_spanning_tags() {
        let program = compile("<% for (const k in m) { %>x<% } %>").expect("compiles");
        assert_eq!(program.len(), 1);
        match &program[0] {
            Stmt::ForIn { var, body, .. } => {
                assert_eq!(var, "k");
                assert_eq!(body, &vec![Stmt::Emit("x".to_string())]);
            }
            other => panic!("expected for-in, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_arrow_predicate() {
        let expr = parse_expression("rows.find((r) => r.code === 'b')").expect("parses");
        match expr {
            Expr::Call { args, .. } => {
                assert!(matches!(args[0], Expr::Arrow { .. }));
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_expression_is_not_an_arrow() {
        let expr = parse_expression("(a + b) * c").expect("parses");
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_classic_for_is_rejected() {
        let err = compile("<% for (var i = 0; i < 3; i += 1) {} %>").unwrap_err();
        assert!(matches!(err, SyntaxError::Unexpected { .. }));
    }

    #[test]
    fn test_object_literal_with_shorthand() {
        let expr = parse_expression("{ a: 1, b }").expect("parses");
        assert_eq!(
            expr,
            Expr::Object(vec![
                ("a".to_string(), Expr::Num(1.0)),
                ("b".to_string(), Expr::Ident("b".to_string())),
            ])
        );
    }

    #[test]
    fn test_string_escapes() {
        let expr = parse_expression(r"'a\nb\'c'").expect("parses");
        assert_eq!(expr, Expr::Str("a\nb'c".to_string()));
    }
}
