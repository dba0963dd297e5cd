//! Tree-walking interpreter for compiled templates.
//!
//! Values are `serde_json::Value`; the render context is an object whose keys
//! resolve as root identifiers. The context itself is never mutated —
//! assignment targets must be rooted at a locally declared variable.

use super::ast::*;
use super::EvalError;
use crate::extract::replace_first;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Control-flow outcome of a statement list.
enum Flow {
    Normal,
    Return(Value),
}

/// One step of a resolved assignment path.
enum Seg {
    Key(String),
    Idx(usize),
}

pub struct Interp<'a> {
    ctx: &'a Map<String, Value>,
    scopes: Vec<HashMap<String, Value>>,
    out: String,
}

impl<'a> Interp<'a> {
    pub fn new(ctx: &'a Map<String, Value>) -> Self {
        Interp {
            ctx,
            scopes: vec![HashMap::new()],
            out: String::new(),
        }
    }

    pub fn exec(&mut self, program: &[Stmt]) -> Result<(), EvalError> {
        // A top-level `return` just stops rendering.
        self.exec_block(program)?;
        Ok(())
    }

    pub fn into_output(self) -> String {
        self.out
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Flow, EvalError> {
        for stmt in stmts {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, EvalError> {
        match stmt {
            Stmt::Emit(text) => {
                self.out.push_str(text);
            }
            Stmt::EmitExpr { expr, escape } => {
                let value = self.eval(expr)?;
                let text = js_display(&value);
                if *escape {
                    self.out.push_str(&escape_html(&text));
                } else {
                    self.out.push_str(&text);
                }
            }
            Stmt::VarDecl(decls) => {
                for (name, init) in decls {
                    let value = match init {
                        Some(expr) => self.eval(expr)?,
                        None => Value::Null,
                    };
                    self.scopes
                        .last_mut()
                        .expect("scope stack is never empty")
                        .insert(name.clone(), value);
                }
            }
            Stmt::Assign { target, op, value } => {
                let value = self.eval(value)?;
                self.assign(target, *op, value)?;
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.eval(cond)?;
                let branch = if truthy(&cond) {
                    Some(then)
                } else {
                    otherwise.as_ref()
                };
                if let Some(body) = branch {
                    return self.exec_scoped(body);
                }
            }
            Stmt::ForIn { var, object, body } => {
                let object = self.eval(object)?;
                let keys: Vec<String> = match object {
                    Value::Object(map) => map.keys().cloned().collect(),
                    Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
                    Value::Null => Vec::new(),
                    other => {
                        return Err(EvalError::Type(format!(
                            "cannot enumerate keys of {}",
                            type_name(&other)
                        )))
                    }
                };
                for key in keys {
                    let flow = self.exec_loop_body(var, Value::String(key), body)?;
                    if let Flow::Return(_) = flow {
                        return Ok(flow);
                    }
                }
            }
            Stmt::ForOf {
                var,
                iterable,
                body,
            } => {
                let iterable = self.eval(iterable)?;
                let items: Vec<Value> = match iterable {
                    Value::Array(items) => items,
                    Value::String(s) => s
                        .chars()
                        .map(|c| Value::String(c.to_string()))
                        .collect(),
                    other => {
                        return Err(EvalError::Type(format!(
                            "{} is not iterable",
                            type_name(&other)
                        )))
                    }
                };
                for item in items {
                    let flow = self.exec_loop_body(var, item, body)?;
                    if let Flow::Return(_) = flow {
                        return Ok(flow);
                    }
                }
            }
            Stmt::While { cond, body } => loop {
                let value = self.eval(cond)?;
                if !truthy(&value) {
                    break;
                }
                let flow = self.exec_scoped(body)?;
                if let Flow::Return(_) = flow {
                    return Ok(flow);
                }
            },
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                return Ok(Flow::Return(value));
            }
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_scoped(&mut self, body: &[Stmt]) -> Result<Flow, EvalError> {
        self.scopes.push(HashMap::new());
        let flow = self.exec_block(body);
        self.scopes.pop();
        flow
    }

    fn exec_loop_body(
        &mut self,
        var: &str,
        value: Value,
        body: &[Stmt],
    ) -> Result<Flow, EvalError> {
        let mut scope = HashMap::new();
        scope.insert(var.to_string(), value);
        self.scopes.push(scope);
        let flow = self.exec_block(body);
        self.scopes.pop();
        flow
    }

    // Assignment.

    fn assign(&mut self, target: &Expr, op: AssignOp, value: Value) -> Result<(), EvalError> {
        let (root, segs) = self.resolve_path(target)?;

        let scope_idx = self
            .scopes
            .iter()
            .rposition(|scope| scope.contains_key(&root));
        let scope_idx = match scope_idx {
            Some(idx) => idx,
            None => {
                if self.ctx.contains_key(&root) {
                    return Err(EvalError::Type(format!(
                        "'{}' belongs to the render context, which is read-only",
                        root
                    )));
                }
                if !segs.is_empty() {
                    return Err(EvalError::UndefinedVariable(root));
                }
                // Undeclared plain assignment declares in the current scope.
                let idx = self.scopes.len() - 1;
                self.scopes[idx].insert(root.clone(), Value::Null);
                idx
            }
        };

        let slot = self.scopes[scope_idx]
            .get_mut(&root)
            .expect("slot just located");
        let place = navigate(slot, &segs)?;
        *place = match op {
            AssignOp::Set => value,
            AssignOp::Add => js_add(place, &value),
        };
        Ok(())
    }

    /// Flatten a member/index chain into a root identifier plus path
    /// segments, evaluating index expressions along the way.
    fn resolve_path(&mut self, target: &Expr) -> Result<(String, Vec<Seg>), EvalError> {
        let mut segs = Vec::new();
        let mut node = target;
        loop {
            match node {
                Expr::Ident(name) => {
                    segs.reverse();
                    return Ok((name.clone(), segs));
                }
                Expr::Member { object, property } => {
                    segs.push(Seg::Key(property.clone()));
                    node = object;
                }
                Expr::Index { object, index } => {
                    let index = self.eval(index)?;
                    segs.push(match index {
                        Value::String(key) => Seg::Key(key),
                        Value::Number(n) => Seg::Idx(n.as_f64().unwrap_or(0.0) as usize),
                        other => {
                            return Err(EvalError::Type(format!(
                                "{} is not a valid index",
                                type_name(&other)
                            )))
                        }
                    });
                    node = object;
                }
                _ => {
                    return Err(EvalError::Type(
                        "invalid assignment target".to_string(),
                    ))
                }
            }
        }
    }

    // Expressions.

    fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Num(n) => Ok(num_value(*n)),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval(element)?);
                }
                Ok(Value::Array(items))
            }
            Expr::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let value = self.eval(value)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::Object(map))
            }
            Expr::Ident(name) => self.lookup(name),
            Expr::Member { object, property } => {
                let object = self.eval(object)?;
                property_of(&object, property)
            }
            Expr::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                index_of(&object, &index)
            }
            Expr::Call { callee, args } => match callee.as_ref() {
                Expr::Member { object, property } => self.call_method(object, property, args),
                other => Err(EvalError::Type(format!(
                    "{:?} is not callable; only method calls are supported",
                    other
                ))),
            },
            Expr::Arrow { .. } => Err(EvalError::Type(
                "functions may only appear as method callbacks".to_string(),
            )),
            Expr::Unary { op, expr } => {
                let value = self.eval(expr)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!truthy(&value)),
                    UnaryOp::Neg => num_value(-to_number(&value)),
                })
            }
            Expr::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs),
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.eval(cond)?;
                if truthy(&cond) {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Ok(value.clone());
            }
        }
        if let Some(value) = self.ctx.get(name) {
            return Ok(value.clone());
        }
        Err(EvalError::UndefinedVariable(name.to_string()))
    }

    fn eval_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Value, EvalError> {
        // Logical operators short-circuit and yield an operand value.
        match op {
            BinaryOp::And => {
                let lhs = self.eval(lhs)?;
                if !truthy(&lhs) {
                    return Ok(lhs);
                }
                return self.eval(rhs);
            }
            BinaryOp::Or => {
                let lhs = self.eval(lhs)?;
                if truthy(&lhs) {
                    return Ok(lhs);
                }
                return self.eval(rhs);
            }
            _ => {}
        }

        let lhs = self.eval(lhs)?;
        let rhs = self.eval(rhs)?;
        Ok(match op {
            BinaryOp::Add => js_add(&lhs, &rhs),
            BinaryOp::Sub => num_value(to_number(&lhs) - to_number(&rhs)),
            BinaryOp::Mul => num_value(to_number(&lhs) * to_number(&rhs)),
            BinaryOp::Div => num_value(to_number(&lhs) / to_number(&rhs)),
            BinaryOp::Rem => num_value(to_number(&lhs) % to_number(&rhs)),
            BinaryOp::Eq => Value::Bool(values_equal(&lhs, &rhs)),
            BinaryOp::NotEq => Value::Bool(!values_equal(&lhs, &rhs)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let ordering = if let (Value::String(a), Value::String(b)) = (&lhs, &rhs) {
                    a.partial_cmp(b)
                } else {
                    to_number(&lhs).partial_cmp(&to_number(&rhs))
                };
                let result = match (op, ordering) {
                    (_, None) => false,
                    (BinaryOp::Lt, Some(o)) => o.is_lt(),
                    (BinaryOp::Le, Some(o)) => o.is_le(),
                    (BinaryOp::Gt, Some(o)) => o.is_gt(),
                    (BinaryOp::Ge, Some(o)) => o.is_ge(),
                    _ => unreachable!(),
                };
                Value::Bool(result)
            }
            BinaryOp::And | BinaryOp::Or => unreachable!(),
        })
    }

    // Method dispatch.

    fn call_method(
        &mut self,
        object: &Expr,
        method: &str,
        args: &[Expr],
    ) -> Result<Value, EvalError> {
        if method == "push" {
            return self.call_push(object, args);
        }
        let recv = self.eval(object)?;
        match recv {
            Value::String(s) => self.string_method(&s, method, args),
            Value::Array(items) => self.array_method(items, method, args),
            other => Err(EvalError::Type(format!(
                "cannot call '{}' on {}",
                method,
                type_name(&other)
            ))),
        }
    }

    /// `push` mutates in place, so the receiver must be an assignable path.
    fn call_push(&mut self, object: &Expr, args: &[Expr]) -> Result<Value, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }
        let (root, segs) = self.resolve_path(object)?;

        let scope_idx = self
            .scopes
            .iter()
            .rposition(|scope| scope.contains_key(&root))
            .ok_or_else(|| {
                if self.ctx.contains_key(&root) {
                    EvalError::Type(format!(
                        "'{}' belongs to the render context, which is read-only",
                        root
                    ))
                } else {
                    EvalError::UndefinedVariable(root.clone())
                }
            })?;
        let slot = self.scopes[scope_idx]
            .get_mut(&root)
            .expect("slot just located");
        let place = navigate(slot, &segs)?;
        match place {
            Value::Array(items) => {
                items.extend(values);
                Ok(num_value(items.len() as f64))
            }
            other => Err(EvalError::Type(format!(
                "cannot push onto {}",
                type_name(other)
            ))),
        }
    }

    fn string_method(&mut self, s: &str, method: &str, args: &[Expr]) -> Result<Value, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }
        let arg_str = |i: usize| -> String {
            values
                .get(i)
                .map(js_display)
                .unwrap_or_default()
        };
        Ok(match method {
            "split" => match values.first() {
                None => Value::Array(vec![Value::String(s.to_string())]),
                Some(sep) => {
                    let sep = js_display(sep);
                    let parts: Vec<Value> = if sep.is_empty() {
                        s.chars().map(|c| Value::String(c.to_string())).collect()
                    } else {
                        s.split(&sep)
                            .map(|p| Value::String(p.to_string()))
                            .collect()
                    };
                    Value::Array(parts)
                }
            },
            // replaces the first occurrence only
            "replace" => Value::String(replace_first(s, &arg_str(0), &arg_str(1))),
            "slice" => {
                let chars: Vec<char> = s.chars().collect();
                let (start, end) = slice_bounds(&values, chars.len());
                Value::String(chars[start..end].iter().collect())
            }
            "includes" => Value::Bool(s.contains(&arg_str(0))),
            "indexOf" => match s.find(&arg_str(0)) {
                Some(pos) => num_value(s[..pos].chars().count() as f64),
                None => num_value(-1.0),
            },
            "trim" => Value::String(s.trim().to_string()),
            "toUpperCase" => Value::String(s.to_uppercase()),
            "toLowerCase" => Value::String(s.to_lowercase()),
            "charAt" => {
                let idx = values.first().map(to_number).unwrap_or(0.0) as usize;
                Value::String(s.chars().nth(idx).map(String::from).unwrap_or_default())
            }
            "startsWith" => Value::Bool(s.starts_with(&arg_str(0))),
            "endsWith" => Value::Bool(s.ends_with(&arg_str(0))),
            _ => {
                return Err(EvalError::Type(format!(
                    "'{}' is not a string method",
                    method
                )))
            }
        })
    }

    fn array_method(
        &mut self,
        items: Vec<Value>,
        method: &str,
        args: &[Expr],
    ) -> Result<Value, EvalError> {
        match method {
            "find" | "filter" | "map" | "forEach" => {
                let (params, body) = callback(method, args)?;
                let mut mapped = Vec::new();
                for (idx, item) in items.iter().enumerate() {
                    let call_args = vec![item.clone(), num_value(idx as f64)];
                    let result = self.call_arrow(params, body, call_args)?;
                    match method {
                        "find" => {
                            if truthy(&result) {
                                return Ok(item.clone());
                            }
                        }
                        "filter" => {
                            if truthy(&result) {
                                mapped.push(item.clone());
                            }
                        }
                        "map" => mapped.push(result),
                        _ => {}
                    }
                }
                Ok(match method {
                    "find" | "forEach" => Value::Null,
                    _ => Value::Array(mapped),
                })
            }
            _ => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                Ok(match method {
                    "join" => {
                        let sep = values
                            .first()
                            .map(js_display)
                            .unwrap_or_else(|| ",".to_string());
                        let parts: Vec<String> = items.iter().map(js_display).collect();
                        Value::String(parts.join(&sep))
                    }
                    "includes" => Value::Bool(
                        values
                            .first()
                            .map(|needle| items.iter().any(|item| values_equal(item, needle)))
                            .unwrap_or(false),
                    ),
                    "indexOf" => values
                        .first()
                        .and_then(|needle| items.iter().position(|item| values_equal(item, needle)))
                        .map(|pos| num_value(pos as f64))
                        .unwrap_or_else(|| num_value(-1.0)),
                    "slice" => {
                        let (start, end) = slice_bounds(&values, items.len());
                        Value::Array(items[start..end].to_vec())
                    }
                    "concat" => {
                        let mut out = items;
                        for value in values {
                            match value {
                                Value::Array(more) => out.extend(more),
                                single => out.push(single),
                            }
                        }
                        Value::Array(out)
                    }
                    _ => {
                        return Err(EvalError::Type(format!(
                            "'{}' is not an array method",
                            method
                        )))
                    }
                })
            }
        }
    }

    fn call_arrow(
        &mut self,
        params: &[String],
        body: &ArrowBody,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        let mut scope = HashMap::new();
        for (idx, param) in params.iter().enumerate() {
            scope.insert(
                param.clone(),
                args.get(idx).cloned().unwrap_or(Value::Null),
            );
        }
        self.scopes.push(scope);
        let result = match body {
            ArrowBody::Expr(expr) => self.eval(expr),
            ArrowBody::Block(stmts) => self.exec_block(stmts).map(|flow| match flow {
                Flow::Return(value) => value,
                Flow::Normal => Value::Null,
            }),
        };
        self.scopes.pop();
        result
    }
}

/// The first argument of a callback-taking method, which must be an arrow
/// written directly at the call site.
fn callback<'e>(method: &str, args: &'e [Expr]) -> Result<(&'e [String], &'e ArrowBody), EvalError> {
    match args.first() {
        Some(Expr::Arrow { params, body }) => Ok((params, body)),
        _ => Err(EvalError::Type(format!(
            "'{}' expects an inline arrow callback",
            method
        ))),
    }
}

/// Walk path segments to a mutable slot, creating missing object keys and
/// padding arrays on the way.
fn navigate<'v>(mut slot: &'v mut Value, segs: &[Seg]) -> Result<&'v mut Value, EvalError> {
    for seg in segs {
        slot = match (slot, seg) {
            (Value::Object(map), Seg::Key(key)) => {
                map.entry(key.clone()).or_insert(Value::Null)
            }
            (Value::Object(map), Seg::Idx(idx)) => {
                map.entry(idx.to_string()).or_insert(Value::Null)
            }
            (Value::Array(items), Seg::Idx(idx)) => {
                if *idx >= items.len() {
                    items.resize(idx + 1, Value::Null);
                }
                &mut items[*idx]
            }
            (other, _) => {
                return Err(EvalError::Type(format!(
                    "cannot set a property on {}",
                    type_name(other)
                )))
            }
        };
    }
    Ok(slot)
}

fn property_of(object: &Value, property: &str) -> Result<Value, EvalError> {
    Ok(match object {
        Value::Object(map) => map.get(property).cloned().unwrap_or(Value::Null),
        Value::Array(items) if property == "length" => num_value(items.len() as f64),
        Value::String(s) if property == "length" => num_value(s.chars().count() as f64),
        Value::Null => {
            return Err(EvalError::Type(format!(
                "cannot read '{}' of null",
                property
            )))
        }
        _ => Value::Null,
    })
}

fn index_of(object: &Value, index: &Value) -> Result<Value, EvalError> {
    Ok(match (object, index) {
        (Value::Array(items), Value::Number(n)) => {
            let idx = n.as_f64().unwrap_or(-1.0);
            if idx >= 0.0 {
                items.get(idx as usize).cloned().unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        (Value::Object(map), key) => map
            .get(&js_display(key))
            .cloned()
            .unwrap_or(Value::Null),
        (Value::String(s), Value::Number(n)) => {
            let idx = n.as_f64().unwrap_or(-1.0);
            if idx >= 0.0 {
                s.chars()
                    .nth(idx as usize)
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        (Value::Null, _) => {
            return Err(EvalError::Type("cannot index into null".to_string()))
        }
        _ => Value::Null,
    })
}

/// `start`/`end` arguments of a `slice` call, clamped, negatives counted
/// from the end.
fn slice_bounds(values: &[Value], len: usize) -> (usize, usize) {
    let resolve = |v: Option<&Value>, default: usize| -> usize {
        match v {
            None => default,
            Some(v) => {
                let n = to_number(v);
                if n < 0.0 {
                    len.saturating_sub((-n) as usize)
                } else {
                    (n as usize).min(len)
                }
            }
        }
    };
    let start = resolve(values.first(), 0);
    let end = resolve(values.get(1), len);
    (start, end.max(start))
}

fn js_add(lhs: &Value, rhs: &Value) -> Value {
    if lhs.is_string() || rhs.is_string() {
        Value::String(format!("{}{}", js_display(lhs), js_display(rhs)))
    } else {
        num_value(to_number(lhs) + to_number(rhs))
    }
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => lhs == rhs,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => {
            let n = n.as_f64().unwrap_or(f64::NAN);
            n != 0.0 && !n.is_nan()
        }
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Store integral results as JSON integers so they print without a fraction.
fn num_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Interpolation text for a value. Null renders empty; arrays join their
/// elements with commas.
fn js_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() == 0.0 && f.is_finite() && f.abs() < i64::MAX as f64 {
                    (f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(js_display).collect();
            parts.join(",")
        }
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
