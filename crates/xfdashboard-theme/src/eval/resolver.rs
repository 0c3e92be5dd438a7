//! `@name` substitution and function evaluation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::rules::{PropertyValue, Rule};
use crate::{Error, Result};

use super::functions::{FunctionContext, FunctionTable};

const TARGET: &str = "xfdashboard_theme::eval";

/// Default ceiling on nested resolution.
pub const DEFAULT_RECURSION_LIMIT: usize = 128;

/// Longest resolved value, in bytes.
pub const MAX_VALUE_LEN: usize = 64 * 1024;

/// Resolves raw property values into literal text.
///
/// A value is scanned left to right. Quoted strings are copied untouched.
/// `@name(args)` calls a style function, and so does a bare `name(args)` when
/// `name` is registered. Any other `@name` is replaced by the constant of that
/// name, which is resolved again in turn.
///
/// Constants are looked up in the `@constants` blocks of the file the value
/// came from, newest first, then in every loaded block, newest first.
///
/// Each constant is resolved at most once per evaluator, and no value may
/// grow past [`MAX_VALUE_LEN`].
#[derive(Debug)]
pub struct Evaluator<'a> {
    functions: &'a FunctionTable,
    context: FunctionContext<'a>,
    constants: Vec<&'a Rule>,
    limit: usize,
    /// Resolved constants keyed by name and defining file.
    resolved: RefCell<HashMap<(String, Arc<str>), String>>,
}

impl<'a> Evaluator<'a> {
    /// An evaluator over the constants blocks among `rules`, in load order.
    pub fn new(
        functions: &'a FunctionTable,
        context: FunctionContext<'a>,
        rules: impl IntoIterator<Item = &'a Rule>,
        limit: usize,
    ) -> Self {
        Self {
            functions,
            context,
            constants: rules.into_iter().filter(|rule| rule.is_constants()).collect(),
            limit,
            resolved: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a declared value in the scope of the file it was written in.
    pub fn resolve_value(&self, value: &PropertyValue) -> Result<String> {
        self.resolve(&value.value, Some(&*value.source))
    }

    /// Resolve `text` as if it appeared in `source`.
    pub fn resolve(&self, text: &str, source: Option<&str>) -> Result<String> {
        self.resolve_guarded(text, None, 0, source)
    }

    /// The constant `name` visible from `source`.
    pub fn lookup_constant(&self, name: &str, source: Option<&str>) -> Option<&'a PropertyValue> {
        let local = self
            .constants
            .iter()
            .rev()
            .copied()
            .filter(|rule| source.is_some_and(|s| &*rule.source == s));
        let global = self.constants.iter().rev().copied();
        local
            .chain(global)
            .find_map(|rule| rule.properties.get(name))
    }

    fn resolve_guarded(&self, text: &str, guard: Option<&str>, depth: usize, source: Option<&str>) -> Result<String> {
        if depth > self.limit {
            return Err(Error::RecursionLimit { limit: self.limit });
        }

        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < text.len() {
            if out.len() > MAX_VALUE_LEN {
                return Err(Error::ValueTooLong { limit: MAX_VALUE_LEN });
            }
            let rest = &text[i..];
            let Some(c) = rest.chars().next() else {
                break;
            };

            match c {
                '"' | '\'' => {
                    let end = quoted_end(rest);
                    out.push_str(&rest[..end]);
                    i += end;
                }
                '@' => {
                    let name = identifier(&rest[1..]);
                    if name.is_empty() {
                        return Err(Error::UnresolvableIdentifier { name: String::new() });
                    }
                    let after = i + 1 + name.len();
                    if text[after..].starts_with('(') {
                        let (result, end) = self.call(name, text, after, guard, depth, source)?;
                        out.push_str(&result);
                        i = end;
                    } else {
                        out.push_str(&self.substitute(name, guard, depth, source)?);
                        i = after;
                    }
                }
                c if is_identifier_start(c) && at_word_boundary(text, i) => {
                    let name = identifier(rest);
                    let after = i + name.len();
                    if text[after..].starts_with('(') && self.functions.contains(name) {
                        let (result, end) = self.call(name, text, after, guard, depth, source)?;
                        out.push_str(&result);
                        i = end;
                    } else {
                        out.push_str(name);
                        i = after;
                    }
                }
                c => {
                    out.push(c);
                    i += c.len_utf8();
                }
            }
        }

        if out.len() > MAX_VALUE_LEN {
            return Err(Error::ValueTooLong { limit: MAX_VALUE_LEN });
        }
        Ok(out)
    }

    /// Replace the constant `name`, resolving its value one level deeper.
    fn substitute(&self, name: &str, guard: Option<&str>, depth: usize, source: Option<&str>) -> Result<String> {
        if guard == Some(name) {
            return Err(Error::Recursion { name: name.to_string() });
        }
        let constant = self
            .lookup_constant(name, source)
            .ok_or_else(|| Error::UnresolvableIdentifier { name: name.to_string() })?;

        let key = (name.to_string(), Arc::clone(&constant.source));
        if let Some(cached) = self.resolved.borrow().get(&key) {
            return Ok(cached.clone());
        }

        let resolved = self.resolve_guarded(&constant.value, Some(name), depth + 1, Some(&*constant.source))?;
        tracing::trace!(target: TARGET, name, value = %resolved, depth, "substituted constant");
        self.resolved.borrow_mut().insert(key, resolved.clone());
        Ok(resolved)
    }

    /// Evaluate `name(...)` whose `(` is at byte `open`; returns the result
    /// and the byte index after `)`.
    fn call(
        &self,
        name: &str,
        text: &str,
        open: usize,
        guard: Option<&str>,
        depth: usize,
        source: Option<&str>,
    ) -> Result<(String, usize)> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| Error::function(name, "unknown function"))?;

        let close = matching_paren(text, open)
            .ok_or_else(|| Error::function(name, "unterminated argument list"))?;
        let inner = &text[open + 1..close];

        let args = split_arguments(inner)
            .into_iter()
            .map(|arg| {
                self.resolve_guarded(arg, guard, depth + 1, source)
                    .map(|resolved| resolved.trim().to_string())
            })
            .collect::<Result<Vec<_>>>()?;

        let result = function(&self.context, &args)?;
        tracing::trace!(target: TARGET, function = name, ?args, %result, "called function");
        Ok((result, close + 1))
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// The identifier at the start of `text`, possibly empty.
fn identifier(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|&(_, c)| !is_identifier_char(c))
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}

/// Whether `text[i..]` starts a new word, so `#abc(` or `x-rgb(` do not.
fn at_word_boundary(text: &str, i: usize) -> bool {
    text[..i]
        .chars()
        .next_back()
        .is_none_or(|c| !is_identifier_char(c) && c != '#' && c != '.')
}

/// Length of the quoted string at the start of `text`, quotes included.
///
/// An unterminated string runs to the end.
fn quoted_end(text: &str) -> usize {
    let mut chars = text.char_indices();
    let Some((_, quote)) = chars.next() else {
        return 0;
    };
    let mut escaped = false;
    for (i, c) in chars {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return i + c.len_utf8();
        }
    }
    text.len()
}

/// Index of the `)` matching the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < text.len() {
        let rest = &text[i..];
        let c = rest.chars().next()?;
        match c {
            '"' | '\'' => {
                i += quoted_end(rest);
                continue;
            }
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += c.len_utf8();
    }
    None
}

/// Split an argument list on commas outside parentheses and quotes.
fn split_arguments(inner: &str) -> Vec<&str> {
    if inner.trim().is_empty() {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < inner.len() {
        let rest = &inner[i..];
        let Some(c) = rest.chars().next() else {
            break;
        };
        match c {
            '"' | '\'' => {
                i += quoted_end(rest);
                continue;
            }
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += c.len_utf8();
    }
    args.push(inner[start..].trim());
    args
}
