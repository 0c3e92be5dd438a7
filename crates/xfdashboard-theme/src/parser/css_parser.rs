//! Stylesheet grammar on top of the `cssparser` tokenizer.
//!
//! A stylesheet is a sequence of statements:
//!
//! ```text
//! @constants { name: value; ... }
//! selector, selector ... { name: value; ... }
//! @import(path);          @import "path";
//! ```
//!
//! Property values are kept as raw text up to the terminating `;`. They are
//! resolved later, when a rule is applied, so `@name` references and style
//! functions survive parsing untouched.

use std::sync::Arc;

use cssparser::{Delimiter, Parser, ParserInput, SourceLocation, Token};
use xfdashboard_core::unquote;

use super::comments::strip_comments;
use super::error::{ParseResult, SyntaxError, to_error};
use crate::Result;
use crate::rules::{PropertyMap, PropertyValue, Rule};
use crate::selector::{Combinator, Selector, SelectorPart, TypeSelector};

/// A top-level stylesheet statement, in source order.
#[derive(Debug, Clone)]
pub(crate) enum Statement {
    /// A selector rule or a constants block.
    Rule(Rule),
    /// An `@import` directive to be spliced in at this position.
    Import {
        target: String,
        line: u32,
        column: u32,
    },
}

/// Parse stylesheet text into statements.
///
/// Parsing stops at the first error; nothing is returned for the text in
/// that case. Every rule is stamped with `source_name` and `priority`.
pub(crate) fn parse_stylesheet(text: &str, source_name: &str, priority: i32) -> Result<Vec<Statement>> {
    let cleaned = strip_comments(text);
    let mut input = ParserInput::new(&cleaned);
    let mut parser = Parser::new(&mut input);
    let source: Arc<str> = Arc::from(source_name);

    let result = parse_statements(&mut parser, &source, priority);
    match result {
        Ok(statements) => {
            tracing::trace!(
                target: "xfdashboard_theme::parser",
                source = source_name,
                statements = statements.len(),
                "parsed"
            );
            Ok(statements)
        }
        Err(e) => Err(to_error(source_name, e)),
    }
}

/// Parse a single selector such as `Stage > Button.primary:hover`.
pub fn parse_selector(text: &str) -> Result<Selector> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let result = parser.parse_entirely(parse_complex_selector);
    result.map_err(|e| to_error("<selector>", e))
}

fn parse_statements<'i>(
    parser: &mut Parser<'i, '_>,
    source: &Arc<str>,
    priority: i32,
) -> ParseResult<'i, Vec<Statement>> {
    let mut statements = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let location = parser.current_source_location();
        let state = parser.state();
        let token = parser.next()?.clone();

        match token {
            Token::AtKeyword(ref name) if name.eq_ignore_ascii_case("constants") => {
                let block_location = parser.current_source_location();
                let is_block = matches!(parser.next(), Ok(Token::CurlyBracketBlock));
                if !is_block {
                    return Err(block_location.new_custom_error(SyntaxError::new(
                        "@constants must be followed by a block and cannot be combined with selectors",
                    )));
                }
                let properties = parser.parse_nested_block(|block| parse_declarations(block, source))?;
                statements.push(Statement::Rule(Rule::constants(
                    Arc::new(properties),
                    source.clone(),
                    location.line + 1,
                    location.column,
                    priority,
                )));
            }
            Token::AtKeyword(ref name) if name.eq_ignore_ascii_case("import") => {
                let target = parse_import_target(parser)?;
                let terminated = matches!(parser.next(), Ok(Token::Semicolon));
                if !terminated {
                    return Err(parser.new_custom_error(SyntaxError::new("expected ';' after @import")));
                }
                statements.push(Statement::Import {
                    target,
                    line: location.line + 1,
                    column: location.column,
                });
            }
            Token::AtKeyword(name) => {
                return Err(location.new_custom_error(SyntaxError::new(format!(
                    "unknown directive '@{name}'"
                ))));
            }
            _ => {
                parser.reset(&state);
                let selectors = parser.parse_until_before(Delimiter::CurlyBracketBlock, parse_selector_list)?;
                let is_block = matches!(parser.next(), Ok(Token::CurlyBracketBlock));
                if !is_block {
                    return Err(parser.new_custom_error(SyntaxError::new("expected '{' after selector")));
                }
                let properties = Arc::new(parser.parse_nested_block(|block| parse_declarations(block, source))?);
                for (selector, at) in selectors {
                    statements.push(Statement::Rule(Rule::selector(
                        selector,
                        properties.clone(),
                        source.clone(),
                        at.line + 1,
                        at.column,
                        priority,
                    )));
                }
            }
        }
    }

    Ok(statements)
}

/// `(path)`, `"path"` or `url(path)` after `@import`.
fn parse_import_target<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, String> {
    let location = parser.current_source_location();
    let target = match parser.next()?.clone() {
        Token::ParenthesisBlock => unquote(&parser.parse_nested_block(remaining_text)?).to_string(),
        Token::QuotedString(path) | Token::UnquotedUrl(path) => path.to_string(),
        Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
            parser.parse_nested_block(quoted_string)?
        }
        token => {
            return Err(location.new_custom_error(SyntaxError::unexpected(&token, "after @import")));
        }
    };

    if target.is_empty() {
        return Err(location.new_custom_error(SyntaxError::new("empty @import path")));
    }
    Ok(target)
}

/// Comma-separated selectors, each with the location it starts at.
fn parse_selector_list<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Vec<(Selector, SourceLocation)>> {
    let mut selectors = Vec::new();
    loop {
        parser.skip_whitespace();
        let location = parser.current_source_location();
        let selector = parser.parse_until_before(Delimiter::Comma, parse_complex_selector)?;
        selectors.push((selector, location));
        if parser.next().is_err() {
            break;
        }
    }
    Ok(selectors)
}

/// One selector: parts joined by whitespace or `>`.
fn parse_complex_selector<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Selector> {
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut combinators = Vec::new();
    let mut current = SelectorPart::default();
    let mut pending: Option<Combinator> = None;

    parser.skip_whitespace();
    loop {
        let location = parser.current_source_location();
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                    pending = Some(Combinator::Descendant);
                }
                continue;
            }
            Token::Delim('>') => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                    pending = Some(Combinator::Child);
                } else {
                    match pending {
                        Some(Combinator::Descendant) => pending = Some(Combinator::Child),
                        Some(Combinator::Child) => {
                            return Err(location.new_custom_error(SyntaxError::new("repeated '>' combinator")));
                        }
                        None => {
                            return Err(location.new_custom_error(SyntaxError::new(
                                "'>' without a preceding selector",
                            )));
                        }
                    }
                }
                continue;
            }
            _ => {}
        }

        if current.is_empty()
            && let Some(combinator) = pending.take()
        {
            combinators.push(combinator);
        }

        match token {
            Token::Ident(name) => {
                if !current.is_empty() {
                    return Err(location.new_custom_error(SyntaxError::new(format!(
                        "type name '{name}' must start a selector part"
                    ))));
                }
                current.type_selector = Some(TypeSelector::Type(name.to_string()));
            }
            Token::Delim('*') => {
                if !current.is_empty() {
                    return Err(location.new_custom_error(SyntaxError::new("'*' must start a selector part")));
                }
                current.type_selector = Some(TypeSelector::Universal);
            }
            Token::IDHash(id) => {
                if current.id.is_some() {
                    return Err(location.new_custom_error(SyntaxError::new(format!(
                        "second id '#{id}' in one selector part"
                    ))));
                }
                current.id = Some(id.to_string());
            }
            Token::Delim('.') => {
                let class = expect_ident(parser, "after '.'")?;
                current.classes.push(class);
            }
            Token::Colon => {
                let pseudo = expect_ident(parser, "after ':'")?;
                current.pseudo_classes.push(pseudo);
            }
            Token::AtKeyword(ref name) if name.eq_ignore_ascii_case("constants") => {
                return Err(location.new_custom_error(SyntaxError::new(
                    "@constants cannot be combined with selectors",
                )));
            }
            token => {
                return Err(location.new_custom_error(SyntaxError::unexpected(&token, "in selector")));
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    } else if pending == Some(Combinator::Child) {
        return Err(parser.new_custom_error(SyntaxError::new("selector ends with '>'")));
    }

    if parts.is_empty() {
        return Err(parser.new_custom_error(SyntaxError::new("empty selector")));
    }
    debug_assert_eq!(combinators.len() + 1, parts.len());

    Ok(Selector { parts, combinators })
}

/// An identifier directly following the previous token.
fn expect_ident<'i>(parser: &mut Parser<'i, '_>, context: &str) -> ParseResult<'i, String> {
    let location = parser.current_source_location();
    match parser.next_including_whitespace() {
        Ok(Token::Ident(name)) => Ok(name.to_string()),
        Ok(token) => {
            let token = token.clone();
            Err(location.new_custom_error(SyntaxError::new(format!(
                "expected a name {context}, found '{}'",
                token_text(&token)
            ))))
        }
        Err(_) => Err(location.new_custom_error(SyntaxError::new(format!("expected a name {context}")))),
    }
}

/// `name: value;` declarations of a block.
fn parse_declarations<'i>(parser: &mut Parser<'i, '_>, source: &Arc<str>) -> ParseResult<'i, PropertyMap> {
    let mut properties = PropertyMap::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let location = parser.current_source_location();
        let name = match parser.next()?.clone() {
            Token::Ident(name) => name.to_string(),
            token => {
                return Err(location.new_custom_error(SyntaxError::unexpected(
                    &token,
                    "where a property name was expected",
                )));
            }
        };

        if parser.expect_colon().is_err() {
            return Err(parser.new_custom_error(SyntaxError::new(format!(
                "expected ':' after property '{name}'"
            ))));
        }

        let value_location = parser.current_source_location();
        let value = parser.parse_until_before(Delimiter::Semicolon, remaining_text)?;
        if value.is_empty() {
            return Err(value_location.new_custom_error(SyntaxError::new(format!(
                "property '{name}' has no value"
            ))));
        }

        let terminated = matches!(parser.next(), Ok(Token::Semicolon));
        if !terminated {
            return Err(parser.new_custom_error(SyntaxError::new(format!(
                "missing ';' after property '{name}'"
            ))));
        }

        properties.insert(
            name,
            PropertyValue::new(value, source.clone(), location.line + 1, location.column),
        );
    }

    Ok(properties)
}

/// The rest of the (delimited) input as trimmed source text.
fn remaining_text<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, String> {
    let start = parser.position();
    while parser.next_including_whitespace().is_ok() {}
    Ok(parser.slice_from(start).trim().to_string())
}

fn quoted_string<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, String> {
    Ok(parser.expect_string()?.to_string())
}

fn token_text(token: &Token<'_>) -> String {
    use cssparser::ToCss;
    match token {
        Token::WhiteSpace(_) => "whitespace".into(),
        other => other.to_css_string(),
    }
}
