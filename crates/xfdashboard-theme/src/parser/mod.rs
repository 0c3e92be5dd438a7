//! Stylesheet parsing.

mod comments;
mod css_parser;
mod error;

pub(crate) use css_parser::{Statement, parse_stylesheet};
pub use css_parser::parse_selector;
pub use error::SyntaxError;
