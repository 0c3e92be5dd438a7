//! Property value evaluation.

mod functions;
mod resolver;

pub use functions::{FunctionContext, FunctionTable, StyleFunction};
pub use resolver::{DEFAULT_RECURSION_LIMIT, Evaluator, MAX_VALUE_LEN};
