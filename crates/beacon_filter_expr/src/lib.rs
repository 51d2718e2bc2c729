//! Declarative filter expressions for the Beacon dispatch engine.
//!
//! Subscriptions usually filter with closures, but configuration-driven
//! setups want filters as strings: `"id % 2 != 0"`, `"topic == 'alerts'"`.
//! This crate compiles such strings into [`ExprFilter`] values implementing
//! [`beacon_pubsub::Filter`] for any message type.
//!
//! Expressions see two variables: `id` (the message's integer id) and
//! `topic` (its topic string, or `null` when the message has none). The
//! operator set is C-like: `|| && ! == != < <= > >= + - * / %`, with
//! integer and quoted string literals, `true`, `false`, and `null`.
//!
//! A filter passes only when its expression evaluates to `true`. Anything
//! else — `false`, a non-boolean result, a type mismatch, division by
//! zero — rejects the message. Malformed sources are rejected up front:
//!
//! ```
//! use beacon_filter_expr::compile;
//!
//! assert!(compile("id % 2 == 0").is_ok());
//! assert!(compile("id ==").is_err());
//! ```

mod ast;
mod lexer;
mod parser;

use beacon_pubsub::{ConfigError, Filter, Message, SubscriberId};

use crate::ast::{Expr, Value};

/// Error raised while compiling a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("unexpected character '{ch}' at byte {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unterminated string literal starting at byte {pos}")]
    UnterminatedString { pos: usize },
    #[error("integer literal at byte {pos} does not fit in i64")]
    IntOutOfRange { pos: usize },
    #[error("unknown variable '{name}' at byte {pos}")]
    UnknownVariable { name: String, pos: usize },
    #[error("unexpected token '{found}' at byte {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("expression ended unexpectedly")]
    UnexpectedEnd,
}

impl From<ExprError> for ConfigError {
    fn from(err: ExprError) -> Self {
        ConfigError::InvalidFilter(err.to_string())
    }
}

/// Compiles an expression source into a reusable filter.
pub fn compile(source: &str) -> Result<ExprFilter, ExprError> {
    let expr = parser::parse(source)?;
    Ok(ExprFilter {
        source: source.to_string(),
        expr,
    })
}

/// A compiled filter expression.
///
/// Cheap to evaluate and safe to share; one compiled filter can back
/// subscriptions on any message type.
#[derive(Debug, Clone)]
pub struct ExprFilter {
    source: String,
    expr: Expr,
}

impl ExprFilter {
    /// The source string this filter was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl<M: Message> Filter<M> for ExprFilter {
    fn accepts(&self, _owner: SubscriberId, _method: &str, message: &M) -> bool {
        matches!(
            self.expr.eval(message.id(), message.topic()),
            Some(Value::Bool(true))
        )
    }
}
