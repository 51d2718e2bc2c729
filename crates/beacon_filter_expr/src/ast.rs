//! Expression tree and evaluation.
//!
//! Evaluation is total: anything that would be a runtime fault — a type
//! mismatch, division by zero, ordering against null — evaluates to `None`,
//! which the filter treats as rejection. A declarative filter must never
//! take down a `notify` call.

/// One node of a parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Int(i64),
    Str(String),
    Bool(bool),
    Null,
    /// The message's integer id
    Id,
    /// The message's topic (string, or null when absent)
    Topic,
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Runtime value of a subexpression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value<'a> {
    Int(i64),
    Str(&'a str),
    Bool(bool),
    Null,
}

impl Expr {
    /// Evaluates the expression against a message's identity fields.
    pub(crate) fn eval<'a>(&'a self, id: i64, topic: Option<&'a str>) -> Option<Value<'a>> {
        match self {
            Expr::Int(value) => Some(Value::Int(*value)),
            Expr::Str(value) => Some(Value::Str(value)),
            Expr::Bool(value) => Some(Value::Bool(*value)),
            Expr::Null => Some(Value::Null),
            Expr::Id => Some(Value::Int(id)),
            Expr::Topic => Some(match topic {
                Some(topic) => Value::Str(topic),
                None => Value::Null,
            }),
            Expr::Unary(op, operand) => match (op, operand.eval(id, topic)?) {
                (UnaryOp::Not, Value::Bool(value)) => Some(Value::Bool(!value)),
                (UnaryOp::Neg, Value::Int(value)) => Some(Value::Int(value.checked_neg()?)),
                _ => None,
            },
            Expr::Binary(BinaryOp::Or, lhs, rhs) => match lhs.eval(id, topic)? {
                Value::Bool(true) => Some(Value::Bool(true)),
                Value::Bool(false) => match rhs.eval(id, topic)? {
                    Value::Bool(value) => Some(Value::Bool(value)),
                    _ => None,
                },
                _ => None,
            },
            Expr::Binary(BinaryOp::And, lhs, rhs) => match lhs.eval(id, topic)? {
                Value::Bool(false) => Some(Value::Bool(false)),
                Value::Bool(true) => match rhs.eval(id, topic)? {
                    Value::Bool(value) => Some(Value::Bool(value)),
                    _ => None,
                },
                _ => None,
            },
            Expr::Binary(op, lhs, rhs) => {
                let lhs = lhs.eval(id, topic)?;
                let rhs = rhs.eval(id, topic)?;
                apply_binary(*op, lhs, rhs)
            }
        }
    }
}

fn apply_binary<'a>(op: BinaryOp, lhs: Value<'a>, rhs: Value<'a>) -> Option<Value<'a>> {
    match op {
        // equality is defined across all value kinds; values of different
        // kinds (e.g. a null topic against a string) are simply unequal
        BinaryOp::Eq => Some(Value::Bool(values_equal(&lhs, &rhs))),
        BinaryOp::Ne => Some(Value::Bool(!values_equal(&lhs, &rhs))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let (Value::Int(lhs), Value::Int(rhs)) = (lhs, rhs) else {
                return None;
            };
            let result = match op {
                BinaryOp::Lt => lhs < rhs,
                BinaryOp::Le => lhs <= rhs,
                BinaryOp::Gt => lhs > rhs,
                _ => lhs >= rhs,
            };
            Some(Value::Bool(result))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (Value::Int(lhs), Value::Int(rhs)) = (lhs, rhs) else {
                return None;
            };
            let result = match op {
                BinaryOp::Add => lhs.checked_add(rhs)?,
                BinaryOp::Sub => lhs.checked_sub(rhs)?,
                BinaryOp::Mul => lhs.checked_mul(rhs)?,
                BinaryOp::Div => lhs.checked_div(rhs)?,
                _ => lhs.checked_rem(rhs)?,
            };
            Some(Value::Int(result))
        }
        BinaryOp::Or | BinaryOp::And => None,
    }
}

fn values_equal(lhs: &Value<'_>, rhs: &Value<'_>) -> bool {
    match (lhs, rhs) {
        (Value::Int(lhs), Value::Int(rhs)) => lhs == rhs,
        (Value::Str(lhs), Value::Str(rhs)) => lhs == rhs,
        (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &Expr) -> Option<Value<'_>> {
        expr.eval(4, Some("four"))
    }

    #[test]
    fn arithmetic_respects_checked_semantics() {
        let div_by_zero = Expr::Binary(
            BinaryOp::Div,
            Box::new(Expr::Int(1)),
            Box::new(Expr::Int(0)),
        );
        assert_eq!(eval(&div_by_zero), None);

        let rem = Expr::Binary(BinaryOp::Rem, Box::new(Expr::Id), Box::new(Expr::Int(2)));
        assert_eq!(eval(&rem), Some(Value::Int(0)));
    }

    #[test]
    fn null_equality_is_kind_aware() {
        let topic_is_null = Expr::Binary(BinaryOp::Eq, Box::new(Expr::Topic), Box::new(Expr::Null));
        assert_eq!(
            topic_is_null.eval(1, None),
            Some(Value::Bool(true))
        );
        assert_eq!(
            topic_is_null.eval(1, Some("one")),
            Some(Value::Bool(false))
        );
    }

    #[test]
    fn ordering_against_a_string_rejects() {
        let bad = Expr::Binary(BinaryOp::Lt, Box::new(Expr::Topic), Box::new(Expr::Int(1)));
        assert_eq!(eval(&bad), None);
    }
}
