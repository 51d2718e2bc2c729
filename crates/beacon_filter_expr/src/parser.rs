//! Recursive-descent parser for filter expressions.
//!
//! Precedence, loosest first: `||`, `&&`, comparisons, additive (`+ -`),
//! multiplicative (`* / %`), unary (`! -`), primary. All binary operators
//! are left-associative.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::lexer::{tokenize, Token};
use crate::ExprError;

/// Parses a source string into an expression tree.
pub(crate) fn parse(source: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, index: 0 };
    let expr = parser.or_expr()?;
    match parser.peek() {
        Some((pos, token)) => Err(ExprError::UnexpectedToken {
            found: token.to_string(),
            pos: *pos,
        }),
        None => Ok(expr),
    }
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    index: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(usize, Token)> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// Consumes the next token if it matches, returns whether it did.
    fn eat(&mut self, expected: &Token) -> bool {
        if matches!(self.peek(), Some((_, token)) if token == expected) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.and_expr()?;
        while self.eat(&Token::OrOr) {
            let rhs = self.and_expr()?;
            lhs = Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.comparison()?;
        while self.eat(&Token::AndAnd) {
            let rhs = self.comparison()?;
            lhs = Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Some((_, Token::EqEq)) => BinaryOp::Eq,
                Some((_, Token::NotEq)) => BinaryOp::Ne,
                Some((_, Token::Lt)) => BinaryOp::Lt,
                Some((_, Token::Le)) => BinaryOp::Le,
                Some((_, Token::Gt)) => BinaryOp::Gt,
                Some((_, Token::Ge)) => BinaryOp::Ge,
                _ => break,
            };
            self.index += 1;
            let rhs = self.additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some((_, Token::Plus)) => BinaryOp::Add,
                Some((_, Token::Minus)) => BinaryOp::Sub,
                _ => break,
            };
            self.index += 1;
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some((_, Token::Star)) => BinaryOp::Mul,
                Some((_, Token::Slash)) => BinaryOp::Div,
                Some((_, Token::Percent)) => BinaryOp::Rem,
                _ => break,
            };
            self.index += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Bang) {
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(self.unary()?)));
        }
        if self.eat(&Token::Minus) {
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Some((_, Token::Int(value))) => Ok(Expr::Int(value)),
            Some((_, Token::Str(value))) => Ok(Expr::Str(value)),
            Some((pos, Token::Ident(name))) => match name.as_str() {
                "id" => Ok(Expr::Id),
                "topic" => Ok(Expr::Topic),
                "null" => Ok(Expr::Null),
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                _ => Err(ExprError::UnknownVariable { name, pos }),
            },
            Some((_, Token::LParen)) => {
                let expr = self.or_expr()?;
                match self.next() {
                    Some((_, Token::RParen)) => Ok(expr),
                    Some((pos, token)) => Err(ExprError::UnexpectedToken {
                        found: token.to_string(),
                        pos,
                    }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some((pos, token)) => Err(ExprError::UnexpectedToken {
                found: token.to_string(),
                pos,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        // 1 + 2 * 3 evaluates to 7, not 9
        let expr = parse("1 + 2 * 3 == 7").unwrap();
        assert_eq!(expr.eval(0, None), Some(crate::ast::Value::Bool(true)));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("false && false || true").unwrap();
        assert_eq!(expr.eval(0, None), Some(crate::ast::Value::Bool(true)));
    }

    #[test]
    fn parentheses_override_precedence() {
        let expr = parse("(1 + 2) * 3 == 9").unwrap();
        assert_eq!(expr.eval(0, None), Some(crate::ast::Value::Bool(true)));
    }

    #[test]
    fn unary_minus_and_not_nest() {
        let expr = parse("!(id < -1)").unwrap();
        assert_eq!(expr.eval(0, None), Some(crate::ast::Value::Bool(true)));
    }

    #[test]
    fn unknown_variable_is_reported_with_its_name() {
        let err = parse("payload == 1").unwrap_err();
        assert!(matches!(
            err,
            ExprError::UnknownVariable { ref name, .. } if name == "payload"
        ));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert!(matches!(
            parse("id == 1 2"),
            Err(ExprError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(matches!(parse(""), Err(ExprError::UnexpectedEnd)));
        assert!(matches!(parse("("), Err(ExprError::UnexpectedEnd)));
    }
}
