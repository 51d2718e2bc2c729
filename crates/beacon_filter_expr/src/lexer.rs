//! Tokenizer for filter expressions.
//!
//! Produces position-tagged tokens so parse errors can point at the offending
//! character in the source string.

use crate::ExprError;

/// One lexical token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Int(i64),
    Str(String),
    Ident(String),
    OrOr,
    AndAnd,
    Bang,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Int(value) => write!(f, "{value}"),
            Token::Str(value) => write!(f, "\"{value}\""),
            Token::Ident(name) => write!(f, "{name}"),
            Token::OrOr => write!(f, "||"),
            Token::AndAnd => write!(f, "&&"),
            Token::Bang => write!(f, "!"),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

/// Splits a source string into `(byte_position, token)` pairs.
pub(crate) fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push((pos, Token::LParen));
            }
            ')' => {
                chars.next();
                tokens.push((pos, Token::RParen));
            }
            '+' => {
                chars.next();
                tokens.push((pos, Token::Plus));
            }
            '-' => {
                chars.next();
                tokens.push((pos, Token::Minus));
            }
            '*' => {
                chars.next();
                tokens.push((pos, Token::Star));
            }
            '/' => {
                chars.next();
                tokens.push((pos, Token::Slash));
            }
            '%' => {
                chars.next();
                tokens.push((pos, Token::Percent));
            }
            '|' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '|')) => {
                        chars.next();
                        tokens.push((pos, Token::OrOr));
                    }
                    _ => return Err(ExprError::UnexpectedChar { ch: '|', pos }),
                }
            }
            '&' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '&')) => {
                        chars.next();
                        tokens.push((pos, Token::AndAnd));
                    }
                    _ => return Err(ExprError::UnexpectedChar { ch: '&', pos }),
                }
            }
            '=' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '=')) => {
                        chars.next();
                        tokens.push((pos, Token::EqEq));
                    }
                    _ => return Err(ExprError::UnexpectedChar { ch: '=', pos }),
                }
            }
            '!' => {
                chars.next();
                if let Some(&(_, '=')) = chars.peek() {
                    chars.next();
                    tokens.push((pos, Token::NotEq));
                } else {
                    tokens.push((pos, Token::Bang));
                }
            }
            '<' => {
                chars.next();
                if let Some(&(_, '=')) = chars.peek() {
                    chars.next();
                    tokens.push((pos, Token::Le));
                } else {
                    tokens.push((pos, Token::Lt));
                }
            }
            '>' => {
                chars.next();
                if let Some(&(_, '=')) = chars.peek() {
                    chars.next();
                    tokens.push((pos, Token::Ge));
                } else {
                    tokens.push((pos, Token::Gt));
                }
            }
            '\'' | '"' => {
                tokens.push((pos, lex_string(&mut chars, pos, ch)?));
            }
            '0'..='9' => {
                tokens.push((pos, lex_int(&mut chars, pos)?));
            }
            _ if ch.is_ascii_alphabetic() || ch == '_' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((pos, Token::Ident(name)));
            }
            _ => return Err(ExprError::UnexpectedChar { ch, pos }),
        }
    }

    Ok(tokens)
}

fn lex_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
    quote: char,
) -> Result<Token, ExprError> {
    chars.next(); // opening quote
    let mut value = String::new();
    loop {
        match chars.next() {
            Some((_, c)) if c == quote => return Ok(Token::Str(value)),
            Some((pos, '\\')) => match chars.next() {
                Some((_, escaped)) if escaped == quote || escaped == '\\' => value.push(escaped),
                Some((_, other)) => {
                    return Err(ExprError::UnexpectedChar { ch: other, pos });
                }
                None => return Err(ExprError::UnterminatedString { pos: start }),
            },
            Some((_, c)) => value.push(c),
            None => return Err(ExprError::UnterminatedString { pos: start }),
        }
    }
}

fn lex_int(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
) -> Result<Token, ExprError> {
    let mut digits = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() {
            digits.push(c);
            chars.next();
        } else {
            break;
        }
    }
    digits
        .parse::<i64>()
        .map(Token::Int)
        .map_err(|_| ExprError::IntOutOfRange { pos: start })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(_, token)| token)
            .collect()
    }

    #[test]
    fn tokenizes_operators_and_literals() {
        assert_eq!(
            kinds("id % 2 != 0"),
            vec![
                Token::Ident("id".into()),
                Token::Percent,
                Token::Int(2),
                Token::NotEq,
                Token::Int(0),
            ]
        );
    }

    #[test]
    fn both_quote_styles_work() {
        assert_eq!(kinds("'one'"), vec![Token::Str("one".into())]);
        assert_eq!(kinds("\"two\""), vec![Token::Str("two".into())]);
    }

    #[test]
    fn escaped_quotes_are_preserved() {
        assert_eq!(kinds(r#""a\"b""#), vec![Token::Str("a\"b".into())]);
    }

    #[test]
    fn unterminated_string_is_reported_at_its_start() {
        assert!(matches!(
            tokenize("topic == 'one"),
            Err(ExprError::UnterminatedString { pos: 9 })
        ));
    }

    #[test]
    fn single_ampersand_is_rejected() {
        assert!(matches!(
            tokenize("1 & 2"),
            Err(ExprError::UnexpectedChar { ch: '&', .. })
        ));
    }
}
