//! Model expressions for the command line.
//!
//! Grammar (usual precedence, left-associative):
//!
//! ```text
//! expr    := product (('+' | '-') product)*
//! product := atom (('*' | '/') atom)*
//! atom    := '(' expr ')' | kind (':' prefix)?
//! kind    := gaussian | lorentzian | linear
//! ```
//!
//! Example: `gaussian:g0_ + gaussian:g1_ + linear:bk_`.

use crate::domain::Operator;
use crate::error::ModelError;
use crate::models::{combine, Linear, Model, Peak};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Colon,
    Op(Operator),
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ModelError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == ':' {
            chars.next();
            tokens.push(Token::Colon);
        } else if c == '(' {
            chars.next();
            tokens.push(Token::Open);
        } else if c == ')' {
            chars.next();
            tokens.push(Token::Close);
        } else if let Some(op) = Operator::from_symbol(c) {
            chars.next();
            tokens.push(Token::Op(op));
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            let mut ident = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                    ident.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(ident));
        } else {
            return Err(ModelError::Expression(format!("unexpected character '{c}'")));
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expr(&mut self) -> Result<Model, ModelError> {
        let mut model = self.product()?;
        while let Some(Token::Op(op @ (Operator::Add | Operator::Subtract))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.product()?;
            model = combine(model, rhs, op)?;
        }
        Ok(model)
    }

    fn product(&mut self) -> Result<Model, ModelError> {
        let mut model = self.atom()?;
        while let Some(Token::Op(op @ (Operator::Multiply | Operator::Divide))) = self.peek().cloned()
        {
            self.pos += 1;
            let rhs = self.atom()?;
            model = combine(model, rhs, op)?;
        }
        Ok(model)
    }

    fn atom(&mut self) -> Result<Model, ModelError> {
        match self.next() {
            Some(Token::Open) => {
                let model = self.expr()?;
                match self.next() {
                    Some(Token::Close) => Ok(model),
                    _ => Err(ModelError::Expression("missing ')'".to_string())),
                }
            }
            Some(Token::Ident(kind)) => {
                let prefix = if self.peek() == Some(&Token::Colon) {
                    self.pos += 1;
                    match self.next() {
                        Some(Token::Ident(p)) => p,
                        _ => {
                            return Err(ModelError::Expression(format!(
                                "expected a prefix after '{kind}:'"
                            )));
                        }
                    }
                } else {
                    String::new()
                };
                component(&kind, prefix)
            }
            Some(other) => Err(ModelError::Expression(format!(
                "expected a component, found {other:?}"
            ))),
            None => Err(ModelError::Expression("unexpected end of expression".to_string())),
        }
    }
}

fn component(kind: &str, prefix: String) -> Result<Model, ModelError> {
    match kind.to_ascii_lowercase().as_str() {
        "gaussian" | "gauss" => Ok(Model::leaf(Peak::gaussian(prefix))),
        "lorentzian" | "lorentz" => Ok(Model::leaf(Peak::lorentzian(prefix))),
        "linear" | "line" => Ok(Model::leaf(Linear::new(prefix))),
        other => Err(ModelError::Expression(format!(
            "unknown component kind '{other}' (expected gaussian, lorentzian or linear)"
        ))),
    }
}

/// Parse a model expression into a `Model` tree.
pub fn parse_model(input: &str) -> Result<Model, ModelError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ModelError::Expression("empty expression".to_string()));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let model = parser.expr()?;
    if let Some(extra) = parser.peek() {
        return Err(ModelError::Expression(format!("unexpected trailing {extra:?}")));
    }
    Ok(model)
}
