use compact_str::{format_compact, CompactString};
use thiserror::Error;

#[derive(Debug, Default)]
enum TokenizerState {
    #[default]
    Clean,
    InNumber(CompactString),
    // Single character tokens are complete on sight, but are held back so
    // that `update` never has to emit more than one token at a time
    Pending(Token),
}

#[derive(Debug, Default)]
pub struct Tokenizer {
    state: TokenizerState,
}

impl Tokenizer {
    pub fn update(&mut self, c: char) -> Result<Option<Token>, TokenizeError> {
        use TokenizerState::*;

        match self.state {
            Clean => match c {
                '0'..='9' | '.' => {
                    let mut number = CompactString::default();
                    number.push(c);
                    self.state = InNumber(number);
                    Ok(None)
                }
                '(' => {
                    self.state = Pending(Token::LParen);
                    Ok(None)
                }
                ')' => {
                    self.state = Pending(Token::RParen);
                    Ok(None)
                }
                // Ignore whitespace
                _ if c.is_whitespace() => Ok(None),
                _ => match Operation::from_char(c) {
                    Some(op) => {
                        self.state = Pending(Token::Op(op));
                        Ok(None)
                    }
                    None => Err(TokenizeError::UnexpectedToken(c)),
                },
            },
            InNumber(ref mut number) => match c {
                '0'..='9' | '.' => {
                    number.push(c);
                    Ok(None)
                }
                _ if c.is_whitespace() => self.finalize(),
                c => {
                    let token = self.finalize()?;
                    self.update(c)?;
                    Ok(token)
                }
            },
            // `++` and `--` are not sign chains, a space is needed between them
            Pending(Token::Op(op @ (Operation::Add | Operation::Sub)))
                if Operation::from_char(c) == Some(op) =>
            {
                self.state = Clean;
                Err(TokenizeError::UnknownOperation(format_compact!("{c}{c}")))
            }
            Pending(_) => {
                let token = self.finalize()?;
                self.update(c)?;
                Ok(token)
            }
        }
    }

    pub fn finalize(&mut self) -> Result<Option<Token>, TokenizeError> {
        use TokenizerState::*;
        let token = match std::mem::take(&mut self.state) {
            Clean => None,
            // No legacy octal literals: `05`, `007`
            InNumber(number) if matches!(number.as_bytes(), [b'0', b'0'..=b'9', ..]) => {
                return Err(TokenizeError::InvalidNumber(number))
            }
            InNumber(number) => match number.parse::<Value>() {
                Ok(value) => Some(Token::Val(value)),
                Err(_) => return Err(TokenizeError::InvalidNumber(number)),
            },
            Pending(token) => Some(token),
        };
        Ok(token)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Unexpected token: {0:?}")]
    UnexpectedToken(char),
    #[error("Invalid number: {0}")]
    InvalidNumber(CompactString),
    #[error("Unknown operation: {0}")]
    UnknownOperation(CompactString),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Val(Value),
    Op(Operation),
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Operation {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operation::Add),
            '-' => Some(Operation::Sub),
            '*' => Some(Operation::Mul),
            '/' => Some(Operation::Div),
            '%' => Some(Operation::Rem),
            _ => None,
        }
    }
}

pub type Value = f64;
