//! Validated evaluation of a buffer's text.
//!
//! The text is normalized and checked against a fixed character set before
//! the arithmetic engine ever sees it, so a rejected expression is never
//! partially computed.

use crate::calculator::{Calculator, CalculatorError};
use crate::tokenizer::{TokenizeError, Tokenizer, Value};
use thiserror::Error;
use tracing::trace;

pub const MAX_EXPRESSION_LEN: usize = 120;

pub fn evaluate(text: &str) -> Result<Value, EvaluationError> {
    let normalized = normalize(text);

    if normalized.is_empty() || !normalized.chars().all(is_allowed) {
        return Err(EvaluationError::InvalidCharacters);
    }
    if has_operator_run(&normalized) {
        return Err(EvaluationError::InvalidOperatorSequence);
    }
    // Every allowed character is ASCII, so bytes == chars here
    if normalized.len() > MAX_EXPRESSION_LEN {
        return Err(EvaluationError::TooLong);
    }

    let value = compute(&normalized)?;
    trace!(expression = %normalized, value, "evaluated");
    if !value.is_finite() {
        return Err(EvaluationError::MathError);
    }
    Ok(value)
}

/// Replaces the display glyphs for multiplication and division.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '×' => '*',
            '÷' => '/',
            c => c,
        })
        .collect()
}

fn is_allowed(c: char) -> bool {
    matches!(c, '0'..='9' | '+' | '-' | '*' | '/' | '%' | '.' | '(' | ')' | ' ')
}

fn has_operator_run(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|pair| matches!(pair, [b'*' | b'/', b'*' | b'/']))
}

fn compute(text: &str) -> Result<Value, EvaluationError> {
    let mut tokenizer = Tokenizer::default();
    let mut calculator = Calculator::default();

    for char in text.chars() {
        tokenizer
            .update(char)?
            .map(|t| calculator.handle_token(t))
            .transpose()?;
    }

    tokenizer
        .finalize()?
        .map(|t| calculator.handle_token(t))
        .transpose()?;
    Ok(calculator.finalize()?)
}

/// Renders a result the way a browser stringifies numbers: shortest
/// round-trip digits, exponent notation outside `[1e-6, 1e21)`.
pub fn format_number(value: Value) -> String {
    // Also folds -0 into 0
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let exp = format!("{:e}", value);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("Invalid characters in expression")]
    InvalidCharacters,
    #[error("Invalid operator sequence")]
    InvalidOperatorSequence,
    #[error("Expression too long")]
    TooLong,
    #[error("Math error")]
    MathError,
    #[error(transparent)]
    Lexical(#[from] TokenizeError),
    #[error(transparent)]
    Syntax(#[from] CalculatorError),
}
