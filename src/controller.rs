use crate::buffer::ExpressionBuffer;
use crate::evaluator::{evaluate, format_number};
use crate::tokenizer::Operation;
use compact_str::CompactString;
use std::fmt;
use tracing::{debug, trace};

/// A single discrete input, whichever source it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Char(char),
    Clear,
    Back,
    Equals,
}

/// Activation of a labeled control: either a literal value or a named action.
#[derive(Debug, Clone, Copy)]
pub enum ButtonPress<'a> {
    Value(&'a str),
    Action(&'a str),
}

impl Input {
    pub fn from_button(press: ButtonPress<'_>) -> Option<Self> {
        match press {
            ButtonPress::Action("clear") => Some(Input::Clear),
            ButtonPress::Action("back") => Some(Input::Back),
            ButtonPress::Action("equals") => Some(Input::Equals),
            ButtonPress::Action(_) => None,
            ButtonPress::Value("÷") => Some(Input::Char('/')),
            ButtonPress::Value("×") => Some(Input::Char('*')),
            ButtonPress::Value("−") => Some(Input::Char('-')),
            ButtonPress::Value(value) => single_key_char(value).map(Input::Char),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" | "=" => Some(Input::Equals),
            "Backspace" => Some(Input::Back),
            "Delete" | "Escape" => Some(Input::Clear),
            _ => single_key_char(key).map(Input::Char),
        }
    }
}

fn single_key_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ ('0'..='9' | '+' | '-' | '*' | '/' | '.' | '%' | '(' | ')')), None) => Some(c),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    Text(CompactString),
    Error,
}

impl Default for Display {
    fn default() -> Self {
        Display::Text(CompactString::default())
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Display::Text(text) if text.is_empty() => f.write_str("0"),
            Display::Text(text) => f.write_str(text),
            Display::Error => f.write_str("Error"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Controller {
    buffer: ExpressionBuffer,
    display: Display,
}

impl Controller {
    pub fn handle(&mut self, input: Input) -> &Display {
        match input {
            Input::Clear => {
                self.buffer.clear();
                self.refresh();
            }
            Input::Back => {
                self.buffer.backspace();
                self.refresh();
            }
            Input::Char(c) => {
                self.push_char(c);
                self.refresh();
            }
            Input::Equals => self.equals(),
        }
        trace!(
            ?input,
            buffer = self.buffer.as_str(),
            evaluated = self.buffer.is_evaluated(),
            "handled input"
        );
        &self.display
    }

    fn push_char(&mut self, c: char) {
        if Operation::from_char(c).is_some() {
            if self.buffer.is_empty() && c != '-' {
                trace!(operator = %c, "rejected operator on empty expression");
                return;
            }
            if self.buffer.ends_with_operator() {
                self.buffer.replace_trailing_operator(c);
                return;
            }
        }
        self.buffer.append(c);
    }

    fn equals(&mut self) {
        let text = match self.buffer.as_str() {
            "" => "0",
            text => text,
        };
        match evaluate(text) {
            Ok(value) => {
                self.buffer.set_from_result(&format_number(value));
                self.refresh();
            }
            Err(e) => {
                debug!(expression = %text, error = %e, "evaluation failed");
                self.buffer.clear();
                self.display = Display::Error;
            }
        }
    }

    fn refresh(&mut self) {
        self.display = Display::Text(self.buffer.as_str().into());
    }

    pub fn display(&self) -> &Display {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(controller: &mut Controller, keys: &[&str]) -> String {
        for key in keys {
            if let Some(input) = Input::from_key(key) {
                controller.handle(input);
            }
        }
        controller.display().to_string()
    }

    #[test]
    fn test_end_to_end() {
        let mut controller = Controller::default();
        assert_eq!(run(&mut controller, &["1", "+", "2", "Enter"]), "3");
        assert!(controller.buffer.is_evaluated());

        assert_eq!(run(&mut controller, &["5"]), "5");
        assert!(!controller.buffer.is_evaluated());
    }

    #[test]
    fn test_empty_display() {
        let mut controller = Controller::default();
        assert_eq!(controller.display().to_string(), "0");
        assert_eq!(run(&mut controller, &["4", "Backspace"]), "0");
    }

    #[test]
    fn test_operator_replaces_operator() {
        let mut controller = Controller::default();
        assert_eq!(run(&mut controller, &["3", "+", "-"]), "3-");
        assert_eq!(run(&mut controller, &["*", "%"]), "3%");
    }

    #[test]
    fn test_only_minus_starts_expression() {
        let mut controller = Controller::default();
        assert_eq!(run(&mut controller, &["+", "*", "/", "%"]), "0");
        assert_eq!(run(&mut controller, &["-", "4", "="]), "-4");
    }

    #[test]
    fn test_continue_from_result() {
        let mut controller = Controller::default();
        assert_eq!(run(&mut controller, &["6", "*", "7", "="]), "42");
        assert_eq!(run(&mut controller, &["/", "2", "="]), "21");
    }

    #[test]
    fn test_error_resets() {
        let mut controller = Controller::default();
        assert_eq!(run(&mut controller, &["5", "/", "0", "Enter"]), "Error");
        assert!(controller.buffer.is_empty());
        assert!(!controller.buffer.is_evaluated());

        assert_eq!(run(&mut controller, &["2"]), "2");
    }

    #[test]
    fn test_unclosed_group_is_error() {
        let mut controller = Controller::default();
        assert_eq!(run(&mut controller, &["(", "1", "+", "2", "="]), "Error");
    }

    #[test]
    fn test_leading_zero_number_is_error() {
        let mut controller = Controller::default();
        assert_eq!(run(&mut controller, &["0", "5", "+", "1", "="]), "Error");
        assert_eq!(run(&mut controller, &["0", ".", "5", "+", "1", "="]), "1.5");
    }

    #[test]
    fn test_equals_on_empty() {
        let mut controller = Controller::default();
        assert_eq!(run(&mut controller, &["="]), "0");
        assert!(controller.buffer.is_evaluated());
    }

    #[test]
    fn test_escape_clears() {
        let mut controller = Controller::default();
        assert_eq!(run(&mut controller, &["1", "2", "Escape"]), "0");
        assert_eq!(run(&mut controller, &["7", "Delete"]), "0");
        assert!(controller.buffer.is_empty());
    }

    #[test]
    fn test_buttons() {
        let mut controller = Controller::default();
        let presses = [
            ButtonPress::Value("8"),
            ButtonPress::Value("÷"),
            ButtonPress::Value("×"),
            ButtonPress::Value("2"),
            ButtonPress::Value("−"),
            ButtonPress::Value("1"),
            ButtonPress::Action("equals"),
        ];
        for press in presses {
            if let Some(input) = Input::from_button(press) {
                controller.handle(input);
            }
        }
        assert_eq!(controller.display().to_string(), "15");

        assert_eq!(Input::from_button(ButtonPress::Action("clear")), Some(Input::Clear));
        assert_eq!(Input::from_button(ButtonPress::Action("back")), Some(Input::Back));
        assert_eq!(Input::from_button(ButtonPress::Action("sqrt")), None);
        assert_eq!(Input::from_button(ButtonPress::Value("x")), None);
    }

    #[test]
    fn test_unknown_keys() {
        assert_eq!(Input::from_key("Shift"), None);
        assert_eq!(Input::from_key("a"), None);
        assert_eq!(Input::from_key(" "), None);
        assert_eq!(Input::from_key("%"), Some(Input::Char('%')));
    }
}
