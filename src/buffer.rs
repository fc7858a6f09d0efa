use crate::tokenizer::Operation;
use compact_str::CompactString;
use tracing::trace;

/// The expression being typed, plus whether it currently holds the result
/// of the last evaluation.
#[derive(Debug, Default)]
pub struct ExpressionBuffer {
    text: CompactString,
    evaluated: bool,
}

impl ExpressionBuffer {
    /// Appends a single token. Returns `false` when the token was rejected,
    /// in which case the buffer is left as it was.
    pub fn append(&mut self, token: char) -> bool {
        // A fresh number replaces a finished result
        if self.evaluated && (token.is_ascii_digit() || token == '.') {
            self.text.clear();
            self.evaluated = false;
        }

        match token {
            '.' => {
                let segment = self.trailing_segment();
                if segment.contains('.') {
                    trace!(buffer = %self.text, "rejected second decimal point");
                    return false;
                }
                if segment.is_empty() {
                    self.text.push('0');
                }
            }
            '0' if self.trailing_segment() == "0" => {
                trace!(buffer = %self.text, "rejected leading zero");
                return false;
            }
            _ => {}
        }

        self.text.push(token);
        self.evaluated = false;
        true
    }

    /// Swaps the trailing operator for `op`. Does nothing unless the buffer
    /// ends in an operator.
    pub fn replace_trailing_operator(&mut self, op: char) {
        if self.ends_with_operator() {
            self.text.pop();
            self.text.push(op);
            self.evaluated = false;
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
        self.evaluated = false;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.evaluated = false;
    }

    pub fn set_from_result(&mut self, text: &str) {
        self.text = CompactString::from(text);
        self.evaluated = true;
    }

    pub fn ends_with_operator(&self) -> bool {
        self.text
            .chars()
            .next_back()
            .is_some_and(|c| Operation::from_char(c).is_some())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    // Digits after the last operator or parenthesis
    fn trailing_segment(&self) -> &str {
        self.text
            .rsplit(|c: char| Operation::from_char(c).is_some() || c == '(' || c == ')')
            .next()
            .unwrap_or_default()
    }
}
