use crate::tokenizer::{Operation, Token, Value};
use thiserror::Error;

#[derive(Debug, Default, Clone, Copy)]
enum CalculatorState {
    #[default]
    Empty,
    Neg,
    Value(Value),
}

#[derive(Debug)]
enum Pending {
    Action(Action),
    /// Open parenthesis. `negate` is set when a unary minus preceded it.
    Group { negate: bool },
}

#[derive(Debug, Default)]
pub struct Calculator {
    state: CalculatorState,
    pending: Vec<Pending>,
}

impl Calculator {
    pub fn handle_token(&mut self, token: Token) -> Result<(), CalculatorError> {
        use CalculatorState::*;
        use Token::*;

        match (self.state, token) {
            (Empty, Val(v)) => self.state = Value(v),
            (Neg, Val(v)) => self.state = Value(-v),
            // Negative sign
            (Empty, Op(Operation::Sub)) => self.state = Neg,
            // Double negative sign, cancel each other out
            (Neg, Op(Operation::Sub)) => self.state = Empty,
            // Positive sign, do nothing
            (Empty | Neg, Op(Operation::Add)) => {}
            (Empty | Neg, Op(_)) => return Err(CalculatorError::NumberExpected),
            (Empty, LParen) => self.pending.push(Pending::Group { negate: false }),
            (Neg, LParen) => {
                self.pending.push(Pending::Group { negate: true });
                self.state = Empty;
            }
            (Empty | Neg, RParen) => return Err(CalculatorError::NumberExpected),
            (Value(_), Val(_) | LParen) => return Err(CalculatorError::OperationExpected),
            (Value(v), Op(op)) => {
                self.prioritized_execute(Action { l: v, op });
                self.state = Empty;
            }
            (Value(v), RParen) => self.state = Value(self.close_group(v)?),
        }

        Ok(())
    }

    fn prioritized_execute(&mut self, mut new: Action) {
        while let Some(Pending::Action(pending)) = self.pending.last() {
            if pending.priority() < new.priority() {
                break;
            }
            if let Some(Pending::Action(pending)) = self.pending.pop() {
                new.l = pending.execute(new.l);
            }
        }
        self.pending.push(Pending::Action(new));
    }

    fn close_group(&mut self, mut v: Value) -> Result<Value, CalculatorError> {
        loop {
            match self.pending.pop() {
                Some(Pending::Action(pending)) => v = pending.execute(v),
                Some(Pending::Group { negate }) => return Ok(if negate { -v } else { v }),
                None => return Err(CalculatorError::UnbalancedParenthesis),
            }
        }
    }

    pub fn finalize(&mut self) -> Result<Value, CalculatorError> {
        let result = match self.state {
            CalculatorState::Empty => Err(CalculatorError::NumberExpected),
            CalculatorState::Neg => Err(CalculatorError::NumberExpected),
            CalculatorState::Value(v) => self.unwind(v),
        };
        self.state = CalculatorState::Empty;
        self.pending.clear();
        result
    }

    fn unwind(&mut self, mut v: Value) -> Result<Value, CalculatorError> {
        while let Some(pending) = self.pending.pop() {
            match pending {
                Pending::Action(pending) => v = pending.execute(v),
                Pending::Group { .. } => return Err(CalculatorError::UnclosedParenthesis),
            }
        }
        Ok(v)
    }
}

#[derive(Debug, Clone, Copy)]
struct Action {
    l: Value,
    op: Operation,
}

impl Action {
    fn execute(self, r: Value) -> Value {
        match self.op {
            Operation::Add => self.l + r,
            Operation::Sub => self.l - r,
            Operation::Mul => self.l * r,
            Operation::Div => self.l / r,
            // Truncated remainder, sign follows the dividend
            Operation::Rem => self.l % r,
        }
    }

    fn priority(&self) -> u8 {
        match self.op {
            Operation::Add | Operation::Sub => 10,
            Operation::Mul | Operation::Div | Operation::Rem => 20,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CalculatorError {
    #[error("Number expected")]
    NumberExpected,
    #[error("Operation expected")]
    OperationExpected,
    #[error("Unbalanced closing parenthesis")]
    UnbalancedParenthesis,
    #[error("Unclosed parenthesis")]
    UnclosedParenthesis,
}
