use anyhow::{bail, Error};
use std::io::BufRead;
use std::io::Write;
use tracing_subscriber::EnvFilter;

mod buffer;
mod calculator;
mod controller;
mod evaluator;
mod tokenizer;

use controller::{ButtonPress, Controller, Input};

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), Error> {
    let args = std::env::args_os().skip(1);
    let stdout = std::io::stdout();
    let lock = stdout.lock();
    let mut w = std::io::BufWriter::new(lock);

    if args.len() > 0 {
        let mut expr = String::new();
        for arg in args {
            let Some(utf8_arg) = arg.to_str() else {
                bail!("Arguments contain invalid UTF-8 string");
            };
            if !expr.is_empty() {
                expr.push(' ');
            }
            expr.push_str(utf8_arg);
        }

        let result = evaluator::evaluate(&expr)?;
        writeln!(&mut w, "{}", evaluator::format_number(result))?;
    } else {
        let stdin = std::io::stdin();
        let reader = std::io::BufReader::new(stdin);
        let is_interactive = atty::is(atty::Stream::Stdin);
        let mut controller = Controller::default();

        if is_interactive {
            write!(&mut w, ">>> ")?;
            w.flush()?;
        }

        for line in reader.lines() {
            for word in line?.split_whitespace() {
                handle_word(&mut controller, word);
            }

            writeln!(&mut w, "{}", controller.display())?;
            if is_interactive {
                write!(&mut w, ">>> ")?;
            }
            w.flush()?;
        }
    }
    w.flush()?;

    Ok(())
}

// Named keys and button actions first, then one key per char
fn handle_word(controller: &mut Controller, word: &str) {
    if let Some(input) = key_or_button(word) {
        controller.handle(input);
        return;
    }
    let mut encoded = [0; 4];
    for char in word.chars() {
        if let Some(input) = key_or_button(char.encode_utf8(&mut encoded)) {
            controller.handle(input);
        }
    }
}

fn key_or_button(word: &str) -> Option<Input> {
    Input::from_key(word)
        .or_else(|| Input::from_button(ButtonPress::Action(word)))
        .or_else(|| Input::from_button(ButtonPress::Value(word)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_or_button() {
        assert_eq!(key_or_button("equals"), Some(Input::Equals));
        assert_eq!(key_or_button("Enter"), Some(Input::Equals));
        assert_eq!(key_or_button("clear"), Some(Input::Clear));
        assert_eq!(key_or_button("×"), Some(Input::Char('*')));
        assert_eq!(key_or_button("12+3"), None);
        assert_eq!(key_or_button("x"), None);
    }

    #[test]
    fn test_key_run() {
        let mut controller = Controller::default();
        handle_word(&mut controller, "12+3");
        assert_eq!(controller.display().to_string(), "12+3");
        handle_word(&mut controller, "×2=");
        assert_eq!(controller.display().to_string(), "18");
    }
}
