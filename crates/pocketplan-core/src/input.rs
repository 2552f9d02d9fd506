//! Interactive budget collection
//!
//! `Prompter` wraps any line reader and writer so the same prompt loops run
//! against stdin/stdout in the binary and against byte buffers in tests.
//! Invalid answers are never errors: they print a message and ask again.
//! The only error besides I/O is `Error::InputClosed`, returned when the
//! reader hits end of file while waiting for an answer.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::budget::{Budget, Expenses};
use crate::error::{Error, Result};

pub const INCOME_PROMPT: &str = "Enter your monthly income (after tax): $";
pub const SAVINGS_GOAL_PROMPT: &str = "Enter your monthly savings goal: $";
pub const EXPENSE_NAME_PROMPT: &str = "Enter expense name (or type 'done' to finish): ";
pub const INVALID_NUMBER_MSG: &str = "Please enter a valid positive number.";
pub const GOAL_TOO_HIGH_MSG: &str = "Amount you want to save is higher than your monthly income.";

/// Typed at the expense name prompt to finish (case-insensitive)
pub const DONE_SENTINEL: &str = "done";

/// Parse a non-negative, finite amount
///
/// Surrounding whitespace is ignored. Returns `None` for anything else,
/// including `NaN` and infinities that `f64::from_str` would accept.
pub fn parse_amount(input: &str) -> Option<f64> {
    let value: f64 = input.trim().parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Line-oriented prompt driver
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the writer (tests inspect what was printed)
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Print a prompt without a newline and read one line back
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{}", message)?;
        Ok(())
    }

    /// Ask until a non-negative number is entered
    fn ask_amount(&mut self, prompt: &str) -> Result<f64> {
        loop {
            let answer = self.ask(prompt)?;
            match parse_amount(&answer) {
                Some(value) => return Ok(value),
                None => {
                    debug!(input = %answer, "Rejected amount");
                    self.say(INVALID_NUMBER_MSG)?;
                }
            }
        }
    }

    /// Monthly income after tax
    pub fn read_income(&mut self) -> Result<f64> {
        self.ask_amount(INCOME_PROMPT)
    }

    /// Monthly savings goal, which may not exceed `income`
    pub fn read_savings_goal(&mut self, income: f64) -> Result<f64> {
        loop {
            let goal = self.ask_amount(SAVINGS_GOAL_PROMPT)?;
            if goal > income {
                debug!(goal, income, "Savings goal above income");
                self.say(GOAL_TOO_HIGH_MSG)?;
                continue;
            }
            return Ok(goal);
        }
    }

    /// Name/amount pairs until the user types "done"
    ///
    /// A rejected amount goes back to the name prompt; nothing is recorded
    /// for that name.
    pub fn read_expenses(&mut self) -> Result<Expenses> {
        let mut expenses = Expenses::new();
        loop {
            let name = self.ask(EXPENSE_NAME_PROMPT)?.trim().to_string();
            if name.eq_ignore_ascii_case(DONE_SENTINEL) {
                break;
            }

            let answer = self.ask(&format!("Enter amount for {}: $", name))?;
            match parse_amount(&answer) {
                Some(amount) => expenses.add(&name, amount),
                None => {
                    debug!(expense = %name, input = %answer, "Rejected expense amount");
                    self.say(INVALID_NUMBER_MSG)?;
                }
            }
        }
        Ok(expenses)
    }

    /// Run all three prompts in order
    pub fn read_budget(&mut self) -> Result<Budget> {
        let income = self.read_income()?;
        let savings_goal = self.read_savings_goal(income)?;
        let expenses = self.read_expenses()?;
        Ok(Budget::new(income, savings_goal, expenses))
    }
}
