//! Line-based operator prompts on a terminal.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::error::Result;
use crate::models::ShoppingEntry;
use crate::ordering::{ManualAction, Operator};

/// An [`Operator`] reading answers line by line from `input`.
pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl TerminalOperator<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Result<String> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn notify(&mut self, message: &str) {
        let _ = writeln!(self.output, "{}", message);
    }

    fn warn(&mut self, message: &str) {
        let _ = writeln!(self.output, "! {}", message);
    }

    fn wait_for_enter(&mut self, message: &str) -> Result<()> {
        write!(self.output, "{} ", message)?;
        self.read_line()?;
        Ok(())
    }

    fn manual_action(
        &mut self,
        position: usize,
        total: usize,
        entry: &ShoppingEntry,
    ) -> Result<ManualAction> {
        write!(
            self.output,
            "({}/{}) Add {} ({}) then press Enter to save and continue, [m] to set manual ratio, or [x] to skip saving: ",
            position, total, entry.display_name, entry.display_quantity
        )?;
        let answer = self.read_line()?;
        Ok(match answer.chars().next() {
            Some('m') | Some('M') => ManualAction::SetRatio,
            Some('x') | Some('X') => ManualAction::Skip,
            _ => ManualAction::Save,
        })
    }

    fn ratio(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}: ", prompt)?;
        self.read_line()
    }
}
