//! Operator Console
//!
//! `Console` bundles the three streams a workflow talks to: a line-oriented
//! input, the regular output, and the error output. The binary wires it to
//! stdin/stdout/stderr; tests wire it to byte buffers.
//!
//! Prompts are written without a trailing newline and flushed before reading.
//! A closed input stream surfaces as [`ShopError::InputClosed`].

use std::io::{self, BufRead, Write};

use crate::error::{Result, ShopError};
use crate::workflow::MenuChoice;

/// Line-oriented operator console
pub struct Console<R, W, X> {
    input: R,
    out: W,
    err: X,
}

impl Console<io::StdinLock<'static>, io::Stdout, io::Stderr> {
    /// Console over the process's standard streams
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout(), io::stderr())
    }
}

impl<R: BufRead, W: Write, X: Write> Console<R, W, X> {
    /// Create a console from explicit streams
    pub const fn new(input: R, out: W, err: X) -> Self {
        Self { input, out, err }
    }

    /// Regular output stream
    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Give back the output streams
    pub fn into_outputs(self) -> (W, X) {
        (self.out, self.err)
    }

    /// Read one line without its line terminator
    pub fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ShopError::InputClosed);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    /// Print `label` and read the answer
    pub fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        self.read_line()
    }

    /// Print `label` and read a yes/no answer; only `Y` or `y` counts as yes
    pub fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.prompt(label)?;
        Ok(answer == "Y" || answer == "y")
    }

    /// Print a line on the regular output
    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{message}")?;
        Ok(())
    }

    /// Print an error message on the error output
    pub fn report_error(&mut self, err: &ShopError) -> Result<()> {
        writeln!(self.err, "{err}")?;
        self.err.flush()?;
        Ok(())
    }

    /// Print the main menu
    pub fn show_menu(&mut self) -> Result<()> {
        self.out.write_all(render_menu().as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    /// Read a menu number, reprompting until the input parses as an integer
    pub fn read_choice(&mut self) -> Result<i32> {
        loop {
            let input = self.prompt("Please make your choice: ")?;
            match input.trim().parse::<i32>() {
                Ok(choice) => return Ok(choice),
                Err(_) => self.say("Your input is invalid!")?,
            }
        }
    }
}

/// Main menu text
#[must_use]
pub fn render_menu() -> String {
    let mut menu = String::from("\nMAIN MENU\n---------\n");
    for choice in MenuChoice::ALL {
        menu.push_str(&format!("{}. {}\n", choice.number(), choice.label()));
    }
    menu
}
