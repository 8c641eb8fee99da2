//! Line-oriented terminal front end for the application form.
//!
//! Each input line is one command. The current step is re-rendered after
//! every command that changes what would be on screen.

use std::io::{BufRead, Write};

use admission_core::form::NavOutcome;
use admission_core::{
    ApplicationForm, FieldName, FormError, NavAction, ParseFieldNameError, UiState,
};
use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use crate::logging;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set(FieldName, String),
    Clear(FieldName),
    Nav(NavAction),
    Reset,
    Show,
    Fields,
    Log(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("type a command, or 'help'")]
    Empty,

    #[error("unknown command '{0}'; try 'help'")]
    Unknown(String),

    #[error("'{0}' needs {1}")]
    MissingArgument(&'static str, &'static str),

    #[error(transparent)]
    Field(#[from] ParseFieldNameError),
}

pub const HELP: &str = "\
commands:
  set <field> <value>   fill in a field (see 'fields' for names)
  clear <field>         blank a field
  next | prev           move between steps
  submit                submit the application (last step only)
  reset                 start a new application
  show                  redraw the current step
  fields                list field names for the current step
  log <level>           change log verbosity (error, warn, info, debug, trace)
  help                  this text
  quit                  leave without submitting";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None if !rest.is_empty() => (rest, ""),
                None => return Err(CommandError::MissingArgument("set", "a field name")),
            };
            Ok(Command::Set(field.parse()?, value.to_string()))
        }
        "clear" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("clear", "a field name"));
            }
            Ok(Command::Clear(rest.parse()?))
        }
        "next" | "n" => Ok(Command::Nav(NavAction::Next)),
        "prev" | "previous" | "back" | "p" => Ok(Command::Nav(NavAction::Previous)),
        "submit" => Ok(Command::Nav(NavAction::Submit)),
        "reset" | "new" => Ok(Command::Reset),
        "show" | "s" => Ok(Command::Show),
        "fields" => Ok(Command::Fields),
        "log" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("log", "a level"));
            }
            Ok(Command::Log(rest.to_string()))
        }
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Draws the current step: title, fields with values and inline errors,
/// the state banner and the available controls.
pub fn render(
    form: &ApplicationForm,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let step = form.step();
    writeln!(out)?;
    writeln!(out, "== {step} ==")?;

    for field in step.fields() {
        let value = form.field(field);
        let shown = if value.is_empty() { "-" } else { value };
        writeln!(out, "  {:<30} {}", field.label(), shown)?;
        if let Some(message) = form.errors().get(field) {
            writeln!(out, "  {:<30} ! {}", "", message)?;
        }
    }

    match form.state() {
        UiState::Idle => {}
        UiState::Submitting => writeln!(out, "[submitting...]")?,
        UiState::Success => {
            writeln!(out, "[application submitted; 'reset' to submit another]")?;
        }
        UiState::Failed { message } => {
            writeln!(out, "[submission failed: {message}; 'submit' to try again]")?;
        }
    }

    let controls = form.controls();
    if controls.enabled {
        let mut available = Vec::new();
        if controls.previous {
            available.push("prev");
        }
        if controls.next {
            available.push("next");
        }
        if controls.submit {
            available.push("submit");
        }
        writeln!(out, "({})", available.join(" | "))?;
    }
    Ok(())
}

fn report(
    error: &FormError,
    out: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(out, "! {error}")
}

/// Runs one navigation action, waiting for the backend when it submits.
async fn navigate(
    form: &mut ApplicationForm,
    action: NavAction,
    out: &mut impl Write,
) -> Result<()> {
    let controls = form.controls();
    if controls.enabled && !controls.allows(action) {
        writeln!(out, "! that control is not available on this step")?;
        return Ok(());
    }

    match form.handle(action) {
        Ok(NavOutcome::Moved(_)) => {}
        Ok(NavOutcome::Submitting(ticket)) => {
            render(form, out)?;
            debug!(ticket = ticket.id(), "waiting for backend");
            form.wait_for_submission().await;
        }
        Err(error) => report(&error, out)?,
    }
    render(form, out)?;
    Ok(())
}

/// Reads commands from `input` until `quit` or end of input.
pub async fn run<R: BufRead, W: Write>(
    form: &mut ApplicationForm,
    input: R,
    mut out: W,
) -> Result<()> {
    writeln!(out, "School application. Type 'help' for commands.")?;
    render(form, &mut out)?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        debug!(command = %line.trim(), "console input");

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Set(field, value)) => match form.update_field(field, value) {
                Ok(()) => {}
                Err(error) => report(&error, &mut out)?,
            },
            Ok(Command::Clear(field)) => {
                if let Err(error) = form.update_field(field, "") {
                    report(&error, &mut out)?;
                }
            }
            Ok(Command::Nav(action)) => navigate(form, action, &mut out).await?,
            Ok(Command::Reset) => {
                match form.reset() {
                    Ok(()) => render(form, &mut out)?,
                    Err(error) => report(&error, &mut out)?,
                }
            }
            Ok(Command::Show) => render(form, &mut out)?,
            Ok(Command::Fields) => {
                for field in form.step().fields() {
                    writeln!(out, "  {:<24} {}", field.as_str(), field.label())?;
                }
            }
            Ok(Command::Log(level)) => match logging::set_log_level(&level) {
                Ok(()) => writeln!(out, "log level set to '{level}'")?,
                Err(error) => writeln!(out, "! {error}")?,
            },
            Ok(Command::Help) => writeln!(out, "{HELP}")?,
            Err(CommandError::Empty) => {}
            Err(error) => writeln!(out, "! {error}")?,
        }

        write!(out, "> ")?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}
