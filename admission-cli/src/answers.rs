//! Scripted intake: fill the form from a TOML file and submit it.
//!
//! The file is a flat table of field names (snake_case or camelCase) to
//! string values:
//!
//! ```toml
//! full_name = "Aarav Shah"
//! bloodGroup = "O+"
//! interests = "Chess"
//! ```

use std::{collections::BTreeMap, fs, io::Write, path::Path};

use admission_core::{ApplicationForm, FieldName, FormError, FormErrors, Step};
use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AnswersError {
    #[error("invalid answers file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("answers file names unknown field '{0}'")]
    UnknownField(String),
}

/// How a scripted run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    Submitted,
    Rejected { step: Step, errors: FormErrors },
}

pub fn parse_answers(text: &str) -> Result<Vec<(FieldName, String)>, AnswersError> {
    let table: BTreeMap<String, String> = toml::from_str(text)?;
    table
        .into_iter()
        .map(|(key, value)| {
            FieldName::parse(&key)
                .map(|field| (field, value))
                .ok_or(AnswersError::UnknownField(key))
        })
        .collect()
}

pub fn load_answers(path: &Path) -> Result<Vec<(FieldName, String)>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read answers file '{}'", path.display()))?;
    parse_answers(&text).with_context(|| format!("in '{}'", path.display()))
}

/// Fills every answer, walks the steps in order and submits.
///
/// Validation failures end the run with [`ScriptOutcome::Rejected`]; backend
/// and session failures are returned as errors.
pub async fn run_scripted(
    form: &mut ApplicationForm,
    answers: &[(FieldName, String)],
    out: &mut impl Write,
) -> Result<ScriptOutcome> {
    for (field, value) in answers {
        form.update_field(*field, value.as_str())?;
    }

    while !form.step().is_last() {
        let from = form.step();
        match form.advance() {
            Ok(step) => writeln!(out, "{from} ok -> step {}", step.number())?,
            Err(FormError::Invalid { step, errors }) => {
                write_errors(&errors, out)?;
                return Ok(ScriptOutcome::Rejected { step, errors });
            }
            Err(other) => return Err(other.into()),
        }
    }

    match form.submit_and_wait().await {
        Ok(()) => {}
        Err(FormError::Invalid { step, errors }) => {
            write_errors(&errors, out)?;
            return Ok(ScriptOutcome::Rejected { step, errors });
        }
        Err(other) => return Err(other.into()),
    }

    let applicant = form.field(FieldName::FullName);
    info!(%applicant, "scripted application submitted");
    writeln!(out, "Application for {applicant} submitted.")?;
    Ok(ScriptOutcome::Submitted)
}

fn write_errors(
    errors: &FormErrors,
    out: &mut impl Write,
) -> std::io::Result<()> {
    for (field, message) in errors.iter() {
        writeln!(out, "  {}: {message}", field.as_str())?;
    }
    Ok(())
}
