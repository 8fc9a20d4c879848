//! History CLI command.
//!
//! # Usage
//!
//! ```bash
//! asclepius history list
//! asclepius history show 3 --format json
//! asclepius history delete 3          # asks for confirmation
//! asclepius history delete 3 --force
//! ```

#![allow(clippy::print_stdout)]
#![allow(clippy::needless_pass_by_value)]

use crate::config::AsclepiusConfig;
use crate::models::ResultId;
use crate::rendering::{OutputFormat, render_history, render_result};
use crate::services::ServiceContainer;
use crate::{Error, Result};
use clap::Subcommand;
use std::io::{self, BufRead, Write};

/// History subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum HistoryAction {
    /// List saved results, newest first.
    List {
        /// Output format.
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show one saved result.
    Show {
        /// Result ID.
        id: ResultId,

        /// Output format.
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Delete a saved result.
    Delete {
        /// Result ID.
        id: ResultId,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },
}

/// History command.
///
/// # Errors
///
/// Returns an error if the database cannot be read or written, or if the
/// requested result does not exist.
pub async fn cmd_history(config: AsclepiusConfig, action: HistoryAction) -> Result<()> {
    let container = ServiceContainer::from_config(config);
    let history = container.history()?;

    match action {
        HistoryAction::List { format } => {
            let results = history.refresh().await?;
            print!("{}", render_history(&results, format)?);
        },
        HistoryAction::Show { id, format } => {
            let result = history.get(id).await?.ok_or_else(|| not_found(id))?;
            print!("{}", render_result(&result, format)?);
        },
        HistoryAction::Delete { id, force } => {
            let result = history.get(id).await?.ok_or_else(|| not_found(id))?;
            if !force {
                print!("{}", render_result(&result, OutputFormat::Table)?);
                let confirmed = confirm(
                    &format!("Delete result {id}?"),
                    &mut io::stdin().lock(),
                    &mut io::stdout(),
                )?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            history.delete(id).await?;
            println!("Deleted result {id}.");
        },
    }

    Ok(())
}

fn not_found(id: ResultId) -> Error {
    Error::InvalidInput(format!("result {id} not found"))
}

/// Asks a yes/no question; anything but `y` or `yes` is a no.
fn confirm(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    write!(output, "{question} [y/N] ")
        .and_then(|()| output.flush())
        .map_err(|e| Error::OperationFailed {
            operation: "flush_stdout".to_string(),
            cause: e.to_string(),
        })?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|e| Error::OperationFailed {
            operation: "read_stdin".to_string(),
            cause: e.to_string(),
        })?;

    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("y\n", true ; "short yes")]
    #[test_case("YES\n", true ; "long yes")]
    #[test_case("n\n", false ; "no")]
    #[test_case("\n", false ; "empty")]
    #[test_case("", false ; "eof")]
    fn test_confirm(answer: &str, expected: bool) {
        let mut output = Vec::new();
        let confirmed = confirm("Delete?", &mut answer.as_bytes(), &mut output).unwrap();
        assert_eq!(confirmed, expected);
        assert_eq!(String::from_utf8(output).unwrap(), "Delete? [y/N] ");
    }

    #[tokio::test]
    async fn test_show_missing_result() {
        let dir = tempfile::tempdir().unwrap();
        let config = AsclepiusConfig::default().with_data_dir(dir.path());
        let action = HistoryAction::Show {
            id: ResultId::new(42),
            format: OutputFormat::Table,
        };

        let err = cmd_history(config, action).await.unwrap_err();
        assert!(err.to_string().contains("42"));
    }
}
