#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::PathBuf;

use crate::args::{ContentArgs, PasswordArgs};
use crate::client::CliError;

pub fn read_value(val: Option<String>, file: Option<PathBuf>) -> Result<String, CliError> {
    read_opt_value(val, file)?.ok_or_else(|| CliError::InvalidInput("value required".into()))
}

pub fn read_opt_value(
    val: Option<String>,
    file: Option<PathBuf>,
) -> Result<Option<String>, CliError> {
    if let Some(path) = file {
        let data = fs::read_to_string(&path).map_err(|source| CliError::InputFile {
            path: path.display().to_string(),
            source,
        })?;
        return Ok(Some(data));
    }
    Ok(val)
}

pub fn read_content(args: ContentArgs) -> Result<Option<String>, CliError> {
    read_opt_value(args.content, args.content_file)
}

/// The password file wins over the environment; a trailing newline is dropped.
pub fn read_password(args: PasswordArgs) -> Result<String, CliError> {
    let password = match args.password_file {
        Some(path) => read_value(None, Some(path))?
            .trim_end_matches(['\r', '\n'])
            .to_string(),
        None => args.password_env.ok_or(CliError::MissingPassword)?,
    };
    if password.is_empty() {
        return Err(CliError::MissingPassword);
    }
    Ok(password)
}
