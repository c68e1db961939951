use thiserror::Error;

use crate::model::{Dimension, Intent, SortMode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Show,
    Facets,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("unknown dimension '{0}' (expected page_type, category or activity)")]
    UnknownDimension(String),
    #[error("unknown sort mode '{0}' (expected relevant or newest)")]
    UnknownSort(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
commands:
  toggle <dimension> <value>   check or uncheck a facet value (also: t, dim=value)
  check <dimension> <value>    check a facet value, leaving it checked if it already is
  remove <dimension> <value>   uncheck a facet value (also: rm, x)
  sort relevant|newest         change result ordering
  clear                        remove every filter
  show                         render the current view again
  facets                       list facet counts only
  help                         this text
  quit                         leave (also: exit, q)
dimensions: page_type, category, activity";

/// Parses `DIM=VALUE` as used by `--filter` and the config `filters` list.
pub fn parse_filter_spec(spec: &str) -> Result<(Dimension, String), CommandError> {
    let (dim, value) = spec
        .split_once('=')
        .ok_or(CommandError::Usage("DIMENSION=VALUE"))?;
    let dimension =
        Dimension::parse(dim).ok_or_else(|| CommandError::UnknownDimension(dim.trim().to_string()))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(CommandError::Usage("DIMENSION=VALUE"));
    }
    Ok((dimension, value.to_string()))
}

fn dimension_and_value(args: &str, usage: &'static str) -> Result<(Dimension, String), CommandError> {
    let args = args.trim();
    if args.contains('=') {
        return parse_filter_spec(args);
    }
    let (dim, value) = args.split_once(char::is_whitespace).ok_or(CommandError::Usage(usage))?;
    let dimension =
        Dimension::parse(dim).ok_or_else(|| CommandError::UnknownDimension(dim.to_string()))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok((dimension, value.to_string()))
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }
    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map(|(h, r)| (h, r.trim()))
        .unwrap_or((line, ""));

    match head.to_lowercase().as_str() {
        "toggle" | "t" => {
            let (dimension, value) = dimension_and_value(rest, "toggle <dimension> <value>")?;
            Ok(Command::Intent(Intent::Toggle { dimension, value }))
        }
        "check" | "select" => {
            let (dimension, value) = dimension_and_value(rest, "check <dimension> <value>")?;
            Ok(Command::Intent(Intent::Select { dimension, value }))
        }
        "remove" | "rm" | "x" => {
            let (dimension, value) = dimension_and_value(rest, "remove <dimension> <value>")?;
            Ok(Command::Intent(Intent::Remove { dimension, value }))
        }
        "sort" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("sort relevant|newest"));
            }
            let mode = SortMode::parse(rest).ok_or_else(|| CommandError::UnknownSort(rest.to_string()))?;
            Ok(Command::Intent(Intent::SetSort(mode)))
        }
        "clear" | "reset" => Ok(Command::Intent(Intent::ClearAll)),
        "show" | "ls" => Ok(Command::Show),
        "facets" | "f" => Ok(Command::Facets),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ if line.contains('=') => {
            let (dimension, value) = parse_filter_spec(line)?;
            Ok(Command::Intent(Intent::Toggle { dimension, value }))
        }
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
