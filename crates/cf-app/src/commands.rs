//! Interactive filter commands read from stdin

use std::str::FromStr;
use thiserror::Error;

use cf_core::{FilterDimension, FilterError, FilterValue};
use cf_views::{ChartKind, UnknownChart};

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Chart(#[from] UnknownChart),
}

/// One line of interactive input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `set <dimension> <value>`
    Set(FilterDimension, FilterValue),
    /// `unset <dimension>`
    Unset(FilterDimension),
    /// `clear`
    Clear,
    /// `show [chart]`, every chart when none is named
    Show(Option<ChartKind>),
    /// `options`
    Options,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

pub const HELP: &str = "\
commands:
  set <dimension> <value>   filter on country, year, topic, sector or region
  unset <dimension>         remove one filter
  clear                     remove every filter
  show [chart]              print current projections
  options                   print filter option lists
  quit                      exit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match verb.to_ascii_lowercase().as_str() {
            "set" => {
                let (dimension, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::MissingArgument("filter value"))?;
                let dimension: FilterDimension = dimension.parse()?;
                Ok(Command::Set(dimension, dimension.parse_value(value.trim())?))
            }
            "unset" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("filter dimension"));
                }
                Ok(Command::Unset(rest.parse()?))
            }
            "clear" => Ok(Command::Clear),
            "show" if rest.is_empty() => Ok(Command::Show(None)),
            "show" => Ok(Command::Show(Some(rest.parse()?))),
            "options" => Ok(Command::Options),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(line.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_multi_word_values() {
        assert_eq!(
            "set country United States of America".parse::<Command>(),
            Ok(Command::Set(
                FilterDimension::Country,
                FilterValue::from("United States of America")
            ))
        );
        assert_eq!(
            "SET year 2021".parse::<Command>(),
            Ok(Command::Set(FilterDimension::Year, FilterValue::Year(2021)))
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!("unset sector".parse::<Command>(), Ok(Command::Unset(FilterDimension::Sector)));
        assert_eq!("  clear ".parse::<Command>(), Ok(Command::Clear));
        assert_eq!("show".parse::<Command>(), Ok(Command::Show(None)));
        assert_eq!(
            "show region-heatmap".parse::<Command>(),
            Ok(Command::Show(Some(ChartKind::RegionHeatmap)))
        );
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn test_invalid_commands() {
        assert_eq!("set country".parse::<Command>(), Err(CommandError::MissingArgument("filter value")));
        assert!(matches!("set year soon".parse::<Command>(), Err(CommandError::Filter(_))));
        assert!(matches!("unset city".parse::<Command>(), Err(CommandError::Filter(_))));
        assert!(matches!("show radar".parse::<Command>(), Err(CommandError::Chart(_))));
        assert!(matches!("draw".parse::<Command>(), Err(CommandError::Unknown(_))));
    }
}
