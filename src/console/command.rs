use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

use crate::models::Coordinate;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tap(Coordinate),
    Locate(Coordinate),
    Here,
    RateUp,
    RateDown,
    RateSet(f64),
    Traffic(bool),
    Save,
    List,
    Delete(Vec<Uuid>),
    Recall(Uuid),
    Export(Uuid, PathBuf),
    Go,
    Reset,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', type 'help' for the list")]
    Unknown(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("not a number: '{0}'")]
    InvalidNumber(String),
    #[error("not a trip id: '{0}'")]
    InvalidId(String),
    #[error("expected 'on' or 'off', got '{0}'")]
    InvalidToggle(String),
}

pub const HELP: &str = "\
Commands:
  tap <lat> <lon>      select origin, then destination
  here                 select the last known location
  locate <lat> <lon>   report a new device location
  rate + | - | <value> adjust the price per km
  traffic on|off       toggle the live traffic overlay
  save                 store the priced route with a map snapshot
  list                 show saved trips, newest first
  delete <id>...       remove saved trips
  recall <id>          load a saved trip and resolve it again
  export <id> <file>   write a trip's map snapshot to a file
  go                   open turn-by-turn navigation
  reset                clear the selection
  status               show the current selection and price
  quit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(CommandError::Empty)?;

        let command = match name.to_lowercase().as_str() {
            "tap" => Command::Tap(parse_coordinate(&mut parts)?),
            "locate" => Command::Locate(parse_coordinate(&mut parts)?),
            "here" => Command::Here,
            "rate" => match parts.next().ok_or(CommandError::MissingArgument("rate"))? {
                "+" => Command::RateUp,
                "-" => Command::RateDown,
                value => Command::RateSet(parse_number(value)?),
            },
            "traffic" => {
                let toggle = parts.next().ok_or(CommandError::MissingArgument("on|off"))?;
                match toggle.to_lowercase().as_str() {
                    "on" => Command::Traffic(true),
                    "off" => Command::Traffic(false),
                    _ => return Err(CommandError::InvalidToggle(toggle.to_string())),
                }
            }
            "save" => Command::Save,
            "list" | "history" => Command::List,
            "delete" => {
                let ids = parts.map(parse_id).collect::<Result<Vec<_>, _>>()?;
                if ids.is_empty() {
                    return Err(CommandError::MissingArgument("trip id"));
                }
                Command::Delete(ids)
            }
            "recall" => {
                let id = parts.next().ok_or(CommandError::MissingArgument("trip id"))?;
                Command::Recall(parse_id(id)?)
            }
            "export" => {
                let id = parts.next().ok_or(CommandError::MissingArgument("trip id"))?;
                let path = parts.next().ok_or(CommandError::MissingArgument("file"))?;
                Command::Export(parse_id(id)?, PathBuf::from(path))
            }
            "go" | "navigate" => Command::Go,
            "reset" => Command::Reset,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn parse_coordinate<'a, I>(parts: &mut I) -> Result<Coordinate, CommandError>
where
    I: Iterator<Item = &'a str>,
{
    let lat = parts.next().ok_or(CommandError::MissingArgument("lat"))?;
    let lon = parts.next().ok_or(CommandError::MissingArgument("lon"))?;
    Ok(Coordinate::new(parse_number(lat)?, parse_number(lon)?))
}

fn parse_number(s: &str) -> Result<f64, CommandError> {
    s.parse::<f64>()
        .map_err(|_| CommandError::InvalidNumber(s.to_string()))
}

fn parse_id(s: &str) -> Result<Uuid, CommandError> {
    Uuid::parse_str(s).map_err(|_| CommandError::InvalidId(s.to_string()))
}
