//! Parsing of the line-oriented command language.

use thiserror::Error;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: String },
    Get { key: String },
    Del { key: String },
    Size,
    Show,
    Dump,
    Load,
    Help,
    Exit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
SET <key> <value>   insert, keeps the existing value if the key is present
GET <key>           print the value stored under key
DEL <key>           remove key
SIZE                number of entries
SHOW                print every level of the index
DUMP                write a snapshot to the configured path
LOAD                merge the snapshot at the configured path
HELP                this text
EXIT | QUIT         leave";

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    ///
    /// The verb is case-insensitive. For `SET`, everything after the key
    /// (trimmed) is the value, so values may contain spaces.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = split_word(line);
        let cmd = match verb.to_ascii_uppercase().as_str() {
            "SET" => {
                let (key, value) = split_word(rest);
                if key.is_empty() || value.is_empty() {
                    return Err(CommandError::Usage("SET <key> <value>"));
                }
                Command::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            "GET" => Command::Get {
                key: single_arg(rest, "GET <key>")?,
            },
            "DEL" => Command::Del {
                key: single_arg(rest, "DEL <key>")?,
            },
            "SIZE" => Command::Size,
            "SHOW" => Command::Show,
            "DUMP" => Command::Dump,
            "LOAD" => Command::Load,
            "HELP" => Command::Help,
            "EXIT" | "QUIT" => Command::Exit,
            _ => return Err(CommandError::Unknown(verb.to_string())),
        };
        Ok(Some(cmd))
    }
}

/// Splits off the first whitespace-delimited word; the remainder is trimmed.
fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

fn single_arg(rest: &str, usage: &'static str) -> Result<String, CommandError> {
    let (key, extra) = split_word(rest);
    if key.is_empty() || !extra.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok(key.to_string())
}
