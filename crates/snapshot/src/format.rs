//! Snapshot text format and record helpers.
//!
//! One record per line:
//!
//! ```text
//! <key>:<value>\n
//! ```
//!
//! Lines are split on the **first** `:` only, so a value may contain the
//! delimiter but a key may not. There is no escaping, header or footer.

use std::io::{Result as IoResult, Write};

/// Separates the key from the value on each line.
pub const DELIMITER: char = ':';

/// Extension of the temporary file a dump writes before renaming it over
/// the target.
pub const TMP_EXTENSION: &str = "tmp";

/// Writes one `key:value` line.
pub fn write_record<W: Write>(w: &mut W, key: &str, value: &str) -> IoResult<()> {
    writeln!(w, "{}{}{}", key, DELIMITER, value)
}

/// Splits a line into `(key, value)`.
///
/// Returns `None` for lines that are empty, have no delimiter, or leave the
/// key or the value empty.
pub fn parse_record(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(DELIMITER)?;
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Returns `true` if the pair survives a write/parse cycle unchanged.
pub fn round_trips(key: &str, value: &str) -> bool {
    !key.contains(DELIMITER)
        && !key.is_empty()
        && !value.is_empty()
        && !key.contains(&['\n', '\r'][..])
        && !value.contains(&['\n', '\r'][..])
}
