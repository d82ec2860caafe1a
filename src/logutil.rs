//! Log-safe rendering of player names.
//!
//! Names come from game clients, so they may hold line breaks, control characters or
//! be absurdly long. [`player_name`] renders them on one bounded line without
//! allocating.

use std::fmt::{self, Write as _};

/// Player names longer than this are cut in log lines.
pub const MAX_NAME_CHARS: usize = 32;

/// Shown instead of a name that is empty or only whitespace.
const UNNAMED: &str = "<unnamed>";

#[derive(Debug, Clone, Copy)]
pub struct PlayerName<'a>(&'a str);

/// Wrap a player name for logging: surrounding whitespace trimmed, control
/// characters escaped (`\n`, `\r`, `\t`, otherwise `\xNN`), cut after
/// [`MAX_NAME_CHARS`] characters.
pub fn player_name(name: &str) -> PlayerName<'_> {
    PlayerName(name)
}

impl fmt::Display for PlayerName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0.trim();
        if name.is_empty() {
            return f.write_str(UNNAMED);
        }
        for (count, ch) in name.chars().enumerate() {
            if count >= MAX_NAME_CHARS {
                return f.write_char('…');
            }
            match ch {
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c if c.is_control() => write!(f, "\\x{:02X}", c as u32)?,
                c => f.write_char(c)?,
            }
        }
        Ok(())
    }
}
