use std::fmt::Display;

use console::{style, StyledObject};

// Terminal styles, named by what they mark rather than by color.

fn styled(text: impl Display) -> StyledObject<String> {
    style(text.to_string())
}

/// Tool name in the banner.
pub fn brand(text: impl Display) -> StyledObject<String> {
    styled(text).magenta().bold()
}

/// Section title, underlined.
pub fn heading(text: impl Display) -> StyledObject<String> {
    styled(text).bright().underlined()
}

pub fn icon(text: impl Display) -> StyledObject<String> {
    styled(text).bright()
}

/// In-progress work, stale data and headline numbers.
pub fn notice(text: impl Display) -> StyledObject<String> {
    styled(text).bright().yellow()
}

pub fn success(text: impl Display) -> StyledObject<String> {
    styled(text).bright().green()
}

/// Per-repository fetch failures.
pub fn failure(text: impl Display) -> StyledObject<String> {
    styled(text).bright().red()
}

/// Labels and secondary text.
pub fn muted(text: impl Display) -> StyledObject<String> {
    styled(text).dim()
}

/// File paths and timestamps.
pub fn location(text: impl Display) -> StyledObject<String> {
    styled(text).cyan()
}
