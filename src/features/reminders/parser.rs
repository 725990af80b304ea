//! Remind command parsing
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use std::fmt;

use super::entry::{ReminderEntry, Target};

/// Usage block appended to every parse error reply
pub const USAGE: &str = "```Usage: remind <target> <number> <time_unit> <message>

target: 'me', 'here', a mentioned user, or a mentioned channel
number: integer count of <time_unit>s before sending the reminder
time_unit: second, seconds, minute, minutes, hour, hours, day, days, week, weeks
message: message to send in the reminder```";

/// User-input failure while parsing a remind command
///
/// Each variant maps to one positional parameter; a missing token reports
/// the error of the position it would have filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    InvalidTarget,
    InvalidNumber,
    InvalidTimeUnit,
}

impl ParseError {
    /// The full user-facing reply, error line plus usage
    pub fn reply(&self) -> String {
        format!("{self}\n{USAGE}")
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidTarget => write!(f, "Invalid <target>"),
            ParseError::InvalidNumber => write!(f, "Invalid <number>"),
            ParseError::InvalidTimeUnit => write!(f, "Invalid <time_unit>"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Seconds per unit keyword, singular and plural forms alike
fn unit_multiplier(unit: &str) -> Option<u64> {
    match unit.to_lowercase().as_str() {
        "second" | "seconds" => Some(1),
        "minute" | "minutes" => Some(60),
        "hour" | "hours" => Some(3600),
        "day" | "days" => Some(86400),
        "week" | "weeks" => Some(604800),
        _ => None,
    }
}

/// Resolve the target token against the invoking user and channel
fn parse_target(token: &str, author_id: u64, channel_id: u64) -> Option<Target> {
    match token.to_lowercase().as_str() {
        "me" => return Some(Target::User(author_id)),
        "here" => return Some(Target::Channel(channel_id)),
        _ => {}
    }
    if let Some(inner) = token.strip_prefix("<@").and_then(|r| r.strip_suffix('>')) {
        // Nickname mentions carry a '!' after the '@'
        let inner = inner.strip_prefix('!').unwrap_or(inner);
        return inner.parse().ok().map(Target::User);
    }
    if let Some(inner) = token.strip_prefix("<#").and_then(|r| r.strip_suffix('>')) {
        return inner.parse().ok().map(Target::Channel);
    }
    None
}

/// Parse a full remind command into a queue entry
///
/// `content` is the raw message including the trigger word. The reminder
/// text is sliced from the raw content after the unit token rather than
/// re-joined from the split tokens, so the user's exact casing and
/// spacing survive. No bounds are enforced on the amount; zero or
/// negative values produce an already-due entry, which the engine fires
/// on its next tick.
pub fn parse_remind(
    content: &str,
    author_id: u64,
    channel_id: u64,
    now: f64,
) -> Result<ReminderEntry, ParseError> {
    let mut params = content.split_whitespace().skip(1);

    let target_token = params.next().ok_or(ParseError::InvalidTarget)?;
    let target =
        parse_target(target_token, author_id, channel_id).ok_or(ParseError::InvalidTarget)?;

    let amount: i64 = params
        .next()
        .ok_or(ParseError::InvalidNumber)?
        .parse()
        .map_err(|_| ParseError::InvalidNumber)?;

    let unit_token = params.next().ok_or(ParseError::InvalidTimeUnit)?;
    let multiplier = unit_multiplier(unit_token).ok_or(ParseError::InvalidTimeUnit)?;

    let due_at = now + (amount as f64) * (multiplier as f64);

    // Slice the raw text after the unit token; the earlier tokens cannot
    // contain a unit keyword (the target is a literal or a mention and the
    // amount is numeric), so the first occurrence is the unit itself.
    let message = match content.find(unit_token) {
        Some(idx) => {
            let rest = &content[idx + unit_token.len()..];
            rest.strip_prefix(' ').unwrap_or(rest).to_string()
        }
        None => String::new(),
    };

    Ok(ReminderEntry::new(target, due_at, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR: u64 = 42;
    const CHANNEL: u64 = 99;
    const NOW: f64 = 1_000_000.0;

    fn parse(content: &str) -> Result<ReminderEntry, ParseError> {
        parse_remind(content, AUTHOR, CHANNEL, NOW)
    }

    #[test]
    fn test_me_five_minutes() {
        let entry = parse("remind me 5 minutes Take out the trash").unwrap();
        assert_eq!(entry.target, Target::User(AUTHOR));
        assert_eq!(entry.due_at, NOW + 300.0);
        assert_eq!(entry.message, "Take out the trash");
    }

    #[test]
    fn test_here_one_day() {
        let entry = parse("remind here 1 day Standup").unwrap();
        assert_eq!(entry.target, Target::Channel(CHANNEL));
        assert_eq!(entry.due_at, NOW + 86400.0);
        assert_eq!(entry.message, "Standup");
    }

    #[test]
    fn test_user_mention_target() {
        let entry = parse("remind <@123456> 2 hours ping").unwrap();
        assert_eq!(entry.target, Target::User(123456));
        assert_eq!(entry.due_at, NOW + 7200.0);
    }

    #[test]
    fn test_nickname_mention_target() {
        let entry = parse("remind <@!123456> 1 second hi").unwrap();
        assert_eq!(entry.target, Target::User(123456));
    }

    #[test]
    fn test_channel_mention_target() {
        let entry = parse("remind <#555> 3 weeks rotate keys").unwrap();
        assert_eq!(entry.target, Target::Channel(555));
        assert_eq!(entry.due_at, NOW + 3.0 * 604800.0);
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = parse("remind me banana hours hi").unwrap_err();
        assert_eq!(err, ParseError::InvalidNumber);
        assert!(err.reply().contains("Invalid <number>"));
        assert!(err.reply().contains("Usage: remind"));
    }

    #[test]
    fn test_invalid_target_is_reported() {
        let err = parse("remind everyone 5 minutes hi").unwrap_err();
        assert_eq!(err, ParseError::InvalidTarget);
    }

    #[test]
    fn test_invalid_unit_is_reported() {
        let err = parse("remind me 5 fortnights hi").unwrap_err();
        assert_eq!(err, ParseError::InvalidTimeUnit);
    }

    #[test]
    fn test_missing_tokens_map_to_positions() {
        assert_eq!(parse("remind").unwrap_err(), ParseError::InvalidTarget);
        assert_eq!(parse("remind me").unwrap_err(), ParseError::InvalidNumber);
        assert_eq!(parse("remind me 5").unwrap_err(), ParseError::InvalidTimeUnit);
    }

    #[test]
    fn test_empty_message_allowed() {
        let entry = parse("remind me 10 seconds").unwrap();
        assert_eq!(entry.message, "");
        assert_eq!(entry.due_at, NOW + 10.0);
    }

    #[test]
    fn test_message_preserves_casing_and_spacing() {
        let entry = parse("remind me 1 minute BIG  gap   here").unwrap();
        assert_eq!(entry.message, "BIG  gap   here");
    }

    #[test]
    fn test_unit_keyword_in_message_is_kept() {
        let entry = parse("remind me 1 day day trip packing").unwrap();
        assert_eq!(entry.message, "day trip packing");
    }

    #[test]
    fn test_units_are_case_insensitive() {
        let entry = parse("remind ME 5 MINUTES shout").unwrap();
        assert_eq!(entry.target, Target::User(AUTHOR));
        assert_eq!(entry.due_at, NOW + 300.0);
        assert_eq!(entry.message, "shout");
    }

    #[test]
    fn test_negative_amount_is_already_due() {
        let entry = parse("remind me -5 minutes whoops").unwrap();
        assert_eq!(entry.due_at, NOW - 300.0);
        assert!(entry.is_due(NOW));
    }

    #[test]
    fn test_zero_amount() {
        let entry = parse("remind me 0 seconds now").unwrap();
        assert_eq!(entry.due_at, NOW);
    }

    #[test]
    fn test_malformed_mention_is_invalid_target() {
        assert_eq!(
            parse("remind <@notanid> 5 minutes hi").unwrap_err(),
            ParseError::InvalidTarget
        );
    }

    #[test]
    fn test_all_unit_multipliers() {
        for (unit, mult) in [
            ("second", 1.0),
            ("seconds", 1.0),
            ("minute", 60.0),
            ("minutes", 60.0),
            ("hour", 3600.0),
            ("hours", 3600.0),
            ("day", 86400.0),
            ("days", 86400.0),
            ("week", 604800.0),
            ("weeks", 604800.0),
        ] {
            let entry = parse(&format!("remind me 2 {unit} x")).unwrap();
            assert_eq!(entry.due_at, NOW + 2.0 * mult, "unit {unit}");
        }
    }
}
