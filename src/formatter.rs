//! Message formatting
//!
//! Builds the display-ready record sent for every chat and system message.
//! Sender and text are passed through untouched; escaping is left to
//! whatever renders them.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

/// Time format for message timestamps, e.g. "3:45 PM"
pub const TIME_FORMAT: &str = "%-I:%M %p";

/// Source of wall-clock time for timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A chat or system message ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Display name of the sender
    #[serde(rename = "username")]
    pub sender: String,
    pub text: String,
    /// Send time rendered with `TIME_FORMAT`
    pub timestamp: String,
}

/// Build a message stamped with the clock's current time
pub fn format_message(sender: &str, text: &str, clock: &impl Clock) -> Message {
    Message {
        sender: sender.to_string(),
        text: text.to_string(),
        timestamp: clock.now().format(TIME_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clock_at(hour: u32, minute: u32) -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_format_afternoon() {
        let msg = format_message("Alice", "hello", &clock_at(15, 45));

        assert_eq!(msg.sender, "Alice");
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.timestamp, "3:45 PM");
    }

    #[test]
    fn test_format_midnight_and_noon() {
        assert_eq!(format_message("a", "b", &clock_at(0, 5)).timestamp, "12:05 AM");
        assert_eq!(format_message("a", "b", &clock_at(12, 0)).timestamp, "12:00 PM");
    }

    #[test]
    fn test_format_is_deterministic() {
        let clock = clock_at(9, 7);
        assert_eq!(
            format_message("Bob", "hi", &clock),
            format_message("Bob", "hi", &clock)
        );
        assert_eq!(format_message("Bob", "hi", &clock).timestamp, "9:07 AM");
    }

    #[test]
    fn test_content_passed_through() {
        let msg = format_message("<b>Eve</b>", "  <script>x</script> ", &clock_at(1, 0));
        assert_eq!(msg.sender, "<b>Eve</b>");
        assert_eq!(msg.text, "  <script>x</script> ");
    }

    #[test]
    fn test_message_serialize() {
        let msg = format_message("Alice", "hello", &clock_at(15, 45));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"username": "Alice", "text": "hello", "timestamp": "3:45 PM"})
        );
    }
}
