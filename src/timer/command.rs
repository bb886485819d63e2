//! Commands accepted from display surfaces
//!
//! Surfaces send loosely-typed JSON; numeric components are coerced here so the
//! core only ever sees integers. Nothing in this module rejects input.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A command routed from a display surface into the timer core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    /// Authoritative reset of total and remaining time; stops any run
    SetTime {
        #[serde(default, deserialize_with = "lenient_component")]
        minutes: i64,
        #[serde(default, deserialize_with = "lenient_component")]
        seconds: i64,
    },
    Start,
    Pause,
    Reset,
    GetState,
}

impl Command {
    /// Short name used in logs and status reporting
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetTime { .. } => "setTime",
            Command::Start => "start",
            Command::Pause => "pause",
            Command::Reset => "reset",
            Command::GetState => "getState",
        }
    }

    /// Whether this command can change timer state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::GetState)
    }
}

fn lenient_component<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_component(&value))
}

/// Coerce an arbitrary JSON value into a whole number of minutes or seconds.
///
/// Numbers are floored, numeric strings are parsed (a leading numeric prefix is
/// enough, so `"12abc"` reads as 12, and `0x`/`0o`/`0b` literals are read in
/// their radix), and anything else is 0. Negative results
/// are passed through; the core clamps them.
pub fn coerce_component(value: &Value) -> i64 {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                int
            } else if number.as_u64().is_some() {
                i64::MAX
            } else {
                number.as_f64().map(floor_to_i64).unwrap_or(0)
            }
        }
        Value::String(text) => parse_leading_number(text),
        _ => 0,
    }
}

fn floor_to_i64(value: f64) -> i64 {
    if value.is_finite() {
        // `as` saturates at the i64 bounds
        value.floor() as i64
    } else {
        0
    }
}

fn parse_leading_number(text: &str) -> i64 {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return floor_to_i64(value);
    }
    if let Some(value) = parse_radix_literal(trimmed) {
        return value;
    }

    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let prefix_len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if prefix_len == 0 {
        return 0;
    }
    digits[..prefix_len]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(if sign < 0 { i64::MIN } else { i64::MAX })
}

fn parse_radix_literal(text: &str) -> Option<i64> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    Some(i64::from_str_radix(digits, radix).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce_component(&json!(5)), 5);
        assert_eq!(coerce_component(&json!(2.9)), 2);
        assert_eq!(coerce_component(&json!(-3)), -3);
        assert_eq!(coerce_component(&json!(u64::MAX)), i64::MAX);
    }

    #[test]
    fn test_coerce_strings() {
        assert_eq!(coerce_component(&json!("25")), 25);
        assert_eq!(coerce_component(&json!(" 7.5 ")), 7);
        assert_eq!(coerce_component(&json!("12abc")), 12);
        assert_eq!(coerce_component(&json!("abc")), 0);
        assert_eq!(coerce_component(&json!("")), 0);
    }

    #[test]
    fn test_coerce_radix_literals() {
        assert_eq!(coerce_component(&json!("0x10")), 16);
        assert_eq!(coerce_component(&json!(" 0o17 ")), 15);
        assert_eq!(coerce_component(&json!("0b101")), 5);
        assert_eq!(coerce_component(&json!("0xfffffffffffffffff")), i64::MAX);
        // Not a complete literal, so only the leading zero counts
        assert_eq!(coerce_component(&json!("0x1g")), 0);
        assert_eq!(coerce_component(&json!("-0x10")), 0);
    }

    #[test]
    fn test_coerce_non_numeric() {
        assert_eq!(coerce_component(&Value::Null), 0);
        assert_eq!(coerce_component(&json!(true)), 0);
        assert_eq!(coerce_component(&json!([1, 2])), 0);
        assert_eq!(coerce_component(&json!({"m": 1})), 0);
    }

    #[test]
    fn test_command_deserialization() {
        let cmd: Command = serde_json::from_value(json!({"action": "start"})).unwrap();
        assert_eq!(cmd, Command::Start);

        let cmd: Command =
            serde_json::from_value(json!({"action": "setTime", "minutes": "3", "seconds": null}))
                .unwrap();
        assert_eq!(cmd, Command::SetTime { minutes: 3, seconds: 0 });

        let cmd: Command = serde_json::from_value(json!({"action": "setTime"})).unwrap();
        assert_eq!(cmd, Command::SetTime { minutes: 0, seconds: 0 });
    }

    #[test]
    fn test_unknown_action_is_rejected_by_serde() {
        assert!(serde_json::from_value::<Command>(json!({"action": "explode"})).is_err());
    }
}
