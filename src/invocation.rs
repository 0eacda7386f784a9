// SPDX-License-Identifier: GPL-3.0-only
//! Parsed command model
//!
//! An [`Invocation`] is built once from the command line and handed to the
//! dispatcher by value. The feature-select grammar shared by `get` and `set`
//! lives here:
//!
//! ```text
//! feature-select := [target] feature
//! target         := integer 1..32 | "all"
//! feature        := "brightness" | "contrast" | "volume"
//! value          := integer 0..100 [ "+" | "-" ]
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ArgumentError;

/// Highest display index accepted as an explicit target
pub const MAX_TARGET: usize = 32;

/// Highest value accepted for a feature, on the percentage scale
pub const MAX_VALUE: u16 = 100;

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Help,
    List,
    Get {
        target: Target,
        feature: Feature,
    },
    Set {
        target: Target,
        feature: Feature,
        value: Value,
    },
}

/// Which displays an action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// No target given, the first display
    #[default]
    Default,
    /// 1-based display index
    Index(usize),
    All,
}

/// Monitor setting addressed by its VCP code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Brightness,
    Contrast,
    Volume,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Feature::Brightness, Feature::Contrast, Feature::Volume];

    /// VCP (Virtual Control Panel) code of the feature
    pub fn vcp_code(self) -> u8 {
        match self {
            Feature::Brightness => 0x10,
            Feature::Contrast => 0x12,
            Feature::Volume => 0x62,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::Brightness => "brightness",
            Feature::Contrast => "contrast",
            Feature::Volume => "volume",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| ArgumentError::InvalidArgument {
                token: s.to_string(),
                reason: "expected one of brightness, contrast, volume".to_string(),
            })
    }
}

/// How a value is applied to the current setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Absolute,
    Increase,
    Decrease,
}

/// Validated `set` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Value {
    /// Always within 0..=MAX_VALUE
    pub amount: u16,
    pub mode: Mode,
}

impl Value {
    pub fn absolute(amount: u16) -> Self {
        Self {
            amount,
            mode: Mode::Absolute,
        }
    }

    /// Signed delta for relative modes, `None` for absolute values
    pub fn delta(&self) -> Option<i32> {
        match self.mode {
            Mode::Absolute => None,
            Mode::Increase => Some(i32::from(self.amount)),
            Mode::Decrease => Some(-i32::from(self.amount)),
        }
    }
}

impl FromStr for Value {
    type Err = ArgumentError;

    /// Parses a leading base-10 integer the way `strtol` does, then looks at
    /// the character right after the digits for a `+` or `-` suffix. Other
    /// trailing content is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_start();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digits_len = unsigned
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits_len == 0 {
            return Err(ArgumentError::InvalidArgument {
                token: s.to_string(),
                reason: "value is not a number".to_string(),
            });
        }

        let (digits, rest) = unsigned.split_at(digits_len);
        // Saturate so huge inputs still report as out of range
        let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
        let number = if negative { -magnitude } else { magnitude };

        if !(0..=i64::from(MAX_VALUE)).contains(&number) {
            return Err(ArgumentError::OutOfRange {
                what: "value",
                value: number,
                min: 0,
                max: i64::from(MAX_VALUE),
            });
        }

        let mode = match rest.as_bytes().first() {
            Some(b'+') => Mode::Increase,
            Some(b'-') => Mode::Decrease,
            _ => Mode::Absolute,
        };

        Ok(Self {
            mode,
            ..Self::absolute(number as u16)
        })
    }
}

/// Interprets a token as a target, or `None` if it is neither a number nor
/// `all`. Numbers outside 1..=MAX_TARGET are an error, not a fallback.
fn parse_target(token: &str) -> Result<Option<Target>, ArgumentError> {
    if token == "all" {
        return Ok(Some(Target::All));
    }
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }

    let index = token.parse::<usize>().unwrap_or(usize::MAX);
    if !(1..=MAX_TARGET).contains(&index) {
        return Err(ArgumentError::OutOfRange {
            what: "display",
            value: i64::try_from(index).unwrap_or(i64::MAX),
            min: 1,
            max: MAX_TARGET as i64,
        });
    }
    Ok(Some(Target::Index(index)))
}

/// Parses the tokens following `get` (`with_value == false`) or `set`
/// (`with_value == true`).
pub fn parse_selector(
    action: &str,
    tokens: &[String],
    with_value: bool,
) -> Result<(Target, Feature, Option<Value>), ArgumentError> {
    let mut tokens = tokens.iter().map(String::as_str).peekable();

    let mut target = Target::Default;
    let mut last = action.to_string();
    if let Some(token) = tokens.peek() {
        if let Some(parsed) = parse_target(token)? {
            target = parsed;
            last = token.to_string();
            tokens.next();
        }
    }

    let feature_token = tokens.next().ok_or_else(|| ArgumentError::MissingArgument {
        what: "feature",
        after: last.clone(),
    })?;
    let feature = feature_token.parse::<Feature>()?;

    let value = if with_value {
        let value_token = tokens.next().ok_or_else(|| ArgumentError::MissingArgument {
            what: "value",
            after: feature_token.to_string(),
        })?;
        Some(value_token.parse::<Value>()?)
    } else {
        None
    };

    if let Some(extra) = tokens.next() {
        return Err(ArgumentError::InvalidArgument {
            token: extra.to_string(),
            reason: format!("unexpected argument for `{action}`"),
        });
    }

    Ok((target, feature, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_feature_names_are_exact() {
        assert_eq!("volume".parse::<Feature>(), Ok(Feature::Volume));
        assert!("Brightness".parse::<Feature>().is_err());
        assert!("bright".parse::<Feature>().is_err());
    }

    #[test]
    fn test_vcp_codes() {
        assert_eq!(Feature::Brightness.vcp_code(), 0x10);
        assert_eq!(Feature::Contrast.vcp_code(), 0x12);
        assert_eq!(Feature::Volume.vcp_code(), 0x62);
    }

    #[test]
    fn test_value_absolute_and_relative() {
        assert_eq!("60".parse::<Value>(), Ok(Value::absolute(60)));
        let up: Value = "10+".parse().unwrap();
        assert_eq!(up.mode, Mode::Increase);
        assert_eq!(up.delta(), Some(10));
        let down: Value = "25-".parse().unwrap();
        assert_eq!(down.delta(), Some(-25));
    }

    #[test]
    fn test_value_trailing_garbage_is_ignored() {
        assert_eq!("42abc".parse::<Value>(), Ok(Value::absolute(42)));
        assert_eq!("5+x".parse::<Value>().unwrap().mode, Mode::Increase);
    }

    #[test]
    fn test_value_bounds() {
        assert!("0".parse::<Value>().is_ok());
        assert!("100".parse::<Value>().is_ok());
        assert!(matches!(
            "101".parse::<Value>(),
            Err(ArgumentError::OutOfRange { value: 101, .. })
        ));
        assert!(matches!(
            "-5".parse::<Value>(),
            Err(ArgumentError::OutOfRange { value: -5, .. })
        ));
        assert!(matches!(
            "99999999999999999999999".parse::<Value>(),
            Err(ArgumentError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_value_not_a_number() {
        assert!(matches!(
            "loud".parse::<Value>(),
            Err(ArgumentError::InvalidArgument { .. })
        ));
        assert!(matches!(
            "+".parse::<Value>(),
            Err(ArgumentError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_selector_default_target() {
        let parsed = parse_selector("get", &tokens(&["contrast"]), false).unwrap();
        assert_eq!(parsed, (Target::Default, Feature::Contrast, None));
    }

    #[test]
    fn test_selector_explicit_and_all_targets() {
        let parsed = parse_selector("get", &tokens(&["2", "volume"]), false).unwrap();
        assert_eq!(parsed.0, Target::Index(2));

        let parsed = parse_selector("set", &tokens(&["all", "brightness", "50"]), true).unwrap();
        assert_eq!(
            parsed,
            (Target::All, Feature::Brightness, Some(Value::absolute(50)))
        );
    }

    #[test]
    fn test_selector_target_bounds() {
        assert!(parse_selector("get", &tokens(&["32", "volume"]), false).is_ok());
        assert!(matches!(
            parse_selector("get", &tokens(&["33", "volume"]), false),
            Err(ArgumentError::OutOfRange { what: "display", .. })
        ));
        assert!(matches!(
            parse_selector("get", &tokens(&["0", "volume"]), false),
            Err(ArgumentError::OutOfRange { what: "display", .. })
        ));
    }

    #[test]
    fn test_selector_missing_tokens() {
        assert!(matches!(
            parse_selector("get", &[], false),
            Err(ArgumentError::MissingArgument { what: "feature", .. })
        ));
        assert!(matches!(
            parse_selector("get", &tokens(&["all"]), false),
            Err(ArgumentError::MissingArgument { what: "feature", .. })
        ));
        assert!(matches!(
            parse_selector("set", &tokens(&["brightness"]), true),
            Err(ArgumentError::MissingArgument { what: "value", .. })
        ));
    }

    #[test]
    fn test_selector_rejects_unknown_and_extra_tokens() {
        assert!(matches!(
            parse_selector("get", &tokens(&["sharpness"]), false),
            Err(ArgumentError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_selector("get", &tokens(&["volume", "50"]), false),
            Err(ArgumentError::InvalidArgument { .. })
        ));
    }
}
