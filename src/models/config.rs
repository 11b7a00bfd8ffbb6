//! Marquee configuration
//!
//! Configuration is read from the host element's attributes once per attach.
//! Invalid values never reject the element; they fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default scroll speed in pixels per second
pub const DEFAULT_SPEED: f64 = 50.0;

/// Upper bound applied to the `speed` attribute
pub const MAX_SPEED: f64 = 1000.0;

/// Scroll direction of the marquee content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Axis an animation translates along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the four direction keywords
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized direction: {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    /// Exact, case-sensitive match, like the attribute values the markup uses
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// Sanitized marquee configuration (immutable for one attach)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarqueeConfig {
    /// Direction given explicitly on the element, if it was valid
    pub explicit_direction: Option<Direction>,

    /// Scroll speed in pixels per second, always in `(0, MAX_SPEED]`
    pub speed: f64,

    pub pause_on_hover: bool,

    pub persistent: bool,

    /// Key under which the playback position is persisted
    pub storage_key: String,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            explicit_direction: None,
            speed: DEFAULT_SPEED,
            pause_on_hover: false,
            persistent: false,
            storage_key: storage_key_for(None, None),
        }
    }
}

impl MarqueeConfig {
    /// Build a configuration from an attribute lookup
    ///
    /// `attr` returns the raw attribute value for a name, or `None` if the
    /// attribute is absent. Recognized names: `direction`, `speed`,
    /// `pauseonhover`, `persistent`, `id`. `key_base` names the storage key
    /// when there is no `id`.
    pub fn from_attributes<F>(attr: F, key_base: Option<&str>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit_direction = attr("direction").and_then(|d| d.parse().ok());
        let speed = sanitize_speed(attr("speed").as_deref());
        let pause_on_hover = parse_flag(attr("pauseonhover").as_deref());
        let persistent = parse_flag(attr("persistent").as_deref());
        let id = attr("id");

        Self {
            explicit_direction,
            speed,
            pause_on_hover,
            persistent,
            storage_key: storage_key_for(id.as_deref(), key_base),
        }
    }

}

/// Parse and clamp a raw `speed` attribute
///
/// Accepts a plain number or a leading integer prefix (`"80px"` reads as 80).
/// Anything non-numeric, non-finite or not positive yields [`DEFAULT_SPEED`];
/// values above [`MAX_SPEED`] are clamped.
pub fn sanitize_speed(raw: Option<&str>) -> f64 {
    raw.and_then(parse_number_prefix)
        .and_then(clamp_speed)
        .unwrap_or(DEFAULT_SPEED)
}

/// Clamp an already numeric speed, falling back to [`DEFAULT_SPEED`]
pub fn sanitize_speed_value(speed: f64) -> f64 {
    clamp_speed(speed).unwrap_or(DEFAULT_SPEED)
}

fn clamp_speed(speed: f64) -> Option<f64> {
    if speed.is_finite() && speed > 0.0 {
        Some(speed.min(MAX_SPEED))
    } else {
        None
    }
}

fn parse_number_prefix(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return Some(value);
    }

    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}

/// `true` only for the literal `"true"` (trimmed, any case)
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn storage_key_for(id: Option<&str>, key_base: Option<&str>) -> String {
    let base = id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| {
            key_base
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_ascii_lowercase)
        })
        .unwrap_or_else(|| "new-marquee".to_string());
    format!("{}-state", base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> MarqueeConfig {
        let attrs: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MarqueeConfig::from_attributes(|name| attrs.get(name).cloned(), Some("NEW-MARQUEE"))
    }

    #[test]
    fn test_defaults_when_no_attributes() {
        let config = config_from(&[]);
        assert_eq!(config.explicit_direction, None);
        assert_eq!(config.speed, DEFAULT_SPEED);
        assert!(!config.pause_on_hover);
        assert!(!config.persistent);
        assert_eq!(config.storage_key, "new-marquee-state");
    }

    #[test]
    fn test_direction_parsing() {
        for direction in Direction::ALL {
            let config = config_from(&[("direction", direction.as_str())]);
            assert_eq!(config.explicit_direction, Some(direction));
        }

        assert_eq!(config_from(&[("direction", "sideways")]).explicit_direction, None);
        assert_eq!(config_from(&[("direction", "")]).explicit_direction, None);
        assert_eq!(config_from(&[("direction", "LEFT")]).explicit_direction, None);
    }

    #[test]
    fn test_speed_sanitization() {
        assert_eq!(sanitize_speed(Some("100")), 100.0);
        assert_eq!(sanitize_speed(Some(" 75 ")), 75.0);
        assert_eq!(sanitize_speed(Some("80px")), 80.0);
        assert_eq!(sanitize_speed(Some("12.5")), 12.5);
        assert_eq!(sanitize_speed(Some("fast")), DEFAULT_SPEED);
        assert_eq!(sanitize_speed(Some("0")), DEFAULT_SPEED);
        assert_eq!(sanitize_speed(Some("-20")), DEFAULT_SPEED);
        assert_eq!(sanitize_speed(Some("NaN")), DEFAULT_SPEED);
        assert_eq!(sanitize_speed(Some("inf")), DEFAULT_SPEED);
        assert_eq!(sanitize_speed(Some("5000")), MAX_SPEED);
        assert_eq!(sanitize_speed(None), DEFAULT_SPEED);
    }

    #[test]
    fn test_flags() {
        let config = config_from(&[("pauseonhover", "true"), ("persistent", " TRUE ")]);
        assert!(config.pause_on_hover);
        assert!(config.persistent);

        let config = config_from(&[("pauseonhover", "yes"), ("persistent", "false")]);
        assert!(!config.pause_on_hover);
        assert!(!config.persistent);
    }

    #[test]
    fn test_storage_key_prefers_id() {
        let config = config_from(&[("id", "ticker")]);
        assert_eq!(config.storage_key, "ticker-state");

        let config = MarqueeConfig::from_attributes(|_| None, None);
        assert_eq!(config.storage_key, "new-marquee-state");
    }

    #[test]
    fn test_storage_key_uses_key_base() {
        let config = MarqueeConfig::from_attributes(|_| None, Some("marquee"));
        assert_eq!(config.storage_key, "marquee-state");

        let config = MarqueeConfig::from_attributes(|_| Some("  ".to_string()), Some("marquee"));
        assert_eq!(config.storage_key, "marquee-state");
    }

    #[test]
    fn test_numeric_speed_is_sanitized() {
        assert_eq!(sanitize_speed_value(f64::NAN), DEFAULT_SPEED);
        assert_eq!(sanitize_speed_value(2500.0), MAX_SPEED);
        assert_eq!(sanitize_speed_value(100.0), 100.0);
    }
}
