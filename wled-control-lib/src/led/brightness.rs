use crate::error::{Error, Result};

/// A brightness argument: an absolute level, or text which is either a plain
/// level (`"128"`) or a percentage (`"50%"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Brightness {
    Level(i64),
    Text(String),
}

impl From<u8> for Brightness {
    fn from(level: u8) -> Self {
        Brightness::Level(level as i64)
    }
}

impl From<i32> for Brightness {
    fn from(level: i32) -> Self {
        Brightness::Level(level as i64)
    }
}

impl From<u32> for Brightness {
    fn from(level: u32) -> Self {
        Brightness::Level(level as i64)
    }
}

impl From<i64> for Brightness {
    fn from(level: i64) -> Self {
        Brightness::Level(level)
    }
}

impl From<&str> for Brightness {
    fn from(text: &str) -> Self {
        Brightness::Text(text.to_string())
    }
}

impl From<String> for Brightness {
    fn from(text: String) -> Self {
        Brightness::Text(text)
    }
}

/// Normalizes a brightness argument to the device range 0..=255.
///
/// Percentages are scaled with `round(pct * 255 / 100)`, so `"50%"` is 128.
pub fn validate_brightness(brightness: impl Into<Brightness>) -> Result<u8> {
    match brightness.into() {
        Brightness::Level(level) => level_to_u8(level),
        Brightness::Text(text) => {
            let trimmed = text.trim();
            if let Some(number) = trimmed.strip_suffix('%') {
                let percentage: f64 = number.trim().parse().map_err(|_| {
                    Error::invalid(format!("Invalid brightness percentage: {}", text))
                })?;
                percentage_to_u8(percentage)
            } else {
                let level: i64 = trimmed.parse().map_err(|_| {
                    Error::invalid(format!(
                        "Brightness must be a number between 0 and 255: {}",
                        text
                    ))
                })?;
                level_to_u8(level)
            }
        }
    }
}

fn level_to_u8(level: i64) -> Result<u8> {
    u8::try_from(level).map_err(|_| {
        Error::invalid(format!(
            "Brightness must be a number between 0 and 255: {}",
            level
        ))
    })
}

fn percentage_to_u8(percentage: f64) -> Result<u8> {
    if !(0.0..=100.0).contains(&percentage) {
        return Err(Error::invalid(format!(
            "Brightness percentage must be between 0% and 100%: {}%",
            percentage
        )));
    }
    Ok((percentage * 255.0 / 100.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_percentages() {
        assert_eq!(validate_brightness("50%").unwrap(), 128);
        assert_eq!(validate_brightness("0%").unwrap(), 0);
        assert_eq!(validate_brightness("100%").unwrap(), 255);
        assert_eq!(validate_brightness("10%").unwrap(), 26);
        assert_eq!(validate_brightness(" 25.5 %").unwrap(), 65);
    }

    #[test]
    fn test_absolute_levels() {
        assert_eq!(validate_brightness(0i64).unwrap(), 0);
        assert_eq!(validate_brightness(255i64).unwrap(), 255);
        assert_eq!(validate_brightness(200u8).unwrap(), 200);
        assert_eq!(validate_brightness("42").unwrap(), 42);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        for err in [
            validate_brightness(300i64).unwrap_err(),
            validate_brightness(-1i64).unwrap_err(),
            validate_brightness("101%").unwrap_err(),
            validate_brightness("-5%").unwrap_err(),
            validate_brightness("256").unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::InvalidValue);
        }
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        assert!(validate_brightness("bright").is_err());
        assert!(validate_brightness("%").is_err());
        assert!(validate_brightness("abc%").is_err());
        assert!(validate_brightness("NaN%").is_err());
    }
}
