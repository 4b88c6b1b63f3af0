use std::fmt;

use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// An 8-bit RGB color. On the wire it is a `[r, g, b]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Rgb { red, green, blue }
    }

    /// Lowercase `#rrggbb` form of the color.
    pub fn to_hex(&self) -> String {
        format!("#{}", hex::encode([self.red, self.green, self.blue]))
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from(tuple: (u8, u8, u8)) -> Self {
        Rgb::new(tuple.0, tuple.1, tuple.2)
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(rgb: Rgb) -> Self {
        (rgb.red, rgb.green, rgb.blue)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(array: [u8; 3]) -> Self {
        Rgb::new(array[0], array[1], array[2])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.red, self.green, self.blue)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        [self.red, self.green, self.blue].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let components = <[u8; 3]>::deserialize(deserializer)?;
        Ok(components.into())
    }
}

lazy_static! {
    /// Names accepted in addition to the CSS color keywords. These take
    /// precedence, so `green` is full-intensity green rather than CSS `#008000`.
    static ref COLOR_NAMES: HashMap<&'static str, Rgb> = {
        let mut m = HashMap::new();
        m.insert("red", Rgb::new(255, 0, 0));
        m.insert("green", Rgb::new(0, 255, 0));
        m.insert("blue", Rgb::new(0, 0, 255));
        m.insert("white", Rgb::new(255, 255, 255));
        m.insert("black", Rgb::new(0, 0, 0));
        m.insert("yellow", Rgb::new(255, 255, 0));
        m.insert("cyan", Rgb::new(0, 255, 255));
        m.insert("magenta", Rgb::new(255, 0, 255));
        m.insert("orange", Rgb::new(255, 165, 0));
        m.insert("purple", Rgb::new(128, 0, 128));
        m.insert("pink", Rgb::new(255, 192, 203));
        m.insert("teal", Rgb::new(0, 128, 128));
        m.insert("lime", Rgb::new(0, 255, 0));
        m.insert("brown", Rgb::new(165, 42, 42));
        m.insert("navy", Rgb::new(0, 0, 128));
        m.insert("olive", Rgb::new(128, 128, 0));
        m
    };
}

/// Anything the client accepts as a color: a name, a `#RGB`/`#RRGGBB` string,
/// an already validated [`Rgb`], or a loose integer sequence that still needs
/// range checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorInput {
    Text(String),
    Rgb(Rgb),
    Components(Vec<i64>),
}

impl From<&str> for ColorInput {
    fn from(text: &str) -> Self {
        ColorInput::Text(text.to_string())
    }
}

impl From<String> for ColorInput {
    fn from(text: String) -> Self {
        ColorInput::Text(text)
    }
}

impl From<Rgb> for ColorInput {
    fn from(rgb: Rgb) -> Self {
        ColorInput::Rgb(rgb)
    }
}

impl From<(u8, u8, u8)> for ColorInput {
    fn from(tuple: (u8, u8, u8)) -> Self {
        ColorInput::Rgb(tuple.into())
    }
}

impl From<[u8; 3]> for ColorInput {
    fn from(array: [u8; 3]) -> Self {
        ColorInput::Rgb(array.into())
    }
}

impl From<Vec<i64>> for ColorInput {
    fn from(components: Vec<i64>) -> Self {
        ColorInput::Components(components)
    }
}

impl From<&[i64]> for ColorInput {
    fn from(components: &[i64]) -> Self {
        ColorInput::Components(components.to_vec())
    }
}

/// Resolves a color argument into a validated [`Rgb`].
///
/// Text is looked up in this order:
///
/// 1. `#RGB` or `#RRGGBB` hex.
/// 2. The sixteen basic names (`red`, `green`, `navy`, ...), case-insensitive.
///    `green` is `#00ff00` here, not the CSS `#008000`.
/// 3. Any other CSS color keyword, such as `lavender` or `coral`.
///
/// Only text matching none of these is an invalid value. Triples and
/// component lists must have exactly three channels in `0..=255`.
pub fn resolve_color(color: impl Into<ColorInput>) -> Result<Rgb> {
    match color.into() {
        ColorInput::Rgb(rgb) => Ok(rgb),
        ColorInput::Components(components) => from_components(&components),
        ColorInput::Text(text) => from_text(&text),
    }
}

fn from_components(components: &[i64]) -> Result<Rgb> {
    if components.len() != 3 {
        return Err(Error::invalid(format!(
            "RGB color needs exactly 3 components, got {}",
            components.len()
        )));
    }
    let mut channels = [0u8; 3];
    for (channel, &value) in channels.iter_mut().zip(components) {
        *channel = u8::try_from(value)
            .map_err(|_| Error::invalid(format!("Invalid RGB color: {:?}", components)))?;
    }
    Ok(channels.into())
}

fn from_text(text: &str) -> Result<Rgb> {
    let name = text.trim().to_lowercase();

    if let Some(hex_digits) = name.strip_prefix('#') {
        return from_hex(hex_digits).ok_or_else(|| {
            Error::invalid(format!(
                "Invalid color format: {}. Use color name, hex (e.g., #FF0000), or RGB tuple.",
                text
            ))
        });
    }

    if let Some(rgb) = COLOR_NAMES.get(name.as_str()) {
        return Ok(*rgb);
    }

    palette::named::from_str(&name)
        .map(|srgb| Rgb::new(srgb.red, srgb.green, srgb.blue))
        .ok_or_else(|| Error::invalid(format!("Unknown color name: {}", text)))
}

fn from_hex(digits: &str) -> Option<Rgb> {
    let expanded = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => digits.to_string(),
        _ => return None,
    };
    let bytes = hex::decode(expanded).ok()?;
    Some(Rgb::new(bytes[0], bytes[1], bytes[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_resolve_rgb_is_identity() {
        let rgb = Rgb::new(12, 34, 56);
        assert_eq!(resolve_color(rgb).unwrap(), rgb);
        assert_eq!(resolve_color((12u8, 34u8, 56u8)).unwrap(), rgb);
    }

    #[test]
    fn test_resolve_name_is_case_insensitive() {
        assert_eq!(resolve_color("red").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(resolve_color("RED").unwrap(), resolve_color("red").unwrap());
        assert_eq!(resolve_color(" Navy ").unwrap(), Rgb::new(0, 0, 128));
    }

    #[test]
    fn test_own_table_wins_over_css() {
        assert_eq!(resolve_color("green").unwrap(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn test_css_names_are_accepted() {
        assert_eq!(resolve_color("lavender").unwrap(), Rgb::new(230, 230, 250));
    }

    #[test]
    fn test_resolve_hex() {
        assert_eq!(resolve_color("#00ff00").unwrap(), Rgb::new(0, 255, 0));
        assert_eq!(resolve_color("#FF8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(resolve_color("#0f0").unwrap(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn test_bad_hex_is_rejected() {
        for bad in ["#12345", "#gg0000", "#", "#1234567"] {
            let err = resolve_color(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidValue, "{}", bad);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = resolve_color("not-a-color").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_components_are_range_checked() {
        assert_eq!(resolve_color(vec![1i64, 2, 3]).unwrap(), Rgb::new(1, 2, 3));
        assert!(resolve_color(vec![256i64, 0, 0]).is_err());
        assert!(resolve_color(vec![-1i64, 0, 0]).is_err());
        assert!(resolve_color(vec![1i64, 2]).is_err());
        assert!(resolve_color(vec![1i64, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgb::new(255, 0, 16).to_hex(), "#ff0010");
    }

    #[test]
    fn test_wire_format_is_triple() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(json, "[1,2,3]");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(1, 2, 3));
    }
}
