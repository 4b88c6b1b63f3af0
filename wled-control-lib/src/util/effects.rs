use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error::{Error, Result};

/// Built-in WLED effects, indexed by effect id.
pub const EFFECT_NAMES: &[&str] = &[
    "Solid",
    "Blink",
    "Breathe",
    "Wipe",
    "Wipe Random",
    "Random Colors",
    "Sweep",
    "Dynamic",
    "Colorloop",
    "Rainbow",
    "Scan",
    "Scan Dual",
    "Fade",
    "Theater",
    "Theater Rainbow",
    "Running",
    "Saw",
    "Twinkle",
    "Dissolve",
    "Dissolve Rnd",
    "Sparkle",
    "Sparkle Dark",
    "Sparkle+",
    "Strobe",
    "Strobe Rainbow",
    "Strobe Mega",
    "Blink Rainbow",
    "Android",
    "Chase",
    "Chase Random",
    "Chase Rainbow",
    "Chase Flash",
    "Chase Flash Rnd",
    "Rainbow Runner",
    "Colorful",
    "Traffic Light",
    "Sweep Random",
    "Chase 2",
    "Aurora",
    "Stream",
    "Scanner",
    "Lighthouse",
    "Fireworks",
    "Rain",
    "Tetrix",
    "Fire Flicker",
    "Gradient",
    "Loading",
    "Rolling Balls",
    "Fairy",
    "Two Dots",
    "Fairytwinkle",
    "Running Dual",
    "Image",
    "Chase 3",
    "Tri Wipe",
    "Tri Fade",
    "Lightning",
    "ICU",
    "Multi Comet",
    "Scanner Dual",
    "Stream 2",
    "Oscillate",
    "Pride 2015",
    "Juggle",
    "Palette",
    "Fire 2012",
    "Colorwaves",
    "Bpm",
    "Fill Noise",
    "Noise 1",
    "Noise 2",
    "Noise 3",
    "Noise 4",
    "Colortwinkles",
    "Lake",
    "Meteor",
    "Meteor Smooth",
    "Railway",
    "Ripple",
    "Twinklefox",
    "Twinklecat",
    "Halloween Eyes",
    "Solid Pattern",
    "Solid Pattern Tri",
    "Spots",
    "Spots Fade",
    "Glitter",
    "Candle",
    "Fireworks Starburst",
    "Fireworks 1D",
    "Bouncing Balls",
    "Sinelon",
    "Sinelon Dual",
    "Sinelon Rainbow",
    "Popcorn",
    "Drip",
    "Plasma",
    "Percent",
    "Ripple Rainbow",
    "Heartbeat",
    "Pacifica",
    "Candle Multi",
    "Solid Glitter",
    "Sunrise",
    "Phased",
    "Twinkleup",
    "Noise Pal",
    "Sine",
    "Phased Noise",
    "Flow",
    "Chunchun",
    "Dancing Shadows",
    "Washing Machine",
    "Rotozoomer",
    "Blends",
    "TV Simulator",
    "Dynamic Smooth",
];

/// Built-in WLED palettes, indexed by palette id.
pub const PALETTE_NAMES: &[&str] = &[
    "Default",
    "Random Cycle",
    "Color 1",
    "Colors 1&2",
    "Color Gradient",
    "Colors Only",
    "Party",
    "Cloud",
    "Lava",
    "Ocean",
    "Forest",
    "Rainbow",
    "Rainbow Bands",
    "Sunset",
    "Rivendell",
    "Breeze",
    "Red & Blue",
    "Yellowout",
    "Analogous",
    "Splash",
    "Pastel",
    "Sunset 2",
    "Beach",
    "Vintage",
    "Departure",
    "Landscape",
    "Beech",
    "Sherbet",
    "Hult",
    "Hult 64",
    "Drywet",
    "Jul",
    "Grintage",
    "Rewhi",
    "Tertiary",
    "Fire",
    "Icefire",
    "Cyane",
    "Light Pink",
    "Autumn",
    "Magenta",
    "Magred",
    "Yelmag",
    "Yelblu",
    "Orange & Teal",
    "Tiamat",
    "April Night",
    "Orangery",
    "C9",
    "Sakura",
    "Aurora",
    "Atlantica",
    "C9 2",
    "C9 New",
    "Temperature",
    "Aurora 2",
    "Retro Clown",
    "Candy",
    "Toxy Reaf",
    "Fairy Reaf",
    "Semi Blue",
    "Pink Candy",
    "Red Reaf",
    "Aqua Flash",
    "Yelblu Hot",
    "Lite Light",
    "Red Flash",
    "Blink Red",
    "Red Shift",
    "Red Tide",
    "Candy2",
];

/// Effect id of the static, single color effect.
pub const FX_SOLID: u8 = 0;
/// Effect id of the meteor effect.
pub const FX_METEOR: u8 = 76;

lazy_static! {
    static ref EFFECTS: HashMap<String, u8> = index_names(EFFECT_NAMES);
    static ref PALETTES: HashMap<String, u8> = index_names(PALETTE_NAMES);
}

fn index_names(names: &[&str]) -> HashMap<String, u8> {
    names
        .iter()
        .enumerate()
        .map(|(id, name)| (normalize(name), id as u8))
        .collect()
}

// Case and separator insensitive, so "Fire 2012", "fire_2012" and "FIRE-2012" match.
fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
}

fn lookup(kind: &str, table: &HashMap<String, u8>, name: &str) -> Result<u8> {
    let trimmed = name.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed
            .parse::<u8>()
            .map_err(|_| Error::invalid(format!("{} id out of range: {}", kind, trimmed)));
    }
    table
        .get(&normalize(trimmed))
        .copied()
        .ok_or_else(|| Error::invalid(format!("Unknown {}: {}", kind.to_lowercase(), name)))
}

/// Resolves an effect name or a numeric id string to an effect id.
pub fn effect_id(name: &str) -> Result<u8> {
    lookup("Effect", &EFFECTS, name)
}

/// Resolves a palette name or a numeric id string to a palette id.
pub fn palette_id(name: &str) -> Result<u8> {
    lookup("Palette", &PALETTES, name)
}

pub fn effect_name(id: u8) -> Option<&'static str> {
    EFFECT_NAMES.get(id as usize).copied()
}

pub fn palette_name(id: u8) -> Option<&'static str> {
    PALETTE_NAMES.get(id as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_lookup_by_name() {
        assert_eq!(effect_id("rainbow").unwrap(), 9);
        assert_eq!(effect_id("Rainbow").unwrap(), 9);
        assert_eq!(effect_id("fire_2012").unwrap(), 66);
        assert_eq!(effect_id("meteor").unwrap(), FX_METEOR);
        assert_eq!(effect_id("solid").unwrap(), FX_SOLID);
    }

    #[test]
    fn test_numeric_ids_pass_through() {
        assert_eq!(effect_id("42").unwrap(), 42);
        assert_eq!(palette_id("7").unwrap(), 7);
        assert!(effect_id("300").is_err());
    }

    #[test]
    fn test_unknown_names_fail() {
        assert!(effect_id("warp drive").is_err());
        assert!(palette_id("").is_err());
    }

    #[test]
    fn test_palette_lookup() {
        assert_eq!(palette_id("party").unwrap(), 6);
        assert_eq!(palette_id("Red & Blue").unwrap(), 16);
        assert_eq!(palette_name(8), Some("Lava"));
    }

    #[test]
    fn test_names_round_trip_through_ids() {
        for (id, name) in EFFECT_NAMES.iter().enumerate() {
            assert_eq!(effect_id(name).unwrap() as usize, id);
            assert_eq!(effect_name(id as u8), Some(*name));
        }
    }
}
