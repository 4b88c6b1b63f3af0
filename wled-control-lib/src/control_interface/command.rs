use derivative::Derivative;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::led::color::Rgb;

/// Value of the `on` key: an explicit state, or `"t"` to toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    Set(bool),
    Toggle,
}

impl Serialize for Power {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Power::Set(on) => serializer.serialize_bool(*on),
            Power::Toggle => serializer.serialize_str("t"),
        }
    }
}

/// A state update in the WLED JSON API (`POST /json/state`).
///
/// Only the keys that are set are sent, so the device leaves everything else
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<Power>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub seg: Vec<SegmentCommand>,
    /// Ask the device to answer with its full state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<bool>,
}

impl StateCommand {
    pub fn power(on: bool) -> Self {
        StateCommand {
            on: Some(Power::Set(on)),
            ..Default::default()
        }
    }

    pub fn segments(seg: Vec<SegmentCommand>) -> Self {
        StateCommand {
            seg,
            ..Default::default()
        }
    }

    pub fn with_on(mut self, on: bool) -> Self {
        self.on = Some(Power::Set(on));
        self
    }
}

/// One entry of the `seg` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<Vec<Rgb>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fx: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sx: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ix: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pal: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cct: Option<u16>,
    /// Per-LED colors, one triple per LED starting at index 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i: Option<Vec<Rgb>>,
}

impl SegmentCommand {
    /// A segment spanning `[start, stop)` with a single primary color.
    pub fn range(id: u8, start: usize, stop: usize, color: Rgb) -> Self {
        SegmentCommand {
            id: Some(id),
            start: Some(start),
            stop: Some(stop),
            col: Some(vec![color]),
            ..Default::default()
        }
    }

    /// Removes segment `id` from the device. WLED deletes a segment whose
    /// stop is 0.
    pub fn delete(id: u8) -> Self {
        SegmentCommand {
            id: Some(id),
            stop: Some(0),
            ..Default::default()
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LedInfo {
    pub count: usize,
    /// Estimated current draw in milliamperes.
    pub pwr: u32,
    pub fps: u32,
    pub maxpwr: u32,
    pub maxseg: u32,
}

/// The reply of `GET /json/info`.
///
/// Keys not modelled here are kept in `extra`.
#[derive(Derivative)]
#[derivative(PartialEq)]
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DeviceInfoResponse {
    pub ver: String,
    pub name: String,
    pub leds: LedInfo,
    pub arch: String,
    pub mac: String,

    // Changes while the device stays the same.
    #[derivative(PartialEq = "ignore")]
    pub uptime: u64,
    #[derivative(PartialEq = "ignore")]
    pub freeheap: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceInfoResponse {
    /// Decodes an info reply. Replies that wrap the object as `{"info": {...}}`,
    /// like the combined `/json` endpoint does, are unwrapped first.
    pub fn from_reply(mut reply: Value) -> Result<Self> {
        if let Some(inner) = reply.get_mut("info").filter(|info| info.is_object()) {
            let inner = inner.take();
            return Ok(serde_json::from_value(inner)?);
        }
        Ok(serde_json::from_value(reply)?)
    }

    pub fn led_count(&self) -> usize {
        self.leds.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_keys_are_omitted() {
        let command = StateCommand {
            bri: Some(128),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&command).unwrap(), json!({"bri": 128}));
    }

    #[test]
    fn test_toggle_is_t() {
        let command = StateCommand {
            on: Some(Power::Toggle),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&command).unwrap(), json!({"on": "t"}));
    }

    #[test]
    fn test_range_segment() {
        let command = StateCommand::segments(vec![SegmentCommand {
            fx: Some(0),
            ..SegmentCommand::range(1, 3, 9, Rgb::new(0, 0, 255))
        }])
        .with_on(true);
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "on": true,
                "seg": [{"id": 1, "start": 3, "stop": 9, "col": [[0, 0, 255]], "fx": 0}]
            })
        );
    }

    #[test]
    fn test_info_reply() {
        let info = DeviceInfoResponse::from_reply(json!({
            "ver": "0.14.0",
            "name": "Desk",
            "leds": {"count": 60, "pwr": 120, "maxseg": 32},
            "uptime": 1234,
            "wifi": {"rssi": -60}
        }))
        .unwrap();
        assert_eq!(info.led_count(), 60);
        assert_eq!(info.name, "Desk");
        assert_eq!(info.extra["wifi"]["rssi"], json!(-60));
    }

    #[test]
    fn test_wrapped_info_reply() {
        let info = DeviceInfoResponse::from_reply(json!({
            "state": {"on": true},
            "info": {"leds": {"count": 144}}
        }))
        .unwrap();
        assert_eq!(info.led_count(), 144);
    }

    #[test]
    fn test_uptime_ignored_in_equality() {
        let a = DeviceInfoResponse {
            name: "a".into(),
            uptime: 1,
            ..Default::default()
        };
        let b = DeviceInfoResponse {
            uptime: 99,
            ..a.clone()
        };
        assert_eq!(a, b);
    }
}
