//! Transports carry [`StateCommand`]s to a device and bring its replies back.
//!
//! Both transports speak the same JSON API. They differ in how a progress bar
//! is laid out on the wire, see [`SegmentEncoding`].

use serde_json::Value;

use crate::control_interface::command::{DeviceInfoResponse, StateCommand};
use crate::error::Result;

pub mod http;
pub mod serial;

pub use http::{HttpConfig, HttpTransport};
pub use serial::{SerialConfig, SerialLink, SerialTransport};

/// How mapped LED segments are encoded in a `seg` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEncoding {
    /// One segment descriptor per range, with `start`/`stop` bounds.
    Ranges,
    /// A single segment with an `i` array holding one color per LED.
    IndexArray,
}

/// A connection to one WLED device.
///
/// A transport owns its socket or port exclusively. Calls block until the
/// device answers or the transport's timeout expires.
pub trait Transport {
    /// Sends a state update and returns the device's reply.
    fn send(&mut self, command: &StateCommand) -> Result<Value>;

    fn get_info(&mut self) -> Result<DeviceInfoResponse>;

    fn get_state(&mut self) -> Result<Value>;

    fn segment_encoding(&self) -> SegmentEncoding;

    /// Releases the socket or port. Calling it again is a no-op.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}
