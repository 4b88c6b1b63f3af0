//! # WLED Control Library
//!
//! `wled-control-lib` is a Rust library for controlling WLED-powered addressable
//! LED strips. It talks to the device's JSON API over HTTP or over a serial
//! link, and offers high-level operations on top: colors, brightness, effects
//! and progress bars.
//!
//! ## Features
//!
//! - HTTP and serial transports behind one [`transport::Transport`] trait
//! - Color names, `#RGB`/`#RRGGBB` hex strings and RGB triples
//! - Brightness as 0..=255 or as a percentage such as `"50%"`
//! - Progress bars in either direction, set or advanced incrementally
//! - Effect and palette lookup by name
//!
//! ## Example
//!
//! ```no_run
//! use wled_control_lib::control_interface::ControlInterface;
//!
//! fn main() -> Result<(), wled_control_lib::Error> {
//!     let mut control = ControlInterface::http("wled.local", 80)?;
//!
//!     control.set_brightness("50%")?;
//!     control.set_progress(0.0, 30.0, "blue")?;
//!     control.add_progress(40.0, "red")?;
//!
//!     control.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Disclaimer
//!
//! This project is not affiliated with, authorized by, endorsed by, or in any way officially connected
//! with the WLED project.

// The `control_interface` module holds the high-level [`control_interface::ControlInterface`]
// and the JSON wire types it sends and receives.
pub mod control_interface;

pub mod error;

// The `led` module holds the pure parts: color and brightness parsing, and the
// mapping of progress percentages onto LED segments.
pub mod led;

pub mod transport;

// Lookup tables and reply decoding shared by the transports and the interface.
pub mod util;

pub use error::{Error, ErrorKind, Result};
