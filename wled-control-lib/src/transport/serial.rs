use std::io::{self, Read, Write};
use std::thread::sleep;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde_json::{json, Value};
use serialport::{ClearBuffer, SerialPort};

use crate::control_interface::command::{DeviceInfoResponse, StateCommand};
use crate::error::{Error, Result};
use crate::transport::{SegmentEncoding, Transport};
use crate::util::traits::check_reply;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_SERIAL_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Per-read timeout of the port. Replies are assembled from several reads
/// until the overall [`SerialConfig::timeout`] expires.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where and how to reach a device over a serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    /// Upper bound for one command/reply exchange.
    pub timeout: Duration,
    /// Pause after opening the port, before the first buffers are cleared.
    pub settle_delay: Duration,
}

impl SerialConfig {
    pub fn new(port: &str) -> Self {
        SerialConfig {
            port: port.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_SERIAL_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

/// The byte stream under a [`SerialTransport`].
pub trait SerialLink: Read + Write {
    /// Drops whatever the device sent that nobody read yet.
    fn clear_input(&mut self) -> io::Result<()>;

    fn clear_output(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialLink for Box<dyn SerialPort> {
    fn clear_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }

    fn clear_output(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Output).map_err(io::Error::from)
    }
}

/// Talks to the WLED serial JSON API: one JSON document per line.
pub struct SerialTransport<L: SerialLink = Box<dyn SerialPort>> {
    name: String,
    link: Option<L>,
    timeout: Duration,
    pending: Vec<u8>,
}

impl SerialTransport<Box<dyn SerialPort>> {
    /// Opens the port and waits for it to settle.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(POLL_INTERVAL)
            .open()
            .map_err(|e| {
                Error::Connection(format!(
                    "Could not connect to WLED device at {}: {}",
                    config.port, e
                ))
            })?;
        info!(
            "Opened serial port {} at {} baud",
            config.port, config.baud_rate
        );
        sleep(config.settle_delay);

        let mut transport = SerialTransport::with_link(&config.port, port, config.timeout);
        transport.reset_link()?;
        Ok(transport)
    }
}

impl<L: SerialLink> SerialTransport<L> {
    pub fn with_link(name: &str, link: L, timeout: Duration) -> Self {
        SerialTransport {
            name: name.to_string(),
            link: Some(link),
            timeout,
            pending: Vec::new(),
        }
    }

    fn link(&mut self) -> Result<&mut L> {
        self.link
            .as_mut()
            .ok_or_else(|| Error::Connection(format!("Serial port {} is closed", self.name)))
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        debug!("{} <- {}", self.name, line);
        let link = self.link()?;
        link.write_all(line.as_bytes())?;
        link.write_all(b"\n")?;
        link.flush()?;
        Ok(())
    }

    /// Reads one line, without its terminator, unless `deadline` passes first.
    fn read_line(&mut self, deadline: Instant) -> Result<Option<String>> {
        let mut chunk = [0u8; 256];
        loop {
            if let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=end).collect();
                let line = String::from_utf8_lossy(&line).trim().to_string();
                debug!("{} -> {}", self.name, line);
                return Ok(Some(line));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            let read = match self.link()?.read(&mut chunk) {
                Ok(read) => read,
                Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => 0,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if read == 0 {
                sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
            } else {
                self.pending.extend_from_slice(&chunk[..read]);
            }
        }
    }

    /// Reads lines until they form one JSON document.
    fn read_json(&mut self, first_line: String, deadline: Instant) -> Result<Value> {
        let mut document = first_line;
        loop {
            if let Ok(value) = serde_json::from_str::<Value>(&document) {
                return Ok(value);
            }
            match self.read_line(deadline)? {
                Some(line) => {
                    document.push('\n');
                    document.push_str(&line);
                }
                None => {
                    return Err(Error::Response(format!(
                        "Invalid JSON response: {}",
                        document
                    )))
                }
            }
        }
    }

    /// Reads the reply to a command: an `OK` acknowledgement or a JSON document.
    fn read_reply(&mut self) -> Result<Value> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let line = self.read_line(deadline)?.ok_or_else(|| {
                Error::Command(format!(
                    "No reply from {} within {:?}",
                    self.name, self.timeout
                ))
            })?;
            if line.is_empty() {
                continue;
            }
            if line.starts_with("OK") {
                return Ok(json!({"success": true}));
            }
            if line.starts_with('{') || line.starts_with('[') {
                return self.read_json(line, deadline);
            }
            return Err(Error::Command(format!("Command failed: {}", line)));
        }
    }

    /// Empties both directions of a freshly opened link. Failing here means the
    /// port is unusable, so it is a connection error.
    fn reset_link(&mut self) -> Result<()> {
        let name = self.name.clone();
        let link = self.link()?;
        link.clear_input()
            .and_then(|_| link.clear_output())
            .map_err(|e| {
                Error::Connection(format!("Could not reset serial port {}: {}", name, e))
            })
    }

    /// Drops leftovers of earlier exchanges, such as a late `OK`, so they are
    /// not taken for the next reply.
    fn discard_input(&mut self) -> Result<()> {
        self.pending.clear();
        self.link()?.clear_input()?;
        Ok(())
    }

    /// Asks for the full `{"state": ..., "info": ...}` document.
    fn request_full_state(&mut self) -> Result<Value> {
        self.discard_input()?;
        let request = StateCommand {
            v: Some(true),
            ..Default::default()
        };
        self.write_line(&serde_json::to_string(&request)?)?;
        check_reply(self.read_reply()?)
    }
}

impl<L: SerialLink> Transport for SerialTransport<L> {
    fn send(&mut self, command: &StateCommand) -> Result<Value> {
        self.discard_input()?;
        self.write_line(&serde_json::to_string(command)?)?;
        check_reply(self.read_reply()?)
    }

    fn get_info(&mut self) -> Result<DeviceInfoResponse> {
        DeviceInfoResponse::from_reply(self.request_full_state()?)
    }

    fn get_state(&mut self) -> Result<Value> {
        let mut reply = self.request_full_state()?;
        match reply.get_mut("state") {
            Some(state) => Ok(state.take()),
            None => Ok(reply),
        }
    }

    fn segment_encoding(&self) -> SegmentEncoding {
        SegmentEncoding::IndexArray
    }

    fn close(&mut self) {
        if let Some(mut link) = self.link.take() {
            if let Err(e) = link.flush() {
                warn!("Failed to flush {} before closing: {}", self.name, e);
            }
            info!("Closed serial port {}", self.name);
        }
    }

    fn is_closed(&self) -> bool {
        self.link.is_none()
    }
}

impl<L: SerialLink> Drop for SerialTransport<L> {
    fn drop(&mut self) {
        self.close();
    }
}
