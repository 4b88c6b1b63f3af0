use log::{debug, info, warn};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::led::brightness::{validate_brightness, Brightness};
use crate::led::color::{resolve_color, ColorInput, Rgb};
use crate::led::progress::ProgressState;
use crate::led::segment::{
    fill_percentage, foreground_range, map_progress, percentage_to_index, to_index_array,
    Direction, Segment,
};
use crate::transport::{
    HttpConfig, HttpTransport, SegmentEncoding, SerialConfig, SerialTransport, Transport,
};
use crate::util::effects::{effect_id, palette_id, FX_METEOR, FX_SOLID};

use self::command::{DeviceInfoResponse, Power, SegmentCommand, StateCommand};

pub mod command;

/// LED count assumed when the device cannot tell us.
pub const DEFAULT_LED_COUNT: usize = 30;

const RELATIVE_CCT_MAX: u32 = 255;
const KELVIN_MIN: u32 = 1900;
const KELVIN_MAX: u32 = 10091;

const FALLING_BLOCK_SPEED: u8 = 200;

/// Optional knobs of [`ControlInterface::set_effect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectOptions {
    pub speed: u8,
    pub intensity: u8,
    /// Palette name or numeric id.
    pub palette: Option<String>,
}

impl Default for EffectOptions {
    fn default() -> Self {
        EffectOptions {
            speed: 128,
            intensity: 128,
            palette: None,
        }
    }
}

/// How [`ControlInterface::advanced_progress`] draws the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Light only the requested range.
    Range,
    /// Animated falling-block effect sized by the progress.
    FallingBlock,
}

impl TryFrom<u8> for ProgressMode {
    type Error = Error;

    fn try_from(mode: u8) -> Result<Self> {
        match mode {
            1 => Ok(ProgressMode::Range),
            2 => Ok(ProgressMode::FallingBlock),
            _ => Err(Error::invalid(format!("Mode must be 1 or 2, got {}", mode))),
        }
    }
}

/// High-level control of one WLED device.
///
/// Owns a [`Transport`] for its whole lifetime and remembers the progress bar
/// between calls. The transport is closed by [`ControlInterface::close`] or,
/// failing that, when the interface is dropped.
pub struct ControlInterface {
    transport: Box<dyn Transport>,
    led_count: Option<usize>,
    progress: ProgressState,
    background: Rgb,
    /// Segment ids `0..n` laid out by the last range command.
    active_segments: usize,
}

impl ControlInterface {
    /// Connects over HTTP to `host:port`.
    pub fn http(host: &str, port: u16) -> Result<Self> {
        Self::from_http_config(&HttpConfig::new(host).with_port(port))
    }

    pub fn from_http_config(config: &HttpConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Box::new(transport)))
    }

    /// Opens the serial port at `baud_rate`.
    pub fn serial(port: &str, baud_rate: u32) -> Result<Self> {
        Self::from_serial_config(&SerialConfig::new(port).with_baud_rate(baud_rate))
    }

    pub fn from_serial_config(config: &SerialConfig) -> Result<Self> {
        let transport = SerialTransport::open(config)?;
        Ok(Self::with_transport(Box::new(transport)))
    }

    /// Wraps an already connected transport and asks the device for its LED
    /// count. If that fails, [`DEFAULT_LED_COUNT`] is used instead.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        let mut control = ControlInterface {
            transport,
            led_count: None,
            progress: ProgressState::new(),
            background: Rgb::BLACK,
            active_segments: 0,
        };
        if let Err(e) = control.get_info() {
            warn!(
                "Could not read LED count, assuming {}: {}",
                DEFAULT_LED_COUNT, e
            );
        }
        control
    }

    /// The LED count in use: the first one the device reported, or the default.
    pub fn led_count(&self) -> usize {
        self.led_count.unwrap_or(DEFAULT_LED_COUNT)
    }

    /// Asks the device again and replaces the cached LED count.
    pub fn refresh_led_count(&mut self) -> Result<usize> {
        let info = self.transport.get_info()?;
        self.led_count = Some(info.led_count());
        Ok(info.led_count())
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn segment_encoding(&self) -> SegmentEncoding {
        self.transport.segment_encoding()
    }

    /// Device information. The first successful call also fixes the LED count.
    pub fn get_info(&mut self) -> Result<DeviceInfoResponse> {
        let info = self.transport.get_info()?;
        if self.led_count.is_none() {
            info!("Device reports {} LEDs", info.led_count());
            self.led_count = Some(info.led_count());
        }
        Ok(info)
    }

    pub fn get_state(&mut self) -> Result<Value> {
        self.transport.get_state()
    }

    /// Sends a raw state update.
    pub fn send(&mut self, command: &StateCommand) -> Result<Value> {
        self.transport.send(command)
    }

    pub fn turn_on(&mut self) -> Result<Value> {
        self.power(true)
    }

    pub fn turn_off(&mut self) -> Result<Value> {
        self.power(false)
    }

    pub fn power(&mut self, on: bool) -> Result<Value> {
        self.send(&StateCommand::power(on))
    }

    pub fn toggle(&mut self) -> Result<Value> {
        self.send(&StateCommand {
            on: Some(Power::Toggle),
            ..Default::default()
        })
    }

    /// Sets the master brightness, either 0..=255 or a percentage like `"50%"`.
    pub fn set_brightness(&mut self, brightness: impl Into<Brightness>) -> Result<Value> {
        let bri = validate_brightness(brightness)?;
        self.send(&StateCommand {
            bri: Some(bri),
            ..Default::default()
        })
    }

    /// Paints the whole strip in one color, keeping the running effect.
    pub fn set_color(&mut self, color: impl Into<ColorInput>) -> Result<Value> {
        let rgb = resolve_color(color)?;
        match self.whole_strip(rgb) {
            Some(segment) => {
                self.send_layout(StateCommand::segments(vec![segment]).with_on(true))
            }
            None => Ok(json!({})),
        }
    }

    /// Paints the whole strip in one color with the static effect.
    pub fn set_full_color(&mut self, color: impl Into<ColorInput>) -> Result<Value> {
        let rgb = resolve_color(color)?;
        match self.whole_strip(rgb) {
            Some(segment) => {
                let segment = SegmentCommand {
                    fx: Some(FX_SOLID),
                    ..segment
                };
                self.send_layout(StateCommand::segments(vec![segment]).with_on(true))
            }
            None => Ok(json!({})),
        }
    }

    /// Sets the white color temperature: a relative value 0..=255 (warm to
    /// cold), or an absolute Kelvin value clamped to 1900..=10091.
    pub fn set_color_temperature(&mut self, temperature: u32) -> Result<Value> {
        let cct = if temperature <= RELATIVE_CCT_MAX {
            temperature
        } else {
            temperature.clamp(KELVIN_MIN, KELVIN_MAX)
        };
        self.send(&StateCommand::segments(vec![SegmentCommand {
            cct: Some(cct as u16),
            ..Default::default()
        }]))
    }

    /// Starts an effect given by name (case-insensitive) or numeric id.
    pub fn set_effect(&mut self, effect: &str, options: &EffectOptions) -> Result<Value> {
        let fx = effect_id(effect)?;
        let pal = options.palette.as_deref().map(palette_id).transpose()?;
        let segment = SegmentCommand {
            id: Some(0),
            fx: Some(fx),
            sx: Some(options.speed),
            ix: Some(options.intensity),
            pal,
            ..Default::default()
        };
        self.send(&StateCommand::segments(vec![segment]).with_on(true))
    }

    /// Starts an effect by raw id.
    pub fn effect(&mut self, effect_id: u8, speed: u8, intensity: u8) -> Result<Value> {
        let segment = SegmentCommand {
            id: Some(0),
            fx: Some(effect_id),
            sx: Some(speed),
            ix: Some(intensity),
            ..Default::default()
        };
        self.send(&StateCommand::segments(vec![segment]).with_on(true))
    }

    /// Color used for the unlit part of progress bars. Black by default.
    pub fn set_progress_background(&mut self, color: impl Into<ColorInput>) -> Result<()> {
        self.background = resolve_color(color)?;
        Ok(())
    }

    /// `true` fills from the first LED, `false` from the last one.
    pub fn set_progress_direction(&mut self, forward: bool) {
        self.progress.set_direction(Direction::from(forward));
    }

    /// Draws a bar covering `[start_pct, end_pct]` and remembers `end_pct` as
    /// the current progress.
    pub fn set_progress(
        &mut self,
        start_pct: f64,
        end_pct: f64,
        color: impl Into<ColorInput>,
    ) -> Result<Value> {
        let rgb = resolve_color(color)?;
        let (start, end) = self.progress.set(start_pct, end_pct);
        debug!("Progress set to {}%..{}%", start, end);
        let segments = self.map(start, end, rgb);
        self.send_segments(segments)
    }

    /// Moves the current progress by `percentage_to_add` (negative shrinks the
    /// bar) and redraws the bar from its origin to the new edge.
    pub fn add_progress(
        &mut self,
        percentage_to_add: f64,
        color: impl Into<ColorInput>,
    ) -> Result<Value> {
        let rgb = resolve_color(color)?;
        let (start, end) = self.progress.add(percentage_to_add);
        debug!("Progress moved to {}%..{}%", start, end);
        let segments = self.map(start, end, rgb);
        self.send_segments(segments)
    }

    /// Lights `percentage` of the strip from the current direction's origin.
    /// The remembered progress is left alone.
    pub fn set_on_percentage(
        &mut self,
        percentage: f64,
        color: impl Into<ColorInput>,
        background: impl Into<ColorInput>,
    ) -> Result<Value> {
        let fg = resolve_color(color)?;
        let bg = resolve_color(background)?;
        let segments = fill_percentage(
            self.led_count(),
            percentage,
            self.progress.direction(),
            fg,
            bg,
        );
        self.send_segments(segments)
    }

    /// Progress bar with a choice of drawing mode (1 = range, 2 = falling
    /// block). Both percentages must lie in `0..=100`.
    pub fn advanced_progress(
        &mut self,
        progress: f64,
        start_pct: f64,
        mode: u8,
        color: impl Into<ColorInput>,
    ) -> Result<Value> {
        if !(0.0..=100.0).contains(&progress) || !(0.0..=100.0).contains(&start_pct) {
            return Err(Error::invalid(format!(
                "Progress and start_pct must be between 0 and 100: {}, {}",
                progress, start_pct
            )));
        }
        let mode = ProgressMode::try_from(mode)?;
        let rgb = resolve_color(color)?;

        match mode {
            ProgressMode::Range => {
                let segments = self.map(start_pct, progress, rgb);
                self.send_segments(segments)
            }
            ProgressMode::FallingBlock => match self.falling_block(start_pct, progress, rgb) {
                Some(command) => self.send_layout(command),
                None => {
                    debug!("Falling block range is empty, nothing to send");
                    Ok(json!({}))
                }
            },
        }
    }

    /// Blanks the strip and forgets the progress bar.
    pub fn clear(&mut self) -> Result<Value> {
        self.progress.clear();
        let segments = fill_percentage(
            self.led_count(),
            0.0,
            Direction::Forward,
            Rgb::BLACK,
            Rgb::BLACK,
        );
        match self.segment_command(segments) {
            Some(mut command) => {
                command.on = None;
                self.send_layout(command)
            }
            None => Ok(json!({})),
        }
    }

    /// Releases the transport. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.transport.is_closed() {
            self.transport.close();
        }
    }

    fn whole_strip(&self, rgb: Rgb) -> Option<SegmentCommand> {
        match self.led_count() {
            0 => None,
            led_count => Some(SegmentCommand::range(0, 0, led_count, rgb)),
        }
    }

    fn map(&self, start_pct: f64, end_pct: f64, foreground: Rgb) -> Vec<Segment> {
        map_progress(
            self.led_count(),
            start_pct,
            end_pct,
            self.progress.direction(),
            foreground,
            self.background,
        )
    }

    fn send_segments(&mut self, segments: Vec<Segment>) -> Result<Value> {
        match self.segment_command(segments) {
            Some(command) => self.send_layout(command),
            None => {
                debug!("Strip has no LEDs, nothing to send");
                Ok(json!({}))
            }
        }
    }

    /// Sends a command that lays out segment ids `0..n`. Over
    /// [`SegmentEncoding::Ranges`] the ids a previous layout used above `n`
    /// are deleted in the same request.
    fn send_layout(&mut self, mut command: StateCommand) -> Result<Value> {
        if self.transport.segment_encoding() != SegmentEncoding::Ranges {
            return self.send(&command);
        }
        let used = command.seg.len();
        command
            .seg
            .extend((used..self.active_segments).map(|id| SegmentCommand::delete(id as u8)));
        let reply = self.send(&command)?;
        self.active_segments = used;
        Ok(reply)
    }

    /// Encodes mapped segments for the transport in use. `None` when there is
    /// nothing to draw.
    fn segment_command(&self, segments: Vec<Segment>) -> Option<StateCommand> {
        let segments: Vec<Segment> = segments.into_iter().filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return None;
        }
        let seg = match self.transport.segment_encoding() {
            SegmentEncoding::Ranges => segments
                .iter()
                .enumerate()
                .map(|(id, segment)| SegmentCommand {
                    fx: Some(FX_SOLID),
                    ..SegmentCommand::range(id as u8, segment.start, segment.stop, segment.color)
                })
                .collect(),
            SegmentEncoding::IndexArray => vec![SegmentCommand {
                id: Some(0),
                fx: Some(FX_SOLID),
                i: Some(to_index_array(self.led_count(), &segments)),
                ..Default::default()
            }],
        };
        Some(StateCommand::segments(seg).with_on(true))
    }

    // The two transports draw this differently: over HTTP the effect runs
    // inside the requested range only, over serial it runs on the whole strip
    // and the progress only sets the effect intensity.
    fn falling_block(&self, start_pct: f64, progress: f64, rgb: Rgb) -> Option<StateCommand> {
        let led_count = self.led_count();
        if led_count == 0 {
            return None;
        }
        let segment = match self.transport.segment_encoding() {
            SegmentEncoding::Ranges => {
                let (start, stop) = foreground_range(
                    led_count,
                    start_pct,
                    progress,
                    self.progress.direction(),
                );
                if start == stop {
                    return None;
                }
                SegmentCommand {
                    fx: Some(FX_METEOR),
                    sx: Some(FALLING_BLOCK_SPEED),
                    ix: Some(128),
                    ..SegmentCommand::range(0, start, stop, rgb)
                }
            }
            SegmentEncoding::IndexArray => {
                let end_led = percentage_to_index(led_count, progress);
                SegmentCommand {
                    fx: Some(FX_METEOR),
                    sx: Some(FALLING_BLOCK_SPEED),
                    ix: Some((end_led * 8).min(u8::MAX as usize) as u8),
                    col: Some(vec![rgb]),
                    ..Default::default()
                }
            }
        };
        Some(StateCommand::segments(vec![segment]).with_on(true))
    }
}

impl Drop for ControlInterface {
    fn drop(&mut self) {
        self.close();
    }
}
