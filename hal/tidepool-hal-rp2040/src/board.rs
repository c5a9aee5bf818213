//! RP2040 exhibit board
//!
//! Maps the line numbers used by `tidepool-core` onto peripherals:
//!
//! - PWM lines are GPIO numbers. Each servo owns one PWM slice and drives
//!   its channel A pin with a 50 Hz frame and 1 µs compare resolution.
//! - Digital lines are GPIO numbers driving active-high LEDs.
//! - Analog lines are multiplexer channels. The RP2040 only exposes four
//!   ADC pins, so 8:1 analog multiplexers sit in front of the ADC inputs
//!   and share three select lines. Analog line `n` is channel `n % 8` of
//!   the multiplexer on ADC input `n / 8`.

use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use heapless::Vec;

use tidepool_core::traits::{AnalogInput, DigitalOutput, IoError, Line, PwmOutput};

use crate::lines::{LineAllocator, LineError};

/// PWM clock divider: 125 MHz system clock down to a 1 MHz counter
pub const SERVO_PWM_DIVIDER: u8 = 125;

/// Servo frame length in counter ticks (µs)
pub const SERVO_FRAME_US: u16 = 20_000;

/// Channels per analog multiplexer
pub const MUX_CHANNELS: u8 = 8;

/// Multiplexed ADC inputs
pub const MUX_INPUTS: usize = 2;

/// Busy-wait after switching the multiplexer (~10 µs at 125 MHz)
pub const MUX_SETTLE_CYCLES: u32 = 1_250;

/// Servo outputs a board can hold
pub const MAX_SERVO_OUTPUTS: usize = 8;

/// LED outputs a board can hold
pub const MAX_DIGITAL_OUTPUTS: usize = 4;

/// Board assembly errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardError {
    /// The line cannot be used
    Line(LineError),
    /// No room for another output of this kind
    Full,
}

impl From<LineError> for BoardError {
    fn from(e: LineError) -> Self {
        BoardError::Line(e)
    }
}

/// PWM configuration for a servo pulse of `pulse_us`
pub fn servo_pwm_config(pulse_us: u16) -> PwmConfig {
    let mut config = PwmConfig::default();
    config.divider = SERVO_PWM_DIVIDER.into();
    config.top = SERVO_FRAME_US - 1;
    config.compare_a = pulse_us.min(SERVO_FRAME_US - 1);
    config
}

/// Analog multiplexers in front of the ADC
pub struct AnalogMux<'d> {
    adc: Adc<'d, Blocking>,
    inputs: [Channel<'d>; MUX_INPUTS],
    select: [Output<'d>; 3],
    selected: Option<u8>,
}

impl<'d> AnalogMux<'d> {
    /// `select` is ordered from the least significant bit
    pub fn new(
        adc: Adc<'d, Blocking>,
        inputs: [Channel<'d>; MUX_INPUTS],
        select: [Output<'d>; 3],
    ) -> Self {
        Self {
            adc,
            inputs,
            select,
            selected: None,
        }
    }

    /// Number of analog lines behind the multiplexers
    pub const fn line_count() -> u8 {
        MUX_CHANNELS * MUX_INPUTS as u8
    }

    fn select_channel(&mut self, channel: u8) {
        if self.selected == Some(channel) {
            return;
        }
        for (bit, pin) in self.select.iter_mut().enumerate() {
            pin.set_level(Level::from(channel & (1 << bit) != 0));
        }
        self.selected = Some(channel);
        cortex_m::asm::delay(MUX_SETTLE_CYCLES);
    }

    /// Blocking 12-bit conversion of analog `line`
    pub fn read(&mut self, line: Line) -> Result<u16, IoError> {
        let input = (line / MUX_CHANNELS) as usize;
        if input >= MUX_INPUTS {
            return Err(IoError::InvalidLine);
        }
        self.select_channel(line % MUX_CHANNELS);
        self.adc
            .blocking_read(&mut self.inputs[input])
            .map_err(|_| IoError::Hardware)
    }
}

struct ServoOutput<'d> {
    line: Line,
    pwm: Pwm<'d>,
    config: PwmConfig,
}

/// The exhibit controller board
pub struct Rp2040Board<'d> {
    mux: AnalogMux<'d>,
    servos: Vec<ServoOutput<'d>, MAX_SERVO_OUTPUTS>,
    outputs: Vec<(Line, Output<'d>), MAX_DIGITAL_OUTPUTS>,
    lines: LineAllocator,
}

impl<'d> Rp2040Board<'d> {
    pub fn new(mux: AnalogMux<'d>) -> Self {
        Self {
            mux,
            servos: Vec::new(),
            outputs: Vec::new(),
            lines: LineAllocator::new(),
        }
    }

    /// Attach a servo PWM on GPIO `line`, parked at `idle_pulse_us`
    ///
    /// `pwm` must already be bound to the slice and channel A pin of
    /// `line`.
    pub fn add_servo(
        &mut self,
        line: Line,
        mut pwm: Pwm<'d>,
        idle_pulse_us: u16,
    ) -> Result<(), BoardError> {
        if self.servos.is_full() {
            return Err(BoardError::Full);
        }
        self.lines.claim(line)?;

        let config = servo_pwm_config(idle_pulse_us);
        pwm.set_config(&config);
        self.servos
            .push(ServoOutput { line, pwm, config })
            .map_err(|_| BoardError::Full)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("Servo output on GPIO{} at {}us", line, idle_pulse_us);
        Ok(())
    }

    /// Attach an LED driven by `output` on GPIO `line`
    pub fn add_led(&mut self, line: Line, output: Output<'d>) -> Result<(), BoardError> {
        if self.outputs.is_full() {
            return Err(BoardError::Full);
        }
        self.lines.claim(line)?;
        self.outputs
            .push((line, output))
            .map_err(|_| BoardError::Full)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("LED output on GPIO{}", line);
        Ok(())
    }

    /// Number of GPIO lines in use by outputs
    pub fn output_count(&self) -> usize {
        self.lines.claimed_count()
    }
}

impl AnalogInput for Rp2040Board<'_> {
    fn read_analog(&mut self, line: Line) -> Result<u16, IoError> {
        self.mux.read(line)
    }
}

impl PwmOutput for Rp2040Board<'_> {
    fn write_pwm(&mut self, line: Line, pulse_us: u16) -> Result<(), IoError> {
        let servo = self
            .servos
            .iter_mut()
            .find(|s| s.line == line)
            .ok_or(IoError::InvalidLine)?;

        let compare = pulse_us.min(SERVO_FRAME_US - 1);
        if servo.config.compare_a != compare {
            servo.config.compare_a = compare;
            servo.pwm.set_config(&servo.config);
        }
        Ok(())
    }
}

impl DigitalOutput for Rp2040Board<'_> {
    fn write_digital(&mut self, line: Line, high: bool) -> Result<(), IoError> {
        let (_, output) = self
            .outputs
            .iter_mut()
            .find(|(l, _)| *l == line)
            .ok_or(IoError::InvalidLine)?;
        output.set_level(Level::from(high));
        Ok(())
    }
}
