//! Analog, PWM and digital line primitives

/// A physical I/O line (GPIO or ADC input number)
pub type Line = u8;

/// Errors from the I/O primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// No peripheral is wired to this line
    InvalidLine,
    /// The peripheral reported a failure
    Hardware,
}

/// Analog input (potentiometers, piezo discs, photoresistors)
///
/// Takes `&mut self` because ADC reads typically require mutable access.
pub trait AnalogInput {
    /// Read the raw ADC value on `line`
    fn read_analog(&mut self, line: Line) -> Result<u16, IoError>;
}

/// Servo pulse output
///
/// Values are pulse widths in microseconds at the servo frame rate.
pub trait PwmOutput {
    /// Drive `line` with a pulse of `pulse_us` microseconds
    fn write_pwm(&mut self, line: Line, pulse_us: u16) -> Result<(), IoError>;
}

/// Binary output (LEDs)
pub trait DigitalOutput {
    /// Set `line` high (`true`) or low
    fn write_digital(&mut self, line: Line, high: bool) -> Result<(), IoError>;
}

/// Everything the exhibit needs from a board
pub trait Board: AnalogInput + PwmOutput + DigitalOutput {}

// Blanket implementation for types that implement all three
impl<T: AnalogInput + PwmOutput + DigitalOutput> Board for T {}
