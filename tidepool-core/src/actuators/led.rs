//! Binary LED output

use crate::arena::{Entity, Handle};
use crate::error::{EntityKind, Error};
use crate::traits::{DigitalOutput, Line};

/// Handle to an LED
pub type LedId = Handle<Led>;

/// Active-high LED on a digital line
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Led {
    line: Line,
    on: bool,
}

impl Entity for Led {
    const KIND: EntityKind = EntityKind::Led;
}

impl Led {
    /// Create a new LED and drive it off
    pub fn init<O>(line: Line, out: &mut O) -> Result<Self, Error>
    where
        O: DigitalOutput + ?Sized,
    {
        let mut led = Self { line, on: true };
        led.turn_off(out)?;
        Ok(led)
    }

    pub fn turn_on<O>(&mut self, out: &mut O) -> Result<(), Error>
    where
        O: DigitalOutput + ?Sized,
    {
        self.set(out, true)
    }

    pub fn turn_off<O>(&mut self, out: &mut O) -> Result<(), Error>
    where
        O: DigitalOutput + ?Sized,
    {
        self.set(out, false)
    }

    fn set<O>(&mut self, out: &mut O, on: bool) -> Result<(), Error>
    where
        O: DigitalOutput + ?Sized,
    {
        out.write_digital(self.line, on)
            .map_err(Error::write(self.line))?;
        self.on = on;
        Ok(())
    }

    /// Last level successfully written
    pub fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBoard;

    #[test]
    fn test_on_off() {
        let mut board = MockBoard::new();
        board.write_digital(3, true).unwrap();

        let mut led = Led::init(3, &mut board).unwrap();
        assert!(!led.is_on());
        assert!(!board.digital(3));

        led.turn_on(&mut board).unwrap();
        assert!(led.is_on());
        assert!(board.digital(3));
    }

    #[test]
    fn test_init_failure() {
        let mut board = MockBoard::new();
        board.fail_line(3);
        assert_eq!(
            Led::init(3, &mut board).err(),
            Some(Error::ActuatorWriteFailure { line: 3 })
        );
    }
}
