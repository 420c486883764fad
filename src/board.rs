//! Pin wiring on the Nano board.
//!
//! Converted from the schematic by correlating net names against
//! https://docs.arduino.cc/hacking/hardware/PinMapping168

use core::convert::Infallible;
use core::mem;

use arduino_hal::hal::port::PB0;
use arduino_hal::port::{mode, Pin};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use ds1302clock::ds1302::{DataPin, Direction};

pub const BAUD_RATE: u32 = 19200;

enum Line {
    Driven(Pin<mode::Output, PB0>),
    Floating(Pin<mode::Input<mode::Floating>, PB0>),
    // Only seen inside set_direction.
    Moving,
}

/// The DS1302 I/O line on D8, switched between output and floating input
/// as the transfer needs.
pub struct DataLine {
    line: Line,
}

impl DataLine {
    pub fn new(pin: Pin<mode::Output, PB0>) -> Self {
        Self {
            line: Line::Driven(pin),
        }
    }
}

impl ErrorType for DataLine {
    type Error = Infallible;
}

impl OutputPin for DataLine {
    // Writes while floating are dropped: setting PORTB0 then would switch on
    // the pull-up.
    fn set_low(&mut self) -> Result<(), Infallible> {
        if let Line::Driven(pin) = &mut self.line {
            pin.set_low();
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        if let Line::Driven(pin) = &mut self.line {
            pin.set_high();
        }
        Ok(())
    }
}

impl InputPin for DataLine {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(match &self.line {
            Line::Driven(pin) => pin.is_set_high(),
            Line::Floating(pin) => pin.is_high(),
            Line::Moving => false,
        })
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

impl DataPin for DataLine {
    fn set_direction(&mut self, direction: Direction) {
        self.line = match (mem::replace(&mut self.line, Line::Moving), direction) {
            (Line::Floating(pin), Direction::Output) => Line::Driven(pin.into_output()),
            (Line::Driven(pin), Direction::Input) => Line::Floating(pin.into_floating_input()),
            (line, _) => line,
        };
    }
}
