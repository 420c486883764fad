// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this library.  If not, see <http://www.gnu.org/licenses/>.
//! Four digit, seven segment display.
//!
//! [`project`] picks what the four digits show for the current record and
//! menu state.  [`SegmentDisplay`] shifts the digit codes out through a
//! chain of 74HC595 shift registers.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};

use crate::ds1302::SETTLE_NS;
use crate::infallible;
use crate::menu::{Field, MenuState};
use crate::time::{Bcd, Hour, TimeRecord};

/// Segment codes for 0-9: bit 7 is segment a through bit 1 for g, bit 0 is
/// the decimal point.
pub const SEGMENT_DIGITS: [u8; 10] = [
    0b1111_1100, // 0
    0b0110_0000, // 1
    0b1101_1010, // 2
    0b1111_0010, // 3
    0b0110_0110, // 4
    0b1011_0110, // 5
    0b1011_1110, // 6
    0b1110_0000, // 7
    0b1111_1110, // 8
    0b1110_0110, // 9
];

/// All segments off.
pub const BLANK: u8 = 0;

/// Segment codes for the four digits, left to right.
pub type DigitCodes = [u8; 4];

/// `value` as a digit, clamped so a corrupt register still shows something.
fn digit(value: u8, max: u8) -> u8 {
    SEGMENT_DIGITS[usize::from(value.min(max).min(9))]
}

fn pair(digits: Bcd, max_tens: u8) -> [u8; 2] {
    [digit(digits.tens(), max_tens), digit(digits.units(), 9)]
}

/// What the display shows.
///
/// With the menu closed that is the time, hours then minutes.  With it open
/// only the field being edited is shown, everything else blank, and the
/// field itself flashes with `blink` until it is being changed.
pub fn project(record: &TimeRecord, menu: MenuState, blink: bool) -> DigitCodes {
    let MenuState::Open { field, selecting } = menu else {
        let hour_tens = if record.hour().is_24_hour() { 2 } else { 1 };
        let [h1, h0] = pair(record.hour().digits(), hour_tens);
        let [m1, m0] = pair(record.minutes(), 5);
        return [h1, h0, m1, m0];
    };

    if !(blink || selecting) {
        return [BLANK; 4];
    }

    match field {
        Field::Minutes => {
            let [m1, m0] = pair(record.minutes(), 9);
            [BLANK, BLANK, m1, m0]
        }
        Field::Hours => {
            let [h1, h0] = pair(record.hour().digits(), 9);
            [h1, h0, BLANK, BLANK]
        }
        Field::HourMode => match record.hour() {
            Hour::H24(_) => [BLANK, BLANK, SEGMENT_DIGITS[2], SEGMENT_DIGITS[4]],
            Hour::H12 { .. } => [SEGMENT_DIGITS[1], SEGMENT_DIGITS[2], BLANK, BLANK],
        },
        Field::Weekday => [BLANK, BLANK, BLANK, digit(record.weekday(), 7)],
        Field::Date => {
            let [d1, d0] = pair(record.date(), 3);
            [d1, d0, BLANK, BLANK]
        }
        Field::Month => {
            let [m1, m0] = pair(record.month(), 1);
            [BLANK, BLANK, m1, m0]
        }
        Field::Year => {
            let [y1, y0] = pair(record.year(), 9);
            [SEGMENT_DIGITS[2], SEGMENT_DIGITS[0], y1, y0]
        }
    }
}

/// Daisy-chained 74HC595s, one per digit, rightmost digit furthest along
/// the chain.
pub struct SegmentDisplay<DATA, CLK, LATCH, D> {
    data: DATA,
    clock: CLK,
    latch: LATCH,
    delay: D,
}

impl<DATA, CLK, LATCH, D> SegmentDisplay<DATA, CLK, LATCH, D>
where
    DATA: OutputPin + ErrorType<Error = Infallible>,
    CLK: OutputPin + ErrorType<Error = Infallible>,
    LATCH: OutputPin + ErrorType<Error = Infallible>,
    D: DelayNs,
{
    pub fn new(data: DATA, clock: CLK, latch: LATCH, delay: D) -> Self {
        Self {
            data,
            clock,
            latch,
            delay,
        }
    }

    /// Shift out all four digits, last digit first, each LSB first.
    pub fn write(&mut self, codes: &DigitCodes) {
        infallible(self.latch.set_high());
        infallible(self.data.set_low());
        infallible(self.clock.set_low());

        for &code in codes.iter().rev() {
            for bit in 0..8 {
                infallible(self.clock.set_low());
                infallible(self.data.set_state(PinState::from(code & (1 << bit) != 0)));
                self.delay.delay_ns(SETTLE_NS);
                infallible(self.clock.set_high());
                self.delay.delay_ns(SETTLE_NS);
            }
        }

        infallible(self.clock.set_low());
        infallible(self.data.set_low());
        infallible(self.latch.set_low());
    }
}
