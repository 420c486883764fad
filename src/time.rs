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
//! Clock/calendar record mirrored from the DS1302.
//!
//! The chip keeps time in binary-coded decimal with one nibble per digit.
//! [`TimeRecord`] keeps the same units/tens split so a burst transfer is a
//! plain copy of eight bytes, in register order: seconds, minutes, hour,
//! date, month, weekday, year, write-protect.

use ufmt::{uDisplay, uWrite, Formatter};

/// Bytes moved by one clock burst transfer.
pub const RECORD_LEN: usize = 8;

const CLOCK_HALT: u8 = 0b1000_0000;
const HOUR_12: u8 = 0b1000_0000;
const HOUR_PM: u8 = 0b0010_0000;
const WRITE_PROTECT: u8 = 0b1000_0000;

const SECONDS_TENS: u8 = 0b111;
const MINUTES_TENS: u8 = 0b111;
const HOUR_24_TENS: u8 = 0b11;
const HOUR_12_TENS: u8 = 0b1;
const DATE_TENS: u8 = 0b11;
const MONTH_TENS: u8 = 0b1;
const YEAR_TENS: u8 = 0b1111;
const WEEKDAY_MASK: u8 = 0b111;

/// `Ord::clamp` for const constructors.
const fn clamp(value: u8, min: u8, max: u8) -> u8 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Two decimal digits stored as the chip stores them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bcd {
    units: u8,
    tens: u8,
}

impl Bcd {
    /// Split `value` into digits.  Anything past 99 is held at 99.
    pub const fn new(value: u8) -> Self {
        let value = clamp(value, 0, 99);
        Self {
            units: value % 10,
            tens: value / 10,
        }
    }

    const fn from_byte(byte: u8, tens_mask: u8) -> Self {
        Self {
            units: byte & 0x0F,
            tens: (byte >> 4) & tens_mask,
        }
    }

    const fn to_byte(self) -> u8 {
        (self.units & 0x0F) | ((self.tens & 0x0F) << 4)
    }

    pub const fn units(self) -> u8 {
        self.units
    }

    pub const fn tens(self) -> u8 {
        self.tens
    }

    /// The combined decimal value.
    pub const fn value(self) -> u8 {
        self.tens * 10 + self.units
    }

    /// Step down by one.  `min` wraps to `max`, and so does anything the
    /// chip handed us outside `min..=max`.
    #[must_use]
    pub const fn decrement(self, min: u8, max: u8) -> Self {
        let value = self.value();
        if value <= min || value > max {
            Self::new(max)
        } else {
            Self::new(value - 1)
        }
    }
}

/// The hour register, in whichever format its mode bit selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hour {
    /// 0-23.
    H24(Bcd),
    /// 1-12, with the PM flag.
    H12 { hour: Bcd, pm: bool },
}

impl Hour {
    /// `hour` is held to 0-23.
    pub const fn twenty_four(hour: u8) -> Self {
        Hour::H24(Bcd::new(clamp(hour, 0, 23)))
    }

    /// `hour` is held to 1-12.
    pub const fn twelve(hour: u8, pm: bool) -> Self {
        Hour::H12 {
            hour: Bcd::new(clamp(hour, 1, 12)),
            pm,
        }
    }

    const fn from_byte(byte: u8) -> Self {
        if byte & HOUR_12 != 0 {
            Hour::H12 {
                hour: Bcd::from_byte(byte, HOUR_12_TENS),
                pm: byte & HOUR_PM != 0,
            }
        } else {
            Hour::H24(Bcd::from_byte(byte, HOUR_24_TENS))
        }
    }

    const fn to_byte(self) -> u8 {
        match self {
            Hour::H24(hour) => hour.to_byte(),
            Hour::H12 { hour, pm } => {
                hour.to_byte() | HOUR_12 | if pm { HOUR_PM } else { 0 }
            }
        }
    }

    pub const fn is_24_hour(self) -> bool {
        matches!(self, Hour::H24(_))
    }

    /// The digits shown on the display, whatever the format.
    pub const fn digits(self) -> Bcd {
        match self {
            Hour::H24(hour) | Hour::H12 { hour, .. } => hour,
        }
    }

    /// Step down one hour: 0 wraps to 23, or 1 wraps to 12 keeping AM/PM.
    #[must_use]
    pub const fn decrement(self) -> Self {
        match self {
            Hour::H24(hour) => Hour::H24(hour.decrement(0, 23)),
            Hour::H12 { hour, pm } => Hour::H12 {
                hour: hour.decrement(1, 12),
                pm,
            },
        }
    }

    /// Switch between 12 and 24 hour format, keeping the same time of day.
    #[must_use]
    pub fn toggle_mode(self) -> Self {
        match self {
            Hour::H24(hour) => {
                let hour = hour.value().min(23);
                let twelve = match hour % 12 {
                    0 => 12,
                    h => h,
                };
                Hour::twelve(twelve, hour >= 12)
            }
            Hour::H12 { hour, pm } => {
                let hour = hour.value().clamp(1, 12) % 12;
                Hour::twenty_four(if pm { hour + 12 } else { hour })
            }
        }
    }
}

/// Cached copy of the DS1302 clock/calendar registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRecord {
    seconds: Bcd,
    clock_halt: bool,
    minutes: Bcd,
    hour: Hour,
    date: Bcd,
    month: Bcd,
    weekday: u8,
    year: Bcd,
    write_protect: bool,
}

impl TimeRecord {
    /// A running clock at the top of the minute, with writes enabled.  Each
    /// field is held to its calendar range, so the record always survives a
    /// burst round trip unchanged.
    pub const fn new(hour: Hour, minutes: u8, date: u8, month: u8, weekday: u8, year: u8) -> Self {
        Self {
            seconds: Bcd::new(0),
            clock_halt: false,
            minutes: Bcd::new(clamp(minutes, 0, 59)),
            hour,
            date: Bcd::new(clamp(date, 1, 31)),
            month: Bcd::new(clamp(month, 1, 12)),
            weekday: clamp(weekday, 1, 7),
            year: Bcd::new(clamp(year, 0, 99)),
            write_protect: false,
        }
    }

    /// Decode the eight bytes of a clock burst.  Reserved bits are dropped.
    pub const fn from_bytes(bytes: &[u8; RECORD_LEN]) -> Self {
        Self {
            seconds: Bcd::from_byte(bytes[0], SECONDS_TENS),
            clock_halt: bytes[0] & CLOCK_HALT != 0,
            minutes: Bcd::from_byte(bytes[1], MINUTES_TENS),
            hour: Hour::from_byte(bytes[2]),
            date: Bcd::from_byte(bytes[3], DATE_TENS),
            month: Bcd::from_byte(bytes[4], MONTH_TENS),
            weekday: bytes[5] & WEEKDAY_MASK,
            year: Bcd::from_byte(bytes[6], YEAR_TENS),
            write_protect: bytes[7] & WRITE_PROTECT != 0,
        }
    }

    /// Encode as the eight bytes of a clock burst.
    pub const fn to_bytes(&self) -> [u8; RECORD_LEN] {
        [
            self.seconds.to_byte() | if self.clock_halt { CLOCK_HALT } else { 0 },
            self.minutes.to_byte(),
            self.hour.to_byte(),
            self.date.to_byte(),
            self.month.to_byte(),
            self.weekday & WEEKDAY_MASK,
            self.year.to_byte(),
            if self.write_protect { WRITE_PROTECT } else { 0 },
        ]
    }

    pub const fn seconds(&self) -> Bcd {
        self.seconds
    }

    pub const fn clock_halt(&self) -> bool {
        self.clock_halt
    }

    pub const fn minutes(&self) -> Bcd {
        self.minutes
    }

    pub const fn hour(&self) -> Hour {
        self.hour
    }

    pub const fn date(&self) -> Bcd {
        self.date
    }

    pub const fn month(&self) -> Bcd {
        self.month
    }

    /// Day of the week, 1-7.
    pub const fn weekday(&self) -> u8 {
        self.weekday
    }

    /// Two digit year, 0-99.
    pub const fn year(&self) -> Bcd {
        self.year
    }

    pub const fn write_protect(&self) -> bool {
        self.write_protect
    }

    /// Overwrite the seconds register alone, as probed on a heartbeat.
    pub fn set_seconds_byte(&mut self, byte: u8) {
        self.seconds = Bcd::from_byte(byte, SECONDS_TENS);
        self.clock_halt = byte & CLOCK_HALT != 0;
    }

    /// Mirror of a seconds register written with zero: 00 seconds, running.
    pub fn restart_seconds(&mut self) {
        self.set_seconds_byte(0);
    }

    pub fn decrement_minutes(&mut self) {
        self.minutes = self.minutes.decrement(0, 59);
    }

    pub fn decrement_hour(&mut self) {
        self.hour = self.hour.decrement();
    }

    pub fn toggle_hour_mode(&mut self) {
        self.hour = self.hour.toggle_mode();
    }

    pub fn decrement_weekday(&mut self) {
        self.weekday = match self.weekday {
            2..=7 => self.weekday - 1,
            _ => 7,
        };
    }

    /// No month length check: the date always wraps at 31.
    pub fn decrement_date(&mut self) {
        self.date = self.date.decrement(1, 31);
    }

    pub fn decrement_month(&mut self) {
        self.month = self.month.decrement(1, 12);
    }

    pub fn decrement_year(&mut self) {
        self.year = self.year.decrement(0, 99);
    }
}

fn write_pair<W: uWrite + ?Sized>(f: &mut Formatter<'_, W>, digits: Bcd) -> Result<(), W::Error> {
    ufmt::uwrite!(f, "{}{}", digits.tens(), digits.units())
}

impl uDisplay for TimeRecord {
    fn fmt<W: uWrite + ?Sized>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error> {
        write_pair(f, self.hour.digits())?;
        f.write_char(':')?;
        write_pair(f, self.minutes)?;
        f.write_char(':')?;
        write_pair(f, self.seconds)?;
        if let Hour::H12 { pm, .. } = self.hour {
            f.write_str(if pm { " PM" } else { " AM" })?;
        }
        f.write_char(' ')?;
        write_pair(f, self.date)?;
        f.write_char('/')?;
        write_pair(f, self.month)?;
        f.write_str("/20")?;
        write_pair(f, self.year)?;
        ufmt::uwrite!(f, " wd{}", self.weekday)?;
        if self.clock_halt {
            f.write_str(" halted")?;
        }
        Ok(())
    }
}
