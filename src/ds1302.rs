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
//! DS1302 RTC interface
//!
//! The DS1302 has no serial peripheral to lean on: chip enable frames each
//! transaction and every bit is clocked by hand, least significant bit
//! first.  The chip samples the I/O line on the rising edge of SCLK and
//! drives it after a falling edge when we read.  Nothing is acknowledged, so
//! none of these operations can report failure.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

use crate::infallible;
use crate::time::{TimeRecord, RECORD_LEN};

/// Register addresses, in their write form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Seconds = 0x80,
    Minutes = 0x82,
    Hour = 0x84,
    Date = 0x86,
    Month = 0x88,
    Weekday = 0x8A,
    Year = 0x8C,
    WriteProtect = 0x8E,
    TrickleCharge = 0x90,
    ClockBurst = 0xBE,
}

impl Register {
    pub const fn address(self) -> u8 {
        self as u8
    }
}

const READ_BIT: u8 = 0;

/// The read form of a register address.
pub const fn to_read_address(address: u8) -> u8 {
    address | (1 << READ_BIT)
}

/// Seconds value that stops the oscillator.
pub const CLOCK_HALT: u8 = 0x80;

const WRITE_PROTECT_OFF: u8 = 0x00;

// Anything but 1010 in the top nibble keeps the charger off.
const TRICKLE_CHARGE_OFF: u8 = 0x00;

/// Hold time around each SCLK transition: two CPU cycles at 16 MHz.
pub const SETTLE_NS: u32 = 125;

/// Which way the I/O line is pointing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// The bidirectional data line, which we drive for commands and writes and
/// release for the chip to drive during reads.
pub trait DataPin: InputPin + OutputPin + ErrorType<Error = Infallible> {
    /// Switch direction.  An input must float: no pull-up.
    fn set_direction(&mut self, direction: Direction);
}

/// What the clock and menu logic need from the chip.
pub trait RtcLink {
    /// One-time bring-up before any other traffic.
    fn initialize(&mut self);
    fn write_register(&mut self, register: Register, value: u8);
    /// Read one register, setting the read bit on its address.
    fn read_single(&mut self, register: Register) -> u8;
    fn burst_write(&mut self, record: &TimeRecord);
    fn burst_read(&mut self, record: &mut TimeRecord);
}

/// Bit-banged DS1302 on three GPIO lines.
pub struct Ds1302<CE, SCLK, IO, D> {
    ce: CE,
    sclk: SCLK,
    io: IO,
    delay: D,
}

impl<CE, SCLK, IO, D> Ds1302<CE, SCLK, IO, D>
where
    CE: OutputPin + ErrorType<Error = Infallible>,
    SCLK: OutputPin + ErrorType<Error = Infallible>,
    IO: DataPin,
    D: DelayNs,
{
    pub fn new(ce: CE, sclk: SCLK, io: IO, delay: D) -> Self {
        Self { ce, sclk, io, delay }
    }

    /// Drive all three lines low, then lift write protection and switch off
    /// the trickle charger.  Must run once, before anything else.
    pub fn initialize(&mut self) {
        self.io.set_direction(Direction::Output);
        infallible(self.ce.set_low());
        infallible(self.sclk.set_low());
        infallible(self.io.set_low());

        self.write_register(Register::WriteProtect, WRITE_PROTECT_OFF);
        self.write_register(Register::TrickleCharge, TRICKLE_CHARGE_OFF);
    }

    fn settle(&mut self) {
        self.delay.delay_ns(SETTLE_NS);
    }

    fn start(&mut self) {
        infallible(self.sclk.set_low());
        infallible(self.io.set_low());
        infallible(self.ce.set_low());
        self.settle();
        infallible(self.ce.set_high());
        self.settle();
    }

    fn stop(&mut self) {
        infallible(self.ce.set_low());
        self.settle();
        infallible(self.sclk.set_low());
        infallible(self.io.set_low());
    }

    fn write_byte(&mut self, data: u8) {
        self.io.set_direction(Direction::Output);
        for i in 0..8 {
            infallible(self.sclk.set_low());
            self.settle();
            infallible(self.io.set_state(PinState::from(data & (1 << i) != 0)));
            self.settle();
            // Latched by the chip on this rising edge.
            infallible(self.sclk.set_high());
            self.settle();
        }
    }

    fn read_byte(&mut self) -> u8 {
        self.io.set_direction(Direction::Input);
        self.settle();
        let mut data = 0;
        for i in 0..8 {
            infallible(self.sclk.set_low());
            self.settle();
            infallible(self.sclk.set_high());
            self.settle();
            if infallible(self.io.is_high()) {
                data |= 1 << i;
            }
        }
        data
    }

    /// Write one byte to `register`.
    pub fn write_register(&mut self, register: Register, value: u8) {
        self.start();
        self.write_byte(register.address());
        self.write_byte(value);
        self.stop();
    }

    /// Read one byte from a raw command address.  The read bit is set here
    /// so a write address cannot slip through.
    pub fn read_register(&mut self, address: u8) -> u8 {
        self.start();
        self.write_byte(to_read_address(address));
        let value = self.read_byte();
        self.stop();
        value
    }

    pub fn read_single(&mut self, register: Register) -> u8 {
        self.read_register(register.address())
    }

    /// Write the whole clock/calendar in one transaction.
    pub fn burst_write(&mut self, record: &TimeRecord) {
        self.start();
        self.write_byte(Register::ClockBurst.address());
        for byte in record.to_bytes() {
            self.write_byte(byte);
        }
        self.stop();
    }

    /// Read the whole clock/calendar in one transaction.
    pub fn burst_read(&mut self, record: &mut TimeRecord) {
        let mut bytes = [0; RECORD_LEN];
        self.start();
        self.write_byte(to_read_address(Register::ClockBurst.address()));
        for byte in bytes.iter_mut() {
            *byte = self.read_byte();
        }
        self.stop();
        *record = TimeRecord::from_bytes(&bytes);
    }
}

impl<CE, SCLK, IO, D> RtcLink for Ds1302<CE, SCLK, IO, D>
where
    CE: OutputPin + ErrorType<Error = Infallible>,
    SCLK: OutputPin + ErrorType<Error = Infallible>,
    IO: DataPin,
    D: DelayNs,
{
    fn initialize(&mut self) {
        Ds1302::initialize(self);
    }

    fn write_register(&mut self, register: Register, value: u8) {
        Ds1302::write_register(self, register, value);
    }

    fn read_single(&mut self, register: Register) -> u8 {
        Ds1302::read_single(self, register)
    }

    fn burst_write(&mut self, record: &TimeRecord) {
        Ds1302::burst_write(self, record);
    }

    fn burst_read(&mut self, record: &mut TimeRecord) {
        Ds1302::burst_read(self, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Event, SimChip};
    use crate::time::Hour;

    #[test]
    fn read_address_sets_low_bit() {
        assert_eq!(to_read_address(Register::Seconds.address()), 0x81);
        assert_eq!(to_read_address(Register::ClockBurst.address()), 0xBF);
        assert_eq!(to_read_address(0x81), 0x81);
    }

    #[test]
    fn initialize_lifts_write_protect_then_disables_charger() {
        let chip = SimChip::new();
        chip.set_register(Register::WriteProtect, 0x80);
        chip.set_register(Register::TrickleCharge, 0xA5);
        let mut rtc = chip.ds1302();
        rtc.initialize();
        assert_eq!(
            chip.events(),
            vec![
                Event::RegisterWrite(0x8E, 0x00),
                Event::RegisterWrite(0x90, 0x00),
            ]
        );
        assert_eq!(chip.register(Register::TrickleCharge), 0x00);
        assert_eq!(chip.violations(), 0);
    }

    #[test]
    fn write_register_stores_byte() {
        let chip = SimChip::new();
        let mut rtc = chip.ds1302();
        rtc.initialize();
        rtc.write_register(Register::Minutes, 0x42);
        assert_eq!(chip.register(Register::Minutes), 0x42);
        assert_eq!(chip.violations(), 0);
    }

    #[test]
    fn repeated_write_leaves_chip_unchanged() {
        let chip = SimChip::new();
        let mut rtc = chip.ds1302();
        rtc.initialize();
        rtc.write_register(Register::Date, 0x17);
        let once = chip.clock_bytes();
        rtc.write_register(Register::Date, 0x17);
        rtc.write_register(Register::Date, 0x17);
        assert_eq!(chip.clock_bytes(), once);
    }

    #[test]
    fn read_register_uses_read_form() {
        let chip = SimChip::new();
        chip.set_register(Register::Year, 0x24);
        let mut rtc = chip.ds1302();
        assert_eq!(rtc.read_single(Register::Year), 0x24);
        assert_eq!(rtc.read_register(Register::Year.address()), 0x24);
        assert_eq!(
            chip.events(),
            vec![Event::RegisterRead(0x8C), Event::RegisterRead(0x8C)]
        );
        assert_eq!(chip.violations(), 0);
    }

    #[test]
    fn reads_every_bit_pattern() {
        let chip = SimChip::new();
        let mut rtc = chip.ds1302();
        for value in [0x00, 0x01, 0x80, 0xA5, 0x5A, 0xFF] {
            chip.set_register(Register::Minutes, value);
            assert_eq!(rtc.read_single(Register::Minutes), value);
        }
    }

    #[test]
    fn burst_round_trip_is_lossless() {
        let chip = SimChip::new();
        let mut rtc = chip.ds1302();
        rtc.initialize();
        let written = TimeRecord::new(Hour::twelve(11, true), 58, 29, 2, 4, 24);
        rtc.burst_write(&written);
        assert_eq!(chip.clock_bytes(), written.to_bytes());

        let mut read = TimeRecord::new(Hour::twenty_four(0), 0, 1, 1, 1, 0);
        rtc.burst_read(&mut read);
        assert_eq!(read, written);
        assert_eq!(read.to_bytes(), written.to_bytes());
        assert_eq!(chip.violations(), 0);
    }

    #[test]
    fn out_of_range_record_survives_round_trip() {
        let chip = SimChip::new();
        let mut rtc = chip.ds1302();
        rtc.initialize();
        let written = TimeRecord::new(Hour::twenty_four(45), 75, 45, 13, 9, 150);
        rtc.burst_write(&written);

        let mut read = TimeRecord::new(Hour::twenty_four(0), 0, 1, 1, 1, 0);
        rtc.burst_read(&mut read);
        assert_eq!(read, written);
        assert_eq!(read.hour(), Hour::twenty_four(23));
        assert_eq!(read.date().value(), 31);
        assert_eq!(read.weekday(), 7);
    }

    #[test]
    fn burst_is_one_transaction() {
        let chip = SimChip::new();
        let mut rtc = chip.ds1302();
        let record = TimeRecord::new(Hour::twenty_four(13), 7, 3, 9, 2, 21);
        rtc.burst_write(&record);
        let mut read = record;
        rtc.burst_read(&mut read);
        assert_eq!(
            chip.events(),
            vec![Event::BurstWrite(record.to_bytes()), Event::BurstRead]
        );
    }

    #[test]
    fn write_protect_blocks_writes() {
        let chip = SimChip::new();
        chip.set_register(Register::WriteProtect, 0x80);
        chip.set_register(Register::Minutes, 0x10);
        let mut rtc = chip.ds1302();
        rtc.write_register(Register::Minutes, 0x20);
        assert_eq!(chip.register(Register::Minutes), 0x10);
    }
}
