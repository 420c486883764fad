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
//! A DS1302 on the other end of the wires, for tests.
//!
//! Shares one chip model between three pins.  The model samples the I/O line
//! on rising SCLK edges, shifts read data out after falling edges, honours
//! write protection, and counts protocol violations: the data line moving
//! while SCLK is high, a sample of a line nobody drives, or both ends
//! driving at once.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal_mock::eh1::delay::NoopDelay;

use crate::ds1302::{DataPin, Direction, Ds1302, Register};
use crate::time::RECORD_LEN;

/// Completed transfers, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    RegisterWrite(u8, u8),
    RegisterRead(u8),
    BurstWrite([u8; RECORD_LEN]),
    BurstRead,
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Idle,
    Command { bits: u8, value: u8 },
    Write { address: u8, index: usize, bits: u8, value: u8 },
    Read { address: u8, index: usize, bits: u8 },
}

#[derive(Clone, Copy)]
enum Line {
    Ce,
    Sclk,
    Io,
}

struct Chip {
    clock: [u8; RECORD_LEN],
    trickle: u8,
    burst: [u8; RECORD_LEN],
    ce: bool,
    sclk: bool,
    io: bool,
    io_output: bool,
    chip_drives: Option<bool>,
    phase: Phase,
    events: Vec<Event>,
    violations: usize,
}

const WRITE_PROTECT_INDEX: usize = 7;

impl Chip {
    fn write_protected(&self) -> bool {
        self.clock[WRITE_PROTECT_INDEX] & 0x80 != 0
    }

    fn slot(&mut self, address: u8) -> Option<&mut u8> {
        match address {
            0x80..=0x8E => Some(&mut self.clock[usize::from((address - 0x80) / 2)]),
            0x90 => Some(&mut self.trickle),
            _ => None,
        }
    }

    fn read_slot(&mut self, address: u8, index: usize) -> u8 {
        if address == Register::ClockBurst.address() {
            self.clock.get(index).copied().unwrap_or(0)
        } else {
            self.slot(address).map_or(0, |byte| *byte)
        }
    }

    fn store(&mut self, address: u8, index: usize, value: u8) {
        if address == Register::ClockBurst.address() {
            if index < RECORD_LEN {
                self.burst[index] = value;
            }
            if index == RECORD_LEN - 1 {
                if !self.write_protected() {
                    self.clock = self.burst;
                }
                self.events.push(Event::BurstWrite(self.burst));
            }
            return;
        }
        let writable = !self.write_protected() || address == Register::WriteProtect.address();
        if writable {
            if let Some(slot) = self.slot(address) {
                *slot = value;
            }
        }
        self.events.push(Event::RegisterWrite(address, value));
    }

    fn sample(&mut self) -> bool {
        if !self.io_output {
            self.violations += 1;
        }
        self.io
    }

    fn rising_edge(&mut self) {
        self.phase = match self.phase {
            Phase::Command { bits, value } => {
                let value = value | (u8::from(self.sample()) << bits);
                if bits < 7 {
                    Phase::Command { bits: bits + 1, value }
                } else if value & 0x80 == 0 {
                    Phase::Idle
                } else if value & 1 == 1 {
                    let address = value & 0xFE;
                    self.events.push(if address == Register::ClockBurst.address() {
                        Event::BurstRead
                    } else {
                        Event::RegisterRead(address)
                    });
                    Phase::Read { address, index: 0, bits: 0 }
                } else {
                    Phase::Write { address: value, index: 0, bits: 0, value: 0 }
                }
            }
            Phase::Write { address, index, bits, value } => {
                let value = value | (u8::from(self.sample()) << bits);
                if bits < 7 {
                    Phase::Write { address, index, bits: bits + 1, value }
                } else {
                    self.store(address, index, value);
                    Phase::Write { address, index: index + 1, bits: 0, value: 0 }
                }
            }
            phase => phase,
        };
    }

    fn falling_edge(&mut self) {
        if let Phase::Read { address, index, bits } = self.phase {
            let byte = self.read_slot(address, index);
            self.chip_drives = Some(byte & (1 << bits) != 0);
            if self.io_output {
                self.violations += 1;
            }
            self.phase = if bits < 7 {
                Phase::Read { address, index, bits: bits + 1 }
            } else {
                Phase::Read { address, index: index + 1, bits: 0 }
            };
        }
    }

    fn drive(&mut self, line: Line, level: bool) {
        match line {
            Line::Ce => {
                if level && !self.ce {
                    self.phase = Phase::Command { bits: 0, value: 0 };
                } else if !level {
                    self.phase = Phase::Idle;
                    self.chip_drives = None;
                }
                self.ce = level;
            }
            Line::Sclk => {
                let was = self.sclk;
                self.sclk = level;
                if self.ce && !was && level {
                    self.rising_edge();
                } else if self.ce && was && !level {
                    self.falling_edge();
                }
            }
            Line::Io => {
                if self.io_output && self.ce && self.sclk && self.io != level {
                    self.violations += 1;
                }
                self.io = level;
            }
        }
    }

    fn level(&mut self, line: Line) -> bool {
        match line {
            Line::Ce => self.ce,
            Line::Sclk => self.sclk,
            Line::Io => match self.chip_drives {
                Some(level) if !self.io_output => level,
                _ if self.io_output => self.io,
                _ => {
                    self.violations += 1;
                    false
                }
            },
        }
    }
}

/// Handle on the simulated chip, shared with its pins.
#[derive(Clone)]
pub struct SimChip(Rc<RefCell<Chip>>);

pub type SimDs1302 = Ds1302<SimPin, SimPin, SimPin, NoopDelay>;

impl SimChip {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Chip {
            clock: [0; RECORD_LEN],
            trickle: 0x5C,
            burst: [0; RECORD_LEN],
            ce: false,
            sclk: false,
            io: false,
            io_output: false,
            chip_drives: None,
            phase: Phase::Idle,
            events: Vec::new(),
            violations: 0,
        })))
    }

    fn pin(&self, line: Line) -> SimPin {
        SimPin {
            chip: self.0.clone(),
            line,
        }
    }

    /// A driver wired to this chip.
    pub fn ds1302(&self) -> SimDs1302 {
        Ds1302::new(
            self.pin(Line::Ce),
            self.pin(Line::Sclk),
            self.pin(Line::Io),
            NoopDelay::new(),
        )
    }

    /// Preload a register without touching the event log.
    pub fn set_register(&self, register: Register, value: u8) {
        if let Some(slot) = self.0.borrow_mut().slot(register.address()) {
            *slot = value;
        }
    }

    pub fn register(&self, register: Register) -> u8 {
        self.0.borrow_mut().slot(register.address()).map_or(0, |byte| *byte)
    }

    pub fn clock_bytes(&self) -> [u8; RECORD_LEN] {
        self.0.borrow().clock
    }

    pub fn set_clock_bytes(&self, bytes: [u8; RECORD_LEN]) {
        self.0.borrow_mut().clock = bytes;
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.0.borrow_mut().events.clear();
    }

    pub fn violations(&self) -> usize {
        self.0.borrow().violations
    }
}

pub struct SimPin {
    chip: Rc<RefCell<Chip>>,
    line: Line,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.chip.borrow_mut().drive(self.line, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.chip.borrow_mut().drive(self.line, true);
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.chip.borrow_mut().level(self.line))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|level| !level)
    }
}

impl DataPin for SimPin {
    fn set_direction(&mut self, direction: Direction) {
        let mut chip = self.chip.borrow_mut();
        chip.io_output = direction == Direction::Output;
        if chip.io_output && chip.chip_drives.is_some() {
            chip.violations += 1;
        }
    }
}
