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
//! Four digit clock built around a DS1302 real-time clock.
//!
//! The RTC is bit-banged over three GPIO lines, the time is shown on four
//! seven segment digits behind 74HC595 shift registers, and three buttons
//! drive a menu for setting it.  Everything here is generic over
//! `embedded-hal` traits so it runs on the host under test; the AVR
//! specifics live in the binary.

#![cfg_attr(not(test), no_std)]

use core::convert::Infallible;

pub mod brightness;
pub mod buttons;
pub mod clock;
pub mod display;
pub mod ds1302;
pub mod menu;
pub mod settings;
pub mod tick;
pub mod time;

#[cfg(test)]
mod sim;

pub use clock::{Clock, Heartbeat};
pub use ds1302::{Ds1302, RtcLink};
pub use settings::Settings;
pub use time::TimeRecord;

/// Unwrap a result that cannot fail.  AVR GPIO never does.
pub(crate) fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
