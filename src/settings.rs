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
//! Clock settings.
//!
//! Nothing here is stored: the only persistent state is what the DS1302
//! keeps in its own registers.  These are the values compiled in.

use crate::time::{Hour, TimeRecord};

/// Timer interrupts per second.
pub const TICKS_PER_SECOND: u8 = 2;

/// An open menu closes itself after five idle seconds.
pub const MENU_TIMEOUT_MAX: u8 = TICKS_PER_SECOND * 5;

/// Dimmest PWM duty the display is allowed.
pub const MIN_BRIGHTNESS: u8 = 50;

// "Factory" default time, written to the RTC at every boot:
// 5:30 PM, 11 June 2020, day 1 of the week, in 12 hour mode.
const DEFAULT_TIME: TimeRecord = TimeRecord::new(Hour::twelve(5, true), 30, 11, 6, 1, 20);

/// Compile-time configuration for the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Seeded into the RTC at startup.
    pub default_time: TimeRecord,

    /// Idle ticks before an open menu commits and closes.
    pub menu_timeout_ticks: u8,

    /// Floor for the ambient-light brightness.
    pub min_brightness: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_time: DEFAULT_TIME,
            menu_timeout_ticks: MENU_TIMEOUT_MAX,
            min_brightness: MIN_BRIGHTNESS,
        }
    }
}
