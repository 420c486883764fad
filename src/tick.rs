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
//! State touched by the half-second timer interrupt.
//!
//! The interrupt only ever sees this small record, never the time record,
//! so a transfer on the RTC lines is never interrupted by RTC traffic.

use core::cell::Cell;

/// Counters advanced by each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickState {
    /// Ticks left before an open menu closes itself.
    pub timeout: u8,
    /// Flips every tick; drives the flashing of the field being edited.
    pub blink: bool,
    /// Set by a tick, cleared by the heartbeat that consumes it.
    pub resync_due: bool,
}

impl TickState {
    pub const fn new() -> Self {
        Self {
            timeout: 0,
            blink: false,
            resync_due: false,
        }
    }

    /// Called from the timer interrupt.  Never blocks, never touches the RTC.
    pub fn on_tick(&mut self) {
        self.timeout = self.timeout.saturating_sub(1);
        self.blink = !self.blink;
        self.resync_due = true;
    }
}

/// Access to a [`TickState`] that an interrupt may also be updating.
pub trait SharedTicks {
    /// Run `f` with the interrupt held off.
    fn modify<R>(&self, f: impl FnOnce(&mut TickState) -> R) -> R;

    fn snapshot(&self) -> TickState {
        self.modify(|ticks| *ticks)
    }
}

/// For a single context with no interrupt, as on the host.
impl SharedTicks for Cell<TickState> {
    fn modify<R>(&self, f: impl FnOnce(&mut TickState) -> R) -> R {
        let mut ticks = self.get();
        let result = f(&mut ticks);
        self.set(ticks);
        result
    }
}

impl<T: SharedTicks + ?Sized> SharedTicks for &T {
    fn modify<R>(&self, f: impl FnOnce(&mut TickState) -> R) -> R {
        (**self).modify(f)
    }
}
