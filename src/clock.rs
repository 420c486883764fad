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
//! The clock itself: RTC, buttons, menu and tick state wired together.
//!
//! The main loop calls [`Clock::on_button_sample`] and [`Clock::heartbeat`]
//! as often as it likes; every RTC transfer happens from inside one of them.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};

use crate::buttons::Buttons;
use crate::display::{self, DigitCodes};
use crate::ds1302::{Register, RtcLink, CLOCK_HALT};
use crate::menu::{Menu, MenuEvent, MenuState};
use crate::settings::Settings;
use crate::tick::SharedTicks;
use crate::time::TimeRecord;

/// What [`Clock::heartbeat`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heartbeat {
    /// No tick since the last one, or the menu is open.
    Skipped,
    /// Seconds read; the minute has not rolled over.
    Probed,
    /// Seconds read as zero, so the whole record was read back.
    Resynced,
}

pub struct Clock<RTC, L, C, R, T> {
    rtc: RTC,
    buttons: Buttons<L, C, R>,
    ticks: T,
    menu: Menu,
    record: TimeRecord,
    settings: Settings,
}

impl<RTC, L, C, R, T> Clock<RTC, L, C, R, T>
where
    RTC: RtcLink,
    L: InputPin + ErrorType<Error = Infallible>,
    C: InputPin + ErrorType<Error = Infallible>,
    R: InputPin + ErrorType<Error = Infallible>,
    T: SharedTicks,
{
    pub fn new(rtc: RTC, buttons: Buttons<L, C, R>, ticks: T, settings: Settings) -> Self {
        Self {
            rtc,
            buttons,
            ticks,
            menu: Menu::new(),
            record: settings.default_time,
            settings,
        }
    }

    /// Bring up the RTC and seed it with `default`.
    pub fn initialize(&mut self, default: TimeRecord) {
        self.rtc.initialize();
        self.record = default;
        self.rtc.burst_write(&self.record);
    }

    /// Sample the buttons once and step the menu.
    pub fn on_button_sample(&mut self) -> MenuEvent {
        let edges = self.buttons.sample();
        let timed_out = self.ticks.snapshot().timeout == 0;
        let event = self.menu.update(edges, timed_out, &mut self.record);

        match event {
            MenuEvent::Idle => {}
            MenuEvent::Opened => {
                self.reset_timeout();
                // Stop the oscillator while the user edits.
                self.rtc.write_register(Register::Seconds, CLOCK_HALT);
            }
            event if event.commits() => self.commit(),
            _ => self.reset_timeout(),
        }
        event
    }

    fn reset_timeout(&mut self) {
        let timeout = self.settings.menu_timeout_ticks;
        self.ticks.modify(|ticks| ticks.timeout = timeout);
    }

    /// Write the edited record back and restart the oscillator from zero
    /// seconds.
    fn commit(&mut self) {
        self.ticks.modify(|ticks| ticks.timeout = 0);
        self.rtc.burst_write(&self.record);
        self.rtc.write_register(Register::Seconds, 0);
        self.record.restart_seconds();
    }

    /// Once per tick, with the menu closed: read the seconds and, on a
    /// fresh minute, the rest of the record.
    pub fn heartbeat(&mut self) -> Heartbeat {
        if self.menu.is_open() {
            return Heartbeat::Skipped;
        }
        let due = self.ticks.modify(|ticks| core::mem::take(&mut ticks.resync_due));
        if !due {
            return Heartbeat::Skipped;
        }

        let seconds = self.rtc.read_single(Register::Seconds);
        self.record.set_seconds_byte(seconds);
        if seconds != 0 {
            return Heartbeat::Probed;
        }
        self.rtc.burst_read(&mut self.record);
        Heartbeat::Resynced
    }

    pub fn current_digit_codes(&self) -> DigitCodes {
        display::project(&self.record, self.menu.state(), self.ticks.snapshot().blink)
    }

    pub fn record(&self) -> &TimeRecord {
        &self.record
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu.state()
    }
}
