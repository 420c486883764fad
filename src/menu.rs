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
//! Time-setting menu.
//!
//! Any press opens the menu on the minutes.  Left steps back through the
//! fields while browsing; right starts editing the field, after which left
//! counts it down and a second right saves and closes.  Five idle seconds
//! save and close as well.

use ufmt::derive::uDebug;

use crate::buttons::Edges;
use crate::time::TimeRecord;

/// The fields that can be edited, one at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum Field {
    Minutes,
    Hours,
    HourMode,
    Weekday,
    Date,
    Month,
    Year,
}

impl Field {
    /// The field the left button moves to.  The ring only turns one way:
    /// minutes, year, month, date, weekday, hour mode, hours, minutes.
    pub const fn previous(self) -> Self {
        match self {
            Field::Minutes => Field::Year,
            Field::Year => Field::Month,
            Field::Month => Field::Date,
            Field::Date => Field::Weekday,
            Field::Weekday => Field::HourMode,
            Field::HourMode => Field::Hours,
            Field::Hours => Field::Minutes,
        }
    }

    /// Apply one left press to `record` while this field is being edited.
    fn step_down(self, record: &mut TimeRecord) {
        match self {
            Field::Minutes => record.decrement_minutes(),
            Field::Hours => record.decrement_hour(),
            Field::HourMode => record.toggle_hour_mode(),
            Field::Weekday => record.decrement_weekday(),
            Field::Date => record.decrement_date(),
            Field::Month => record.decrement_month(),
            Field::Year => record.decrement_year(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open {
        field: Field,
        /// False while browsing for a field, true while changing its value.
        selecting: bool,
    },
}

/// What a call to [`Menu::update`] did, for the caller to act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum MenuEvent {
    /// Nothing happened.
    Idle,
    /// The menu opened; the RTC must be halted.
    Opened,
    /// Browsing moved to another field.
    Moved(Field),
    /// The field is now being edited.
    Selecting(Field),
    /// The field's value changed.
    Edited(Field),
    /// A press that changed nothing, still counts as activity.
    Touched,
    /// Closed by the user; the record must be written back.
    Committed,
    /// Closed by the timeout; the record must be written back.
    TimedOut,
}

impl MenuEvent {
    /// Whether the record must now be written to the RTC.
    pub fn commits(self) -> bool {
        matches!(self, MenuEvent::Committed | MenuEvent::TimedOut)
    }
}

/// The menu state machine.
#[derive(Debug, Default)]
pub struct Menu {
    state: MenuState,
}

impl Menu {
    pub const fn new() -> Self {
        Self {
            state: MenuState::Closed,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != MenuState::Closed
    }

    /// Advance on one sample of the buttons.  `timed_out` is whether the
    /// idle countdown has reached zero; it is ignored while closed.
    pub fn update(&mut self, edges: Edges, timed_out: bool, record: &mut TimeRecord) -> MenuEvent {
        let MenuState::Open { field, selecting } = self.state else {
            if edges.any() {
                self.state = MenuState::Open {
                    field: Field::Minutes,
                    selecting: false,
                };
                return MenuEvent::Opened;
            }
            return MenuEvent::Idle;
        };

        if timed_out {
            self.state = MenuState::Closed;
            return MenuEvent::TimedOut;
        }

        let mut event = MenuEvent::Idle;
        let mut selecting = selecting;

        // A left press on the same sample as the right press that starts
        // editing already counts as an edit.
        if edges.right {
            if selecting {
                self.state = MenuState::Closed;
                return MenuEvent::Committed;
            }
            selecting = true;
            self.state = MenuState::Open { field, selecting };
            event = MenuEvent::Selecting(field);
        }

        if edges.left {
            if selecting {
                field.step_down(record);
                return MenuEvent::Edited(field);
            }
            let field = field.previous();
            self.state = MenuState::Open { field, selecting };
            return MenuEvent::Moved(field);
        }

        if event == MenuEvent::Idle && edges.center {
            return MenuEvent::Touched;
        }

        event
    }
}
