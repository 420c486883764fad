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
//! Button edges.
//!
//! Buttons pull their line low when pressed.  Debouncing is done on the
//! board, so all we keep is the last two samples of each.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};

use crate::infallible;

/// One active-low button.
pub struct Button<P> {
    pin: P,
    current: bool,
    previous: bool,
}

impl<P> Button<P>
where
    P: InputPin + ErrorType<Error = Infallible>,
{
    /// Starts out released: a line already low on the first sample reads as
    /// a press.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            current: true,
            previous: true,
        }
    }

    pub fn sample(&mut self) {
        self.previous = self.current;
        self.current = infallible(self.pin.is_high());
    }

    pub fn pressed(&self) -> bool {
        self.previous && !self.current
    }

    pub fn released(&self) -> bool {
        !self.previous && self.current
    }
}

/// Press edges seen on one sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edges {
    pub left: bool,
    pub center: bool,
    pub right: bool,
}

impl Edges {
    pub fn any(self) -> bool {
        self.left || self.center || self.right
    }
}

/// The left, centre and right buttons.
pub struct Buttons<L, C, R> {
    pub left: Button<L>,
    pub center: Button<C>,
    pub right: Button<R>,
}

impl<L, C, R> Buttons<L, C, R>
where
    L: InputPin + ErrorType<Error = Infallible>,
    C: InputPin + ErrorType<Error = Infallible>,
    R: InputPin + ErrorType<Error = Infallible>,
{
    pub fn new(left: L, center: C, right: R) -> Self {
        Self {
            left: Button::new(left),
            center: Button::new(center),
            right: Button::new(right),
        }
    }

    /// Take a fresh sample of all three and report which were just pressed.
    pub fn sample(&mut self) -> Edges {
        self.left.sample();
        self.center.sample();
        self.right.sample();
        Edges {
            left: self.left.pressed(),
            center: self.center.pressed(),
            right: self.right.pressed(),
        }
    }
}
