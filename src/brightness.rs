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
//! Display brightness from the ambient light sensor.

/// PWM duty for a 10-bit ADC sample: the top eight bits, never below `floor`.
pub fn duty_from_sample(sample: u16, floor: u8) -> u8 {
    u8::try_from(sample >> 2).unwrap_or(u8::MAX).max(floor)
}
