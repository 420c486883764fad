/*
 ds1302clock

 Four digit seven segment clock, kept by a DS1302 real-time clock.

 Target: ATmega168, clock at 16 MHz.

 This program is free software: you can redistribute it and/or modify
 it under the terms of the GNU General Public License as published by
 the Free Software Foundation, either version 3 of the License, or
 (at your option) any later version.

 This program is distributed in the hope that it will be useful,
 but WITHOUT ANY WARRANTY; without even the implied warranty of
 MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 GNU General Public License for more details.

 You should have received a copy of the GNU General Public License
 along with this program.  If not, see <http://www.gnu.org/licenses/>.

 */

#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod board;
#[cfg(all(target_arch = "avr", feature = "panic-serial"))]
mod panic;
#[cfg(target_arch = "avr")]
mod timer;

#[cfg(all(target_arch = "avr", not(feature = "panic-serial")))]
use panic_halt as _;

#[cfg(target_arch = "avr")]
#[arduino_hal::entry]
fn main() -> ! {
    use arduino_hal::prelude::*;
    use arduino_hal::simple_pwm::{IntoPwmPin, Prescaler, Timer2Pwm};

    use ds1302clock::buttons::Buttons;
    use ds1302clock::brightness::duty_from_sample;
    use ds1302clock::display::SegmentDisplay;
    use ds1302clock::menu::MenuEvent;
    use ds1302clock::{Clock, Ds1302, Heartbeat, Settings};

    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);
    let mut serial = arduino_hal::default_serial!(dp, pins, board::BAUD_RATE);

    timer::init_tc1(dp.TC1);

    let settings = Settings::default();

    let rtc = Ds1302::new(
        pins.d2.into_output(),
        pins.d4.into_output(),
        board::DataLine::new(pins.d8.into_output()),
        arduino_hal::Delay::new(),
    );

    // Buttons pull to ground, debounced in hardware.
    let buttons = Buttons::new(
        pins.d5.into_pull_up_input(),
        pins.d6.into_pull_up_input(),
        pins.d7.into_pull_up_input(),
    );

    // 74HC595 chain.  MR held high so the outputs are never cleared.
    let mut clear = pins.d9.into_output();
    clear.set_high();
    let mut display = SegmentDisplay::new(
        pins.d12.into_output(),
        pins.d13.into_output(),
        pins.d10.into_output(),
        arduino_hal::Delay::new(),
    );

    // Ambient light on A0 sets the duty on the 595 output enable.
    let mut adc = arduino_hal::Adc::new(dp.ADC, Default::default());
    let light = pins.a0.into_analog_input(&mut adc);
    let timer2 = Timer2Pwm::new(dp.TC2, Prescaler::Prescale64);
    let mut brightness = pins.d11.into_output().into_pwm(&timer2);
    brightness.set_duty(u8::MAX);
    brightness.enable();

    let mut clock = Clock::new(rtc, buttons, timer::IsrTicks, settings);
    clock.initialize(settings.default_time);
    ufmt::uwriteln!(&mut serial, "boot {}\r", clock.record()).unwrap_infallible();

    // SAFETY: everything the ISR shares is behind a Mutex.
    unsafe { avr_device::interrupt::enable() };

    let mut shown = None;
    loop {
        match clock.on_button_sample() {
            MenuEvent::Idle => {}
            event if event.commits() => {
                ufmt::uwriteln!(&mut serial, "set {}\r", clock.record()).unwrap_infallible();
            }
            event => {
                ufmt::uwriteln!(&mut serial, "menu {:?}\r", event).unwrap_infallible();
            }
        }

        if clock.heartbeat() == Heartbeat::Resynced {
            ufmt::uwriteln!(&mut serial, "sync {}\r", clock.record()).unwrap_infallible();
        }

        let codes = clock.current_digit_codes();
        if shown != Some(codes) {
            display.write(&codes);
            shown = Some(codes);
        }

        match adc.read_nonblocking(&light) {
            Ok(sample) => brightness.set_duty(duty_from_sample(sample, settings.min_brightness)),
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(never)) => match never {},
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
