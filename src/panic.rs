// Based on https://github.com/Rahix/avr-hal/blob/main/examples/arduino-uno/src/bin/uno-panic.rs
// License MIT

use arduino_hal::prelude::*;

use ds1302clock::tick::SharedTicks;

use crate::board::BAUD_RATE;
use crate::timer::IsrTicks;

/// Report where we died, and whether the menu had the RTC halted at the
/// time: a nonzero timeout means the oscillator is stopped until the next
/// boot writes the default time.
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    avr_device::interrupt::disable();

    // SAFETY: we never return, so nothing else is holding the peripherals.
    let dp = unsafe { arduino_hal::Peripherals::steal() };
    let pins = arduino_hal::pins!(dp);

    // End any transfer left open on the RTC lines.
    let _ce = pins.d2.into_output();

    let mut serial = arduino_hal::default_serial!(dp, pins, BAUD_RATE);
    let ticks = IsrTicks.snapshot();

    match info.location() {
        Some(loc) => ufmt::uwriteln!(
            &mut serial,
            "ds1302clock panic at {}:{}:{}\r",
            loc.file(),
            loc.line(),
            loc.column(),
        )
        .unwrap_infallible(),
        None => ufmt::uwriteln!(&mut serial, "ds1302clock panic\r").unwrap_infallible(),
    }
    if ticks.timeout > 0 {
        ufmt::uwriteln!(&mut serial, "menu open, rtc halted, {} ticks left\r", ticks.timeout)
            .unwrap_infallible();
    }
    loop {}
}
