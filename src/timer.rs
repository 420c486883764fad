/// The half-second tick.
///
/// Uses timer TC1 in CTC mode and its compare match A interrupt to advance
/// a shared [`TickState`]: the menu timeout, the blink phase and the
/// resync flag.
///
/// Based on https://blog.rahix.de/005-avr-hal-millis/
///
/// License assumed to be MIT based on https://github.com/Rahix/avr-hal/blob/main/examples/arduino-uno/src/bin/uno-millis.rs
use avr_device::interrupt::Mutex;
use core::cell;

use ds1302clock::tick::{SharedTicks, TickState};

// Possible Values, at 16 MHz:
//
// ╔═══════════╦══════════════╦═══════════════════╗
// ║ PRESCALER ║ TIMER_COUNTS ║ Overflow Interval ║
// ╠═══════════╬══════════════╬═══════════════════╣
// ║        64 ║        62500 ║            250 ms ║
// ║       256 ║        31250 ║            500 ms ║
// ║      1024 ║        15625 ║           1000 ms ║
// ╚═══════════╩══════════════╩═══════════════════╝
const PRESCALER: u32 = 256;
const TIMER_COUNTS: u32 = 31250;

static TICKS: Mutex<cell::Cell<TickState>> = Mutex::new(cell::Cell::new(TickState::new()));

/// Timer/Counter 1 Compare Match A interrupt service routine.
#[avr_device::interrupt(atmega168)]
fn TIMER1_COMPA() {
    avr_device::interrupt::free(|cs| {
        let ticks = TICKS.borrow(cs);
        let mut state = ticks.get();
        state.on_tick();
        ticks.set(state);
    })
}

/// The tick state owned by the interrupt.  Every access runs with
/// interrupts disabled.
#[derive(Clone, Copy)]
pub struct IsrTicks;

impl SharedTicks for IsrTicks {
    fn modify<R>(&self, f: impl FnOnce(&mut TickState) -> R) -> R {
        avr_device::interrupt::free(|cs| {
            let ticks = TICKS.borrow(cs);
            let mut state = ticks.get();
            let result = f(&mut state);
            ticks.set(state);
            result
        })
    }
}

/// Initialise Timer/Counter 1 for the half-second tick.
/// Configures TC1 for the interval defined by consts PRESCALER and TIMER_COUNTS (in CTC mode).
// More explanation on the atmega168 timer at https://protostack.com.au/2010/09/timer-interrupts-on-an-atmega168/
pub fn init_tc1(tc1: arduino_hal::pac::TC1) {
    // CTC with the top in OCR1A is WGM1 = 0b0100, split across TCCR1A and TCCR1B.
    tc1.tccr1a.write(|w| w.wgm1().bits(0b00));

    // Counts from zero, so the top is one less than the period.
    tc1.ocr1a.write(|w| w.bits((TIMER_COUNTS - 1) as u16));

    tc1.tccr1b.write(|w| {
        let w = w.wgm1().bits(0b01);
        match PRESCALER {
            1 => w.cs1().direct(),
            8 => w.cs1().prescale_8(),
            64 => w.cs1().prescale_64(),
            256 => w.cs1().prescale_256(),
            1024 => w.cs1().prescale_1024(),
            _ => panic!(),
        }
    });

    // Enable the compare interrupt in TIMSK1.  Nothing runs until interrupts are enabled globally.
    tc1.timsk1.write(|w| w.ocie1a().set_bit());

    avr_device::interrupt::free(|cs| {
        TICKS.borrow(cs).set(TickState::new());
    });
}
