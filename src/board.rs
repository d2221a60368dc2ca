//! micro:bit v2 bindings for the game's collaborator traits: the pot on
//! edge-connector pad 0, button A latched through GPIOTE, the on-board
//! speaker on PWM0, and screen templates printed over RTT in place of a
//! character LCD.

use core::cell::RefCell;

use cortex_m::interrupt::{free, Mutex};
use embedded_hal::adc::OneShot;
use microbit::board::Buttons;
use microbit::hal::gpio::p0::{P0_00, P0_02};
use microbit::hal::gpio::{Disconnected, Floating, Input, Level};
use microbit::hal::gpiote::Gpiote;
use microbit::hal::prelude::*;
use microbit::hal::pwm::{self, Pwm};
use microbit::hal::saadc::{Saadc, SaadcConfig};
use microbit::hal::time::Hertz;
use microbit::pac::{self, interrupt, GPIOTE, PWM0, SAADC};
use rtt_target::rprintln;

use lockpick::{AnalogInput, Button, Lcd, Screen, ToneOutput};

/// Pot wired between 3V and GND with the wiper on pad 0.
pub struct Potentiometer {
    adc: Saadc,
    pin: P0_02<Input<Floating>>,
}

impl Potentiometer {
    pub fn new(saadc: SAADC, pin: P0_02<Disconnected>) -> Self {
        Potentiometer {
            adc: Saadc::new(saadc, SaadcConfig::default()),
            pin: pin.into_floating_input(),
        }
    }

    /// Entropy for the boot-time RNG seed: the first conversion on a still
    /// unsettled channel is noisy enough to vary between power-ups.
    pub fn seed(&mut self) -> u64 {
        u64::from(self.sample())
    }

    fn sample(&mut self) -> u16 {
        // 14-bit single-ended conversion, scaled down to the 10-bit domain
        // the game's pot constants are written in.
        let raw = nb::block!(self.adc.read(&mut self.pin)).unwrap_or(0);
        (raw.max(0) as u16) >> 4
    }
}

impl AnalogInput for Potentiometer {
    fn read_raw(&mut self) -> u16 {
        self.sample()
    }
}

static GPIO: Mutex<RefCell<Option<Gpiote>>> = Mutex::new(RefCell::new(None));
static PRESSED: Mutex<RefCell<bool>> = Mutex::new(RefCell::new(false));

/// Button A, latched by the GPIOTE interrupt so a short press between two
/// game-logic ticks is not lost. Reading the latch consumes it. No
/// debouncing; the latch plus the 200 ms logic period is good enough in
/// practice.
pub struct ButtonLatch {
    _priv: (),
}

impl ButtonLatch {
    pub fn init(board_gpiote: GPIOTE, board_buttons: Buttons) -> Self {
        let gpiote = Gpiote::new(board_gpiote);

        let channel0 = gpiote.channel0();
        channel0
            .input_pin(&board_buttons.button_a.degrade())
            .hi_to_lo()
            .enable_interrupt();
        channel0.reset_events();

        free(move |cs| {
            /* Enable external GPIO interrupts */
            unsafe {
                pac::NVIC::unmask(pac::Interrupt::GPIOTE);
            }
            pac::NVIC::unpend(pac::Interrupt::GPIOTE);
            *GPIO.borrow(cs).borrow_mut() = Some(gpiote);
        });

        ButtonLatch { _priv: () }
    }
}

impl Button for ButtonLatch {
    fn pressed(&mut self) -> bool {
        free(|cs| PRESSED.borrow(cs).replace(false))
    }
}

#[interrupt]
fn GPIOTE() {
    // Enter a critical section here to satisfy the Mutex.
    free(|cs| {
        if let Some(gpiote) = GPIO.borrow(cs).borrow().as_ref() {
            if gpiote.channel0().is_event_triggered() {
                *PRESSED.borrow(cs).borrow_mut() = true;
            }
            gpiote.channel0().reset_events();
        }
    });
}

/// On-board speaker driven by PWM0 at half duty. Reprogramming the PWM is
/// skipped when the requested frequency has not changed.
pub struct Speaker {
    pwm: Pwm<PWM0>,
    current_hz: u16,
}

impl Speaker {
    pub fn new(pwm0: PWM0, pin: P0_00<Disconnected>) -> Self {
        let pwm = Pwm::new(pwm0);
        pwm.set_output_pin(
            pwm::Channel::C0,
            pin.into_push_pull_output(Level::Low).degrade(),
        )
        .set_prescaler(pwm::Prescaler::Div16)
        .set_counter_mode(pwm::CounterMode::UpAndDown)
        .enable();
        Speaker { pwm, current_hz: 0 }
    }
}

impl ToneOutput for Speaker {
    fn set_frequency(&mut self, hz: u16) {
        if hz == self.current_hz {
            return;
        }
        self.current_hz = hz;
        if hz == 0 {
            self.pwm.set_duty_on_common(0);
        } else {
            self.pwm.set_period(Hertz(u32::from(hz)));
            self.pwm.set_duty_on_common(self.pwm.max_duty() / 2);
        }
    }
}

/// Stand-in for a character LCD: each template is a line over RTT.
pub struct RttScreen;

impl Lcd for RttScreen {
    fn clear(&mut self) {
        rprintln!("");
    }

    fn render(&mut self, screen: Screen, stage: u16, pins: u8) {
        match screen {
            Screen::Welcome => rprintln!("Lock Picking! Turn the pot, press A to test."),
            Screen::NextLevel => rprintln!("Stage {}", stage),
            Screen::Awaiting => rprintln!("Pick the lock!  Bobby pins: {}", pins),
            Screen::Win => rprintln!("*click* The lock opens!"),
            Screen::Lose => rprintln!("Out of bobby pins. Press A to start over."),
            Screen::Fault => rprintln!("?? unknown screen ??"),
        }
    }
}
