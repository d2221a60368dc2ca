#![no_main]
#![no_std]

mod board;

use cortex_m_rt::entry;
use microbit::hal::prelude::*;
use microbit::hal::Timer;
use microbit::Board;
use panic_rtt_target as _;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rtt_target::{rprintln, rtt_init_print};

use lockpick::{
    GameLogic, PotSampler, Presenter, Scheduler, Sequencer, Shared, PERIOD_GAME_LOGIC_MS,
    PERIOD_GAME_SOUND_MS, PERIOD_POT_SAMPLE_MS, PERIOD_UPDATE_SCREEN_MS, QUANTUM_MS,
};

use crate::board::{ButtonLatch, Potentiometer, RttScreen, Speaker};

#[entry]
fn main() -> ! {
    rtt_init_print!();
    let board = Board::take().unwrap();
    let mut timer = Timer::new(board.TIMER0);

    // The pot doubles as the entropy source: one unsettled conversion seeds
    // the generator, once, before anything else reads the channel.
    let mut pot = Potentiometer::new(board.SAADC, board.pins.p0_02);
    let rng = SmallRng::seed_from_u64(pot.seed());

    let button = ButtonLatch::init(board.GPIOTE, board.buttons);
    let speaker = Speaker::new(board.PWM0, board.speaker_pin);

    let mut sampler = PotSampler::new(pot);
    let mut logic = GameLogic::new(button, rng);
    let mut presenter = Presenter::new(RttScreen);
    let mut sequencer = Sequencer::new(speaker);

    let mut shared = Shared::new();
    let mut sched = Scheduler::<4>::new(QUANTUM_MS);
    sched.add(PERIOD_POT_SAMPLE_MS, &mut sampler).unwrap();
    sched.add(PERIOD_GAME_LOGIC_MS, &mut logic).unwrap();
    sched.add(PERIOD_UPDATE_SCREEN_MS, &mut presenter).unwrap();
    sched.add(PERIOD_GAME_SOUND_MS, &mut sequencer).unwrap();

    let mut last_state = shared.logic_state;
    loop {
        sched.tick(&mut shared);
        if shared.logic_state != last_state {
            rprintln!("logic state {}", shared.logic_state);
            last_state = shared.logic_state;
        }
        timer.delay_ms(QUANTUM_MS);
    }
}
