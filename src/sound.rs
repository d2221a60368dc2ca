//! Background music and audio feedback. The sequencer steps through a fixed
//! tune keyed by the current screen, one note hold per tick; on the awaiting
//! screen it instead gives live two-tone feedback as the pot moves. All
//! output goes through the [`ToneOutput`] collaborator; frequency 0 is
//! silence.

use crate::game::Screen;
use crate::scheduler::Task;
use crate::Shared;

/// Tone collaborator. Implementations may skip reprogramming the hardware
/// when the frequency is unchanged.
pub trait ToneOutput {
    fn set_frequency(&mut self, hz: u16);
}

/// The silence frequency.
pub const SILENT: u16 = 0;

/// Feedback tone while the pot is being turned up.
pub const RISE_TONE_HZ: u16 = 440;
/// Feedback tone while the pot is being turned down.
pub const FALL_TONE_HZ: u16 = 220;
/// Pot counts the sample must move between samples to trigger feedback.
pub const FEEDBACK_THRESHOLD: u16 = 8;

/// One step of a tune: a frequency (0 for a rest) held for a number of
/// sequencer ticks.
#[derive(Debug, Copy, Clone)]
pub struct Note {
    pub hz: u16,
    pub ticks: u8,
}

const fn note(hz: u16, ticks: u8) -> Note {
    Note { hz, ticks }
}

const G3: u16 = 196;
const C4: u16 = 262;
const D4: u16 = 294;
const E4: u16 = 330;
const G4: u16 = 392;
const A4: u16 = 440;
const C5: u16 = 523;
const E5: u16 = 659;
const REST: u16 = SILENT;

pub const WELCOME_TUNE: &[Note] = &[
    note(C4, 2),
    note(E4, 2),
    note(G4, 2),
    note(C5, 4),
    note(REST, 2),
    note(G4, 2),
    note(A4, 2),
    note(C5, 6),
];

pub const WIN_TUNE: &[Note] = &[
    note(G4, 1),
    note(C5, 1),
    note(E5, 4),
    note(REST, 1),
    note(E5, 2),
];

pub const LOSE_TUNE: &[Note] = &[
    note(E4, 3),
    note(D4, 3),
    note(C4, 5),
    note(REST, 1),
    note(G3, 8),
];

/// Tune cursor plus the tone task. A tune plays through once and then holds
/// silence; the cursor rewinds whenever the screen changes, so every screen
/// entry restarts its tune from the top.
pub struct Sequencer<T> {
    out: T,
    pos: usize,
    held: u8,
    last_screen: Screen,
}

impl<T: ToneOutput> Sequencer<T> {
    pub fn new(out: T) -> Self {
        Sequencer {
            out,
            pos: 0,
            held: 0,
            last_screen: Screen::Fault,
        }
    }

    fn rewind(&mut self) {
        self.pos = 0;
        self.held = 0;
    }

    /// Emits one tick of the tune. Exhausted notes are skipped before
    /// emitting, so a note sounds for exactly its configured ticks; past the
    /// end of the tune the output is silence until the cursor rewinds.
    fn play(&mut self, tune: &[Note]) {
        while let Some(current) = tune.get(self.pos) {
            if self.held < current.ticks {
                break;
            }
            self.pos += 1;
            self.held = 0;
        }
        match tune.get(self.pos) {
            Some(current) => {
                self.out.set_frequency(current.hz);
                self.held += 1;
            }
            None => self.out.set_frequency(SILENT),
        }
    }
}

impl<T: ToneOutput> Task for Sequencer<T> {
    fn step(&mut self, shared: &mut Shared) {
        let screen = shared.level.screen;
        if screen != self.last_screen {
            self.rewind();
            self.last_screen = screen;
        }
        match screen {
            Screen::Welcome => self.play(WELCOME_TUNE),
            Screen::Win => self.play(WIN_TUNE),
            Screen::Lose => self.play(LOSE_TUNE),
            Screen::Awaiting => {
                let pot = shared.pot;
                if pot.current > pot.previous + FEEDBACK_THRESHOLD {
                    self.out.set_frequency(RISE_TONE_HZ);
                } else if pot.current + FEEDBACK_THRESHOLD < pot.previous {
                    self.out.set_frequency(FALL_TONE_HZ);
                } else {
                    self.out.set_frequency(SILENT);
                }
            }
            // No tune for the level screen or the fault fallback.
            Screen::NextLevel | Screen::Fault => self.out.set_frequency(SILENT),
        }
    }
}
