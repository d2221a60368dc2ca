//! Game logic for a lock-picking minigame: a potentiometer is the pick, a
//! random slice of its travel is the winning position, and a button tests the
//! current position. Four cooperating tasks (pot sampler, game logic, screen
//! presenter, tone sequencer) share one state record and are stepped by a
//! fixed-quantum round-robin scheduler.
//!
//! Everything in this library is hardware-independent; the firmware binary
//! supplies the display, speaker, pot and button collaborators through the
//! traits in [`screen`], [`sound`] and [`control`].

#![cfg_attr(not(test), no_std)]

pub mod control;
pub mod game;
pub mod scheduler;
pub mod screen;
pub mod sound;

pub use control::{AnalogInput, Button, PotReading, PotSampler, POT_HIGH, POT_LOW};
pub use game::{GameLogic, Level, Screen};
pub use scheduler::{Scheduler, TableFull, Task};
pub use screen::{Lcd, Presenter};
pub use sound::{Sequencer, ToneOutput};

/// Scheduler quantum: the GCD of all task periods, in milliseconds.
pub const QUANTUM_MS: u32 = 100;
pub const PERIOD_POT_SAMPLE_MS: u32 = 100;
pub const PERIOD_GAME_LOGIC_MS: u32 = 200;
pub const PERIOD_UPDATE_SCREEN_MS: u32 = 200;
pub const PERIOD_GAME_SOUND_MS: u32 = 100;

/// The one record shared between tasks. The scheduler steps tasks one at a
/// time on a single thread, so no locking is needed; each task gets exclusive
/// access for the duration of its step.
pub struct Shared {
    /// Level geometry, lives and screen selection. Mutated by the game logic
    /// task, read by the presenter and the sequencer.
    pub level: Level,
    /// Current and previous pot sample. Written by the sampler task.
    pub pot: PotReading,
    /// Id of the game-logic state processed on its most recent tick. Debug
    /// side channel only; nothing in the game reads it.
    pub logic_state: u8,
}

impl Shared {
    pub fn new() -> Self {
        Shared {
            level: Level::new(),
            pot: PotReading::default(),
            logic_state: 0,
        }
    }
}

impl Default for Shared {
    fn default() -> Self {
        Self::new()
    }
}
