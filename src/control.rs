//! Input collaborators: the analog pot the player turns and the button that
//! tests the current position. Debouncing is left to the hardware side.

use crate::scheduler::Task;
use crate::Shared;

/// Lowest pot reading treated as valid.
pub const POT_LOW: u16 = 0x01F;
/// Highest pot reading treated as valid.
pub const POT_HIGH: u16 = 0x3F0;
/// Usable pot travel, divided into sections by the level geometry.
pub const POT_RANGE: u16 = POT_HIGH - POT_LOW;

/// One-shot analog sample source.
pub trait AnalogInput {
    fn read_raw(&mut self) -> u16;
}

/// Momentary test button.
pub trait Button {
    fn pressed(&mut self) -> bool;
}

/// Current and previous pot sample. The previous sample is kept so the tone
/// sequencer can give rising/falling audio feedback.
#[derive(Debug, Default, Copy, Clone)]
pub struct PotReading {
    pub current: u16,
    pub previous: u16,
}

impl PotReading {
    /// Signed change since the previous sample.
    pub fn delta(&self) -> i32 {
        i32::from(self.current) - i32::from(self.previous)
    }
}

/// Task that keeps [`PotReading`] fresh: each period it retires the current
/// sample to `previous`, takes a new reading and clamps it into
/// `[POT_LOW, POT_HIGH]`. Out-of-range hardware values are absorbed here and
/// never reach the rest of the game.
pub struct PotSampler<A> {
    input: A,
}

impl<A: AnalogInput> PotSampler<A> {
    pub fn new(input: A) -> Self {
        PotSampler { input }
    }
}

impl<A: AnalogInput> Task for PotSampler<A> {
    fn step(&mut self, shared: &mut Shared) {
        shared.pot.previous = shared.pot.current;
        shared.pot.current = self.input.read_raw().clamp(POT_LOW, POT_HIGH);
    }
}
