//! The level model and the game-logic state machine.
//!
//! A level divides the pot's travel into `sections` equal slices, one of
//! which is the winning position. The player tests positions with the button
//! and loses a bobby pin for every miss. [`GameLogic`] drives the whole game
//! as a Moore-style state machine, ticked by the scheduler: each step first
//! takes a transition, then runs the action of the state it landed in.

use rand::Rng;

use crate::control::{Button, POT_LOW, POT_RANGE};
use crate::scheduler::Task;
use crate::Shared;

/// Bobby pins handed out at the start of every stage.
pub const MAX_PINS: u8 = 5;
/// Difficulty cap; sections top out at `2 * MAX_DIFFICULTY`.
const MAX_DIFFICULTY: u8 = 5;
/// Logic ticks the welcome, level and win screens are held on display.
const HOLD_TICKS: u8 = 15;

/// Which fixed template the presenter should show. `Fault` is the
/// diagnostic fallback; the game never navigates to it, but the display
/// collaborator renders it rather than failing on anything unexpected.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Screen {
    Welcome,
    NextLevel,
    Awaiting,
    Win,
    Lose,
    Fault,
}

/// Geometry and progress of the current stage. One instance lives for the
/// whole process inside [`Shared`](crate::Shared); it starts out
/// uninitialized (`Fault` screen, no redraw) and is brought to life by
/// [`init`](Level::init) on the first game-logic tick.
#[derive(Debug, Clone)]
pub struct Level {
    /// Grows by one every stage; the section count stops scaling past
    /// `MAX_DIFFICULTY`.
    pub difficulty: u8,
    /// Stage number, for display only.
    pub stage: u16,
    /// How many slices the pot travel is divided into, `2..=10`.
    pub sections: u8,
    /// The winning slice, `1..=sections`.
    pub win_section: u8,
    /// Template the presenter should show.
    pub screen: Screen,
    /// Bobby pins left; the player is out of the game at zero.
    pub pins: u8,
    /// Verdict of the most recent test.
    pub beat_stage: bool,
    /// Raised whenever screen-relevant state changes, cleared by the
    /// presenter once it has drawn. The presenter never draws on its own.
    pub redraw: bool,
}

impl Level {
    pub fn new() -> Self {
        Level {
            difficulty: 0,
            stage: 0,
            sections: 2,
            win_section: 1,
            screen: Screen::Fault,
            pins: MAX_PINS,
            beat_stage: false,
            redraw: false,
        }
    }

    /// Resets to the pre-game state and requests the welcome screen.
    pub fn init(&mut self) {
        self.difficulty = 0;
        self.stage = 0;
        self.sections = 2;
        self.win_section = 1;
        self.pins = MAX_PINS;
        self.beat_stage = false;
        self.goto_screen(Screen::Welcome);
    }

    /// Advances to the next stage: difficulty up by one, geometry recomputed,
    /// a fresh winning section drawn, pins refilled and the level screen
    /// requested. The random source is seeded once at boot and only ever
    /// advanced here.
    pub fn generate<R: Rng>(&mut self, rng: &mut R) {
        self.difficulty = self.difficulty.saturating_add(1);
        self.stage = self.stage.saturating_add(1);
        self.sections = self.difficulty.clamp(1, MAX_DIFFICULTY) * 2;
        self.win_section = rng.gen_range(1..=self.sections);
        self.pins = MAX_PINS;
        self.beat_stage = false;
        self.goto_screen(Screen::NextLevel);
    }

    /// Inclusive pot range mapped to the winning section. Slice width is
    /// `POT_RANGE / sections` with truncating division, so the top of the
    /// last section can fall a few counts short of `POT_HIGH`; that dead
    /// zone is long-standing observed behavior and is kept.
    pub fn win_window(&self) -> (u16, u16) {
        let slice = POT_RANGE / u16::from(self.sections);
        let low = POT_LOW + u16::from(self.win_section - 1) * slice;
        (low, low + slice)
    }

    /// Pure verdict for a sample against the current geometry.
    pub fn is_win(&self, sample: u16) -> bool {
        let (low, high) = self.win_window();
        sample >= low && sample <= high
    }

    /// Records the verdict for a tested sample; a miss costs one pin.
    pub fn test_selection(&mut self, sample: u16) {
        self.beat_stage = self.is_win(sample);
        if !self.beat_stage && self.pins > 0 {
            self.pins -= 1;
        }
    }

    pub fn alive(&self) -> bool {
        self.pins > 0
    }

    /// Selects a screen and raises the redraw signal.
    pub fn goto_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.redraw = true;
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum State {
    Start,
    Init,
    Welcome,
    GenLevel,
    DispLevel,
    Wait,
    Test,
    Win,
    GameOver,
    Reset,
}

impl State {
    /// Stable id for the diagnostic side channel.
    fn id(self) -> u8 {
        match self {
            State::Start => 0,
            State::Init => 1,
            State::Welcome => 2,
            State::GenLevel => 3,
            State::DispLevel => 4,
            State::Wait => 5,
            State::Test => 6,
            State::Win => 7,
            State::GameOver => 8,
            State::Reset => 9,
        }
    }
}

/// The orchestrating state machine:
///
/// ```text
/// Start -> Init -> Welcome -> GenLevel -> DispLevel -> Wait <-> Test -> Win -> GenLevel
///                                                       \-> GameOver -> Reset -> Init
/// ```
///
/// `Wait` is left for `Test` on a button press and for `GameOver` once the
/// pins run out. `Test` takes one tick to record the verdict and branches on
/// it the tick after. Timed screens (`Welcome`, `DispLevel`, `Win`) are held
/// for a counted number of ticks, not wall-clock time.
pub struct GameLogic<B, R> {
    state: State,
    /// Tick counter for the counted screen holds.
    hold: u8,
    /// First-entry flag: screens are requested once per entry into `Wait`,
    /// `Win` and `GameOver`, not on every tick spent there.
    fresh: bool,
    button: B,
    rng: R,
}

impl<B: Button, R: Rng> GameLogic<B, R> {
    pub fn new(button: B, rng: R) -> Self {
        GameLogic {
            state: State::Start,
            hold: 0,
            fresh: true,
            button,
            rng,
        }
    }
}

impl<B: Button, R: Rng> Task for GameLogic<B, R> {
    fn step(&mut self, shared: &mut Shared) {
        shared.logic_state = self.state.id();
        let pressed = self.button.pressed();

        self.state = match self.state {
            State::Start => State::Init,
            State::Init => State::Welcome,
            State::Welcome => {
                if self.hold >= HOLD_TICKS {
                    State::GenLevel
                } else {
                    State::Welcome
                }
            }
            State::GenLevel => State::DispLevel,
            State::DispLevel => {
                if self.hold >= HOLD_TICKS {
                    State::Wait
                } else {
                    State::DispLevel
                }
            }
            State::Wait => {
                if !shared.level.alive() {
                    State::GameOver
                } else if pressed {
                    State::Test
                } else {
                    State::Wait
                }
            }
            State::Test => {
                if shared.level.beat_stage {
                    State::Win
                } else {
                    State::Wait
                }
            }
            State::Win => {
                if self.hold >= HOLD_TICKS {
                    State::GenLevel
                } else {
                    State::Win
                }
            }
            State::GameOver => {
                if pressed {
                    State::Reset
                } else {
                    State::GameOver
                }
            }
            State::Reset => State::Init,
        };

        match self.state {
            State::Start => {}
            State::Init => shared.level.init(),
            State::Welcome => self.hold += 1,
            State::GenLevel => {
                self.hold = 0;
                self.fresh = true;
                shared.level.generate(&mut self.rng);
            }
            State::DispLevel => self.hold += 1,
            State::Wait => {
                if self.fresh {
                    shared.level.goto_screen(Screen::Awaiting);
                    self.fresh = false;
                }
            }
            State::Test => {
                self.fresh = true;
                shared.level.test_selection(shared.pot.current);
            }
            State::Win => {
                if self.fresh {
                    shared.level.goto_screen(Screen::Win);
                    self.fresh = false;
                    self.hold = 0;
                }
                self.hold += 1;
            }
            State::GameOver => {
                if !self.fresh {
                    shared.level.goto_screen(Screen::Lose);
                    self.fresh = true;
                }
            }
            State::Reset => {
                self.hold = 0;
                self.fresh = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::control::POT_HIGH;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    struct Presses(Vec<bool>);

    impl Button for Presses {
        fn pressed(&mut self) -> bool {
            if self.0.is_empty() {
                false
            } else {
                self.0.remove(0)
            }
        }
    }

    fn level_with(sections: u8, win_section: u8) -> Level {
        let mut level = Level::new();
        level.sections = sections;
        level.win_section = win_section;
        level
    }

    #[test]
    fn init_then_generate_round_trip() {
        let mut level = Level::new();
        level.init();
        level.generate(&mut rng());
        assert_eq!(level.difficulty, 1);
        assert_eq!(level.sections, 2);
        assert_eq!(level.pins, MAX_PINS);
        assert_eq!(level.screen, Screen::NextLevel);
        assert!(level.redraw);
        assert!(!level.beat_stage);
    }

    #[test]
    fn sections_scale_with_difficulty_then_clamp() {
        let mut level = Level::new();
        let mut rng = rng();
        level.init();
        for expected_difficulty in 1..=10u8 {
            level.generate(&mut rng);
            assert_eq!(level.difficulty, expected_difficulty);
            assert_eq!(
                level.sections,
                2 * expected_difficulty.min(MAX_DIFFICULTY)
            );
            assert!(level.win_section >= 1 && level.win_section <= level.sections);
        }
    }

    #[test]
    fn win_windows_cover_each_section_exactly() {
        for sections in [2u8, 4, 6, 8, 10] {
            let slice = POT_RANGE / u16::from(sections);
            for win_section in 1..=sections {
                let level = level_with(sections, win_section);
                let (low, high) = level.win_window();
                assert_eq!(low, POT_LOW + u16::from(win_section - 1) * slice);
                assert_eq!(high, low + slice);
                for sample in low..=high {
                    assert!(level.is_win(sample));
                }
                assert!(!level.is_win(low - 1));
                assert!(!level.is_win(high + 1));
            }
        }
    }

    #[test]
    fn adjacent_windows_are_contiguous() {
        let sections = 6u8;
        for win_section in 1..sections {
            let (_, high) = level_with(sections, win_section).win_window();
            let (next_low, _) = level_with(sections, win_section + 1).win_window();
            assert_eq!(high, next_low);
        }
    }

    #[test]
    fn easiest_level_boundary_samples() {
        // difficulty 1 -> two sections. The very bottom of the travel is in
        // section 1; the very top misses section 1.
        let level = level_with(2, 1);
        assert!(level.is_win(POT_LOW));
        assert!(!level.is_win(POT_HIGH));
    }

    #[test]
    fn truncation_leaves_dead_zone_below_pot_high() {
        // With two sections the slice is 977 / 2 = 488, so section 2 tops
        // out at 1007 and POT_HIGH itself (1008) is in no window.
        let level = level_with(2, 2);
        let (_, high) = level.win_window();
        assert!(high < POT_HIGH);
        assert!(!level.is_win(POT_HIGH));
    }

    #[test]
    fn pins_never_go_negative() {
        let mut level = level_with(2, 1);
        let losing = POT_HIGH - 1;
        assert!(!level.is_win(losing));
        for remaining in (0..MAX_PINS).rev() {
            level.test_selection(losing);
            assert_eq!(level.pins, remaining);
        }
        assert!(!level.alive());
        level.test_selection(losing);
        assert_eq!(level.pins, 0);
    }

    #[test]
    fn boot_sequence_walks_welcome_level_then_waits() {
        let mut shared = Shared::new();
        let mut logic = GameLogic::new(Presses(Vec::new()), rng());

        logic.step(&mut shared);
        logic.step(&mut shared);
        assert_eq!(shared.level.screen, Screen::Welcome);

        // Welcome is held for 15 further ticks before the level generates.
        for _ in 0..15 {
            logic.step(&mut shared);
        }
        assert_eq!(shared.level.screen, Screen::NextLevel);
        assert_eq!(shared.level.stage, 1);

        // Same hold again for the level screen, then the game waits.
        for _ in 0..16 {
            logic.step(&mut shared);
        }
        assert_eq!(shared.level.screen, Screen::Awaiting);

        // The diagnostic id reports the state a tick processed, so Wait
        // shows up on the following tick.
        logic.step(&mut shared);
        assert_eq!(shared.logic_state, 5);
    }

    /// Runs a fresh machine up to the Wait state with no presses.
    fn run_to_wait(logic: &mut GameLogic<Presses, SmallRng>, shared: &mut Shared) {
        for _ in 0..33 {
            logic.step(shared);
        }
        assert_eq!(shared.level.screen, Screen::Awaiting);
    }

    #[test]
    fn winning_test_advances_to_next_stage() {
        let mut shared = Shared::new();
        let mut logic = GameLogic::new(Presses(Vec::new()), rng());
        run_to_wait(&mut logic, &mut shared);

        let (win_low, _) = shared.level.win_window();
        shared.pot.current = win_low;
        logic.button.0.push(true);
        logic.step(&mut shared); // Wait -> Test, verdict recorded
        assert!(shared.level.beat_stage);
        logic.step(&mut shared); // Test -> Win
        assert_eq!(shared.level.screen, Screen::Win);

        for _ in 0..16 {
            logic.step(&mut shared);
        }
        assert_eq!(shared.level.stage, 2);
        assert_eq!(shared.level.difficulty, 2);
        assert_eq!(shared.level.pins, MAX_PINS);
    }

    #[test]
    fn five_losses_end_the_game_regardless_of_input() {
        let mut shared = Shared::new();
        let mut logic = GameLogic::new(Presses(Vec::new()), rng());
        run_to_wait(&mut logic, &mut shared);

        // Park the pot outside the win window.
        let (win_low, win_high) = shared.level.win_window();
        shared.pot.current = if win_low > POT_LOW { POT_LOW } else { win_high + 1 };

        for loss in 1..=MAX_PINS {
            logic.button.0.push(true);
            logic.step(&mut shared); // Wait -> Test
            assert_eq!(shared.level.pins, MAX_PINS - loss);
            logic.step(&mut shared); // Test -> Wait
        }
        assert!(!shared.level.alive());

        // The next wait tick notices the pins are gone, with or without a
        // press, and the lose screen comes up.
        logic.button.0.push(true);
        logic.step(&mut shared);
        assert_eq!(shared.level.screen, Screen::Lose);
        assert_eq!(shared.logic_state, 5);

        // A press on the game-over screen starts the whole game over.
        logic.button.0.push(true);
        logic.step(&mut shared); // GameOver -> Reset
        logic.step(&mut shared); // Reset -> Init
        assert_eq!(shared.level.screen, Screen::Welcome);
        assert_eq!(shared.level.stage, 0);
        assert_eq!(shared.level.pins, MAX_PINS);
    }
}
