//! Screen presenter: the gate between game state and the display
//! collaborator. The display is slow, so it is touched only when the game
//! logic has raised the redraw signal; consuming the signal here is what
//! dedupes output and keeps the screen from flickering.

use crate::game::Screen;
use crate::scheduler::Task;
use crate::Shared;

/// Display collaborator. `render` draws exactly one fixed template; the
/// implementation must handle every [`Screen`] id, with [`Screen::Fault`]
/// shown as a diagnostic template rather than an error.
pub trait Lcd {
    fn clear(&mut self);
    fn render(&mut self, screen: Screen, stage: u16, pins: u8);
}

pub struct Presenter<D> {
    lcd: D,
}

impl<D: Lcd> Presenter<D> {
    pub fn new(lcd: D) -> Self {
        Presenter { lcd }
    }
}

impl<D: Lcd> Task for Presenter<D> {
    fn step(&mut self, shared: &mut Shared) {
        if !shared.level.redraw {
            return;
        }
        self.lcd.clear();
        self.lcd
            .render(shared.level.screen, shared.level.stage, shared.level.pins);
        shared.level.redraw = false;
    }
}
