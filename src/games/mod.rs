pub mod pong;
pub mod snake;

use crate::config::Config;
use crate::display::{Framebuffer, hud};
use crate::input::{ExitHoldGesture, HoldProgress, InputSnapshot};
use crate::platform::Platform;
use crate::scores::GameId;

pub use pong::Pong;
pub use snake::Snake;

/// What one call to `step` produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOutcome {
    Continuing { score: u32 },
    ExitRequested,
    GameOver { score: u32 },
}

/// Everything a mini-game may touch during one frame.
pub struct GameContext<'a, P: Platform> {
    pub platform: &'a mut P,
    pub frame: &'a mut Framebuffer,
    pub input: InputSnapshot,
    pub now: u64,
    pub high_score: u32,
    pub config: &'a Config,
}

pub trait MiniGame {
    fn id(&self) -> GameId;

    /// Reset the playfield, show the instructions and begin the grace
    /// period.
    fn start<P: Platform>(&mut self, ctx: &mut GameContext<'_, P>);

    /// Advance at most one frame of play and redraw. Never blocks.
    fn step<P: Platform>(&mut self, ctx: &mut GameContext<'_, P>) -> StepOutcome;
}

/// The closed set of games the console can run.
pub enum ActiveGame {
    Snake(Snake),
    Pong(Pong),
}

impl ActiveGame {
    pub fn new(id: GameId, config: &Config) -> Self {
        match id {
            GameId::Snake => ActiveGame::Snake(Snake::new(config)),
            GameId::Pong => ActiveGame::Pong(Pong::new(config)),
        }
    }
}

impl MiniGame for ActiveGame {
    fn id(&self) -> GameId {
        match self {
            ActiveGame::Snake(game) => game.id(),
            ActiveGame::Pong(game) => game.id(),
        }
    }

    fn start<P: Platform>(&mut self, ctx: &mut GameContext<'_, P>) {
        match self {
            ActiveGame::Snake(game) => game.start(ctx),
            ActiveGame::Pong(game) => game.start(ctx),
        }
    }

    fn step<P: Platform>(&mut self, ctx: &mut GameContext<'_, P>) -> StepOutcome {
        match self {
            ActiveGame::Snake(game) => game.step(ctx),
            ActiveGame::Pong(game) => game.step(ctx),
        }
    }
}

/// "Get Ready" grace period that follows `start`.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct GetReady {
    until: u64,
    cleared: bool,
}

impl GetReady {
    pub(crate) fn begin(&mut self, now: u64, duration_ms: u64) {
        self.until = now + duration_ms;
        self.cleared = false;
    }

    /// True while play must stay frozen. The first call after the grace
    /// period wipes the instructions off the playfield.
    pub(crate) fn holding(&mut self, frame: &mut Framebuffer, now: u64) -> bool {
        if now < self.until {
            return true;
        }
        if !self.cleared {
            hud::clear_playfield(frame);
            self.cleared = true;
        }
        false
    }
}

/// Runs the hold-to-exit check ahead of any gameplay. `Some` means the
/// game must return that outcome without simulating this frame.
pub(crate) fn check_exit_hold<P: Platform>(
    gesture: &mut ExitHoldGesture,
    ctx: &mut GameContext<'_, P>,
    score: u32,
) -> Option<StepOutcome> {
    match gesture.update(ctx.input.both, ctx.now) {
        HoldProgress::Idle => None,
        HoldProgress::Holding(progress) => {
            hud::exit_hold_bar(ctx.frame, progress);
            Some(StepOutcome::Continuing { score })
        }
        HoldProgress::Fired => {
            info!("exit gesture fired");
            Some(StepOutcome::ExitRequested)
        }
    }
}
