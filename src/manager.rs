//! Top-level state machine: boot animation, menu, one running mini-game
//! and the game-over overlay.

use crate::config::{Config, ConfigError};
use crate::display::{Framebuffer, hud};
use crate::games::{ActiveGame, GameContext, MiniGame, StepOutcome};
use crate::input::{ButtonEdges, InputSnapshot, wait_for_release};
use crate::menu::{Menu, MenuAction, MenuEntry};
use crate::platform::Platform;
use crate::scores::{GameId, HighScoreTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemState {
    Boot,
    Menu,
    InGame,
    GameOver,
}

impl SystemState {
    pub const fn name(self) -> &'static str {
        match self {
            SystemState::Boot => "boot",
            SystemState::Menu => "menu",
            SystemState::InGame => "in-game",
            SystemState::GameOver => "game-over",
        }
    }
}

/// The game picked from the menu. Dropped on the way back to the menu;
/// after a game over it lives on until the overlay expires.
pub struct ActiveGameSession {
    game: ActiveGame,
    initialized: bool,
    score: u32,
    game_over: bool,
}

impl ActiveGameSession {
    fn new(id: GameId, config: &Config) -> Self {
        ActiveGameSession {
            game: ActiveGame::new(id, config),
            initialized: false,
            score: 0,
            game_over: false,
        }
    }

    pub fn game_id(&self) -> GameId {
        self.game.id()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
}

enum Stage {
    Boot { started: u64 },
    Menu,
    InGame(ActiveGameSession),
    GameOver { until: u64, session: ActiveGameSession },
}

impl Stage {
    fn state(&self) -> SystemState {
        match self {
            Stage::Boot { .. } => SystemState::Boot,
            Stage::Menu => SystemState::Menu,
            Stage::InGame(_) => SystemState::InGame,
            Stage::GameOver { .. } => SystemState::GameOver,
        }
    }
}

pub struct GameManager<P: Platform> {
    platform: P,
    config: Config,
    frame: Framebuffer,
    stage: Stage,
    menu: Menu<'static>,
    edges: ButtonEdges,
    scores: HighScoreTable,
}

impl<P: Platform> GameManager<P> {
    /// Validates `config`, loads the stored high scores and enters Boot.
    pub fn new(mut platform: P, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let scores = HighScoreTable::load(platform.storage(), config.score_ceiling);
        let started = platform.now_ms();
        info!("boot at {} ms", started);
        Ok(GameManager {
            platform,
            config,
            frame: Framebuffer::new(),
            stage: Stage::Boot { started },
            menu: Menu::init(hud::TITLE, &MenuEntry::ALL),
            edges: ButtonEdges::new(),
            scores,
        })
    }

    /// Runs one frame: samples the buttons once, advances the current
    /// state and pushes the framebuffer out if anything was drawn.
    pub fn tick(&mut self) -> SystemState {
        let now = self.platform.now_ms();
        let input = InputSnapshot::read(&mut self.platform);
        let before = self.stage.state();

        let stage = core::mem::replace(&mut self.stage, Stage::Menu);
        self.stage = match stage {
            Stage::Boot { started } => self.boot(started, input, now),
            Stage::Menu => self.pick(input, now),
            Stage::InGame(session) => self.play(session, input, now),
            Stage::GameOver { until, session } => self.show_game_over(until, session, input, now),
        };

        let after = self.stage.state();
        if after != before {
            info!("{} -> {}", before.name(), after.name());
        }
        if self.frame.take_dirty() {
            self.platform.present(&self.frame);
        }
        after
    }

    pub fn state(&self) -> SystemState {
        self.stage.state()
    }

    pub fn menu(&self) -> &Menu<'static> {
        &self.menu
    }

    pub fn high_score(&self, id: GameId) -> u32 {
        self.scores.get(id)
    }

    /// The running game, or the finished one while its overlay is up.
    pub fn session(&self) -> Option<&ActiveGameSession> {
        match &self.stage {
            Stage::InGame(session) | Stage::GameOver { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn frame(&self) -> &Framebuffer {
        &self.frame
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn boot(&mut self, started: u64, input: InputSnapshot, now: u64) -> Stage {
        let elapsed = now.saturating_sub(started);
        if elapsed < self.config.boot_ms {
            hud::boot_frame(&mut self.frame, elapsed);
            return Stage::Boot { started };
        }
        self.enter_menu(input)
    }

    fn pick(&mut self, input: InputSnapshot, now: u64) -> Stage {
        let presses = self.edges.poll(input, now, self.config.debounce_ms);
        match self.menu.handle_input(presses) {
            MenuAction::None => Stage::Menu,
            MenuAction::Moved => {
                self.menu.draw(&mut self.frame);
                Stage::Menu
            }
            MenuAction::Chosen(entry) => match entry.game() {
                Some(id) => {
                    info!("launching {}", id.title());
                    Stage::InGame(ActiveGameSession::new(id, &self.config))
                }
                None => {
                    self.sleep();
                    let input = InputSnapshot::read(&mut self.platform);
                    self.enter_menu(input)
                }
            },
        }
    }

    fn play(&mut self, mut session: ActiveGameSession, input: InputSnapshot, now: u64) -> Stage {
        let id = session.game_id();
        let mut ctx = GameContext {
            platform: &mut self.platform,
            frame: &mut self.frame,
            input,
            now,
            high_score: self.scores.get(id),
            config: &self.config,
        };

        if !session.initialized {
            session.game.start(&mut ctx);
            session.initialized = true;
            return Stage::InGame(session);
        }

        match session.game.step(&mut ctx) {
            StepOutcome::Continuing { score } => {
                session.score = score;
                Stage::InGame(session)
            }
            StepOutcome::ExitRequested => {
                info!("left {} with {}, not recorded", id.title(), session.score);
                self.edges.cool_down(input, now, self.config.exit_cooldown_ms);
                self.menu.draw(&mut self.frame);
                Stage::Menu
            }
            StepOutcome::GameOver { score } => {
                session.score = score;
                self.finish(session, now)
            }
        }
    }

    /// Records the final score and puts the overlay up.
    fn finish(&mut self, mut session: ActiveGameSession, now: u64) -> Stage {
        let id = session.game_id();
        session.game_over = true;
        self.scores.record(self.platform.storage(), id, session.score);
        hud::game_over(&mut self.frame, session.score, self.scores.get(id));
        Stage::GameOver {
            until: now + self.config.game_over_ms,
            session,
        }
    }

    fn show_game_over(&mut self, until: u64, session: ActiveGameSession, input: InputSnapshot, now: u64) -> Stage {
        if now < until {
            return Stage::GameOver { until, session };
        }
        self.enter_menu(input)
    }

    /// Back to the menu with the first entry selected. Buttons already
    /// down must be released before they count.
    fn enter_menu(&mut self, input: InputSnapshot) -> Stage {
        self.menu.reset();
        self.edges.reset(input);
        self.menu.draw(&mut self.frame);
        Stage::Menu
    }

    /// Blocking low-power round trip. Returns once woken and the wake
    /// press has been released, or the release wait timed out.
    fn sleep(&mut self) {
        info!("entering sleep");
        hud::sleeping(&mut self.frame);
        self.platform.present(&self.frame);
        self.frame.take_dirty();
        self.platform.delay_ms(self.config.sleep_notice_ms);
        self.platform.power_down();
        wait_for_release(&mut self.platform, self.config.release_timeout_ms);
        info!("woke up");
    }
}
