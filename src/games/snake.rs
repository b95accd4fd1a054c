use heapless::Deque;

use super::{GameContext, GetReady, MiniGame, StepOutcome, check_exit_hold};
use crate::config::Config;
use crate::display::{Framebuffer, PLAYFIELD_HEIGHT, STATUS_BAR_HEIGHT, WIDTH, hud};
use crate::input::{EdgeDetector, ExitHoldGesture, InputSnapshot};
use crate::platform::Platform;
use crate::scores::GameId;

const CELL: i32 = 4;
pub const GRID_WIDTH: u8 = (WIDTH as i32 / CELL) as u8;
pub const GRID_HEIGHT: u8 = (PLAYFIELD_HEIGHT / CELL) as u8;
const MAX_LENGTH: usize = 64;
const INITIAL_LENGTH: usize = 3;
const MOVE_MS: u64 = 200;
const TURN_COOLDOWN_MS: u64 = 100;
const FOOD_ATTEMPTS: u32 = 100;
const INSTRUCTIONS: &str = "A: Left, B: Right";

/// Grid cell as (column, row).
pub type Cell = (u8, u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Heading {
    Right,
    Down,
    Left,
    Up,
}

impl Heading {
    fn clockwise(self) -> Self {
        match self {
            Heading::Right => Heading::Down,
            Heading::Down => Heading::Left,
            Heading::Left => Heading::Up,
            Heading::Up => Heading::Right,
        }
    }

    fn counter_clockwise(self) -> Self {
        match self {
            Heading::Right => Heading::Up,
            Heading::Up => Heading::Left,
            Heading::Left => Heading::Down,
            Heading::Down => Heading::Right,
        }
    }

    fn ahead(self, (x, y): Cell) -> Cell {
        match self {
            Heading::Up => (x, if y > 0 { y - 1 } else { GRID_HEIGHT - 1 }),
            Heading::Down => (x, if y < GRID_HEIGHT - 1 { y + 1 } else { 0 }),
            Heading::Left => (if x > 0 { x - 1 } else { GRID_WIDTH - 1 }, y),
            Heading::Right => (if x < GRID_WIDTH - 1 { x + 1 } else { 0 }, y),
        }
    }
}

fn setval(value: u32, col: u8, set: bool) -> u32 {
    if set {
        value | (1 << col)
    } else {
        value & !(1 << col)
    }
}

fn checkval(value: u32, col: u8) -> bool {
    (value & (1 << col)) != 0
}

pub struct Snake {
    // front is the head
    body: Deque<Cell, MAX_LENGTH>,
    // one bit per cell, one word per row
    occupied: [u32; GRID_HEIGHT as usize],
    heading: Heading,
    food: Cell,
    last_move: u64,
    move_ms: u64,
    left: EdgeDetector,
    right: EdgeDetector,
    last_turn: Option<u64>,
    exit: ExitHoldGesture,
    ready: GetReady,
}

impl Snake {
    pub fn new(config: &Config) -> Self {
        Snake {
            body: Deque::new(),
            occupied: [0; GRID_HEIGHT as usize],
            heading: Heading::Right,
            food: (0, 0),
            last_move: 0,
            move_ms: config.scaled_ms(MOVE_MS),
            left: EdgeDetector::new(),
            right: EdgeDetector::new(),
            last_turn: None,
            exit: ExitHoldGesture::new(config.exit_hold_ms),
            ready: GetReady::default(),
        }
    }

    pub fn score(&self) -> u32 {
        self.body.len().saturating_sub(INITIAL_LENGTH) as u32
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn head(&self) -> Option<Cell> {
        self.body.front().copied()
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    fn is_occupied(&self, (x, y): Cell) -> bool {
        checkval(self.occupied[y as usize], x)
    }

    fn mark(&mut self, (x, y): Cell, set: bool) {
        self.occupied[y as usize] = setval(self.occupied[y as usize], x, set);
    }

    fn push_tail(&mut self, cell: Cell) {
        if self.body.push_back(cell).is_ok() {
            self.mark(cell, true);
        }
    }

    fn push_head(&mut self, cell: Cell) {
        if self.body.push_front(cell).is_ok() {
            self.mark(cell, true);
        }
    }

    fn reset<P: Platform>(&mut self, platform: &mut P, input: InputSnapshot, now: u64) {
        self.body.clear();
        self.occupied = [0; GRID_HEIGHT as usize];
        let (cx, cy) = (GRID_WIDTH / 2, GRID_HEIGHT / 2);
        for i in 0..INITIAL_LENGTH as u8 {
            self.push_tail((cx - i, cy));
        }
        self.heading = Heading::Right;
        self.place_food(platform);
        self.last_move = now;
        self.last_turn = None;
        self.left.rearm(input.a);
        self.right.rearm(input.b);
        self.exit.reset();
    }

    fn place_food<P: Platform>(&mut self, platform: &mut P) {
        for _ in 0..FOOD_ATTEMPTS {
            let x = platform.random_int(0, GRID_WIDTH as i32) as u8;
            let y = platform.random_int(0, GRID_HEIGHT as i32) as u8;
            self.food = (x, y);
            if !self.is_occupied(self.food) {
                return;
            }
        }
    }

    /// Rising edge on A turns left, on B turns right, at most once per
    /// cooldown.
    fn steer(&mut self, input: InputSnapshot, now: u64) {
        if let Some(last) = self.last_turn {
            if now.saturating_sub(last) <= TURN_COOLDOWN_MS {
                return;
            }
        }
        let left = self.left.update(input.a, now, 0);
        let right = self.right.update(input.b, now, 0);
        if left {
            self.heading = self.heading.counter_clockwise();
            self.last_turn = Some(now);
        } else if right {
            self.heading = self.heading.clockwise();
            self.last_turn = Some(now);
        }
    }

    /// Moves one cell. Returns false when the head runs into the body.
    fn advance<P: Platform>(&mut self, platform: &mut P) -> bool {
        let Some(head) = self.head() else {
            return false;
        };
        let next = self.heading.ahead(head);
        let tail = self.body.back().copied();
        // the tail moves out of the way this turn
        if self.is_occupied(next) && Some(next) != tail {
            debug!("snake hit itself at ({}, {})", next.0, next.1);
            return false;
        }

        let eating = next == self.food;
        let grows = eating && !self.body.is_full();
        if !grows {
            if let Some(old) = self.body.pop_back() {
                self.mark(old, false);
            }
        }
        self.push_head(next);
        if eating {
            self.place_food(platform);
        }
        true
    }

    /// Replace the body, head first, and park the food in the corner.
    #[cfg(test)]
    pub(crate) fn shape(&mut self, cells: &[Cell], heading: Heading) {
        self.body.clear();
        self.occupied = [0; GRID_HEIGHT as usize];
        for &cell in cells {
            self.push_tail(cell);
        }
        self.heading = heading;
        self.food = (0, 0);
    }

    fn draw(&self, frame: &mut Framebuffer, score: u32, high_score: u32) {
        hud::clear_playfield(frame);
        hud::status_bar(frame, score, high_score);
        for &(x, y) in self.body.iter() {
            frame.fill_rect(x as i32 * CELL, y as i32 * CELL + STATUS_BAR_HEIGHT, CELL as u32, CELL as u32, true);
        }
        let (fx, fy) = self.food;
        frame.fill_rect(fx as i32 * CELL, fy as i32 * CELL + STATUS_BAR_HEIGHT, CELL as u32, CELL as u32, true);
    }
}

impl MiniGame for Snake {
    fn id(&self) -> GameId {
        GameId::Snake
    }

    fn start<P: Platform>(&mut self, ctx: &mut GameContext<'_, P>) {
        self.reset(ctx.platform, ctx.input, ctx.now);
        hud::get_ready(ctx.frame, INSTRUCTIONS, ctx.high_score);
        self.ready.begin(ctx.now, ctx.config.get_ready_ms);
        info!("snake started");
    }

    fn step<P: Platform>(&mut self, ctx: &mut GameContext<'_, P>) -> StepOutcome {
        if self.ready.holding(ctx.frame, ctx.now) {
            return StepOutcome::Continuing { score: 0 };
        }

        let score = self.score();
        if let Some(outcome) = check_exit_hold(&mut self.exit, ctx, score) {
            self.left.rearm(ctx.input.a);
            self.right.rearm(ctx.input.b);
            return outcome;
        }

        self.steer(ctx.input, ctx.now);

        if ctx.now.saturating_sub(self.last_move) > self.move_ms {
            if !self.advance(ctx.platform) {
                info!("snake over with {}", self.score());
                return StepOutcome::GameOver { score: self.score() };
            }
            self.last_move = ctx.now;
        }

        let score = self.score();
        self.draw(ctx.frame, score, ctx.high_score);
        StepOutcome::Continuing { score }
    }
}
