use super::{GameContext, GetReady, MiniGame, StepOutcome, check_exit_hold};
use crate::config::Config;
use crate::display::{Framebuffer, HEIGHT, STATUS_BAR_HEIGHT, WIDTH, hud};
use crate::input::{ExitHoldGesture, InputSnapshot};
use crate::platform::Platform;
use crate::scores::GameId;

const PADDLE_WIDTH: i32 = 2;
const PADDLE_HEIGHT: i32 = 10;
const PADDLE_OFFSET: i32 = 3;
const PADDLE_SPEED: i32 = 3;
const BALL_SIZE: i32 = 2;
const TICK_MS: u64 = 25;
const INPUT_COOLDOWN_MS: u64 = 50;
const INSTRUCTIONS: &str = "A: Up, B: Down";

const TOP: i32 = STATUS_BAR_HEIGHT;
const BOTTOM: i32 = HEIGHT as i32;
const RIGHT: i32 = WIDTH as i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Paddle {
    pub x: i32,
    pub y: i32,
}

impl Paddle {
    fn centred(x: i32) -> Self {
        Paddle {
            x,
            y: TOP + (BOTTOM - TOP - PADDLE_HEIGHT) / 2,
        }
    }

    fn covers(&self, ball: &Ball) -> bool {
        ball.y + BALL_SIZE >= self.y && ball.y <= self.y + PADDLE_HEIGHT
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ball {
    pub x: i32,
    pub y: i32,
    pub vx: i32,
    pub vy: i32,
}

pub struct Pong {
    player: Paddle,
    cpu: Paddle,
    ball: Ball,
    score: u32,
    served: bool,
    last_tick: u64,
    tick_ms: u64,
    paddle_speed: i32,
    last_input: Option<u64>,
    exit: ExitHoldGesture,
    ready: GetReady,
}

impl Pong {
    pub fn new(config: &Config) -> Self {
        let slowdown = config.speed_percent.max(1) as i32;
        Pong {
            player: Paddle::centred(RIGHT - PADDLE_OFFSET - PADDLE_WIDTH),
            cpu: Paddle::centred(PADDLE_OFFSET),
            ball: Self::centre_ball(),
            score: 0,
            served: false,
            last_tick: 0,
            tick_ms: config.scaled_ms(TICK_MS),
            paddle_speed: (PADDLE_SPEED * 100 / slowdown).max(1),
            last_input: None,
            exit: ExitHoldGesture::new(config.exit_hold_ms),
            ready: GetReady::default(),
        }
    }

    fn centre_ball() -> Ball {
        Ball {
            x: RIGHT / 2 - BALL_SIZE / 2,
            y: TOP + (BOTTOM - TOP) / 2 - BALL_SIZE / 2,
            vx: 0,
            vy: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn player(&self) -> Paddle {
        self.player
    }

    pub fn cpu(&self) -> Paddle {
        self.cpu
    }

    pub fn ball(&self) -> Ball {
        self.ball
    }

    pub fn is_served(&self) -> bool {
        self.served
    }

    fn reset(&mut self, now: u64) {
        self.player = Paddle::centred(RIGHT - PADDLE_OFFSET - PADDLE_WIDTH);
        self.cpu = Paddle::centred(PADDLE_OFFSET);
        self.ball = Self::centre_ball();
        self.score = 0;
        self.served = false;
        self.last_tick = now;
        self.last_input = None;
        self.exit.reset();
    }

    /// The ball stays put until the player first moves, then heads for
    /// the CPU side at a random vertical angle.
    fn serve<P: Platform>(&mut self, platform: &mut P) {
        self.ball.vx = -1;
        self.ball.vy = if platform.random_int(0, 2) == 0 { 1 } else { -1 };
        self.served = true;
        debug!("serve vy={}", self.ball.vy);
    }

    fn steer<P: Platform>(&mut self, platform: &mut P, input: InputSnapshot, now: u64) {
        if let Some(last) = self.last_input {
            if now.saturating_sub(last) <= INPUT_COOLDOWN_MS {
                return;
            }
        }
        let mut moved = false;
        if input.a && self.player.y > TOP + 2 {
            self.player.y -= self.paddle_speed;
            moved = true;
        }
        if input.b && self.player.y < BOTTOM - PADDLE_HEIGHT - 2 {
            self.player.y += self.paddle_speed;
            moved = true;
        }
        if moved {
            self.last_input = Some(now);
            if !self.served {
                self.serve(platform);
            }
        }
    }

    fn track_ball(&mut self) {
        if !self.served {
            return;
        }
        let ball_centre = self.ball.y + BALL_SIZE / 2;
        let paddle_centre = self.cpu.y + PADDLE_HEIGHT / 2;
        let speed = self.ball.vx.abs().max(1);
        if ball_centre < paddle_centre {
            self.cpu.y -= speed;
        } else if ball_centre > paddle_centre {
            self.cpu.y += speed;
        }
        self.cpu.y = self.cpu.y.clamp(TOP, BOTTOM - PADDLE_HEIGHT);
    }

    /// One physics tick. Returns false once the ball leaves the court.
    fn move_ball(&mut self) -> bool {
        if !self.served {
            return true;
        }
        let ball = &mut self.ball;
        ball.x += ball.vx;
        ball.y += ball.vy;

        if ball.y <= TOP || ball.y >= BOTTOM - BALL_SIZE {
            ball.vy = -ball.vy;
        }

        if ball.x <= self.cpu.x + PADDLE_WIDTH && self.cpu.covers(ball) {
            ball.x = self.cpu.x + PADDLE_WIDTH;
            ball.vx = -ball.vx;
        }

        if ball.x + BALL_SIZE >= self.player.x && self.player.covers(ball) {
            ball.x = self.player.x - BALL_SIZE;
            ball.vx = -ball.vx;
            self.score += 1;
        }

        !(ball.x > RIGHT || ball.x < 0)
    }

    fn draw(&self, frame: &mut Framebuffer, high_score: u32) {
        hud::clear_playfield(frame);
        hud::status_bar(frame, self.score, high_score);

        // two on, two off
        for x in (0..RIGHT).step_by(4) {
            frame.draw_line(x, TOP, x + 1, TOP, true);
            frame.draw_line(x, BOTTOM - 1, x + 1, BOTTOM - 1, true);
        }
        for y in (TOP..BOTTOM).step_by(4) {
            frame.draw_line(0, y, 0, y + 1, true);
            frame.draw_line(RIGHT - 1, y, RIGHT - 1, y + 1, true);
            frame.draw_line(RIGHT / 2, y, RIGHT / 2, y, true);
        }
        for paddle in [self.cpu, self.player] {
            frame.fill_rect(paddle.x, paddle.y, PADDLE_WIDTH as u32, PADDLE_HEIGHT as u32, true);
        }
        frame.fill_rect(self.ball.x, self.ball.y, BALL_SIZE as u32, BALL_SIZE as u32, true);
    }
}

impl MiniGame for Pong {
    fn id(&self) -> GameId {
        GameId::Pong
    }

    fn start<P: Platform>(&mut self, ctx: &mut GameContext<'_, P>) {
        self.reset(ctx.now);
        hud::get_ready(ctx.frame, INSTRUCTIONS, ctx.high_score);
        self.ready.begin(ctx.now, ctx.config.get_ready_ms);
        info!("pong started");
    }

    fn step<P: Platform>(&mut self, ctx: &mut GameContext<'_, P>) -> StepOutcome {
        if self.ready.holding(ctx.frame, ctx.now) {
            return StepOutcome::Continuing { score: 0 };
        }

        if let Some(outcome) = check_exit_hold(&mut self.exit, ctx, self.score) {
            return outcome;
        }

        self.steer(ctx.platform, ctx.input, ctx.now);

        if ctx.now.saturating_sub(self.last_tick) >= self.tick_ms {
            self.track_ball();
            if !self.move_ball() {
                info!("pong over with {}", self.score);
                return StepOutcome::GameOver { score: self.score };
            }
            self.last_tick = ctx.now;
        }

        self.draw(ctx.frame, ctx.high_score);
        StepOutcome::Continuing { score: self.score }
    }
}
