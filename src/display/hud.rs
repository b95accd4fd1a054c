//! Shared screens: status bars, overlays and the boot animation.

use core::fmt::Write;

use heapless::String;

use super::framebuffer::{Framebuffer, HEIGHT, PLAYFIELD_HEIGHT, STATUS_BAR_HEIGHT, WIDTH, text_width};

pub const TITLE: &str = "BLOOP";
pub const VERSION: &str = "v1.0";

const SLIDE_MS: u64 = 800;
const BLINK_END_MS: u64 = 1200;
const BLINK_PERIOD_MS: u64 = 100;

fn labelled(label: &str, value: u32) -> String<24> {
    let mut text = String::new();
    // label + ten digits always fit
    let _ = write!(text, "{}{}", label, value);
    text
}

pub fn clear_playfield(fb: &mut Framebuffer) {
    fb.fill_rect(0, STATUS_BAR_HEIGHT, WIDTH as u32, PLAYFIELD_HEIGHT as u32, false);
}

pub fn status_bar(fb: &mut Framebuffer, score: u32, high_score: u32) {
    fb.fill_rect(0, 0, WIDTH as u32, STATUS_BAR_HEIGHT as u32, false);
    fb.draw_text(0, 2, &labelled("HSC:", high_score), 1);
    fb.draw_text(50, 2, &labelled("Scr:", score), 1);
    fb.draw_text(110, 2, "BAT", 1);
}

pub fn status_bar_menu(fb: &mut Framebuffer, title: &str) {
    fb.fill_rect(0, 0, WIDTH as u32, STATUS_BAR_HEIGHT as u32, false);
    fb.draw_text(48, 2, title, 1);
    fb.draw_text(110, 2, "BAT", 1);
}

/// Bottom-row progress line for the hold-to-exit gesture.
pub fn exit_hold_bar(fb: &mut Framebuffer, progress: f32) {
    let progress = progress.clamp(0.0, 1.0);
    let width = (WIDTH as f32 * progress) as i32;
    let bottom = HEIGHT as i32 - 1;
    fb.fill_rect(0, bottom - 1, WIDTH as u32, 2, false);
    fb.draw_line(0, bottom, width, bottom, true);
}

pub fn game_over(fb: &mut Framebuffer, score: u32, high_score: u32) {
    clear_playfield(fb);
    status_bar(fb, score, high_score);
    fb.draw_text(30, STATUS_BAR_HEIGHT + 5, "Game Over", 1);
    fb.draw_text(20, STATUS_BAR_HEIGHT + 20, &labelled("Score: ", score), 1);
    fb.draw_text(20, STATUS_BAR_HEIGHT + 35, &labelled("HighScore: ", high_score), 1);
}

pub fn get_ready(fb: &mut Framebuffer, instructions: &str, high_score: u32) {
    clear_playfield(fb);
    status_bar(fb, 0, high_score);
    fb.draw_text(35, STATUS_BAR_HEIGHT + 15, "Get Ready...", 1);
    fb.draw_text(15, STATUS_BAR_HEIGHT + 30, instructions, 1);
}

pub fn sleeping(fb: &mut Framebuffer) {
    fb.clear_screen();
    fb.draw_text(20, 25, "Sleeping...", 1);
}

/// One boot animation frame. Pure in `elapsed_ms`: the title slides in,
/// blinks in the centre, then settles with the version underneath.
pub fn boot_frame(fb: &mut Framebuffer, elapsed_ms: u64) {
    fb.clear_screen();
    let title_width = text_width(TITLE, 2);
    let centre_x = (WIDTH as i32 - title_width) / 2;

    if elapsed_ms < SLIDE_MS {
        let travel = (WIDTH as i32 + title_width) as u64;
        let offset = (elapsed_ms * travel / SLIDE_MS) as i32 - title_width;
        if offset < WIDTH as i32 {
            fb.draw_text(offset, 22, TITLE, 2);
        }
    } else if elapsed_ms < BLINK_END_MS {
        if ((elapsed_ms - SLIDE_MS) / BLINK_PERIOD_MS) % 2 == 0 {
            fb.draw_text(centre_x, 22, TITLE, 2);
        }
    } else {
        fb.draw_text(centre_x, 16, TITLE, 2);
        fb.draw_text(centre_x + 12, 42, VERSION, 1);
    }
}
