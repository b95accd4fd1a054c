pub mod framebuffer;
pub mod hud;

pub use framebuffer::{Framebuffer, HEIGHT, PLAYFIELD_HEIGHT, STATUS_BAR_HEIGHT, WIDTH, text_width};
