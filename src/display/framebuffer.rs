//! 1-bpp framebuffer the whole console draws into.
//!
//! Targets flush it to real glass in `Platform::present`; everything else
//! only ever touches this buffer, so drawing cannot fail.

use core::convert::Infallible;

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_5X7, FONT_10X20},
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PointsIter, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
pub const STATUS_BAR_HEIGHT: i32 = 16;
pub const PLAYFIELD_HEIGHT: i32 = HEIGHT as i32 - STATUS_BAR_HEIGHT;

const BYTES: usize = WIDTH * HEIGHT / 8;

fn color(on: bool) -> BinaryColor {
    if on { BinaryColor::On } else { BinaryColor::Off }
}

/// Horizontal advance of `text` at the given scale.
pub fn text_width(text: &str, scale: u32) -> i32 {
    let advance = if scale >= 2 { 10 } else { 6 };
    text.chars().count() as i32 * advance
}

#[derive(Clone)]
pub struct Framebuffer {
    bits: [u8; BYTES],
    dirty: bool,
}

impl Framebuffer {
    pub const fn new() -> Self {
        Framebuffer {
            bits: [0; BYTES],
            dirty: false,
        }
    }

    pub fn clear_screen(&mut self) {
        self.bits = [0; BYTES];
        self.dirty = true;
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return;
        }
        let index = y as usize * WIDTH + x as usize;
        if on {
            self.bits[index >> 3] |= 1 << (index & 7);
        } else {
            self.bits[index >> 3] &= !(1 << (index & 7));
        }
        self.dirty = true;
    }

    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return false;
        }
        let index = y as usize * WIDTH + x as usize;
        self.bits[index >> 3] & (1 << (index & 7)) != 0
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, on: bool) {
        let Ok(()) = Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(PrimitiveStyle::with_fill(color(on)))
            .draw(self);
    }

    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, on: bool) {
        let Ok(()) = Line::new(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(PrimitiveStyle::with_stroke(color(on), 1))
            .draw(self);
    }

    /// Text anchored at its top-left corner. Scale 1 is the 5x7 font,
    /// anything larger switches to 10x20.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: u32) {
        let font = if scale >= 2 { &FONT_10X20 } else { &FONT_5X7 };
        let style = MonoTextStyle::new(font, BinaryColor::On);
        let Ok(_) = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(self);
    }

    /// Number of lit pixels inside `area`.
    pub fn count_lit(&self, area: Rectangle) -> usize {
        area.points().filter(|p| self.pixel(p.x, p.y)).count()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether anything was drawn since the last call.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }

    /// Row-major pixel colours, ready for `DrawTarget::fill_contiguous`.
    pub fn colors(&self) -> impl Iterator<Item = BinaryColor> + '_ {
        (0..HEIGHT as i32).flat_map(move |y| (0..WIDTH as i32).map(move |x| color(self.pixel(x, y))))
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, c) in pixels {
            self.set_pixel(point.x, point.y, c.is_on());
        }
        Ok(())
    }
}
