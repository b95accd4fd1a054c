use bloop::display::{HEIGHT, WIDTH};
use bloop::{Button, Framebuffer, Platform};
use defmt::*;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{self, Spi};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Delay, Duration, Instant, block_for};
use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle};
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7735s;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::flash_store::FlashStore;

pub type Screen<'a> = mipidsi::Display<
    SpiInterface<'a, SpiDevice<'a, NoopRawMutex, Spi<'a, SPI1, spi::Blocking>, Output<'a>>, Output<'a>>,
    ST7735s,
    Output<'a>,
>;

/// The ST7735s is 128x160 in this orientation; the console frame sits in
/// the middle.
const PANEL_HEIGHT: i32 = 160;
const FRAME_TOP: i32 = (PANEL_HEIGHT - HEIGHT as i32) / 2;
const WAKE_POLL: Duration = Duration::from_millis(50);

pub struct PicoPlatform<'a> {
    screen: Screen<'a>,
    button_a: Input<'a>,
    button_b: Input<'a>,
    rng: SmallRng,
    store: FlashStore<'static>,
}

impl<'a> PicoPlatform<'a> {
    pub fn new(
        screen: Screen<'a>,
        button_a: Input<'a>,
        button_b: Input<'a>,
        rng: SmallRng,
        store: FlashStore<'static>,
    ) -> Self {
        PicoPlatform {
            screen,
            button_a,
            button_b,
            rng,
            store,
        }
    }

    fn any_button(&self) -> bool {
        self.button_a.is_low() || self.button_b.is_low()
    }
}

impl Platform for PicoPlatform<'_> {
    type Storage = FlashStore<'static>;

    fn button_pressed(&mut self, button: Button) -> bool {
        // pulled up, pressed pulls the line low
        match button {
            Button::A => self.button_a.is_low(),
            Button::B => self.button_b.is_low(),
        }
    }

    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(ms as u64));
    }

    fn random_int(&mut self, min_inclusive: i32, max_exclusive: i32) -> i32 {
        if max_exclusive <= min_inclusive {
            return min_inclusive;
        }
        self.rng.gen_range(min_inclusive..max_exclusive)
    }

    fn present(&mut self, frame: &Framebuffer) {
        let area = Rectangle::new(Point::new(0, FRAME_TOP), Size::new(WIDTH as u32, HEIGHT as u32));
        let colors = frame
            .colors()
            .map(|c| if c.is_on() { Rgb565::WHITE } else { Rgb565::BLACK });
        if self.screen.fill_contiguous(&area, colors).is_err() {
            warn!("frame flush failed");
        }
    }

    fn storage(&mut self) -> &mut Self::Storage {
        &mut self.store
    }

    fn power_down(&mut self) {
        if self.screen.sleep(&mut Delay).is_err() {
            warn!("panel refused to sleep");
        }
        while !self.any_button() {
            block_for(WAKE_POLL);
        }
        if self.screen.wake(&mut Delay).is_err() {
            warn!("panel refused to wake");
        }
        info!("woken by button");
    }
}
