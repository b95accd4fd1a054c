#![no_std]
#![no_main]

use core::cell::RefCell;

use bloop::{Config, GameManager};
use defmt::*;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::clocks::RoscRng;
use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{self, Spi};
use embassy_sync::blocking_mutex::{Mutex, raw::NoopRawMutex};
use embassy_time::{Delay, Duration, Ticker};
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7735s;
use mipidsi::options::Orientation;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

mod board;
mod flash_store;

use board::PicoPlatform;
use flash_store::{FLASH_SIZE, FlashStore};

#[unsafe(link_section = ".start_block")]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

type SpiBus = Mutex<NoopRawMutex, RefCell<Spi<'static, SPI1, spi::Blocking>>>;

static SPI_BUS: StaticCell<SpiBus> = StaticCell::new();
static DISPLAY_BUF: StaticCell<[u8; 512]> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let mut screen_config = spi::Config::default();
    screen_config.frequency = 32_000_000u32;
    screen_config.phase = spi::Phase::CaptureOnSecondTransition;
    screen_config.polarity = spi::Polarity::IdleHigh;

    let miso = p.PIN_12;
    let mosi = p.PIN_11;
    let clk = p.PIN_10;

    let screen_rst = Output::new(p.PIN_14, Level::Low);
    let screen_dc = Output::new(p.PIN_15, Level::Low);
    let screen_cs = Output::new(p.PIN_13, Level::High);

    let spi = Spi::new_blocking(p.SPI1, clk, mosi, miso, screen_config);
    let spi_bus = SPI_BUS.init(Mutex::new(RefCell::new(spi)));
    let display_spi = SpiDevice::new(spi_bus, screen_cs);
    let di = SpiInterface::new(display_spi, screen_dc, DISPLAY_BUF.init([0; 512]));
    let screen = match mipidsi::Builder::new(ST7735s, di)
        .reset_pin(screen_rst)
        .orientation(Orientation::new())
        .init(&mut Delay)
    {
        Ok(screen) => screen,
        Err(_) => panic!("display init failed"),
    };

    let button_a = Input::new(p.PIN_5, Pull::Up);
    let button_b = Input::new(p.PIN_6, Pull::Up);

    let flash = Flash::<_, Blocking, FLASH_SIZE>::new_blocking(p.FLASH);
    let rng = SmallRng::seed_from_u64(RoscRng.next_u64());

    let platform = PicoPlatform::new(screen, button_a, button_b, rng, FlashStore::new(flash));
    let config = Config::new();
    let mut manager = match GameManager::new(platform, config) {
        Ok(manager) => manager,
        Err(e) => panic!("rejected config: {}", e),
    };
    info!("console up, {} ms frames", config.frame_ms);

    let mut ticker = Ticker::every(Duration::from_millis(config.frame_ms));
    loop {
        manager.tick();
        ticker.next().await;
    }
}
