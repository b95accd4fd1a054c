//! High scores in the last flash sector.
//!
//! Layout: two magic bytes, then one little-endian `i32` per game. A
//! sector without the magic reads as empty.

use bloop::KeyValueStore;
use defmt::*;
use embassy_rp::flash::{Blocking, ERASE_SIZE, Flash};
use embassy_rp::peripherals::FLASH;

pub const FLASH_SIZE: usize = 4 * 1024 * 1024;

const SECTOR: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;
const MAGIC: [u8; 2] = [0xB7, 0x10];
const RECORD_LEN: usize = 10;
const PAGE_LEN: usize = 256;

fn slot(key: &str) -> Option<usize> {
    match key {
        "hs_snake" => Some(2),
        "hs_pong" => Some(6),
        _ => None,
    }
}

pub struct FlashStore<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    record: Option<[u8; RECORD_LEN]>,
}

impl<'d> FlashStore<'d> {
    pub fn new(flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>) -> Self {
        FlashStore { flash, record: None }
    }

    /// The stored record, read once and cached. `None` if the sector was
    /// never written or cannot be read.
    fn record(&mut self) -> Option<[u8; RECORD_LEN]> {
        if self.record.is_none() {
            let mut buf = [0u8; RECORD_LEN];
            match self.flash.blocking_read(SECTOR, &mut buf) {
                Ok(()) if buf[..2] == MAGIC => self.record = Some(buf),
                Ok(()) => debug!("score sector blank"),
                Err(e) => warn!("score sector read failed: {}", e),
            }
        }
        self.record
    }

    fn persist(&mut self, record: [u8; RECORD_LEN]) -> bool {
        let mut page = [0xFFu8; PAGE_LEN];
        page[..RECORD_LEN].copy_from_slice(&record);
        if let Err(e) = self.flash.blocking_erase(SECTOR, SECTOR + ERASE_SIZE as u32) {
            warn!("score sector erase failed: {}", e);
            return false;
        }
        if let Err(e) = self.flash.blocking_write(SECTOR, &page) {
            warn!("score sector write failed: {}", e);
            return false;
        }
        true
    }
}

impl KeyValueStore for FlashStore<'_> {
    fn get(&mut self, key: &str) -> Option<i32> {
        let at = slot(key)?;
        let record = self.record()?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&record[at..at + 4]);
        Some(i32::from_le_bytes(bytes))
    }

    fn set(&mut self, key: &str, value: i32) {
        let Some(at) = slot(key) else {
            warn!("no flash slot for {}", key);
            return;
        };
        let mut record = self.record().unwrap_or_else(|| {
            let mut fresh = [0u8; RECORD_LEN];
            fresh[..2].copy_from_slice(&MAGIC);
            fresh
        });
        record[at..at + 4].copy_from_slice(&value.to_le_bytes());
        if self.persist(record) {
            self.record = Some(record);
        }
    }
}
