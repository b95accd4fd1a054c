use crate::display::{Framebuffer, STATUS_BAR_HEIGHT, hud};
use crate::input::Presses;
use crate::scores::GameId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuEntry {
    Snake,
    Pong,
    Sleep,
}

impl MenuEntry {
    pub const ALL: [MenuEntry; 3] = [MenuEntry::Snake, MenuEntry::Pong, MenuEntry::Sleep];

    pub const fn label(self) -> &'static str {
        match self {
            MenuEntry::Snake => "1.Snake",
            MenuEntry::Pong => "2.Pong",
            MenuEntry::Sleep => "3.Sleep",
        }
    }

    /// The game this entry launches, if it launches one.
    pub const fn game(self) -> Option<GameId> {
        match self {
            MenuEntry::Snake => Some(GameId::Snake),
            MenuEntry::Pong => Some(GameId::Pong),
            MenuEntry::Sleep => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    None,
    Moved,
    Chosen(MenuEntry),
}

pub struct Menu<'a> {
    title: &'a str,
    entries: &'a [MenuEntry],
    selected: usize,
}

impl<'a> Menu<'a> {
    pub const fn init(title: &'a str, entries: &'a [MenuEntry]) -> Menu<'a> {
        Menu {
            title,
            entries,
            selected: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> MenuEntry {
        self.entries[self.selected]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        } else {
            self.selected = 0;
        }
    }

    pub fn previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.entries.len().saturating_sub(1);
        }
    }

    pub fn reset(&mut self) {
        self.selected = 0;
    }

    pub fn draw(&self, fb: &mut Framebuffer) {
        fb.clear_screen();
        hud::status_bar_menu(fb, self.title);
        for (i, entry) in self.entries.iter().enumerate() {
            let y = STATUS_BAR_HEIGHT + 5 + i as i32 * 10;
            if i == self.selected {
                fb.draw_text(0, y, "> ", 1);
            }
            fb.draw_text(12, y, entry.label(), 1);
        }
    }

    /// B steps to the next entry, A chooses the current one. A step wins
    /// when both arrive in the same frame.
    pub fn handle_input(&mut self, presses: Presses) -> MenuAction {
        if presses.b {
            self.next();
            debug!("menu at {}", self.selected_entry().label());
            return MenuAction::Moved;
        }
        if presses.a {
            info!("selected {}", self.selected_entry().label());
            return MenuAction::Chosen(self.selected_entry());
        }
        MenuAction::None
    }
}
