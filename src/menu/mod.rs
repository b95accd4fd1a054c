pub mod selector;

pub use selector::{Menu, MenuAction, MenuEntry};
