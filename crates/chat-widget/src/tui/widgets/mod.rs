// TUI widget modules for each screen zone.

pub mod input_box;
pub mod status_bar;
pub mod thread;
