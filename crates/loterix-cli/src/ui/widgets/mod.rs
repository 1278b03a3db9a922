pub use self::{board_display::BoardDisplay, log_display::LogDisplay, player_table::PlayerTable};

mod board_display;
mod log_display;
mod player_table;
