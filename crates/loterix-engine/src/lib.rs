pub use self::{ball_set::*, draw::*, log::*, player::*, reward::*, session::*};

pub mod ball_set;
pub mod draw;
pub mod log;
pub mod player;
pub mod reward;
pub mod session;
