pub use self::{artifact::*, layer::*, network::*};

pub mod artifact;
pub mod layer;
pub mod network;
pub mod normalize;
