pub use self::{evolver::*, population::*, stats::*, trainer::*};

pub mod evolver;
pub mod population;
pub mod stats;
pub mod trainer;
