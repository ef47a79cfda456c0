mod action;
mod clip;
mod mixer;

pub use action::*;
pub use clip::*;
pub use mixer::*;
