pub mod poll;
pub mod vote;

pub use poll::*;
pub use vote::*;
