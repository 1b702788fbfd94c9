pub mod health;
pub mod runner;
pub mod shutdown;
pub mod vote_recorder;
