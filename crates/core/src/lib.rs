#![forbid(unsafe_code)]

pub mod filter;
pub mod model;
pub mod parser;
pub mod progress;
pub mod time;

pub use time::Clock;
