#![forbid(unsafe_code)]

pub mod canon;
pub mod cli;
pub mod crawler;
pub mod engine;
pub mod extract;
pub mod logging;
pub mod queue;
pub mod sink;
pub mod state;
pub mod worker;
