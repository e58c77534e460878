#![forbid(unsafe_code)]

pub mod catalog;
pub mod clock;
pub mod command;
pub mod decision;
pub mod domain;
mod engine;
pub mod error;
pub mod history;
pub mod ports;
pub mod roam;
pub mod state;

pub use command::Command;
pub use engine::{EngineHandle, RoamEngine, ScanTicket, Services};
pub use error::Error;
pub use state::EngineSnapshot;
