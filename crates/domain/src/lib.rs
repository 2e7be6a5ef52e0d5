#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod accumulator;
pub mod error;
pub mod lap;
pub mod ledger;
pub mod snapshot;

pub use accumulator::*;
pub use error::*;
pub use lap::*;
pub use ledger::*;
pub use snapshot::*;
