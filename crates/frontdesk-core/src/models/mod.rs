//! Domain models for the front-desk system.

mod department;
mod patient;
mod staff;
mod ticket;

pub use department::*;
pub use patient::*;
pub use staff::*;
pub use ticket::*;
