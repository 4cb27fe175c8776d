//! Front-desk services: ticket issuance, status workflow, the now-serving
//! board, and dashboard aggregates.

mod dashboard;
mod issuance;
mod serving;
mod workflow;

pub use dashboard::*;
pub use issuance::*;
pub use serving::*;
pub use workflow::*;
