//! Application layer: the council pipeline and the batch run around it

pub mod chronicle;
pub mod council;

pub use chronicle::{ChronicleOptions, ChronicleReport, ChronicleRun};
pub use council::{Council, CouncilConfig};
