//! Domain types: messages, project records, and error taxonomy

pub mod error;
pub mod messages;
pub mod project;

pub use error::GatewayError;
pub use messages::{ChatMessage, GenerationRequest, Role};
pub use project::{Commit, CouncilVerdict, Project, ProjectFile};
