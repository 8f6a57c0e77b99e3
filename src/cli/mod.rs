pub mod doctor;
pub mod logging;
pub mod session;

pub use session::{ArtifactRequest, BuildSession};
