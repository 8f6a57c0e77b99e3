mod cancel;
pub mod error;
mod image_ref;
pub mod project;
pub mod traits;

pub use cancel::CancelToken;
pub use error::{JibError, Phase, ToolError};
pub use image_ref::{local_image_ref, registry_image_ref};
pub use project::{BuildTarget, ModuleLayout, ProjectDescriptor};
pub use traits::{TagGenerator, ToolRunner};
