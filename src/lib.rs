pub mod cli;
pub mod domain;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{
    BuildTarget, CancelToken, JibError, ModuleLayout, Phase, ProjectDescriptor, TagGenerator,
    ToolError, ToolRunner,
};
pub use infra::{MavenRunner, RandomTagGenerator};
pub use services::{BuildPlan, JibMavenBuilder};
