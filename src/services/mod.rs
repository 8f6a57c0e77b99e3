pub mod args;
mod executor;
mod jib_maven;
mod preflight;

pub use executor::run_maven;
pub use jib_maven::{BuildPlan, JibMavenBuilder};
pub use preflight::{ensure_single_package_goal, parse_package_goals};
