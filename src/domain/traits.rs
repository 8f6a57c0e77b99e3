use super::{CancelToken, ToolError};
use std::fmt::Debug;
use std::io::Write;
use std::path::Path;

/// Subprocess primitive used to drive the external build tool
pub trait ToolRunner: Send + Sync + Debug {
    /// Run the tool in `workspace` and return its captured standard output
    fn run_output(
        &self,
        workspace: &Path,
        args: &[String],
        cancel: &CancelToken,
    ) -> Result<String, ToolError>;

    /// Run the tool in `workspace`, forwarding stdout and stderr to `out` as they arrive
    fn run_streaming(
        &self,
        workspace: &Path,
        args: &[String],
        out: &mut (dyn Write + Send),
        cancel: &CancelToken,
    ) -> Result<(), ToolError>;

    /// Check if the tool can be started from `workspace`
    fn is_available(&self, workspace: &Path) -> bool;
}

/// Source of unique tags for registry images
pub trait TagGenerator: Send + Sync + Debug {
    fn generate(&self) -> String;
}
