use crate::domain::{CancelToken, JibError, Phase, ToolRunner};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Runs the Maven build, streaming its output to `out`.
pub fn run_maven(
    runner: &dyn ToolRunner,
    workspace: &Path,
    args: &[String],
    out: &mut (dyn Write + Send),
    cancel: &CancelToken,
) -> Result<(), JibError> {
    info!(" Construindo {:?}: {}", workspace, args.join(" "));

    runner
        .run_streaming(workspace, args, out, cancel)
        .map_err(|e| JibError::from_tool(Phase::Build, e))
}
