use crate::domain::{CancelToken, TagGenerator, ToolError, ToolRunner};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::thread;
use std::time::Duration;

/// Scripted ToolRunner that records every invocation.
///
/// Commands are recorded as `output:<args>` for captured runs and
/// `streaming:<args>` for build runs.
#[derive(Debug)]
pub struct MockRunner {
    commands: RwLock<Vec<String>>,
    workspaces: RwLock<Vec<PathBuf>>,
    query_output: RwLock<String>,
    build_output: RwLock<String>,
    fail_on: RwLock<Option<String>>,
    hang_on: RwLock<Option<String>>,
    available: RwLock<bool>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(Vec::new()),
            workspaces: RwLock::new(Vec::new()),
            query_output: RwLock::new(String::new()),
            build_output: RwLock::new(String::new()),
            fail_on: RwLock::new(None),
            hang_on: RwLock::new(None),
            available: RwLock::new(true),
        }
    }

    /// Stdout returned by `run_output`
    pub fn set_query_output(&self, output: &str) {
        *self.query_output.write().unwrap() = output.to_string();
    }

    /// Bytes written to the sink by `run_streaming`
    pub fn set_build_output(&self, output: &str) {
        *self.build_output.write().unwrap() = output.to_string();
    }

    /// Makes `output` or `streaming` runs exit with status 1
    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    /// Makes `output` or `streaming` runs block until canceled
    pub fn set_hang_on(&self, operation: &str) {
        *self.hang_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn set_available(&self, available: bool) {
        *self.available.write().unwrap() = available;
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    pub fn get_workspaces(&self) -> Vec<PathBuf> {
        self.workspaces.read().unwrap().clone()
    }

    fn record_command(&self, operation: &str, workspace: &Path, args: &[String]) {
        self.commands
            .write()
            .unwrap()
            .push(format!("{}:{}", operation, args.join(" ")));
        self.workspaces
            .write()
            .unwrap()
            .push(workspace.to_path_buf());
    }

    fn check_fail(&self, operation: &str) -> Result<(), ToolError> {
        if self.fail_on.read().unwrap().as_deref() == Some(operation) {
            return Err(ToolError::Exit {
                program: "mvn".to_string(),
                code: Some(1),
                stderr: format!("Mock failure on: {}", operation),
            });
        }
        Ok(())
    }

    fn check_hang(&self, operation: &str, cancel: &CancelToken) -> Result<(), ToolError> {
        if self.hang_on.read().unwrap().as_deref() != Some(operation) {
            return Ok(());
        }

        while !cancel.is_canceled() {
            thread::sleep(Duration::from_millis(5));
        }

        Err(ToolError::Canceled {
            program: "mvn".to_string(),
        })
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRunner for MockRunner {
    fn run_output(
        &self,
        workspace: &Path,
        args: &[String],
        cancel: &CancelToken,
    ) -> Result<String, ToolError> {
        self.record_command("output", workspace, args);
        self.check_fail("output")?;
        self.check_hang("output", cancel)?;

        Ok(self.query_output.read().unwrap().clone())
    }

    fn run_streaming(
        &self,
        workspace: &Path,
        args: &[String],
        out: &mut (dyn Write + Send),
        cancel: &CancelToken,
    ) -> Result<(), ToolError> {
        self.record_command("streaming", workspace, args);
        self.check_fail("streaming")?;
        self.check_hang("streaming", cancel)?;

        out.write_all(self.build_output.read().unwrap().as_bytes())
            .map_err(|source| ToolError::Io {
                program: "mvn".to_string(),
                source,
            })
    }

    fn is_available(&self, _workspace: &Path) -> bool {
        *self.available.read().unwrap()
    }
}

/// TagGenerator that always returns the same tag
#[derive(Debug, Clone)]
pub struct FixedTagGenerator {
    tag: String,
}

impl FixedTagGenerator {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
        }
    }
}

impl TagGenerator for FixedTagGenerator {
    fn generate(&self) -> String {
        self.tag.clone()
    }
}
