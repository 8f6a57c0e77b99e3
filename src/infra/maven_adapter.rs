use crate::domain::{CancelToken, ToolError, ToolRunner};
use crate::infra::config::MavenConfig;
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_EXECUTABLE: &str = "mvn";
pub const DEFAULT_WRAPPER: &str = "mvnw";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs Maven, preferring the project's wrapper script when present
#[derive(Debug, Clone)]
pub struct MavenRunner {
    executable: String,
    wrapper: Option<String>,
}

impl MavenRunner {
    pub fn new() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            wrapper: Some(DEFAULT_WRAPPER.to_string()),
        }
    }

    /// Runner for an arbitrary executable, without wrapper lookup
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            wrapper: None,
        }
    }

    pub fn from_config(config: &MavenConfig) -> Self {
        let executable = config
            .executable
            .clone()
            .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string());
        let wrapper = if config.skip_wrapper.unwrap_or(false) {
            None
        } else {
            Some(
                config
                    .wrapper
                    .clone()
                    .unwrap_or_else(|| DEFAULT_WRAPPER.to_string()),
            )
        };

        Self {
            executable,
            wrapper,
        }
    }

    /// Program that will be started for `workspace`
    pub fn program(&self, workspace: &Path) -> PathBuf {
        if let Some(wrapper) = &self.wrapper {
            let script = workspace.join(wrapper_file_name(wrapper));
            if script.is_file() {
                return fs::canonicalize(&script).unwrap_or(script);
            }
        }

        PathBuf::from(&self.executable)
    }

    fn spawn(
        &self,
        workspace: &Path,
        args: &[String],
        cancel: &CancelToken,
    ) -> Result<(ChildGuard, String), ToolError> {
        let program = self.program(workspace);
        let name = program.to_string_lossy().into_owned();

        if cancel.is_canceled() {
            return Err(ToolError::Canceled { program: name });
        }

        debug!("Executando {} {:?} em {:?}", name, args, workspace);

        let child = Command::new(&program)
            .args(args)
            .current_dir(workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: name.clone(),
                source,
            })?;

        Ok((ChildGuard::new(child), name))
    }
}

impl Default for MavenRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRunner for MavenRunner {
    fn run_output(
        &self,
        workspace: &Path,
        args: &[String],
        cancel: &CancelToken,
    ) -> Result<String, ToolError> {
        let (mut child, program) = self.spawn(workspace, args, cancel)?;
        let (stdout, stderr) = child.take_pipes();

        let (waited, stdout, stderr) = thread::scope(|s| {
            let stdout = s.spawn(move || read_all(stdout));
            let stderr = s.spawn(move || read_all(stderr));
            let waited = child.wait_or_cancel(cancel);
            (waited, join_reader(stdout), join_reader(stderr))
        });

        let status = match waited.map_err(|source| io_error(&program, source))? {
            Waited::Exited(status) => status,
            Waited::Canceled => return Err(ToolError::Canceled { program }),
        };

        let stderr = stderr.map_err(|source| io_error(&program, source))?;
        if !status.success() {
            return Err(ToolError::Exit {
                program,
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }

        let stdout = stdout.map_err(|source| io_error(&program, source))?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn run_streaming(
        &self,
        workspace: &Path,
        args: &[String],
        out: &mut (dyn Write + Send),
        cancel: &CancelToken,
    ) -> Result<(), ToolError> {
        let (mut child, program) = self.spawn(workspace, args, cancel)?;
        let (stdout, stderr) = child.take_pipes();
        let sink = Mutex::new(out);

        let (waited, forwarded_out, forwarded_err) = thread::scope(|s| {
            let sink = &sink;
            let stdout = s.spawn(move || forward_lines(stdout, sink));
            let stderr = s.spawn(move || forward_lines(stderr, sink));
            let waited = child.wait_or_cancel(cancel);
            (waited, join_reader(stdout), join_reader(stderr))
        });

        let status = match waited.map_err(|source| io_error(&program, source))? {
            Waited::Exited(status) => status,
            Waited::Canceled => return Err(ToolError::Canceled { program }),
        };

        if !status.success() {
            return Err(ToolError::Exit {
                program,
                code: status.code(),
                stderr: String::new(),
            });
        }

        forwarded_out
            .and(forwarded_err)
            .map_err(|source| io_error(&program, source))
    }

    fn is_available(&self, workspace: &Path) -> bool {
        Command::new(self.program(workspace))
            .arg("--version")
            .current_dir(workspace)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

enum Waited {
    Exited(ExitStatus),
    Canceled,
}

/// Owns the child for one invocation and reaps it on every exit path.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn take_pipes(&mut self) -> (Option<ChildStdout>, Option<ChildStderr>) {
        (self.child.stdout.take(), self.child.stderr.take())
    }

    fn wait_or_cancel(&mut self, cancel: &CancelToken) -> io::Result<Waited> {
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    self.reaped = true;
                    return Ok(Waited::Exited(status));
                }
                Ok(None) => {}
                Err(err) => {
                    // readers only finish once the pipes close
                    self.terminate();
                    return Err(err);
                }
            }

            if cancel.is_canceled() {
                warn!(
                    "Cancelando processo {} ({})",
                    self.child.id(),
                    if cancel.timed_out() { "timeout" } else { "cancelado" }
                );
                self.terminate();
                return Ok(Waited::Canceled);
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    fn terminate(&mut self) {
        // kill fails if the process already exited; wait still reaps it
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            self.terminate();
        }
    }
}

fn read_all(reader: Option<impl Read>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf)?;
    }
    Ok(buf)
}

fn forward_lines(reader: Option<impl Read>, sink: &Mutex<&mut (dyn Write + Send)>) -> io::Result<()> {
    let Some(reader) = reader else {
        return Ok(());
    };

    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }

        let mut out = sink
            .lock()
            .map_err(|_| io::Error::other("output sink lock poisoned"))?;
        out.write_all(&line)?;
        out.flush()?;
    }
}

fn join_reader<T>(handle: thread::ScopedJoinHandle<'_, io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("output reader thread panicked")))
}

fn io_error(program: &str, source: io::Error) -> ToolError {
    ToolError::Io {
        program: program.to_string(),
        source,
    }
}

fn wrapper_file_name(wrapper: &str) -> String {
    if cfg!(windows) {
        format!("{wrapper}.cmd")
    } else {
        wrapper.to_string()
    }
}
