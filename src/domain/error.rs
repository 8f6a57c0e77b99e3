use std::fmt;
use std::io;
use thiserror::Error;

/// Which Maven invocation an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Read-only `jib:_skaffold-package-goals` query
    Query,
    /// The image build itself
    Build,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "jib package goal query"),
            Self::Build => write!(f, "maven build"),
        }
    }
}

/// Failures of the subprocess primitive
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} {}{}", describe_exit(.code), stderr_suffix(.stderr))]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} was canceled")]
    Canceled { program: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{stderr}")
    }
}

/// Errors returned by a Jib Maven build invocation
#[derive(Debug, Error)]
pub enum JibError {
    #[error("maven multi-modules not supported yet: module '{module}' cannot be built to a registry")]
    UnsupportedConfiguration { module: String },

    #[error("module '{module}' requires a single bound package goal, found {found}")]
    PreconditionViolation {
        module: String,
        found: usize,
        goals: Vec<String>,
    },

    #[error("{phase} failed: {source}")]
    ToolInvocation {
        phase: Phase,
        #[source]
        source: ToolError,
    },

    #[error("{phase} canceled")]
    Canceled { phase: Phase },
}

impl JibError {
    /// Tags a runner failure with the phase it happened in.
    pub fn from_tool(phase: Phase, err: ToolError) -> Self {
        match err {
            ToolError::Canceled { .. } => Self::Canceled { phase },
            source => Self::ToolInvocation { phase, source },
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}
