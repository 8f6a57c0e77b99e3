use serde::Deserialize;
use std::fmt;

/// Where a built image ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum BuildTarget {
    /// Loaded into the local Docker daemon (`jib:dockerBuild`)
    #[default]
    #[serde(rename = "local")]
    LocalDaemon,
    /// Pushed straight to a registry (`jib:build`)
    #[serde(rename = "registry")]
    Registry,
}

impl BuildTarget {
    /// Jib goal invoked for single-module builds
    pub fn goal(&self) -> &'static str {
        match self {
            Self::LocalDaemon => "dockerBuild",
            Self::Registry => "build",
        }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalDaemon => write!(f, "local"),
            Self::Registry => write!(f, "registry"),
        }
    }
}

/// Single-module projects are built with `--non-recursive`; multi-module
/// projects select one module and rely on a Jib goal bound to `package`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleLayout {
    SingleModule,
    MultiModule { module: String },
}

/// One buildable unit: the whole project, or one module of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub layout: ModuleLayout,
    pub profile: Option<String>,
    pub image_name: String,
}

impl ProjectDescriptor {
    /// Empty module or profile strings are treated as absent.
    pub fn new(image_name: impl Into<String>, module: Option<&str>, profile: Option<&str>) -> Self {
        let layout = match module.map(str::trim).filter(|m| !m.is_empty()) {
            Some(module) => ModuleLayout::MultiModule {
                module: module.to_string(),
            },
            None => ModuleLayout::SingleModule,
        };

        Self {
            layout,
            profile: profile
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            image_name: image_name.into(),
        }
    }

    pub fn single_module(image_name: impl Into<String>) -> Self {
        Self::new(image_name, None, None)
    }

    pub fn with_module(self, module: &str) -> Self {
        Self::new(self.image_name, Some(module), self.profile.as_deref())
    }

    pub fn with_profile(self, profile: &str) -> Self {
        let module = self.module().map(str::to_string);
        Self::new(self.image_name, module.as_deref(), Some(profile))
    }

    pub fn module(&self) -> Option<&str> {
        match &self.layout {
            ModuleLayout::SingleModule => None,
            ModuleLayout::MultiModule { module } => Some(module),
        }
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref().filter(|p| !p.is_empty())
    }

    pub fn is_multi_module(&self) -> bool {
        matches!(self.layout, ModuleLayout::MultiModule { .. })
    }
}
