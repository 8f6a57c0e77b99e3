use crate::domain::{BuildTarget, ProjectDescriptor};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "jibctl.toml";

pub fn default_config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/root"))
        .join(".config/jibctl")
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct MavenConfig {
    pub executable: Option<String>,
    pub wrapper: Option<String>,
    pub skip_wrapper: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub target: Option<BuildTarget>,
    /// Duration such as "90s" or "30m"
    pub timeout: Option<String>,
}

/// One `[[artifacts]]` entry
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    pub image: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    /// Maven project directory, relative to the directory holding the config
    #[serde(default)]
    pub workspace: Option<PathBuf>,
}

impl ArtifactConfig {
    pub fn to_descriptor(&self) -> ProjectDescriptor {
        ProjectDescriptor::new(
            self.image.clone(),
            self.module.as_deref(),
            self.profile.as_deref(),
        )
    }

    /// Resolves the artifact workspace against `base`, expanding `~`
    pub fn workspace_in(&self, base: &Path) -> PathBuf {
        match &self.workspace {
            Some(path) => {
                let expanded = shellexpand::tilde(path.to_string_lossy().as_ref()).into_owned();
                base.join(expanded)
            }
            None => base.to_path_buf(),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub maven: MavenConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub artifacts: Vec<ArtifactConfig>,
}

impl AppConfig {
    /// Merges another AppConfig into self.
    /// Values from `other` overwrite values in `self` if present; artifacts
    /// with the same image name are replaced, new ones appended.
    pub fn merge(&mut self, other: AppConfig) {
        if let Some(executable) = other.maven.executable {
            self.maven.executable = Some(executable);
        }
        if let Some(wrapper) = other.maven.wrapper {
            self.maven.wrapper = Some(wrapper);
        }
        if let Some(skip) = other.maven.skip_wrapper {
            self.maven.skip_wrapper = Some(skip);
        }
        if let Some(target) = other.build.target {
            self.build.target = Some(target);
        }
        if let Some(timeout) = other.build.timeout {
            self.build.timeout = Some(timeout);
        }

        for artifact in other.artifacts {
            match self.artifacts.iter_mut().find(|a| a.image == artifact.image) {
                Some(existing) => *existing = artifact,
                None => self.artifacts.push(artifact),
            }
        }
    }

    pub fn target(&self) -> BuildTarget {
        self.build.target.unwrap_or_default()
    }

    pub fn timeout(&self) -> Result<Option<Duration>> {
        self.build
            .timeout
            .as_deref()
            .map(parse_duration)
            .transpose()
            .context("build.timeout inválido")
    }
}

/// Loads the global config from `config_dir` and merges the project-local
/// `jibctl.toml` from `project_dir` over it.
pub fn load_app_config(config_dir: &Path, project_dir: &Path) -> Result<AppConfig> {
    let global_path = config_dir.join(CONFIG_FILE_NAME);
    let mut app_config = read_config_file(&global_path)?.unwrap_or_default();

    let local_path = project_dir.join(CONFIG_FILE_NAME);
    if same_file(&global_path, &local_path) {
        return Ok(app_config);
    }

    if let Some(local) = read_config_file(&local_path)? {
        debug!("Config local encontrada em {:?}", local_path);
        app_config.merge(local);
    }

    Ok(app_config)
}

fn read_config_file(path: &Path) -> Result<Option<AppConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).with_context(|| format!("lendo {:?}", path))?;
    let config: AppConfig =
        toml::from_str(&content).with_context(|| format!("parse de {:?}", path))?;

    Ok(Some(config))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Validates configured artifacts, skipping duplicate image names
pub fn validate_artifacts(artifacts: &[ArtifactConfig]) -> Result<Vec<ArtifactConfig>> {
    let mut valid = Vec::new();
    let mut images = HashSet::new();

    for artifact in artifacts {
        validate_image_name(&artifact.image)?;

        if let Some(module) = artifact.module.as_deref() {
            validate_module(module)
                .with_context(|| format!("artifact '{}'", artifact.image))?;
        }

        if !images.insert(artifact.image.clone()) {
            warn!("  Artifact duplicado ignorado: {}", artifact.image);
            continue;
        }

        valid.push(artifact.clone());
    }

    Ok(valid)
}

pub fn validate_image_name(image: &str) -> Result<()> {
    if image.trim().is_empty() {
        bail!("Artifact sem campo 'image'");
    }
    if image.chars().any(char::is_whitespace) {
        bail!("Nome de imagem '{}' contém espaços", image);
    }
    Ok(())
}

/// Module selectors are passed to `--projects` verbatim
pub fn validate_module(module: &str) -> Result<()> {
    if module.is_empty() {
        return Ok(());
    }
    if module.chars().any(char::is_whitespace) {
        bail!("Módulo '{}' contém espaços", module);
    }
    if module.starts_with('-') {
        bail!("Módulo '{}' não pode começar com '-'", module);
    }
    if module.chars().all(|c| matches!(c, ':' | '/' | '.' | ',')) {
        bail!("Módulo '{}' inválido", module);
    }
    Ok(())
}

pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(stripped) = s.strip_suffix("ms") {
        let millis: u64 = stripped.parse()?;
        Ok(Duration::from_millis(millis))
    } else if let Some(stripped) = s.strip_suffix('s') {
        let secs: u64 = stripped.parse()?;
        Ok(Duration::from_secs(secs))
    } else if let Some(stripped) = s.strip_suffix('m') {
        let mins: u64 = stripped.parse()?;
        Ok(Duration::from_secs(mins * 60))
    } else if let Some(stripped) = s.strip_suffix('h') {
        let hours: u64 = stripped.parse()?;
        Ok(Duration::from_secs(hours * 3600))
    } else {
        Err(anyhow::anyhow!("Formato de duração inválido: {}", s))
    }
}
