use crate::domain::{BuildTarget, CancelToken, ProjectDescriptor, TagGenerator, ToolRunner};
use crate::infra::config::{
    AppConfig, load_app_config, parse_duration, validate_artifacts, validate_image_name,
    validate_module,
};
use crate::infra::{MavenRunner, RandomTagGenerator};
use crate::services::{BuildPlan, JibMavenBuilder};
use anyhow::{Context, Result, bail};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Artifact selection and overrides coming from the command line
#[derive(Debug, Clone, Default)]
pub struct ArtifactRequest {
    pub image: Option<String>,
    pub module: Option<String>,
    pub profile: Option<String>,
    pub target: Option<BuildTarget>,
    pub timeout: Option<String>,
}

/// A project workspace with its merged config and a builder
pub struct BuildSession {
    workspace: PathBuf,
    config: AppConfig,
    builder: JibMavenBuilder,
}

impl BuildSession {
    pub fn new(config_dir: &Path, workspace: &Path) -> Result<Self> {
        let config = load_app_config(config_dir, workspace)?;
        let runner = Arc::new(MavenRunner::from_config(&config.maven));
        Ok(Self::from_parts(
            workspace,
            config,
            runner,
            Arc::new(RandomTagGenerator::new()),
        ))
    }

    pub fn with_runner(
        config_dir: &Path,
        workspace: &Path,
        runner: Arc<dyn ToolRunner>,
        tags: Arc<dyn TagGenerator>,
    ) -> Result<Self> {
        let config = load_app_config(config_dir, workspace)?;
        Ok(Self::from_parts(workspace, config, runner, tags))
    }

    fn from_parts(
        workspace: &Path,
        config: AppConfig,
        runner: Arc<dyn ToolRunner>,
        tags: Arc<dyn TagGenerator>,
    ) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
            config,
            builder: JibMavenBuilder::new(runner, tags),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn target(&self, request: &ArtifactRequest) -> BuildTarget {
        request.target.unwrap_or_else(|| self.config.target())
    }

    /// Token carrying the requested timeout, falling back to `build.timeout`
    pub fn cancel_token(&self, request: &ArtifactRequest) -> Result<CancelToken> {
        let timeout = match request.timeout.as_deref() {
            Some(timeout) => Some(parse_duration(timeout).context("--timeout inválido")?),
            None => self.config.timeout()?,
        };

        Ok(timeout.map_or_else(CancelToken::new, CancelToken::with_timeout))
    }

    /// Artifacts selected by the request, each with its Maven workspace.
    ///
    /// `--image` selects a single artifact built from the command line;
    /// otherwise the configured artifacts are used, optionally filtered by
    /// `--module`.
    pub fn resolve_artifacts(
        &self,
        request: &ArtifactRequest,
    ) -> Result<Vec<(PathBuf, ProjectDescriptor)>> {
        if let Some(module) = request.module.as_deref() {
            validate_module(module)?;
        }

        if let Some(image) = request.image.as_deref() {
            validate_image_name(image)?;
            let project = ProjectDescriptor::new(
                image,
                request.module.as_deref(),
                request.profile.as_deref(),
            );
            return Ok(vec![(self.workspace.clone(), project)]);
        }

        let artifacts = validate_artifacts(&self.config.artifacts)?;
        let selected: Vec<_> = artifacts
            .iter()
            .filter(|a| match request.module.as_deref() {
                Some(module) => a.module.as_deref() == Some(module),
                None => true,
            })
            .map(|a| {
                let mut project = a.to_descriptor();
                if let Some(profile) = request.profile.as_deref() {
                    project = project.with_profile(profile);
                }
                (a.workspace_in(&self.workspace), project)
            })
            .collect();

        if selected.is_empty() {
            bail!(
                "Nenhum artifact encontrado. Use --image ou configure [[artifacts]] em jibctl.toml ({:?})",
                self.workspace
            );
        }

        Ok(selected)
    }

    /// Builds every selected artifact in order, stopping at the first failure.
    pub fn build(
        &self,
        request: &ArtifactRequest,
        out: &mut (dyn Write + Send),
        cancel: &CancelToken,
    ) -> Result<Vec<String>> {
        let target = self.target(request);
        let mut images = Vec::new();

        for (workspace, project) in self.resolve_artifacts(request)? {
            info!(
                " Construindo {} ({}) em {:?}...",
                project.image_name, target, workspace
            );
            let image = self
                .builder
                .build(&workspace, &project, target, out, cancel)
                .with_context(|| format!("construindo {}", project.image_name))?;
            info!(" Imagem pronta: {}", image);
            images.push(image);
        }

        Ok(images)
    }

    /// Runs the package goal check for every selected multi-module artifact.
    pub fn check(&self, request: &ArtifactRequest, cancel: &CancelToken) -> Result<usize> {
        let selected = match (request.image.as_deref(), request.module.as_deref()) {
            (None, Some(module)) => {
                validate_module(module)?;
                let project =
                    ProjectDescriptor::new("", Some(module), request.profile.as_deref());
                vec![(self.workspace.clone(), project)]
            }
            _ => self.resolve_artifacts(request)?,
        };

        let mut checked = 0;
        for (workspace, project) in &selected {
            let Some(module) = project.module() else {
                warn!(
                    "  {} é single-module; nada a verificar",
                    project.image_name
                );
                continue;
            };

            info!(" Verificando goals ligados a package em {}...", module);
            self.builder
                .check_package_goals(workspace, project, cancel)
                .with_context(|| format!("verificando módulo {module}"))?;
            checked += 1;
        }

        Ok(checked)
    }

    /// Plans for the selected artifacts without running Maven
    pub fn plan(&self, request: &ArtifactRequest) -> Result<Vec<(PathBuf, BuildPlan)>> {
        let target = self.target(request);
        self.resolve_artifacts(request)?
            .into_iter()
            .map(|(workspace, project)| -> Result<(PathBuf, BuildPlan)> {
                let plan = self.builder.plan(&workspace, &project, target)?;
                Ok((workspace, plan))
            })
            .collect()
    }

    pub fn is_tool_available(&self) -> bool {
        self.builder.is_tool_available(&self.workspace)
    }
}
