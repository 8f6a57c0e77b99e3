use crate::domain::{
    BuildTarget, CancelToken, JibError, ModuleLayout, ProjectDescriptor, TagGenerator, ToolRunner,
    local_image_ref, registry_image_ref,
};
use crate::services::args::build_args;
use crate::services::executor::run_maven;
use crate::services::preflight::ensure_single_package_goal;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Image reference and Maven arguments for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub image_ref: String,
    pub args: Vec<String>,
}

/// Builds Jib Maven projects to the local daemon or to a registry
pub struct JibMavenBuilder {
    runner: Arc<dyn ToolRunner>,
    tags: Arc<dyn TagGenerator>,
}

impl JibMavenBuilder {
    pub fn new(runner: Arc<dyn ToolRunner>, tags: Arc<dyn TagGenerator>) -> Self {
        Self { runner, tags }
    }

    /// Builds `project` and returns the reference of the produced image.
    pub fn build(
        &self,
        workspace: &Path,
        project: &ProjectDescriptor,
        target: BuildTarget,
        out: &mut (dyn Write + Send),
        cancel: &CancelToken,
    ) -> Result<String, JibError> {
        match target {
            BuildTarget::LocalDaemon => self.build_to_daemon(workspace, project, out, cancel),
            BuildTarget::Registry => self.build_to_registry(workspace, project, out, cancel),
        }
    }

    pub fn build_to_daemon(
        &self,
        workspace: &Path,
        project: &ProjectDescriptor,
        out: &mut (dyn Write + Send),
        cancel: &CancelToken,
    ) -> Result<String, JibError> {
        // Multi-module builds run `package`, which only builds an image
        // through a Jib goal bound to that phase.
        if let ModuleLayout::MultiModule { module } = &project.layout {
            ensure_single_package_goal(
                self.runner.as_ref(),
                workspace,
                module,
                project.profile(),
                cancel,
            )?;
        }

        let plan = self.plan(workspace, project, BuildTarget::LocalDaemon)?;
        run_maven(self.runner.as_ref(), workspace, &plan.args, out, cancel)?;

        Ok(plan.image_ref)
    }

    pub fn build_to_registry(
        &self,
        workspace: &Path,
        project: &ProjectDescriptor,
        out: &mut (dyn Write + Send),
        cancel: &CancelToken,
    ) -> Result<String, JibError> {
        let plan = self.plan(workspace, project, BuildTarget::Registry)?;
        run_maven(self.runner.as_ref(), workspace, &plan.args, out, cancel)?;

        Ok(plan.image_ref)
    }

    /// Computes the image reference and arguments without running anything.
    ///
    /// Registry plans draw a fresh tag on every call.
    pub fn plan(
        &self,
        workspace: &Path,
        project: &ProjectDescriptor,
        target: BuildTarget,
    ) -> Result<BuildPlan, JibError> {
        let image_ref = match (target, &project.layout) {
            (BuildTarget::Registry, ModuleLayout::MultiModule { module }) => {
                return Err(JibError::UnsupportedConfiguration {
                    module: module.clone(),
                });
            }
            (BuildTarget::Registry, ModuleLayout::SingleModule) => {
                registry_image_ref(&project.image_name, &self.tags.generate())
            }
            (BuildTarget::LocalDaemon, _) => local_image_ref(workspace, project.module()),
        };

        let args = build_args(project, target, &image_ref);
        debug!("Plano de build para {}: {:?}", image_ref, args);

        Ok(BuildPlan { image_ref, args })
    }

    /// Runs only the package goal check for a multi-module project.
    pub fn check_package_goals(
        &self,
        workspace: &Path,
        project: &ProjectDescriptor,
        cancel: &CancelToken,
    ) -> Result<(), JibError> {
        match &project.layout {
            ModuleLayout::SingleModule => Ok(()),
            ModuleLayout::MultiModule { module } => ensure_single_package_goal(
                self.runner.as_ref(),
                workspace,
                module,
                project.profile(),
                cancel,
            ),
        }
    }

    pub fn is_tool_available(&self, workspace: &Path) -> bool {
        self.runner.is_available(workspace)
    }
}
