//! Maven command lines for Jib builds.
//!
//! Token order matters to Maven's option parsing and is never rearranged.

use crate::domain::{BuildTarget, ModuleLayout, ProjectDescriptor};

/// Jib goal that lists the goals bound to `package` for a module
pub const PACKAGE_GOALS_QUERY: &str = "jib:_skaffold-package-goals";

/// Builds the project in the workspace as `image_ref` by running `jib:<goal>` directly.
pub fn single_module_args(goal: &str, image_ref: &str, profile: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "--non-recursive".to_string(),
        "prepare-package".to_string(),
        format!("jib:{goal}"),
        format!("-Dimage={image_ref}"),
    ];
    push_profile(&mut args, profile);
    args
}

/// Builds `module` (and the modules it depends on) through the `package`
/// phase; the Jib goal must already be bound to `package` in the module.
pub fn multi_module_args(module: &str, image_ref: &str, profile: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "--projects".to_string(),
        module.to_string(),
        "--also-make".to_string(),
        "package".to_string(),
        format!("-Dimage={image_ref}"),
    ];
    push_profile(&mut args, profile);
    args
}

/// The query needs recursive project evaluation, so no `--non-recursive` here.
pub fn package_goals_query_args(module: &str, profile: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "--projects".to_string(),
        module.to_string(),
        PACKAGE_GOALS_QUERY.to_string(),
        "--quiet".to_string(),
    ];
    push_profile(&mut args, profile);
    args
}

pub fn build_args(project: &ProjectDescriptor, target: BuildTarget, image_ref: &str) -> Vec<String> {
    match &project.layout {
        ModuleLayout::SingleModule => {
            single_module_args(target.goal(), image_ref, project.profile())
        }
        ModuleLayout::MultiModule { module } => {
            multi_module_args(module, image_ref, project.profile())
        }
    }
}

fn push_profile(args: &mut Vec<String>, profile: Option<&str>) {
    if let Some(profile) = profile.filter(|p| !p.is_empty()) {
        args.push(format!("-P{profile}"));
    }
}
