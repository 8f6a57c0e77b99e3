use crate::domain::{CancelToken, JibError, Phase, ToolRunner};
use crate::services::args::package_goals_query_args;
use std::path::Path;
use tracing::debug;

/// Checks that `module` has exactly one Jib goal bound to `package`.
///
/// A multi-module build runs the `package` phase rather than a Jib goal, so
/// without this check it could silently build zero images, or several.
/// Maven's output is captured, never forwarded to the build log.
pub fn ensure_single_package_goal(
    runner: &dyn ToolRunner,
    workspace: &Path,
    module: &str,
    profile: Option<&str>,
    cancel: &CancelToken,
) -> Result<(), JibError> {
    let args = package_goals_query_args(module, profile);
    debug!(
        "Procurando goals do jib ligados a package em {:?}: {:?}",
        workspace, args
    );

    let stdout = runner
        .run_output(workspace, &args, cancel)
        .map_err(|e| JibError::from_tool(Phase::Query, e))?;

    let goals = parse_package_goals(&stdout);
    debug!(
        "Goals do jib ligados a package para {:?} {}: {:?} ({})",
        workspace,
        module,
        goals,
        goals.len()
    );

    if goals.len() == 1 {
        return Ok(());
    }

    Err(JibError::PreconditionViolation {
        module: module.to_string(),
        found: goals.len(),
        goals,
    })
}

/// One bound goal per line; surrounding whitespace is ignored.
pub fn parse_package_goals(stdout: &str) -> Vec<String> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed
        .split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockRunner;

    #[test]
    fn test_parse_single_goal() {
        assert_eq!(parse_package_goals("dockerBuild\n"), vec!["dockerBuild"]);
    }

    #[test]
    fn test_parse_ignores_trailing_whitespace() {
        assert_eq!(parse_package_goals("build \n\n  \t\n"), vec!["build"]);
        assert_eq!(parse_package_goals("build\r\n"), vec!["build"]);
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_package_goals("").is_empty());
        assert!(parse_package_goals("\n   \n").is_empty());
    }

    #[test]
    fn test_parse_multiple_goals() {
        assert_eq!(
            parse_package_goals("build\r\ndockerBuild\n"),
            vec!["build", "dockerBuild"]
        );
    }

    #[test]
    fn test_single_goal_passes() {
        let runner = MockRunner::new();
        runner.set_query_output("dockerBuild\n");

        let result = ensure_single_package_goal(
            &runner,
            Path::new("."),
            "svc-a",
            Some("prod"),
            &CancelToken::new(),
        );

        assert!(result.is_ok());
        assert_eq!(
            runner.get_commands(),
            vec!["output:--projects svc-a jib:_skaffold-package-goals --quiet -Pprod"]
        );
    }

    #[test]
    fn test_no_goal_fails() {
        let runner = MockRunner::new();
        runner.set_query_output("\n");

        let err = ensure_single_package_goal(
            &runner,
            Path::new("."),
            "svc-a",
            None,
            &CancelToken::new(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            JibError::PreconditionViolation { found: 0, .. }
        ));
    }

    #[test]
    fn test_two_goals_fail() {
        let runner = MockRunner::new();
        runner.set_query_output("build\ndockerBuild\n");

        let err = ensure_single_package_goal(
            &runner,
            Path::new("."),
            "svc-a",
            None,
            &CancelToken::new(),
        )
        .unwrap_err();

        match err {
            JibError::PreconditionViolation { module, found, goals } => {
                assert_eq!(module, "svc-a");
                assert_eq!(found, 2);
                assert_eq!(goals, vec!["build", "dockerBuild"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_query_failure_is_wrapped() {
        let runner = MockRunner::new();
        runner.set_fail_on("output");

        let err = ensure_single_package_goal(
            &runner,
            Path::new("."),
            "svc-a",
            None,
            &CancelToken::new(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            JibError::ToolInvocation {
                phase: Phase::Query,
                ..
            }
        ));
    }
}
