use anyhow::Result;
use jibctl::cli::{ArtifactRequest, BuildSession};
use jibctl::test_support::{FixedTagGenerator, MockRunner};
use jibctl::{BuildTarget, CancelToken, JibError, Phase};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn create_session(config_dir: &Path, workspace: &Path) -> Result<(BuildSession, Arc<MockRunner>)> {
    let mock = Arc::new(MockRunner::new());
    let session = BuildSession::with_runner(
        config_dir,
        workspace,
        mock.clone(),
        Arc::new(FixedTagGenerator::new("f00d")),
    )?;
    Ok((session, mock))
}

#[test]
fn test_workflow_builds_configured_artifacts_in_order() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;

    fs::write(
        workspace.path().join("jibctl.toml"),
        r#"
[[artifacts]]
image = "acme/web"

[[artifacts]]
image = "acme/api"
module = "api"
"#,
    )?;

    let (session, mock) = create_session(config_dir.path(), workspace.path())?;
    mock.set_query_output("jib:dockerBuild\n");
    mock.set_build_output("[INFO] BUILD SUCCESS\n");

    let mut out: Vec<u8> = Vec::new();
    let images = session.build(&ArtifactRequest::default(), &mut out, &CancelToken::new())?;

    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|i| i.starts_with("jibimage")));
    assert_ne!(images[0], images[1]);

    let commands = mock.get_commands();
    assert_eq!(commands.len(), 3, "commands: {:?}", commands);
    assert!(commands[0].starts_with("streaming:--non-recursive prepare-package jib:dockerBuild"));
    assert_eq!(
        commands[1],
        "output:--projects api jib:_skaffold-package-goals --quiet"
    );
    assert!(commands[2].starts_with("streaming:--projects api --also-make package -Dimage="));

    assert_eq!(String::from_utf8(out)?, "[INFO] BUILD SUCCESS\n".repeat(2));
    Ok(())
}

#[test]
fn test_workflow_multi_module_with_profile_queries_then_builds() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    let (session, mock) = create_session(config_dir.path(), workspace.path())?;
    mock.set_query_output("jib:dockerBuild\n");

    let request = ArtifactRequest {
        image: Some("svc-a".into()),
        module: Some("svc-a".into()),
        profile: Some("prod".into()),
        ..Default::default()
    };
    let images = session.build(&request, &mut io::sink(), &CancelToken::new())?;

    let commands = mock.get_commands();
    assert_eq!(
        commands,
        vec![
            "output:--projects svc-a jib:_skaffold-package-goals --quiet -Pprod".to_string(),
            format!(
                "streaming:--projects svc-a --also-make package -Dimage={} -Pprod",
                images[0]
            ),
        ]
    );
    assert!(
        mock.get_workspaces()
            .iter()
            .all(|w| w == workspace.path())
    );
    Ok(())
}

#[test]
fn test_workflow_two_bound_goals_stop_before_build() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    let (session, mock) = create_session(config_dir.path(), workspace.path())?;
    mock.set_query_output("jib:dockerBuild\njib:build\n");

    let request = ArtifactRequest {
        image: Some("svc-a".into()),
        module: Some("svc-a".into()),
        ..Default::default()
    };
    let err = session
        .build(&request, &mut io::sink(), &CancelToken::new())
        .unwrap_err();

    match err.downcast_ref::<JibError>() {
        Some(JibError::PreconditionViolation { module, found, goals }) => {
            assert_eq!(module, "svc-a");
            assert_eq!(*found, 2);
            assert_eq!(goals, &vec!["jib:dockerBuild".to_string(), "jib:build".to_string()]);
        }
        other => panic!("expected PreconditionViolation, got {:?}", other),
    }

    assert!(
        !mock
            .get_commands()
            .iter()
            .any(|c| c.starts_with("streaming:"))
    );
    Ok(())
}

#[test]
fn test_workflow_registry_multi_module_runs_nothing() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    let (session, mock) = create_session(config_dir.path(), workspace.path())?;

    let request = ArtifactRequest {
        image: Some("gcr.io/acme/api".into()),
        module: Some("api".into()),
        target: Some(BuildTarget::Registry),
        ..Default::default()
    };
    let err = session
        .build(&request, &mut io::sink(), &CancelToken::new())
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<JibError>(),
        Some(JibError::UnsupportedConfiguration { .. })
    ));
    assert!(mock.get_commands().is_empty());
    Ok(())
}

#[test]
fn test_workflow_registry_target_from_global_config() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    fs::write(
        config_dir.path().join("jibctl.toml"),
        "[build]\ntarget = \"registry\"\n",
    )?;

    let (session, mock) = create_session(config_dir.path(), workspace.path())?;
    let request = ArtifactRequest {
        image: Some("gcr.io/acme/app".into()),
        ..Default::default()
    };
    let images = session.build(&request, &mut io::sink(), &CancelToken::new())?;

    assert_eq!(images, vec!["gcr.io/acme/app:f00d".to_string()]);
    assert_eq!(
        mock.get_commands(),
        vec![
            "streaming:--non-recursive prepare-package jib:build -Dimage=gcr.io/acme/app:f00d"
                .to_string()
        ]
    );
    Ok(())
}

#[test]
fn test_workflow_build_failure_mentions_maven() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    let (session, mock) = create_session(config_dir.path(), workspace.path())?;
    mock.set_fail_on("streaming");

    let request = ArtifactRequest {
        image: Some("app".into()),
        ..Default::default()
    };
    let err = session
        .build(&request, &mut io::sink(), &CancelToken::new())
        .unwrap_err();

    let jib = err.downcast_ref::<JibError>().expect("JibError in chain");
    assert!(matches!(
        jib,
        JibError::ToolInvocation {
            phase: Phase::Build,
            ..
        }
    ));
    assert!(jib.to_string().starts_with("maven build failed"));
    assert!(format!("{:#}", err).contains("Mock failure on: streaming"));
    Ok(())
}

#[test]
fn test_workflow_check_only_queries() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    let (session, mock) = create_session(config_dir.path(), workspace.path())?;
    mock.set_query_output("  jib:dockerBuild  \n\n");

    let request = ArtifactRequest {
        module: Some("api".into()),
        ..Default::default()
    };
    let checked = session.check(&request, &CancelToken::new())?;

    assert_eq!(checked, 1);
    assert_eq!(
        mock.get_commands(),
        vec!["output:--projects api jib:_skaffold-package-goals --quiet".to_string()]
    );
    Ok(())
}

#[test]
fn test_workflow_check_rejects_empty_query_output() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    let (session, mock) = create_session(config_dir.path(), workspace.path())?;
    mock.set_query_output("\n");

    let request = ArtifactRequest {
        module: Some("api".into()),
        ..Default::default()
    };
    let err = session.check(&request, &CancelToken::new()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<JibError>(),
        Some(JibError::PreconditionViolation { found: 0, .. })
    ));
    Ok(())
}

#[test]
fn test_workflow_plan_runs_nothing() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    let (session, mock) = create_session(config_dir.path(), workspace.path())?;

    let request = ArtifactRequest {
        image: Some("app".into()),
        profile: Some("dev".into()),
        ..Default::default()
    };
    let plans = session.plan(&request)?;

    assert_eq!(plans.len(), 1);
    let (plan_workspace, plan) = &plans[0];
    assert_eq!(plan_workspace, workspace.path());
    assert_eq!(plan.args[2], "jib:dockerBuild");
    assert_eq!(plan.args.last().map(String::as_str), Some("-Pdev"));
    assert!(mock.get_commands().is_empty());
    Ok(())
}

#[test]
fn test_workflow_local_config_overrides_global() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    fs::write(
        config_dir.path().join("jibctl.toml"),
        r#"
[build]
target = "registry"
timeout = "1h"

[[artifacts]]
image = "acme/api"
module = "api"
"#,
    )?;
    fs::write(
        workspace.path().join("jibctl.toml"),
        r#"
[build]
target = "local"

[[artifacts]]
image = "acme/api"
module = "api"
profile = "local"
"#,
    )?;

    let (session, _mock) = create_session(config_dir.path(), workspace.path())?;

    assert_eq!(session.config().target(), BuildTarget::LocalDaemon);
    assert_eq!(session.config().artifacts.len(), 1);
    assert_eq!(session.config().artifacts[0].profile.as_deref(), Some("local"));
    assert_eq!(session.config().timeout()?, Some(Duration::from_secs(3600)));
    Ok(())
}

#[test]
fn test_workflow_no_artifacts_is_an_error() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    let (session, mock) = create_session(config_dir.path(), workspace.path())?;

    let result = session.build(&ArtifactRequest::default(), &mut io::sink(), &CancelToken::new());

    assert!(result.is_err());
    assert!(mock.get_commands().is_empty());
    Ok(())
}

#[test]
fn test_workflow_invalid_timeout_is_rejected() -> Result<()> {
    let config_dir = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    let (session, _mock) = create_session(config_dir.path(), workspace.path())?;

    let request = ArtifactRequest {
        timeout: Some("soon".into()),
        ..Default::default()
    };

    assert!(session.cancel_token(&request).is_err());
    Ok(())
}
