use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use jibctl::BuildTarget;
use jibctl::cli::doctor::doctor;
use jibctl::cli::{ArtifactRequest, BuildSession, logging};
use jibctl::infra::config::default_config_dir;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jibctl",
    version,
    about = "Constrói imagens de container a partir de projetos Maven com Jib"
)]
struct Cli {
    /// Diretório de configuração (default: ~/.config/jibctl)
    #[arg(long, env = "JIBCTL_CONFIG_DIR", default_value_os_t = default_config_dir())]
    config_dir: PathBuf,

    /// Mostra logs de debug (comandos do Maven, goals encontrados)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProjectArgs {
    /// Diretório do projeto Maven
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Nome da imagem; sem ele, usa os [[artifacts]] do jibctl.toml
    #[arg(long)]
    image: Option<String>,

    /// Módulo de um projeto multi-module
    #[arg(short, long)]
    module: Option<String>,

    /// Perfil do Maven (-P)
    #[arg(short = 'P', long)]
    profile: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    /// Docker daemon local (jib:dockerBuild)
    Local,
    /// Registry remoto (jib:build)
    Registry,
}

impl From<TargetArg> for BuildTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Local => BuildTarget::LocalDaemon,
            TargetArg::Registry => BuildTarget::Registry,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Constrói a(s) imagem(ns) e imprime as referências geradas
    Build {
        #[command(flatten)]
        project: ProjectArgs,
        /// Destino da imagem (default: build.target do config, ou local)
        #[arg(long, value_enum)]
        target: Option<TargetArg>,
        /// Tempo máximo de build, ex: 90s, 30m
        #[arg(long)]
        timeout: Option<String>,
    },
    /// Verifica se o módulo tem exatamente um goal do jib ligado a package
    Check {
        #[command(flatten)]
        project: ProjectArgs,
        /// Tempo máximo da consulta, ex: 90s, 2m
        #[arg(long)]
        timeout: Option<String>,
    },
    /// Mostra o comando do Maven que o build executaria
    #[command(name = "args")]
    ShowArgs {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long, value_enum)]
        target: Option<TargetArg>,
    },
    /// Checa se o Maven está disponível e quais configs foram encontradas
    Doctor {
        /// Diretório do projeto Maven
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
}

impl ProjectArgs {
    fn into_request(
        self,
        target: Option<TargetArg>,
        timeout: Option<String>,
    ) -> (PathBuf, ArtifactRequest) {
        let request = ArtifactRequest {
            image: self.image,
            module: self.module,
            profile: self.profile,
            target: target.map(BuildTarget::from),
            timeout,
        };
        (self.workspace, request)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Build {
            project,
            target,
            timeout,
        } => {
            let (workspace, request) = project.into_request(target, timeout);
            let session = BuildSession::new(&cli.config_dir, &workspace)?;
            let cancel = session.cancel_token(&request)?;
            let mut maven_log = std::io::stderr();

            for image in session.build(&request, &mut maven_log, &cancel)? {
                println!("{image}");
            }
            Ok(())
        }
        Commands::Check { project, timeout } => {
            let (workspace, request) = project.into_request(None, timeout);
            let session = BuildSession::new(&cli.config_dir, &workspace)?;
            let cancel = session.cancel_token(&request)?;

            let checked = session.check(&request, &cancel)?;
            println!("✅ {checked} módulo(s) com um único goal ligado a package");
            Ok(())
        }
        Commands::ShowArgs { project, target } => {
            let (workspace, request) = project.into_request(target, None);
            let session = BuildSession::new(&cli.config_dir, &workspace)?;

            for (workspace, plan) in session.plan(&request)? {
                let program = jibctl::MavenRunner::from_config(&session.config().maven)
                    .program(&workspace);
                println!(
                    "(cd {:?} && {} {})",
                    workspace,
                    program.display(),
                    plan.args.join(" ")
                );
            }
            Ok(())
        }
        Commands::Doctor { workspace } => {
            let session = BuildSession::new(&cli.config_dir, &workspace)?;
            if !doctor(&session, &cli.config_dir, &workspace)? {
                bail!("Maven não está disponível");
            }
            Ok(())
        }
    }
}
