use crate::cli::BuildSession;
use crate::infra::config::CONFIG_FILE_NAME;
use anyhow::Result;
use std::path::Path;

/// Reports whether Maven can be started and which config files exist.
pub fn doctor(session: &BuildSession, config_dir: &Path, workspace: &Path) -> Result<bool> {
    println!("🔍 Checando Maven e configuração...");
    let mut healthy = true;

    if session.is_tool_available() {
        println!("✅ Maven disponível para {:?}", workspace);
    } else {
        println!("⚠️  Maven não encontrado (nem mvnw em {:?}, nem mvn no PATH)", workspace);
        healthy = false;
    }

    for dir in [config_dir, workspace] {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            println!("✅ Config: {:?}", path);
        } else {
            println!("ℹ️  Sem {} em {:?}", CONFIG_FILE_NAME, dir);
        }
    }

    println!(
        "🎯 Target padrão: {} ({} artifact(s) configurado(s))",
        session.config().target(),
        session.config().artifacts.len()
    );

    Ok(healthy)
}
