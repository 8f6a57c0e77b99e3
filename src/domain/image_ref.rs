use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::LazyLock;

const LOCAL_IMAGE_PREFIX: &str = "jibimage";

// Docker repository path component
static REPOSITORY_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z\d]+(?:(?:[_.]|__|-+)[a-z\d]+)*$")
        .expect("repository component pattern is valid")
});

/// Deterministic image reference for builds loaded into the local daemon.
///
/// `jibimage<workspace>[_<module>]` is used as-is when it is a valid
/// repository component; otherwise the name is hashed so that any workspace
/// path still maps to the same reference on every build.
pub fn local_image_ref(workspace: &Path, module: Option<&str>) -> String {
    let mut name = format!("{LOCAL_IMAGE_PREFIX}{}", workspace.to_string_lossy());
    if let Some(module) = module.filter(|m| !m.is_empty()) {
        name.push('_');
        name.push_str(module);
    }

    if REPOSITORY_COMPONENT.is_match(&name) {
        return name;
    }

    let digest = Sha256::digest(name.as_bytes());
    format!("{LOCAL_IMAGE_PREFIX}{digest:x}")
}

/// `image_name:tag` reference for registry builds
pub fn registry_image_ref(image_name: &str, tag: &str) -> String {
    format!("{image_name}:{tag}")
}
