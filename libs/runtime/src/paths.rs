use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Resolve the server home directory.
///
/// - `Some(path)`: `~` / `~/...` is expanded, relative paths are made absolute
///   against the current directory.
/// - `None`: `<platform home>/<default_subdir>` (`%APPDATA%` on Windows,
///   `$HOME` elsewhere).
///
/// With `create` set, the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured {
        Some(raw) => expand_tilde(raw.trim())?,
        None => platform_base()?.join(default_subdir),
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .context("current directory is not accessible")?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    }
    Ok(path)
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_base();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_base()?.join(rest));
    }
    if raw.starts_with('~') {
        bail!("'{raw}': only the current user's home (~) can be expanded");
    }
    Ok(PathBuf::from(raw))
}

fn platform_base() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = std::env::var_os("APPDATA")
        .map(PathBuf::from)
        .or_else(dirs::config_dir);
    #[cfg(not(target_os = "windows"))]
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir);

    base.context("cannot determine the user's home directory")
}
