use anyhow::{Context, Result, anyhow};
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

pub(crate) fn command_exists(cmd: &str) -> bool {
    let path = Path::new(cmd);
    if path.components().count() > 1 {
        return is_executable(path);
    }

    let Some(path_var) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&path_var).any(|dir| is_executable(&dir.join(cmd)))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

pub(crate) fn ensure_command(cmd: &str, message: &str) -> Result<()> {
    if command_exists(cmd) {
        Ok(())
    } else {
        Err(anyhow!("{}", message))
    }
}

/// Run `cmd` to completion and return its stdout.
pub(crate) fn run_command<I, S>(cmd: &str, args: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("failed to run {} (is it installed?)", cmd))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("{} failed: {}", cmd, stderr.trim()));
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_command_is_reported() {
        assert!(!command_exists("wordweave-definitely-not-installed"));
        let err = ensure_command("wordweave-definitely-not-installed", "needs a tool")
            .expect_err("missing command");
        assert_eq!(err.to_string(), "needs a tool");
    }

    #[cfg(unix)]
    #[test]
    fn run_command_reports_failure() {
        assert!(run_command("sh", ["-c", "echo boom >&2; exit 3"]).is_err());
        let out = run_command("sh", ["-c", "printf ok"]).expect("sh runs");
        assert_eq!(out, b"ok");
    }
}
