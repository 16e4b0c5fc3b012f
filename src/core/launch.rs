//! Hand files over to other applications.

use anyhow::{Context, Result};
use log::warn;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::config::EditorConfig;

/// Open `path` with the platform's default application.
pub fn open_path(path: &Path) -> Result<()> {
    default_opener(path)
        .spawn()
        .with_context(|| format!("Failed to open {:?}", path))?;
    Ok(())
}

/// Open `path` in the configured editor at `line`, falling back to the
/// default application when no editor is installed or it fails to start.
pub fn open_at_line(path: &Path, line: u32, editor: Option<&EditorConfig>) -> Result<()> {
    if let Some(editor) = editor.filter(|e| e.program.exists()) {
        let spawned = Command::new(&editor.program)
            .args(editor_args(&editor.line_arg, line, path))
            .spawn();
        match spawned {
            Ok(_) => return Ok(()),
            Err(err) => warn!(
                "Could not start {:?} ({}), using the default application",
                editor.program, err
            ),
        }
    }
    open_path(path)
}

/// Arguments for an editor whose line flag is a template such as `-n{line}`.
pub fn editor_args(line_arg: &str, line: u32, path: &Path) -> Vec<OsString> {
    let mut args = Vec::new();
    if !line_arg.is_empty() {
        args.push(OsString::from(line_arg.replace("{line}", &line.to_string())));
    }
    args.push(path.as_os_str().to_os_string());
    args
}

fn default_opener(path: &Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_template_is_expanded() {
        let args = editor_args("-n{line}", 42, Path::new("/tmp/a.txt"));
        assert_eq!(args, vec![OsString::from("-n42"), OsString::from("/tmp/a.txt")]);
    }

    #[test]
    fn empty_template_passes_only_the_path() {
        let args = editor_args("", 3, Path::new("b.txt"));
        assert_eq!(args, vec![OsString::from("b.txt")]);
    }
}
