// csp/src/actions.rs
//! GitHub Actions workflow plumbing: step outputs, PATH additions and
//! error annotations. Outside a runner everything falls back to stdout.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use csp_common::error::Result;
use tracing::debug;

const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";
const PATH_FILE_VAR: &str = "GITHUB_PATH";

fn runner_file(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn append(file: &Path, text: &str) -> Result<()> {
    let mut f = OpenOptions::new().create(true).append(true).open(file)?;
    f.write_all(text.as_bytes())?;
    Ok(())
}

/// Renders one output entry in the `GITHUB_OUTPUT` file format.
///
/// Multi-line values use the heredoc form with a delimiter that does not
/// occur in the value.
pub fn format_output(name: &str, value: &str) -> String {
    if !value.contains('\n') && !value.contains('\r') {
        return format!("{name}={value}\n");
    }
    let mut delimiter = format!("csp_delimiter_{}", std::process::id());
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    let body = value.strip_suffix('\n').unwrap_or(value);
    format!("{name}<<{delimiter}\n{body}\n{delimiter}\n")
}

/// Sets a step output.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    match runner_file(OUTPUT_FILE_VAR) {
        Some(file) => {
            debug!("Writing output '{}' to {}", name, file.display());
            append(&file, &format_output(name, value))
        }
        None => {
            print!("{}", format_output(name, value));
            Ok(())
        }
    }
}

/// True when `dir` is not already the first `PATH` entry.
pub fn needs_path_entry(path_var: &str, dir: &Path) -> bool {
    !path_var.starts_with(&*dir.to_string_lossy())
}

/// Makes `dir` visible on `PATH` for this process and later steps.
pub fn add_path(dir: &Path) -> Result<()> {
    if let Some(file) = runner_file(PATH_FILE_VAR) {
        debug!("Adding {} to {}", dir.display(), file.display());
        append(&file, &format!("{}\n", dir.display()))?;
    }
    let mut entries = vec![dir.to_path_buf()];
    if let Some(current) = env::var_os("PATH") {
        entries.extend(env::split_paths(&current));
    }
    if let Ok(joined) = env::join_paths(entries) {
        env::set_var("PATH", joined);
    }
    Ok(())
}

/// Escapes a message for a `::error::` workflow command.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Emits an error annotation the runner attaches to the step.
pub fn report_error(message: &str) {
    println!("::error::{}", escape_data(message));
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn single_line_output() {
        assert_eq!(
            format_output("csp-driver-cached-version", "24.1.0"),
            "csp-driver-cached-version=24.1.0\n"
        );
    }

    #[test]
    fn multi_line_output_uses_heredoc() {
        let rendered = format_output("csp-driver-cached-config", "AuthURL: a\nHSMURL: h\n");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        let delimiter = lines[0]
            .strip_prefix("csp-driver-cached-config<<")
            .unwrap();
        assert_eq!(lines[1], "AuthURL: a");
        assert_eq!(lines[2], "HSMURL: h");
        assert_eq!(lines[3], delimiter);
    }

    #[test]
    fn heredoc_delimiter_avoids_value() {
        let delimiter = format!("csp_delimiter_{}", std::process::id());
        let value = format!("x\n{delimiter}\ny");
        let rendered = format_output("out", &value);
        let first = rendered.lines().next().unwrap();
        let chosen = first.strip_prefix("out<<").unwrap();
        assert_ne!(chosen, delimiter);
        assert!(!value.lines().any(|l| l == chosen));
    }

    #[test]
    fn append_accumulates_entries() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("output");
        append(&file, &format_output("a", "1")).unwrap();
        append(&file, &format_output("b", "2")).unwrap();
        assert_eq!(fs::read_to_string(file).unwrap(), "a=1\nb=2\n");
    }

    #[test]
    fn path_entry_check() {
        let dir = Path::new("/cache/Venafi_CSP/24.1.0/x64");
        assert!(!needs_path_entry("/cache/Venafi_CSP/24.1.0/x64:/usr/bin", dir));
        assert!(needs_path_entry("/usr/bin:/cache/Venafi_CSP/24.1.0/x64", dir));
    }

    #[test]
    fn error_messages_are_escaped() {
        assert_eq!(escape_data("50% done\r\nnext"), "50%25 done%0D%0Anext");
    }
}
