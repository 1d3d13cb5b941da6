//! Reading the system clipboard through platform tools.

use crate::error::{RecapError, Result};
use crate::youtube::{is_youtube_url, TargetMode};
use std::process::Command;
use tracing::debug;

/// Clipboard readers tried in order: (program, args).
const READERS: &[(&str, &[&str])] = &[
    ("pbpaste", &[]),
    ("wl-paste", &["--no-newline"]),
    ("xclip", &["-o", "-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--output"]),
    ("powershell", &["-NoProfile", "-Command", "Get-Clipboard"]),
];

/// Return the trimmed clipboard text.
///
/// Fails if no reader is installed or the clipboard is empty.
pub fn read_clipboard() -> Result<String> {
    for (program, args) in READERS {
        match Command::new(program).args(*args).output() {
            Ok(out) if out.status.success() => {
                let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
                if text.is_empty() {
                    return Err(RecapError::Clipboard("clipboard is empty".into()));
                }
                debug!("Read {} chars from clipboard via {}", text.len(), program);
                return Ok(text);
            }
            Ok(out) => debug!("{} exited with {}", program, out.status),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => debug!("{} failed: {}", program, e),
        }
    }

    Err(RecapError::Clipboard(format!(
        "no clipboard tool available (tried {})",
        available_readers().join(", ")
    )))
}

/// Name of the first installed clipboard reader, if any.
pub fn detect_reader() -> Option<&'static str> {
    READERS.iter().map(|(p, _)| *p).find(|p| which(p))
}

fn available_readers() -> Vec<&'static str> {
    READERS.iter().map(|(p, _)| *p).collect()
}

fn which(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths).any(|dir| {
                let candidate = dir.join(program);
                candidate.is_file() || candidate.with_extension("exe").is_file()
            })
        })
        .unwrap_or(false)
}

/// Pick the reference from the argument or the clipboard.
pub fn resolve_reference(argument: Option<&str>, use_clipboard: bool, mode: TargetMode) -> Result<String> {
    if use_clipboard {
        return check_clipboard_text(read_clipboard()?, mode);
    }
    match argument.map(str::trim) {
        Some(r) if !r.is_empty() => Ok(r.to_string()),
        _ => Err(RecapError::InvalidInput(
            "Provide a reference argument or use --clipboard".into(),
        )),
    }
}

/// Only search accepts free text from the clipboard.
fn check_clipboard_text(text: String, mode: TargetMode) -> Result<String> {
    if mode == TargetMode::Search || is_youtube_url(&text) {
        return Ok(text);
    }
    Err(RecapError::InvalidInput(format!(
        "Clipboard does not contain a YouTube {} URL: {}",
        mode, text
    )))
}

/// The argument that `--clipboard` overrides, if one was given.
pub fn ignored_argument(argument: Option<&str>, use_clipboard: bool) -> Option<&str> {
    argument
        .map(str::trim)
        .filter(|a| use_clipboard && !a.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_used_without_clipboard() {
        assert_eq!(
            resolve_reference(Some("  abc123 "), false, TargetMode::Video).unwrap(),
            "abc123"
        );
    }

    #[test]
    fn test_missing_reference_is_invalid_input() {
        let err = resolve_reference(None, false, TargetMode::Channel).unwrap_err();
        assert!(matches!(err, RecapError::InvalidInput(_)));
        assert!(err.is_fatal());
        assert!(resolve_reference(Some("   "), false, TargetMode::Video).is_err());
    }

    #[test]
    fn test_reader_list_names_every_platform() {
        let names = available_readers();
        assert!(names.contains(&"pbpaste"));
        assert!(names.contains(&"xclip"));
    }

    #[test]
    fn test_clipboard_text_must_be_youtube_url_outside_search() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string();
        assert_eq!(check_clipboard_text(url.clone(), TargetMode::Video).unwrap(), url);

        for mode in [TargetMode::Video, TargetMode::Playlist, TargetMode::Channel] {
            let err = check_clipboard_text("grocery list".into(), mode).unwrap_err();
            assert!(matches!(err, RecapError::InvalidInput(ref m) if m.contains("YouTube")));
        }

        assert_eq!(
            check_clipboard_text("rust async".into(), TargetMode::Search).unwrap(),
            "rust async"
        );
    }

    #[test]
    fn test_argument_ignored_only_with_clipboard() {
        assert_eq!(ignored_argument(Some(" abc123 "), true), Some("abc123"));
        assert_eq!(ignored_argument(Some("abc123"), false), None);
        assert_eq!(ignored_argument(Some("  "), true), None);
        assert_eq!(ignored_argument(None, true), None);
    }
}
