//! Doctor command - verify API keys, tools and directories.

use crate::cli::clipboard::detect_reader;
use crate::cli::preflight::find_player;
use crate::cli::Output;
use crate::config::{PromptTemplate, Settings, OPENAI_API_KEY_ENV, YOUTUBE_API_KEY_ENV};
use console::style;
use std::path::{Path, PathBuf};

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks. Returns true when no errors were found.
///
/// `config_path` is the file given with `--config`, if any.
pub fn run_doctor(settings: &Settings, config_path: Option<&PathBuf>) -> anyhow::Result<bool> {
    Output::header("Recap Doctor");
    println!();

    let sections: [(&str, Vec<CheckResult>); 4] = [
        (
            "API Keys",
            vec![
                check_key(YOUTUBE_API_KEY_ENV, std::env::var(YOUTUBE_API_KEY_ENV).ok()),
                check_key(OPENAI_API_KEY_ENV, std::env::var(OPENAI_API_KEY_ENV).ok()),
            ],
        ),
        (
            "Tools",
            vec![check_players(&settings.speech.players), check_clipboard()],
        ),
        ("Directories", check_directories(settings)),
        ("Configuration", vec![check_config_file(config_path)]),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Recap.",
            errors
        ));
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Recap is ready to use.");
    }

    Ok(errors == 0)
}

/// Check that an API key is present, showing a masked form.
fn check_key(name: &str, value: Option<String>) -> CheckResult {
    let hint = format!("Set with: export {}='...' or add it to .env", name);
    match value {
        Some(key) if key.trim().is_empty() => CheckResult::error(name, "empty", &hint),
        Some(key) if key.chars().count() > 12 => {
            CheckResult::ok(name, &format!("configured ({})", mask_key(&key)))
        }
        Some(_) => CheckResult::warning(name, "set but unusually short", &hint),
        None => CheckResult::error(name, "not set", &hint),
    }
}

/// First and last four characters of a key.
fn mask_key(key: &str) -> String {
    let head: String = key.chars().take(4).collect();
    let mut tail: Vec<char> = key.chars().rev().take(4).collect();
    tail.reverse();
    format!("{}...{}", head, tail.into_iter().collect::<String>())
}

fn check_players(players: &[String]) -> CheckResult {
    match find_player(players) {
        Some(player) => CheckResult::ok("Audio player", &player),
        None => CheckResult::warning(
            "Audio player",
            &format!("none of {} found", players.join(", ")),
            install_hint_player(),
        ),
    }
}

fn check_clipboard() -> CheckResult {
    match detect_reader() {
        Some(reader) => CheckResult::ok("Clipboard", reader),
        None => CheckResult::warning(
            "Clipboard",
            "no clipboard tool found",
            "Install xclip, xsel or wl-clipboard to use --clipboard",
        ),
    }
}

/// Check cache and prompt directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = vec![
        check_dir("Transcripts", &settings.transcripts_dir()),
        check_dir("Audio", &settings.audio_dir()),
        check_dir("Prompts", &settings.prompts_dir()),
    ];

    match PromptTemplate::available(&settings.prompts_dir()) {
        Ok(names) if !names.is_empty() => {
            results.push(CheckResult::ok("Templates", &names.join(", ")));
        }
        Ok(_) => results.push(CheckResult::warning(
            "Templates",
            "none yet",
            "The default template is created on first use",
        )),
        Err(e) => results.push(CheckResult::error(
            "Templates",
            &e.to_string(),
            "Check permissions on the prompts directory",
        )),
    }

    results
}

fn check_dir(name: &str, path: &Path) -> CheckResult {
    if path.is_dir() {
        CheckResult::ok(name, &path.display().to_string())
    } else {
        CheckResult::warning(
            name,
            &format!("{} (will be created)", path.display()),
            "Directory will be created on first use",
        )
    }
}

/// Check if the config file in use exists.
fn check_config_file(explicit: Option<&PathBuf>) -> CheckResult {
    let config_path = explicit.cloned().unwrap_or_else(Settings::default_config_path);
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to override defaults", config_path.display()),
        )
    }
}

/// Platform-specific install hint for an audio player.
fn install_hint_player() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install mpv"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install mpv (or ffmpeg for ffplay)"
    } else {
        "Install mpv from https://mpv.io or ffmpeg from https://ffmpeg.org"
    }
}
