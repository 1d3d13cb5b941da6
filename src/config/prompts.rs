//! Prompt templates for Recap.
//!
//! Templates are plain text files in the prompts directory, one per name
//! (`prompts/<name>.txt`), with a single `{transcript}` placeholder.

use crate::error::{RecapError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Name used when no template is requested.
pub const DEFAULT_TEMPLATE_NAME: &str = "default";

/// Token replaced with the transcript text.
pub const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

const DEFAULT_TEMPLATE: &str = r#"Please provide a comprehensive summary of the following YouTube video transcript.

Include:
1. Main topics and key points
2. Important insights or conclusions
3. Any actionable information
4. Overall theme and purpose

Transcript:
{transcript}"#;

/// A named prompt template loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub name: String,
    pub body: String,
}

impl PromptTemplate {
    /// Load the template `name` from `dir`.
    ///
    /// An empty name falls back to the default template. The default template
    /// is written to disk on first use; any other missing template is an error.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let name = match name.trim() {
            "" => DEFAULT_TEMPLATE_NAME,
            n => n,
        };

        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(RecapError::InvalidInput(format!(
                "Template name '{}' must be a plain file name",
                name
            )));
        }

        let path = Self::path_for(dir, name);

        if !path.exists() {
            if name != DEFAULT_TEMPLATE_NAME {
                return Err(RecapError::TemplateNotFound {
                    name: name.to_string(),
                    path: path.display().to_string(),
                });
            }
            std::fs::create_dir_all(dir)?;
            std::fs::write(&path, DEFAULT_TEMPLATE)?;
            info!("Created default prompt template at {}", path.display());
        }

        let body = std::fs::read_to_string(&path)?;
        Ok(Self {
            name: name.to_string(),
            body,
        })
    }

    /// Path of the template file for `name`.
    pub fn path_for(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{}.txt", name))
    }

    /// Substitute the transcript into the placeholder.
    ///
    /// A template without the placeholder gets the transcript appended.
    pub fn render(&self, transcript: &str) -> String {
        if self.body.contains(TRANSCRIPT_PLACEHOLDER) {
            self.body.replacen(TRANSCRIPT_PLACEHOLDER, transcript, 1)
        } else {
            format!("{}\n\n{}", self.body.trim_end(), transcript)
        }
    }

    /// List template names available in `dir`, sorted.
    pub fn available(dir: &Path) -> Result<Vec<String>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = std::fs::read_dir(dir)?
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("txt") {
                    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_is_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let prompts = dir.path().join("prompts");

        let template = PromptTemplate::load(&prompts, "").unwrap();
        assert_eq!(template.name, DEFAULT_TEMPLATE_NAME);
        assert!(template.body.contains(TRANSCRIPT_PLACEHOLDER));
        assert!(prompts.join("default.txt").exists());
    }

    #[test]
    fn test_missing_named_template_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PromptTemplate::load(dir.path(), "compact").unwrap_err();
        assert!(matches!(err, RecapError::TemplateNotFound { ref name, .. } if name == "compact"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_render_single_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("compact.txt"),
            "Summarize briefly:\n{transcript}\nEnd.",
        )
        .unwrap();

        let template = PromptTemplate::load(dir.path(), "compact").unwrap();
        assert_eq!(
            template.render("hello world"),
            "Summarize briefly:\nhello world\nEnd."
        );
    }

    #[test]
    fn test_render_only_first_placeholder() {
        let template = PromptTemplate {
            name: "t".into(),
            body: "{transcript} and {transcript}".into(),
        };
        assert_eq!(template.render("x"), "x and {transcript}");
    }

    #[test]
    fn test_render_without_placeholder_appends() {
        let template = PromptTemplate {
            name: "t".into(),
            body: "Summarize this:\n".into(),
        };
        assert_eq!(template.render("text"), "Summarize this:\n\ntext");
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PromptTemplate::load(dir.path(), "../secret"),
            Err(RecapError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_available_lists_txt_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "{transcript}").unwrap();
        std::fs::write(dir.path().join("a.txt"), "{transcript}").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        assert_eq!(PromptTemplate::available(dir.path()).unwrap(), vec!["a", "b"]);
    }
}
