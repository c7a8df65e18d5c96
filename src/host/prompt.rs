use anyhow::{Context, Result};
use std::fs;
use std::process::Command;
use uuid::Uuid;

/// Offers a resolved command to the user for a final edit.
///
/// `Ok(None)` means the user backed out.
pub trait CommandPrompt {
    fn edit(&mut self, resolved: &str) -> Result<Option<String>>;
}

/// Accepts every command unchanged; used where no user is attached
#[derive(Debug, Default)]
pub struct AcceptPrompt;

impl CommandPrompt for AcceptPrompt {
    fn edit(&mut self, resolved: &str) -> Result<Option<String>> {
        Ok(Some(resolved.to_string()))
    }
}

/// Declines every edit. For the stdio host, where stdin carries protocol
/// traffic and nobody can confirm a command.
#[derive(Debug, Default)]
pub struct DeclinePrompt;

impl CommandPrompt for DeclinePrompt {
    fn edit(&mut self, resolved: &str) -> Result<Option<String>> {
        tracing::warn!(
            "Not running `{}`: it asks for confirmation and no prompt is attached",
            resolved
        );
        Ok(None)
    }
}

/// Opens the command in a text editor and reads back what was saved
#[derive(Debug, Default)]
pub struct EditorPrompt {
    editor: Option<String>,
}

impl EditorPrompt {
    pub fn new(editor: Option<String>) -> Self {
        Self { editor }
    }

    fn candidates(&self) -> Vec<String> {
        let mut editors = Vec::new();
        if let Some(editor) = &self.editor {
            editors.push(editor.clone());
        }
        if let Ok(editor) = std::env::var("EDITOR") {
            if !editor.trim().is_empty() {
                editors.push(editor);
            }
        }
        editors.extend(["nvim", "vim", "nano"].map(String::from));
        editors
    }
}

impl CommandPrompt for EditorPrompt {
    fn edit(&mut self, resolved: &str) -> Result<Option<String>> {
        let file_path = std::env::temp_dir().join(format!("termsnip-{}.sh", Uuid::new_v4()));
        fs::write(&file_path, format!("{}\n", resolved))
            .context("Failed to write command for editing")?;

        let mut status = None;
        for editor in self.candidates() {
            if let Ok(mut child) = Command::new(&editor).arg(&file_path).spawn() {
                if let Ok(exit) = child.wait() {
                    status = Some(exit);
                    break;
                }
            }
        }

        let edited = fs::read_to_string(&file_path);
        let _ = fs::remove_file(&file_path);

        let Some(status) = status else {
            anyhow::bail!("Could not launch any editor (nvim, vim, nano)");
        };
        // `:cq` and friends abort the run
        if !status.success() {
            tracing::info!("Editor exited with {}; command not run", status);
            return Ok(None);
        }

        let edited = edited.context("Failed to read edited command")?;
        let command = edited.trim();
        if command.is_empty() {
            Ok(None)
        } else {
            Ok(Some(command.to_string()))
        }
    }
}
