//! $EDITOR round trip and confirmation prompts

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Open `initial_content` in the user's editor and return what was saved
pub fn edit_text(initial_content: &str) -> Result<String> {
    let editor = find_editor()?;
    edit_with(&editor, initial_content)
}

/// Run `editor` on a private temp file seeded with `initial_content`
///
/// The file is created exclusively and removed on drop, including on error.
/// `editor` may carry arguments, e.g. `code --wait`.
fn edit_with(editor: &str, initial_content: &str) -> Result<String> {
    let mut draft = tempfile::Builder::new()
        .prefix("jotter_edit_")
        .suffix(".html")
        .tempfile()
        .context("Failed to create temp file for editing")?;
    draft
        .write_all(initial_content.as_bytes())
        .with_context(|| format!("Failed to write temp file: {:?}", draft.path()))?;
    draft.flush()?;

    run_editor(editor, draft.path())?;

    // Editors that save by rename leave the open handle stale
    fs::read_to_string(draft.path())
        .with_context(|| format!("Failed to read edited file: {:?}", draft.path()))
}

fn run_editor(editor: &str, path: &Path) -> Result<()> {
    let mut words = editor.split_whitespace();
    let Some(program) = words.next() else {
        bail!("Editor command is empty");
    };

    let status = Command::new(program)
        .args(words)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        bail!("Editor '{}' exited with {}. Nothing was changed.", editor, status);
    }
    Ok(())
}

/// $VISUAL, then $EDITOR, then the first common editor on PATH
fn find_editor() -> Result<String> {
    let configured = ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty());
    if let Some(editor) = configured {
        return Ok(editor);
    }

    ["nano", "vim", "vi", "emacs", "notepad"]
        .into_iter()
        .find(|candidate| on_path(candidate))
        .map(str::to_string)
        .context("No editor found. Set $EDITOR, e.g. `export EDITOR=nano`")
}

fn on_path(program: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| {
            env::split_paths(&paths).any(|dir| {
                let candidate = dir.join(program);
                candidate.is_file() || candidate.with_extension("exe").is_file()
            })
        })
        .unwrap_or(false)
}

/// Ask a yes/no question; without a terminal on stdin the answer is no
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
