//! Parsing of interactive input lines

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use conversation::ImageAttachment;

/// One line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Plain text sent to the model
    Prompt(String),
    /// Attach an image to the next prompt
    Image(PathBuf),
    /// Print the current artifact
    Code,
    /// Write the current artifact as a zip archive
    Export(PathBuf),
    /// Write the current artifact as a standalone HTML file
    Preview(PathBuf),
    /// Send the Supabase integration preset
    Database,
    /// Switch to another backend
    Backend(String),
    /// List available backends
    Backends,
    Clear,
    Help,
    Quit,
    /// Unrecognized slash command or missing argument
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  /image <path>     attach an image to the next prompt
  /code             print the current html, css and javascript
  /export <path>    write the current site as a zip archive
  /preview <path>   write the current site as a standalone html file
  /database         ask for a Supabase backend integration
  /backend <name>   switch generation backend
  /backends         list available backends
  /clear            start a new conversation
  /quit             exit
Anything else is sent to the model. With an image attached, an empty line
sends the image on its own. Ctrl-C cancels a pending request, or exits at
the prompt.";

/// Parse one input line.
///
/// A blank line yields `None`, unless an image is waiting to be sent, in
/// which case it becomes an empty prompt carrying just the image.
pub fn parse(line: &str, image_pending: bool) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return image_pending.then(|| Command::Prompt(String::new()));
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Prompt(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match (name, arg.is_empty()) {
        ("image", false) => Command::Image(PathBuf::from(arg)),
        ("export", false) => Command::Export(PathBuf::from(arg)),
        ("preview", false) => Command::Preview(PathBuf::from(arg)),
        ("backend", false) => Command::Backend(arg.to_string()),
        ("image" | "export" | "preview" | "backend", true) => {
            Command::Invalid(format!("/{} needs an argument", name))
        }
        ("code", _) => Command::Code,
        ("database", _) => Command::Database,
        ("backends", _) => Command::Backends,
        ("clear", _) => Command::Clear,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => Command::Invalid(format!("Unknown command: /{}", name)),
    };
    Some(command)
}

/// Read an image file, guessing its media type from the extension
pub async fn load_image(path: &Path) -> anyhow::Result<ImageAttachment> {
    let media_type = mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string());

    let Some(media_type) = media_type else {
        bail!("{} does not look like an image", path.display());
    };

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    log::debug!("Attached {} ({}, {} bytes)", path.display(), media_type, data.len());
    Ok(ImageAttachment::new(media_type, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_prompt() {
        assert_eq!(
            parse("  a pricing page  ", false),
            Some(Command::Prompt("a pricing page".to_string()))
        );
        assert_eq!(parse("   ", false), None);
    }

    #[test]
    fn test_blank_line_sends_pending_image() {
        assert_eq!(parse("", true), Some(Command::Prompt(String::new())));
        assert_eq!(parse("  ", true), Some(Command::Prompt(String::new())));
        assert_eq!(
            parse("hero section", true),
            Some(Command::Prompt("hero section".to_string()))
        );
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            parse("/image shots/hero.png", false),
            Some(Command::Image(PathBuf::from("shots/hero.png")))
        );
        assert_eq!(
            parse("/backend openai-compat", false),
            Some(Command::Backend("openai-compat".to_string()))
        );
        assert_eq!(
            parse("/export  out/site.zip ", false),
            Some(Command::Export(PathBuf::from("out/site.zip")))
        );
        assert!(matches!(parse("/preview", false), Some(Command::Invalid(_))));
    }

    #[test]
    fn test_bare_commands() {
        assert_eq!(parse("/code", false), Some(Command::Code));
        assert_eq!(parse("/database", false), Some(Command::Database));
        assert_eq!(parse("/exit", false), Some(Command::Quit));
        assert!(matches!(parse("/deploy", false), Some(Command::Invalid(_))));
    }

    #[tokio::test]
    async fn test_load_image() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        let png = dir.join("logo.png");
        tokio::fs::write(&png, [137u8, 80, 78, 71]).await.unwrap();
        let image = load_image(&png).await.unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.data, vec![137, 80, 78, 71]);

        let text = dir.join("notes.txt");
        tokio::fs::write(&text, "hi").await.unwrap();
        assert!(load_image(&text).await.is_err());

        assert!(load_image(&dir.join("missing.jpg")).await.is_err());
    }
}
