use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use ai_gateway::{ChatGateway, Provider};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use kv_store::KeyValueStore;
use prompt_forge::{DiskFile, Field, FileSource};

use crate::app::{ChatPage, CodePage, NoticeSink};

#[derive(Parser, Debug)]
#[command(
    name = "prompt-forge",
    version,
    about = "Assemble instructions, a prompt and attachments into one document, with AI-assisted rewriting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the combined document.
    Generate {
        /// Instructions text, or `@path` to read it from a file. Defaults to the saved instructions.
        #[arg(long)]
        instructions: Option<String>,

        /// Task prompt text, or `@path` to read it from a file.
        #[arg(long)]
        prompt: Option<String>,

        /// Files to attach, in order.
        files: Vec<PathBuf>,
    },
    /// Rewrite instructions or a prompt with an AI provider.
    Enhance {
        /// Field to enhance: `instructions` or `prompt`.
        field: Field,

        /// Provider to use: `claude` or `gpt`.
        #[arg(long, default_value = "claude")]
        provider: Provider,

        /// Text to enhance, or `@path` to read it from a file.
        text: String,
    },
    /// Manage the saved system instructions.
    Instructions {
        #[command(subcommand)]
        action: InstructionsCommand,
    },
    /// Iteratively optimize free text with version history.
    Chat {
        #[command(subcommand)]
        action: ChatCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum InstructionsCommand {
    /// Print the saved instructions.
    Show,
    /// Replace the saved instructions.
    Set {
        /// Instructions text, or `@path` to read it from a file.
        text: String,
    },
    /// Wipe the saved instructions.
    Clear,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Optimize text and record it in the history.
    Optimize {
        #[arg(long, default_value = "claude")]
        provider: Provider,

        /// Text to optimize, or `@path` to read it from a file.
        text: String,
    },
    /// Step back one version from the latest.
    Undo,
    /// Print the version with the given 1-based number.
    Restore { number: NonZeroUsize },
    /// List recorded versions, newest first.
    History,
    /// Delete every recorded version.
    Clear,
}

/// Services a command needs, resolved once at startup.
pub struct Services {
    pub gateway: Arc<dyn ChatGateway>,
    pub store: Arc<dyn KeyValueStore>,
}

/// Runs `command`, writing results to `out` and notices to `sink`.
///
/// Failures already reported through `sink` are returned as [`prompt_forge::ForgeError`].
pub fn execute(
    command: Command,
    services: &Services,
    out: &mut dyn Write,
    sink: &mut dyn NoticeSink,
) -> anyhow::Result<()> {
    match command {
        Command::Generate {
            instructions,
            prompt,
            files,
        } => {
            let mut page = code_page(services);
            if let Some(instructions) = instructions {
                page.set_text(Field::Instructions, resolve_text(&instructions)?);
            }
            if let Some(prompt) = prompt {
                page.set_text(Field::Prompt, resolve_text(&prompt)?);
            }
            for path in files {
                let file = DiskFile::open(&path)
                    .with_context(|| format!("failed to open attachment {}", path.display()))?;
                page.add_files([Arc::new(file) as Arc<dyn FileSource>]);
            }

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to initialize tokio runtime")?;
            let document = runtime.block_on(page.generate());
            writeln!(out, "{document}")?;
        }
        Command::Enhance {
            field,
            provider,
            text,
        } => {
            let mut page = code_page(services);
            page.set_text(field, resolve_text(&text)?);
            page.enhance(field, provider, sink)?;
            writeln!(out, "{}", page.text(field))?;
        }
        Command::Instructions { action } => {
            let mut page = code_page(services);
            match action {
                InstructionsCommand::Show => writeln!(out, "{}", page.instructions())?,
                InstructionsCommand::Set { text } => {
                    page.set_text(Field::Instructions, resolve_text(&text)?);
                    page.save_instructions();
                }
                InstructionsCommand::Clear => page.clear_instructions(),
            }
        }
        Command::Chat { action } => {
            let mut page = ChatPage::new(Arc::clone(&services.gateway), Arc::clone(&services.store));
            match action {
                ChatCommand::Optimize { provider, text } => {
                    page.set_input(resolve_text(&text)?);
                    let optimized = page.optimize(provider, sink)?;
                    writeln!(out, "{optimized}")?;
                }
                ChatCommand::Undo => {
                    let previous = page.undo(sink)?;
                    writeln!(out, "{previous}")?;
                }
                ChatCommand::Restore { number } => {
                    let version = page.restore(number.get() - 1, sink)?;
                    writeln!(out, "{version}")?;
                }
                ChatCommand::History => {
                    for entry in page.versions() {
                        let marker = if entry.is_current { '*' } else { ' ' };
                        let preview = entry.preview.replace('\n', " ");
                        writeln!(out, "{marker} {}: {preview}", entry.label())?;
                    }
                }
                ChatCommand::Clear => page.clear_history(sink),
            }
        }
    }

    Ok(())
}

fn code_page(services: &Services) -> CodePage {
    CodePage::new(Arc::clone(&services.gateway), Arc::clone(&services.store))
}

/// Returns `arg` itself, or the contents of the file named after a leading `@`.
pub fn resolve_text(arg: &str) -> anyhow::Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read text from {path}")),
        None => Ok(arg.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_enhance_with_provider() {
        let cli = Cli::try_parse_from(["prompt-forge", "enhance", "prompt", "--provider", "GPT", "fix it"])
            .expect("arguments should parse");

        assert_eq!(
            cli.command,
            Command::Enhance {
                field: Field::Prompt,
                provider: Provider::Gpt,
                text: "fix it".to_string(),
            }
        );
    }

    #[test]
    fn cli_parses_generate_files_in_order() {
        let cli = Cli::try_parse_from(["prompt-forge", "generate", "--prompt", "task", "b.rs", "a.rs"])
            .expect("arguments should parse");

        assert_eq!(
            cli.command,
            Command::Generate {
                instructions: None,
                prompt: Some("task".to_string()),
                files: vec![PathBuf::from("b.rs"), PathBuf::from("a.rs")],
            }
        );
    }

    #[test]
    fn cli_rejects_unknown_provider_and_zero_restore() {
        assert!(Cli::try_parse_from(["prompt-forge", "chat", "optimize", "--provider", "gemini", "x"]).is_err());
        assert!(Cli::try_parse_from(["prompt-forge", "chat", "restore", "0"]).is_err());
    }

    #[test]
    fn resolve_text_reads_at_prefixed_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "from file").expect("write");

        assert_eq!(resolve_text("inline").expect("inline"), "inline");
        assert_eq!(
            resolve_text(&format!("@{}", path.display())).expect("file"),
            "from file"
        );
        assert!(resolve_text("@/definitely/missing/file").is_err());
    }
}
