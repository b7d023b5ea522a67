#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;

use std::io;
use std::io::Write;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use yansi::Paint;

use crate::domain::models::AttachmentPreview;
use crate::domain::models::DisplayBlock;
use crate::domain::models::Role;
use crate::domain::models::View;

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| return Regex::new(r"<br>").unwrap());
static BLOCK_END: Lazy<Regex> =
    Lazy::new(|| return Regex::new(r"</(?:p|ul|li|h[1-3])>").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| return Regex::new(r"<li>").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| return Regex::new(r"<img [^>]*>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| return Regex::new(r"<[^>]+>").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| return Regex::new(r"\n{2,}").unwrap());

/// Flattens rendered markup back into readable lines for a plain terminal.
pub fn plain_text(html: &str) -> String {
    let text = LINE_BREAK.replace_all(html, "\n");
    let text = LIST_ITEM.replace_all(&text, "  - ");
    let text = IMAGE.replace_all(&text, "[image]\n");
    let text = BLOCK_END.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");
    let text = BLANK_LINES.replace_all(&text, "\n");

    return text.trim().to_string();
}

/// Appends new transcript blocks to an output stream as they arrive.
pub struct TerminalView {
    out: Box<dyn Write + Send>,
    printed: usize,
    username: String,
    model_name: String,
}

impl TerminalView {
    pub fn new(out: Box<dyn Write + Send>, username: &str, model_name: &str) -> TerminalView {
        return TerminalView {
            out,
            printed: 0,
            username: username.to_string(),
            model_name: model_name.to_string(),
        };
    }

    pub fn stdout(username: &str, model_name: &str) -> TerminalView {
        return TerminalView::new(Box::new(io::stdout()), username, model_name);
    }

    fn label(&self, role: Role) -> String {
        if role == Role::User {
            return Paint::cyan(&self.username).bold().to_string();
        }

        return Paint::green(&self.model_name).bold().to_string();
    }
}

impl View for TerminalView {
    fn render(&mut self, blocks: &[DisplayBlock]) -> Result<()> {
        // History only shrinks on reset.
        if blocks.len() < self.printed {
            writeln!(self.out, "{}\n", Paint::new("--- new conversation ---").dimmed())?;
            self.printed = 0;
        }

        for block in &blocks[self.printed..] {
            writeln!(
                self.out,
                "{}\n{}\n",
                self.label(block.role),
                plain_text(&block.html)
            )?;
        }

        self.printed = blocks.len();
        return Ok(());
    }

    fn scroll_to_latest(&mut self) -> Result<()> {
        self.out.flush()?;
        return Ok(());
    }

    fn set_attachment_preview(&mut self, preview: Option<&AttachmentPreview>) -> Result<()> {
        if let Some(attachment) = preview {
            writeln!(
                self.out,
                "{}\n",
                Paint::magenta(format!(
                    "Attached {} ({}, {} bytes). It will be sent with your next message.",
                    attachment.name, attachment.media_type, attachment.size
                ))
            )?;
        }

        return Ok(());
    }

    fn set_waiting(&mut self, waiting: bool) -> Result<()> {
        if waiting {
            writeln!(
                self.out,
                "{}\n",
                Paint::new(format!("{} is typing...", self.model_name)).dimmed()
            )?;
        }

        return Ok(());
    }

    fn notice(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}\n", Paint::yellow(text))?;
        return Ok(());
    }
}
