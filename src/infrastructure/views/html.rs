#[cfg(test)]
#[path = "html_test.rs"]
mod tests;

use std::fs;
use std::path;

use anyhow::Result;

use crate::domain::models::AttachmentPreview;
use crate::domain::models::DisplayBlock;
use crate::domain::models::View;

const STYLE: &str = r#"
body { font-family: sans-serif; background: #f4f7f2; margin: 0; padding: 1rem; }
#chat-window { max-width: 48rem; margin: 0 auto; display: flex; flex-direction: column; gap: 0.75rem; }
.chat-bubble { padding: 0.75rem 1rem; border-radius: 1rem; max-width: 80%; line-height: 1.4; }
.chat-bubble.model { background: #ffffff; align-self: flex-start; }
.chat-bubble.user { background: #2e7d32; color: #ffffff; align-self: flex-end; }
.chat-bubble img { max-width: 100%; border-radius: 0.5rem; }
.status { max-width: 48rem; margin: 0.75rem auto; color: #555555; font-style: italic; }
"#;

fn escape(text: &str) -> String {
    return text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
}

/// Keeps a self contained HTML page of the transcript on disk, rewritten on
/// every change. The page reloads itself, so a browser tab follows along.
pub struct HtmlView {
    file_path: path::PathBuf,
    title: String,
    blocks: Vec<DisplayBlock>,
    anchor_latest: bool,
    waiting: bool,
    preview: Option<AttachmentPreview>,
    notice: Option<String>,
}

impl HtmlView {
    pub fn new(file_path: path::PathBuf, title: &str) -> HtmlView {
        return HtmlView {
            file_path,
            title: title.to_string(),
            blocks: vec![],
            anchor_latest: false,
            waiting: false,
            preview: None,
            notice: None,
        };
    }

    pub fn page(&self) -> String {
        let last = self.blocks.len().saturating_sub(1);
        let bubbles = self
            .blocks
            .iter()
            .enumerate()
            .map(|(idx, block)| {
                let mut id = "".to_string();
                if self.anchor_latest && idx == last {
                    id = r#" id="latest""#.to_string();
                }
                return format!(
                    r#"<div class="chat-bubble {}"{id}>{}</div>"#,
                    block.role, block.html
                );
            })
            .collect::<Vec<String>>()
            .join("\n");

        let mut status = vec![];
        if self.waiting {
            status.push(r#"<div class="status">Typing...</div>"#.to_string());
        }
        if let Some(preview) = &self.preview {
            status.push(format!(
                r#"<div class="status">Attached {} ({}, {} bytes)</div>"#,
                escape(&preview.name),
                preview.media_type,
                preview.size
            ));
        }
        if let Some(notice) = &self.notice {
            status.push(format!(r#"<div class="status">{}</div>"#, escape(notice)));
        }

        return format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="2">
<title>{}</title>
<style>{STYLE}</style>
</head>
<body>
<main id="chat-window">
{bubbles}
</main>
{}
<script>document.getElementById("latest")?.scrollIntoView();</script>
</body>
</html>
"#,
            escape(&self.title),
            status.join("\n")
        );
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.file_path, self.page())?;
        return Ok(());
    }
}

impl View for HtmlView {
    fn render(&mut self, blocks: &[DisplayBlock]) -> Result<()> {
        self.blocks = blocks.to_vec();
        self.anchor_latest = false;
        self.notice = None;
        return self.write();
    }

    fn scroll_to_latest(&mut self) -> Result<()> {
        self.anchor_latest = true;
        return self.write();
    }

    fn set_attachment_preview(&mut self, preview: Option<&AttachmentPreview>) -> Result<()> {
        self.preview = preview.cloned();
        return self.write();
    }

    fn set_waiting(&mut self, waiting: bool) -> Result<()> {
        self.waiting = waiting;
        return self.write();
    }

    fn notice(&mut self, text: &str) -> Result<()> {
        self.notice = Some(text.to_string());
        return self.write();
    }
}
