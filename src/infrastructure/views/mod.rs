pub mod html;
pub mod terminal;

use std::path;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::ViewBox;
use crate::domain::models::ViewName;

pub struct ViewManager {}

impl ViewManager {
    /// `username` labels the user's messages in the terminal, `title` heads the
    /// HTML page written to `transcript_file`.
    pub fn get(
        name: ViewName,
        title: &str,
        username: &str,
        transcript_file: &str,
    ) -> Result<ViewBox> {
        match name {
            ViewName::Terminal => {
                return Ok(Box::new(terminal::TerminalView::stdout(username, "Verde")));
            }
            ViewName::Html => {
                if transcript_file.is_empty() {
                    bail!("transcript-file must be set to use the html view");
                }
                return Ok(Box::new(html::HtmlView::new(
                    path::PathBuf::from(transcript_file),
                    title,
                )));
            }
        }
    }
}
