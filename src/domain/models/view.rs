use anyhow::Result;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::AttachmentPreview;
use super::DisplayBlock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ViewName {
    Terminal,
    Html,
}

impl ViewName {
    pub fn parse(text: &str) -> Option<ViewName> {
        return ViewName::iter().find(|e| return e.to_string() == text);
    }
}

/// Display side of a chat. Every history change triggers a full `render`
/// followed by `scroll_to_latest`.
pub trait View {
    /// Receives the whole transcript every time history changes.
    fn render(&mut self, blocks: &[DisplayBlock]) -> Result<()>;

    /// Brings the most recent block into sight.
    fn scroll_to_latest(&mut self) -> Result<()>;

    /// `None` hides the preview.
    fn set_attachment_preview(&mut self, preview: Option<&AttachmentPreview>) -> Result<()>;

    /// Typing indicator while a completion is in flight.
    fn set_waiting(&mut self, waiting: bool) -> Result<()>;

    /// Out of band messages such as validation errors. Never part of history.
    fn notice(&mut self, text: &str) -> Result<()>;
}

pub type ViewBox = Box<dyn View + Send>;
