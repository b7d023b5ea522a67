use std::fs;

use anyhow::Result;

use super::HtmlView;
use crate::domain::models::AttachmentPreview;
use crate::domain::models::DisplayBlock;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::View;
use crate::domain::services::Transcript;

fn blocks() -> Vec<DisplayBlock> {
    return Transcript::render(&[
        Message::new_text(Role::Model, "Hello!"),
        Message::new_text(Role::User, "What should I plant?"),
    ]);
}

#[test]
fn it_writes_the_transcript_page() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("nested/transcript.html");
    let mut view = HtmlView::new(file_path.clone(), "Verde Garden Advisor");

    view.render(&blocks())?;
    view.scroll_to_latest()?;

    let page = fs::read_to_string(&file_path)?;
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>Verde Garden Advisor</title>"));
    assert!(page.contains(r#"<div class="chat-bubble model"><p>Hello!</p></div>"#));
    assert!(page.contains(
        r#"<div class="chat-bubble user" id="latest"><p>What should I plant?</p></div>"#
    ));

    return Ok(());
}

#[test]
fn it_only_anchors_after_scrolling() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut view = HtmlView::new(dir.path().join("transcript.html"), "Verde");

    view.render(&blocks())?;
    assert!(!view.page().contains(r#"id="latest""#));

    view.scroll_to_latest()?;
    assert_eq!(view.page().matches(r#"id="latest""#).count(), 1);

    return Ok(());
}

#[test]
fn it_shows_status_lines() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut view = HtmlView::new(dir.path().join("transcript.html"), "Verde");

    view.set_waiting(true)?;
    view.set_attachment_preview(Some(&AttachmentPreview {
        name: "<roof>.png".to_string(),
        media_type: "image/png".to_string(),
        size: 67,
    }))?;
    view.notice("Nothing to cancel.")?;

    let page = view.page();
    assert!(page.contains(r#"<div class="status">Typing...</div>"#));
    assert!(page.contains("Attached &lt;roof&gt;.png (image/png, 67 bytes)"));
    assert!(page.contains(r#"<div class="status">Nothing to cancel.</div>"#));

    view.set_waiting(false)?;
    view.set_attachment_preview(None)?;
    view.render(&blocks())?;

    let page = view.page();
    assert!(!page.contains(r#"class="status""#));

    return Ok(());
}
