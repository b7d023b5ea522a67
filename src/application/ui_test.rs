use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;

use super::read_input;
use crate::domain::models::Event;

#[tokio::test]
async fn it_forwards_lines_then_closes() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let input: &'static [u8] = b"What should I plant?\n/quit\n";

    read_input(input, tx).await??;

    match rx.recv().await {
        Some(Event::UserInput(text)) => assert_eq!(text, "What should I plant?"),
        _ => bail!("Wrong enum"),
    }
    match rx.recv().await {
        Some(Event::UserInput(text)) => assert_eq!(text, "/quit"),
        _ => bail!("Wrong enum"),
    }
    assert!(matches!(rx.recv().await, Some(Event::UserInputClosed())));
    assert!(rx.recv().await.is_none());

    return Ok(());
}

#[tokio::test]
async fn it_closes_input_on_unreadable_lines() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let input: &'static [u8] = b"What should I plant?\n\xff\xfe balcony\nNever read\n";

    read_input(input, tx).await??;

    match rx.recv().await {
        Some(Event::UserInput(text)) => assert_eq!(text, "What should I plant?"),
        _ => bail!("Wrong enum"),
    }
    assert!(matches!(rx.recv().await, Some(Event::UserInputClosed())));
    assert!(rx.recv().await.is_none());

    return Ok(());
}
