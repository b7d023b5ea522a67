#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::ContentPart;
use crate::domain::models::DisplayBlock;
use crate::domain::models::ImageData;
use crate::domain::models::Message;

static BOLD: Lazy<Regex> = Lazy::new(|| return Regex::new(r"\*\*(.+?)\*\*").unwrap());
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| return Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| return Regex::new(r"`([^`]+)`").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| return Regex::new(r"^(#{1,3})\s+(.*)$").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| return Regex::new(r"^\s*[*-]\s+(.*)$").unwrap());

enum Line<'a> {
    Blank,
    Heading(usize, &'a str),
    ListItem(&'a str),
    Text(&'a str),
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Line<'a> {
        if line.trim().is_empty() {
            return Line::Blank;
        }

        if let Some(caps) = HEADING.captures(line) {
            let level = caps.get(1).map_or(1, |e| return e.as_str().len());
            let content = caps.get(2).map_or("", |e| return e.as_str());
            return Line::Heading(level, content);
        }

        if let Some(caps) = LIST_ITEM.captures(line) {
            return Line::ListItem(caps.get(1).map_or("", |e| return e.as_str()));
        }

        return Line::Text(line);
    }
}

/// Open block while assembling a text part.
#[derive(PartialEq, Eq)]
enum Open {
    Nothing,
    Paragraph,
    List,
}

fn close(html: &mut String, open: &mut Open) {
    match open {
        Open::Paragraph => html.push_str("</p>"),
        Open::List => html.push_str("</ul>"),
        Open::Nothing => (),
    }
    *open = Open::Nothing;
}

/// Bold, then emphasis, then inline code. Bold has to run first so `**` is
/// never read as two emphasis markers.
fn inline(text: &str) -> String {
    let text = BOLD.replace_all(text, "<strong>$1</strong>");
    let text = EMPHASIS.replace_all(&text, "<em>$1</em>");
    let text = INLINE_CODE.replace_all(&text, "<code>$1</code>");

    return text.to_string();
}

pub struct Transcript {}

impl Transcript {
    /// One block per displayable message, in history order. Holds no state,
    /// so rendering the same history twice gives the same blocks.
    pub fn render(history: &[Message]) -> Vec<DisplayBlock> {
        return history
            .iter()
            .filter(|message| return message.role.is_conversational())
            .map(|message| {
                let html = message
                    .parts()
                    .iter()
                    .map(|part| match part {
                        ContentPart::Text(text) => return Transcript::render_text(text),
                        ContentPart::Image(image) => return Transcript::render_image(image),
                    })
                    .collect::<Vec<String>>()
                    .join("");

                return DisplayBlock {
                    role: message.role,
                    html,
                };
            })
            .collect();
    }

    /// Lightweight markdown to HTML. Content is not escaped: it comes from the
    /// user or the model and is trusted as is.
    ///
    /// Consecutive plain lines share a paragraph and are separated with
    /// `<br>`, blank lines end a paragraph, `#` to `###` become headings and
    /// `*` or `-` bullets are gathered into a single `<ul>`. Lists and headings
    /// are never nested inside a paragraph.
    pub fn render_text(text: &str) -> String {
        let mut html = String::new();
        let mut open = Open::Nothing;

        for raw_line in text.split('\n') {
            let line = raw_line.trim_end_matches('\r');

            match Line::classify(line) {
                Line::Blank => {
                    close(&mut html, &mut open);
                }
                Line::Heading(level, content) => {
                    close(&mut html, &mut open);
                    html.push_str(&format!("<h{level}>{}</h{level}>", inline(content)));
                }
                Line::ListItem(content) => {
                    if open != Open::List {
                        close(&mut html, &mut open);
                        html.push_str("<ul>");
                        open = Open::List;
                    }
                    html.push_str(&format!("<li>{}</li>", inline(content)));
                }
                Line::Text(content) => {
                    if open == Open::Paragraph {
                        html.push_str("<br>");
                    } else {
                        close(&mut html, &mut open);
                        html.push_str("<p>");
                        open = Open::Paragraph;
                    }
                    html.push_str(&inline(content));
                }
            }
        }

        close(&mut html, &mut open);
        return html;
    }

    pub fn render_image(image: &ImageData) -> String {
        return format!(r#"<img src="{}" alt="attachment">"#, image.data_uri());
    }
}
