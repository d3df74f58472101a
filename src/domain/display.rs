//! Plain-text summaries of catalog entities for terminals and logs.

use std::fmt::Write;

use crate::models::review::{Comment, Review};
use crate::models::title::Title;

pub const DEFAULT_WRAP_WIDTH: usize = 80;

const NONE: &str = "None";

/// Greedy word wrap. Existing line breaks are kept; a word longer than
/// `width` gets a line of its own rather than being split.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }

    lines.join("\n")
}

fn or_none<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NONE.to_string(), |v| v.to_string())
}

#[must_use]
pub fn render_title(title: &Title, width: usize) -> String {
    let description = title.description.as_deref().map(|d| wrap_text(d, width));
    let category = title.category.as_ref().map(|c| c.name.as_str());
    let genre = (!title.genres.is_empty()).then(|| title.genre_names());

    let mut out = String::new();
    let _ = writeln!(out, "id: {}", title.id);
    let _ = writeln!(out, "Name: {}", title.name);
    let _ = writeln!(out, "Year: {}", or_none(title.year));
    let _ = writeln!(out, "Description: {}", or_none(description));
    let _ = writeln!(out, "Category: {}", or_none(category));
    let _ = writeln!(out, "Genre: {}", or_none(genre));
    out.push('\n');
    out
}

#[must_use]
pub fn render_review(review: &Review, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "id: {}", review.id);
    let _ = writeln!(out, "Author: {}", review.author);
    let _ = writeln!(out, "Date: {}", review.pub_date);
    let _ = writeln!(out, "Title: {}", review.title_name);
    let _ = writeln!(out, "Score: {}", review.score);
    let _ = writeln!(out, "Text: {}", wrap_text(&review.text, width));
    out.push('\n');
    out
}

#[must_use]
pub fn render_comment(comment: &Comment, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "id: {}", comment.id);
    let _ = writeln!(out, "Author: {}", comment.author);
    let _ = writeln!(out, "Date: {}", comment.pub_date);
    let _ = writeln!(out, "Review: {}", comment.review_id);
    let _ = writeln!(out, "Text: {}", wrap_text(&comment.text, width));
    out.push('\n');
    out
}
