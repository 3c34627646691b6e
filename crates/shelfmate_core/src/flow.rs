//! crates/shelfmate_core/src/flow.rs
//!
//! The recommendation conversation: how a page action is decided, how the
//! prompt is assembled from the user's selections and reactions, and how the
//! transcript grows.

use crate::domain::{BookSelections, Reaction};

const FORMAT_INSTRUCTION: &str = "\nPlease provide exactly one book recommendation with an interesting description of 3-4 sentences in the following format, with each detail on a new line:\nTitle: [title]\nAuthor: [author]\nDescription: [Description].";

const MARKETPLACE_SEARCH_URL: &str = "https://www.amazon.com/s?k=";

/// What the recommendation page was asked to do, taken from `button_text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    Idle,
    Submit,
    Clear,
}

impl FlowAction {
    pub fn from_button_text(text: Option<&str>) -> Self {
        match text {
            Some("submit") => FlowAction::Submit,
            Some("clear") => FlowAction::Clear,
            _ => FlowAction::Idle,
        }
    }
}

fn format_books(books: &[Reaction]) -> String {
    books
        .iter()
        .map(|book| format!("Title: {}\nAuthor: {}", book.book_title, book.book_author))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the user message sent to the model.
pub fn build_user_input(selections: &BookSelections, liked: &[Reaction], disliked: &[Reaction]) -> String {
    let mut user_input = format!(
        "Selected genres: {}; Selected preferences: {}.",
        selections.genres.join(", "),
        selections.preferences.join(", ")
    );

    if !liked.is_empty() {
        user_input.push_str("\nMy Liked books are:\n");
        user_input.push_str(&format_books(liked));
    }
    if !disliked.is_empty() {
        user_input.push_str("\nMy Disliked books are:\n");
        user_input.push_str(&format_books(disliked));
    }

    user_input.push_str(FORMAT_INSTRUCTION);
    user_input
}

/// Builds the system message that frames every request.
pub fn build_system_instruction(genres: &[String], preferences: &[String], chat_history: &str) -> String {
    format!(
        "a book recommendation that keeps giving of recommendations without fail. do not say anything else besides the recommendation in the format asked, take into consideration the selected genres, preferences and liked and disliked books. Selected genres: {}; Selected preferences: {}. Conversation history: {}",
        genres.join(", "),
        preferences.join(", "),
        chat_history
    )
}

/// Appends one exchange to the transcript.
pub fn append_exchange(chat_history: &mut String, user_input: &str, reply: &str) {
    chat_history.push_str("\nUser: ");
    chat_history.push_str(user_input);
    chat_history.push('\n');
    chat_history.push_str(reply);
    chat_history.push('\n');
}

/// Escapes the transcript for HTML and turns newlines into `<br>`.
pub fn transcript_to_html(chat_history: &str) -> String {
    escape_html(chat_history).replace('\n', "<br>")
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A book pulled out of a model reply in the "Title/Author/Description" format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSuggestion {
    pub title: String,
    pub author: String,
}

/// Finds the `Title:` and `Author:` lines of a reply.
pub fn parse_suggestion(reply: &str) -> Option<BookSuggestion> {
    let mut title = None;
    let mut author = None;

    for line in reply.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Title:") {
            title.get_or_insert_with(|| rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Author:") {
            author.get_or_insert_with(|| rest.trim().to_string());
        }
    }

    match (title, author) {
        (Some(title), Some(author)) if !title.is_empty() && !author.is_empty() => {
            Some(BookSuggestion { title, author })
        }
        _ => None,
    }
}

/// Marketplace search link for a book, as shown in the cart.
pub fn marketplace_search_url(book_title: &str, book_author: &str) -> String {
    let query = format!("{} {}", book_title, book_author).replace(' ', "+");
    format!("{}{}", MARKETPLACE_SEARCH_URL, query)
}
