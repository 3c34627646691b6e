//! services/api/src/web/views.rs
//!
//! Server-rendered HTML pages. Every value taken from users or the model is
//! escaped before it is written into markup.

use shelfmate_core::domain::{BookSelections, Genre, Reaction};
use shelfmate_core::flow::{escape_html, marketplace_search_url, transcript_to_html, BookSuggestion};

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 860px; margin: 0 auto; padding: 1rem; }
nav a { margin-right: 1rem; }
.error { color: #b00020; }
.transcript { border: 1px solid #ccc; padding: 1rem; margin: 1rem 0; }
ul.books li { margin-bottom: .5rem; }
"#;

// Posts a form with fetch so the JSON endpoints never replace the page.
// Callers cancel the native submit themselves; a signed-out reply is HTML, not JSON.
const REACTION_SCRIPT: &str = r#"
<script>
function postForm(form, onDone) {
  fetch(form.action, { method: 'POST', body: new URLSearchParams(new FormData(form)) })
    .then(function (response) {
      const type = response.headers.get('content-type') || '';
      if (!type.includes('application/json')) { return { status: 'error' }; }
      return response.json();
    })
    .then(function (body) { onDone(form, body.status); })
    .catch(function () { onDone(form, 'error'); });
}
function showStatus(form, status) {
  form.querySelector('.status').textContent = status === 'success' ? 'Saved' : 'Failed';
}
function removeRow(form, status) {
  if (status === 'success') { form.closest('li').remove(); }
}
</script>
"#;

/// Which links the page header offers.
#[derive(Clone, Copy)]
enum Nav {
    Guest,
    Member,
    /// Used where the login state is unknown.
    HomeOnly,
}

impl Nav {
    fn for_login(logged_in: bool) -> Self {
        if logged_in {
            Nav::Member
        } else {
            Nav::Guest
        }
    }

    fn links(self) -> &'static str {
        match self {
            Nav::Member => {
                r#"<a href="/">Home</a><a href="/preferences_and_genres">Preferences</a><a href="/recommendation">Recommendations</a><a href="/history">History</a><a href="/cart">Cart</a><a href="/logout">Log out</a>"#
            }
            Nav::Guest => r#"<a href="/">Home</a><a href="/login">Log in</a><a href="/register">Register</a>"#,
            Nav::HomeOnly => r#"<a href="/">Home</a>"#,
        }
    }
}

fn layout(title: &str, nav: Nav, body: &str) -> String {
    let nav = nav.links();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title} | Shelfmate</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<nav>{nav}</nav>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

fn error_line(error: Option<&str>) -> String {
    error
        .map(|e| format!("<p class=\"error\">{}</p>", escape_html(e)))
        .unwrap_or_default()
}

pub fn home_page(logged_in: bool) -> String {
    let body = if logged_in {
        "<p>Pick your genres and preferences, then ask for a recommendation.</p>\n<p><a href=\"/preferences_and_genres\">Choose preferences</a> or <a href=\"/recommendation\">get a recommendation</a>.</p>"
    } else {
        "<p>Personal book recommendations based on what you like.</p>\n<p><a href=\"/login\">Log in</a> or <a href=\"/register\">create an account</a> to get started.</p>"
    };
    layout("Shelfmate", Nav::for_login(logged_in), body)
}

pub fn login_page(error: Option<&str>) -> String {
    let body = format!(
        r#"{error}
<form method="post" action="/login">
  <label>Username <input type="text" name="username" required></label><br>
  <label>Password <input type="password" name="password" required></label><br>
  <button type="submit">Log in</button>
</form>
<p>No account? <a href="/register">Register</a></p>"#,
        error = error_line(error),
    );
    layout("Log in", Nav::Guest, &body)
}

pub fn register_page(error: Option<&str>) -> String {
    let body = format!(
        r#"{error}
<form method="post" action="/register">
  <label>Username <input type="text" name="username" required></label><br>
  <label>Password <input type="password" name="password" required></label><br>
  <label>Confirm password <input type="password" name="confirm_password" required></label><br>
  <button type="submit">Register</button>
</form>"#,
        error = error_line(error),
    );
    layout("Register", Nav::Guest, &body)
}

fn checkbox(name: &str, label: &str, checked: bool) -> String {
    format!(
        "<label><input type=\"checkbox\" name=\"{}\" value=\"on\"{}> {}</label><br>\n",
        escape_html(name),
        if checked { " checked" } else { "" },
        escape_html(label),
    )
}

pub fn preferences_page(genres: &[Genre], preference_options: &[&str], selections: &BookSelections) -> String {
    let genre_boxes: String = genres
        .iter()
        .map(|genre| {
            checkbox(
                &format!("genre_{}", genre.id),
                &genre.name,
                selections.genres.contains(&genre.name),
            )
        })
        .collect();

    let preference_boxes: String = preference_options
        .iter()
        .map(|option| {
            checkbox(
                &format!("pref_{}", option),
                option,
                selections.preferences.iter().any(|p| p == option),
            )
        })
        .collect();

    let body = format!(
        r#"<form method="post" action="/preferences_and_genres">
<fieldset><legend>Genres</legend>
{genre_boxes}</fieldset>
<fieldset><legend>Preferences</legend>
{preference_boxes}</fieldset>
<button type="submit">Save</button>
</form>"#
    );
    layout("Preferences and genres", Nav::Member, &body)
}

fn selection_summary(selections: &BookSelections) -> String {
    let list = |items: &[String]| {
        if items.is_empty() {
            "none".to_string()
        } else {
            escape_html(&items.join(", "))
        }
    };
    format!(
        "<p>Selected genres: {}</p>\n<p>Selected preferences: {}</p>",
        list(&selections.genres),
        list(&selections.preferences)
    )
}

fn reaction_buttons(suggestion: &BookSuggestion) -> String {
    let form = |like: bool, label: &str| {
        format!(
            r#"<form method="post" action="/reaction" onsubmit="postForm(this, showStatus); return false;" style="display:inline">
  <input type="hidden" name="book_title" value="{title}">
  <input type="hidden" name="book_author" value="{author}">
  <input type="hidden" name="like" value="{like}">
  <button type="submit">{label}</button> <span class="status"></span>
</form>"#,
            title = escape_html(&suggestion.title),
            author = escape_html(&suggestion.author),
        )
    };
    format!(
        "<p>{} by {}</p>\n{}\n{}",
        escape_html(&suggestion.title),
        escape_html(&suggestion.author),
        form(true, "Like"),
        form(false, "Dislike"),
    )
}

pub fn recommendation_page(
    selections: &BookSelections,
    chat_history: &str,
    suggestion: Option<&BookSuggestion>,
) -> String {
    let body = format!(
        r#"{summary}
<div class="transcript">{transcript}</div>
{reactions}
<form method="post" action="/recommendation">
  <button type="submit" name="button_text" value="submit">Recommend a book</button>
  <button type="submit" name="button_text" value="clear">Clear</button>
</form>
{REACTION_SCRIPT}"#,
        summary = selection_summary(selections),
        transcript = transcript_to_html(chat_history),
        reactions = suggestion.map(reaction_buttons).unwrap_or_default(),
    );
    layout("Recommendations", Nav::Member, &body)
}

fn history_item(book: &Reaction) -> String {
    let toggle_label = if book.is_liked { "Move to disliked" } else { "Move to liked" };
    format!(
        r#"<li>{title} by {author}
  <a href="/change_reaction/{id}">{toggle_label}</a>
  <form method="post" action="/delete_reaction" onsubmit="postForm(this, removeRow); return false;" style="display:inline">
    <input type="hidden" name="book_id" value="{id}">
    <button type="submit">Delete</button>
  </form>
</li>"#,
        title = escape_html(&book.book_title),
        author = escape_html(&book.book_author),
        id = book.id,
    )
}

fn book_list(books: &[Reaction], item: impl Fn(&Reaction) -> String) -> String {
    if books.is_empty() {
        return "<p>Nothing here yet.</p>".to_string();
    }
    let items: Vec<String> = books.iter().map(item).collect();
    format!("<ul class=\"books\">\n{}\n</ul>", items.join("\n"))
}

pub fn history_page(liked: &[Reaction], disliked: &[Reaction]) -> String {
    let body = format!(
        "<h2>Liked</h2>\n{}\n<h2>Disliked</h2>\n{}\n{}",
        book_list(liked, history_item),
        book_list(disliked, history_item),
        REACTION_SCRIPT,
    );
    layout("History", Nav::Member, &body)
}

pub fn cart_page(liked: &[Reaction]) -> String {
    let list = book_list(liked, |book| {
        format!(
            "<li>{} by {} <a href=\"{}\" target=\"_blank\" rel=\"noopener\">Buy</a></li>",
            escape_html(&book.book_title),
            escape_html(&book.book_author),
            escape_html(&marketplace_search_url(&book.book_title, &book.book_author)),
        )
    });
    layout("Cart", Nav::Member, &list)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<p class=\"error\">{}</p>\n<p><a href=\"/\">Back to home</a></p>",
        escape_html(message)
    );
    layout("Something went wrong", Nav::HomeOnly, &body)
}
