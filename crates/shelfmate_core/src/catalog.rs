//! crates/shelfmate_core/src/catalog.rs
//!
//! The fixed genre catalog seeded at startup and the preference tags offered
//! on the preferences page.

pub const GENRES: &[&str] = &[
    "Action & Adventure",
    "Art & Photography",
    "Biography",
    "Business & Economics",
    "Comedy",
    "Computers & Internet",
    "Contemporary",
    "Cookbooks",
    "Crafts, Hobbies & Home",
    "Drama",
    "Dystopian",
    "Education & Teaching",
    "Environment & Nature",
    "Fantasy",
    "Fiction",
    "Graphic Novel",
    "Health & Wellness",
    "Historical Fiction",
    "History & Politics",
    "Horror",
    "Horror Fiction",
    "Humor & Satire",
    "Magical Realism",
    "Memoir",
    "Music & Entertainment",
    "Mystery",
    "Non-fiction",
    "Parenting & Families",
    "Paranormal Romance",
    "Philosophy",
    "Poetry",
    "Romance",
    "Satire",
    "Science & Technology",
    "Sci-Fi",
    "Self-Help",
    "Self-Help Books",
    "Spirituality",
    "Sports & Outdoors",
    "Thriller",
    "Travel & Adventure",
    "True Crime",
    "Women's Fiction",
    "Young Adult Fiction",
];

pub const PREFERENCE_OPTIONS: &[&str] = &[
    "Bestsellers",
    "Book-to-Movie Adaptations",
    "Children's Books",
    "Classics",
    "Graphic Novels",
    "New Releases",
    "Series",
    "Short Stories",
    "Underrated Gems",
    "Young Adult",
];

pub fn is_preference_option(value: &str) -> bool {
    PREFERENCE_OPTIONS.contains(&value)
}
