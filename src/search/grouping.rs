//! Reading-Level Grouping
//!
//! Derives the display bucket of each book from its reading-level label and orders
//! buckets for the autocomplete list.

use crate::catalog::types::Book;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;

/// Label used for every reading level that contains a digit.
pub const NUMERIC_GROUP: &str = "0-9";

/// The group a book's autocomplete suggestion is clustered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Any reading level containing a digit ("5th Grade", "K-2").
    Numeric,
    /// Every other level, uppercased ("BEGINNER").
    Label(String),
}

impl Bucket {
    pub fn from_reading_level(reading_level: &str) -> Self {
        let upper = reading_level.to_uppercase();
        if upper.chars().any(|c| c.is_ascii_digit()) {
            Bucket::Numeric
        } else {
            Bucket::Label(upper)
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Bucket::Numeric => NUMERIC_GROUP,
            Bucket::Label(label) => label,
        }
    }
}

impl Ord for Bucket {
    fn cmp(&self, other: &Self) -> Ordering {
        collate(self.label(), other.label())
    }
}

impl PartialOrd for Bucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Group key of a reading level: `"0-9"` if it contains a digit, else the uppercased label.
pub fn derive_group_key(reading_level: &str) -> String {
    Bucket::from_reading_level(reading_level).label().to_string()
}

/// Case-insensitive collation with a case-sensitive tie-break, so "a" and "A" sit
/// next to each other and the order is still total.
///
/// Characters compare by code point after lowercasing. That matches locale order for
/// ASCII labels only: accented letters sort after "z" ("É" > "Z"), where a locale
/// collator would place "É" with "E".
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a.cmp(folded_b).then_with(|| a.cmp(b))
}

pub fn sort_group_keys_descending(mut keys: Vec<String>) -> Vec<String> {
    keys.sort_unstable_by(|a, b| collate(b, a));
    keys
}

/// An autocomplete suggestion: the book plus its bucket, computed once.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedOption {
    #[serde(flatten)]
    pub book: Book,
    #[serde(rename = "groupKey")]
    pub bucket: Bucket,
}

impl GroupedOption {
    pub fn new(book: Book) -> Self {
        let bucket = Bucket::from_reading_level(&book.reading_level);
        Self { book, bucket }
    }

    pub fn group_key(&self) -> &str {
        self.bucket.label()
    }
}

pub fn sort_options_descending(options: &mut [GroupedOption]) {
    options.sort_by(|a, b| b.bucket.cmp(&a.bucket));
}

/// Builds the autocomplete list: one option per book, buckets in descending order.
pub fn group_options(books: &[Book]) -> Vec<GroupedOption> {
    let mut options: Vec<GroupedOption> = books.iter().cloned().map(GroupedOption::new).collect();
    sort_options_descending(&mut options);
    options
}
