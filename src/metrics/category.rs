//! Positional item categories

use std::fmt;

/// Number of item categories tracked in every table
pub const CATEGORY_COUNT: usize = 6;

/// Column position of an item category, shared by the sales, surplus and
/// stock tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Category(usize);

impl Category {
    /// Category at `index`, if it is one of the tracked columns
    pub fn new(index: usize) -> Option<Self> {
        (index < CATEGORY_COUNT).then_some(Self(index))
    }

    /// Every category in column order
    pub fn all() -> impl Iterator<Item = Category> {
        (0..CATEGORY_COUNT).map(Category)
    }

    /// Zero-based position
    pub fn index(self) -> usize {
        self.0
    }

    /// One-based spreadsheet column number
    pub fn column(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category #{}", self.0 + 1)
    }
}

/// Display labels taken from a table header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categories {
    labels: Vec<String>,
}

impl Categories {
    /// Build labels from a header row. The caller checks the width.
    pub fn from_header(header: &[String]) -> Self {
        Self {
            labels: header.iter().map(|h| h.trim().to_string()).collect(),
        }
    }

    /// Label for a category, falling back to its position when the header
    /// has no text for it.
    pub fn label(&self, category: Category) -> String {
        self.labels
            .get(category.index())
            .filter(|l| !l.is_empty())
            .cloned()
            .unwrap_or_else(|| category.to_string())
    }

    /// Pair each label with the value at the same position
    pub fn pair<T: Copy>(&self, values: &[T]) -> Vec<(String, T)> {
        Category::all()
            .zip(values.iter().copied())
            .map(|(category, value)| (self.label(category), value))
            .collect()
    }
}
