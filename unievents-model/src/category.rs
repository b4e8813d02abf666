//! Fixed category catalogue.

use serde::Serialize;

/// A selectable event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Slug used in URLs and filters.
    pub value: &'static str,
    /// Display label.
    pub label: &'static str,
}

const CATALOGUE: &[Category] = &[
    Category { value: "academic", label: "Academic" },
    Category { value: "arts", label: "Arts & Culture" },
    Category { value: "athletics", label: "Athletics" },
    Category { value: "career", label: "Career & Professional" },
    Category { value: "community", label: "Community Service" },
    Category { value: "conference", label: "Conference" },
    Category { value: "cultural", label: "Cultural" },
    Category { value: "entertainment", label: "Entertainment" },
    Category { value: "health", label: "Health & Wellness" },
    Category { value: "networking", label: "Networking" },
    Category { value: "research", label: "Research" },
    Category { value: "social", label: "Social" },
    Category { value: "student-life", label: "Student Life" },
    Category { value: "workshop", label: "Workshop & Training" },
];

/// All categories, in display order.
pub fn categories() -> &'static [Category] {
    CATALOGUE
}

/// Looks up a category by its slug.
pub fn category_by_value(value: &str) -> Option<&'static Category> {
    CATALOGUE.iter().find(|c| c.value == value)
}
