//! Book model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    /// ISBN, unique across all books
    pub isbn: String,
    pub category: String,
    /// Free-form availability status (e.g. "available", "lent")
    pub status: String,
    pub creation_date: DateTime<Utc>,
}

/// Create / update book request.
///
/// Updates overwrite every field; `id` and `creation_date` are never taken
/// from the request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: String,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1-13 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 100, message = "Category must be 1-100 characters"))]
    pub category: String,
    #[validate(length(min = 1, max = 50, message = "Status must be 1-50 characters"))]
    pub status: String,
}

/// Book search filters. Each filter is a case-insensitive substring match;
/// absent or empty filters match everything.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl BookQuery {
    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn author(&self) -> Option<&str> {
        non_empty(&self.author)
    }

    pub fn category(&self) -> Option<&str> {
        non_empty(&self.category)
    }

    /// True when no filter constrains the result.
    pub fn is_empty(&self) -> bool {
        self.title().is_none() && self.author().is_none() && self.category().is_none()
    }

    /// Whether `book` satisfies every provided filter.
    pub fn matches(&self, book: &Book) -> bool {
        self.title().map_or(true, |t| contains_ci(&book.title, t))
            && self.author().map_or(true, |a| contains_ci(&book.author, a))
            && self.category().map_or(true, |c| contains_ci(&book.category, c))
    }
}
