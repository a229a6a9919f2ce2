//! Category constants and validation rules.
//!
//! Every new account receives the [`DEFAULT_CATEGORIES`] set at creation
//! time. Category names are unique per owner; the database enforces that
//! with the `uq_categories_creator_name` constraint.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a category name in characters.
pub const MAX_CATEGORY_NAME_LENGTH: u64 = 100;

/// Maximum length of a category color string (e.g. `"#FF4444FF"`).
pub const MAX_CATEGORY_COLOR_LENGTH: u64 = 20;

/// Name of the unique constraint on `(creator_id, name)`.
pub const UNIQUE_NAME_CONSTRAINT: &str = "uq_categories_creator_name";

/// Message returned when the caller already owns a category with this name.
pub const DUPLICATE_NAME_MESSAGE: &str = "You already have a category with this name.";

/// A built-in category seeded for every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultCategory {
    pub name: &'static str,
    pub color: &'static str,
}

/// Categories created for each new account, in insertion order.
pub const DEFAULT_CATEGORIES: [DefaultCategory; 3] = [
    DefaultCategory {
        name: "Random Thoughts",
        color: "#E9A178",
    },
    DefaultCategory {
        name: "School",
        color: "#FBE38E",
    },
    DefaultCategory {
        name: "Personal",
        color: "#7FA19A",
    },
];

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("hex color pattern is valid")
});

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Accept `#RGB`, `#RRGGBB` and `#RRGGBBAA` hex colors.
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_color")
            .with_message("Enter a hex color such as #E9A178.".into()))
    }
}
