use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{CoreError, Grade, ImageRef};

pub const DEFAULT_PAGE_LIMIT: u32 = 5;

lazy_static! {
    /// Capitalised language name such as `Spanish`.
    pub static ref LANGUAGE_RE: Regex = Regex::new(r"^[A-Z][a-zA-Z]*$").unwrap();
}

/// Editable content of a card, used for both creation and edits.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct CardFields {
    #[validate(length(min = 1, max = 40, message = "front must be 1 to 40 characters"))]
    pub front: String,
    #[validate(length(min = 1, max = 40, message = "back must be 1 to 40 characters"))]
    pub back: String,
    #[validate(length(min = 1, message = "language is required"))]
    pub language: String,
    pub image: Option<ImageRef>,
}

impl CardFields {
    pub fn checked(self) -> Result<Self, CoreError> {
        self.validate()?;
        Ok(self)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Validate)]
pub struct PracticeInput {
    #[validate(range(min = 0, max = 5, message = "grade must be between 0 and 5"))]
    pub grade: i64,
}

impl PracticeInput {
    pub fn checked(self) -> Result<Grade, CoreError> {
        self.validate()?;
        Grade::new(self.grade)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct ListQuery {
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: Option<u32>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(regex(
        path = *LANGUAGE_RE,
        message = "language must start with a capital letter and contain only letters"
    ))]
    pub language: Option<String>,
}

impl ListQuery {
    pub fn checked(self) -> Result<Self, CoreError> {
        self.validate()?;
        Ok(self)
    }
}
