use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

pub type CardId = Uuid;

pub const EF_MIN: f64 = 1.3;
pub const EF_DEFAULT: f64 = 2.5;
pub const FIRST_INTERVAL: u32 = 1;
pub const SECOND_INTERVAL: u32 = 6;
/// Longest interval the scheduler hands out, roughly a hundred years.
pub const MAX_INTERVAL: u32 = 36_500;
pub const PASS_GRADE: u8 = 3;
pub const MAX_GRADE: u8 = 5;

/// Recall quality reported by a reviewer, 0 (blackout) to 5 (perfect).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "i64", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub fn new(value: i64) -> Result<Self, CoreError> {
        if (0..=MAX_GRADE as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(CoreError::InvalidGrade(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_pass(self) -> bool {
        self.0 >= PASS_GRADE
    }
}

impl TryFrom<i64> for Grade {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Grade::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(g: Grade) -> Self {
        g.0
    }
}

/// Spaced-repetition bookkeeping embedded in every card.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SchedulingState {
    pub interval: u32,
    pub repetition: u32,
    pub ease_factor: f64,
    pub due_date: DateTime<Utc>,
}

/// Reference to an image stored outside the card store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageRef {
    pub file_name: String,
    pub backup_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub front: String,
    pub back: String,
    pub language: String,
    pub image: Option<ImageRef>,

    #[serde(flatten)]
    pub schedule: SchedulingState,

    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn new(
        front: impl Into<String>,
        back: impl Into<String>,
        language: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            front: front.into(),
            back: back.into(),
            language: language.into(),
            image: None,
            schedule: crate::scheduler::new_scheduling_state(now),
            created_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.schedule.due_date <= now
    }
}

/// One page of a card listing. `page` echoes the requested page, if any.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CardPage {
    pub cards: Vec<Card>,
    pub page: Option<u32>,
}
