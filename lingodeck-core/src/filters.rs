use crate::Card;
use chrono::{DateTime, Utc};

pub fn filter_by_language(cards: &[Card], language: &str) -> Vec<Card> {
    cards
        .iter()
        .filter(|c| c.language == language)
        .cloned()
        .collect()
}

/// Cards whose due date has passed, oldest due first.
pub fn filter_due(cards: &[Card], now: DateTime<Utc>) -> Vec<Card> {
    let mut due: Vec<Card> = cards.iter().filter(|c| c.is_due(now)).cloned().collect();
    due.sort_by_key(|c| (c.schedule.due_date, c.created_at));
    due
}

/// `page` is 1-based.
pub fn paginate(cards: Vec<Card>, page: u32, limit: u32) -> Vec<Card> {
    let skip = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
    cards.into_iter().skip(skip).take(limit as usize).collect()
}
