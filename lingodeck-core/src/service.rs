use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    apply_valid_grade, filter_due, on_content_edit, paginate, Card, CardFields, CardId, CardPage,
    Clock, CoreError, ListQuery, PracticeInput, Repository, DEFAULT_PAGE_LIMIT,
};

/// Card management on top of a [`Repository`] and a [`Clock`].
///
/// Every operation validates its input before touching the store, so a
/// failed call never leaves a partially updated card behind.
#[derive(Clone)]
pub struct CardService {
    repo: Arc<dyn Repository>,
    clock: Arc<dyn Clock>,
}

impl CardService {
    pub fn new(repo: Arc<dyn Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn create_card(&self, fields: CardFields) -> Result<Card, CoreError> {
        let fields = fields.checked()?;
        let mut card = Card::new(fields.front, fields.back, fields.language, self.clock.now());
        card.image = fields.image;
        let card = self.repo.insert_card(&card).await?;
        info!(card = %card.id, language = %card.language, "card created");
        Ok(card)
    }

    pub async fn modify_card(&self, id: CardId, fields: CardFields) -> Result<Card, CoreError> {
        let fields = fields.checked()?;
        let mut card = self.repo.get_card(id).await?;

        let content_changed = card.front != fields.front || card.back != fields.back;
        card.front = fields.front;
        card.back = fields.back;
        card.language = fields.language;
        card.image = fields.image;
        card.schedule = on_content_edit(&card.schedule, content_changed, self.clock.now());

        let card = self.repo.update_card(&card).await?;
        info!(card = %card.id, reset = content_changed, "card modified");
        Ok(card)
    }

    pub async fn practice_card(&self, id: CardId, input: PracticeInput) -> Result<Card, CoreError> {
        let grade = input.checked()?;
        let mut card = self.repo.get_card(id).await?;

        card.schedule = apply_valid_grade(&card.schedule, grade, self.clock.now())?;

        let card = self.repo.update_card(&card).await?;
        info!(
            card = %card.id,
            grade = grade.value(),
            interval = card.schedule.interval,
            repetition = card.schedule.repetition,
            ease_factor = card.schedule.ease_factor,
            "card practiced"
        );
        Ok(card)
    }

    pub async fn get_card(&self, id: CardId) -> Result<Card, CoreError> {
        self.repo.get_card(id).await
    }

    pub async fn list_cards(&self, query: ListQuery) -> Result<CardPage, CoreError> {
        let query = query.checked()?;
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let cards = self.repo.list_cards(query.language.as_deref()).await?;
        let cards = paginate(cards, query.page.unwrap_or(1), limit);
        debug!(count = cards.len(), page = ?query.page, "cards listed");
        Ok(CardPage {
            cards,
            page: query.page,
        })
    }

    /// Cards due now, oldest due first.
    pub async fn due_cards(&self, max: Option<usize>) -> Result<Vec<Card>, CoreError> {
        let cards = self.repo.list_cards(None).await?;
        let mut due = filter_due(&cards, self.clock.now());
        if let Some(m) = max {
            due.truncate(m);
        }
        Ok(due)
    }

    pub async fn delete_card(&self, id: CardId) -> Result<(), CoreError> {
        self.repo.delete_card(id).await?;
        info!(card = %id, "card deleted");
        Ok(())
    }
}
