use crate::{Card, CardId, CoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryRepo {
    cards: RwLock<HashMap<CardId, Card>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl crate::repo::Repository for MemoryRepo {
    async fn insert_card(&self, card: &Card) -> Result<Card, CoreError> {
        self.cards.write().insert(card.id, card.clone());
        Ok(card.clone())
    }

    async fn get_card(&self, id: CardId) -> Result<Card, CoreError> {
        self.cards
            .read()
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound("card"))
    }

    async fn list_cards(&self, language: Option<&str>) -> Result<Vec<Card>, CoreError> {
        let mut v: Vec<Card> = self.cards.read().values().cloned().collect();
        if let Some(lang) = language {
            v.retain(|c| c.language == lang);
        }
        v.sort_by_key(|c| (c.created_at, c.id));
        Ok(v)
    }

    async fn update_card(&self, card: &Card) -> Result<Card, CoreError> {
        let mut m = self.cards.write();
        if !m.contains_key(&card.id) {
            return Err(CoreError::NotFound("card"));
        }
        m.insert(card.id, card.clone());
        Ok(card.clone())
    }

    async fn delete_card(&self, id: CardId) -> Result<(), CoreError> {
        self.cards
            .write()
            .remove(&id)
            .ok_or(CoreError::NotFound("card"))?;
        Ok(())
    }
}
