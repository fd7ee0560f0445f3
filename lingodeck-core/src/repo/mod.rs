use crate::{Card, CardId, CoreError};
use async_trait::async_trait;

pub mod memory;
pub use memory::MemoryRepo;

/// Card store. Listing is ordered by creation time.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn insert_card(&self, card: &Card) -> Result<Card, CoreError>;
    async fn get_card(&self, id: CardId) -> Result<Card, CoreError>;
    async fn list_cards(&self, language: Option<&str>) -> Result<Vec<Card>, CoreError>;
    async fn update_card(&self, card: &Card) -> Result<Card, CoreError>;
    async fn delete_card(&self, id: CardId) -> Result<(), CoreError>;
}
