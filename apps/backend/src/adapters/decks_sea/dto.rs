//! DTOs for decks_sea adapter.

#[derive(Debug, Clone)]
pub struct PromptCardCreate {
    pub deck_id: i64,
    pub content: String,
    pub pick: i16,
}

#[derive(Debug, Clone)]
pub struct AnswerCardCreate {
    pub deck_id: i64,
    pub content: String,
}
