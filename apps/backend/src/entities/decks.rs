use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "decks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::prompt_cards::Entity")]
    PromptCards,
    #[sea_orm(has_many = "super::answer_cards::Entity")]
    AnswerCards,
}

impl Related<super::prompt_cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PromptCards.def()
    }
}

impl Related<super::answer_cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnswerCards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
