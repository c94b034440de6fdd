use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hand_cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "game_id")]
    pub game_id: i64,
    #[sea_orm(column_name = "player_id")]
    pub player_id: i64,
    #[sea_orm(column_name = "answer_card_id")]
    pub answer_card_id: i64,
    #[sea_orm(column_name = "dealt_at")]
    pub dealt_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::PlayerId",
        to = "super::players::Column::Id"
    )]
    Player,
    #[sea_orm(
        belongs_to = "super::answer_cards::Entity",
        from = "Column::AnswerCardId",
        to = "super::answer_cards::Column::Id"
    )]
    AnswerCard,
}

impl Related<super::players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl Related<super::answer_cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnswerCard.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
