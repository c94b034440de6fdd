use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pick_cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "game_id")]
    pub game_id: i64,
    #[sea_orm(column_name = "round_pick_id")]
    pub round_pick_id: i64,
    #[sea_orm(column_name = "answer_card_id")]
    pub answer_card_id: i64,
    #[sea_orm(column_type = "SmallInteger")]
    pub position: i16,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::round_picks::Entity",
        from = "Column::RoundPickId",
        to = "super::round_picks::Column::Id"
    )]
    RoundPick,
    #[sea_orm(
        belongs_to = "super::answer_cards::Entity",
        from = "Column::AnswerCardId",
        to = "super::answer_cards::Column::Id"
    )]
    AnswerCard,
}

impl Related<super::round_picks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoundPick.def()
    }
}

impl Related<super::answer_cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnswerCard.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
