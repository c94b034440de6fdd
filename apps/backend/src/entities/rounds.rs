use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "round_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStatus {
    #[sea_orm(string_value = "DRAWING_CARDS")]
    DrawingCards,
    #[sea_orm(string_value = "CZAR_VOTING")]
    CzarVoting,
    #[sea_orm(string_value = "ENDED")]
    Ended,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rounds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "game_id")]
    pub game_id: i64,
    #[sea_orm(column_name = "round_no")]
    pub round_no: i32,
    pub status: RoundStatus,
    #[sea_orm(column_name = "judge_player_id")]
    pub judge_player_id: i64,
    #[sea_orm(column_name = "prompt_card_id")]
    pub prompt_card_id: i64,
    #[sea_orm(column_name = "winner_player_id")]
    pub winner_player_id: Option<i64>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "ends_at")]
    pub ends_at: OffsetDateTime,
    #[sea_orm(column_name = "voting_ends_at")]
    pub voting_ends_at: Option<OffsetDateTime>,
    #[sea_orm(column_name = "ended_at")]
    pub ended_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::games::Entity",
        from = "Column::GameId",
        to = "super::games::Column::Id"
    )]
    Game,
    #[sea_orm(
        belongs_to = "super::prompt_cards::Entity",
        from = "Column::PromptCardId",
        to = "super::prompt_cards::Column::Id"
    )]
    PromptCard,
    #[sea_orm(has_many = "super::round_picks::Entity")]
    RoundPicks,
}

impl Related<super::games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Game.def()
    }
}

impl Related<super::prompt_cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PromptCard.def()
    }
}

impl Related<super::round_picks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoundPicks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
