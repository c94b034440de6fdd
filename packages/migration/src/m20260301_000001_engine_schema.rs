use sea_orm::Statement;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::extension::postgres::Type as PgType;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Games {
    Table,
    Id,
    RoomId,
    Status,
    RngSeed,
    WinnerPlayerId,
    CreatedAt,
    UpdatedAt,
    EndedAt,
}

#[derive(Iden)]
enum GameStatusEnum {
    #[iden = "game_status"]
    Type,
}

#[derive(Iden)]
enum RoundStatusEnum {
    #[iden = "round_status"]
    Type,
}

#[derive(Iden)]
enum Players {
    Table,
    Id,
    GameId,
    RoomUserId,
    DisplayName,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Decks {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum GameDecks {
    Table,
    Id,
    GameId,
    DeckId,
}

#[derive(Iden)]
enum PromptCards {
    Table,
    Id,
    DeckId,
    Content,
    Pick,
}

#[derive(Iden)]
enum AnswerCards {
    Table,
    Id,
    DeckId,
    Content,
}

#[derive(Iden)]
enum HandCards {
    Table,
    Id,
    GameId,
    PlayerId,
    AnswerCardId,
    DealtAt,
}

#[derive(Iden)]
enum Rounds {
    Table,
    Id,
    GameId,
    RoundNo,
    Status,
    JudgePlayerId,
    PromptCardId,
    WinnerPlayerId,
    CreatedAt,
    EndsAt,
    VotingEndsAt,
    EndedAt,
}

#[derive(Iden)]
enum RoundPicks {
    Table,
    Id,
    RoundId,
    PlayerId,
    IsWinner,
    CreatedAt,
}

#[derive(Iden)]
enum PickCards {
    Table,
    Id,
    GameId,
    RoundPickId,
    AnswerCardId,
    Position,
}

async fn enum_exists(manager: &SchemaManager<'_>, enum_name: &str) -> Result<bool, DbErr> {
    let result = manager
        .get_connection()
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            format!("SELECT 1 FROM pg_type WHERE typname = '{enum_name}'"),
        ))
        .await?;
    Ok(result.is_some())
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => {
                if !enum_exists(manager, "game_status").await? {
                    manager
                        .create_type(
                            PgType::create()
                                .as_enum(GameStatusEnum::Type)
                                .values(["PLAYING", "ENDED"])
                                .to_owned(),
                        )
                        .await?;
                }
                if !enum_exists(manager, "round_status").await? {
                    manager
                        .create_type(
                            PgType::create()
                                .as_enum(RoundStatusEnum::Type)
                                .values(["DRAWING_CARDS", "CZAR_VOTING", "ENDED"])
                                .to_owned(),
                        )
                        .await?;
                }
            }
            sea_orm::DatabaseBackend::Sqlite => {
                // SQLite stores enums as TEXT
            }
            _ => {
                return Err(DbErr::Custom("Unsupported database backend".into()));
            }
        }

        // games
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Games::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Games::RoomId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Games::Status)
                            .custom(GameStatusEnum::Type)
                            .not_null()
                            .default("PLAYING"),
                    )
                    .col(ColumnDef::new(Games::RngSeed).big_integer().not_null())
                    .col(ColumnDef::new(Games::WinnerPlayerId).big_integer().null())
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Games::EndedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_games_status")
                    .table(Games::Table)
                    .col(Games::Status)
                    .to_owned(),
            )
            .await?;

        // players
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Players::GameId).big_integer().not_null())
                    .col(ColumnDef::new(Players::RoomUserId).big_integer().not_null())
                    .col(ColumnDef::new(Players::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(Players::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_game_id")
                            .from(Players::Table, Players::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_players_game_room_user")
                    .table(Players::Table)
                    .col(Players::GameId)
                    .col(Players::RoomUserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // decks
        manager
            .create_table(
                Table::create()
                    .table(Decks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Decks::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Decks::Name).string().not_null())
                    .col(
                        ColumnDef::new(Decks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // game_decks
        manager
            .create_table(
                Table::create()
                    .table(GameDecks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameDecks::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(GameDecks::GameId).big_integer().not_null())
                    .col(ColumnDef::new(GameDecks::DeckId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_decks_game_id")
                            .from(GameDecks::Table, GameDecks::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_decks_deck_id")
                            .from(GameDecks::Table, GameDecks::DeckId)
                            .to(Decks::Table, Decks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_game_decks_game_deck")
                    .table(GameDecks::Table)
                    .col(GameDecks::GameId)
                    .col(GameDecks::DeckId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // prompt_cards
        manager
            .create_table(
                Table::create()
                    .table(PromptCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PromptCards::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(PromptCards::DeckId).big_integer().not_null())
                    .col(ColumnDef::new(PromptCards::Content).text().not_null())
                    .col(
                        ColumnDef::new(PromptCards::Pick)
                            .small_integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(PromptCards::Pick).between(1, 3)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prompt_cards_deck_id")
                            .from(PromptCards::Table, PromptCards::DeckId)
                            .to(Decks::Table, Decks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_prompt_cards_deck_id")
                    .table(PromptCards::Table)
                    .col(PromptCards::DeckId)
                    .to_owned(),
            )
            .await?;

        // answer_cards
        manager
            .create_table(
                Table::create()
                    .table(AnswerCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnswerCards::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(AnswerCards::DeckId).big_integer().not_null())
                    .col(ColumnDef::new(AnswerCards::Content).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_cards_deck_id")
                            .from(AnswerCards::Table, AnswerCards::DeckId)
                            .to(Decks::Table, Decks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_answer_cards_deck_id")
                    .table(AnswerCards::Table)
                    .col(AnswerCards::DeckId)
                    .to_owned(),
            )
            .await?;

        // hand_cards
        manager
            .create_table(
                Table::create()
                    .table(HandCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HandCards::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(HandCards::GameId).big_integer().not_null())
                    .col(ColumnDef::new(HandCards::PlayerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(HandCards::AnswerCardId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HandCards::DealtAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hand_cards_game_id")
                            .from(HandCards::Table, HandCards::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hand_cards_player_id")
                            .from(HandCards::Table, HandCards::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hand_cards_answer_card_id")
                            .from(HandCards::Table, HandCards::AnswerCardId)
                            .to(AnswerCards::Table, AnswerCards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A card instance is held by at most one player per game
        manager
            .create_index(
                Index::create()
                    .name("ux_hand_cards_game_card")
                    .table(HandCards::Table)
                    .col(HandCards::GameId)
                    .col(HandCards::AnswerCardId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_hand_cards_player_id")
                    .table(HandCards::Table)
                    .col(HandCards::PlayerId)
                    .to_owned(),
            )
            .await?;

        // rounds
        manager
            .create_table(
                Table::create()
                    .table(Rounds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rounds::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Rounds::GameId).big_integer().not_null())
                    .col(ColumnDef::new(Rounds::RoundNo).integer().not_null())
                    .col(
                        ColumnDef::new(Rounds::Status)
                            .custom(RoundStatusEnum::Type)
                            .not_null()
                            .default("DRAWING_CARDS"),
                    )
                    .col(
                        ColumnDef::new(Rounds::JudgePlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rounds::PromptCardId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rounds::WinnerPlayerId).big_integer().null())
                    .col(
                        ColumnDef::new(Rounds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rounds::EndsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rounds::VotingEndsAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rounds::EndedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rounds_game_id")
                            .from(Rounds::Table, Rounds::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rounds_judge_player_id")
                            .from(Rounds::Table, Rounds::JudgePlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rounds_prompt_card_id")
                            .from(Rounds::Table, Rounds::PromptCardId)
                            .to(PromptCards::Table, PromptCards::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_rounds_game_round_no")
                    .table(Rounds::Table)
                    .col(Rounds::GameId)
                    .col(Rounds::RoundNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // A prompt is drawn at most once per game
        manager
            .create_index(
                Index::create()
                    .name("ux_rounds_game_prompt")
                    .table(Rounds::Table)
                    .col(Rounds::GameId)
                    .col(Rounds::PromptCardId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_rounds_status")
                    .table(Rounds::Table)
                    .col(Rounds::Status)
                    .to_owned(),
            )
            .await?;

        // round_picks
        manager
            .create_table(
                Table::create()
                    .table(RoundPicks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoundPicks::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(RoundPicks::RoundId).big_integer().not_null())
                    .col(ColumnDef::new(RoundPicks::PlayerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(RoundPicks::IsWinner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RoundPicks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_round_picks_round_id")
                            .from(RoundPicks::Table, RoundPicks::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_round_picks_player_id")
                            .from(RoundPicks::Table, RoundPicks::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One submission per player per round
        manager
            .create_index(
                Index::create()
                    .name("ux_round_picks_round_player")
                    .table(RoundPicks::Table)
                    .col(RoundPicks::RoundId)
                    .col(RoundPicks::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // pick_cards
        manager
            .create_table(
                Table::create()
                    .table(PickCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PickCards::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(PickCards::GameId).big_integer().not_null())
                    .col(
                        ColumnDef::new(PickCards::RoundPickId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickCards::AnswerCardId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PickCards::Position).small_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pick_cards_game_id")
                            .from(PickCards::Table, PickCards::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pick_cards_round_pick_id")
                            .from(PickCards::Table, PickCards::RoundPickId)
                            .to(RoundPicks::Table, RoundPicks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pick_cards_answer_card_id")
                            .from(PickCards::Table, PickCards::AnswerCardId)
                            .to(AnswerCards::Table, AnswerCards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A card is played at most once per game
        manager
            .create_index(
                Index::create()
                    .name("ux_pick_cards_game_card")
                    .table(PickCards::Table)
                    .col(PickCards::GameId)
                    .col(PickCards::AnswerCardId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // drop in reverse order; indexes go with their tables
        manager
            .drop_table(Table::drop().table(PickCards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoundPicks::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rounds::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HandCards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AnswerCards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PromptCards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameDecks::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Decks::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Games::Table).if_exists().to_owned())
            .await?;

        if manager.get_database_backend() == sea_orm::DatabaseBackend::Postgres {
            manager
                .drop_type(
                    PgType::drop()
                        .if_exists()
                        .name(RoundStatusEnum::Type)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_type(
                    PgType::drop()
                        .if_exists()
                        .name(GameStatusEnum::Type)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
