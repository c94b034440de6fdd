//! SeaORM adapters. Free functions generic over `ConnectionTrait` that
//! return `DbErr`; the repos layer maps to `DomainError`.

pub mod cards_sea;
pub mod decks_sea;
pub mod games_sea;
pub mod hands_sea;
pub mod picks_sea;
pub mod players_sea;
pub mod rounds_sea;
