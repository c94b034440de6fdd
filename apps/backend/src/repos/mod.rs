//! Repository functions for the domain layer.
//!
//! Each repo wraps its SeaORM adapter, converts rows into domain models and
//! maps `DbErr` into `DomainError`.

pub mod decks;
pub mod games;
pub mod hands;
pub mod picks;
pub mod players;
pub mod rounds;
