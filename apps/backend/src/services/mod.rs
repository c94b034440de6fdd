//! Services bridge pure domain logic with persistence.
//!
//! Every function takes a connection (usually the transaction opened by the
//! engine) and performs one invariant-establishing step. Nothing here arms
//! timers or notifies clients; that is the engine's job.

pub mod card_pool;
pub mod games;
pub mod judge_rotation;
pub mod rounds;
pub mod win_evaluator;
