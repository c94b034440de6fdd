//! Configuration read from the environment at boot.

pub mod db;
pub mod game;
pub mod server;
