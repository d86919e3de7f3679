pub mod chunk;
pub mod config;
pub mod generate;
pub mod health;
