pub mod config;
pub mod fee;
pub mod health;
pub mod rules;
