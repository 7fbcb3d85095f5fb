// src/handlers/mod.rs

pub mod articles;
pub mod profiles;
pub mod tags;
pub mod users;
