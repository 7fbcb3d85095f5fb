// src/services/mod.rs

pub mod articles;
pub mod profiles;
pub mod query;
pub mod users;
