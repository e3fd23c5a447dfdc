// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod games;
pub mod leaderboard;
pub mod profile;
pub mod questions;
pub mod sports;
