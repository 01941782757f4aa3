//! Backend for a trivia game.
//!
//! Questions (text, answer, category, difficulty) and categories live in a
//! SQLite database. Clients list them page by page, search them, add and
//! delete questions, and play quiz rounds where the server hands out one
//! random question at a time that the player has not been served yet.
//!
//! The interesting logic is plain functions over slices, kept apart from the
//! HTTP glue so it can be tested without a server:
//! * [`pagination`]: fixed pages of [`pagination::PAGE_SIZE`] questions.
//! * [`search`]: case-insensitive substring search over question text.
//! * [`quiz`]: the repeat-avoiding random picker.
//!
//! [`routes`] maps HTTP requests onto those and onto the [`database`].

#[macro_use]
extern crate diesel;

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod pagination;
pub mod quiz;
pub mod routes;
pub mod schema;
pub mod search;
