pub mod admin;
pub mod assistant;
pub mod auth;
pub mod comment;
pub mod idea;
pub mod profile;
pub mod reset;
pub mod stats;
pub mod vote;

pub use auth::*;
