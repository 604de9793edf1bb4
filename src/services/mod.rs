pub mod admin;
pub mod ai;
pub mod auth;
pub mod bootstrap_admin;
pub mod cache;
pub mod comment;
pub mod email;
pub mod idea;
pub mod profile;
pub mod reset;
pub mod stats;
pub mod vote;
