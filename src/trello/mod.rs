//! Trello API client module
//!
//! Typed models and a thin authenticated client for the endpoints the
//! extraction pipeline uses.

mod client;
mod models;

pub use client::{TrelloClient, TRELLO_API_BASE};
pub use models::{Action, Attachment, Board, Card, Label, Member};

#[cfg(test)]
mod tests;
