//! Session domain module.
//!
//! Contains the session aggregate and its sub-entities, plus the
//! store traits the rest of the engine is written against.
//!
//! # Module Structure
//!
//! - `model`: the `Session` aggregate
//! - `message`: AI conversation turns (`MessageRole`, `ChatMessage`)
//! - `collaborator`: presence records (`CollaboratorInfo`)
//! - `comment`: team-chat comments (`SessionComment`)
//! - `store`: `SessionStore` trait and `SessionPatch`
//! - `comments`: `CommentStore` trait

mod collaborator;
mod comment;
mod comments;
mod message;
mod model;
mod store;

pub use collaborator::{CollaboratorInfo, CollaboratorProfile, PRESENCE_PALETTE, random_presence_color};
pub use comment::{CommentDraft, CommentPosition, SessionComment};
pub use comments::CommentStore;
pub use message::{ChatMessage, MessageRole};
pub use model::Session;
pub use store::{SessionPatch, SessionStore};
