//! Domain layer of the scadcollab session engine.
//!
//! Models and traits for collaborative sessions (AI conversation +
//! generated source + presence), the team-chat side channel, sharing,
//! client-local state, and the retry policy used by the generation
//! pipeline. Storage backends and providers live in the sibling
//! infrastructure and interaction crates.

pub mod backoff;
pub mod channel;
pub mod error;
pub mod presence;
pub mod session;
pub mod share;
pub mod state;
pub mod subscription;

// Re-export common error type
pub use error::{CollabError, Result};
