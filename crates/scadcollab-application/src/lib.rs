//! Application layer of the scadcollab session engine.
//!
//! Coordinates the domain, infrastructure and interaction layers:
//! session lifecycle (create/open/switch/delete, shared-session
//! access), startup bootstrap with pending-prompt resolution, and the
//! per-session wiring of presence, team chat and generation.

pub mod collab_usecase;
pub mod session_service;

pub use collab_usecase::{CollabUseCase, SessionWorkspace, UserIdentity};
pub use session_service::{BootstrapOutcome, SessionService};
