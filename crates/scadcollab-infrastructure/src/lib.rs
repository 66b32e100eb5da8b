//! Storage backends for the scadcollab session engine.
//!
//! Implements the domain traits from `scadcollab-core`: an in-process
//! document store with push subscriptions for sessions and comments,
//! and a JSON-file repository for client-local state.

pub mod file_client_state_repository;
pub mod memory_document_store;
pub mod pubsub;

pub use file_client_state_repository::FileClientStateRepository;
pub use memory_document_store::MemoryDocumentStore;
pub use pubsub::Publisher;
