//! Client-local state: active session pointer, pending initial
//! prompt, last-read marks.

mod model;
mod repository;

pub use model::{ClientState, last_read_key};
pub use repository::ClientStateRepository;
