//! Adapters implementing application ports outside the database

mod session_store;

pub use session_store::InMemorySessionStore;
