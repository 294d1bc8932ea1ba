pub mod enrich;
pub mod lookup;
pub mod session;

// Re-export command functions for convenience
pub use enrich::enrich;
pub use lookup::{person, place, point};
pub use session::Session;
