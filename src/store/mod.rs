//! User store
//!
//! Account records, the in-memory store that owns them, and the export view.

pub mod export;
pub mod record;
pub mod registry;

pub use export::UserExport;
pub use record::{PublicUserView, UserRecord};
pub use registry::UserStore;
