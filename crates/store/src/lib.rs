pub mod error;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use record::{now_timestamp, StateRecord};
pub use store::{increment, Deleted, Loaded, SavedAt, SerializedStore, StateStore};
