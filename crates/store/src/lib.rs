pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use common::{Entity, EntityId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use record::EntityRecord;
pub use store::{Store, StoreOperation};
