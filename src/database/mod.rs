pub mod collection;
pub mod manager;
pub mod memory;
pub mod mongo;

pub use collection::{DatabaseError, DocumentCollection, SortOrder, UpdateOutcome};
pub use manager::Collections;
pub use memory::MemoryCollection;
pub use mongo::MongoCollection;
