pub mod local_store;

pub use local_store::{keys, record_field, LocalStore};
