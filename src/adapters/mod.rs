// Adapters layer: concrete implementations of the domain ports.

pub mod atlas;
pub mod digest;
pub mod gcp;
pub mod mongo;
pub mod storage;

pub use atlas::AtlasClient;
pub use gcp::GcpSecretManager;
pub use mongo::MongoStore;
pub use storage::LocalStorage;
