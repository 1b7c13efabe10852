pub mod credit;
pub mod fake_store;
pub mod pg_store;
pub mod store;

pub use credit::{BypassDecision, BypassType, CreditController};
pub use fake_store::InMemoryJobStore;
pub use pg_store::PgJobStore;
pub use store::{JobStore, SearchFilter};
