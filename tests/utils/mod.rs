pub mod builders;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use builders::{jan, StoreBuilder};
#[allow(unused_imports)]
pub use mocks::CountingRepository;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
