//! Persistence Adapters - Atomic JSON File Storage
//!
//! Implements the repository port over per-key JSON files with atomic
//! writes. No database dependency — lightweight and crash-recoverable.

pub mod repository_impl;
pub mod store;

pub use repository_impl::FileLedgerRepository;
pub use store::KvStore;
