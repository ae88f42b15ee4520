//! Concrete `DnsResolver` implementations (§6, §2 component J).
//!
//! Mirrors the teacher crate's `Cache`/`caches::{DirCache, NoCache,
//! TestCache}` pattern: the trait lives at the crate root (`resolver.rs`),
//! and this module holds the implementations consumers choose from.

pub mod hickory;
pub mod test;

pub use hickory::HickoryResolver;
pub use test::StaticResolver;
