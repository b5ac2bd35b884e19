//! Shared types for DRY compliance.

mod pagination;
mod response;

pub use pagination::{Page, PageRequest, PageWindow};
pub use response::{Fault, FaultMapping, Success};
