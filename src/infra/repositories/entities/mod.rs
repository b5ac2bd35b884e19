//! SeaORM entity definitions
//!
//! Each entity's model is a repository record.

pub mod order;

// Re-exports for public API convenience
#[allow(unused_imports)]
pub use order::{ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel};
