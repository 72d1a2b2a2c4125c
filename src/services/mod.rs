pub mod aggregate;
pub mod cascade;

pub use aggregate::{Aggregate, AggregateWrite, COMPANY, PROJECT};
pub use cascade::{delete_with_children, CascadeReport};
