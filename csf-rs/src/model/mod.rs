//! Management model representation.
//!
//! The reader produces typed [`Operation`] records; the writer consumes a
//! [`ModelNode`] subtree. Conversion to the dynamically typed operation
//! shape happens only in [`Operation::to_model_node`].

mod address;
pub mod json;
mod node;
mod operation;
mod subsystem;

pub use address::{PathAddress, PathElement};
pub use node::ModelNode;
pub use operation::Operation;
pub use subsystem::SubsystemModel;
