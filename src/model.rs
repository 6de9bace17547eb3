//! Data types for report trees: raw trees as supplied by a source and computed trees with
//! identities and section aggregates.

mod amount;
pub mod demo;
mod id;
mod node;
mod raw;

pub use amount::{Amount, AmountError, AmountFormat};
pub use id::NodeId;
pub use node::{Entry, Node, Section};
pub use raw::{RawEntry, RawNode, RawSection};

/// The name given to entries created without one.
pub const DEFAULT_ENTRY_NAME: &str = "New Entry";

/// The name given to sections created without one.
pub const DEFAULT_SECTION_NAME: &str = "New Section";
