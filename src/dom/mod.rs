pub mod document;
pub mod page;
pub mod selector;
pub mod snapshot;

pub use document::{Document, EventRecord};
pub use page::{DomEvent, NodeId, Page, PageError, SelectOption};
pub use selector::{Compound, Selector};
pub use snapshot::{SnapshotNode, parse_snapshot};
