pub mod events;
pub mod node;
pub mod params;
pub mod splitter;

pub use events::{EventTrace, NoopObserver, SplitEvent, SplitObserver, TracingObserver};
pub use node::{LeafReason, NodeContext, ParentRule, Side, SplitOutcome, SplitterNode, ROOT_ID};
pub use params::{SelectionPolicy, SplitterParams};
