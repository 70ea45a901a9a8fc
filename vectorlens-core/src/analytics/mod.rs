//! Analytics derived from raw chunks: duplicate clusters, relationship graphs,
//! timelines and source counts.
//!
//! Every function here is pure over a slice of chunks and a distance function,
//! so the simulated backend and the analytics proxy share one implementation.

pub mod duplicates;
pub mod graph;
pub mod timeline;

pub use duplicates::{DuplicateGroup, DuplicateReport, detect_duplicates};
pub use graph::{Graph, GraphLink, GraphNode, build_graph, tag_overlap_distance};
pub use timeline::{
    CollectionSummary, SourceCounts, TimelineEntry, TimelinePage, source_counts, summarize,
    timeline_page,
};
