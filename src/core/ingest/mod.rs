//! Ingestion pipeline: splitting, repair, resolution, coordination.

pub mod expansion;
pub mod pipeline;
pub mod repair;
pub mod resolver;
pub mod splitter;

pub use expansion::{ChunkExpander, CompletionAnnotator};
pub use pipeline::IngestPipeline;
pub use repair::{OversizeRepair, RepairReport};
pub use resolver::SectionResolver;
pub use splitter::TextSplitter;
