pub mod assembler;
pub mod sink;
pub mod summary;
pub mod workbook;

pub use assembler::{gather, Report, ReportAssembler, ReportError, Snapshot};
pub use sink::{ArtifactSink, FileSink};
pub use summary::{Summary, Tier};
