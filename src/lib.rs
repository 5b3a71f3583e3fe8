pub mod diagnostic;
pub mod gpu;
pub mod harness;
pub mod kerneltests;
pub mod mapping;
pub mod span;

// Re-exports that keep the common call sites short
pub use gpu::{create_context, try_create_context, GpuContext, KernelProgram};
pub use harness::{prepare_entry, run, EntryStatus, HarnessReport, RunOptions};
pub use mapping::MappingEntry;
