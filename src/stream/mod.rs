pub mod assembler;
pub mod extractor;
pub mod response;
pub mod sanitizer;
pub mod types;

pub use assembler::{AssemblyState, BoundaryPolicy, StreamAssembler};
pub use extractor::extract_chunk;
pub use response::render_response;
pub use sanitizer::sanitize;
