pub mod block_extractor;
pub mod persister;

pub use block_extractor::{BlockExtractor, CodeBlock};
pub use persister::{PersistMode, PersistReport, Persister};
