mod loader;
mod splitter;

pub use loader::{load_document, supported_formats, Document, DocumentError};
pub use splitter::RecursiveCharacterSplitter;
