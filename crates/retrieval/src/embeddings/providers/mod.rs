//! Bundled embedding providers.

pub mod fake;
pub mod trigram;

pub use fake::FakeProvider;
pub use trigram::TrigramProvider;
