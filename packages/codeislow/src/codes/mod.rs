//! Registry of the French codes the citation detector knows about.
//!
//! Each code pairs a stable short identifier (`CCIV`) with its display name
//! (`Code civil`) and a regex fragment matching its aliases in running text.

mod config;
mod registry;
mod types;

pub use config::{create_french_code_registry, french_codes};
pub use registry::CodeRegistry;
pub use types::Code;
