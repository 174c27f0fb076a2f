//! Reference-resolution engine: turns a free-text query and a filter into a
//! short, deduplicated, citation-ranked list of academic references.

pub mod apis;
pub mod config;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod keywords;
pub mod merge;
pub mod reference;
pub mod resolver;
pub mod similarity;
pub mod tables;
pub mod title_match;

pub use config::Config;
pub use error::{ResolveError, SourceError};
pub use filter::{Filter, FilterParams};
pub use reference::{Origin, Reference};
pub use resolver::{ReferenceResolver, ResolverSettings};
