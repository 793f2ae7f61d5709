//! URL handling for Harrow
//!
//! This module provides the canonical form every discovered reference is reduced
//! to before deduplication, and the scope boundary that decides which canonical
//! URLs belong to the session.

mod canonical;
mod scope;

pub use canonical::{canonicalize, canonicalize_absolute};
pub use scope::CrawlScope;
