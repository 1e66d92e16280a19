//! The `Parser` contract the Indexer (C5) consumes (component C2).
//!
//! The real implementation ships per-language tree-sitter grammars; this
//! crate only fixes the trait boundary and ships two lightweight,
//! regex-based parsers that are enough to exercise indexing, the graph,
//! and retrieval end to end without a native grammar dependency.

use symbol_graph::{Edge, Symbol};

use crate::errors::ParseResult;

/// One file's parse output: every symbol it declares, every edge those
/// symbols participate in.
#[derive(Debug, Clone, Default)]
pub struct FileParse {
    pub symbols: Vec<Symbol>,
    pub edges: Vec<Edge>,
}

/// A single language's parser. Constructed once at registry build time;
/// `try_new` may fail (e.g. a native grammar failed to load), in which case
/// the registry logs and skips that language entirely — callers of a
/// skipped extension simply see `parse` never get dispatched to it.
pub trait LanguageParser: Send + Sync {
    /// Lowercase file extensions this parser owns, without the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Parse one file's contents. A per-file failure is returned as
    /// `Err` — the registry logs it and the Indexer skips the file; it must
    /// never abort the remaining files in a scan.
    fn parse(&self, path: &str, content: &str, repo_id: &str) -> ParseResult<FileParse>;
}
