//! Vertex/edge model for the per-(repo,branch) symbol graph.
//!
//! Mirrors the span/kind modeling style of tree-sitter based AST crates in
//! this workspace family, trimmed to exactly what graph traversal needs.

use serde::{Deserialize, Serialize};

/// Coarse symbol kind. Kept small and stable since it crosses language
/// boundaries (the Parser Registry maps every language's declarations onto
/// this set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Interface,
    Function,
    Method,
    Type,
}

/// Inclusive 1-based line range of a symbol's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyRange {
    pub start_line: usize,
    pub end_line: usize,
}

impl BodyRange {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
        }
    }
}

/// A named, locatable program entity.
///
/// `id` is `filePath + ":" + qualifiedName` and must be unique within a
/// single `(repoId, branch)` graph; callers are responsible for building it
/// with [`Symbol::make_id`] before constructing a `Symbol`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: String,
    pub repo_id: String,
    pub file_path: String,
    pub name: String,
    pub qualified_name: String,
    pub kind: SymbolKind,
    pub signature: String,
    pub body_range: BodyRange,
    pub doc_comment: Option<String>,
}

impl Symbol {
    pub fn make_id(file_path: &str, qualified_name: &str) -> String {
        format!("{file_path}:{qualified_name}")
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repo_id: impl Into<String>,
        file_path: impl Into<String>,
        name: impl Into<String>,
        qualified_name: impl Into<String>,
        kind: SymbolKind,
        signature: impl Into<String>,
        body_range: BodyRange,
        doc_comment: Option<String>,
    ) -> Self {
        let file_path = file_path.into();
        let qualified_name = qualified_name.into();
        let id = Self::make_id(&file_path, &qualified_name);
        Self {
            id,
            repo_id: repo_id.into(),
            file_path,
            name: name.into(),
            qualified_name,
            kind,
            signature: signature.into(),
            body_range,
            doc_comment,
        }
    }
}

/// Directed relation kind between two symbols, or between a symbol and a
/// free-form name (`calls`) or file/module path (`imports`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Calls,
    Inherits,
    Implements,
    Imports,
}

/// A directed edge. `to` is a symbol id for `inherits`/`implements`; for
/// `calls` it may be a bare short name resolved at insertion time; for
/// `imports` it is a file path or module name and is never resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub repo_id: String,
}

impl Edge {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: EdgeKind,
        repo_id: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            repo_id: repo_id.into(),
        }
    }

    /// A `calls` edge target is a bare short name when it carries no `:`
    /// separator (i.e. it is not itself a symbol id of the
    /// `filePath:qualifiedName` shape).
    pub fn is_bare_call_target(&self) -> bool {
        self.kind == EdgeKind::Calls && !self.to.contains(':')
    }
}

/// Blast radius computed from a set of changed symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BlastRadius {
    pub direct_callers: Vec<String>,
    pub transitive_callers: Vec<String>,
    pub affected_files: Vec<String>,
    pub risk_score: u32,
}
