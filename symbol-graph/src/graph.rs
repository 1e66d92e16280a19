//! Per-(repo,branch) symbol graph: the in-memory index described by C1.
//!
//! Ownership model: the graph owns all symbols in a flat map keyed by id;
//! edges store ids (or bare names) only, never pointers, so the structure
//! stays trivially `Send`/cyclic-safe. BFS uses an explicit visited set.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, GraphResult};
use crate::types::{BlastRadius, Edge, EdgeKind, Symbol};

pub const DEFAULT_CALLER_HOPS: usize = 2;
pub const DEFAULT_CALLEE_HOPS: usize = 1;

/// Wire format for [`Graph::serialize`] / [`Graph::deserialize`].
///
/// Deliberately dedup-free: every symbol and every edge that was ever added
/// is emitted verbatim, so a round trip reproduces the graph's observable
/// behavior under every operation, including duplicate `calls` edges.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphSnapshot {
    pub symbols: Vec<Symbol>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Default)]
pub struct Graph {
    symbols: HashMap<String, Symbol>,
    by_file: HashMap<String, HashSet<String>>,
    by_name: HashMap<String, HashSet<String>>,
    /// Edges stored under their source symbol id, in insertion order.
    outgoing: HashMap<String, Vec<Edge>>,
    /// Edges stored under each id their target *resolves to* (never under a
    /// bare name, never for `imports`).
    incoming: HashMap<String, Vec<Edge>>,
    /// Bare-name `calls` edges keyed by the callee short name, kept around
    /// so that a symbol added *after* the edge still gets wired up.
    pending_bare_calls: HashMap<String, Vec<Edge>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len_symbols(&self) -> usize {
        self.symbols.len()
    }

    pub fn len_edges(&self) -> usize {
        self.outgoing.values().map(|v| v.len()).sum()
    }

    pub fn get_symbol(&self, id: &str) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// All symbols currently in the graph. Never surfaces the short-name
    /// index — only genuine, still-present symbols.
    pub fn all_symbols(&self) -> Vec<&Symbol> {
        self.symbols.values().collect()
    }

    pub fn symbols_in_file(&self, file_path: &str) -> Vec<&Symbol> {
        self.by_file
            .get(file_path)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.symbols.get(id))
            .collect()
    }

    /// Insert a symbol. Idempotent in the file map (re-adding the same id
    /// does not duplicate the file-membership entry); appending in the name
    /// map (multiple symbols may legitimately share a short name).
    pub fn add_symbol(&mut self, symbol: Symbol) {
        let id = symbol.id.clone();
        let name = symbol.name.clone();
        let file = symbol.file_path.clone();

        self.by_file.entry(file).or_default().insert(id.clone());
        self.by_name.entry(name.clone()).or_default().insert(id.clone());

        if let Some(pending) = self.pending_bare_calls.get(&name) {
            for edge in pending.clone() {
                self.incoming.entry(id.clone()).or_default().push(edge);
            }
        }

        self.symbols.insert(id, symbol);
    }

    /// Insert an edge. `calls` edges whose `to` has no `:` separator are
    /// resolved through the short-name index at insertion time and indexed
    /// under every id the name currently maps to (one-to-many); everything
    /// else is indexed once under `to` verbatim. `imports` edges never get
    /// a mirrored incoming entry since `to` is not a symbol id.
    pub fn add_edge(&mut self, edge: Edge) {
        self.outgoing
            .entry(edge.from.clone())
            .or_default()
            .push(edge.clone());

        match edge.kind {
            EdgeKind::Imports => {}
            EdgeKind::Calls if edge.is_bare_call_target() => {
                self.pending_bare_calls
                    .entry(edge.to.clone())
                    .or_default()
                    .push(edge.clone());
                if let Some(ids) = self.by_name.get(&edge.to) {
                    for id in ids.clone() {
                        self.incoming.entry(id).or_default().push(edge.clone());
                    }
                }
            }
            _ => {
                self.incoming
                    .entry(edge.to.clone())
                    .or_default()
                    .push(edge.clone());
            }
        }
    }

    /// Remove every trace of `path`: its symbols, their outgoing and
    /// incoming edges (and the mirrored entry on the other side of each),
    /// and the file entry itself. The graph is fully coherent afterwards —
    /// no dangling entry in any index references a symbol that was in
    /// `path`.
    pub fn remove_file(&mut self, path: &str) {
        let ids: Vec<String> = match self.by_file.remove(path) {
            Some(set) => set.into_iter().collect(),
            None => return,
        };

        for id in &ids {
            if let Some(symbol) = self.symbols.remove(id) {
                if let Some(set) = self.by_name.get_mut(&symbol.name) {
                    set.remove(id);
                    if set.is_empty() {
                        self.by_name.remove(&symbol.name);
                    }
                }
            }

            // Outgoing side: this symbol was the caller/subject.
            if let Some(out_edges) = self.outgoing.remove(id) {
                for edge in &out_edges {
                    match edge.kind {
                        EdgeKind::Imports => {}
                        EdgeKind::Calls if edge.is_bare_call_target() => {
                            if let Some(targets) = self.by_name.get(&edge.to).cloned() {
                                for target in targets {
                                    remove_one(self.incoming.entry(target).or_default(), edge);
                                }
                            }
                            if let Some(pending) = self.pending_bare_calls.get_mut(&edge.to) {
                                remove_one(pending, edge);
                                if pending.is_empty() {
                                    self.pending_bare_calls.remove(&edge.to);
                                }
                            }
                        }
                        _ => {
                            remove_one(self.incoming.entry(edge.to.clone()).or_default(), edge);
                        }
                    }
                }
            }

            // Incoming side: this symbol was a resolved callee/target.
            if let Some(in_edges) = self.incoming.remove(id) {
                for edge in &in_edges {
                    // Only scrub the caller's outgoing list when the edge
                    // names this id directly; a bare-name edge that merely
                    // *happened* to resolve here stays intact for other
                    // same-named symbols elsewhere.
                    if &edge.to == id {
                        remove_one(self.outgoing.entry(edge.from.clone()).or_default(), edge);
                    }
                }
            }
        }

        debug!(file = %path, removed = ids.len(), "removed file from graph");
    }

    /// Resolve the current callee-side targets of an outgoing edge.
    fn resolve_targets(&self, edge: &Edge) -> Vec<String> {
        match edge.kind {
            EdgeKind::Imports => Vec::new(),
            EdgeKind::Calls if edge.is_bare_call_target() => self
                .by_name
                .get(&edge.to)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default(),
            _ => vec![edge.to.clone()],
        }
    }

    /// Callers reachable within `hops` incoming `calls`-edge traversals,
    /// cumulative across all hops. Only symbols still present in the graph
    /// surface — an edge that resolved to nothing (or to a now-removed
    /// symbol) never appears. `inherits`/`implements`/`imports` edges are
    /// structural and do not participate in caller/callee traversal or
    /// blast radius (see DESIGN.md).
    pub fn get_callers(&self, id: &str, hops: usize) -> Vec<Symbol> {
        self.bfs(id, hops, |node| {
            self.incoming
                .get(node)
                .map(|edges| {
                    edges
                        .iter()
                        .filter(|e| e.kind == EdgeKind::Calls)
                        .map(|e| e.from.clone())
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Callees reachable within `hops` outgoing `calls`-edge traversals,
    /// resolving bare names lazily against the current short-name index.
    pub fn get_callees(&self, id: &str, hops: usize) -> Vec<Symbol> {
        self.bfs(id, hops, |node| {
            self.outgoing
                .get(node)
                .map(|edges| {
                    edges
                        .iter()
                        .filter(|e| e.kind == EdgeKind::Calls)
                        .flat_map(|e| self.resolve_targets(e))
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    fn bfs(&self, start: &str, hops: usize, next: impl Fn(&str) -> Vec<String>) -> Vec<Symbol> {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start.to_string());

        let mut frontier = vec![start.to_string()];
        let mut result = Vec::new();

        for _ in 0..hops {
            let mut next_frontier = Vec::new();
            for node in &frontier {
                for candidate in next(node) {
                    if visited.contains(&candidate) {
                        continue;
                    }
                    visited.insert(candidate.clone());
                    if let Some(symbol) = self.symbols.get(&candidate) {
                        result.push(symbol.clone());
                    }
                    next_frontier.push(candidate);
                }
            }
            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }

        result
    }

    /// `{directCallers, transitiveCallers, affectedFiles, riskScore}` for a
    /// set of changed symbol ids.
    pub fn get_blast_radius(&self, ids: &[String]) -> BlastRadius {
        let mut direct_ids: HashSet<String> = HashSet::new();
        for id in ids {
            for s in self.get_callers(id, 1) {
                direct_ids.insert(s.id);
            }
        }

        let mut two_hop_ids: HashSet<String> = HashSet::new();
        for id in ids {
            for s in self.get_callers(id, 2) {
                two_hop_ids.insert(s.id);
            }
        }
        let transitive_ids: HashSet<String> =
            two_hop_ids.difference(&direct_ids).cloned().collect();

        let mut affected_files: HashSet<String> = HashSet::new();
        for id in ids {
            if let Some(s) = self.symbols.get(id) {
                affected_files.insert(s.file_path.clone());
            }
        }
        for id in direct_ids.iter().chain(transitive_ids.iter()) {
            if let Some(s) = self.symbols.get(id) {
                affected_files.insert(s.file_path.clone());
            }
        }

        let base = (direct_ids.len() as f64) * 10.0 + (transitive_ids.len() as f64) * 5.0;
        let multiplier = if affected_files.len() > 5 { 1.5 } else { 1.0 };
        let risk_score = (base * multiplier).round().clamp(0.0, 100.0) as u32;

        let mut direct_callers: Vec<String> = direct_ids.into_iter().collect();
        direct_callers.sort();
        let mut transitive_callers: Vec<String> = transitive_ids.into_iter().collect();
        transitive_callers.sort();
        let mut affected_files: Vec<String> = affected_files.into_iter().collect();
        affected_files.sort();

        BlastRadius {
            direct_callers,
            transitive_callers,
            affected_files,
            risk_score,
        }
    }

    pub fn to_snapshot(&self) -> GraphSnapshot {
        let mut symbols: Vec<Symbol> = self.symbols.values().cloned().collect();
        symbols.sort_by(|a, b| a.id.cmp(&b.id));
        let mut edges: Vec<Edge> = self.outgoing.values().flatten().cloned().collect();
        edges.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
        GraphSnapshot { symbols, edges }
    }

    pub fn serialize(&self) -> GraphResult<String> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }

    /// Symbols first, then edges — this makes every bare `calls` edge
    /// resolve against the *final* symbol set in one pass, without relying
    /// on the pending-edge replay path used for live, order-interleaved
    /// insertion.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut graph = Graph::new();
        for symbol in snapshot.symbols {
            graph.add_symbol(symbol);
        }
        for edge in snapshot.edges {
            graph.add_edge(edge);
        }
        graph
    }

    pub fn deserialize(json: &str) -> GraphResult<Self> {
        let snapshot: GraphSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Merge another freshly loaded graph into this one (additive). Used by
    /// the Indexer when rehydrating into a non-empty instance; duplicate
    /// adds are tolerated by design.
    pub fn merge_from(&mut self, other: &Graph) {
        for symbol in other.symbols.values() {
            self.add_symbol(symbol.clone());
        }
        for edge in other.outgoing.values().flatten() {
            self.add_edge(edge.clone());
        }
    }
}

fn remove_one(edges: &mut Vec<Edge>, needle: &Edge) {
    if let Some(pos) = edges.iter().position(|e| e == needle) {
        edges.remove(pos);
    }
}

impl std::ops::Index<&str> for Graph {
    type Output = Symbol;

    fn index(&self, id: &str) -> &Symbol {
        self.symbols.get(id).expect("symbol not present")
    }
}

/// Look up a symbol or return a typed not-found error, for call sites that
/// want `?` instead of `Option`.
pub fn require_symbol<'a>(graph: &'a Graph, id: &str) -> GraphResult<&'a Symbol> {
    graph.get_symbol(id).ok_or_else(|| Error::SymbolNotFound(id.to_string()))
}
