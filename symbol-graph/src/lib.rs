//! Per-(repo,branch) symbol dependency graph (component C1).
//!
//! Pure in-memory data structure: no I/O, no async. The Durable Store and
//! the Indexer are responsible for persistence and for keeping a `Graph`
//! instance populated; this crate only owns the structure and its
//! traversal/serialization operations.

pub mod errors;
pub mod graph;
pub mod types;

pub use errors::{Error, GraphResult};
pub use graph::{Graph, GraphSnapshot};
pub use types::{BlastRadius, BodyRange, Edge, EdgeKind, Symbol, SymbolKind};

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(file: &str, qname: &str, name: &str) -> Symbol {
        Symbol::new(
            "repo1",
            file,
            name,
            qname,
            SymbolKind::Function,
            format!("fn {name}()"),
            BodyRange::new(1, 5),
            None,
        )
    }

    #[test]
    fn remove_file_is_total() {
        let mut g = Graph::new();
        let a = sym("a.ts", "A.a", "a");
        let b = sym("b.ts", "B.b", "b");
        g.add_symbol(a.clone());
        g.add_symbol(b.clone());
        g.add_edge(Edge::new(a.id.clone(), b.id.clone(), EdgeKind::Calls, "repo1"));
        g.add_edge(Edge::new(b.id.clone(), "a", EdgeKind::Calls, "repo1"));

        g.remove_file("b.ts");

        assert!(g.get_symbol(&b.id).is_none());
        assert!(g.symbols_in_file("b.ts").is_empty());
        assert!(g.get_callers(&a.id, 2).is_empty());
        assert!(g.get_callees(&a.id, 2).is_empty());
        // The caller side (a -> b) must be gone from a's outgoing callees too.
        assert_eq!(g.len_edges(), 0);
    }

    #[test]
    fn caller_resolution_through_bare_names_edge_before_symbol() {
        let mut g = Graph::new();
        let a = sym("a.ts", "A.a", "a");
        g.add_symbol(a.clone());
        g.add_edge(Edge::new(a.id.clone(), "foo", EdgeKind::Calls, "repo1"));

        let b = sym("b.ts", "B.foo", "foo");
        g.add_symbol(b.clone());

        let callers = g.get_callers(&b.id, 1);
        assert!(callers.iter().any(|s| s.id == a.id));
    }

    #[test]
    fn caller_resolution_through_bare_names_symbol_before_edge() {
        let mut g = Graph::new();
        let b = sym("b.ts", "B.foo", "foo");
        g.add_symbol(b.clone());

        let a = sym("a.ts", "A.a", "a");
        g.add_symbol(a.clone());
        g.add_edge(Edge::new(a.id.clone(), "foo", EdgeKind::Calls, "repo1"));

        let callers = g.get_callers(&b.id, 1);
        assert!(callers.iter().any(|s| s.id == a.id));
    }

    #[test]
    fn blast_radius_monotonic_under_more_callers() {
        let mut g = Graph::new();
        let target = sym("t.ts", "T.t", "t");
        g.add_symbol(target.clone());
        let r0 = g.get_blast_radius(&[target.id.clone()]);

        let caller1 = sym("c1.ts", "C1.c1", "c1");
        g.add_symbol(caller1.clone());
        g.add_edge(Edge::new(caller1.id.clone(), target.id.clone(), EdgeKind::Calls, "repo1"));
        let r1 = g.get_blast_radius(&[target.id.clone()]);
        assert!(r1.risk_score >= r0.risk_score);

        let caller2 = sym("c2.ts", "C2.c2", "c2");
        g.add_symbol(caller2.clone());
        g.add_edge(Edge::new(caller2.id.clone(), target.id.clone(), EdgeKind::Calls, "repo1"));
        let r2 = g.get_blast_radius(&[target.id.clone()]);
        assert!(r2.risk_score >= r1.risk_score);
    }

    #[test]
    fn serialize_round_trip_preserves_behavior() {
        let mut g = Graph::new();
        let a = sym("a.ts", "A.a", "a");
        let b = sym("b.ts", "B.b", "b");
        g.add_symbol(a.clone());
        g.add_symbol(b.clone());
        g.add_edge(Edge::new(a.id.clone(), b.id.clone(), EdgeKind::Calls, "repo1"));
        g.add_edge(Edge::new(a.id.clone(), "b", EdgeKind::Calls, "repo1"));

        let json = g.serialize().unwrap();
        let g2 = Graph::deserialize(&json).unwrap();

        assert_eq!(g.len_symbols(), g2.len_symbols());
        assert_eq!(g.len_edges(), g2.len_edges());
        let callers_orig = g.get_callers(&b.id, 1);
        let callers_round = g2.get_callers(&b.id, 1);
        assert_eq!(callers_orig.len(), callers_round.len());
    }

    #[test]
    fn short_name_index_never_leaks_into_all_symbols() {
        let mut g = Graph::new();
        let a = sym("a.ts", "A.dup", "dup");
        let b = sym("b.ts", "B.dup", "dup");
        g.add_symbol(a.clone());
        g.add_symbol(b.clone());
        assert_eq!(g.all_symbols().len(), 2);
    }

    #[test]
    fn blast_radius_does_not_include_unresolved_bare_names() {
        let mut g = Graph::new();
        let a = sym("a.ts", "A.a", "a");
        g.add_symbol(a.clone());
        g.add_edge(Edge::new(a.id.clone(), "ghost", EdgeKind::Calls, "repo1"));

        let radius = g.get_blast_radius(&[a.id.clone()]);
        assert!(radius.direct_callers.is_empty());
        assert!(radius.transitive_callers.is_empty());
    }
}
