mod errors;
mod retriever;
mod types;

pub use errors::{Error, RetrieverResult};
pub use retriever::get_review_context;
pub use types::{FeedbackExample, ReviewContext, RetrievalDepth, RetrieverConfig, SemanticNeighbor};

#[cfg(test)]
mod tests {
    use super::*;
    use symbol_graph::{BodyRange, Edge, EdgeKind, Graph, Symbol, SymbolKind};

    fn sym(file: &str, qname: &str, name: &str) -> Symbol {
        Symbol::new("repo1", file, name, qname, SymbolKind::Function, format!("fn {name}()"), BodyRange::new(1, 5), None)
    }

    #[tokio::test]
    async fn fast_depth_stays_at_one_caller_hop() {
        let mut graph = Graph::new();
        let changed = sym("changed.ts", "M.changed", "changed");
        let direct = sym("direct.ts", "M.direct", "direct");
        let indirect = sym("indirect.ts", "M.indirect", "indirect");
        graph.add_symbol(changed.clone());
        graph.add_symbol(direct.clone());
        graph.add_symbol(indirect.clone());
        graph.add_edge(Edge::new(direct.id.clone(), changed.id.clone(), EdgeKind::Calls, "repo1"));
        graph.add_edge(Edge::new(indirect.id.clone(), direct.id.clone(), EdgeKind::Calls, "repo1"));

        let diff = format!("diff --git a/{0} b/{0}\n--- a/{0}\n+++ b/{0}\n", changed.file_path);
        let config = RetrieverConfig { depth: RetrievalDepth::Fast, top_k: 5 };
        let ctx = get_review_context(&diff, &graph, config, None, "repo1", "main").await.unwrap();

        assert_eq!(ctx.changed_symbols.len(), 1);
        assert!(ctx.callers.iter().any(|s| s.id == direct.id));
        assert!(!ctx.callers.iter().any(|s| s.id == indirect.id));
    }

    #[tokio::test]
    async fn standard_depth_reaches_two_caller_hops() {
        let mut graph = Graph::new();
        let changed = sym("changed.ts", "M.changed", "changed");
        let direct = sym("direct.ts", "M.direct", "direct");
        let indirect = sym("indirect.ts", "M.indirect", "indirect");
        graph.add_symbol(changed.clone());
        graph.add_symbol(direct.clone());
        graph.add_symbol(indirect.clone());
        graph.add_edge(Edge::new(direct.id.clone(), changed.id.clone(), EdgeKind::Calls, "repo1"));
        graph.add_edge(Edge::new(indirect.id.clone(), direct.id.clone(), EdgeKind::Calls, "repo1"));

        let diff = format!("diff --git a/{0} b/{0}\n--- a/{0}\n+++ b/{0}\n", changed.file_path);
        let config = RetrieverConfig { depth: RetrievalDepth::Standard, top_k: 5 };
        let ctx = get_review_context(&diff, &graph, config, None, "repo1", "main").await.unwrap();

        assert!(ctx.callers.iter().any(|s| s.id == indirect.id));
    }

    #[tokio::test]
    async fn empty_diff_produces_empty_context_with_no_blast_radius() {
        let graph = Graph::new();
        let config = RetrieverConfig::default();
        let ctx = get_review_context("", &graph, config, None, "repo1", "main").await.unwrap();

        assert!(ctx.changed_symbols.is_empty());
        assert!(ctx.blast_radius.is_none());
    }
}
