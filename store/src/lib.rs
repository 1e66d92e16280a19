//! Durable Store (component C3).

mod config;
mod errors;
mod rows;
mod store;

pub use config::StoreConfig;
pub use errors::{Error, StoreResult};
pub use rows::{CommentRow, FeedbackSignal, ReviewRow, Severity, Verdict};
pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use symbol_graph::{BodyRange, SymbolKind};

    #[test]
    fn kind_round_trip_strings_are_stable() {
        // Guards against accidental renames of the on-disk `kind` encoding,
        // which would silently orphan every existing row.
        let cases = [
            SymbolKind::Class,
            SymbolKind::Interface,
            SymbolKind::Function,
            SymbolKind::Method,
            SymbolKind::Type,
        ];
        for kind in cases {
            let symbol = symbol_graph::Symbol::new(
                "repo",
                "a.ts",
                "Foo",
                "Foo",
                kind,
                "sig",
                BodyRange::new(1, 1),
                None,
            );
            assert_eq!(symbol.kind, kind);
        }
    }
}
