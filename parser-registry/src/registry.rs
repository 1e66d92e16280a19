//! [`ParserRegistry`] selects a [`LanguageParser`] by file extension and
//! never lets one bad language or one bad file take down a scan.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::errors::ParseResult;
use crate::languages::{PythonParser, TypeScriptParser};
use crate::parser::{FileParse, LanguageParser};

pub struct ParserRegistry {
    by_extension: HashMap<&'static str, Arc<dyn LanguageParser>>,
}

impl ParserRegistry {
    /// Builds the registry with every bundled language parser, skipping and
    /// logging any whose `try_new` fails rather than aborting the whole
    /// registry.
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            by_extension: HashMap::new(),
        };

        match TypeScriptParser::try_new() {
            Ok(parser) => registry.register(Arc::new(parser)),
            Err(err) => warn!(language = "typescript", error = %err, "parser init failed, skipping"),
        }

        match PythonParser::try_new() {
            Ok(parser) => registry.register(Arc::new(parser)),
            Err(err) => warn!(language = "python", error = %err, "parser init failed, skipping"),
        }

        registry
    }

    fn register(&mut self, parser: Arc<dyn LanguageParser>) {
        for ext in parser.extensions() {
            self.by_extension.insert(ext, parser.clone());
        }
    }

    /// Parse one file. Returns `Ok(None)` for an extension with no
    /// registered parser; the indexer treats that as "skip, not an error".
    /// A registered parser that fails on this particular file is surfaced as
    /// `Err` so the indexer can log and count it without aborting the scan.
    pub fn parse(&self, path: &str, content: &str, repo_id: &str) -> ParseResult<Option<FileParse>> {
        let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();

        let Some(parser) = self.by_extension.get(ext.as_str()) else {
            return Ok(None);
        };

        parser.parse(path, content, repo_id).map(Some)
    }

    pub fn supports(&self, path: &str) -> bool {
        let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        self.by_extension.contains_key(ext.as_str())
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_by_extension() {
        let registry = ParserRegistry::with_defaults();
        assert!(registry.supports("src/app.ts"));
        assert!(registry.supports("service.py"));
        assert!(!registry.supports("README.md"));
    }

    #[test]
    fn unknown_extension_returns_none_not_error() {
        let registry = ParserRegistry::with_defaults();
        let result = registry.parse("Cargo.lock", "irrelevant", "repo1").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn parses_known_extension_without_panicking_on_garbage_input() {
        let registry = ParserRegistry::with_defaults();
        let result = registry.parse("weird.ts", "{{{ not real code )))", "repo1");
        assert!(result.is_ok());
    }
}
