//! Minimal regex-based Python parser, analogous to [`super::typescript`].
//!
//! Indentation is used the way Python itself uses it: a `def`/`class`
//! belongs to the nearest enclosing `class` whose header indent is smaller.
//! Only single-level nesting (module -> class -> method) is modeled, which
//! covers the overwhelming majority of reviewed diffs.

use lazy_static::lazy_static;
use regex::Regex;
use symbol_graph::{BodyRange, Edge, EdgeKind, Symbol, SymbolKind};

use crate::errors::ParseResult;
use crate::parser::{FileParse, LanguageParser};

lazy_static! {
    static ref CLASS_RE: Regex = Regex::new(r"^(\s*)class\s+(\w+)\s*(?:\(([^)]*)\))?\s*:").unwrap();
    static ref DEF_RE: Regex = Regex::new(r"^(\s*)def\s+(\w+)\s*\(([^)]*)\)\s*:").unwrap();
    static ref IMPORT_RE: Regex = Regex::new(r"^\s*(?:from\s+(\S+)\s+import\s+\S+|import\s+(\S+))").unwrap();
    static ref CALL_RE: Regex = Regex::new(r"(\w+)\s*\(").unwrap();
}

const KEYWORDS: &[&str] = &["if", "for", "while", "with", "except", "def", "class", "return", "print"];

pub struct PythonParser;

impl PythonParser {
    pub fn try_new() -> ParseResult<Self> {
        Ok(Self)
    }

    fn module_symbol(repo_id: &str, path: &str) -> Symbol {
        Symbol::new(
            repo_id,
            path,
            path.rsplit('/').next().unwrap_or(path),
            "__module__",
            SymbolKind::Type,
            format!("module {path}"),
            BodyRange::new(1, 1),
            None,
        )
    }
}

impl LanguageParser for PythonParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &str, content: &str, repo_id: &str) -> ParseResult<FileParse> {
        let lines: Vec<&str> = content.lines().collect();
        let mut out = FileParse::default();

        let module = Self::module_symbol(repo_id, path);
        let module_id = module.id.clone();
        out.symbols.push(module);

        let mut declared: Vec<String> = Vec::new();
        for line in &lines {
            if let Some(caps) = CLASS_RE.captures(line) {
                declared.push(caps[2].to_string());
            } else if let Some(caps) = DEF_RE.captures(line) {
                declared.push(caps[2].to_string());
            }
        }
        let resolve_local = |name: &str| -> Option<String> {
            declared
                .iter()
                .find(|n| n.as_str() == name)
                .map(|n| Symbol::make_id(path, n))
        };

        let mut current_class: Option<(String, usize)> = None;

        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;

            if let Some(caps) = IMPORT_RE.captures(line) {
                let target = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                if !target.is_empty() {
                    out.edges.push(Edge::new(module_id.clone(), target, EdgeKind::Imports, repo_id));
                }
                continue;
            }

            if let Some(caps) = CLASS_RE.captures(line) {
                let indent = caps[1].len();
                let name = caps[2].to_string();
                let symbol = Symbol::new(
                    repo_id,
                    path,
                    name.clone(),
                    name.clone(),
                    SymbolKind::Class,
                    line.trim().to_string(),
                    BodyRange::new(line_no, line_no),
                    None,
                );
                let sid = symbol.id.clone();
                out.symbols.push(symbol);
                if let Some(bases) = caps.get(3) {
                    for base in bases.as_str().split(',') {
                        let base = base.trim();
                        if base.is_empty() || base == "object" {
                            continue;
                        }
                        if let Some(base_id) = resolve_local(base) {
                            out.edges.push(Edge::new(sid.clone(), base_id, EdgeKind::Inherits, repo_id));
                        }
                    }
                }
                current_class = Some((name, indent));
                continue;
            }

            if let Some(caps) = DEF_RE.captures(line) {
                let indent = caps[1].len();
                let name = caps[2].to_string();

                let is_method = current_class
                    .as_ref()
                    .map(|(_, class_indent)| indent > *class_indent)
                    .unwrap_or(false);

                let (kind, qname) = if is_method {
                    let class_name = &current_class.as_ref().unwrap().0;
                    (SymbolKind::Method, format!("{class_name}.{name}"))
                } else {
                    current_class = None;
                    (SymbolKind::Function, name.clone())
                };

                let symbol = Symbol::new(
                    repo_id,
                    path,
                    name,
                    qname,
                    kind,
                    line.trim().to_string(),
                    BodyRange::new(line_no, line_no),
                    None,
                );
                let sid = symbol.id.clone();
                out.symbols.push(symbol);
                push_call_edges(line, &sid, repo_id, &mut out.edges);
                continue;
            }

            if let Some((_, class_indent)) = &current_class {
                if !line.trim().is_empty() && indent_of(line) <= *class_indent {
                    current_class = None;
                }
            }
        }

        Ok(out)
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn push_call_edges(line: &str, from_id: &str, repo_id: &str, edges: &mut Vec<Edge>) {
    for caps in CALL_RE.captures_iter(line) {
        let name = &caps[1];
        if KEYWORDS.contains(&name) {
            continue;
        }
        edges.push(Edge::new(from_id.to_string(), name.to_string(), EdgeKind::Calls, repo_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_class_methods_and_imports() {
        let src = r#"
import os
from collections import OrderedDict


class Base:
    def greet(self):
        pass


class Foo(Base):
    def bar(self):
        self.greet()
"#;
        let parser = PythonParser::try_new().unwrap();
        let out = parser.parse("a.py", src, "repo1").unwrap();

        assert!(out.symbols.iter().any(|s| s.qualified_name == "Foo.bar"));
        assert!(out.edges.iter().any(|e| e.kind == EdgeKind::Inherits && e.from.ends_with(":Foo")));
        assert!(out.edges.iter().any(|e| e.kind == EdgeKind::Imports && e.to == "os"));
    }
}
