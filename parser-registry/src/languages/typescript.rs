//! Minimal regex-based TypeScript/JavaScript parser.
//!
//! Real-world deployments plug a tree-sitter grammar behind [`LanguageParser`];
//! this implementation is intentionally line-oriented so the rest of the
//! pipeline (indexing, graph, retrieval) can be exercised without a native
//! dependency. It recognizes top-level `class`/`interface`/`function`
//! declarations, same-file `extends`/`implements` clauses, ES import
//! statements, and naive call-expression sites inside a symbol's body.

use lazy_static::lazy_static;
use regex::Regex;
use symbol_graph::{BodyRange, Edge, EdgeKind, Symbol, SymbolKind};

use crate::errors::ParseResult;
use crate::parser::{FileParse, LanguageParser};

lazy_static! {
    static ref CLASS_RE: Regex =
        Regex::new(r"^\s*(?:export\s+)?class\s+(\w+)(?:\s+extends\s+(\w+))?(?:\s+implements\s+([\w,\s]+))?").unwrap();
    static ref INTERFACE_RE: Regex =
        Regex::new(r"^\s*(?:export\s+)?interface\s+(\w+)(?:\s+extends\s+([\w,\s]+))?").unwrap();
    static ref FUNCTION_RE: Regex =
        Regex::new(r"^\s*(?:export\s+)?(?:async\s+)?function\s+(\w+)\s*\(([^)]*)\)").unwrap();
    static ref METHOD_RE: Regex =
        Regex::new(r"^\s{2,}(?:public\s+|private\s+|protected\s+|static\s+|async\s+)*(\w+)\s*\(([^)]*)\)\s*\{").unwrap();
    static ref IMPORT_RE: Regex = Regex::new(r#"^\s*import\s+.*?\sfrom\s+['"]([^'"]+)['"]"#).unwrap();
    static ref CALL_RE: Regex = Regex::new(r"(\w+)\s*\(").unwrap();
}

const KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "new", "typeof", "super",
];

pub struct TypeScriptParser;

impl TypeScriptParser {
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

impl LanguageParser for TypeScriptParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "js", "jsx"]
    }

    fn parse(&self, path: &str, content: &str, repo_id: &str) -> ParseResult<FileParse> {
        let lines: Vec<&str> = content.lines().collect();
        let mut out = FileParse::default();

        let module = Self::module_symbol(repo_id, path);
        let module_id = module.id.clone();
        out.symbols.push(module);

        // Pass 1: top-level declarations (class/interface/function), so
        // same-file extends/implements clauses can resolve to a real id.
        let mut declared: Vec<(String, String)> = Vec::new(); // (short name, qualified name)
        for line in &lines {
            if let Some(caps) = CLASS_RE.captures(line) {
                declared.push((caps[1].to_string(), caps[1].to_string()));
            } else if let Some(caps) = INTERFACE_RE.captures(line) {
                declared.push((caps[1].to_string(), caps[1].to_string()));
            } else if let Some(caps) = FUNCTION_RE.captures(line) {
                declared.push((caps[1].to_string(), caps[1].to_string()));
            }
        }
        let resolve_local = |name: &str| -> Option<String> {
            declared
                .iter()
                .find(|(short, _)| short == name)
                .map(|(_, qname)| Symbol::make_id(path, qname))
        };

        let mut current_class: Option<(String, usize)> = None;

        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;

            if let Some(caps) = IMPORT_RE.captures(line) {
                out.edges.push(Edge::new(
                    module_id.clone(),
                    caps[1].to_string(),
                    EdgeKind::Imports,
                    repo_id,
                ));
                continue;
            }

            if let Some(caps) = CLASS_RE.captures(line) {
                let name = caps[1].to_string();
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
                if let Some(base) = caps.get(2) {
                    if let Some(base_id) = resolve_local(base.as_str()) {
                        out.edges.push(Edge::new(sid.clone(), base_id, EdgeKind::Inherits, repo_id));
                    }
                }
                if let Some(impls) = caps.get(3) {
                    for iface in impls.as_str().split(',') {
                        let iface = iface.trim();
                        if let Some(iface_id) = resolve_local(iface) {
                            out.edges.push(Edge::new(sid.clone(), iface_id, EdgeKind::Implements, repo_id));
                        }
                    }
                }
                current_class = Some((name, indent_of(line)));
                continue;
            }

            if let Some(caps) = INTERFACE_RE.captures(line) {
                let name = caps[1].to_string();
                let symbol = Symbol::new(
                    repo_id,
                    path,
                    name.clone(),
                    name.clone(),
                    SymbolKind::Interface,
                    line.trim().to_string(),
                    BodyRange::new(line_no, line_no),
                    None,
                );
                out.symbols.push(symbol);
                continue;
            }

            if let Some(caps) = FUNCTION_RE.captures(line) {
                let name = caps[1].to_string();
                let symbol = Symbol::new(
                    repo_id,
                    path,
                    name.clone(),
                    name.clone(),
                    SymbolKind::Function,
                    line.trim().to_string(),
                    BodyRange::new(line_no, line_no),
                    None,
                );
                let sid = symbol.id.clone();
                out.symbols.push(symbol);
                push_call_edges(line, &sid, repo_id, &mut out.edges);
                continue;
            }

            if current_class.is_some() && indent_of(line) <= current_class.as_ref().unwrap().1 && !line.trim().is_empty() {
                current_class = None;
            }

            if let Some((class_name, _)) = &current_class {
                if let Some(caps) = METHOD_RE.captures(line) {
                    let name = caps[1].to_string();
                    let qname = format!("{class_name}.{name}");
                    let symbol = Symbol::new(
                        repo_id,
                        path,
                        name.clone(),
                        qname,
                        SymbolKind::Method,
                        line.trim().to_string(),
                        BodyRange::new(line_no, line_no),
                        None,
                    );
                    let sid = symbol.id.clone();
                    out.symbols.push(symbol);
                    push_call_edges(line, &sid, repo_id, &mut out.edges);
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
    fn parses_class_function_and_calls() {
        let src = r#"
import { helper } from './helper';

function top() {
  helper();
}

class Foo extends Base {
  bar() {
    top();
  }
}
"#;
        let parser = TypeScriptParser::try_new().unwrap();
        let out = parser.parse("a.ts", src, "repo1").unwrap();

        assert!(out.symbols.iter().any(|s| s.qualified_name == "top"));
        assert!(out.symbols.iter().any(|s| s.qualified_name == "Foo.bar"));
        assert!(out.edges.iter().any(|e| e.kind == EdgeKind::Imports && e.to == "./helper"));
        assert!(out.edges.iter().any(|e| e.kind == EdgeKind::Calls && e.to == "top"));
    }
}
