//! Per-file metadata extraction from Python syntax trees.
//!
//! [`MetadataExtractor`] parses one file at a time with tree-sitter and keeps
//! the outcome for every path it has seen, so asking twice for the same file
//! during a run does not parse it twice. Files that fail to read or parse are
//! logged and yield no record.

use crate::docstring;
use crate::error::{DocgenError, Result};
use log::{debug, error, info};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

/// A named definition and its docstring, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub doc: Option<String>,
}

/// Structural metadata of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub raw_content: String,
    pub module_doc: Option<String>,
    /// Functions in breadth-first encounter order, nested ones included.
    pub functions: Vec<Definition>,
    /// Classes in breadth-first encounter order, nested ones included.
    pub classes: Vec<Definition>,
}

/// Extracts [`FileRecord`]s and memoizes them by path for one run.
#[derive(Debug, Default)]
pub struct MetadataExtractor {
    cache: HashMap<PathBuf, Option<FileRecord>>,
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `path`, or `None` if the file could not be
    /// read or parsed. Failures are logged, never returned.
    pub fn extract(&mut self, path: &Path) -> Option<&FileRecord> {
        if self.cache.contains_key(path) {
            debug!("Cache hit: {}", path.display());
        }

        self.cache
            .entry(path.to_path_buf())
            .or_insert_with(|| match parse_file(path) {
                Ok(record) => {
                    debug!(
                        "Extracted {}: {} functions, {} classes",
                        path.display(),
                        record.functions.len(),
                        record.classes.len()
                    );
                    Some(record)
                }
                Err(e) => {
                    error!("{}", e);
                    None
                }
            })
            .as_ref()
    }

    /// Extracts every path in order, dropping files that failed.
    pub fn extract_all(&mut self, paths: &[PathBuf]) -> Vec<FileRecord> {
        let records: Vec<FileRecord> = paths
            .iter()
            .filter_map(|path| self.extract(path).cloned())
            .collect();

        info!(
            "Extracted metadata from {} of {} files",
            records.len(),
            paths.len()
        );
        records
    }

    pub fn cached_paths(&self) -> usize {
        self.cache.len()
    }
}

/// Reads and parses a single file.
pub fn parse_file(path: &Path) -> Result<FileRecord> {
    let extraction = |message: String| DocgenError::Extraction {
        path: path.to_path_buf(),
        message,
    };

    let bytes = fs::read(path).map_err(|e| extraction(e.to_string()))?;
    let mut content = String::from_utf8(bytes).map_err(|e| extraction(e.to_string()))?;
    if content.starts_with('\u{feff}') {
        content.replace_range(..'\u{feff}'.len_utf8(), "");
    }

    let mut record = parse_source(&content).map_err(extraction)?;
    record.path = path.to_path_buf();
    Ok(record)
}

/// Parses Python source text into a record with an empty path.
pub fn parse_source(content: &str) -> std::result::Result<FileRecord, String> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| format!("Failed to load Python grammar: {e}"))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| "Failed to parse content".to_string())?;
    let root = tree.root_node();

    if root.has_error() {
        return Err(describe_syntax_error(root));
    }

    let source = content.as_bytes();
    let mut functions = Vec::new();
    let mut classes = Vec::new();

    let mut queue = VecDeque::from([root]);
    while let Some(mut node) = queue.pop_front() {
        // Decorators wrap a definition without adding a level of nesting.
        if node.kind() == "decorated_definition" {
            if let Some(inner) = node.child_by_field_name("definition") {
                node = inner;
            }
        }

        match node.kind() {
            "function_definition" => functions.push(definition(node, source)),
            "class_definition" => classes.push(definition(node, source)),
            _ => {}
        }

        let mut cursor = node.walk();
        queue.extend(node.named_children(&mut cursor));
    }

    Ok(FileRecord {
        path: PathBuf::new(),
        raw_content: content.to_string(),
        module_doc: body_docstring(root, source),
        functions,
        classes,
    })
}

fn definition(node: Node, source: &[u8]) -> Definition {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
        .unwrap_or_default();
    let doc = node
        .child_by_field_name("body")
        .and_then(|body| body_docstring(body, source));

    Definition { name, doc }
}

/// Docstring of a module or block: its first statement, when that statement
/// is nothing but a string literal.
fn body_docstring(body: Node, source: &[u8]) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;

    if first.kind() != "expression_statement" {
        return None;
    }

    let mut cursor = first.walk();
    let mut exprs = first
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment");
    let expr = exprs.next()?;
    if exprs.next().is_some() {
        return None;
    }

    string_value(expr, source).map(|raw| docstring::clean(&raw))
}

fn string_value(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => docstring::decode_literal(node_text(node, source)),
        "concatenated_string" => {
            let mut cursor = node.walk();
            let parts: Option<Vec<String>> = node
                .named_children(&mut cursor)
                .filter(|part| part.kind() != "comment")
                .map(|part| string_value(part, source))
                .collect();
            parts.map(|p| p.concat())
        }
        "parenthesized_expression" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .find(|child| child.kind() != "comment")?;
            string_value(inner, source)
        }
        _ => None,
    }
}

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn describe_syntax_error(root: Node) -> String {
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return format!(
                "invalid syntax at line {}, column {}",
                pos.row + 1,
                pos.column + 1
            );
        }
        let mut cursor = node.walk();
        queue.extend(node.children(&mut cursor).filter(|c| c.has_error()));
    }
    "invalid syntax".to_string()
}
