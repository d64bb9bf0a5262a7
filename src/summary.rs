use crate::extractor::{Definition, FileRecord};
use std::fmt::Write as _;
use std::path::Path;

/// The project as the generation agent sees it: every file path plus one
/// text block of extracted metadata per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSummary {
    /// File paths relative to the project root, in record order.
    pub files: Vec<String>,
    /// Per-file blocks separated by blank lines.
    pub text: String,
}

impl ProjectSummary {
    /// Concatenates `records` without filtering or truncation.
    pub fn assemble(records: &[FileRecord], project_root: &Path) -> Self {
        let files: Vec<String> = records
            .iter()
            .map(|record| display_path(&record.path, project_root))
            .collect();

        let text = records
            .iter()
            .zip(&files)
            .map(|(record, path)| file_block(record, path))
            .collect::<Vec<_>>()
            .join("\n");

        Self { files, text }
    }

    /// Comma separated file list used as the project structure.
    pub fn structure(&self) -> String {
        self.files.join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn display_path(path: &Path, project_root: &Path) -> String {
    let rel_path = path.strip_prefix(project_root).unwrap_or(path);
    rel_path.to_string_lossy().replace('\\', "/")
}

fn file_block(record: &FileRecord, path: &str) -> String {
    let mut block = String::new();
    let _ = writeln!(block, "File: {path}");
    let _ = writeln!(
        block,
        "Module Docstring: {}",
        record.module_doc.as_deref().unwrap_or("None")
    );
    let _ = writeln!(block, "Functions: {}", definition_list(&record.functions));
    let _ = writeln!(block, "Classes: {}", definition_list(&record.classes));
    block
}

fn definition_list(defs: &[Definition]) -> String {
    if defs.is_empty() {
        return "[]".to_string();
    }

    defs.iter()
        .map(|def| match &def.doc {
            Some(doc) => format!("{} ({})", def.name, doc),
            None => def.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn def(name: &str, doc: Option<&str>) -> Definition {
        Definition {
            name: name.to_string(),
            doc: doc.map(str::to_string),
        }
    }

    fn record(path: &str, module_doc: Option<&str>) -> FileRecord {
        FileRecord {
            path: PathBuf::from("/project").join(path),
            raw_content: String::new(),
            module_doc: module_doc.map(str::to_string),
            functions: Vec::new(),
            classes: Vec::new(),
        }
    }

    #[test]
    fn test_empty_records_give_empty_summary() {
        let summary = ProjectSummary::assemble(&[], Path::new("/project"));
        assert!(summary.is_empty());
        assert_eq!(summary.structure(), "");
        assert_eq!(summary.text, "");
    }

    #[test]
    fn test_blocks_follow_record_order() {
        let mut a = record("a.py", Some("A"));
        a.functions.push(def("f", Some("F")));
        let mut b = record("pkg/b.py", None);
        b.classes.push(def("C", Some("B")));
        b.functions.push(def("helper", None));

        let summary = ProjectSummary::assemble(&[a, b], Path::new("/project"));

        assert_eq!(summary.structure(), "a.py, pkg/b.py");
        assert_eq!(
            summary.text,
            "File: a.py\n\
             Module Docstring: A\n\
             Functions: f (F)\n\
             Classes: []\n\
             \n\
             File: pkg/b.py\n\
             Module Docstring: None\n\
             Functions: helper\n\
             Classes: C (B)\n"
        );
    }

    #[test]
    fn test_paths_outside_root_are_kept_whole() {
        let record = record("x.py", None);
        let summary = ProjectSummary::assemble(&[record], Path::new("/elsewhere"));
        assert_eq!(summary.files, vec!["/project/x.py"]);
    }
}
