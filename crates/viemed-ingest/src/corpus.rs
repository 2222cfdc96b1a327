//! Corpus loading: recursive directory walk with HTML-to-text cleanup.

use anyhow::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// A raw source document prior to chunking.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub doc_id: String,
    pub doc_path: String,
    pub content: String,
}

pub struct CorpusLoader {
    re_script: Regex,
    re_tag: Regex,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusLoader {
    pub fn new() -> Self {
        #[allow(clippy::expect_used)]
        let build = |p: &str| Regex::new(p).expect("corpus pattern must compile");
        Self {
            re_script: build(r"(?is)<(script|style)[^>]*>.*?</(script|style)>"),
            re_tag: build(r"(?s)<[^>]+>"),
        }
    }

    /// Load every `.txt`, `.md` and `.html` file under `root`, sorted by path
    /// for deterministic ids.
    pub fn load_dir(&self, root: &Path) -> Result<Vec<SourceDocument>> {
        let mut files = self.list_files(root);
        files.sort();
        if files.is_empty() {
            println!("No corpus files found under {}.", root.display());
            return Ok(vec![]);
        }
        let mut docs = Vec::with_capacity(files.len());
        for path in &files {
            let content = self.read_content(path)?;
            if content.trim().is_empty() {
                continue;
            }
            docs.push(SourceDocument {
                doc_id: extract_doc_id(path),
                doc_path: path.to_string_lossy().to_string(),
                content,
            });
        }
        Ok(docs)
    }

    /// As `load_dir` but only the first `limit` files.
    pub fn load_dir_limited(&self, root: &Path, limit: usize) -> Result<Vec<SourceDocument>> {
        let mut docs = self.load_dir(root)?;
        if docs.len() > limit {
            docs.truncate(limit);
            println!("🔢 Limited to first {limit} files");
        }
        Ok(docs)
    }

    fn read_content(&self, path: &Path) -> Result<String> {
        let raw = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => String::from_utf8_lossy(&fs::read(path)?).to_string(),
        };
        if path.extension().and_then(|s| s.to_str()) == Some("html") {
            Ok(self.strip_html(&raw))
        } else {
            Ok(raw)
        }
    }

    /// Reduce HTML to plain text: drop script/style, replace tags with
    /// newlines, decode the common entities, collapse blank runs.
    pub fn strip_html(&self, html: &str) -> String {
        let no_scripts = self.re_script.replace_all(html, "");
        let no_tags = self.re_tag.replace_all(&no_scripts, "\n");
        let decoded = no_tags
            .replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'");
        let mut out = String::with_capacity(decoded.len());
        let mut blank_run = 0usize;
        for line in decoded.lines() {
            let line = line.trim();
            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            out.push_str(line);
            out.push('\n');
        }
        out.trim().to_string()
    }

    fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                matches!(
                    e.path().extension().and_then(|s| s.to_str()),
                    Some("txt") | Some("md") | Some("html")
                )
            })
            .map(|e| e.path().to_path_buf())
            .collect()
    }
}

fn extract_doc_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        let loader = CorpusLoader::new();
        let html = "<html><head><style>body{}</style></head>\
                    <body><h1>Bệnh tim</h1><p>Triệu chứng &amp; điều trị</p></body></html>";
        let text = loader.strip_html(html);
        assert!(text.contains("Bệnh tim"));
        assert!(text.contains("Triệu chứng & điều trị"));
        assert!(!text.contains('<'));
    }
}
