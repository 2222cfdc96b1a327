//! Parent-child chunking for Vietnamese medical text.
//!
//! Parents are cut at detected section headers (or at `parent_max_size`),
//! children are cut from parents at sentence-aware boundaries with overlap.
//! Child text carries a `[header] ` prefix so it stays self-contained for
//! embedding and keyword search.

use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;

use viemed_core::types::{ChildChunk, ParentChunk};

/// Vietnamese function words excluded from keyword extraction.
pub const VIETNAMESE_STOPWORDS: &[&str] = &[
    "là", "của", "và", "có", "được", "trong", "với", "cho", "từ", "theo", "này", "đó", "các",
    "những", "một", "để", "khi", "đã", "sẽ", "bị", "về", "như", "hay", "hoặc", "nhưng", "mà",
    "nếu", "thì", "vì", "do",
];

const VIETNAMESE_CAPITALS: &str =
    "A-ZÀÁẠẢÃĂẮẰẲẴẶÂẤẦẨẪẬÈÉẸẺẼÊỀẾỂỄỆÌÍỊỈĨÒÓỌỎÕÔỐỒỔỖỘƠỚỜỞỠỢÙÚỤỦŨƯỨỪỬỮỰỲÝỴỶỸĐ";

/// Chunk size limits, in characters.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    pub parent_max_size: usize,
    pub child_max_size: usize,
    pub child_min_size: usize,
    pub child_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            parent_max_size: 1500,
            child_max_size: 500,
            child_min_size: 200,
            child_overlap: 100,
        }
    }
}

pub struct ParentChildChunker {
    config: ChunkerConfig,
    re_markdown: Regex,
    re_caps: Regex,
    re_question: Regex,
    re_numbered: Regex,
    re_bold: Regex,
    re_injected: Regex,
    re_word: Regex,
    re_sentence_capital: Regex,
    re_sentence_newline: Regex,
    re_sentence_punct: Regex,
}

impl Default for ParentChildChunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}

impl ParentChildChunker {
    pub fn new(config: ChunkerConfig) -> Self {
        #[allow(clippy::expect_used)]
        let build = |p: &str| Regex::new(p).expect("chunker pattern must compile");
        Self {
            config,
            re_markdown: build(r"^(#{1,6})\s+(.+)$"),
            re_caps: build(&format!(r"^([{VIETNAMESE_CAPITALS}\s]{{10,}})$")),
            re_question: build(
                r"(?i)^(.+\s+(là\s+gì|như\s+thế\s+nào|tại\s+sao|vì\s+sao)\??)$",
            ),
            re_numbered: build(r"^(?:[IVXivx]+\.|\d+\.|[a-z]\.)\s+(.+)$"),
            re_bold: build(r"^[*_]{2}(.+?)[*_]{2}$"),
            re_injected: build(r"^\[.+?\]\s*"),
            re_word: build(r"\w+"),
            re_sentence_capital: build(&format!(r"\. [{VIETNAMESE_CAPITALS}]")),
            re_sentence_newline: build(r"\.\n"),
            re_sentence_punct: build(r"[!?] "),
        }
    }

    /// Chunk one document into its parent-child hierarchy.
    pub fn chunk_document(
        &self,
        content: &str,
        doc_id: &str,
        doc_path: &str,
    ) -> Result<(Vec<ParentChunk>, Vec<ChildChunk>)> {
        let parents = self.create_parents(content, doc_id, doc_path);
        let mut children = Vec::new();
        for parent in &parents {
            children.extend(self.create_children(parent));
        }
        Ok((parents, children))
    }

    /// Detect a section header, returning `(header_text, depth)`.
    fn detect_header(&self, line: &str) -> Option<(String, usize)> {
        let line = line.trim_end();
        let len = line.chars().count();

        if let Some(caps) = self.re_markdown.captures(line) {
            let depth = caps[1].len();
            return Some((caps[2].trim().to_string(), depth));
        }
        if len < 100 {
            if let Some(caps) = self.re_caps.captures(line) {
                return Some((caps[1].trim().to_string(), 1));
            }
        }
        if len > 10 && len < 100 {
            if let Some(caps) = self.re_question.captures(line) {
                return Some((caps[1].trim().to_string(), 2));
            }
        }
        if len < 100 {
            if let Some(caps) = self.re_numbered.captures(line) {
                return Some((caps[1].trim().to_string(), 2));
            }
            if let Some(caps) = self.re_bold.captures(line) {
                return Some((caps[1].trim().to_string(), 2));
            }
        }
        None
    }

    fn create_parents(&self, content: &str, doc_id: &str, doc_path: &str) -> Vec<ParentChunk> {
        let mut parents = Vec::new();
        let mut section = String::new();
        let mut header = "Introduction".to_string();
        let mut depth = 1usize;
        let mut section_id = 0usize;

        let mut push = |text: &str, header: &str, depth: usize, section_id: &mut usize| {
            let text = text.trim();
            if text.is_empty() {
                return;
            }
            parents.push(ParentChunk {
                id: format!("{doc_id}_parent_{section_id}"),
                doc_id: doc_id.to_string(),
                doc_path: doc_path.to_string(),
                header: header.to_string(),
                section_depth: depth,
                content: text.to_string(),
                char_count: text.chars().count(),
            });
            *section_id += 1;
        };

        for line in content.lines() {
            if let Some((header_text, header_depth)) = self.detect_header(line) {
                push(&section, &header, depth, &mut section_id);
                header = header_text;
                depth = header_depth;
                section.clear();
            } else {
                section.push_str(line);
                section.push('\n');
                if section.chars().count() >= self.config.parent_max_size {
                    push(&section, &header, depth, &mut section_id);
                    section.clear();
                }
            }
        }
        push(&section, &header, depth, &mut section_id);
        parents
    }

    /// Find the best cut position at or before `max_chars`, returning a char
    /// offset and whether the cut lands on a complete sentence.
    ///
    /// Priority: paragraph break, Vietnamese-aware sentence end, trailing
    /// newline, hard cut. The minimum acceptable position is 60% of the
    /// window so boundaries always advance past the overlap.
    fn find_boundary(&self, text: &str, max_chars: usize) -> (usize, bool) {
        let limit = byte_at_char(text, max_chars);
        let window = &text[..limit];
        let min_acceptable = byte_at_char(text, max_chars * 6 / 10);

        if let Some(pos) = window.rfind("\n\n") {
            let end = pos + 2;
            if end >= min_acceptable {
                return (char_at_byte(text, end), true);
            }
        }

        let search_start = min_acceptable.max(byte_at_char(text, max_chars.saturating_sub(300)));
        let search = &window[search_start..];
        let mut best: Option<usize> = None;
        for m in self.re_sentence_capital.find_iter(search) {
            // skip likely abbreviations ("TP. HCM")
            let before = search[..m.start()].chars().next_back();
            if before.is_some_and(|c| c.is_ascii_uppercase()) {
                continue;
            }
            // cut after ". ", before the capital
            best = Some(best.map_or(m.start() + 2, |b: usize| b.max(m.start() + 2)));
        }
        for m in self
            .re_sentence_newline
            .find_iter(search)
            .chain(self.re_sentence_punct.find_iter(search))
        {
            best = Some(best.map_or(m.end(), |b: usize| b.max(m.end())));
        }
        if let Some(b) = best {
            return (char_at_byte(text, search_start + b), true);
        }

        if let Some(pos) = window.rfind('\n') {
            if char_at_byte(text, pos) + 100 > max_chars {
                return (char_at_byte(text, pos), false);
            }
        }
        (max_chars, false)
    }

    fn create_children(&self, parent: &ParentChunk) -> Vec<ChildChunk> {
        let text = parent.content.as_str();
        let total_chars = text.chars().count();
        let mut children = Vec::new();

        if total_chars <= self.config.child_max_size {
            children.push(self.make_child(parent, text, 0, true));
            return self.finalize_children(children);
        }

        let mut start = 0usize;
        let mut child_id = 0usize;
        while start < total_chars {
            let remaining = &text[byte_at_char(text, start)..];
            let remaining_chars = total_chars - start;
            let (end_off, complete) = if remaining_chars > self.config.child_max_size {
                self.find_boundary(remaining, self.config.child_max_size)
            } else {
                (remaining_chars, true)
            };
            let piece = &remaining[..byte_at_char(remaining, end_off)];
            let piece = piece.trim();
            if !piece.is_empty() {
                children.push(self.make_child(parent, piece, child_id, complete));
                child_id += 1;
            }
            let end = start + end_off;
            if end >= total_chars {
                break;
            }
            start = if end > start + self.config.child_overlap {
                end - self.config.child_overlap
            } else {
                end
            };
        }

        self.finalize_children(self.merge_small(children))
    }

    fn make_child(
        &self,
        parent: &ParentChunk,
        piece: &str,
        index: usize,
        complete: bool,
    ) -> ChildChunk {
        let content = format!("[{}] {}", parent.header, piece);
        let char_count = content.chars().count();
        let keywords = self.extract_keywords(&content, 5);
        ChildChunk {
            id: format!("{}_child_{}", parent.id, index),
            parent_id: parent.id.clone(),
            doc_id: parent.doc_id.clone(),
            doc_path: parent.doc_path.clone(),
            header: parent.header.clone(),
            content,
            chunk_index: index,
            total_children: 0,
            char_count,
            has_complete_sentences: complete,
            keywords,
        }
    }

    /// Merge children below `child_min_size` into their successor.
    fn merge_small(&self, children: Vec<ChildChunk>) -> Vec<ChildChunk> {
        if children.len() <= 1 {
            return children;
        }
        let mut merged: Vec<ChildChunk> = Vec::with_capacity(children.len());
        let mut iter = children.into_iter().peekable();
        while let Some(mut current) = iter.next() {
            if current.char_count < self.config.child_min_size && iter.peek().is_some() {
                if let Some(next) = iter.next() {
                    current.content = format!("{} {}", current.content, next.content);
                    current.char_count = current.content.chars().count();
                    current.has_complete_sentences = next.has_complete_sentences;
                    current.keywords = self.extract_keywords(&current.content, 5);
                }
            }
            merged.push(current);
        }
        merged
    }

    /// Re-assign contiguous indices, ids and total counts.
    fn finalize_children(&self, mut children: Vec<ChildChunk>) -> Vec<ChildChunk> {
        let total = children.len();
        for (idx, child) in children.iter_mut().enumerate() {
            child.chunk_index = idx;
            child.total_children = total;
            child.id = format!("{}_child_{}", child.parent_id, idx);
        }
        children
    }

    /// Top keywords by frequency, excluding stopwords and short tokens. The
    /// `[header] ` injection prefix is stripped before counting.
    pub fn extract_keywords(&self, text: &str, top_k: usize) -> Vec<String> {
        let text = self.re_injected.replace(text, "");
        let mut freq: HashMap<String, usize> = HashMap::new();
        for m in self.re_word.find_iter(&text) {
            let word = m.as_str().to_lowercase();
            if word.chars().count() <= 2 || VIETNAMESE_STOPWORDS.contains(&word.as_str()) {
                continue;
            }
            *freq.entry(word).or_insert(0) += 1;
        }
        let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.into_iter().take(top_k).map(|(w, _)| w).collect()
    }
}

/// Byte offset of the `n`-th character, clamped to the end of the string.
fn byte_at_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(b, _)| b)
}

/// Character offset of the byte position `b` (which must lie on a boundary).
fn char_at_byte(s: &str, b: usize) -> usize {
    s[..b].chars().count()
}
