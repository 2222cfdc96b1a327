//! Rule-based Vietnamese word segmentation for BM25.
//!
//! Vietnamese compound terms ("đau đầu", "cao huyết áp") are single lexical
//! units; joining them with underscores before tokenization keeps them as one
//! BM25 term instead of two meaningless syllables.

use regex::Regex;

/// Compound medical terms protected during segmentation.
const MEDICAL_COMPOUNDS: &[&str] = &[
    "đau_đầu",
    "cao_huyết_áp",
    "tiểu_đường",
    "tai_biến",
    "nhồi_máu",
    "ung_thư",
    "viêm_gan",
    "viêm_phổi",
    "sốt_xuất_huyết",
    "suy_thận",
    "đột_quỵ",
    "rối_loạn_lo_âu",
    "trầm_cảm",
];

pub struct VietnameseSegmenter {
    compounds: Vec<(Regex, &'static str)>,
}

impl Default for VietnameseSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl VietnameseSegmenter {
    pub fn new() -> Self {
        #[allow(clippy::expect_used)]
        let compounds = MEDICAL_COMPOUNDS
            .iter()
            .map(|compound| {
                let pattern = compound.replace('_', r"\s+");
                (
                    Regex::new(&pattern).expect("compound pattern must compile"),
                    *compound,
                )
            })
            .collect();
        Self { compounds }
    }

    /// Lowercase and join known compound words with underscores.
    pub fn segment(&self, text: &str) -> String {
        let mut out = text.to_lowercase();
        for (pattern, compound) in &self.compounds {
            out = pattern.replace_all(&out, *compound).into_owned();
        }
        out
    }

    pub fn segment_chunks(&self, chunks: &[String]) -> Vec<String> {
        chunks.iter().map(|c| self.segment(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_medical_compounds() {
        let seg = VietnameseSegmenter::new();
        assert_eq!(
            seg.segment("Tôi bị đau đầu và cao huyết áp"),
            "tôi bị đau_đầu và cao_huyết_áp"
        );
    }

    #[test]
    fn segment_is_idempotent() {
        let seg = VietnameseSegmenter::new();
        let once = seg.segment("Bệnh tiểu đường type 2");
        assert_eq!(seg.segment(&once), once);
    }

    #[test]
    fn lowercases_plain_text() {
        let seg = VietnameseSegmenter::new();
        assert_eq!(seg.segment("Triệu Chứng"), "triệu chứng");
    }
}
