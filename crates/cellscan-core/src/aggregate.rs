use crate::select::Candidate;

/// Text returned for a region that was checked but held no qualifying text.
pub const NO_TEXT_FOUND: &str = "No text found in the specified region";

/// Join candidates top to bottom with single spaces.
///
/// The sort is stable on `y` alone, so fragments on the same line keep the
/// order the OCR engine reported them in.
pub fn merge_reading_order(mut candidates: Vec<Candidate>) -> String {
    if candidates.is_empty() {
        return NO_TEXT_FOUND.to_string();
    }

    candidates.sort_by(|a, b| a.y.total_cmp(&b.y));
    candidates
        .into_iter()
        .map(|c| c.text)
        .collect::<Vec<_>>()
        .join(" ")
}
