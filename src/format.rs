//! Rendering snippets as marked-up text.

use crate::error::Result;
use crate::extract::SourceExtracter;
use crate::snippet::Snippet;

/// Renders a snippet by wrapping every hit in a pre and a post tag.
///
/// Text between hits is copied unchanged. Overlapping hits are highlighted
/// as one run.
///
/// # Examples
///
/// ```
/// use sarissa_highlight::extract::StringSourceExtracter;
/// use sarissa_highlight::format::SnippetFormatter;
/// use sarissa_highlight::hit::Hit;
/// use sarissa_highlight::snippet::Snippet;
///
/// let text = "the lazy dog";
/// let extracter = StringSourceExtracter::new(text);
/// let formatter = SnippetFormatter::new(&extracter, "<em>", "</em>");
/// let snippet = Snippet::new(0, 12, vec![Hit::new(1, 4, 8, 1.0, 0)], 1.0).unwrap();
/// assert_eq!(formatter.format(&snippet).unwrap(), "the <em>lazy</em> dog");
/// ```
pub struct SnippetFormatter<'e> {
    extracter: &'e dyn SourceExtracter,
    pre_tag: String,
    post_tag: String,
}

impl<'e> SnippetFormatter<'e> {
    /// Create a formatter reading text from `extracter`.
    pub fn new<S: Into<String>, T: Into<String>>(
        extracter: &'e dyn SourceExtracter,
        pre_tag: S,
        post_tag: T,
    ) -> Self {
        SnippetFormatter {
            extracter,
            pre_tag: pre_tag.into(),
            post_tag: post_tag.into(),
        }
    }

    /// Render `snippet`.
    pub fn format(&self, snippet: &Snippet) -> Result<String> {
        let end = snippet.end_offset();
        let mut cursor = snippet.start_offset();
        let mut out = String::new();

        let mut hits = snippet.hits().iter().peekable();
        while let Some(hit) = hits.next() {
            let start = hit.start_offset.max(cursor);
            let mut hit_end = hit.end_offset;
            while let Some(next) = hits.next_if(|next| next.start_offset < hit_end) {
                hit_end = hit_end.max(next.end_offset);
            }
            let hit_end = hit_end.min(end);
            if hit_end <= start {
                continue;
            }
            if start > cursor {
                out.push_str(&self.extracter.extract(cursor, start)?);
            }
            out.push_str(&self.pre_tag);
            out.push_str(&self.extracter.extract(start, hit_end)?);
            out.push_str(&self.post_tag);
            cursor = hit_end;
        }
        if cursor < end {
            out.push_str(&self.extracter.extract(cursor, end)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HighlightError;
    use crate::extract::{MergingMultiSourceExtracter, StringSourceExtracter};
    use crate::hit::Hit;

    const TEXT: &str = "The quick brown fox jumped over the lazy dog.";

    #[test]
    fn test_no_hits_is_plain_text() {
        let extracter = StringSourceExtracter::new(TEXT);
        let formatter = SnippetFormatter::new(&extracter, "<em>", "</em>");
        let snippet = Snippet::new(4, 19, Vec::new(), 0.0).unwrap();
        assert_eq!(formatter.format(&snippet).unwrap(), "quick brown fox");
    }

    #[test]
    fn test_marks_every_hit() {
        let extracter = StringSourceExtracter::new(TEXT);
        let formatter = SnippetFormatter::new(&extracter, "[", "]");
        let hits = vec![Hit::new(0, 0, 3, 1.0, 0), Hit::new(6, 32, 35, 1.0, 0)];
        let snippet = Snippet::new(0, 45, hits, 2.0).unwrap();
        assert_eq!(
            formatter.format(&snippet).unwrap(),
            "[The] quick brown fox jumped over [the] lazy dog."
        );
    }

    #[test]
    fn test_overlapping_hits_form_one_run() {
        let extracter = StringSourceExtracter::new(TEXT);
        let formatter = SnippetFormatter::new(&extracter, "<b>", "</b>");
        let hits = vec![Hit::new(0, 4, 9, 1.0, 0), Hit::new(0, 6, 15, 1.0, 1)];
        let snippet = Snippet::new(4, 19, hits, 2.0).unwrap();
        assert_eq!(formatter.format(&snippet).unwrap(), "<b>quick brown</b> fox");
    }

    #[test]
    fn test_multi_valued() {
        let values = ["foo", "bar"];
        let extracter = MergingMultiSourceExtracter::from_values(&values, 1, " ");
        let formatter = SnippetFormatter::new(&extracter, "<em>", "</em>");
        let snippet = Snippet::new(0, 7, vec![Hit::new(1, 4, 7, 1.0, 0)], 1.0).unwrap();
        assert_eq!(formatter.format(&snippet).unwrap(), "foo <em>bar</em>");
    }

    #[test]
    fn test_range_past_source_fails() {
        let extracter = StringSourceExtracter::new("short");
        let formatter = SnippetFormatter::new(&extracter, "<em>", "</em>");
        let snippet = Snippet::new(0, 10, Vec::new(), 0.0).unwrap();
        let err = formatter.format(&snippet).unwrap_err();
        assert!(matches!(err, HighlightError::InvalidArgument(_)));
    }
}
