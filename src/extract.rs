//! Mapping offset ranges back to source text.
//!
//! A [`SourceExtracter`] returns the text between two byte offsets. Fields
//! with several values are highlighted over the concatenation of the values
//! with an offset gap between them; the multi-source extracters map ranges
//! of that concatenation back to the values.

use std::borrow::Cow;

use crate::error::{HighlightError, Result};

/// Extracts slices of the source text.
pub trait SourceExtracter {
    /// Text between `start_offset` and `end_offset`.
    ///
    /// A range past the end of the source is a contract violation and fails
    /// with [`HighlightError::InvalidArgument`].
    fn extract(&self, start_offset: u32, end_offset: u32) -> Result<Cow<'_, str>>;

    /// Length of the source in bytes.
    fn len(&self) -> u32;

    /// Whether the source is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_range(start_offset: u32, end_offset: u32, len: u32) -> Result<()> {
    if end_offset < start_offset {
        return Err(HighlightError::invalid_argument(format!(
            "range ends at {end_offset} before it starts at {start_offset}"
        )));
    }
    if end_offset > len {
        return Err(HighlightError::invalid_argument(format!(
            "range {start_offset}..{end_offset} is past the end of a {len} byte source"
        )));
    }
    Ok(())
}

/// Extracts from a single string.
#[derive(Debug, Clone, Copy)]
pub struct StringSourceExtracter<'a> {
    text: &'a str,
}

impl<'a> StringSourceExtracter<'a> {
    /// Extracter over the whole of `text`.
    pub fn new(text: &'a str) -> Self {
        StringSourceExtracter { text }
    }
}

impl SourceExtracter for StringSourceExtracter<'_> {
    fn extract(&self, start_offset: u32, end_offset: u32) -> Result<Cow<'_, str>> {
        check_range(start_offset, end_offset, self.len())?;
        self.text
            .get(start_offset as usize..end_offset as usize)
            .map(Cow::Borrowed)
            .ok_or_else(|| {
                HighlightError::invalid_argument(format!(
                    "range {start_offset}..{end_offset} splits a character"
                ))
            })
    }

    fn len(&self) -> u32 {
        self.text.len() as u32
    }
}

struct Part<'a> {
    extracter: Box<dyn SourceExtracter + 'a>,
    start: u32,
}

impl Part<'_> {
    fn end(&self) -> u32 {
        self.start.saturating_add(self.extracter.len())
    }
}

/// The values of a multi-valued field laid end to end with a gap between
/// them. Offsets saturate at `u32::MAX`.
struct Parts<'a> {
    parts: Vec<Part<'a>>,
    offset_gap: u32,
}

impl<'a> Parts<'a> {
    fn new(offset_gap: u32) -> Self {
        Parts {
            parts: Vec::new(),
            offset_gap,
        }
    }

    fn push(&mut self, extracter: Box<dyn SourceExtracter + 'a>) {
        let start = self
            .parts
            .last()
            .map_or(0, |last| last.end().saturating_add(self.offset_gap));
        self.parts.push(Part { extracter, start });
    }

    fn len(&self) -> u32 {
        self.parts.last().map_or(0, Part::end)
    }

    /// The part whose range holds `offset`, preferring the one starting at it.
    fn part_at(&self, offset: u32) -> Option<&Part<'a>> {
        let index = self
            .parts
            .partition_point(|part| part.start <= offset)
            .checked_sub(1)?;
        let part = &self.parts[index];
        (offset <= part.end()).then_some(part)
    }
}

/// Extracts from several values but refuses ranges crossing from one value
/// into another.
pub struct NonMergingMultiSourceExtracter<'a> {
    parts: Parts<'a>,
}

impl<'a> NonMergingMultiSourceExtracter<'a> {
    /// Create an extracter with no values and `offset_gap` bytes between
    /// values.
    pub fn new(offset_gap: u32) -> Self {
        NonMergingMultiSourceExtracter {
            parts: Parts::new(offset_gap),
        }
    }

    /// Extracter over string values.
    pub fn from_values<S: AsRef<str>>(values: &'a [S], offset_gap: u32) -> Self {
        let mut extracter = Self::new(offset_gap);
        for value in values {
            extracter.push(StringSourceExtracter::new(value.as_ref()));
        }
        extracter
    }

    /// Append the next value.
    pub fn push<E: SourceExtracter + 'a>(&mut self, extracter: E) {
        self.parts.push(Box::new(extracter));
    }
}

impl SourceExtracter for NonMergingMultiSourceExtracter<'_> {
    fn extract(&self, start_offset: u32, end_offset: u32) -> Result<Cow<'_, str>> {
        check_range(start_offset, end_offset, self.len())?;
        let Some(part) = self.parts.part_at(start_offset) else {
            return Err(HighlightError::unsupported(format!(
                "range {start_offset}..{end_offset} starts between values"
            )));
        };
        if end_offset > part.end() {
            return Err(HighlightError::unsupported(format!(
                "range {start_offset}..{end_offset} crosses the value ending at {}",
                part.end()
            )));
        }
        part.extracter
            .extract(start_offset - part.start, end_offset - part.start)
    }

    fn len(&self) -> u32 {
        self.parts.len()
    }
}

/// Extracts from several values, joining the pieces of the values a range
/// covers with a separator.
///
/// The separator stands in for the gap after each value but the last, so a
/// range split anywhere extracts to the same text as the whole range.
pub struct MergingMultiSourceExtracter<'a> {
    parts: Parts<'a>,
    separator: String,
}

impl<'a> MergingMultiSourceExtracter<'a> {
    /// Create an extracter with no values, `offset_gap` bytes between values
    /// and `separator` put between the pieces of a merged range.
    pub fn new<S: Into<String>>(offset_gap: u32, separator: S) -> Self {
        MergingMultiSourceExtracter {
            parts: Parts::new(offset_gap),
            separator: separator.into(),
        }
    }

    /// Extracter over string values.
    pub fn from_values<S: AsRef<str>, T: Into<String>>(
        values: &'a [S],
        offset_gap: u32,
        separator: T,
    ) -> Self {
        let mut extracter = Self::new(offset_gap, separator);
        for value in values {
            extracter.push(StringSourceExtracter::new(value.as_ref()));
        }
        extracter
    }

    /// Append the next value.
    pub fn push<E: SourceExtracter + 'a>(&mut self, extracter: E) {
        self.parts.push(Box::new(extracter));
    }
}

impl SourceExtracter for MergingMultiSourceExtracter<'_> {
    fn extract(&self, start_offset: u32, end_offset: u32) -> Result<Cow<'_, str>> {
        check_range(start_offset, end_offset, self.len())?;
        if start_offset == end_offset {
            return Ok(Cow::Borrowed(""));
        }
        let parts = &self.parts.parts;
        let mut pieces = Vec::new();
        for (i, part) in parts.iter().enumerate() {
            if part.start >= end_offset {
                break;
            }
            if part.end() > start_offset {
                let start = start_offset.max(part.start) - part.start;
                let end = end_offset.min(part.end()) - part.start;
                pieces.push(part.extracter.extract(start, end)?);
            }
            // the separator sits where the gap after a value starts
            let gap = part.end();
            if i + 1 < parts.len() && start_offset <= gap && gap < end_offset {
                pieces.push(Cow::Borrowed(self.separator.as_str()));
            }
        }
        match pieces.len() {
            0 => Ok(Cow::Borrowed("")),
            1 => Ok(pieces.swap_remove(0)),
            _ => Ok(Cow::Owned(pieces.concat())),
        }
    }

    fn len(&self) -> u32 {
        self.parts.len()
    }
}
