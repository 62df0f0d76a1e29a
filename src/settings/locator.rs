//! Finds the text a setting definition operates on.
//!
//! Every regex a definition carries is evaluated here. Handlers only ever see
//! the located [`Section`] and the [`Element`]s inside it.

use std::ops::Range;

use regex::Regex;

use super::definition::OrderPattern;
use crate::core::FileRef;

/// The first match of a definition's regex inside one file's text.
///
/// Offsets are only valid for the text the section was located in.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'t> {
    pub file: FileRef,
    pub text: &'t str,
    pub offset: usize,
    /// Span of the first capture group, relative to `text`.
    pub capture: Option<Range<usize>>,
}

impl<'t> Section<'t> {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.text.len()
    }

    pub fn captured(&self) -> Option<&'t str> {
        self.capture.clone().map(|span| &self.text[span])
    }
}

pub fn is_present(regex: &Regex, file_text: &str) -> bool {
    regex.is_match(file_text)
}

pub fn locate<'t>(regex: &Regex, file: FileRef, file_text: &'t str) -> Option<Section<'t>> {
    let captures = regex.captures(file_text)?;
    let whole = captures.get(0)?;
    let capture = captures
        .get(1)
        .map(|group| (group.start() - whole.start())..(group.end() - whole.start()));

    Some(Section { file, text: whole.as_str(), offset: whole.start(), capture })
}

/// Swaps the section's capture group for `new_value`, leaving every other byte alone.
pub fn replace_capture(section: &Section<'_>, new_value: &str) -> String {
    match &section.capture {
        Some(span) => {
            let mut result = String::with_capacity(section.text.len() + new_value.len());
            result.push_str(&section.text[..span.start]);
            result.push_str(new_value);
            result.push_str(&section.text[span.end..]);
            result
        }
        None => section.text.to_string(),
    }
}

/// Replaces exactly the located occurrence of `section` inside `file_text`.
pub fn splice(file_text: &str, section: &Section<'_>, new_section: &str) -> String {
    let range = section.range();
    let mut result = String::with_capacity(file_text.len() + new_section.len());
    result.push_str(&file_text[..range.start]);
    result.push_str(new_section);
    result.push_str(&file_text[range.end..]);
    result
}

/// One named, movable construct inside an order section.
#[derive(Debug, Clone, PartialEq)]
pub struct Element<'t> {
    pub name: String,
    pub text: &'t str,
    /// Relative to the section text.
    pub range: Range<usize>,
}

/// Lists the qualifying elements of `section_text` in document order.
///
/// A name that shows up twice is only listed at its first position; the
/// later copies stay where they are.
pub fn locate_elements<'t>(
    section_text: &'t str,
    pattern: &OrderPattern,
) -> Result<Vec<Element<'t>>, String> {
    let mut elements: Vec<Element<'t>> = Vec::new();

    for m in pattern.element.find_iter(section_text) {
        let text = m.as_str();
        if !pattern.has_to_contain.is_match(text) {
            continue;
        }
        if let Some(excluded) = &pattern.exclude {
            if text.contains(excluded.as_str()) {
                continue;
            }
        }

        let name = pattern
            .name_patterns
            .iter()
            .find_map(|re| re.captures(text).and_then(|c| c.get(1)).map(|g| g.as_str()))
            .ok_or_else(|| format!("could not determine the name of element '{}'", text))?;

        if elements.iter().any(|e| e.name == name) {
            continue;
        }
        elements.push(Element { name: name.to_string(), text, range: m.range() });
    }

    Ok(elements)
}
