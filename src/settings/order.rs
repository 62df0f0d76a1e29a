//! Element ordering: the name merge and the in-place reordering of a section.

use std::collections::{
    HashMap,
    HashSet,
};

use super::{
    definition::OrderPattern,
    locator,
};

/// Orders `new_names` following the preferred, possibly stale, `current_names`.
///
/// Names known from `current_names` keep their relative order. A name that
/// is new goes right after the block of names sharing its first word, where
/// that block starts at the first such name taken from `current_names`.
/// Names with no relative there are appended in the order they come in.
pub fn merge_order(current_names: &[String], new_names: &[String]) -> Vec<String> {
    let wanted: HashSet<&str> = new_names.iter().map(String::as_str).collect();

    let mut result: Vec<String> = Vec::with_capacity(new_names.len());
    for name in current_names {
        if wanted.contains(name.as_str()) && !result.contains(name) {
            result.push(name.clone());
        }
    }
    let known: HashSet<String> = result.iter().cloned().collect();

    for name in new_names {
        if result.contains(name) {
            continue;
        }

        let word = first_word(name);
        let anchor = result.iter().position(|n| known.contains(n) && first_word(n) == word);
        match anchor {
            Some(start) => {
                let mut idx = start + 1;
                while idx < result.len() && first_word(&result[idx]) == word {
                    idx += 1;
                }
                result.insert(idx, name.clone());
            }
            None => result.push(name.clone()),
        }
    }

    result
}

fn first_word(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or("")
}

/// Rearranges the elements of `section_text` into `desired` order.
///
/// When `desired` is not a permutation of the elements actually present it
/// is first reconciled with [`merge_order`]. Text between elements is kept.
pub fn reorder_section(section_text: &str, pattern: &OrderPattern, desired: &[String]) -> Result<String, String> {
    let elements = locator::locate_elements(section_text, pattern)?;
    let present: Vec<String> = elements.iter().map(|e| e.name.clone()).collect();

    let order = if is_permutation(desired, &present) { desired.to_vec() } else { merge_order(desired, &present) };

    let by_name: HashMap<&str, &str> = elements.iter().map(|e| (e.name.as_str(), e.text)).collect();

    let mut result = String::with_capacity(section_text.len());
    let mut cursor = 0;
    for (slot, name) in elements.iter().zip(order.iter()) {
        let replacement = by_name
            .get(name.as_str())
            .ok_or_else(|| format!("element '{}' disappeared while reordering", name))?;
        result.push_str(&section_text[cursor..slot.range.start]);
        result.push_str(replacement);
        cursor = slot.range.end;
    }
    result.push_str(&section_text[cursor..]);

    Ok(result)
}

fn is_permutation(candidate: &[String], names: &[String]) -> bool {
    if candidate.len() != names.len() {
        return false;
    }
    let candidate_set: HashSet<&String> = candidate.iter().collect();
    candidate_set.len() == candidate.len() && names.iter().all(|n| candidate_set.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_names_follow_their_relatives() {
        let result = merge_order(
            &names(&["Extra", "First Aid", "Missed Questions", "Boards and Beyond"]),
            &names(&[
                "Lecture Notes",
                "Boards and Beyond",
                "Boards and Beyond Links",
                "First Aid",
                "First Aid Links",
                "Extra",
                "Missed Questions",
            ]),
        );

        assert_eq!(
            result,
            names(&[
                "Extra",
                "First Aid",
                "First Aid Links",
                "Missed Questions",
                "Boards and Beyond",
                "Boards and Beyond Links",
                "Lecture Notes",
            ])
        );
    }

    #[test]
    fn test_multiple_first_word_matches() {
        let result = merge_order(
            &names(&["Sketchy", "Sketchy 1", "Extra"]),
            &names(&["Sketchy", "Sketchy 1", "Sketchy 2", "Extra"]),
        );
        assert_eq!(result, names(&["Sketchy", "Sketchy 1", "Sketchy 2", "Extra"]));
    }

    #[test]
    fn test_no_matches_keeps_new_order() {
        let result = merge_order(&names(&["Cherry", "Date"]), &names(&["Apple", "Banana"]));
        assert_eq!(result, names(&["Apple", "Banana"]));
    }

    #[test]
    fn test_merge_identities() {
        let list = names(&["Sketchy", "Extra", "Sketchy 2", "Pathoma"]);
        assert_eq!(merge_order(&list, &list), list);
        assert_eq!(merge_order(&[], &list), list);
    }

    #[test]
    fn test_output_is_exactly_the_new_names() {
        let current = names(&["Gone", "Extra", "Extra", "Sketchy"]);
        let new = names(&["Sketchy", "Sketchy Extra", "Extra", "Textbook"]);

        let result = merge_order(&current, &new);

        let mut sorted_result = result.clone();
        sorted_result.sort();
        let mut sorted_new = new.clone();
        sorted_new.sort();
        assert_eq!(sorted_result, sorted_new);
        assert_eq!(result, names(&["Extra", "Sketchy", "Sketchy Extra", "Textbook"]));
    }

    fn field_pattern() -> OrderPattern {
        OrderPattern::new(r"\{\{#(.+?)\}\}[\w\W]+?\{\{/.+?\}\}", r#"class="hint""#, &[r"\{\{#(.+?)\}\}"]).unwrap()
    }

    #[test]
    fn test_reorder_keeps_text_between_elements() {
        let text = r#"<h1>{{#A}}<b class="hint">a</b>{{/A}}
<hr>
{{#B}}<b class="hint">bb</b>{{/B}}
{{#C}}plain{{/C}}
{{#D}}<b class="hint">dddd</b>{{/D}}</h1>"#;

        let result = reorder_section(text, &field_pattern(), &names(&["D", "A", "B"])).unwrap();
        assert_eq!(
            result,
            r#"<h1>{{#D}}<b class="hint">dddd</b>{{/D}}
<hr>
{{#A}}<b class="hint">a</b>{{/A}}
{{#C}}plain{{/C}}
{{#B}}<b class="hint">bb</b>{{/B}}</h1>"#
        );
    }

    #[test]
    fn test_reorder_with_stale_order_merges_first() {
        let text = concat!(
            r#"{{#A}}<i class="hint"></i>{{/A}}|"#,
            r#"{{#B}}<i class="hint"></i>{{/B}}|"#,
            r#"{{#A 2}}<i class="hint"></i>{{/A 2}}"#,
        );

        // "Old" is gone and "A 2" is new; "A 2" lands next to "A"
        let result = reorder_section(text, &field_pattern(), &names(&["B", "Old", "A"])).unwrap();
        assert_eq!(
            result,
            r#"{{#B}}<i class="hint"></i>{{/B}}|{{#A}}<i class="hint"></i>{{/A}}|{{#A 2}}<i class="hint"></i>{{/A 2}}"#
        );
    }
}
