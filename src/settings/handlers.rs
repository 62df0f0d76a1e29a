//! Per-kind extract and inject over a located section.

use super::{
    definition::SettingKind,
    locator::{
        self,
        Section,
    },
    order,
    value::SettingValue,
};
use crate::core::SettingError;

/// Reported for a user action whose script is not one of the known options.
pub const CUSTOM_USER_ACTION: &str = "custom";

/// Literals a color picker produces for "no color of its own".
pub const INHERIT_SENTINELS: &[&str] = &["transparent", "#00000000"];
pub const INHERIT: &str = "inherit";

pub fn extract(setting: &str, kind: &SettingKind, section: &Section<'_>) -> Result<SettingValue, SettingError> {
    match kind {
        SettingKind::Checkbox => match captured(setting, section)? {
            "true" => Ok(SettingValue::Bool(true)),
            "false" => Ok(SettingValue::Bool(false)),
            other => Err(SettingError::parse(setting, format!("expected 'true' or 'false' but got '{}'", other))),
        },
        SettingKind::ReCheckbox { replacement_pairs } => {
            let checked = replacement_pairs.iter().all(|(_, on)| section.text.contains(on.as_str()));
            let unchecked = replacement_pairs.iter().all(|(off, _)| section.text.contains(off.as_str()));
            if checked == unchecked {
                return Err(SettingError::parse(
                    setting,
                    format!("error involving replacement_pairs={:?} and section={:?}", replacement_pairs, section.text),
                ));
            }
            Ok(SettingValue::Bool(checked))
        }
        SettingKind::WrapCheckbox { start, end } => Ok(SettingValue::Bool(is_wrapped(section.text, start, end))),
        SettingKind::Text | SettingKind::Shortcut => {
            Ok(SettingValue::Text(unescape_quotes(captured(setting, section)?)))
        }
        SettingKind::FontFamily | SettingKind::Color { .. } => Ok(SettingValue::text(captured(setting, section)?)),
        SettingKind::Number { decimal, .. } => {
            let raw = captured(setting, section)?;
            let trimmed = raw.trim();
            let parsed = if *decimal {
                trimmed.parse::<f64>().ok().map(SettingValue::Decimal)
            } else {
                trimmed.parse::<i64>().ok().map(SettingValue::Integer)
            };
            parsed.ok_or_else(|| {
                SettingError::parse(
                    setting,
                    format!("expected {} but found {}", if *decimal { "decimal" } else { "integer" }, raw),
                )
            })
        }
        SettingKind::Dropdown { options } => {
            let raw = captured(setting, section)?;
            if !options.iter().any(|o| o == raw) {
                return Err(SettingError::parse(setting, format!("expected one of {:?} but got {}", options, raw)));
            }
            Ok(SettingValue::text(raw))
        }
        SettingKind::UserAction { options, .. } => {
            let raw = captured(setting, section)?.trim_end();
            if options.iter().any(|o| o == raw) {
                Ok(SettingValue::text(raw))
            } else {
                Ok(SettingValue::text(CUSTOM_USER_ACTION))
            }
        }
        SettingKind::Order(pattern) => {
            let elements = locator::locate_elements(section.text, pattern)
                .map_err(|message| SettingError::parse(setting, message))?;
            Ok(SettingValue::List(elements.into_iter().map(|e| e.name).collect()))
        }
    }
}

/// Returns the new section text for `value`.
///
/// `value` must already satisfy [`SettingKind::accepts`]. Only order
/// settings can fail here, when the section's elements cannot be named.
pub fn inject(
    setting: &str,
    kind: &SettingKind,
    section: &Section<'_>,
    value: &SettingValue,
) -> Result<String, SettingError> {
    let result = match (kind, value) {
        (SettingKind::Checkbox, SettingValue::Bool(on)) => {
            locator::replace_capture(section, if *on { "true" } else { "false" })
        }
        (SettingKind::ReCheckbox { replacement_pairs }, SettingValue::Bool(on)) => {
            let mut result = section.text.to_string();
            for (off, on_marker) in replacement_pairs {
                result = if *on {
                    result.replace(off.as_str(), on_marker)
                } else {
                    result.replace(on_marker.as_str(), off)
                };
            }
            result
        }
        (SettingKind::WrapCheckbox { start, end }, SettingValue::Bool(on)) => {
            let wrapped = is_wrapped(section.text, start, end);
            match (*on, wrapped) {
                (true, false) => format!("{}{}{}", start, section.text, end),
                (false, true) => section.text[start.len()..section.text.len() - end.len()].to_string(),
                _ => section.text.to_string(),
            }
        }
        (SettingKind::Text | SettingKind::Shortcut, SettingValue::Text(s)) => {
            locator::replace_capture(section, &escape_quotes(s))
        }
        (SettingKind::FontFamily | SettingKind::Dropdown { .. }, SettingValue::Text(s)) => {
            locator::replace_capture(section, s)
        }
        (SettingKind::Number { decimal, .. }, number) => match number.as_f64() {
            Some(n) => locator::replace_capture(section, &format_number(n, *decimal)),
            None => section.text.to_string(),
        },
        (SettingKind::UserAction { .. }, SettingValue::Text(s)) => {
            if s == CUSTOM_USER_ACTION {
                section.text.to_string()
            } else {
                let raw = section.captured().unwrap_or("");
                let trailing = &raw[raw.trim_end().len()..];
                locator::replace_capture(section, &format!("{}{}", s, trailing))
            }
        }
        (SettingKind::Color { with_inherit_option }, SettingValue::Text(s)) => {
            let literal = if *with_inherit_option && INHERIT_SENTINELS.contains(&s.as_str()) { INHERIT } else { s };
            locator::replace_capture(section, literal)
        }
        (SettingKind::Order(pattern), SettingValue::List(desired)) => {
            order::reorder_section(section.text, pattern, desired)
                .map_err(|message| SettingError::parse(setting, message))?
        }
        _ => section.text.to_string(),
    };
    Ok(result)
}

fn captured<'t>(setting: &str, section: &Section<'t>) -> Result<&'t str, SettingError> {
    section
        .captured()
        .ok_or_else(|| SettingError::parse(setting, format!("no value found in '{}'", section.text)))
}

fn is_wrapped(text: &str, start: &str, end: &str) -> bool {
    text.len() >= start.len() + end.len() && text.starts_with(start) && text.ends_with(end)
}

fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}

fn unescape_quotes(value: &str) -> String {
    value.replace("\\\"", "\"")
}

fn format_number(n: f64, decimal: bool) -> String {
    if decimal {
        // keep a decimal point so the template keeps reading as a float literal
        if n.fract() == 0.0 {
            format!("{:.1}", n)
        } else {
            n.to_string()
        }
    } else {
        (n.round() as i64).to_string()
    }
}
