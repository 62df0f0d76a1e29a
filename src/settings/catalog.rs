//! Built-in setting definitions for the packaged notetypes.
//!
//! Most settings are listed by hand below. The per-field ones (disable a
//! field, hint button shortcut, auto reveal) are generated by
//! [`field_definitions`] for every configurable field the registry finds in a
//! packaged back template.

use super::definition::{
    OrderPattern,
    SettingDefinition,
    SettingKind,
};
use crate::core::{
    FileRef,
    NotetypeError,
};

/// Text between double quotes, escaped quotes included.
pub const QUOT_STR_RE: &str = r#"(?:\\.|[^"\\])"#;

/// A conditional field block only counts as configurable if it contains one of these.
pub const CONFIGURABLE_FIELD_HAS_TO_CONTAIN_RE: &str = r#"(class="hint"|id="extra"|id="dermnet"|id="ome"|id="ca1")"#;

pub const CONFIGURABLE_FIELD_NAME_RE: &str = r#"data-name="([\w\W]+?)""#;
pub const CONFIGURABLE_FIELD_FALLBACK_NAME_RE: &str = r"\{\{#(.+?)\}\}";

pub const BUTTON_SHORTCUTS_RE: &str = r"var+ ButtonShortcuts *= *\{([^}]*)\}";
pub const BUTTON_SHORTCUT_PAIR_RE: &str = r#""([^"]+)" *: *"([^"]*)""#;

pub const OME_FIELD_NAME: &str = "OME";

pub const HINT_BUTTONS: &[(&str, &str)] = &[
    ("ln", "Personal/Lecture Notes"),
    ("mq", "Missed Questions"),
    ("tx", "Textbook"),
    ("ar", "Additional Resources"),
    ("pixorize", "Pixorize"),
    ("sketchy", "Sketchy"),
    ("sketchy2", "Sketchy 2"),
    ("sketchyextra", "Sketchy Extra"),
    ("pat", "Pathoma"),
    ("bb", "Boards and Beyond"),
    ("fa", "First Aid"),
    ("picomnic", "Picomnic"),
    ("physeo", "Physeo"),
    ("bootcamp", "Bootcamp"),
    ("ome", "OME"),
    ("df", "Definitions"),
    ("exp", "Examples"),
    ("alt", "Alternative Translations"),
    ("ex", "Extra"),
];

const MOBILE_USER_ACTIONS: &[(&str, &str)] = &[
    ("undefined", "None"),
    ("window.revealNextCloze", "Reveal Next Cloze"),
    ("window.toggleAllCloze", "Toggle All Clozes"),
    ("() => revealNextClozeOf('word')", "Reveal Cloze Word"),
    ("window.toggleNextButton", "Toggle Next Button"),
    (
        "() => (Array.from(document.getElementsByClassName('hintBtn')).forEach(e => toggleHintBtn(e.id)))",
        "Toggle All Buttons",
    ),
    ("window.toggleNext", "Reveal Next Occlusion"),
    ("window.toggleAll", "Toggle All Occlusions"),
    ("window.showtags", "Toggle Tags"),
];

pub const USER_ACTION_COUNT: usize = 8;

/// Settings that apply to every notetype defining them, in display order.
pub const GENERAL_SETTINGS: &[&str] = &[
    "toggle_next_button",
    "toggle_all_buttons",
    "autoscroll_to_button",
    "tags_toggle_shortcut",
    "tags_container",
    "tags_container_mobile",
    "reveal_cloze_shortcut",
    "tags_num_levels_to_show_front",
    "tags_num_levels_to_show_back",
    "toggle_all_clozes_shortcut",
    "reveal_next_cloze_mode",
    "cloze_hider",
    "always_one_by_one",
    "selective_one_by_one",
    "min_number_of_clozes_fo_one_by_one",
    "timer",
    "timer_secs",
    "timer_minutes",
    "autoflip",
    "front_tts",
    "front_tts_speed",
    "back_tts",
    "back_tts_speed",
    "front_signal_tag",
    "back_signal_tag",
    "font_size",
    "font_size_mobile",
    "font_family",
    "image_height",
    "image_width",
    "text_color",
    "background_color",
    "cloze_color",
    "extra_text_color",
    "hint_text_color",
    "missed_text_color",
    "timer_text_color",
    "nm_text_color",
    "nm_background_color",
    "nm_cloze_color",
    "nm_extra_color",
    "nm_hint_color",
    "bold_text_color",
    "underlined_text_color",
    "italic_text_color",
    "image_occlusion_rect_color",
    "image_occlusion_border_color",
    "image_occlusion_active_rect_color",
    "image_occlusion_active_border_color",
    "user_action_1",
    "user_action_2",
    "user_action_3",
    "user_action_4",
    "user_action_5",
    "user_action_6",
    "user_action_7",
    "user_action_8",
];

/// `{{#name}}` or the pseudo field span some templates use instead.
fn field_boundary(ch: char, field_name_re: &str) -> String {
    format!(r"(?:\{{\{{{ch}{field_name_re}\}}\}}|<span.+?PSEUDO-FIELD {ch}{field_name_re}</span>)")
}

/// A conditional field block, optionally commented out.
///
/// `field_name_re` is a regex; pass `.+?` to match any field.
pub fn conditional_field_re(field_name_re: &str) -> String {
    format!(
        r"(?:<!-- ?)?{}[\w\W]+?{}(?: ?-->)?",
        field_boundary('#', field_name_re),
        field_boundary('/', field_name_re)
    )
}

pub fn configurable_field_pattern() -> Result<OrderPattern, NotetypeError> {
    Ok(OrderPattern::new(
        &conditional_field_re(".+?"),
        CONFIGURABLE_FIELD_HAS_TO_CONTAIN_RE,
        &[CONFIGURABLE_FIELD_NAME_RE, CONFIGURABLE_FIELD_FALLBACK_NAME_RE],
    )?)
}

/// Option scripts and their labels for the mobile user action settings.
pub fn user_actions() -> (Vec<String>, Vec<String>) {
    let mut options: Vec<String> = MOBILE_USER_ACTIONS.iter().map(|(o, _)| o.to_string()).collect();
    let mut labels: Vec<String> = MOBILE_USER_ACTIONS.iter().map(|(_, l)| l.to_string()).collect();
    for (id, name) in HINT_BUTTONS {
        options.push(format!("() => toggleHintBtn('hint-{}')", id));
        labels.push(format!("Reveal {}", name));
    }
    (options, labels)
}

/// `field_name` lowercased with spaces turned into underscores.
pub fn snake_case(field_name: &str) -> String {
    field_name.to_lowercase().replace(' ', "_")
}

fn quoted_var(var: &str) -> String {
    format!(r#"var +{} += +"({}*?)""#, var, QUOT_STR_RE)
}

fn shortcut(
    name: &str,
    label: &str,
    var: &str,
    group: &str,
    default: &str,
) -> Result<SettingDefinition, NotetypeError> {
    Ok(SettingDefinition::new(name, SettingKind::Shortcut, FileRef::Back, &quoted_var(var))?
        .label(label)
        .group(group)
        .default_value(default))
}

fn color(name: &str, label: &str, pattern: &str, default: &str) -> Result<SettingDefinition, NotetypeError> {
    Ok(SettingDefinition::new(name, SettingKind::Color { with_inherit_option: false }, FileRef::Style, pattern)?
        .label(label)
        .group("Colors")
        .default_value(default))
}

fn inherit_color(name: &str, label: &str, pattern: &str) -> Result<SettingDefinition, NotetypeError> {
    Ok(SettingDefinition::new(name, SettingKind::Color { with_inherit_option: true }, FileRef::Style, pattern)?
        .label(label)
        .tooltip("set to transparent for normal color")
        .group("Colors")
        .default_value("inherit"))
}

fn shown_checkbox(
    name: &str,
    label: &str,
    pattern: &str,
    group: &str,
    default: bool,
) -> Result<SettingDefinition, NotetypeError> {
    Ok(SettingDefinition::new(name, SettingKind::re_checkbox(&[("none", "block")]), FileRef::Style, pattern)?
        .label(label)
        .group(group)
        .default_value(default))
}

fn tts(name: &str, label: &str, file: FileRef) -> Result<SettingDefinition, NotetypeError> {
    Ok(SettingDefinition::new(
        name,
        SettingKind::re_checkbox(&[("<!--", "{{"), ("-->", "}}")]),
        file,
        r"(<!--|\{\{)tts.+?(-->|\}\})",
    )?
    .label(label)
    .group("Text to Speech")
    .default_value(false))
}

fn tts_speed(name: &str, label: &str, file: FileRef) -> Result<SettingDefinition, NotetypeError> {
    Ok(SettingDefinition::new(
        name,
        SettingKind::decimal(0.1, 10.0, 0.1),
        file,
        r"(?:<!--|\{\{)tts.*?speed=([\d\.]+).*?(?:-->|\}\})",
    )?
    .label(label)
    .group("Text to Speech")
    .default_value(1.4))
}

/// The hand-written catalog, in display order.
pub fn builtin_definitions() -> Result<Vec<SettingDefinition>, NotetypeError> {
    let mut defs = vec![
        SettingDefinition::new(
            "field_order",
            SettingKind::Order(configurable_field_pattern()?),
            FileRef::Back,
            r"[\w\W]*",
        )?
        .label("Field Order")
        .tooltip("drag and drop the field names to adjust their order")
        .group("Fields"),
        shortcut("toggle_next_button", "Toggle next button shortcut", "ToggleNextButtonShortcut", "Hint Buttons", "H")?,
        shortcut("toggle_all_buttons", "Toggle all buttons shortcut", "ToggleAllButtonsShortcut", "Hint Buttons", "'")?,
        SettingDefinition::new(
            "autoscroll_to_button",
            SettingKind::Checkbox,
            FileRef::Back,
            r"var +ScrollToButton += +(false|true)",
        )?
        .label("scroll to button when toggled")
        .group("Hint Buttons")
        .default_value(true),
        shortcut(
            "io_reveal_next_shortcut",
            "Image Occlusion Reveal Next",
            "RevealIncrementalShortcut",
            "Image Occlusion",
            "N",
        )?,
        shortcut(
            "io_toggle_all_shortcut",
            "Image Occlusion Toggle All",
            "ToggleAllOcclusionsShortcut",
            "Image Occlusion",
            ",",
        )?,
        shortcut("reveal_cloze_shortcut", "Reveal Cloze Shortcut", "revealNextShortcut", "Clozes", "N")?,
        shortcut(
            "reveal_cloze_word_shortcut",
            "Reveal Cloze Word Shortcut",
            "revealNextWordShortcut",
            "Clozes",
            "Shift+N",
        )?,
        shortcut("toggle_all_clozes_shortcut", "Toggle all clozes shortcut", "toggleAllShortcut", "Clozes", ",")?,
        SettingDefinition::new(
            "reveal_next_cloze_mode",
            SettingKind::dropdown(&["cloze", "word"]),
            FileRef::Back,
            r#"var +revealNextClozeMode += +"([^"]*?)""#,
        )?
        .label("Reveal Next Cloze Mode")
        .tooltip("cloze: clozes are revealed normally\nword: clozes are revealed word by word")
        .group("Clozes")
        .default_value("cloze"),
        SettingDefinition::new(
            "cloze_hider",
            SettingKind::Text,
            FileRef::Back,
            &format!(r#"var +clozeHider +=[^"]+"({}*?)""#, QUOT_STR_RE),
        )?
        .label("Cloze Hider")
        .tooltip("Text that will displayed instead of the clozed text")
        .group("Clozes")
        .default_value("👑"),
        SettingDefinition::in_files(
            "always_one_by_one",
            SettingKind::Checkbox,
            &[FileRef::Front, FileRef::Back],
            r"var +alwaysOneByOne += +(false|true)",
        )?
        .label("Always enable one-by-one regardless of whether the one-by-one field is non-empty")
        .group("Clozes")
        .default_value(false),
        SettingDefinition::in_files(
            "selective_one_by_one",
            SettingKind::Checkbox,
            &[FileRef::Front, FileRef::Back],
            r"var +selectiveOneByOne += +(false|true)",
        )?
        .label("Selective one-by-one")
        .tooltip(
            "Allows you to selectively enable one-by-one for some cards \
             by adding their number to the one-by-one field (separated by commas)",
        )
        .group("Clozes")
        .default_value(false),
        SettingDefinition::in_files(
            "min_number_of_clozes_fo_one_by_one",
            SettingKind::number_in(Some(0.0), None),
            &[FileRef::Front, FileRef::Back],
            r"var +minNumberOfClozes += +([^ /\n]*);",
        )?
        .label("Minimum number of clozes for one-by-one (if 0, then no limit)")
        .group("Clozes")
        .default_value(0i64),
        shown_checkbox("timer", "Timer", r"\.timer *\{[^}]*?display: (block|none);", "Timer", true)?,
        SettingDefinition::new(
            "timer_secs",
            SettingKind::number_in(Some(0.0), None),
            FileRef::Front,
            r"var +seconds += +([^ /\n]*)",
        )?
        .label("timer duration (seconds)")
        .group("Timer")
        .default_value(9i64),
        SettingDefinition::new(
            "timer_minutes",
            SettingKind::number_in(Some(0.0), None),
            FileRef::Front,
            r"var +minutes += +([^ /\n]*)",
        )?
        .label("timer duration (minutes)")
        .group("Timer")
        .default_value(0i64),
        SettingDefinition::new("autoflip", SettingKind::Checkbox, FileRef::Front, r"var +autoflip += +(false|true)")?
            .label("flip to back of card automatically when one by one is enabled\n(doesn't work on AnkiMobile)")
            .default_value(true),
        tts("front_tts", "Front TTS", FileRef::Front)?,
        tts_speed("front_tts_speed", "Front TTS Speed", FileRef::Front)?,
        tts("back_tts", "Back TTS", FileRef::Back)?.tooltip(
            "if you enable this and want to use the shortcut for revealing hint buttons one by one\n\
             you may have to change the \"Toggle next Button\" shortcut to something else than \"H\"\n\
             (it is in the Hint Buttons section)",
        ),
        tts_speed("back_tts_speed", "Back TTS Speed", FileRef::Back)?,
        SettingDefinition::new("front_signal_tag", SettingKind::Text, FileRef::Front, &quoted_var("tagID"))?
            .label("tag that will trigger red background for the front")
            .group("Tags")
            .default_value("XXXYYYZZZ"),
        SettingDefinition::new("back_signal_tag", SettingKind::Text, FileRef::Back, &quoted_var("tagID"))?
            .label("tag that will trigger red background for the back")
            .group("Tags")
            .default_value("XXXYYYZZZ"),
        shown_checkbox(
            "tags_container",
            "Tags container",
            r"\n#tags-container *\{[^}]*?display: (block|none);",
            "Tags",
            true,
        )?,
        shown_checkbox(
            "tags_container_mobile",
            "Tags container (mobile)",
            r"\.mobile +#tags-container *\{[^}]*?display: (block|none);",
            "Tags",
            false,
        )?,
        shortcut("tags_toggle_shortcut", "Toggle Tags Shorcut", "toggleTagsShortcut", "Tags", "C")?,
        SettingDefinition::new(
            "tags_num_levels_to_show_front",
            SettingKind::number(),
            FileRef::Front,
            r"var +numTagLevelsToShow += +(\d+)",
        )?
        .label("Number of tag levels to show on Front (0 means all)")
        .group("Tags")
        .default_value(0i64),
        SettingDefinition::new(
            "tags_num_levels_to_show_back",
            SettingKind::number(),
            FileRef::Back,
            r"var +numTagLevelsToShow += +(\d+)",
        )?
        .label("Number of tag levels to show on Back (0 means all)")
        .group("Tags")
        .default_value(0i64),
        SettingDefinition::new(
            "font_size",
            SettingKind::number_in(Some(1.0), Some(200.0)),
            FileRef::Style,
            r"html *\{[^}]*?font-size: (\d+)px;",
        )?
        .label("Font Size")
        .group("Font")
        .default_value(28i64),
        SettingDefinition::new(
            "font_size_mobile",
            SettingKind::number_in(Some(1.0), Some(200.0)),
            FileRef::Style,
            r"\.mobile *\{[^}]*?font-size: ([\d]+)px;",
        )?
        .label("Font Size (mobile)")
        .group("Font")
        .default_value(28i64),
        SettingDefinition::new(
            "font_family",
            SettingKind::FontFamily,
            FileRef::Style,
            r"\.card.*\n*kbd *\{[^}]*?font-family: (.+);",
        )?
        .label("Font Family")
        .group("Font")
        .default_value("Arial Greek, Arial"),
        SettingDefinition::new(
            "image_height",
            SettingKind::number_in(None, Some(100.0)),
            FileRef::Style,
            r"\nimg *\{[^}]*?max-height: (.+)%;",
        )?
        .label("Max Image Height Percent")
        .group("Image Styling")
        .default_value(100i64),
        SettingDefinition::new(
            "image_width",
            SettingKind::number_in(None, Some(100.0)),
            FileRef::Style,
            r"\nimg *\{[^}]*?max-width: (.+)%;",
        )?
        .label("Max Image Width Percent")
        .group("Image Styling")
        .default_value(85i64),
        color("text_color", "Default Text color", r"\.card *\{[^}]*?color: (.+?);", "black")?,
        color("back_text_color", "Back Side Text Color", r"#back *\{[^}]*?color: (.+?);", "black")?,
        color("background_color", "Background color", r"\.card *\{[^}]*?background-color: (.+?);", "#D1CFCE")?,
        color("cloze_color", "Cloze Text color", r"\.cloze.*\{[^}]*?color: (.+?);", "blue")?,
        color(
            "one_by_one_cloze_color",
            "One-by-one Cloze Text color",
            r"\.cloze.one-by-one.*\{[^}]*?color: (.+?);",
            "#009400",
        )?,
        color(
            "one_by_one_cloze_hint_color",
            "One-by-one Cloze Hint color",
            r"\.cloze-hint.*\{[^}]*?color: (.+?);",
            "#009400",
        )?,
        color("extra_text_color", "Extra Text color", r"#extra.*\{[^}]*?color: (.+?);", "navy")?,
        color("hint_text_color", "Hint Text color", r"\.hints *\{[^}]*?color: (.+?);", "#4297F9")?,
        color("missed_text_color", "Missed Text color", r"#missed *\{[^}]*?color: (.+?);", "red")?,
        color("timer_text_color", "Timer Text color", r"\.timer *\{[^}]*?color: (.+?);", "transparent")?,
        color(
            "nm_text_color",
            "Night Mode Text color",
            r"\.night_mode \.card *\{[^}]*?color: (.+?)( +!important)?;",
            "#FFFAFA",
        )?,
        color(
            "nm_back_text_color",
            "Night Mode Back Side Text Color",
            r"\.night_mode #back *\{[^}]*?color: (.+?)( +!important)?;",
            "#FFFAFA",
        )?,
        color(
            "nm_background_color",
            "Night Mode Background color",
            r"\.night_mode \.card *\{[^}]*?background-color: (.+?)( +!important)?;",
            "#272828",
        )?,
        color(
            "nm_cloze_color",
            "Night Mode Cloze color",
            r"\.night_mode \.cloze.*\{[^}]*?color: (.+?)( +!important)?;",
            "#4297F9",
        )?,
        color(
            "nm_one_by_one_cloze_color",
            "Night Mode One-by-one Cloze Text color",
            r"\.night_mode \.cloze.one-by-one.*\{[^}]*?color: (.+?)( +!important)?;",
            "#009400",
        )?,
        color(
            "nm_one_by_one_cloze_hint_color",
            "Night Mode One-by-one Cloze Hint color",
            r"\.night_mode \.cloze-hint.*\{[^}]*?color: (.+?)( +!important)?;",
            "#009400",
        )?,
        color(
            "nm_extra_color",
            "Night Mode Extra color",
            r"\.night_mode #extra.*\{[^}]*?color: (.+?)( +!important)?;",
            "magenta",
        )?,
        color(
            "nm_hint_color",
            "Night Mode Hint Reveal color",
            r"\.night_mode \.hints *\{[^}]*?color: (.+?)( +!important)?;",
            "cyan",
        )?,
        inherit_color("bold_text_color", "Bold Text color", r"b *\{[^}]*?color: (.+?)( +!important)?;")?,
        inherit_color("underlined_text_color", "Underlined Text color", r"u *\{[^}]*?color: (.+?)( +!important)?;")?,
        inherit_color("italic_text_color", "Italic Text color", r"\n *i *\{[^}]*?color: (.+?)( +!important)?;")?,
        color("image_occlusion_rect_color", "Image Occlusion Rect Color", r"--rect-bg: +([^ ]*?);", "moccasin")?,
        color(
            "image_occlusion_border_color",
            "Image Occlusion Rect Border Color",
            r"--rect-border: +([^ ]*?);",
            "olive",
        )?,
        color(
            "image_occlusion_active_rect_color",
            "Image Occlusion Active Rect Color",
            r"--active-rect-bg: +([^ ]*?);",
            "salmon",
        )?,
        color(
            "image_occlusion_active_border_color",
            "Image Occlusion Active Rect Border Color",
            r"--active-rect-border: +([^ ]*?);",
            "yellow",
        )?,
    ];

    let (options, labels) = user_actions();
    for i in 1..=USER_ACTION_COUNT {
        defs.push(
            SettingDefinition::new(
                &format!("user_action_{}", i),
                SettingKind::UserAction { options: options.clone(), labels: labels.clone() },
                FileRef::Back,
                &format!(r"var +userJs{} += +([^/\n]*)", i),
            )?
            .label(&format!("User Action {}", i))
            .group("AnkiMobile User Actions")
            .default_value("undefined"),
        );
    }

    Ok(defs)
}

/// Settings generated for one configurable field.
///
/// Every field can be disabled. Hint buttons, those with an entry in the
/// template's `ButtonShortcuts` table, also get a shortcut and an auto reveal
/// setting.
pub fn field_definitions(
    field_name: &str,
    hint_button_shortcut: Option<&str>,
) -> Result<Vec<SettingDefinition>, NotetypeError> {
    let snake = snake_case(field_name);
    let escaped = regex::escape(field_name);

    let mut defs = vec![SettingDefinition::new(
        &format!("disable_{}", snake),
        SettingKind::wrap_checkbox("<!--", "-->"),
        FileRef::Back,
        &conditional_field_re(&escaped),
    )?
    .label(&format!("Disable {} Field", field_name))
    .group("Fields")
    .default_value(false)];

    if let Some(shortcut) = hint_button_shortcut {
        defs.push(
            SettingDefinition::new(
                &format!("btn_shortcut_{}", snake),
                SettingKind::Shortcut,
                FileRef::Back,
                &format!(r#"var+ ButtonShortcuts *= *\{{[^}}]*?"{}" *: *"({}*?)""#, escaped, QUOT_STR_RE),
            )?
            .label(&format!("{} Shortcut", field_name))
            .group("Hint Buttons")
            .related_field(field_name)
            .default_value(shortcut),
        );
        defs.push(
            SettingDefinition::new(
                &format!("autoreveal_{}", snake),
                SettingKind::Checkbox,
                FileRef::Back,
                &format!(r#"var+ ButtonAutoReveal *= *\{{[^}}]*?"{}" *: *(.+),\n"#, escaped),
            )?
            .label(&format!("Auto Reveal {}", field_name))
            .group("Hint Buttons")
            .related_field(field_name)
            .default_value(false),
        );
    }

    Ok(defs)
}

pub fn disable_ome_mobile() -> Result<SettingDefinition, NotetypeError> {
    Ok(SettingDefinition::new(
        "disable_ome_mobile",
        SettingKind::wrap_checkbox("<!--", "-->"),
        FileRef::Back,
        r#"(<!--)?\{\{#OME\}\}\s*<span id="hint-ome[\w\W]+?\{\{/OME\}\}(-->)?"#,
    )?
    .label("Disable OME Field (mobile)")
    .group("Fields")
    .default_value(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::NotetypeTemplate,
        settings::value::SettingValue,
    };

    #[test]
    fn test_builtin_catalog_compiles_and_names_are_unique() {
        let defs = builtin_definitions().unwrap();
        let mut names: Vec<&str> = defs.iter().map(|d| d.name()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);

        for general in GENERAL_SETTINGS {
            let def = defs.iter().find(|d| d.name() == *general).unwrap();
            assert!(def.default().is_some(), "{} has no default", general);
        }
    }

    #[test]
    fn test_user_action_options_line_up_with_labels() {
        let (options, labels) = user_actions();
        assert_eq!(options.len(), labels.len());
        assert_eq!(options.len(), MOBILE_USER_ACTIONS.len() + HINT_BUTTONS.len());
        assert_eq!(labels.last().map(String::as_str), Some("Reveal Extra"));
        assert_eq!(options.last().map(String::as_str), Some("() => toggleHintBtn('hint-ex')"));
    }

    #[test]
    fn test_hint_button_settings() {
        let back = r#"<script>
var ButtonShortcuts = {
  "Lecture Notes" : "Ctrl+Shift+L",
  "Missed Questions" : ""
}
var ButtonAutoReveal = {
  "Lecture Notes" : false,
  "Missed Questions" : true,
}
</script>
{{#Lecture Notes}}<a class="hint">LN</a>{{/Lecture Notes}}"#;
        let mut nt = NotetypeTemplate::new("AnKing", "", back, "", &["Lecture Notes"]);

        let defs = field_definitions("Lecture Notes", Some("Ctrl+Shift+L")).unwrap();
        let names: Vec<&str> = defs.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["disable_lecture_notes", "btn_shortcut_lecture_notes", "autoreveal_lecture_notes"]);

        assert_eq!(defs[1].extract(&nt).unwrap(), SettingValue::text("Ctrl+Shift+L"));
        assert_eq!(defs[2].extract(&nt).unwrap(), SettingValue::Bool(false));
        assert_eq!(defs[0].extract(&nt).unwrap(), SettingValue::Bool(false));

        let missed = field_definitions("Missed Questions", Some("")).unwrap();
        assert_eq!(missed[2].extract(&nt).unwrap(), SettingValue::Bool(true));

        defs[0].inject(&mut nt, &SettingValue::Bool(true)).unwrap();
        assert!(nt.back().ends_with("<!--{{#Lecture Notes}}<a class=\"hint\">LN</a>{{/Lecture Notes}}-->"));
    }

    #[test]
    fn test_plain_field_only_gets_disable_setting() {
        let defs = field_definitions("Extra", None).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name(), "disable_extra");
    }
}
