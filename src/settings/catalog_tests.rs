#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::{
        core::{
            FileRef,
            NotetypeTemplate,
        },
        settings::{
            definition::{
                SettingDefinition,
                SettingKind,
            },
            registry::SettingRegistry,
            value::SettingValue,
        },
        templates::MemoryTemplateSource,
    };

    const FRONT: &str = r#"<!-- version 3a9f2 -->
<script>
var autoflip = true;
var seconds = 9 ;
var minutes = 0 ;
var alwaysOneByOne = false;
var selectiveOneByOne = false;
var minNumberOfClozes = 0;
var tagID = "XXXYYYZZZ";
var numTagLevelsToShow = 0;
</script>
{{Text}}
<!--tts en_US speed=1.4:Text-->
"#;

    const BACK: &str = r#"{{Text}}
<!--tts en_US speed=1.4:Extra-->
<script>
var ToggleNextButtonShortcut = "H";
var ToggleAllButtonsShortcut = "'";
var ScrollToButton = true;
var RevealIncrementalShortcut = "N";
var ToggleAllOcclusionsShortcut = ",";
var revealNextShortcut = "N";
var revealNextWordShortcut = "Shift+N";
var toggleAllShortcut = ",";
var revealNextClozeMode = "cloze";
var clozeHider = "👑";
var alwaysOneByOne = false;
var selectiveOneByOne = false;
var minNumberOfClozes = 0;
var tagID = "XXXYYYZZZ";
var toggleTagsShortcut = "C";
var numTagLevelsToShow = 0;
var userJs1 = undefined
var userJs2 = undefined
var userJs3 = undefined
var userJs4 = undefined
var userJs5 = undefined
var userJs6 = undefined
var userJs7 = undefined
var userJs8 = undefined
var ButtonShortcuts = {
  "Lecture Notes" : "Ctrl+Shift+L",
  "Missed Questions" : "Ctrl+Shift+M",
}
var ButtonAutoReveal = {
  "Lecture Notes" : false,
  "Missed Questions" : false,
}
</script>
{{#Lecture Notes}}<a class="hint" data-name="Lecture Notes">LN</a>{{/Lecture Notes}}
{{#Missed Questions}}<a class="hint" data-name="Missed Questions">MQ</a>{{/Missed Questions}}
{{#OME}}<a class="hint" data-name="OME">OME</a>{{/OME}}
{{#Extra}}<div id="extra">{{Extra}}</div>{{/Extra}}
{{#OME}}
<span id="hint-ome">OME</span>{{/OME}}
"#;

    const STYLE: &str = r#".card,
kbd {
  font-family: Arial Greek, Arial;
}

html {
  font-size: 28px;
}

.mobile {
  font-size: 28px;
}

.card {
  color: black;
  background-color: #D1CFCE;
}

#back {
  color: black;
}

.cloze {
  color: blue;
}

.cloze.one-by-one {
  color: #009400;
}

.cloze-hint {
  color: #009400;
}

#extra {
  color: navy;
}

.hints {
  color: #4297F9;
}

#missed {
  color: red;
}

.timer {
  display: block;
  color: transparent;
}

#tags-container {
  display: block;
}

.mobile #tags-container {
  display: none;
}

img {
  max-height: 100%;
  max-width: 85%;
}

b {
  color: inherit;
}

u {
  color: inherit;
}

i {
  color: inherit;
}

.night_mode .card {
  color: #FFFAFA !important;
  background-color: #272828 !important;
}

.night_mode #back {
  color: #FFFAFA !important;
}

.night_mode .cloze {
  color: #4297F9 !important;
}

.night_mode .cloze.one-by-one {
  color: #009400 !important;
}

.night_mode .cloze-hint {
  color: #009400 !important;
}

.night_mode #extra {
  color: magenta !important;
}

.night_mode .hints {
  color: cyan !important;
}

:root {
  --rect-bg: moccasin;
  --rect-border: olive;
  --active-rect-bg: salmon;
  --active-rect-border: yellow;
}
"#;

    fn full_model() -> NotetypeTemplate {
        NotetypeTemplate::new(
            "AnKingOverhaul",
            FRONT,
            BACK,
            STYLE,
            &["Text", "Extra", "Lecture Notes", "Missed Questions", "OME"],
        )
    }

    fn registry() -> SettingRegistry {
        SettingRegistry::build(&MemoryTemplateSource::new().with(full_model())).unwrap()
    }

    /// A value of the right shape that differs from `current`.
    fn changed_value(def: &SettingDefinition, current: &SettingValue) -> SettingValue {
        match (def.kind(), current) {
            (_, SettingValue::Bool(on)) => SettingValue::Bool(!on),
            (SettingKind::Color { .. }, _) => SettingValue::text("#123456"),
            (SettingKind::FontFamily, _) => SettingValue::text("Georgia"),
            (SettingKind::Dropdown { options } | SettingKind::UserAction { options, .. }, SettingValue::Text(s)) => {
                let other = options.iter().find(|o| *o != s).unwrap();
                SettingValue::Text(other.clone())
            }
            (_, SettingValue::Text(s)) => SettingValue::Text(format!("{}2", s)),
            (_, SettingValue::Integer(n)) => SettingValue::Integer(n + 1),
            (_, SettingValue::Decimal(_)) => SettingValue::Decimal(2.5),
            (_, SettingValue::List(names)) => SettingValue::List(names.iter().rev().cloned().collect()),
        }
    }

    fn extract_all(registry: &SettingRegistry, model: &NotetypeTemplate) -> BTreeMap<String, SettingValue> {
        registry
            .iter()
            .map(|def| {
                let value = def.extract(model).unwrap_or_else(|e| panic!("{}: {}", def.name(), e));
                (def.name().to_string(), value)
            })
            .collect()
    }

    #[test]
    fn test_fixture_has_every_section() {
        let registry = registry();
        let model = full_model();

        let missing: Vec<&str> =
            registry.iter().filter(|def| !def.is_present(&model)).map(|def| def.name()).collect();
        assert!(missing.is_empty(), "missing sections: {:?}", missing);
        assert!(registry.get("disable_ome_mobile").is_some());
        assert!(registry.get("autoreveal_missed_questions").is_some());
    }

    #[test]
    fn test_every_setting_round_trips_without_touching_the_others() {
        let registry = registry();
        let model = full_model();
        let before = extract_all(&registry, &model);

        for def in registry.iter() {
            let value = changed_value(def, &before[def.name()]);
            assert_ne!(value, before[def.name()], "{}", def.name());

            let mut changed = model.clone();
            def.inject(&mut changed, &value).unwrap_or_else(|e| panic!("{}: {}", def.name(), e));

            let after = extract_all(&registry, &changed);
            for (name, old) in &before {
                if name == def.name() {
                    assert_eq!(after[name], value, "{} did not read back", name);
                } else {
                    assert_eq!(&after[name], old, "injecting {} changed {}", def.name(), name);
                }
            }
        }
    }

    #[test]
    fn test_reinjecting_current_values_changes_nothing() {
        let registry = registry();
        let model = full_model();
        let before = extract_all(&registry, &model);

        let mut same = model.clone();
        for def in registry.iter() {
            def.inject(&mut same, &before[def.name()]).unwrap();
        }
        assert_eq!(same.front(), model.front());
        assert_eq!(same.back(), model.back());
        assert_eq!(same.text(FileRef::Style).unwrap(), model.text(FileRef::Style).unwrap());
    }
}
