use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

use super::NotetypeError;

pub type NotetypeId = i64;
pub type NoteId = i64;

/// Update sequence number the host treats as "never synced", forcing a full sync.
pub const USN_NEEDS_FULL_SYNC: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRef {
    Front,
    Back,
    Style,
}

impl FileRef {
    pub const ALL: [FileRef; 3] = [FileRef::Front, FileRef::Back, FileRef::Style];

    pub fn is_html(&self) -> bool {
        !matches!(self, FileRef::Style)
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileRef::Front => "front",
            FileRef::Back => "back",
            FileRef::Style => "style",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub ord: Option<u32>,
}

impl FieldSpec {
    pub fn new(name: &str, ord: u32) -> Self {
        Self { name: name.to_string(), ord: Some(ord) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qfmt: String,
    #[serde(default)]
    pub afmt: String,
}

/// A notetype as the host stores it: one card template, a stylesheet and a field list.
///
/// Field names follow the host's JSON layout so packaged metadata files
/// deserialize into this type directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotetypeTemplate {
    #[serde(default)]
    pub id: NotetypeId,
    pub name: String,
    #[serde(rename = "tmpls")]
    pub templates: Vec<CardTemplate>,
    #[serde(default)]
    pub css: String,
    #[serde(rename = "flds")]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub usn: i32,
    #[serde(rename = "mod", default)]
    pub mtime_secs: i64,
}

impl NotetypeTemplate {
    pub fn new(name: &str, front: &str, back: &str, style: &str, field_names: &[&str]) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            templates: vec![CardTemplate {
                name: "Card 1".to_string(),
                qfmt: front.to_string(),
                afmt: back.to_string(),
            }],
            css: style.to_string(),
            fields: field_names
                .iter()
                .enumerate()
                .map(|(i, name)| FieldSpec::new(name, i as u32))
                .collect(),
            usn: 0,
            mtime_secs: 0,
        }
    }

    fn single_template(&self) -> Result<&CardTemplate, NotetypeError> {
        match self.templates.as_slice() {
            [template] => Ok(template),
            _ => Err(NotetypeError::TemplateCount {
                notetype: self.name.clone(),
                count: self.templates.len(),
            }),
        }
    }

    fn single_template_mut(&mut self) -> Result<&mut CardTemplate, NotetypeError> {
        let count = self.templates.len();
        if count != 1 {
            return Err(NotetypeError::TemplateCount { notetype: self.name.clone(), count });
        }
        Ok(&mut self.templates[0])
    }

    pub fn text(&self, file: FileRef) -> Result<&str, NotetypeError> {
        match file {
            FileRef::Front => Ok(&self.single_template()?.qfmt),
            FileRef::Back => Ok(&self.single_template()?.afmt),
            FileRef::Style => Ok(&self.css),
        }
    }

    pub fn set_text(&mut self, file: FileRef, text: String) -> Result<(), NotetypeError> {
        match file {
            FileRef::Front => self.single_template_mut()?.qfmt = text,
            FileRef::Back => self.single_template_mut()?.afmt = text,
            FileRef::Style => self.css = text,
        }
        Ok(())
    }

    pub fn front(&self) -> &str {
        self.templates.first().map(|t| t.qfmt.as_str()).unwrap_or("")
    }

    pub fn back(&self) -> &str {
        self.templates.first().map(|t| t.afmt.as_str()).unwrap_or("")
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameId {
    pub name: String,
    pub id: NotetypeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_host_layout() {
        let json = r#"{
            "id": 1650000000000,
            "name": "AnKing",
            "tmpls": [{"name": "Card 1", "qfmt": "{{Text}}", "afmt": "{{Extra}}"}],
            "css": ".card {}",
            "flds": [{"name": "Text", "ord": 0}, {"name": "Extra", "ord": 1}],
            "usn": 12,
            "mod": 1650000000
        }"#;

        let notetype: NotetypeTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(notetype.front(), "{{Text}}");
        assert_eq!(notetype.text(FileRef::Style).unwrap(), ".card {}");
        assert_eq!(notetype.field_names(), vec!["Text", "Extra"]);
        assert_eq!(notetype.mtime_secs, 1650000000);
    }

    #[test]
    fn test_more_than_one_template_is_rejected() {
        let mut notetype = NotetypeTemplate::new("Cloze", "a", "b", "c", &["Text"]);
        notetype.templates.push(notetype.templates[0].clone());

        assert!(matches!(
            notetype.text(FileRef::Front),
            Err(NotetypeError::TemplateCount { count: 2, .. })
        ));
        // the stylesheet does not depend on the template list
        assert_eq!(notetype.text(FileRef::Style).unwrap(), "c");
        assert!(notetype.set_text(FileRef::Back, "x".to_string()).is_err());
    }
}
