//! Domain records extracted from help-book pages.

use serde::{Deserialize, Serialize};

/// Signature name used when a method page has no "Syntax variant" chapters.
pub const DEFAULT_SIGNATURE_NAME: &str = "Main";

// ---------------------------------------------------------------------------
// Names and references
// ---------------------------------------------------------------------------

/// A record name as printed in a page heading: `Добавить (Add)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePair {
    /// Primary heading text.
    pub name: String,
    /// Parenthesised alternative name, if the heading carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl NamePair {
    pub fn new(name: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            name: name.into(),
            alias,
        }
    }
}

impl std::fmt::Display for NamePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} ({alias})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A "see also" entry: display text plus an opaque cross-reference target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedObject {
    pub name: String,
    pub href: String,
}

/// A type string with its free-text description (return values, property types).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueInfo {
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

/// One parameter of a method or constructor signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_optional: bool,
    pub description: String,
}

/// One syntax variant of a method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignatureInfo {
    pub name: String,
    pub syntax: String,
    pub parameters: Vec<MethodParameterInfo>,
    pub description: String,
}

impl MethodSignatureInfo {
    /// An empty signature with the given variant name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A documented method. `signatures` is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: NamePair,
    pub signatures: Vec<MethodSignatureInfo>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<ValueInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_objects: Vec<RelatedObject>,
}

// ---------------------------------------------------------------------------
// Properties, constructors, objects
// ---------------------------------------------------------------------------

/// A documented property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: NamePair,
    pub description: String,
    pub read_only: bool,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_objects: Vec<RelatedObject>,
}

/// A documented constructor of a type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorInfo {
    pub name: String,
    pub syntax: String,
    pub parameters: Vec<MethodParameterInfo>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_objects: Vec<RelatedObject>,
}

/// A documented type. Member lists are `None` when the page tree has no such group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub name: NamePair,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_objects: Vec<RelatedObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<MethodInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructors: Option<Vec<ConstructorInfo>>,
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// One value of a system enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueInfo {
    pub name: NamePair,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_objects: Vec<RelatedObject>,
}

/// A system enumeration. `values` is filled by the caller after value pages are parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumInfo {
    pub name: NamePair,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_objects: Vec<RelatedObject>,
    #[serde(default)]
    pub values: Vec<EnumValueInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_pair_display() {
        let pair = NamePair::new("Добавить", Some("Add".into()));
        assert_eq!(pair.to_string(), "Добавить (Add)");
        assert_eq!(NamePair::new("Сообщить", None).to_string(), "Сообщить");
    }

    #[test]
    fn method_serialization_renames_type() {
        let method = MethodInfo {
            name: NamePair::new("Найти", Some("Find".into())),
            signatures: vec![MethodSignatureInfo {
                name: DEFAULT_SIGNATURE_NAME.into(),
                syntax: "Найти(<Значение>)".into(),
                parameters: vec![MethodParameterInfo {
                    name: "Значение".into(),
                    type_name: "Произвольный".into(),
                    is_optional: false,
                    description: "Искомое значение.".into(),
                }],
                description: String::new(),
            }],
            description: "Выполняет поиск элемента.".into(),
            return_value: None,
            example: None,
            note: None,
            related_objects: vec![],
        };

        let json = serde_json::to_value(&method).expect("serialize");
        assert_eq!(json["signatures"][0]["parameters"][0]["type"], "Произвольный");
        assert!(json.get("return_value").is_none());
        assert!(json.get("related_objects").is_none());

        let parsed: MethodInfo = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, method);
    }

    #[test]
    fn object_member_lists_are_optional() {
        let object = ObjectInfo {
            name: NamePair::new("Массив", Some("Array".into())),
            properties: Some(vec![]),
            ..ObjectInfo::default()
        };
        let json = serde_json::to_value(&object).expect("serialize");
        assert!(json.get("methods").is_none());
        assert_eq!(json["properties"], serde_json::json!([]));
    }
}
