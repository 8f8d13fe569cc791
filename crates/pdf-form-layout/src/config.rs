//! Raw definition file structures.
//!
//! Entries in a group or page share a single list-of-mappings shape; they are
//! classified here, once, by the key they carry (`group`, `form`, or neither).

use crate::error::{LayoutError, Result};
use crate::field::FieldProps;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};
use std::collections::BTreeMap;

/// Top-level layout of a definition file.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DefinitionFile {
    #[serde(default)]
    pub form_settings: Option<RawSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RawSettings {
    pub types: BTreeMap<String, TypeSpec>,
    pub groups: BTreeMap<String, Vec<EntrySpec>>,
    pub forms: BTreeMap<String, Vec<Vec<EntrySpec>>>,
}

/// A `types` entry: property overrides plus the optional parent (`type` key).
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TypeSpec {
    pub parent: Option<String>,
    pub props: FieldProps,
}

/// A leaf field entry: overrides plus the optional type name (`type` key).
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FieldSpec {
    pub type_name: Option<String>,
    pub props: FieldProps,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GroupRefSpec {
    pub group: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FormRefSpec {
    pub form: String,
    #[serde(default)]
    pub page: Option<usize>,
}

/// Any entry as written in a group or on a page.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EntrySpec {
    Field(FieldSpec),
    Group(GroupRefSpec),
    Form(FormRefSpec),
}

/// Entry allowed inside a group or an inline page.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MemberSpec {
    Field(FieldSpec),
    Group(GroupRefSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PageSpec {
    Inline(Vec<MemberSpec>),
    FormRef(FormRefSpec),
}

impl PageSpec {
    /// Classify a page: a lone form reference, or a list of fields and groups.
    pub(crate) fn classify(entries: &[EntrySpec], form: &str, index: usize) -> Result<Self> {
        if let [EntrySpec::Form(form_ref)] = entries {
            return Ok(PageSpec::FormRef(form_ref.clone()));
        }

        let members = entries
            .iter()
            .map(|entry| match entry {
                EntrySpec::Field(field) => Ok(MemberSpec::Field(field.clone())),
                EntrySpec::Group(group) => Ok(MemberSpec::Group(group.clone())),
                EntrySpec::Form(form_ref) => Err(LayoutError::InvalidDefinition(format!(
                    "page {} of form '{}' mixes a reference to form '{}' with other entries",
                    index, form, form_ref.form
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PageSpec::Inline(members))
    }
}

impl MemberSpec {
    pub(crate) fn classify_group(entries: &[EntrySpec], group: &str) -> Result<Vec<Self>> {
        entries
            .iter()
            .map(|entry| match entry {
                EntrySpec::Field(field) => Ok(MemberSpec::Field(field.clone())),
                EntrySpec::Group(child) => Ok(MemberSpec::Group(child.clone())),
                EntrySpec::Form(form_ref) => Err(LayoutError::InvalidDefinition(format!(
                    "group '{}' references form '{}'; form references are only allowed as a page",
                    group, form_ref.form
                ))),
            })
            .collect()
    }
}

fn take_string(
    map: &mut Mapping,
    key: &str,
) -> std::result::Result<Option<String>, serde_yaml_ng::Error> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_yaml_ng::from_value(value).map(Some),
    }
}

fn split_typed<E: de::Error>(
    mut map: Mapping,
) -> std::result::Result<(Option<String>, FieldProps), E> {
    let type_name = take_string(&mut map, "type").map_err(E::custom)?;
    let props = serde_yaml_ng::from_value(Value::Mapping(map)).map_err(E::custom)?;
    Ok((type_name, props))
}

impl<'de> Deserialize<'de> for TypeSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Option::<Mapping>::deserialize(deserializer)?.unwrap_or_default();
        let (parent, props) = split_typed(map)?;
        Ok(TypeSpec { parent, props })
    }
}

impl<'de> Deserialize<'de> for EntrySpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Mapping::deserialize(deserializer)?;

        if map.contains_key("group") {
            serde_yaml_ng::from_value(Value::Mapping(map))
                .map(EntrySpec::Group)
                .map_err(de::Error::custom)
        } else if map.contains_key("form") {
            serde_yaml_ng::from_value(Value::Mapping(map))
                .map(EntrySpec::Form)
                .map_err(de::Error::custom)
        } else {
            let (type_name, props) = split_typed(map)?;
            Ok(EntrySpec::Field(FieldSpec { type_name, props }))
        }
    }
}

impl DefinitionFile {
    pub(crate) fn parse(yaml: &str) -> Result<RawSettings> {
        let file: Option<DefinitionFile> = serde_yaml_ng::from_str(yaml)?;
        Ok(file.and_then(|f| f.form_settings).unwrap_or_default())
    }
}
