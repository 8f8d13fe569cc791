//! Field group library: reusable, relocatable bundles of fields.

use crate::config::{EntrySpec, FieldSpec, GroupRefSpec, MemberSpec};
use crate::error::{LayoutError, ResolutionStack, Result};
use crate::field::{DEFAULT_TYPE, FormField};
use crate::field_type::FieldTypeRegistry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// An unexpanded group member.
#[derive(Debug, Clone)]
pub enum GroupMember {
    Field(FormField),
    Group {
        group: Arc<FieldGroup>,
        prefix: String,
        x: f32,
        y: f32,
    },
}

/// A resolved group. Members are kept unexpanded; every use site calls
/// [`FieldGroup::expand`] with its own prefix and offset.
#[derive(Debug, Clone)]
pub struct FieldGroup {
    name: String,
    members: Vec<GroupMember>,
}

impl FieldGroup {
    pub fn new(name: impl Into<String>, members: Vec<GroupMember>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    /// Flatten into positioned fields, names prefixed and positions offset.
    pub fn expand(&self, prefix: &str, x: f32, y: f32) -> Vec<FormField> {
        let mut fields = Vec::new();
        self.expand_into(prefix, x, y, &mut fields);
        fields
    }

    fn expand_into(&self, prefix: &str, x: f32, y: f32, out: &mut Vec<FormField>) {
        for member in &self.members {
            match member {
                GroupMember::Field(field) => {
                    out.push(field.relocated(qualify(prefix, &field.name()), x, y));
                }
                GroupMember::Group {
                    group,
                    prefix: child,
                    x: dx,
                    y: dy,
                } => group.expand_into(&combine_prefix(prefix, child), x + dx, y + dy, out),
            }
        }
    }
}

/// `prefix-name`, or the bare name when there is no prefix.
pub(crate) fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}-{}", prefix, name)
    }
}

fn combine_prefix(outer: &str, inner: &str) -> String {
    match (outer.is_empty(), inner.is_empty()) {
        (_, true) => outer.to_string(),
        (true, false) => inner.to_string(),
        (false, false) => format!("{}-{}", outer, inner),
    }
}

/// Build a field instance from a field entry, binding its type template.
pub(crate) fn bind_field(
    spec: &FieldSpec,
    types: &FieldTypeRegistry,
    referenced_by: &str,
) -> Result<FormField> {
    let type_name = spec.type_name.as_deref().unwrap_or(DEFAULT_TYPE);
    let field_type = types.require(type_name, referenced_by)?;
    Ok(FormField::new(spec.props.clone(), field_type))
}

/// Resolved groups by name.
#[derive(Debug, Clone, Default)]
pub struct FieldGroupLibrary {
    groups: HashMap<String, Arc<FieldGroup>>,
}

impl FieldGroupLibrary {
    pub(crate) fn build(
        specs: &BTreeMap<String, Vec<EntrySpec>>,
        types: &FieldTypeRegistry,
    ) -> Result<Self> {
        let members = specs
            .iter()
            .map(|(name, entries)| Ok((name.as_str(), MemberSpec::classify_group(entries, name)?)))
            .collect::<Result<HashMap<_, _>>>()?;

        let mut resolver = GroupResolver {
            specs: &members,
            types,
            library: Self::default(),
            stack: ResolutionStack::default(),
        };
        for name in specs.keys() {
            resolver.resolve(name, name)?;
        }

        log::debug!("Resolved {} field group(s)", resolver.library.len());
        Ok(resolver.library)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FieldGroup>> {
        self.groups.get(name)
    }

    /// Look up `name`, failing with `UnknownGroup` on behalf of `referenced_by`.
    pub fn require(&self, name: &str, referenced_by: &str) -> Result<Arc<FieldGroup>> {
        self.groups
            .get(name)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownGroup {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn add(&mut self, group: FieldGroup) -> Arc<FieldGroup> {
        let group = Arc::new(group);
        self.groups
            .insert(group.name().to_string(), Arc::clone(&group));
        group
    }

    /// Unregister a group. Groups already nesting it keep their reference.
    pub fn remove(&mut self, name: &str) -> Option<Arc<FieldGroup>> {
        self.groups.remove(name)
    }
}

struct GroupResolver<'a> {
    specs: &'a HashMap<&'a str, Vec<MemberSpec>>,
    types: &'a FieldTypeRegistry,
    library: FieldGroupLibrary,
    stack: ResolutionStack,
}

impl GroupResolver<'_> {
    fn resolve(&mut self, name: &str, referenced_by: &str) -> Result<Arc<FieldGroup>> {
        if let Some(group) = self.library.get(name) {
            return Ok(Arc::clone(group));
        }
        let specs = self.specs;
        let entries = specs.get(name).ok_or_else(|| LayoutError::UnknownGroup {
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })?;

        self.stack
            .enter(name)
            .map_err(|chain| LayoutError::CyclicGroupDefinition { chain })?;
        let members = self.resolve_members(name, entries);
        self.stack.leave();

        let group = self.library.add(FieldGroup::new(name, members?));
        log::debug!(
            "Resolved field group '{}' ({} member(s))",
            name,
            group.members().len()
        );
        Ok(group)
    }

    fn resolve_members(&mut self, name: &str, entries: &[MemberSpec]) -> Result<Vec<GroupMember>> {
        entries
            .iter()
            .map(|entry| match entry {
                MemberSpec::Field(spec) => {
                    bind_field(spec, self.types, name).map(GroupMember::Field)
                }
                MemberSpec::Group(GroupRefSpec {
                    group,
                    name: prefix,
                    x,
                    y,
                }) => Ok(GroupMember::Group {
                    group: self.resolve(group, name)?,
                    prefix: prefix.clone(),
                    x: *x,
                    y: *y,
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_rules() {
        assert_eq!(qualify("", "f"), "f");
        assert_eq!(qualify("p", "f"), "p-f");
        assert_eq!(combine_prefix("", ""), "");
        assert_eq!(combine_prefix("", "inner"), "inner");
        assert_eq!(combine_prefix("outer", ""), "outer");
        assert_eq!(combine_prefix("outer", "inner"), "outer-inner");
    }
}
