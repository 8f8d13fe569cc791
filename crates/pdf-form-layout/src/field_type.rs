//! Field type registry: named templates with single-parent inheritance.

use crate::config::TypeSpec;
use crate::error::{LayoutError, ResolutionStack, Result};
use crate::field::{DEFAULT_TYPE, FieldProps, FieldType};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Resolved field types by name. Always contains `default`.
#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    types: HashMap<String, Arc<FieldType>>,
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::with_root(FieldProps::default())
    }
}

impl FieldTypeRegistry {
    fn with_root(props: FieldProps) -> Self {
        let mut types = HashMap::new();
        types.insert(DEFAULT_TYPE.to_string(), Arc::new(FieldType::root(props)));
        Self { types }
    }

    /// Resolve every declared type, parents first, in any declaration order.
    pub(crate) fn build(specs: &BTreeMap<String, TypeSpec>) -> Result<Self> {
        let root_props = match specs.get(DEFAULT_TYPE) {
            Some(TypeSpec {
                parent: Some(parent),
                ..
            }) => {
                return Err(LayoutError::InvalidDefinition(format!(
                    "the '{}' type cannot inherit from '{}'",
                    DEFAULT_TYPE, parent
                )));
            }
            Some(spec) => spec.props.clone(),
            None => FieldProps::default(),
        };

        let mut resolver = TypeResolver {
            specs,
            registry: Self::with_root(root_props),
            stack: ResolutionStack::default(),
        };
        for name in specs.keys() {
            resolver.resolve(name, name)?;
        }

        log::debug!("Resolved {} field type(s)", resolver.registry.len());
        Ok(resolver.registry)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FieldType>> {
        self.types.get(name)
    }

    /// Look up `name`, failing with `UnknownType` on behalf of `referenced_by`.
    pub fn require(&self, name: &str, referenced_by: &str) -> Result<Arc<FieldType>> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownType {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })
    }

    /// The root template.
    pub fn root(&self) -> Arc<FieldType> {
        match self.types.get(DEFAULT_TYPE) {
            Some(root) => Arc::clone(root),
            None => Arc::new(FieldType::root(FieldProps::default())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Register a type deriving from an already registered `parent`.
    pub fn add(&mut self, name: &str, parent: &str, props: FieldProps) -> Result<Arc<FieldType>> {
        if name == DEFAULT_TYPE {
            return Err(LayoutError::InvalidDefinition(format!(
                "the '{}' type cannot be replaced",
                DEFAULT_TYPE
            )));
        }
        let parent = self.require(parent, name)?;
        let field_type = Arc::new(FieldType::new(name, props, parent));
        self.types.insert(name.to_string(), Arc::clone(&field_type));
        Ok(field_type)
    }

    /// Unregister a type. Types already derived from it keep their chain.
    pub fn remove(&mut self, name: &str) -> Option<Arc<FieldType>> {
        if name == DEFAULT_TYPE {
            return None;
        }
        self.types.remove(name)
    }
}

struct TypeResolver<'a> {
    specs: &'a BTreeMap<String, TypeSpec>,
    registry: FieldTypeRegistry,
    stack: ResolutionStack,
}

impl TypeResolver<'_> {
    fn resolve(&mut self, name: &str, referenced_by: &str) -> Result<Arc<FieldType>> {
        if let Some(resolved) = self.registry.get(name) {
            return Ok(Arc::clone(resolved));
        }
        let spec = self
            .specs
            .get(name)
            .ok_or_else(|| LayoutError::UnknownType {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })?;

        self.stack
            .enter(name)
            .map_err(|chain| LayoutError::CyclicTypeDefinition { chain })?;
        let parent_name = spec.parent.as_deref().unwrap_or(DEFAULT_TYPE);
        let parent = self.resolve(parent_name, name);
        self.stack.leave();

        let field_type = Arc::new(FieldType::new(name, spec.props.clone(), parent?));
        log::debug!("Resolved field type '{}' (parent '{}')", name, parent_name);
        self.registry
            .types
            .insert(name.to_string(), Arc::clone(&field_type));
        Ok(field_type)
    }
}
