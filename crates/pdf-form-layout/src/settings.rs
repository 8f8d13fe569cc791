use crate::config::DefinitionFile;
use crate::error::{LayoutError, Result};
use crate::field::{FieldProps, FieldType};
use crate::field_type::FieldTypeRegistry;
use crate::form::{FormCatalog, ResolvedLayout};
use crate::group::{FieldGroup, FieldGroupLibrary};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Field types, field groups and forms resolved from one definition file.
///
/// Built once and then read; nothing here is global.
#[derive(Debug, Clone, Default)]
pub struct FormSettings {
    types: FieldTypeRegistry,
    groups: FieldGroupLibrary,
    forms: FormCatalog,
}

impl FormSettings {
    /// Parse and resolve a definition document.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(yaml: &str) -> Result<Self> {
        let raw = DefinitionFile::parse(yaml)?;
        let types = FieldTypeRegistry::build(&raw.types)?;
        let groups = FieldGroupLibrary::build(&raw.groups, &types)?;
        let forms = FormCatalog::build(&raw.forms, &types, &groups)?;

        log::info!(
            "Loaded {} field type(s), {} group(s), {} form(s)",
            types.len(),
            groups.len(),
            forms.len()
        );
        Ok(Self {
            types,
            groups,
            forms,
        })
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut yaml = String::new();
        reader.read_to_string(&mut yaml)?;
        Self::from_str(&yaml)
    }

    /// Read and resolve a definition file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading form definitions from {}", path.display());
        let yaml = tokio::fs::read_to_string(path).await?;
        Self::from_str(&yaml)
    }

    pub fn form(&self, name: &str) -> Result<&ResolvedLayout> {
        self.forms.get(name).ok_or_else(|| LayoutError::UnknownForm {
            name: name.to_string(),
        })
    }

    pub fn form_field_ids(&self, name: &str) -> Result<BTreeSet<String>> {
        Ok(self.form(name)?.field_names())
    }

    pub fn forms(&self) -> &FormCatalog {
        &self.forms
    }

    pub fn field_types(&self) -> &FieldTypeRegistry {
        &self.types
    }

    pub fn field_groups(&self) -> &FieldGroupLibrary {
        &self.groups
    }

    /// Register a field type under `parent` (which must exist).
    pub fn add_field_type(
        &mut self,
        name: &str,
        parent: &str,
        props: FieldProps,
    ) -> Result<&mut Self> {
        self.types.add(name, parent, props)?;
        Ok(self)
    }

    pub fn remove_field_type(&mut self, name: &str) -> &mut Self {
        self.types.remove(name);
        self
    }

    pub fn field_type(&self, name: &str) -> Option<&Arc<FieldType>> {
        self.types.get(name)
    }

    pub fn add_field_group(&mut self, group: FieldGroup) -> &mut Self {
        self.groups.add(group);
        self
    }

    pub fn remove_field_group(&mut self, name: &str) -> &mut Self {
        self.groups.remove(name);
        self
    }

    pub fn field_group(&self, name: &str) -> Option<&Arc<FieldGroup>> {
        self.groups.get(name)
    }
}
