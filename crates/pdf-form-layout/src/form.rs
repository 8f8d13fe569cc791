//! Form catalog and resolved layouts.

use crate::config::{EntrySpec, FormRefSpec, MemberSpec, PageSpec};
use crate::error::{LayoutError, ResolutionStack, Result};
use crate::field::ResolvedField;
use crate::field_type::FieldTypeRegistry;
use crate::group::{FieldGroupLibrary, bind_field};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Fully flattened form: ordered pages of absolute fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResolvedLayout {
    pages: Vec<Vec<ResolvedField>>,
}

impl ResolvedLayout {
    pub fn new(pages: Vec<Vec<ResolvedField>>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[Vec<ResolvedField>] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&[ResolvedField]> {
        self.pages.get(index).map(Vec::as_slice)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All fields, page by page.
    pub fn fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.pages.iter().flatten()
    }

    /// Sorted, de-duplicated field names.
    pub fn field_names(&self) -> BTreeSet<String> {
        self.fields().map(|field| field.name.clone()).collect()
    }

    pub fn into_pages(self) -> Vec<Vec<ResolvedField>> {
        self.pages
    }
}

/// Resolved forms by name.
#[derive(Debug, Clone, Default)]
pub struct FormCatalog {
    forms: HashMap<String, ResolvedLayout>,
}

impl FormCatalog {
    pub(crate) fn build(
        specs: &BTreeMap<String, Vec<Vec<EntrySpec>>>,
        types: &FieldTypeRegistry,
        groups: &FieldGroupLibrary,
    ) -> Result<Self> {
        let pages = specs
            .iter()
            .map(|(name, pages)| {
                let pages = pages
                    .iter()
                    .enumerate()
                    .map(|(index, entries)| PageSpec::classify(entries, name, index))
                    .collect::<Result<Vec<_>>>()?;
                Ok((name.as_str(), pages))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        let mut resolver = FormResolver {
            specs: &pages,
            types,
            groups,
            catalog: Self::default(),
            stack: ResolutionStack::default(),
        };
        for name in specs.keys() {
            resolver.resolve(name)?;
        }

        log::debug!("Resolved {} form(s)", resolver.catalog.len());
        Ok(resolver.catalog)
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedLayout> {
        self.forms.get(name)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Form names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.forms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

struct FormResolver<'a> {
    specs: &'a HashMap<&'a str, Vec<PageSpec>>,
    types: &'a FieldTypeRegistry,
    groups: &'a FieldGroupLibrary,
    catalog: FormCatalog,
    stack: ResolutionStack,
}

impl FormResolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<&ResolvedLayout> {
        if !self.catalog.forms.contains_key(name) {
            let specs = self.specs;
            let pages = specs.get(name).ok_or_else(|| LayoutError::UnknownForm {
                name: name.to_string(),
            })?;

            self.stack
                .enter(name)
                .map_err(|chain| LayoutError::CyclicFormDefinition { chain })?;
            let resolved = self.resolve_pages(name, pages);
            self.stack.leave();

            let layout = ResolvedLayout::new(resolved?);
            log::debug!(
                "Resolved form '{}' ({} page(s))",
                name,
                layout.page_count()
            );
            self.catalog.forms.insert(name.to_string(), layout);
        }

        self.catalog
            .forms
            .get(name)
            .ok_or_else(|| LayoutError::UnknownForm {
                name: name.to_string(),
            })
    }

    fn resolve_pages(&mut self, name: &str, pages: &[PageSpec]) -> Result<Vec<Vec<ResolvedField>>> {
        let mut resolved = Vec::with_capacity(pages.len());
        for page in pages {
            match page {
                PageSpec::Inline(members) => resolved.push(self.resolve_inline(name, members)?),
                PageSpec::FormRef(FormRefSpec { form, page }) => {
                    let target = self.resolve(form)?;
                    match page {
                        Some(index) => {
                            let single = target.page(*index).ok_or_else(|| {
                                LayoutError::PageIndexOutOfRange {
                                    form: form.clone(),
                                    page: *index,
                                    page_count: target.page_count(),
                                }
                            })?;
                            resolved.push(single.to_vec());
                        }
                        None => resolved.extend(target.pages().iter().cloned()),
                    }
                }
            }
        }
        Ok(resolved)
    }

    fn resolve_inline(&self, name: &str, members: &[MemberSpec]) -> Result<Vec<ResolvedField>> {
        let mut fields = Vec::new();
        for member in members {
            match member {
                MemberSpec::Field(spec) => {
                    fields.push(bind_field(spec, self.types, name)?.resolve())
                }
                MemberSpec::Group(group_ref) => {
                    let group = self.groups.require(&group_ref.group, name)?;
                    fields.extend(
                        group
                            .expand(&group_ref.name, group_ref.x, group_ref.y)
                            .iter()
                            .map(|field| field.resolve()),
                    );
                }
            }
        }
        Ok(fields)
    }
}
