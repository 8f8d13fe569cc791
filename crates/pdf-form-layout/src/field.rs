//! Field property sets and the three-level lookup chain
//! (instance value, then type template chain, then hard default).

use crate::style::{Color, FieldFlag};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the root field type every template chain ends at.
pub const DEFAULT_TYPE: &str = "default";

/// A sparse set of field properties. Unset entries defer to the type template.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldProps {
    pub name: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub w: Option<f32>,
    pub h: Option<f32>,
    pub tooltip: Option<String>,
    pub flags: Option<Vec<FieldFlag>>,
    pub maxlen: Option<u32>,
    pub font_name: Option<String>,
    pub font_size: Option<f32>,
    pub border_width: Option<f32>,
    pub border_color: Option<Color>,
    pub fill_color: Option<Color>,
}

/// A resolved field type template.
///
/// Holds only its own overrides plus a shared reference to its resolved
/// parent; properties are looked up through the chain at read time.
#[derive(Debug, PartialEq)]
pub struct FieldType {
    name: String,
    props: FieldProps,
    parent: Option<Arc<FieldType>>,
}

impl FieldType {
    /// The root template (`default`), with no parent.
    pub fn root(props: FieldProps) -> Self {
        Self {
            name: DEFAULT_TYPE.to_string(),
            props,
            parent: None,
        }
    }

    pub fn new(name: impl Into<String>, props: FieldProps, parent: Arc<FieldType>) -> Self {
        Self {
            name: name.into(),
            props,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn props(&self) -> &FieldProps {
        &self.props
    }

    pub fn parent(&self) -> Option<&Arc<FieldType>> {
        self.parent.as_ref()
    }

    /// First value set along this template's ancestor chain.
    pub fn lookup<T>(&self, get: fn(&FieldProps) -> Option<T>) -> Option<T> {
        let mut current = Some(self);
        while let Some(field_type) = current {
            if let Some(value) = get(&field_type.props) {
                return Some(value);
            }
            current = field_type.parent.as_deref();
        }
        None
    }
}

/// A field instance bound to its type template.
#[derive(Debug, Clone)]
pub struct FormField {
    props: FieldProps,
    field_type: Arc<FieldType>,
}

impl FormField {
    pub fn new(props: FieldProps, field_type: Arc<FieldType>) -> Self {
        Self { props, field_type }
    }

    pub fn props(&self) -> &FieldProps {
        &self.props
    }

    pub fn field_type(&self) -> &Arc<FieldType> {
        &self.field_type
    }

    fn property<T>(&self, get: fn(&FieldProps) -> Option<T>) -> Option<T> {
        get(&self.props).or_else(|| self.field_type.lookup(get))
    }

    pub fn name(&self) -> String {
        self.property(|p| p.name.clone()).unwrap_or_default()
    }

    pub fn x(&self) -> f32 {
        self.property(|p| p.x).unwrap_or(0.0)
    }

    pub fn y(&self) -> f32 {
        self.property(|p| p.y).unwrap_or(0.0)
    }

    pub fn w(&self) -> f32 {
        self.property(|p| p.w).unwrap_or(0.0)
    }

    pub fn h(&self) -> f32 {
        self.property(|p| p.h).unwrap_or(0.0)
    }

    pub fn tooltip(&self) -> String {
        self.property(|p| p.tooltip.clone()).unwrap_or_default()
    }

    pub fn flags(&self) -> Vec<FieldFlag> {
        self.property(|p| p.flags.clone()).unwrap_or_default()
    }

    pub fn maxlen(&self) -> u32 {
        self.property(|p| p.maxlen).unwrap_or(0)
    }

    pub fn font_name(&self) -> String {
        self.property(|p| p.font_name.clone()).unwrap_or_default()
    }

    pub fn font_size(&self) -> f32 {
        self.property(|p| p.font_size).unwrap_or(0.0)
    }

    pub fn border_width(&self) -> Option<f32> {
        self.property(|p| p.border_width)
    }

    pub fn border_color(&self) -> Option<Color> {
        self.property(|p| p.border_color)
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.property(|p| p.fill_color)
    }

    /// Copy of this field renamed and moved by `(dx, dy)`.
    ///
    /// Everything other than name and position keeps deferring to the type.
    pub(crate) fn relocated(&self, name: String, dx: f32, dy: f32) -> FormField {
        let mut props = self.props.clone();
        props.x = Some(dx + self.x());
        props.y = Some(dy + self.y());
        props.name = Some(name);
        FormField {
            props,
            field_type: Arc::clone(&self.field_type),
        }
    }

    /// Flatten every property through the lookup chain.
    pub fn resolve(&self) -> ResolvedField {
        ResolvedField {
            name: self.name(),
            x: self.x(),
            y: self.y(),
            w: self.w(),
            h: self.h(),
            tooltip: self.tooltip(),
            flags: self.flags(),
            maxlen: self.maxlen(),
            font_name: self.font_name(),
            font_size: self.font_size(),
            border_width: self.border_width(),
            border_color: self.border_color(),
            fill_color: self.fill_color(),
        }
    }
}

/// A fully flattened field with absolute coordinates (millimetres).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub tooltip: String,
    pub flags: Vec<FieldFlag>,
    pub maxlen: u32,
    pub font_name: String,
    pub font_size: f32,
    pub border_width: Option<f32>,
    pub border_color: Option<Color>,
    pub fill_color: Option<Color>,
}
