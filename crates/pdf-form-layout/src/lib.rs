mod config;
mod error;
mod field;
mod field_type;
mod form;
mod group;
mod settings;
mod style;
mod values;

pub use error::{LayoutError, Result};
pub use field::{DEFAULT_TYPE, FieldProps, FieldType, FormField, ResolvedField};
pub use field_type::FieldTypeRegistry;
pub use form::{FormCatalog, ResolvedLayout};
pub use group::{FieldGroup, FieldGroupLibrary, GroupMember};
pub use settings::FormSettings;
pub use style::{Color, FieldFlag};
pub use values::{FieldValue, FieldValues};
