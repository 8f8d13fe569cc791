use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("unknown field type '{name}' referenced by '{referenced_by}'")]
    UnknownType { name: String, referenced_by: String },
    #[error("unknown field group '{name}' referenced by '{referenced_by}'")]
    UnknownGroup { name: String, referenced_by: String },
    #[error("unknown form '{name}'")]
    UnknownForm { name: String },
    #[error("cyclic field type definition: {}", .chain.join(" -> "))]
    CyclicTypeDefinition { chain: Vec<String> },
    #[error("cyclic field group definition: {}", .chain.join(" -> "))]
    CyclicGroupDefinition { chain: Vec<String> },
    #[error("cyclic form definition: {}", .chain.join(" -> "))]
    CyclicFormDefinition { chain: Vec<String> },
    #[error("page {page} requested from form '{form}', which has {page_count} page(s)")]
    PageIndexOutOfRange {
        form: String,
        page: usize,
        page_count: usize,
    },
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Tracks names currently being resolved so a re-entrant lookup is reported
/// as a cycle instead of recursing forever.
#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    names: Vec<String>,
}

impl ResolutionStack {
    /// Push `name`, or return the cycle it would close.
    pub(crate) fn enter(&mut self, name: &str) -> std::result::Result<(), Vec<String>> {
        if let Some(start) = self.names.iter().position(|n| n == name) {
            let mut chain = self.names[start..].to_vec();
            chain.push(name.to_string());
            return Err(chain);
        }
        self.names.push(name.to_string());
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.names.pop();
    }
}
