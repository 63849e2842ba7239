//! Delivery path enumeration
//!
//! A [`DeliveryPath`] maps a target resource to the concrete address one
//! delivery channel fetches it from. A [`PathSet`] is the fixed, ordered,
//! non-empty list the race is run over.

use crate::config::PathConfig;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Replaced by the target verbatim
pub const URL_PLACEHOLDER: &str = "{url}";
/// Replaced by the percent-encoded target
pub const URL_ENCODED_PLACEHOLDER: &str = "{url_encoded}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("at least one delivery path is required")]
    NoPaths,

    #[error("delivery path '{0}' has no {{url}} or {{url_encoded}} placeholder")]
    MissingPlaceholder(String),

    #[error("delivery path '{0}' is declared more than once")]
    DuplicateName(String),
}

/// One way of reaching the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPath {
    name: String,
    template: String,
}

impl DeliveryPath {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self, PathError> {
        let name = name.into();
        let template = template.into();

        if !template.contains(URL_PLACEHOLDER) && !template.contains(URL_ENCODED_PLACEHOLDER) {
            return Err(PathError::MissingPlaceholder(name));
        }

        Ok(Self { name, template })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concrete address for `target`. Pure and deterministic.
    pub fn address(&self, target: &str) -> String {
        // The encoded form has no braces, so substituting it first cannot
        // introduce a new "{url}".
        let encoded = urlencoding::encode(target);
        self.template
            .replace(URL_ENCODED_PLACEHOLDER, &encoded)
            .replace(URL_PLACEHOLDER, target)
    }
}

/// Address produced by one path, for listing
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedAddress {
    pub index: usize,
    pub name: String,
    pub address: String,
}

/// Fixed, ordered, non-empty sequence of delivery paths
#[derive(Debug, Clone)]
pub struct PathSet {
    paths: Vec<DeliveryPath>,
}

impl PathSet {
    pub fn new(paths: Vec<DeliveryPath>) -> Result<Self, PathError> {
        if paths.is_empty() {
            return Err(PathError::NoPaths);
        }

        let mut seen = HashSet::new();
        for path in &paths {
            if !seen.insert(path.name.as_str()) {
                return Err(PathError::DuplicateName(path.name.clone()));
            }
        }

        Ok(Self { paths })
    }

    pub fn from_config(configs: &[PathConfig]) -> Result<Self, PathError> {
        let paths = configs
            .iter()
            .map(|c| DeliveryPath::new(c.name.clone(), c.template.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(paths)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Never true once constructed
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeliveryPath> {
        self.paths.iter()
    }

    pub fn resolve(&self, target: &str) -> Vec<ResolvedAddress> {
        self.paths
            .iter()
            .enumerate()
            .map(|(index, path)| ResolvedAddress {
                index,
                name: path.name.clone(),
                address: path.address(target),
            })
            .collect()
    }
}
