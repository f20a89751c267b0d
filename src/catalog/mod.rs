//! Catalog of known document types and their accepted headings.
//!
//! A [`Catalog`] maps each canonical document-type name to an ordered list of
//! variants (aliases). The canonical name is always its own first variant.
//! Construction fails with [`Error::Config`] when two distinct types share a
//! variant after normalization, so every lookup has at most one answer.
//!
//! # Example
//!
//! ```
//! use docsplit::catalog::{normalize, Catalog};
//!
//! let catalog = Catalog::builder()
//!     .add_type("Certificate of Origin", ["Origin Certificate"])
//!     .add_exact_only("Form 6")
//!     .build()?;
//!
//! let hit = catalog.lookup(&normalize("ORIGIN CERTIFICATE")).unwrap();
//! assert_eq!(hit.document_type.name(), "Certificate of Origin");
//! assert!(hit.exact);
//! # Ok::<(), docsplit::Error>(())
//! ```

mod defaults;
mod normalize;

pub use defaults::shipping_config;
pub use normalize::{match_tokens, normalize};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A canonical document type with its accepted variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentType {
    name: String,
    variants: Vec<String>,
    exact_only: bool,
}

impl DocumentType {
    /// Canonical name (unique within the catalog).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accepted variants, canonical name first.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Whether this type is excluded from fuzzy matching.
    pub fn is_exact_only(&self) -> bool {
        self.exact_only
    }
}

/// Serializable description of one document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTypeConfig {
    /// Canonical name
    pub name: String,

    /// Additional variants (the canonical name is added automatically)
    #[serde(default)]
    pub variants: Vec<String>,

    /// Exclude this type from the fuzzy phase
    #[serde(default)]
    pub exact_only: bool,
}

impl DocumentTypeConfig {
    /// Create a type description with the given aliases.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
            exact_only: false,
        }
    }

    /// Create an exact-only type with no aliases.
    pub fn exact_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            exact_only: true,
        }
    }
}

/// Serializable catalog description, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Document types, earliest registered first
    pub document_types: Vec<DocumentTypeConfig>,
}

/// A successful catalog lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogHit<'a> {
    /// The matched document type
    pub document_type: &'a DocumentType,

    /// The variant that matched, as registered
    pub variant: &'a str,

    /// The whole line equals the variant
    pub exact: bool,

    /// Tokens on the line outside the matched variant
    pub extra_tokens: usize,
}

/// A variant eligible for fuzzy matching.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyCandidate<'a> {
    /// Registration position of the owning type
    pub type_index: usize,

    /// Position of the variant within its type
    pub variant_index: usize,

    /// The owning type
    pub document_type: &'a DocumentType,

    /// Normalized variant text
    pub normalized: &'a str,
}

/// Immutable registry of document types.
#[derive(Debug, Clone)]
pub struct Catalog {
    types: Vec<DocumentType>,
    normalized: Vec<Vec<String>>,
    index: HashMap<String, (usize, usize)>,
}

impl Catalog {
    /// Start building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Build a catalog from its serializable description.
    pub fn from_config(config: CatalogConfig) -> Result<Self> {
        let mut types: Vec<DocumentType> = Vec::with_capacity(config.document_types.len());
        let mut normalized: Vec<Vec<String>> = Vec::with_capacity(config.document_types.len());
        let mut index: HashMap<String, (usize, usize)> = HashMap::new();
        let mut names: HashSet<String> = HashSet::new();

        for entry in config.document_types {
            let name = entry.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::Config("document type with empty name".into()));
            }
            if !names.insert(name.clone()) {
                return Err(Error::Config(format!("duplicate document type '{}'", name)));
            }

            let type_index = types.len();
            let mut variants = Vec::with_capacity(entry.variants.len() + 1);
            let mut type_normalized = Vec::with_capacity(entry.variants.len() + 1);

            let candidates = std::iter::once(name.clone())
                .chain(entry.variants.into_iter().map(|v| v.trim().to_string()));
            for variant in candidates {
                let key = normalize(&variant);
                if key.is_empty() {
                    return Err(Error::Config(format!(
                        "variant '{}' of '{}' is empty after normalization",
                        variant, name
                    )));
                }
                match index.get(&key) {
                    Some(&(owner, _)) if owner == type_index => continue,
                    Some(&(owner, position)) => {
                        return Err(Error::Config(format!(
                            "variant '{}' of '{}' is ambiguous with variant '{}' of '{}'",
                            variant, name, types[owner].variants[position], types[owner].name
                        )));
                    }
                    None => {
                        index.insert(key.clone(), (type_index, variants.len()));
                        variants.push(variant);
                        type_normalized.push(key);
                    }
                }
            }

            types.push(DocumentType {
                name,
                variants,
                exact_only: entry.exact_only,
            });
            normalized.push(type_normalized);
        }

        Ok(Self {
            types,
            normalized,
            index,
        })
    }

    /// Parse a catalog from JSON (`{"document_types": [...]}`).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CatalogConfig = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid catalog JSON: {}", e)))?;
        Self::from_config(config)
    }

    /// Load a catalog from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializable description of this catalog.
    pub fn to_config(&self) -> CatalogConfig {
        CatalogConfig {
            document_types: self
                .types
                .iter()
                .map(|t| DocumentTypeConfig {
                    name: t.name.clone(),
                    variants: t.variants.iter().skip(1).cloned().collect(),
                    exact_only: t.exact_only,
                })
                .collect(),
        }
    }

    /// Look up normalized text.
    ///
    /// A full-line match against any variant wins outright. Otherwise a
    /// variant whose tokens appear contiguously inside the line matches with
    /// `exact == false`; the hit with the fewest extra tokens is returned,
    /// ties going to the earlier-registered type and then the earlier
    /// variant.
    pub fn lookup(&self, normalized: &str) -> Option<CatalogHit<'_>> {
        if normalized.is_empty() {
            return None;
        }

        if let Some(&(t, v)) = self.index.get(normalized) {
            return Some(self.hit(t, v, true, 0));
        }

        let line = match_tokens(normalized);
        let mut best: Option<(usize, usize, usize)> = None;

        for (t, variants) in self.normalized.iter().enumerate() {
            for (v, variant) in variants.iter().enumerate() {
                let needle = match_tokens(variant);
                if needle.len() > line.len() {
                    continue;
                }
                if line.windows(needle.len()).any(|w| w == needle.as_slice()) {
                    let extra = line.len() - needle.len();
                    if best.map_or(true, |(e, _, _)| extra < e) {
                        best = Some((extra, t, v));
                    }
                }
            }
        }

        best.map(|(extra, t, v)| self.hit(t, v, false, extra))
    }

    fn hit(&self, t: usize, v: usize, exact: bool, extra_tokens: usize) -> CatalogHit<'_> {
        let document_type = &self.types[t];
        CatalogHit {
            document_type,
            variant: &document_type.variants[v],
            exact,
            extra_tokens,
        }
    }

    /// Variants that may take part in fuzzy matching, in registration order.
    ///
    /// Types marked exact-only are skipped entirely.
    pub fn fuzzy_candidates(&self) -> impl Iterator<Item = FuzzyCandidate<'_>> {
        self.types
            .iter()
            .zip(&self.normalized)
            .enumerate()
            .filter(|(_, (t, _))| !t.exact_only)
            .flat_map(|(type_index, (document_type, variants))| {
                variants
                    .iter()
                    .enumerate()
                    .map(move |(variant_index, normalized)| FuzzyCandidate {
                        type_index,
                        variant_index,
                        document_type,
                        normalized,
                    })
            })
    }

    /// Get a type by canonical name.
    pub fn get(&self, name: &str) -> Option<&DocumentType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Registration position of a type.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.types.iter().position(|t| t.name == name)
    }

    /// All types in registration order.
    pub fn types(&self) -> &[DocumentType] {
        &self.types
    }

    /// Number of document types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the catalog has no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for Catalog {
    /// The built-in shipping/export paperwork catalog.
    fn default() -> Self {
        Self::from_config(shipping_config()).expect("built-in catalog has no ambiguous variants")
    }
}

/// Builder for [`Catalog`].
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    config: CatalogConfig,
}

impl CatalogBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with aliases.
    pub fn add_type<I, S>(mut self, name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .document_types
            .push(DocumentTypeConfig::new(name, variants));
        self
    }

    /// Register an exact-only type without aliases.
    pub fn add_exact_only(mut self, name: impl Into<String>) -> Self {
        self.config
            .document_types
            .push(DocumentTypeConfig::exact_only(name));
        self
    }

    /// Register a type from its description.
    pub fn add(mut self, entry: DocumentTypeConfig) -> Self {
        self.config.document_types.push(entry);
        self
    }

    /// Validate and build the catalog.
    pub fn build(self) -> Result<Catalog> {
        Catalog::from_config(self.config)
    }
}
