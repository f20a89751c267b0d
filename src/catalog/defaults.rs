//! Built-in catalog for shipping and export paperwork bundles.

use super::{CatalogConfig, DocumentTypeConfig};

/// The default document types, in registration order.
///
/// Form 6 and Form 9 are exact-only: their names differ by a single
/// character, so a fuzzy comparison would confuse them.
pub fn shipping_config() -> CatalogConfig {
    CatalogConfig {
        document_types: vec![
            DocumentTypeConfig::new(
                "Self Declaration Cum Undertaking Certificate",
                [
                    "Declaration Cum Undertaking Certificate",
                    "Self Declaration Certificate",
                    "Declaration Certificate",
                ],
            ),
            DocumentTypeConfig::new("Certificate of Origin", ["Origin Certificate"]),
            DocumentTypeConfig::new(
                "Certificate of Chemical Analysis Report",
                ["Chemical Analysis Report", "Chemical Analysis Certificate"],
            ),
            DocumentTypeConfig::exact_only("Form 6"),
            DocumentTypeConfig::exact_only("Form 9"),
            DocumentTypeConfig::new("Bill of Exchange", NO_ALIASES),
            DocumentTypeConfig::new("Commercial Invoice", NO_ALIASES),
            DocumentTypeConfig::new("Packing List", NO_ALIASES),
            DocumentTypeConfig::new("Pre-Shipment Inspection Certificate", NO_ALIASES),
            DocumentTypeConfig::new("Insurance Policy", NO_ALIASES),
            DocumentTypeConfig::new("Transboundary Movement Document", NO_ALIASES),
            DocumentTypeConfig::new("Bill of Lading", NO_ALIASES),
        ],
    }
}

const NO_ALIASES: [&str; 0] = [];
