//! Pipeline configuration

/// Settings for one pipeline run, constructed once at startup and passed
/// by reference into the driver.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Container / bucket holding the uploaded archives, the relocated
    /// documents, and the processing ledger.
    pub container: String,

    /// Destination folder name for documents whose manifest row carries no
    /// PO number.
    pub unknown_po_folder: String,
}

impl AppConfig {
    pub fn new(container: impl Into<String>, unknown_po_folder: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            unknown_po_folder: unknown_po_folder.into(),
        }
    }
}
