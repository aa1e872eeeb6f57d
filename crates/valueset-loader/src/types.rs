//! Loader-wide types: errors, configuration and operation reports.

use std::time::Duration;

use thiserror::Error;
use valueset_types::Oid;

/// Errors that can occur while importing or annotating value sets.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// I/O error reading or writing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited spreadsheet parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Document (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed XML payload.
    #[error("XML error: {0}")]
    Xml(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The terminology service answered with a non-success status.
    #[error("HTTP status {status} from {url}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Requested URL, without query string.
        url: String,
    },

    /// The service payload did not contain the requested value set.
    #[error("Value set not found: {oid}")]
    ValueSetNotFound {
        /// The requested OID.
        oid: Oid,
    },

    /// Missing required column in a spreadsheet header.
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// The name of the missing column.
        column: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Attempted to insert a value set whose OID is already stored.
    #[error("Value set already stored: {oid}")]
    DuplicateOid {
        /// The duplicated OID.
        oid: Oid,
    },

    /// OID unusable as a document key.
    #[error("Invalid OID: {value:?}")]
    InvalidOid {
        /// The rejected value.
        value: String,
    },

    /// Ticket negotiation with the terminology service failed.
    #[error("Ticket error: {0}")]
    Ticket(String),
}

impl From<quick_xml::Error> for LoaderError {
    fn from(err: quick_xml::Error) -> Self {
        LoaderError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for LoaderError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        LoaderError::Xml(err.to_string())
    }
}

/// Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Configuration for delimited spreadsheet parsing.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Log every parsed row and skipped blank line at info level instead of trace.
    pub verbose: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            verbose: false,
        }
    }
}

impl SheetConfig {
    /// Creates a config for tab-delimited exports.
    pub fn tab_delimited() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }
}

/// Default VSAC ticket-granting endpoint.
pub const DEFAULT_TICKET_URL: &str = "https://vsac.nlm.nih.gov/vsac/ws/Ticket";

/// Default VSAC SVS retrieval endpoint.
pub const DEFAULT_API_URL: &str = "https://vsac.nlm.nih.gov/vsac/svs/RetrieveValueSet";

/// Connection settings for the VSAC terminology service.
#[derive(Debug, Clone)]
pub struct VsacConfig {
    /// Ticket-granting endpoint.
    pub ticket_url: String,
    /// Value set retrieval endpoint.
    pub api_url: String,
    /// Outbound proxy URL. `None` means a direct connection.
    pub proxy: Option<String>,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for VsacConfig {
    fn default() -> Self {
        Self {
            ticket_url: DEFAULT_TICKET_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            proxy: None,
            timeout: None,
        }
    }
}

/// Username/password pair used to obtain VSAC tickets.
#[derive(Clone)]
pub struct VsacCredentials {
    /// UMLS account name.
    pub username: String,
    /// UMLS account password.
    pub password: String,
}

impl VsacCredentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for VsacCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VsacCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Outcome counts of a remote fetch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Value sets retrieved from the service.
    pub fetched: usize,
    /// Value sets read from the response cache.
    pub from_cache: usize,
    /// OIDs skipped because they were already stored.
    pub skipped: usize,
}

impl FetchReport {
    /// Number of value sets inserted by the run.
    pub fn loaded(&self) -> usize {
        self.fetched + self.from_cache
    }
}

/// A white-list value set whose declared codes were not all found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhiteListDiscrepancy {
    /// The value set OID.
    pub oid: Oid,
    /// Number of concepts the white list declared.
    pub declared: usize,
    /// Number of stored concepts that matched.
    pub matched: usize,
}

/// Result of applying a white list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhiteListReport {
    /// Total concepts marked white-listed.
    pub matched: usize,
    /// White-listed OIDs with no stored value set (child OIDs excluded).
    pub missing: Vec<Oid>,
    /// Value sets where fewer or more codes matched than were declared.
    pub discrepancies: Vec<WhiteListDiscrepancy>,
}

/// A concept that ended up both white-listed and black-listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConflict {
    /// The value set OID.
    pub oid: Oid,
    /// Code system of the concept.
    pub code_system_name: String,
    /// The concept's code.
    pub code: String,
}

/// Result of applying a black list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlackListReport {
    /// Total concepts marked black-listed.
    pub matched: usize,
    /// Black-listed concepts that were already white-listed.
    pub conflicts: Vec<ListConflict>,
}

/// Result of clearing all annotations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Concepts whose white-list flag was cleared.
    pub white_cleared: usize,
    /// Concepts whose black-list flag was cleared.
    pub black_cleared: usize,
}
