use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsolidateError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to open workbook {path}: {source}")]
    WorkbookOpen {
        path: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Sheet `{sheet}` not found in {path}")]
    SheetNotFound { sheet: String, path: String },

    #[error("Failed to read sheet `{sheet}` in {path}: {source}")]
    SheetRead {
        sheet: String,
        path: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Invalid column label: {label}")]
    InvalidColumn { label: String },

    #[error("Cannot insert column `{name}`, it already exists")]
    DuplicateColumn { name: String },

    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to write run report: {message}")]
    Report { message: String },

    #[error("No source files configured for processing")]
    NoSourcesConfigured,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ConsolidateError {
    fn user_message(&self) -> String {
        match self {
            ConsolidateError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            ConsolidateError::WorkbookOpen { path, source } => {
                format!("Could not open {}: {}", path, source)
            }
            ConsolidateError::SheetNotFound { sheet, path } => {
                format!("Worksheet `{}` is missing from {}", sheet, path)
            }
            ConsolidateError::InvalidColumn { label } => {
                format!("`{}` is not a spreadsheet column label", label)
            }
            ConsolidateError::NoSourcesConfigured => {
                "No source files configured for processing".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ConsolidateError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            ConsolidateError::WorkbookOpen { .. } => Some(
                "Make sure the file is a valid spreadsheet and is not open in another program.".to_string()
            ),
            ConsolidateError::SheetNotFound { .. } => Some(
                "Set `extraction.sheet_name` (or pass --sheet) to the worksheet holding the data.".to_string()
            ),
            ConsolidateError::InvalidColumn { .. } => Some(
                "Column labels are letters only, e.g. A, Z, AI, XFD.".to_string()
            ),
            ConsolidateError::NoSourcesConfigured => Some(
                "Add `[[files]]` entries with a `path` and `description` to the configuration file.".to_string()
            ),
            ConsolidateError::Io(_) | ConsolidateError::Write(_) => Some(
                "Ensure you have the necessary read/write permissions for the output directory.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConsolidateError {
    fn from(error: toml::de::Error) -> Self {
        ConsolidateError::Config {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConsolidateError {
    fn from(error: serde_json::Error) -> Self {
        ConsolidateError::Report {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsolidateError>;
