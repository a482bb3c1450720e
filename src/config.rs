use crate::error::{ConsolidateError, Result};
use crate::extractor::region::column_index;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAMES: [&str; 2] = ["pcat-efeito.toml", ".pcat-efeito.toml"];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    pub files: Vec<SourceEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub sheet_name: String,
    pub start_col: String,
    pub end_col: String,
    pub start_row: u32,
    pub end_row: u32,
    pub years: Vec<u16>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_directory: PathBuf,
    pub directory_name: String,
    pub file_name: String,
    pub generate_report: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: PathBuf,
}

/// One workbook to read, as listed in the `[[files]]` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub description: String,
    /// Explicit year; when absent the year is inferred from the path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

impl SourceEntry {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(path: P, description: S) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            year: None,
        }
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn has_path(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            files: default_sources(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            sheet_name: "EFEITO".to_string(),
            start_col: "AI".to_string(),
            end_col: "AV".to_string(),
            start_row: 1,
            end_row: 11,
            years: (2014..=2024).collect(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::new(),
            directory_name: "resultados_efeito".to_string(),
            file_name: "PCAT_Efeito_Consolidado.xlsx".to_string(),
            generate_report: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("efeito_extraction.log"),
        }
    }
}

fn default_sources() -> Vec<SourceEntry> {
    const ROOT: &str = r"C:\Users\Hiden Number\Desktop\PCATs";
    [
        ("PCAT_Cemar_2014.xlsx", "PCAT Maranhão 2014"),
        ("PCAT_Cemar_2015.xlsx", "PCAT Maranhão 2015"),
        ("PCAT_Cemar_2016.xlsx", "PCAT Maranhão 2016"),
        ("PCAT_Cemar_2017.xlsx", "PCAT Maranhão 2017"),
        ("PCAT_Cemar_2018 .xlsx", "PCAT Maranhão 2018"),
        ("PCAT_Cemar_2019.xlsx", "PCAT Maranhão 2019"),
        ("PCAT_Cemar_2020 V02.xlsx", "PCAT Maranhão 2020"),
        ("PCAT Cemar 2021 V02.xlsx", "PCAT Maranhão 2021"),
        ("PCAT Cemar 2022 V02.xlsx", "PCAT Maranhão 2022"),
        ("PCAT Equatorial MA 2023 V02.xlsx", "PCAT Maranhão 2023"),
        ("PCAT Equatorial MA 2024 V02.xlsx", "PCAT Maranhão 2024"),
        ("PCAT Equatorial MA 2025 V02.xlsx", "PCAT Maranhão 2025"),
    ]
    .into_iter()
    .map(|(file, description)| SourceEntry::new(format!(r"{}\{}", ROOT, file), description))
    .collect()
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConsolidateError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConsolidateError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConsolidateError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                for default_path in &DEFAULT_CONFIG_NAMES {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.base_directory = output_dir.clone();
        }

        if let Some(ref sheet) = cli_args.sheet_name {
            self.extraction.sheet_name = sheet.clone();
        }

        if let Some(ref log_file) = cli_args.log_file {
            self.logging.log_file = log_file.clone();
        }

        if cli_args.no_report {
            self.output.generate_report = false;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ConsolidateError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| ConsolidateError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;

        if extraction.sheet_name.trim().is_empty() {
            return Err(ConsolidateError::Config {
                message: "Sheet name must not be empty".to_string(),
            });
        }

        let start_col = column_index(&extraction.start_col)?;
        let end_col = column_index(&extraction.end_col)?;
        if start_col > end_col {
            return Err(ConsolidateError::Config {
                message: format!(
                    "Start column {} comes after end column {}",
                    extraction.start_col, extraction.end_col
                ),
            });
        }

        if extraction.start_row == 0 {
            return Err(ConsolidateError::Config {
                message: "Rows are 1-based; start_row must be at least 1".to_string(),
            });
        }

        if extraction.start_row > extraction.end_row {
            return Err(ConsolidateError::Config {
                message: format!(
                    "start_row ({}) must not exceed end_row ({})",
                    extraction.start_row, extraction.end_row
                ),
            });
        }

        if extraction.years.is_empty() {
            return Err(ConsolidateError::Config {
                message: "At least one year must be configured".to_string(),
            });
        }

        if self.output.file_name.trim().is_empty() {
            return Err(ConsolidateError::Config {
                message: "Output file name must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Output directory. An empty or relative `base_directory` is taken
    /// relative to the working directory at the time of the call.
    pub fn output_directory(&self) -> PathBuf {
        let base = &self.output.base_directory;
        let base = if base.is_absolute() {
            base.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(base))
                .unwrap_or_else(|_| base.clone())
        };
        base.join(&self.output.directory_name)
    }

    pub fn output_file(&self) -> PathBuf {
        self.output_directory().join(&self.output.file_name)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub output_dir: Option<PathBuf>,
    pub sheet_name: Option<String>,
    pub log_file: Option<PathBuf>,
    pub no_report: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_sheet_name(mut self, sheet_name: Option<String>) -> Self {
        self.sheet_name = sheet_name;
        self
    }

    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }

    pub fn with_no_report(mut self, no_report: bool) -> Self {
        self.no_report = no_report;
        self
    }
}
