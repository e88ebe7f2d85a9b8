use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::OFFLINE_SUFFIX;
use crate::error::{CoreError, CoreErrorCode};
use crate::index::IdentityIndex;
use crate::properties::{LEVEL_NAME_KEY, read_value};
use crate::remap::{LinkMode, RemapOptions, RemapReport, offline_path, remap_directory};
use crate::transcode::write_offline_json;

pub const DEFAULT_WHITELIST: &str = "whitelist.json";
pub const OPS_FILE: &str = "ops.json";
pub const PROPERTIES_FILE: &str = "server.properties";
pub const PLAYER_DATA_CATEGORIES: [&str; 3] = ["advancements", "playerdata", "stats"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    /// `ops.json` and `server.properties` are looked up next to this file.
    pub whitelist_path: PathBuf,
    pub ops_file: String,
    pub properties_file: String,
    /// Per-player directories under the world folder, converted in this order.
    pub categories: Vec<String>,
    pub suffix: String,
    pub link_mode: LinkMode,
    /// Treat a missing ops list as fatal.
    pub require_ops: bool,
    pub tool_version: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            whitelist_path: PathBuf::from(DEFAULT_WHITELIST),
            ops_file: OPS_FILE.to_string(),
            properties_file: PROPERTIES_FILE.to_string(),
            categories: PLAYER_DATA_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            suffix: OFFLINE_SUFFIX.to_string(),
            link_mode: LinkMode::default(),
            require_ops: true,
            tool_version: String::new(),
        }
    }
}

impl ConvertConfig {
    pub fn new(whitelist_path: impl Into<PathBuf>) -> Self {
        Self {
            whitelist_path: whitelist_path.into(),
            ..Self::default()
        }
    }

    pub fn with_link_mode(mut self, link_mode: LinkMode) -> Self {
        self.link_mode = link_mode;
        self
    }

    pub fn with_require_ops(mut self, require_ops: bool) -> Self {
        self.require_ops = require_ops;
        self
    }

    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = version.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        self.whitelist_path.parent().unwrap_or_else(|| Path::new(""))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedList {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: String,
    pub report: RemapReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub whitelist: ConvertedList,
    /// `None` when the ops list was missing and not required.
    pub ops: Option<ConvertedList>,
    pub world: String,
    pub categories: Vec<CategoryReport>,
}

impl ConversionSummary {
    pub fn unmatched(&self) -> usize {
        self.categories.iter().map(|c| c.report.unmatched.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// Convert the whitelist, the ops list and every player data directory,
    /// stopping at the first phase that fails.
    pub fn run(&self) -> Result<ConversionSummary, CoreError> {
        let config = &self.config;
        info!(version = %config.tool_version, "mcoffline starting");

        let whitelist_src = read_file(&config.whitelist_path)
            .map_err(|e| e.context("failed opening whitelist"))?;
        let index = IdentityIndex::from_json(&whitelist_src)
            .map_err(|e| e.context("failed reading whitelist"))?;
        let whitelist = self
            .convert_list(&config.whitelist_path, &whitelist_src)
            .map_err(|e| e.context("failed creating offline whitelist"))?;
        info!(players = index.len(), "indexed whitelist");

        let base = config.base_dir();
        let ops = self.convert_ops(&base.join(&config.ops_file))?;

        let properties = base.join(&config.properties_file);
        let world = read_value(&properties, LEVEL_NAME_KEY).map_err(|e| {
            e.context(format!(
                "failed reading {} to get world name",
                config.properties_file
            ))
        })?;
        info!(world = %world, "found world");

        let options = RemapOptions {
            suffix: config.suffix.clone(),
            link_mode: config.link_mode,
        };
        let mut categories = Vec::with_capacity(config.categories.len());
        for category in &config.categories {
            let dir = base.join(&world).join(category);
            let report = remap_directory(&index, &dir, &options)
                .map_err(|e| e.context(format!("failed creating offline {category}")))?;
            categories.push(CategoryReport {
                category: category.clone(),
                report,
            });
        }

        Ok(ConversionSummary {
            whitelist,
            ops,
            world,
            categories,
        })
    }

    fn convert_ops(&self, path: &Path) -> Result<Option<ConvertedList>, CoreError> {
        let name = &self.config.ops_file;
        let src = match fs::read(path) {
            Ok(src) => src,
            Err(e) if e.kind() == ErrorKind::NotFound && !self.config.require_ops => {
                warn!(path = %path.display(), "no ops list found, skipping");
                return Ok(None);
            }
            Err(e) => {
                return Err(CoreError::new(
                    CoreErrorCode::Io,
                    format!("failed opening {name}: {}: {e}", path.display()),
                ));
            }
        };
        self.convert_list(path, &src)
            .map(Some)
            .map_err(|e| e.context(format!("failed to create {name}{}", self.config.suffix)))
    }

    fn convert_list(&self, source: &Path, src: &[u8]) -> Result<ConvertedList, CoreError> {
        let destination = offline_path(source, &self.config.suffix);
        let records = write_offline_json(src, &destination)?;
        info!(path = %destination.display(), records, "wrote offline list");
        Ok(ConvertedList {
            source: source.to_path_buf(),
            destination,
            records,
        })
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, CoreError> {
    fs::read(path).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed to read {}: {e}", path.display()),
        )
    })
}
