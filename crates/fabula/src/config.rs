//! Layered configuration.
//!
//! Defaults, then an optional `fabula.toml`, then `FABULA_*` environment
//! variables (double underscore for nesting, e.g.
//! `FABULA_STORAGE__ASSET_DIR`). `GEMINI_API_KEY` is read separately by
//! the model clients; `.env` files are honored via dotenvy.

use derive_getters::Getters;
use fabula_core::DEFAULT_PAGE_COUNT;
use fabula_error::{ConfigError, FabulaError, FabulaResult};
use fabula_models::gemini::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Where books and generated assets are kept.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct StorageConfig {
    /// Root of the content-addressable asset store
    asset_dir: PathBuf,
    /// Directory holding one JSON record per book
    book_dir: PathBuf,
}

/// Generation tuning: models, retries, pacing.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct GenerationConfig {
    /// Story pages per book
    page_count: u8,
    /// Gemini model for premise and narrative text
    text_model: String,
    /// Gemini model for image generation
    image_model: String,
    /// Minimum spacing between image-service calls, in milliseconds
    min_image_interval_ms: u64,
    /// Attempts per generated asset
    retry_attempts: u32,
    /// Fixed delay between attempts, in seconds
    retry_delay_secs: u64,
}

impl GenerationConfig {
    /// Minimum spacing between image-service calls.
    pub fn min_image_interval(&self) -> Duration {
        Duration::from_millis(self.min_image_interval_ms)
    }

    /// Fixed delay between retry attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Font face overrides. When absent, well-known system directories are
/// probed for the DejaVu faces.
#[derive(Debug, Clone, Default, Deserialize, Getters)]
pub struct FontConfig {
    /// Bold face used for overlay text and titles
    bold: Option<PathBuf>,
    /// Regular face used for the back-cover summary
    regular: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct FabulaConfig {
    /// Storage directories
    storage: StorageConfig,
    /// Generation tuning
    generation: GenerationConfig,
    /// Font overrides
    #[serde(default)]
    fonts: FontConfig,
}

impl FabulaConfig {
    /// Load configuration from defaults, `fabula.toml`, and `FABULA_*`
    /// environment variables, in that precedence order.
    pub fn load() -> FabulaResult<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("storage.asset_dir", "data/assets")
            .map_err(config_error)?
            .set_default("storage.book_dir", "data/books")
            .map_err(config_error)?
            .set_default("generation.page_count", i64::from(DEFAULT_PAGE_COUNT))
            .map_err(config_error)?
            .set_default("generation.text_model", DEFAULT_TEXT_MODEL)
            .map_err(config_error)?
            .set_default("generation.image_model", DEFAULT_IMAGE_MODEL)
            .map_err(config_error)?
            .set_default("generation.min_image_interval_ms", 1000_i64)
            .map_err(config_error)?
            .set_default("generation.retry_attempts", 3_i64)
            .map_err(config_error)?
            .set_default("generation.retry_delay_secs", 2_i64)
            .map_err(config_error)?
            .add_source(config::File::with_name("fabula").required(false))
            .add_source(config::Environment::with_prefix("FABULA").separator("__"))
            .build()
            .map_err(config_error)?;

        settings.try_deserialize().map_err(config_error)
    }
}

fn config_error(e: config::ConfigError) -> FabulaError {
    ConfigError::new(e.to_string()).into()
}
