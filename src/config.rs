use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::collections::HashSet;

/// CLI configuration, layered from optional `config/` files so the tool
/// also runs with built-in defaults only.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub image_directories: Vec<String>,
    pub allowed_extensions: HashSet<String>,
    pub num_workers: usize,
    pub recursive: bool,
    pub log_level: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("image_directories", Vec::<String>::new())?
            .set_default(
                "allowed_extensions",
                vec!["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff"],
            )?
            // 0 means one worker per logical CPU.
            .set_default("num_workers", 0i64)?
            .set_default("recursive", true)?
            .set_default("log_level", "info")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .build()?;

        s.try_deserialize()
    }
}
