use thiserror::Error;

use phenotag_store::StoreError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unknown criteria '{name}' for feature '{feature}'")]
    UnknownCriteria { feature: String, name: String },

    #[error("unsupported feature type: {0}")]
    UnsupportedFeature(String),

    #[error("missing config key '{key}' in section '{section}'")]
    MissingConfigKey { section: String, key: String },

    #[error("criteria section '{section}' is declared for feature '{declared}', not '{requested}'")]
    FeatureMismatch {
        section: String,
        declared: String,
        requested: String,
    },

    #[error("failed to parse criteria config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("could not read config file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("linkage service failure: {0}")]
    Linkage(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("criteria '{section}' failed: {source}")]
    InSection {
        section: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Attach the rule name being processed to a failure.
    pub fn in_section(self, section: &str) -> EngineError {
        EngineError::InSection {
            section: section.to_string(),
            source: Box::new(self),
        }
    }
}
