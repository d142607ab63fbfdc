use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepartitionError {
    #[error("Unable to decode report with any candidate encoding (tried: {tried})")]
    Decode { tried: String },

    #[error("Parsing returned no data: no product row was found under a region header")]
    NoData,

    #[error("Sales column '{column}' is not part of the report schema ({available})")]
    UnknownColumn { column: String, available: String },

    #[error("Commune '{commune}' is listed more than once for region '{region}'")]
    DuplicateCommune { region: String, commune: String },

    #[error("Invalid weight {weight} for commune '{commune}' in region '{region}'")]
    InvalidWeight {
        region: String,
        commune: String,
        weight: f64,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RepartitionError>;
