use thiserror::Error;

#[derive(Error, Debug)]
pub enum TopoError {
    #[error("Label/value length mismatch: {labels} labels, {values} values")]
    LengthMismatch { labels: usize, values: usize },

    #[error("No electrodes given")]
    EmptyInput,

    #[error("Unknown electrode label: {0:?}")]
    UnknownElectrode(String),

    #[error("Non-finite value {value} for electrode {label}")]
    NonFiniteValue { label: String, value: f64 },

    #[error("Grid size must be at least 2 samples per axis, got {0}")]
    InvalidGridSize(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Interpolation failed: {0}")]
    Interpolation(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type TopoResult<T> = Result<T, TopoError>;
