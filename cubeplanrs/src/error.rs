use thiserror::Error;

pub type Result<T> = std::result::Result<T, CubeplanError>;

#[derive(Debug, Error)]
pub enum CubeplanError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("planning error: {0}")]
    Planning(String),
    #[error("filter on column {0} is not supported; the column is not filterable")]
    UnsupportedFilterColumn(String),
    #[error("scan error: {0}")]
    Scan(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
