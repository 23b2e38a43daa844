use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldNameError {
    #[error("unknown form field `{0}`")]
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("hazard `{0}` is listed more than once")]
    DuplicateHazard(String),
    #[error("control `{control}` is listed more than once under hazard `{hazard}`")]
    DuplicateControl { hazard: String, control: String },
    #[error("PPE item `{0}` is listed more than once")]
    DuplicatePpe(String),
    #[error("catalog entry has an empty name")]
    EmptyName,
}
