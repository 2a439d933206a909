use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("no item matches '{target}'")]
    UnknownItem { target: String },

    #[error("failed to load catalog: {0}")]
    Catalog(#[from] tickboard_core::CatalogLoadError),

    #[error(transparent)]
    Dashboard(#[from] tickboard_core::CoreError),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::UnknownItem { .. } => 2,
            Self::Catalog(_) => 3,
            Self::Dashboard(_) => 4,
        }
    }
}
