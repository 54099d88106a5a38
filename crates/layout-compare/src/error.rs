use crate::render::RenderFailure;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    ParseConfig {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to list input directory {path}: {source}")]
    ReadInputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    CreateOutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderFailure),

    #[error("failed to launch viewer `{program}`: {source}")]
    ViewerLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no output could be opened with `{program}` ({count} attempted)")]
    FallbackExhausted { program: String, count: usize },

    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}
