pub type KeytimeResult<T> = Result<T, KeytimeError>;

#[derive(thiserror::Error, Debug)]
pub enum KeytimeError {
    /// A keyframe or effect group names a shape id that does not exist in
    /// its scene. Fatal to the whole compile.
    #[error("invalid animation target: \"{0}\"")]
    UnknownTarget(String),

    /// An effect or text-effect name is not one of the defined kinds.
    /// Fatal to the whole compile.
    #[error("invalid effect: {0}")]
    UnknownEffect(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KeytimeError {
    pub fn unknown_target(id: impl Into<String>) -> Self {
        Self::UnknownTarget(id.into())
    }

    pub fn unknown_effect(name: impl Into<String>) -> Self {
        Self::UnknownEffect(name.into())
    }
}
