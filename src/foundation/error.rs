/// Convenience result type used across the banner engine.
pub type BannerResult<T> = Result<T, BannerError>;

/// Top-level error taxonomy used by engine APIs.
///
/// None of these are fatal to a running display: the frame loop logs them and degrades the
/// affected zone to a solid fill.
#[derive(thiserror::Error, Debug)]
pub enum BannerError {
    /// Invalid zone profile, config or feed record.
    #[error("validation error: {0}")]
    Validation(String),

    /// Fetching or decoding an image/video resource failed.
    #[error("media error: {0}")]
    Media(String),

    /// Executing a frame plan failed.
    #[error("render error: {0}")]
    Render(String),

    /// Writing frames to an output failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// A content or message feed produced something unusable.
    #[error("feed error: {0}")]
    Feed(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BannerError {
    /// Build a [`BannerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BannerError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`BannerError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BannerError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`BannerError::Feed`] value.
    pub fn feed(msg: impl Into<String>) -> Self {
        Self::Feed(msg.into())
    }

    /// Build a [`BannerError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for BannerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
