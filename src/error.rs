pub type RayfanResult<T> = Result<T, RayfanError>;

#[derive(thiserror::Error, Debug)]
pub enum RayfanError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("paint error: {0}")]
    Paint(String),

    #[error("present error: {0}")]
    Present(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RayfanError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn paint(msg: impl Into<String>) -> Self {
        Self::Paint(msg.into())
    }

    pub fn present(msg: impl Into<String>) -> Self {
        Self::Present(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            RayfanError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(RayfanError::paint("x").to_string().contains("paint error:"));
        assert!(
            RayfanError::present("x")
                .to_string()
                .contains("present error:")
        );
        assert!(
            RayfanError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("no backing store");
        let err = RayfanError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("no backing store"));
    }
}
