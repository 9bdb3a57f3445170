use super::{Context, WrappedError, CHAIN_DELIMITER};
use std::convert::Infallible;
use std::str::FromStr;

impl WrappedError {
    /// Rebuild a chain from its rendered message
    ///
    /// Every `": "`-separated segment becomes one link with a string context
    /// and no captures, so a context that itself contains `": "` comes back
    /// as several links. Parsing always succeeds.
    pub fn parse_text(text: &str) -> Self {
        let mut segments = text.rsplit(CHAIN_DELIMITER);
        let root = segments.next().unwrap_or_default();

        let mut err = Self::from_parts(Context::from(root), None, None);
        for segment in segments {
            err = Self::from_parts(Context::from(segment), Some(err.into()), None);
        }
        err
    }
}

impl FromStr for WrappedError {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_text(s))
    }
}
