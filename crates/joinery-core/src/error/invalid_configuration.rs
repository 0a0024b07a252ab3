use super::Error;

/// Error when the schema configuration cannot be planned.
///
/// This occurs when:
/// - A paginated field has neither an order nor a sort key
/// - A root field carries a join condition
/// - A junction or batch relation is missing its join delegate
/// - `first` is combined with `before`, or `last` with `after`
/// - A field references an object type that was never declared
///
/// These errors are fatal and never retried. The message names the
/// offending schema location so the declaration can be fixed.
#[derive(Debug)]
pub(super) struct InvalidConfiguration {
    message: Box<str>,
}

impl std::error::Error for InvalidConfiguration {}

impl core::fmt::Display for InvalidConfiguration {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidConfiguration(InvalidConfiguration {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a configuration error. Unsupported
    /// dialect features count as configuration errors.
    pub fn is_invalid_configuration(&self) -> bool {
        self.any_kind(|kind| {
            matches!(
                kind,
                super::ErrorKind::InvalidConfiguration(_) | super::ErrorKind::UnsupportedFeature(_)
            )
        })
    }
}
