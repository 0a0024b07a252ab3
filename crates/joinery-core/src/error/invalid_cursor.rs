use super::Error;

/// Error when a client-supplied pagination cursor cannot be used.
///
/// This occurs when:
/// - The cursor is not valid base64 or does not decode to the expected payload
/// - A keyset cursor names a column that is not part of the sort key
/// - A keyset cursor is missing a column of the sort key
///
/// This is a user-facing error; a well-formed cursor that simply matches no
/// row is not an error.
#[derive(Debug)]
pub(super) struct InvalidCursor {
    message: Box<str>,
}

impl std::error::Error for InvalidCursor {}

impl core::fmt::Display for InvalidCursor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid cursor: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid cursor error.
    pub fn invalid_cursor(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidCursor(InvalidCursor {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid cursor error.
    pub fn is_invalid_cursor(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidCursor(_)))
    }
}
