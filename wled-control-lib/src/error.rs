use thiserror::Error;

/// The broad category of an [`Error`], for callers that want to branch on the
/// kind of failure without matching on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Response,
    Command,
    InvalidValue,
}

/// Errors raised while talking to a WLED device.
#[derive(Error, Debug)]
pub enum Error {
    /// The device could not be reached, or the socket/serial port could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The device answered with something that could not be decoded, or with a
    /// non-success status.
    #[error("Response error: {0}")]
    Response(String),

    /// The device rejected the command, or the serial link failed mid-exchange.
    #[error("Command error: {0}")]
    Command(String),

    /// A color, brightness, percentage or mode argument was out of range.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection(_) => ErrorKind::Connection,
            Error::Response(_) => ErrorKind::Response,
            Error::Command(_) => ErrorKind::Command,
            Error::InvalidValue(_) => ErrorKind::InvalidValue,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidValue(message.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Response(format!("Failed to decode reply: {}", err))
        } else if err.is_status() {
            Error::Response(format!("Unexpected status: {}", err))
        } else {
            Error::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Response(format!("Invalid JSON: {}", err))
    }
}

impl From<serialport::Error> for Error {
    fn from(err: serialport::Error) -> Self {
        Error::Connection(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Command(format!("Serial communication error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Error::invalid("x").kind(), ErrorKind::InvalidValue);
        assert_eq!(Error::Command("x".into()).kind(), ErrorKind::Command);
        assert_eq!(Error::Response("x".into()).kind(), ErrorKind::Response);
        assert_eq!(Error::Connection("x".into()).kind(), ErrorKind::Connection);
    }

    #[test]
    fn test_serde_error_is_response_error() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Response);
    }

    #[test]
    fn test_display_includes_message() {
        let err = Error::invalid("Brightness must be between 0 and 255: 300");
        assert_eq!(
            err.to_string(),
            "Invalid value: Brightness must be between 0 and 255: 300"
        );
    }
}
