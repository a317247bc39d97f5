use core::fmt;

use super::opt::OptParseError;

/// Errors encounterable while parsing a message from bytes
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Eq, Ord)]
pub enum MessageParseError {
  /// Reached end of stream before parsing was finished
  UnexpectedEndOfStream,

  /// Token length was > 8
  InvalidTokenLength(u8),

  /// Error parsing option
  OptParseError(OptParseError),

  /// The message type is invalid (see [`Type`](crate::Type) for information & valid values)
  InvalidType(u8),
}

impl MessageParseError {
  /// Shorthand for [`MessageParseError::UnexpectedEndOfStream`]
  pub fn eof() -> Self {
    Self::UnexpectedEndOfStream
  }
}

impl fmt::Display for MessageParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::UnexpectedEndOfStream => write!(f, "unexpected end of datagram"),
      | Self::InvalidTokenLength(n) => write!(f, "token length {} exceeds 8", n),
      | Self::OptParseError(e) => write!(f, "invalid option: {:?}", e),
      | Self::InvalidType(t) => write!(f, "invalid message type {}", t),
    }
  }
}

impl std::error::Error for MessageParseError {}
