use tinyvec::ArrayVec;
use toad_macros::rfc_7252_doc;

#[doc = rfc_7252_doc!("5.3.1")]
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Token(pub ArrayVec<[u8; 8]>);

impl Token {
  /// Create a token from up to 8 bytes, yielding None when `bytes` is longer than that.
  ///
  /// ```
  /// use croak_msg::Token;
  ///
  /// assert!(Token::try_from_slice(&[1, 2, 3]).is_some());
  /// assert!(Token::try_from_slice(&[0; 9]).is_none());
  /// ```
  pub fn try_from_slice(bytes: &[u8]) -> Option<Self> {
    ArrayVec::try_from(bytes).ok().map(Token)
  }

  /// The token's bytes
  pub fn as_bytes(&self) -> &[u8] {
    self.0.as_slice()
  }
}
