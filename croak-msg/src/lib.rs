//! Low-level representation of CoAP messages.
//!
//! The most notable item in `croak_msg` is [`Message`];
//! a CoAP message very close to the actual byte layout.
//!
//! ## Options
//! CoAP options (in http terms: headers) are stored by number and
//! delta-encoded on the wire, meaning that the size of a message's
//! option region is not known until every option has been seen.
//!
//! [`opt::encode`] writes options into a caller-owned buffer and, when the buffer
//! is too small, tells the caller exactly how many more bytes it needs
//! instead of writing a partial region:
//!
//! ```
//! use croak_msg::opt::{self, OptEncodeError};
//! use croak_msg::ContentFormat;
//!
//! let opts = [ContentFormat::Json.into()];
//!
//! let mut buf = vec![0u8; 1];
//! let needed = match opt::encode(&mut buf, &opts) {
//!   | Err(OptEncodeError::TooSmall { needed }) => needed,
//!   | other => panic!("{:?}", other),
//! };
//!
//! buf.resize(buf.len() + needed, 0);
//! assert_eq!(opt::encode(&mut buf, &opts).unwrap(), &[0b1100_0001, 50]);
//! ```

#![cfg_attr(not(test), forbid(missing_debug_implementations, unreachable_pub))]
#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(missing_docs)]

/// Cursor over a byte buffer
pub mod cursor;

/// Message structs
pub mod msg;

#[doc(inline)]
pub use cursor::Cursor;
#[doc(inline)]
pub use msg::*;

/// Trait for converting a sequence of bytes into some data structure
pub trait TryFromBytes<A: AsRef<[u8]>>: Sized {
  /// Error type yielded if conversion fails
  type Error;

  /// Try to convert from some sequence of bytes `A`
  /// into `Self`
  fn try_from_bytes(bytes: A) -> Result<Self, Self::Error>;
}

/// Trait allowing fallible conversion into bytes
pub trait TryIntoBytes {
  /// Error type yielded if conversion fails
  type Error;

  /// Try to convert into a collection of bytes
  ///
  /// ```
  /// use croak_msg::{Code, Id, Message, Token, TryIntoBytes, Type};
  ///
  /// let msg = Message::new(Type::Con, Code::new(0, 1), Id(1), Token(Default::default()));
  /// let bytes: Vec<u8> = msg.try_into_bytes().unwrap();
  ///
  /// assert_eq!(bytes, vec![0b_01_00_0000, 0b000_00001, 0, 1]);
  /// ```
  fn try_into_bytes(&self) -> Result<Vec<u8>, Self::Error>;
}

#[cfg(test)]
pub(crate) fn test_msg() -> (Message, Vec<u8>) {
  let header: [u8; 4] = 0b_01_00_0001_01000101_0000000000000001u32.to_be_bytes();
  let token: [u8; 1] = [254u8];
  let content_format: &[u8] = b"application/json";
  let options: [&[u8]; 2] = [&[0b_1100_1101u8, 0b00000011u8], content_format];
  let payload: [&[u8]; 2] = [&[0b_11111111u8], b"hello, world!"];
  let bytes = [header.as_ref(),
               token.as_ref(),
               options.concat().as_ref(),
               payload.concat().as_ref()].concat();

  let msg = Message { id: Id(1),
                      ty: Type::Con,
                      ver: Version(1),
                      token: Token(tinyvec::array_vec!([u8; 8] => 254)),
                      opts: vec![Opt::new(OptNumber(12), content_format.to_vec())],
                      code: Code { class: 2,
                                   detail: 5 },
                      payload: Payload(b"hello, world!".to_vec()) };
  (msg, bytes)
}
