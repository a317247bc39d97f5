use toad_macros::rfc_7252_doc;

/// Message Code
pub mod code;

/// Message parsing errors
pub mod parse_error;

/// Message ID
pub mod id;

/// Message Options
pub mod opt;

/// Message Type
pub mod ty;

/// Message Token
pub mod token;

/// Message Version
pub mod ver;

pub use code::*;
pub use id::*;
pub use opt::{known, ContentFormat, Opt, OptNumber, OptParseError, OptValue};
pub use parse_error::*;
pub use token::*;
pub use ty::*;
pub use ver::*;

use crate::{Cursor, TryFromBytes, TryIntoBytes};

#[doc = rfc_7252_doc!("5.5")]
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Payload(pub Vec<u8>);

/// Struct representing the first byte of a message.
///
/// ```text
/// CoAP version
/// |
/// |  Message type (request, response, empty)
/// |  |
/// |  |  Length of token, in bytes. (4-bit integer)
/// |  |  |
/// vv vv vvvv
/// 01 00 0000
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub(crate) struct Byte1 {
  pub(crate) ver: Version,
  pub(crate) ty: Type,
  pub(crate) tkl: u8,
}

impl TryFrom<u8> for Byte1 {
  type Error = MessageParseError;

  fn try_from(b: u8) -> Result<Self, Self::Error> {
    let ver = b >> 6; // bits 0 & 1
    let ty = b >> 4 & 0b11; // bits 2 & 3
    let tkl = b & 0b1111u8; // last 4 bits

    Ok(Byte1 { ver: Version(ver),
               ty: Type::try_from(ty)?,
               tkl })
  }
}

impl From<Byte1> for u8 {
  fn from(b: Byte1) -> u8 {
    let ver = b.ver.0 << 6;
    let ty = u8::from(b.ty) << 4;
    let tkl = b.tkl;

    ver | ty | tkl
  }
}

/// # `Message` struct
/// Low-level representation of a message that has been parsed from the raw binary format.
///
/// Messages support both serializing to bytes and from bytes, by using the provided [`TryFromBytes`] and [`TryIntoBytes`] traits.
///
/// <details>
/// <summary><b>RFC7252 - CoAP Messaging Model</b></summary>
#[doc = concat!("\n#", rfc_7252_doc!("2.1"))]
/// </details>
///
/// ```
/// use croak_msg::*;
/// # //                       version  token len  code (2.05 Content)
/// # //                       |        |          /
/// # //                       |  type  |         /  message ID
/// # //                       |  |     |        |   |
/// # //                       vv vv vvvv vvvvvvvv vvvvvvvvvvvvvvvv
/// # let header: [u8; 4] = 0b_01_00_0001_01000101_0000000000000001u32.to_be_bytes();
/// # let token: [u8; 1] = [254u8];
/// # let content_format: &[u8] = b"application/json";
/// # let options: [&[u8]; 2] = [&[0b_1100_1101u8, 0b00000011u8], content_format];
/// # let payload: [&[u8]; 2] = [&[0b_11111111u8], b"hello, world!"];
/// let packet: Vec<u8> = /* bytes! */
/// # [header.as_ref(), token.as_ref(), options.concat().as_ref(), payload.concat().as_ref()].concat();
///
/// let msg = Message::try_from_bytes(packet.clone()).unwrap();
///
/// assert_eq!(msg.code, Code::new(2, 5));
/// assert_eq!(msg.get(known::CONTENT_FORMAT).map(|v| v.0.clone()),
///            Some(b"application/json".to_vec()));
/// assert_eq!(msg.payload_str(), Ok("hello, world!"));
/// assert_eq!(msg.try_into_bytes().unwrap(), packet);
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Message {
  /// see [`Id`] for details
  pub id: Id,
  /// see [`Type`] for details
  pub ty: Type,
  /// see [`Version`] for details
  pub ver: Version,
  /// see [`Token`] for details
  pub token: Token,
  /// see [`Code`] for details
  pub code: Code,
  /// see [`Opt`] for details
  pub opts: Vec<Opt>,
  /// see [`Payload`]
  pub payload: Payload,
}

impl Message {
  /// Create a message with no options and an empty payload
  pub fn new(ty: Type, code: Code, id: Id, token: Token) -> Self {
    Self { id,
           ty,
           ver: Default::default(),
           token,
           code,
           opts: Vec::new(),
           payload: Payload(Vec::new()) }
  }

  /// Get the value of the first option with number `n`
  pub fn get(&self, n: OptNumber) -> Option<&OptValue> {
    self.opts.iter().find(|o| o.number == n).map(|o| &o.value)
  }

  /// Get the values of all options with number `n`, in the order they appeared
  pub fn get_all(&self, n: OptNumber) -> impl Iterator<Item = &OptValue> {
    self.opts.iter().filter(move |o| o.number == n).map(|o| &o.value)
  }

  /// Add an option, keeping any other options with the same number
  pub fn add(&mut self, opt: Opt) {
    self.opts.push(opt);
  }

  /// Replace all options with the number of `opt` with `opt`
  pub fn set(&mut self, opt: Opt) {
    self.opts.retain(|o| o.number != opt.number);
    self.opts.push(opt);
  }

  /// Get the segments of the Uri-Path
  ///
  /// ```
  /// use croak_msg::*;
  ///
  /// let mut msg = Message::new(Type::Con, Code::new(0, 1), Id(1), Token(Default::default()));
  /// msg.add(Opt::new(known::URI_PATH, "subpath"));
  /// msg.add(Opt::new(known::URI_PATH, "Another"));
  ///
  /// assert_eq!(msg.path_segments().unwrap(), vec!["subpath", "Another"]);
  /// ```
  pub fn path_segments(&self) -> Result<Vec<&str>, core::str::Utf8Error> {
    self.get_all(known::URI_PATH).map(OptValue::as_str).collect()
  }

  /// Get the Content-Format of this message's payload
  pub fn content_format(&self) -> Option<ContentFormat> {
    self.get(known::CONTENT_FORMAT)
        .and_then(OptValue::as_uint)
        .and_then(|n| u16::try_from(n).ok())
        .map(ContentFormat::from)
  }

  /// Get the payload as a utf8 string
  pub fn payload_str(&self) -> Result<&str, core::str::Utf8Error> {
    core::str::from_utf8(&self.payload.0)
  }

  /// Serialize this message, using `opts` as the already-encoded
  /// option region instead of encoding [`Message.opts`](#structfield.opts).
  ///
  /// ```
  /// use croak_msg::*;
  ///
  /// let mut msg = Message::new(Type::Ack, Code::new(2, 5), Id(3), Token(Default::default()));
  /// msg.payload = Payload(b"hi".to_vec());
  ///
  /// assert_eq!(msg.to_bytes_with_opts(&[0b1100_0000]),
  ///            vec![0b_01_10_0000, 0b010_00101, 0, 3, 0b1100_0000, 0xFF, b'h', b'i']);
  /// ```
  pub fn to_bytes_with_opts(&self, opts: &[u8]) -> Vec<u8> {
    let token = self.token.as_bytes();
    let mut bytes = Vec::with_capacity(4 + token.len() + opts.len() + 1 + self.payload.0.len());

    let byte1: u8 = Byte1 { tkl: token.len() as u8,
                            ver: self.ver,
                            ty: self.ty }.into();
    let id: [u8; 2] = self.id.into();

    bytes.push(byte1);
    bytes.push(self.code.into());
    bytes.extend(id);
    bytes.extend(token);
    bytes.extend(opts);

    if !self.payload.0.is_empty() {
      bytes.push(0b11111111);
      bytes.extend(&self.payload.0);
    }

    bytes
  }
}

impl TryIntoBytes for Message {
  type Error = opt::OptEncodeError;

  fn try_into_bytes(&self) -> Result<Vec<u8>, Self::Error> {
    let mut region = vec![0u8; opt::encoded_len(&self.opts)?];
    let region = opt::encode(&mut region, &self.opts)?;
    Ok(self.to_bytes_with_opts(region))
  }
}

impl<Bytes: AsRef<[u8]>> TryFromBytes<Bytes> for Message {
  type Error = MessageParseError;

  fn try_from_bytes(bytes: Bytes) -> Result<Self, Self::Error> {
    let mut bytes = Cursor::new(bytes);

    let Byte1 { tkl, ty, ver } = bytes.next().ok_or_else(MessageParseError::eof)?.try_into()?;

    if tkl > 8 {
      return Err(Self::Error::InvalidTokenLength(tkl));
    }

    let code: Code = bytes.next().ok_or_else(MessageParseError::eof)?.into();
    let id = Id::consume(&mut bytes)?;

    let token = bytes.take_exact(tkl as usize)
                     .and_then(Token::try_from_slice)
                     .ok_or_else(MessageParseError::eof)?;

    let opts = opt::decode(&mut bytes).map_err(Self::Error::OptParseError)?;
    let payload = Payload(bytes.take_until_end().to_vec());

    Ok(Message { id,
                 ty,
                 ver,
                 code,
                 token,
                 opts,
                 payload })
  }
}
