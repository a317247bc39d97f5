use toad_macros::rfc_7252_doc;

/// Content-Format option values
pub mod content_format;

/// Option serialization
pub mod encode;

/// Option parsing
pub mod decode;

/// Option parsing errors
pub mod parse_error;

/// Numbers of the options defined in RFC7252
pub mod known;

#[doc(inline)]
pub use content_format::ContentFormat;
#[doc(inline)]
pub use decode::decode;
#[doc(inline)]
pub use encode::{encode, encoded_len, OptEncodeError};
#[doc(inline)]
pub use parse_error::OptParseError;

#[doc = rfc_7252_doc!("5.4")]
/// <details><summary><b>RFC7252 Section 3.1 Option binary format</b></summary>
#[doc = concat!("\n#", rfc_7252_doc!("3.1"))]
/// </details>
///
/// # `Opt` struct
/// An option identified by its [`OptNumber`].
///
/// On the wire options are written as deltas from the previous
/// option's number, which is why the order a collection of options
/// is encoded in matters; see [`encode`].
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Opt {
  /// See [`OptNumber`]
  pub number: OptNumber,
  /// See [`OptValue`]
  pub value: OptValue,
}

impl Opt {
  /// Create an option
  ///
  /// ```
  /// use croak_msg::{Opt, OptNumber};
  ///
  /// let path = Opt::new(OptNumber(11), "hello".as_bytes().to_vec());
  /// ```
  pub fn new(number: OptNumber, value: impl Into<Vec<u8>>) -> Self {
    Self { number,
           value: OptValue(value.into()) }
  }

  /// Create an option holding an unsigned integer
  ///
  /// Integers use the shortest big-endian representation, meaning `0`
  /// has an empty value.
  ///
  /// ```
  /// use croak_msg::{Opt, OptNumber};
  ///
  /// assert_eq!(Opt::uint(OptNumber(14), 0).value.0, Vec::<u8>::new());
  /// assert_eq!(Opt::uint(OptNumber(14), 60).value.0, vec![60]);
  /// assert_eq!(Opt::uint(OptNumber(14), 256).value.0, vec![1, 0]);
  /// ```
  pub fn uint(number: OptNumber, n: u32) -> Self {
    let bytes = n.to_be_bytes();
    let first_nonzero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    Self::new(number, &bytes[first_nonzero..])
  }
}

#[doc = rfc_7252_doc!("5.4.6")]
/// <details><summary><b>RFC7252 Section 12.2 Core CoAP Option Numbers</b></summary>
#[doc = concat!("\n#", rfc_7252_doc!("12.2"))]
/// </details>
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct OptNumber(pub u16);

#[doc = rfc_7252_doc!("5.4.1")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptionMustBeProcessed {
  /// This option must be processed,
  /// and a response that ignores it
  /// will be rejected.
  ///
  /// Corresponds to the option being "critical"
  /// in strict CoAP terms
  Yes,
  /// This option does not _need_ to
  /// be processed,
  /// and a response that ignores it
  /// will be processed anyway.
  ///
  /// Corresponds to the option being "elective"
  /// in strict CoAP terms
  No,
}

impl OptNumber {
  /// Whether or not this option may be ignored by a server
  pub fn must_be_processed(&self) -> OptionMustBeProcessed {
    match self.0 & 0b1 {
      | 1 => OptionMustBeProcessed::Yes,
      | _ => OptionMustBeProcessed::No,
    }
  }
}

#[doc = rfc_7252_doc!("3.2")]
#[derive(Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct OptValue(pub Vec<u8>);

impl OptValue {
  /// Interpret this value as an unsigned integer
  ///
  /// Yields None if the value is longer than 4 bytes.
  ///
  /// ```
  /// use croak_msg::OptValue;
  ///
  /// assert_eq!(OptValue(vec![]).as_uint(), Some(0));
  /// assert_eq!(OptValue(vec![1, 0]).as_uint(), Some(256));
  /// assert_eq!(OptValue(vec![1; 5]).as_uint(), None);
  /// ```
  pub fn as_uint(&self) -> Option<u32> {
    if self.0.len() > 4 {
      return None;
    }

    Some(self.0.iter().fold(0u32, |n, b| (n << 8) | *b as u32))
  }

  /// Interpret this value as a utf8 string
  pub fn as_str(&self) -> Result<&str, core::str::Utf8Error> {
    core::str::from_utf8(&self.0)
  }
}
