use super::{known, Opt};

/// Content-Format
///
/// ```
/// use croak_msg::{ContentFormat, Opt};
///
/// let opt: Opt = ContentFormat::Json.into();
/// assert_eq!(opt.value.0, vec![50]);
/// assert_eq!(ContentFormat::from(50), ContentFormat::Json);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentFormat {
  /// `text/plain; charset=utf-8`
  Text,
  /// `application/link-format`
  LinkFormat,
  /// `application/xml`
  Xml,
  /// `application/octet-stream`
  OctetStream,
  /// `application/exi`
  Exi,
  /// `application/json`
  Json,
  /// `application/cbor`
  Cbor,
  /// Another content format
  Other(u16),
}

impl ContentFormat {
  /// The numeric identifier of this content format
  pub fn value(&self) -> u16 {
    u16::from(self)
  }
}

impl<'a> From<&'a ContentFormat> for u16 {
  fn from(f: &'a ContentFormat) -> Self {
    use ContentFormat::*;
    match *f {
      | Text => 0,
      | LinkFormat => 40,
      | Xml => 41,
      | OctetStream => 42,
      | Exi => 47,
      | Json => 50,
      | Cbor => 60,
      | Other(n) => n,
    }
  }
}

impl From<u16> for ContentFormat {
  fn from(n: u16) -> Self {
    use ContentFormat::*;
    match n {
      | 0 => Text,
      | 40 => LinkFormat,
      | 41 => Xml,
      | 42 => OctetStream,
      | 47 => Exi,
      | 50 => Json,
      | 60 => Cbor,
      | n => Other(n),
    }
  }
}

impl From<ContentFormat> for Opt {
  fn from(f: ContentFormat) -> Self {
    Opt::uint(known::CONTENT_FORMAT, f.value() as u32)
  }
}
