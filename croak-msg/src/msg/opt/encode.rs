use core::fmt;

use tinyvec::ArrayVec;

use super::{Opt, OptNumber};

/// The largest option delta or value length expressible
/// with the 2-byte extended format (`269 + 0xFFFF`)
pub const MAX_EXTENDED: usize = 269 + u16::MAX as usize;

/// Errors encounterable serializing options to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptEncodeError {
  /// The buffer was not large enough to hold the option region.
  ///
  /// `needed` is the exact number of additional bytes the buffer
  /// would need for the same options to encode successfully.
  TooSmall {
    #[allow(missing_docs)]
    needed: usize,
  },
  /// An option value was too long to be expressed on the wire
  ValueTooLong {
    #[allow(missing_docs)]
    number: OptNumber,
    #[allow(missing_docs)]
    len: usize,
  },
}

impl fmt::Display for OptEncodeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::TooSmall { needed } => write!(f, "buffer too small by {} bytes", needed),
      | Self::ValueTooLong { number, len } => {
        write!(f,
               "option {} value of {} bytes exceeds {}",
               number.0, len, MAX_EXTENDED)
      },
    }
  }
}

impl std::error::Error for OptEncodeError {}

/// The 4-bit header nibble for a delta or length, and the extended bytes that follow the header.
pub(crate) fn opt_len_or_delta(val: usize) -> (u8, ArrayVec<[u8; 2]>) {
  let mut bytes = ArrayVec::new();
  match val {
    | n if n >= 269 => {
      bytes.extend(((n - 269) as u16).to_be_bytes());
      (14, bytes)
    },
    | n if n >= 13 => {
      bytes.push((n - 13) as u8);
      (13, bytes)
    },
    | n => (n as u8, bytes),
  }
}

fn extended_size(val: usize) -> usize {
  match val {
    | n if n >= 269 => 2,
    | n if n >= 13 => 1,
    | _ => 0,
  }
}

fn ascending(opts: &[Opt]) -> Vec<&Opt> {
  let mut sorted = opts.iter().collect::<Vec<_>>();
  // stable, so repeated options keep the order they were given in
  sorted.sort_by_key(|o| o.number);
  sorted
}

fn size_of(opts: &[&Opt]) -> Result<usize, OptEncodeError> {
  let mut prev = 0u16;
  let mut size = 0usize;

  for opt in opts {
    let len = opt.value.0.len();
    if len > MAX_EXTENDED {
      return Err(OptEncodeError::ValueTooLong { number: opt.number,
                                                len });
    }

    let delta = (opt.number.0 - prev) as usize;
    size += 1 + extended_size(delta) + extended_size(len) + len;
    prev = opt.number.0;
  }

  Ok(size)
}

/// The number of bytes `opts` occupy once encoded.
///
/// ```
/// use croak_msg::opt::{self, known};
/// use croak_msg::{ContentFormat, Opt};
///
/// let opts = [Opt::new(known::URI_PATH, "hello"), ContentFormat::Text.into()];
/// assert_eq!(opt::encoded_len(&opts), Ok(1 + 5 + 1));
/// ```
pub fn encoded_len(opts: &[Opt]) -> Result<usize, OptEncodeError> {
  size_of(&ascending(opts))
}

/// Write `opts` into `buf` in ascending option number order,
/// yielding the slice of `buf` that was written to.
///
/// If `buf` is too small, nothing is written and
/// [`OptEncodeError::TooSmall`] reports exactly how many more bytes are needed.
///
/// ```
/// use croak_msg::opt::{self, known, OptEncodeError};
/// use croak_msg::{ContentFormat, Opt};
///
/// let opts = [ContentFormat::Json.into(), Opt::new(known::URI_PATH, "hi")];
///
/// let mut buf = [0u8; 2];
/// assert_eq!(opt::encode(&mut buf, &opts),
///            Err(OptEncodeError::TooSmall { needed: 3 }));
///
/// let mut buf = [0u8; 8];
/// assert_eq!(opt::encode(&mut buf, &opts).unwrap(),
///            &[0b1011_0010, b'h', b'i', 0b0001_0001, 50]);
/// ```
pub fn encode<'a>(buf: &'a mut [u8], opts: &[Opt]) -> Result<&'a [u8], OptEncodeError> {
  let opts = ascending(opts);
  let required = size_of(&opts)?;

  if required > buf.len() {
    return Err(OptEncodeError::TooSmall { needed: required - buf.len() });
  }

  let mut at = 0usize;
  let mut put = |bytes: &[u8]| {
    buf[at..at + bytes.len()].copy_from_slice(bytes);
    at += bytes.len();
  };

  let mut prev = 0u16;
  for opt in opts {
    let (del, del_bytes) = opt_len_or_delta((opt.number.0 - prev) as usize);
    let (len, len_bytes) = opt_len_or_delta(opt.value.0.len());

    put(&[del << 4 | len]);
    put(&del_bytes);
    put(&len_bytes);
    put(&opt.value.0);

    prev = opt.number.0;
  }

  Ok(&buf[..required])
}
