use super::{Opt, OptNumber, OptParseError};
use crate::Cursor;

fn parse_opt_len_or_delta<A: AsRef<[u8]>>(head: u8,
                                          bytes: &mut Cursor<A>,
                                          reserved_err: OptParseError)
                                          -> Result<usize, OptParseError> {
  match head {
    | 13 => {
      let n = bytes.next().ok_or_else(OptParseError::eof)?;
      Ok((n as usize) + 13)
    },
    | 14 => match bytes.take_exact(2) {
      | Some(&[a, b]) => Ok(u16::from_be_bytes([a, b]) as usize + 269),
      | _ => Err(OptParseError::eof()),
    },
    | 15 => Err(reserved_err),
    | _ => Ok(head as usize),
  }
}

/// Parse options until the payload marker (`0xFF`) or the end of `bytes`,
/// consuming the payload marker.
///
/// Option numbers are reconstructed from the running sum of deltas.
///
/// ```
/// use croak_msg::opt::{self, known};
/// use croak_msg::{Cursor, Opt};
///
/// let mut bytes = Cursor::new([0b1011_0001, b'a', 0b0001_0000, 0xFF, b'!']);
/// let opts = opt::decode(&mut bytes).unwrap();
///
/// assert_eq!(opts,
///            vec![Opt::new(known::URI_PATH, "a"), Opt::uint(known::CONTENT_FORMAT, 0)]);
/// assert_eq!(bytes.take_until_end(), b"!");
/// ```
pub fn decode<A: AsRef<[u8]>>(bytes: &mut Cursor<A>) -> Result<Vec<Opt>, OptParseError> {
  let mut opts = Vec::new();
  let mut number = 0usize;

  loop {
    let byte1 = match bytes.next() {
      | None | Some(0b11111111) => break Ok(opts),
      | Some(b) => b,
    };

    // delta **must** be consumed before length, the extended delta bytes come first
    let delta = parse_opt_len_or_delta(byte1 >> 4,
                                       bytes,
                                       OptParseError::OptionDeltaReservedValue(15))?;
    let len = parse_opt_len_or_delta(byte1 & 0b00001111,
                                     bytes,
                                     OptParseError::ValueLengthReservedValue(15))?;

    number += delta;
    let number = u16::try_from(number).map_err(|_| OptParseError::NumberOverflow)?;

    let value = bytes.take_exact(len).ok_or_else(OptParseError::eof)?;
    opts.push(Opt::new(OptNumber(number), value));
  }
}
