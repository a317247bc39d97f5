use core::fmt;

use croak_msg::opt::{self, OptEncodeError};
use croak_msg::{Code, ContentFormat, Opt, Type};

use super::Resp;
use crate::config::{self, Attempts};
use crate::net::Addrd;
use crate::req::Req;

/// Writes a collection of options into a buffer
///
/// [`Builder`] is generic over this so the way it reacts to encoding
/// failures can be observed without producing enormous options.
pub trait Encoder: fmt::Debug + Send + Sync {
  /// Encode `opts` into `buf`, yielding the slice of `buf` that was written.
  ///
  /// If `buf` is too small, this must yield [`OptEncodeError::TooSmall`]
  /// carrying the number of additional bytes needed.
  fn encode<'a>(&self, buf: &'a mut [u8], opts: &[Opt]) -> Result<&'a [u8], OptEncodeError>;
}

/// The option encoder used on the wire ([`croak_msg::opt::encode`])
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wire;

impl Encoder for Wire {
  fn encode<'a>(&self, buf: &'a mut [u8], opts: &[Opt]) -> Result<&'a [u8], OptEncodeError> {
    opt::encode(buf, opts)
  }
}

/// Errors encounterable while building a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
  /// The encoder kept reporting that the buffer was too small
  /// after it had been grown by the amount it asked for.
  RetriesExhausted {
    /// Number of times encoding was attempted
    attempts: Attempts,
    /// Size the buffer had grown to
    size: usize,
  },
  /// The options could not be encoded no matter the buffer size
  Malformed(OptEncodeError),
  /// Requests of this type (ACK, RESET) can't be responded to
  InvalidRequestType(Type),
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::RetriesExhausted { attempts, size } => {
        write!(f,
               "options still did not fit after {} attempts (buffer grew to {} bytes)",
               attempts.0, size)
      },
      | Self::Malformed(e) => write!(f, "options could not be encoded: {}", e),
      | Self::InvalidRequestType(ty) => write!(f, "cannot respond to a {:?} message", ty),
    }
  }
}

impl std::error::Error for BuildError {}

/// An option region that was successfully encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
  /// The encoded options
  pub bytes: Vec<u8>,
  /// The size the scratch buffer had when encoding succeeded
  pub buffer_size: usize,
  /// The number of encode attempts it took
  pub attempts: Attempts,
}

/// Builds responses to requests.
///
/// Options are encoded into a scratch buffer of [`config::Msg::opt_buffer_size`] bytes.
/// When the encoder reports the buffer is too small, the buffer is grown by exactly
/// the reported deficit and encoding is attempted again, at most
/// [`config::Msg::max_encode_attempts`] times in total.
///
/// ```
/// use std::net::SocketAddr;
///
/// use croak::net::Addrd;
/// use croak::req::Req;
/// use croak::resp::builder::Builder;
/// use croak::resp::code;
/// use croak_msg::ContentFormat;
///
/// let addr: SocketAddr = "127.0.0.1:5683".parse().unwrap();
/// let req = Addrd(Req::put("writeme!"), addr);
///
/// let resp = Builder::default().build(&req, code::CHANGED, ContentFormat::Text, "changed")
///                              .unwrap();
///
/// assert_eq!(resp.addr(), addr);
/// assert_eq!(resp.data().code(), code::CHANGED);
/// assert_eq!(resp.data().content_format(), Some(ContentFormat::Text));
/// assert_eq!(resp.data().payload(), b"changed");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builder<E = Wire> {
  encoder: E,
  opt_buffer_size: usize,
  max_encode_attempts: Attempts,
}

impl Default for Builder<Wire> {
  fn default() -> Self {
    Self::new(config::Msg::default())
  }
}

impl Builder<Wire> {
  /// Create a builder using the wire option encoder
  pub fn new(cfg: config::Msg) -> Self {
    Self::with_encoder(cfg, Wire)
  }
}

impl<E: Encoder> Builder<E> {
  /// Create a builder that encodes options with `encoder`
  pub fn with_encoder(cfg: config::Msg, encoder: E) -> Self {
    Self { encoder,
           opt_buffer_size: cfg.opt_buffer_size,
           max_encode_attempts: cfg.max_encode_attempts.max(Attempts(1)) }
  }

  /// Build a response to `req` with a code, a Content-Format and a payload.
  ///
  /// The response echoes the request's token and is addressed
  /// to the client that sent the request.
  pub fn build(&self,
               req: &Addrd<Req>,
               code: Code,
               format: ContentFormat,
               payload: impl Into<Vec<u8>>)
               -> Result<Addrd<Resp>, BuildError> {
    self.build_with_opts(req, code, vec![format.into()], payload)
  }

  /// Build a response to `req` with any number of options
  pub fn build_with_opts(&self,
                         req: &Addrd<Req>,
                         code: Code,
                         opts: Vec<Opt>,
                         payload: impl Into<Vec<u8>>)
                         -> Result<Addrd<Resp>, BuildError> {
    let ty = req.data().msg_type();
    let mut resp = Resp::for_request(req.data()).ok_or(BuildError::InvalidRequestType(ty))?;

    let Encoded { bytes, .. } = self.encode_opts(&opts)?;

    resp.set_code(code);
    resp.set_opts(opts, bytes);
    resp.set_payload(payload);

    Ok(Addrd(resp, req.addr()))
  }

  /// Encode `opts`, growing the scratch buffer as the encoder asks
  ///
  /// ```
  /// use croak::config::{Attempts, Msg};
  /// use croak::resp::builder::Builder;
  /// use croak_msg::ContentFormat;
  ///
  /// let builder = Builder::new(Msg { opt_buffer_size: 0,
  ///                                  ..Msg::default() });
  ///
  /// let encoded = builder.encode_opts(&[ContentFormat::Text.into()]).unwrap();
  ///
  /// assert_eq!(encoded.bytes, vec![0b1100_0000]);
  /// assert_eq!(encoded.buffer_size, 1);
  /// assert_eq!(encoded.attempts, Attempts(2));
  /// ```
  pub fn encode_opts(&self, opts: &[Opt]) -> Result<Encoded, BuildError> {
    let mut buf = vec![0u8; self.opt_buffer_size];
    let mut attempts = Attempts(0);

    loop {
      if attempts >= self.max_encode_attempts {
        return Err(BuildError::RetriesExhausted { attempts,
                                                  size: buf.len() });
      }

      attempts = attempts + Attempts(1);

      match self.encoder.encode(&mut buf, opts) {
        | Ok(region) => {
          let bytes = region.to_vec();
          return Ok(Encoded { bytes,
                              buffer_size: buf.len(),
                              attempts });
        },
        | Err(e @ OptEncodeError::TooSmall { needed }) => {
          let size = buf.len().checked_add(needed).ok_or(BuildError::Malformed(e))?;
          buf.resize(size, 0);
        },
        | Err(e) => return Err(BuildError::Malformed(e)),
      }
    }
  }
}
