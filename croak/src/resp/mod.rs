use std::string::FromUtf8Error;

use croak_msg::{Code, ContentFormat, Id, Message, Opt, Payload, Token, Type};

use crate::req::Req;

/// Response codes
pub mod code;

/// Building responses with options encoded into an on-demand buffer
pub mod builder;

/// A CoAP response
///
/// Responses hold on to their option region already encoded,
/// so that turning one into a datagram can't fail.
/// Options are set through [`builder::Builder`].
///
/// ```
/// use croak::req::Req;
/// use croak::resp::{code, Resp};
/// use croak_msg::{Token, Type};
///
/// let mut req = Req::get("hello");
/// req.set_msg_token(Token::try_from_slice(&[7]).unwrap());
///
/// let mut resp = Resp::for_request(&req).unwrap();
/// resp.set_code(code::CONTENT);
/// resp.set_payload("hi!");
///
/// assert_eq!(resp.msg_type(), Type::Ack);
/// assert_eq!(resp.token(), req.token());
/// assert_eq!(resp.payload_string().unwrap(), "hi!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resp {
  msg: Message,
  opts: Vec<u8>,
}

impl AsRef<Message> for Resp {
  fn as_ref(&self) -> &Message {
    &self.msg
  }
}

impl Resp {
  /// Create a new response for a given request.
  ///
  /// If the request is CONfirmable, this will return Some(ACK).
  ///
  /// If the request is NONconfirmable, this will return Some(NON).
  /// Its message id is left for whoever sends it to assign.
  ///
  /// If the request is an ACK or RESET, this will return None.
  pub fn for_request(req: &Req) -> Option<Self> {
    let (ty, id) = match req.msg_type() {
      | Type::Con => (Type::Ack, req.msg_id()),
      | Type::Non => (Type::Non, Id(0)),
      | Type::Ack | Type::Reset => return None,
    };

    Some(Self { msg: Message::new(ty, code::CONTENT, id, req.token()),
                opts: Vec::new() })
  }

  /// Get the response code
  pub fn code(&self) -> Code {
    self.msg.code
  }

  /// Change the response code
  pub fn set_code(&mut self, code: Code) {
    self.msg.code = code;
  }

  /// Get the token of the request this responds to
  pub fn token(&self) -> Token {
    self.msg.token
  }

  /// Get the payload's raw bytes
  pub fn payload(&self) -> &[u8] {
    &self.msg.payload.0
  }

  /// Get the payload and attempt to interpret it as an ASCII string
  pub fn payload_string(&self) -> Result<String, FromUtf8Error> {
    String::from_utf8(self.payload().to_vec())
  }

  /// Replace the payload
  pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) {
    self.msg.payload = Payload(payload.into());
  }

  /// Get the Content-Format of the payload, if one was set
  pub fn content_format(&self) -> Option<ContentFormat> {
    self.msg.content_format()
  }

  /// Get the message type
  pub fn msg_type(&self) -> Type {
    self.msg.ty
  }

  /// Get the message id
  pub fn msg_id(&self) -> Id {
    self.msg.id
  }

  /// Change the message id
  pub fn set_msg_id(&mut self, id: Id) {
    self.msg.id = id;
  }

  /// The datagram this response is sent as
  ///
  /// ```
  /// use croak::req::Req;
  /// use croak::resp::Resp;
  /// use croak_msg::{Message, TryFromBytes};
  ///
  /// let resp = Resp::for_request(&Req::get("hello")).unwrap();
  /// let msg = Message::try_from_bytes(resp.to_bytes()).unwrap();
  ///
  /// assert_eq!(&msg, resp.as_ref());
  /// ```
  pub fn to_bytes(&self) -> Vec<u8> {
    self.msg.to_bytes_with_opts(&self.opts)
  }

  /// Replace the options along with their encoded form
  pub(crate) fn set_opts(&mut self, opts: Vec<Opt>, encoded: Vec<u8>) {
    self.msg.opts = opts;
    self.opts = encoded;
  }

  /// An empty RESET answering `msg`, used to answer pings
  pub(crate) fn reset(msg: &Message) -> Self {
    Self { msg: Message::new(Type::Reset, Code::new(0, 0), msg.id, Token(Default::default())),
           opts: Vec::new() }
  }
}
