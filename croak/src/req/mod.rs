use core::str::Utf8Error;

use croak_msg::{known, Id, Message, Opt, OptNumber, OptValue, Payload, Token, Type};

/// Request methods
pub mod method;

#[doc(inline)]
pub use method::Method;

/// A CoAP request
///
/// ```
/// use croak::req::{Method, Req};
///
/// let mut req = Req::new(Method::PUT, "/writeme!");
/// req.set_payload("new value");
///
/// assert_eq!(req.method(), Method::PUT);
/// assert_eq!(req.path().unwrap(), "/writeme!");
/// assert_eq!(req.payload(), b"new value");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Req(Message);

impl Req {
  /// Create a confirmable request for `path`
  ///
  /// Each non-empty `/`-separated segment of `path` becomes a Uri-Path option.
  pub fn new(method: Method, path: impl AsRef<str>) -> Self {
    let mut msg = Message::new(Type::Con, method.0, Id(0), Token(Default::default()));

    path.as_ref()
        .split('/')
        .filter(|seg| !seg.is_empty())
        .for_each(|seg| msg.add(Opt::new(known::URI_PATH, seg)));

    Self(msg)
  }

  /// Create a new GET request
  pub fn get(path: impl AsRef<str>) -> Self {
    Self::new(Method::GET, path)
  }

  /// Create a new POST request
  pub fn post(path: impl AsRef<str>) -> Self {
    Self::new(Method::POST, path)
  }

  /// Create a new PUT request
  pub fn put(path: impl AsRef<str>) -> Self {
    Self::new(Method::PUT, path)
  }

  /// Create a new DELETE request
  pub fn delete(path: impl AsRef<str>) -> Self {
    Self::new(Method::DELETE, path)
  }

  /// Get the request method
  pub fn method(&self) -> Method {
    Method(self.0.code)
  }

  /// Get the request path, with a leading `/`
  ///
  /// ```
  /// use croak::req::Req;
  ///
  /// assert_eq!(Req::get("subpath/Another").path().unwrap(), "/subpath/Another");
  /// assert_eq!(Req::get("").path().unwrap(), "/");
  /// ```
  pub fn path(&self) -> Result<String, Utf8Error> {
    self.0
        .path_segments()
        .map(|segs| format!("/{}", segs.join("/")))
  }

  /// Get the request token
  pub fn token(&self) -> Token {
    self.0.token
  }

  /// Get the request type (confirmable, non-confirmable)
  pub fn msg_type(&self) -> Type {
    self.0.ty
  }

  /// Get the request message id
  pub fn msg_id(&self) -> Id {
    self.0.id
  }

  /// Get the request payload
  pub fn payload(&self) -> &[u8] {
    &self.0.payload.0
  }

  /// Get the request payload as a utf8 string
  pub fn payload_str(&self) -> Result<&str, Utf8Error> {
    self.0.payload_str()
  }

  /// Get the value of an option
  pub fn get_option(&self, n: OptNumber) -> Option<&OptValue> {
    self.0.get(n)
  }

  /// Borrow the message this request was parsed from
  pub fn msg(&self) -> &Message {
    &self.0
  }

  /// Updates the Message ID for this request
  pub fn set_msg_id(&mut self, id: Id) {
    self.0.id = id;
  }

  /// Updates the Message Token for this request
  pub fn set_msg_token(&mut self, token: Token) {
    self.0.token = token;
  }

  /// Change the type of this request
  pub fn set_msg_type(&mut self, ty: Type) {
    self.0.ty = ty;
  }

  /// Replace the payload of this request
  pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) {
    self.0.payload = Payload(payload.into());
  }
}

impl From<Message> for Req {
  fn from(msg: Message) -> Self {
    Self(msg)
  }
}

impl From<Req> for Message {
  fn from(req: Req) -> Self {
    req.0
  }
}
