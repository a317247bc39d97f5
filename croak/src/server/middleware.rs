use std::sync::Arc;

use log::Level;

use super::{Error, Handler, Middleware};
use crate::logging::{msg_summary, Sink};
use crate::net::Addrd;
use crate::req::Req;
use crate::resp::Resp;

/// Logs who sent each request and what it was before passing it on,
/// then logs what came back.
///
/// The request, response and error pass through untouched.
#[derive(Debug, Clone)]
pub struct Logging {
  sink: Arc<dyn Sink>,
}

impl Logging {
  /// Create the middleware, logging to `sink`
  pub fn new(sink: Arc<dyn Sink>) -> Self {
    Self { sink }
  }
}

impl Middleware for Logging {
  fn call(&self, req: &Addrd<Req>, next: &dyn Handler) -> Result<Addrd<Resp>, Error> {
    self.sink.log(Level::Info,
                  &format!("client {}, {}", req.addr(), msg_summary(req.data().msg())));

    let out = next.handle(req);

    match &out {
      | Ok(resp) => self.sink.log(Level::Debug,
                                  &format!("client {}, responding {}",
                                           resp.addr(),
                                           msg_summary(resp.data().as_ref()))),
      | Err(e) => self.sink.log(Level::Debug, &format!("client {}, {}", req.addr(), e)),
    }

    out
  }
}
