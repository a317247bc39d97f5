use core::fmt;
use core::str::Utf8Error;
use std::collections::HashMap;
use std::sync::Arc;

use crate::logging::Sink;
use crate::net::Addrd;
use crate::req::Req;
use crate::resp::builder::BuildError;
use crate::resp::Resp;

/// Middleware that logs every request and the outcome of handling it
pub mod middleware;

/// Serving a [`Router`] over a datagram socket
pub mod serve;

#[doc(inline)]
pub use middleware::Logging;
#[doc(inline)]
pub use serve::{Handled, ServeError, Server};

/// Errors encounterable while handling a request
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Error {
  /// The request's Uri-Path was not utf8
  PathDecode(Utf8Error),
  /// A response could not be built
  Build(BuildError),
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::PathDecode(e) => write!(f, "path is not utf8: {}", e),
      | Self::Build(e) => write!(f, "building response failed: {}", e),
    }
  }
}

impl std::error::Error for Error {}

impl From<BuildError> for Error {
  fn from(e: BuildError) -> Self {
    Self::Build(e)
  }
}

impl From<Utf8Error> for Error {
  fn from(e: Utf8Error) -> Self {
    Self::PathDecode(e)
  }
}

/// The result of [`Router::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
  /// A route matched the request and produced a response
  Matched(Addrd<Resp>),
  /// No route is registered for the request's path
  Unmatched,
  /// A route matched the request but handling it failed
  Error(Error),
}

/// Something that answers requests
///
/// Implemented for closures of the form `Fn(&Addrd<Req>) -> Result<Addrd<Resp>, Error>`.
pub trait Handler: Send + Sync {
  /// Answer a request
  fn handle(&self, req: &Addrd<Req>) -> Result<Addrd<Resp>, Error>;
}

impl<F> Handler for F where F: Fn(&Addrd<Req>) -> Result<Addrd<Resp>, Error> + Send + Sync
{
  fn handle(&self, req: &Addrd<Req>) -> Result<Addrd<Resp>, Error> {
    self(req)
  }
}

/// Something that wraps the handling of every request.
///
/// A middleware may act before invoking `next` and after it returns,
/// and is expected to call `next` unless it deliberately answers the request itself.
///
/// Implemented for closures of the form `Fn(&Addrd<Req>, &dyn Handler) -> Result<Addrd<Resp>, Error>`.
pub trait Middleware: Send + Sync {
  /// Handle a request, usually by passing it on to `next`
  fn call(&self, req: &Addrd<Req>, next: &dyn Handler) -> Result<Addrd<Resp>, Error>;
}

impl<F> Middleware for F
  where F: Fn(&Addrd<Req>, &dyn Handler) -> Result<Addrd<Resp>, Error> + Send + Sync
{
  fn call(&self, req: &Addrd<Req>, next: &dyn Handler) -> Result<Addrd<Resp>, Error> {
    self(req, next)
  }
}

/// A middleware bound to the rest of the chain it wraps
struct Chain {
  middleware: Arc<dyn Middleware>,
  next: Box<dyn Handler>,
}

impl Handler for Chain {
  fn handle(&self, req: &Addrd<Req>) -> Result<Addrd<Resp>, Error> {
    self.middleware.call(req, self.next.as_ref())
  }
}

/// Normalize a path so that it has a leading `/` and no empty segments
///
/// ```
/// use croak::server::normalize;
///
/// assert_eq!(normalize("Hello"), "/Hello");
/// assert_eq!(normalize("//subpath/Another/"), "/subpath/Another");
/// assert_eq!(normalize(""), "/");
/// ```
pub fn normalize(path: &str) -> String {
  let segs = path.split('/')
                 .filter(|seg| !seg.is_empty())
                 .collect::<Vec<_>>();
  format!("/{}", segs.join("/"))
}

/// Collects routes & middleware, then freezes them into a [`Router`]
pub struct RouterBuilder {
  sink: Arc<dyn Sink>,
  middleware: Vec<Arc<dyn Middleware>>,
  routes: HashMap<String, Box<dyn Handler>>,
}

impl fmt::Debug for RouterBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RouterBuilder")
     .field("middleware", &self.middleware.len())
     .field("routes", &self.routes.keys().collect::<Vec<_>>())
     .finish()
  }
}

impl RouterBuilder {
  /// Wrap every route in `middleware`.
  ///
  /// Middleware registered first is outermost; it sees the request first
  /// and the response last.
  pub fn use_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
    self.middleware.push(Arc::new(middleware));
    self
  }

  /// Answer requests for exactly `path` with `handler`.
  ///
  /// Registering a path that was already registered replaces
  /// the earlier handler.
  pub fn handle(mut self, path: impl AsRef<str>, handler: impl Handler + 'static) -> Self {
    let path = normalize(path.as_ref());

    if self.routes.contains_key(&path) {
      self.sink.log(log::Level::Warn,
                    &format!("route {} registered more than once, replacing earlier handler",
                             path));
    }

    self.routes.insert(path, Box::new(handler));
    self
  }

  /// Compose each route's middleware chain and freeze the route table
  pub fn build(self) -> Router {
    let middleware = self.middleware;

    let routes = self.routes
                     .into_iter()
                     .map(|(path, handler)| {
                       let chain = middleware.iter().rev().fold(handler, |next, mw| {
                                                           Box::new(Chain { middleware: mw.clone(),
                                                                            next })
                                                           as Box<dyn Handler>
                                                         });
                       (path, chain)
                     })
                     .collect();

    Router { routes }
  }
}

/// Maps request paths to handlers wrapped in middleware
///
/// The route table can't change once built, so a `Router`
/// can be shared between threads without locking.
pub struct Router {
  routes: HashMap<String, Box<dyn Handler>>,
}

impl fmt::Debug for Router {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Router").field("routes", &self.routes()).finish()
  }
}

impl Router {
  /// Start building a router. `sink` receives warnings about the routes being registered.
  pub fn builder(sink: Arc<dyn Sink>) -> RouterBuilder {
    RouterBuilder { sink,
                    middleware: Vec::new(),
                    routes: HashMap::new() }
  }

  /// The registered paths, sorted
  pub fn routes(&self) -> Vec<&str> {
    let mut paths = self.routes.keys().map(String::as_str).collect::<Vec<_>>();
    paths.sort_unstable();
    paths
  }

  /// Find the route for the request's path and invoke it
  pub fn dispatch(&self, req: &Addrd<Req>) -> Run {
    let path = match req.data().path() {
      | Ok(path) => normalize(&path),
      | Err(e) => return Run::Error(Error::PathDecode(e)),
    };

    match self.routes.get(&path) {
      | None => Run::Unmatched,
      | Some(handler) => match handler.handle(req) {
        | Ok(resp) => Run::Matched(resp),
        | Err(e) => Run::Error(e),
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;

  use croak_msg::{known, ContentFormat, Message, Opt};

  use super::*;
  use crate::resp::builder::Builder;
  use crate::resp::code;
  use crate::test;

  fn ok(req: &Addrd<Req>) -> Result<Addrd<Resp>, Error> {
    Builder::default().build(req, code::CONTENT, ContentFormat::Text, "ok")
                      .map_err(Error::from)
  }

  #[test]
  fn registered_paths_invoke_their_handler_once() {
    let calls = Arc::new([AtomicUsize::new(0), AtomicUsize::new(0)]);
    let paths = ["/a", "/b/c"];

    let router = paths.iter()
                      .enumerate()
                      .fold(Router::builder(test::sink()), |b, (ix, path)| {
                        let calls = calls.clone();
                        b.handle(*path, move |req: &Addrd<Req>| {
                           calls[ix].fetch_add(1, Ordering::Relaxed);
                           ok(req)
                         })
                      })
                      .build();

    assert!(matches!(router.dispatch(&test::req(Req::get("/b/c"))), Run::Matched(_)));
    assert_eq!(calls[0].load(Ordering::Relaxed), 0);
    assert_eq!(calls[1].load(Ordering::Relaxed), 1);

    assert!(matches!(router.dispatch(&test::req(Req::get("/a"))), Run::Matched(_)));
    assert_eq!(calls[0].load(Ordering::Relaxed), 1);
    assert_eq!(calls[1].load(Ordering::Relaxed), 1);
  }

  #[test]
  fn unregistered_path_is_unmatched() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_ = calls.clone();
    let router = Router::builder(test::sink()).handle("/Hello", move |req: &Addrd<Req>| {
                                                calls_.fetch_add(1, Ordering::Relaxed);
                                                ok(req)
                                              })
                                              .build();

    ["/unknown", "/Hello/extra", "/hello", "/"].into_iter()
                                              .for_each(|path| {
                                                assert_eq!(router.dispatch(&test::req(Req::get(path))),
                                                           Run::Unmatched)
                                              });
    assert_eq!(calls.load(Ordering::Relaxed), 0);
  }

  #[test]
  fn paths_are_normalized() {
    let router = Router::builder(test::sink()).handle("subpath/Another/", ok).build();

    assert_eq!(router.routes(), vec!["/subpath/Another"]);
    assert!(matches!(router.dispatch(&test::req(Req::get("/subpath/Another"))),
                     Run::Matched(_)));
  }

  #[test]
  fn last_registration_wins() {
    let sink = Arc::new(test::Capture::default());
    let builder = Builder::default();
    let router =
      Router::builder(sink.clone()).handle("/x", ok)
                                   .handle("/x", move |req: &Addrd<Req>| {
                                     builder.build(req, code::DELETED, ContentFormat::Text, "")
                                            .map_err(Error::from)
                                   })
                                   .build();

    match router.dispatch(&test::req(Req::get("/x"))) {
      | Run::Matched(resp) => assert_eq!(resp.data().code(), code::DELETED),
      | other => panic!("{:?}", other),
    }
    assert!(sink.contains(log::Level::Warn, "/x registered more than once"));
  }

  #[test]
  fn undecodable_path_is_error() {
    let router = Router::builder(test::sink()).handle("/x", ok).build();

    let mut msg: Message = Req::get("").into();
    msg.add(Opt::new(known::URI_PATH, vec![0xFFu8]));

    assert!(matches!(router.dispatch(&test::req(msg.into())),
                     Run::Error(Error::PathDecode(_))));
  }

  #[test]
  fn handler_errors_surface() {
    let router = Router::builder(test::sink()).handle("/x", |req: &Addrd<Req>| {
                                                let mut req = req.clone();
                                                req.data_mut().set_msg_type(croak_msg::Type::Ack);
                                                ok(&req)
                                              })
                                              .build();

    assert_eq!(router.dispatch(&test::req(Req::get("/x"))),
               Run::Error(Error::Build(BuildError::InvalidRequestType(croak_msg::Type::Ack))));
  }

  #[test]
  fn middleware_nests_in_registration_order() {
    let events = Arc::new(Mutex::new(Vec::<&'static str>::new()));

    let tracer = |before: &'static str, after: &'static str| {
      let events = events.clone();
      move |req: &Addrd<Req>, next: &dyn Handler| {
        events.lock().unwrap().push(before);
        let out = next.handle(req);
        events.lock().unwrap().push(after);
        out
      }
    };

    let handler_events = events.clone();
    let router = Router::builder(test::sink()).use_middleware(tracer("A before", "A after"))
                                              .use_middleware(tracer("B before", "B after"))
                                              .handle("/x", move |req: &Addrd<Req>| {
                                                handler_events.lock().unwrap().push("handler");
                                                ok(req)
                                              })
                                              .build();

    router.dispatch(&test::req(Req::get("/x")));

    assert_eq!(*events.lock().unwrap(),
               vec!["A before", "B before", "handler", "B after", "A after"]);
  }

  #[test]
  fn middleware_can_short_circuit() {
    let router = Router::builder(test::sink()).use_middleware(|req: &Addrd<Req>, _: &dyn Handler| {
                                                Builder::default().build(req,
                                                                         code::FORBIDDEN,
                                                                         ContentFormat::Text,
                                                                         "no")
                                                                  .map_err(Error::from)
                                              })
                                              .handle("/x", |_: &Addrd<Req>| -> Result<Addrd<Resp>, Error> {
                                                panic!("handler should not run")
                                              })
                                              .build();

    match router.dispatch(&test::req(Req::get("/x"))) {
      | Run::Matched(resp) => assert_eq!(resp.data().code(), code::FORBIDDEN),
      | other => panic!("{:?}", other),
    }
  }

  #[test]
  fn middleware_does_not_run_for_unmatched() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_ = calls.clone();
    let router = Router::builder(test::sink()).use_middleware(move |req: &Addrd<Req>,
                                                                    next: &dyn Handler| {
                                                calls_.fetch_add(1, Ordering::Relaxed);
                                                next.handle(req)
                                              })
                                              .handle("/x", ok)
                                              .build();

    assert_eq!(router.dispatch(&test::req(Req::get("/y"))), Run::Unmatched);
    assert_eq!(calls.load(Ordering::Relaxed), 0);
  }
}
