use std::sync::Arc;

use chrono::{Local, SecondsFormat};
use croak_msg::ContentFormat;
use log::Level;

use crate::logging::Sink;
use crate::net::Addrd;
use crate::req::{Method, Req};
use crate::resp::builder::Builder;
use crate::resp::{code, Resp};
use crate::server::{Error, Logging, Router};

/// Every route served by the `croak` binary, behind [`Logging`]
///
/// ```
/// use std::sync::Arc;
///
/// use croak::logging::Log;
/// use croak::resp::builder::Builder;
/// use croak::routes;
///
/// let router = routes::router(Builder::default(), Arc::new(Log));
///
/// assert_eq!(router.routes(),
///            vec!["/Hello", "/removeme!", "/subpath/Another", "/time", "/writeme!"]);
/// ```
pub fn router(builder: Builder, sink: Arc<dyn Sink>) -> Router {
  let time_sink = sink.clone();

  Router::builder(sink.clone()).use_middleware(Logging::new(sink))
                               .handle("/Hello", move |req: &Addrd<Req>| hello(&builder, req))
                               .handle("/subpath/Another", move |req: &Addrd<Req>| {
                                 hello(&builder, req)
                               })
                               .handle("/removeme!", move |req: &Addrd<Req>| {
                                 delete(&builder, req)
                               })
                               .handle("/writeme!", move |req: &Addrd<Req>| write(&builder, req))
                               .handle("/time", move |req: &Addrd<Req>| {
                                 time(&builder, time_sink.as_ref(), req)
                               })
                               .build()
}

/// 2.05 `hello world`
pub fn hello(builder: &Builder, req: &Addrd<Req>) -> Result<Addrd<Resp>, Error> {
  Ok(builder.build(req, code::CONTENT, ContentFormat::Text, "hello world")?)
}

/// 2.02 `deleted`, whatever the method
pub fn delete(builder: &Builder, req: &Addrd<Req>) -> Result<Addrd<Resp>, Error> {
  Ok(builder.build(req, code::DELETED, ContentFormat::Text, "deleted")?)
}

/// PUT yields 2.04 `changed`, anything else 2.05 `oldval`
pub fn write(builder: &Builder, req: &Addrd<Req>) -> Result<Addrd<Resp>, Error> {
  let (code, payload) = match req.data().method() {
    | Method::PUT => (code::CHANGED, "changed"),
    | _ => (code::CONTENT, "oldval"),
  };

  Ok(builder.build(req, code, ContentFormat::Text, payload)?)
}

/// 2.05 with the current local time (RFC3339)
pub fn time(builder: &Builder, sink: &dyn Sink, req: &Addrd<Req>) -> Result<Addrd<Resp>, Error> {
  sink.log(Level::Info,
           &format!("got message path={} from {}", req.data().path()?, req.addr()));

  let now = Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
  Ok(builder.build(req, code::CONTENT, ContentFormat::Text, now)?)
}
