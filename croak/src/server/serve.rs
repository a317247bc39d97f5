use core::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use std::thread;

use croak_msg::{CodeKind, ContentFormat, Id, Message, TryFromBytes, Type};
use log::Level;

use super::{Error, Router, Run};
use crate::config::{Config, Unmatched};
use crate::logging::{msg_summary, Sink};
use crate::net::{Addrd, Socket};
use crate::req::Req;
use crate::resp::builder::Builder;
use crate::resp::{code, Resp};

/// Errors encounterable while serving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeError<E> {
  /// Receiving a datagram failed
  Recv(E),
  /// Sending a response failed. The response is dropped.
  Send(E),
}

impl<E: fmt::Debug> fmt::Display for ServeError<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::Recv(e) => write!(f, "receiving datagram failed: {:?}", e),
      | Self::Send(e) => write!(f, "sending response failed: {:?}", e),
    }
  }
}

/// What [`Server::poll`] did with a datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
  /// A response was sent
  Responded(Addrd<Resp>),
  /// No route matched a request and nothing was sent back
  Unmatched(SocketAddr),
  /// A route matched a request but no response could be produced
  Failed(Error),
  /// The datagram was not a request (or not CoAP at all) and was dropped
  Ignored(SocketAddr),
}

/// Receives requests from a [`Socket`], dispatches them through a
/// [`Router`] and sends back the responses.
///
/// ```no_run
/// use std::net::UdpSocket;
/// use std::sync::atomic::AtomicBool;
/// use std::sync::Arc;
///
/// use croak::config::Config;
/// use croak::logging::Log;
/// use croak::net::Socket;
/// use croak::resp::builder::Builder;
/// use croak::routes;
/// use croak::server::Server;
///
/// let sock = <UdpSocket as Socket>::bind("0.0.0.0:5683").unwrap();
/// let router = routes::router(Builder::default(), Arc::new(Log));
/// let server = Server::new(sock, router, Config::default(), Arc::new(Log));
///
/// server.run(&AtomicBool::new(false)).unwrap();
/// ```
#[derive(Debug)]
pub struct Server<S> {
  socket: S,
  router: Router,
  config: Config,
  sink: Arc<dyn Sink>,
  builder: Builder,
  next_id: AtomicU16,
}

impl<S: Socket> Server<S> {
  /// Create a server
  pub fn new(socket: S, router: Router, config: Config, sink: Arc<dyn Sink>) -> Self {
    Self { socket,
           router,
           config,
           sink,
           builder: Builder::new(config.msg),
           next_id: AtomicU16::new(rand::random()) }
  }

  /// The socket being served on
  pub fn socket(&self) -> &S {
    &self.socket
  }

  /// Handle at most one datagram, using `buf` to receive it.
  ///
  /// Yields `Ok(None)` when no datagram was waiting.
  pub fn poll(&self, buf: &mut [u8]) -> Result<Option<Handled>, ServeError<S::Error>> {
    let Addrd(n, addr) = match self.socket.recv(buf) {
      | Ok(got) => got,
      | Err(nb::Error::WouldBlock) => return Ok(None),
      | Err(nb::Error::Other(e)) => return Err(ServeError::Recv(e)),
    };

    if n == buf.len() {
      self.sink.log(Level::Warn,
                    &format!("client {}, {} byte datagram filled the receive buffer \
                              and may have been truncated",
                             addr, n));
    }

    let msg = match Message::try_from_bytes(&buf[..n]) {
      | Ok(msg) => msg,
      | Err(e) => {
        self.sink.log(Level::Warn,
                      &format!("client {}, dropping {} byte datagram: {}", addr, n, e));
        return Ok(Some(Handled::Ignored(addr)));
      },
    };

    match (msg.ty, msg.code.kind()) {
      | (Type::Con, CodeKind::Empty) if is_empty(&msg) => {
        self.sink.log(Level::Debug, &format!("client {}, ping", addr));
        self.send(Addrd(Resp::reset(&msg), addr))
            .map(|resp| Some(Handled::Responded(resp)))
      },
      | (Type::Con | Type::Non, CodeKind::Request) => {
        self.handle(Addrd(Req::from(msg), addr)).map(Some)
      },
      | (_, CodeKind::Empty) if !is_empty(&msg) => {
        self.sink.log(Level::Warn,
                      &format!("client {}, dropping empty message with token, options or payload",
                               addr));
        Ok(Some(Handled::Ignored(addr)))
      },
      | _ => {
        self.sink.log(Level::Debug,
                      &format!("client {}, ignoring {}", addr, msg_summary(&msg)));
        Ok(Some(Handled::Ignored(addr)))
      },
    }
  }

  fn handle(&self, req: Addrd<Req>) -> Result<Handled, ServeError<S::Error>> {
    let describe = || {
      format!("client {}, {} {}",
              req.addr(),
              req.data().method(),
              req.data()
                 .path()
                 .unwrap_or_else(|_| String::from("<invalid path>")))
    };

    match self.router.dispatch(&req) {
      | Run::Matched(resp) => self.send(resp).map(Handled::Responded),
      | Run::Error(e) => {
        self.sink.log(Level::Error, &format!("{}: {}", describe(), e));
        Ok(Handled::Failed(e))
      },
      | Run::Unmatched => match self.config.unmatched {
        | Unmatched::Ignore => {
          self.sink.log(Level::Info, &format!("{}: no route", describe()));
          Ok(Handled::Unmatched(req.addr()))
        },
        | Unmatched::NotFound => {
          match self.builder
                    .build(&req, code::NOT_FOUND, ContentFormat::Text, "not found")
          {
            | Ok(resp) => self.send(resp).map(Handled::Responded),
            | Err(e) => {
              let e = Error::from(e);
              self.sink.log(Level::Error, &format!("{}: {}", describe(), e));
              Ok(Handled::Failed(e))
            },
          }
        },
      },
    }
  }

  fn send(&self, mut resp: Addrd<Resp>) -> Result<Addrd<Resp>, ServeError<S::Error>> {
    if resp.data().msg_type() == Type::Non {
      let id = self.next_id.fetch_add(1, Ordering::Relaxed);
      resp.data_mut().set_msg_id(Id(id));
    }

    let bytes = resp.data().to_bytes();
    nb::block!(self.socket.send(Addrd(&bytes[..], resp.addr()))).map_err(ServeError::Send)?;

    Ok(resp)
  }

  /// Poll for requests on [`Config::workers`] threads until `shutdown` is set.
  ///
  /// Errors from individual datagrams are logged and do not stop the server.
  pub fn run(&self, shutdown: &AtomicBool) -> Result<(), S::Error> {
    self.socket.set_recv_timeout(self.config.poll_interval())?;

    let workers = self.config.workers.max(1);
    self.sink.log(Level::Info, &format!("serving on {} worker threads", workers));

    thread::scope(|s| {
      (0..workers).for_each(|worker| {
                    s.spawn(move || self.work(worker, shutdown));
                  })
    });

    self.sink.log(Level::Info, "stopped");
    Ok(())
  }

  fn work(&self, worker: u8, shutdown: &AtomicBool) {
    let mut buf = vec![0u8; self.config.msg.recv_buffer_size];

    while !shutdown.load(Ordering::Relaxed) {
      match self.poll(&mut buf) {
        | Ok(Some(_)) => (),
        | Ok(None) => thread::yield_now(),
        | Err(e) => self.sink.log(Level::Error, &format!("worker {}: {}", worker, e)),
      }
    }
  }
}

/// Empty messages (code 0.00) carry nothing but a header
fn is_empty(msg: &Message) -> bool {
  msg.token.as_bytes().is_empty() && msg.opts.is_empty() && msg.payload.0.is_empty()
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use croak_msg::{Code, Token};

  use super::*;
  use crate::resp::builder::BuildError;
  use crate::routes;
  use crate::test::{self, SockMock};

  fn server(cfg: Config) -> (Server<SockMock>, Arc<test::Capture>) {
    let sink = Arc::new(test::Capture::default());
    let router = routes::router(Builder::default(), sink.clone());
    (Server::new(SockMock::new(), router, cfg, sink.clone()), sink)
  }

  fn request(req: Req) -> Addrd<Message> {
    test::with_token(test::req(req), &[0xAB, 0xCD]).map(Message::from)
  }

  #[test]
  fn nothing_waiting() {
    let (server, _) = server(Config::default());
    let mut buf = [0u8; 64];
    assert_eq!(server.poll(&mut buf), Ok(None));
  }

  #[test]
  fn con_request_answered_with_ack() {
    let (server, _) = server(Config::default());
    let mut req = Req::get("/Hello");
    req.set_msg_id(Id(321));
    server.socket().send_msg(request(req));

    let mut buf = [0u8; 1152];
    assert!(matches!(server.poll(&mut buf), Ok(Some(Handled::Responded(_)))));

    let sent = server.socket().sent();
    assert_eq!(sent.len(), 1);

    let Addrd(resp, addr) = &sent[0];
    assert_eq!(*addr, test::addr());
    assert_eq!(resp.ty, Type::Ack);
    assert_eq!(resp.id, Id(321));
    assert_eq!(resp.code, code::CONTENT);
    assert_eq!(resp.token.as_bytes(), &[0xAB, 0xCD]);
    assert_eq!(resp.payload_str(), Ok("hello world"));
  }

  #[test]
  fn non_requests_get_fresh_ids() {
    let (server, _) = server(Config::default());

    (0..2).for_each(|_| {
            let mut req = Req::get("/Hello");
            req.set_msg_type(Type::Non);
            req.set_msg_id(Id(5));
            server.socket().send_msg(request(req));
          });

    let mut buf = [0u8; 1152];
    server.poll(&mut buf).unwrap();
    server.poll(&mut buf).unwrap();

    let sent = server.socket().sent();
    assert!(sent.iter().all(|m| m.data().ty == Type::Non));
    assert_eq!(sent[1].data().id.0, sent[0].data().id.0.wrapping_add(1));
  }

  #[test]
  fn unmatched_is_ignored_by_default() {
    let (server, sink) = server(Config::default());
    server.socket().send_msg(request(Req::get("/unknown")));

    let mut buf = [0u8; 1152];
    assert_eq!(server.poll(&mut buf), Ok(Some(Handled::Unmatched(test::addr()))));
    assert!(server.socket().sent().is_empty());
    assert!(sink.contains(Level::Info, "GET /unknown: no route"));
  }

  #[test]
  fn unmatched_can_be_not_found() {
    let (server, _) = server(Config { unmatched: Unmatched::NotFound,
                                      ..Config::default() });
    server.socket().send_msg(request(Req::get("/unknown")));

    let mut buf = [0u8; 1152];
    server.poll(&mut buf).unwrap();

    let sent = server.socket().sent();
    assert_eq!(sent[0].data().code, code::NOT_FOUND);
    assert_eq!(sent[0].data().payload_str(), Ok("not found"));
    assert_eq!(sent[0].data().token.as_bytes(), &[0xAB, 0xCD]);
  }

  #[test]
  fn ping_answered_with_reset() {
    let (server, _) = server(Config::default());
    let ping = Message::new(Type::Con, Code::new(0, 0), Id(77), Token(Default::default()));
    server.socket().send_msg(Addrd(ping, test::addr()));

    let mut buf = [0u8; 64];
    server.poll(&mut buf).unwrap();

    let sent = server.socket().sent();
    assert_eq!(sent[0].data().ty, Type::Reset);
    assert_eq!(sent[0].data().id, Id(77));
    assert!(sent[0].data().token.as_bytes().is_empty());
  }

  #[test]
  fn garbage_is_logged_and_dropped() {
    let (server, sink) = server(Config::default());
    server.socket().send_bytes(Addrd(vec![0b_01_00_1111, 1], test::addr()));

    let mut buf = [0u8; 64];
    assert_eq!(server.poll(&mut buf), Ok(Some(Handled::Ignored(test::addr()))));
    assert!(server.socket().sent().is_empty());
    assert!(sink.contains(Level::Warn, "dropping 2 byte datagram"));
  }

  #[test]
  fn responses_are_not_answered() {
    let (server, _) = server(Config::default());
    let ack = Message::new(Type::Ack, code::CONTENT, Id(1), Token(Default::default()));
    server.socket().send_msg(Addrd(ack, test::addr()));

    let mut buf = [0u8; 64];
    assert_eq!(server.poll(&mut buf), Ok(Some(Handled::Ignored(test::addr()))));
    assert!(server.socket().sent().is_empty());
  }

  #[test]
  fn build_failure_sends_nothing() {
    let sink = Arc::new(test::Capture::default());
    let builder = Builder::with_encoder(crate::config::Msg::default(), test::Liar::default());
    let router = Router::builder(sink.clone()).handle("/writeme!", move |req: &Addrd<Req>| {
                                                builder.build(req,
                                                              code::CHANGED,
                                                              ContentFormat::Text,
                                                              "changed")
                                                       .map_err(Error::from)
                                              })
                                              .build();
    let server = Server::new(SockMock::new(), router, Config::default(), sink.clone());
    server.socket().send_msg(request(Req::put("/writeme!")));

    let mut buf = [0u8; 1152];
    assert!(matches!(server.poll(&mut buf),
                     Ok(Some(Handled::Failed(Error::Build(BuildError::RetriesExhausted { .. }))))));
    assert!(server.socket().sent().is_empty());
    assert!(sink.contains(Level::Error, "PUT /writeme!"));
  }

  #[test]
  fn send_failure_surfaces() {
    let sink = Arc::new(test::Capture::default());
    let router = routes::router(Builder::default(), sink.clone());
    let sock = SockMock::new();
    sock.fail_sends(1);
    let server = Server::new(sock, router, Config::default(), sink);
    server.socket().send_msg(request(Req::get("/Hello")));

    let mut buf = [0u8; 1152];
    assert_eq!(server.poll(&mut buf), Err(ServeError::Send(None)));
  }

  #[test]
  fn send_failure_is_logged_and_serving_continues() {
    let (server, sink) = server(Config { workers: 1,
                                         ..Config::default() });
    server.socket().fail_sends(1);

    server.socket().send_msg(request(Req::get("/Hello")));
    server.socket().send_msg(request(Req::delete("/removeme!")));

    let shutdown = AtomicBool::new(false);
    thread::scope(|s| {
      s.spawn(|| server.run(&shutdown).unwrap());

      let deadline = std::time::Instant::now() + Duration::from_secs(5);
      while server.socket().tx.lock().unwrap().is_empty() && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
      }

      shutdown.store(true, Ordering::Relaxed);
    });

    assert!(sink.contains(Level::Error, "sending response failed"));

    let sent = server.socket().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].data().code, code::DELETED);
  }

  #[test]
  fn ping_with_token_is_not_a_ping() {
    let (server, sink) = server(Config::default());
    let ping = Message::new(Type::Con,
                            Code::new(0, 0),
                            Id(77),
                            Token::try_from_slice(&[1, 2]).unwrap());
    server.socket().send_msg(Addrd(ping, test::addr()));

    let mut buf = [0u8; 64];
    assert_eq!(server.poll(&mut buf), Ok(Some(Handled::Ignored(test::addr()))));
    assert!(server.socket().sent().is_empty());
    assert!(sink.contains(Level::Warn, "dropping empty message"));
  }

  #[test]
  fn full_receive_buffer_warns() {
    let (server, sink) = server(Config::default());
    let mut req = Req::post("/Hello");
    req.set_payload(vec![b'x'; 64]);
    server.socket().send_msg(request(req));

    let mut buf = [0u8; 32];
    server.poll(&mut buf).unwrap();

    assert!(sink.contains(Level::Warn, "32 byte datagram filled the receive buffer"));
  }

  #[test]
  fn datagram_smaller_than_buffer_does_not_warn() {
    let (server, sink) = server(Config::default());
    server.socket().send_msg(request(Req::get("/Hello")));

    let mut buf = [0u8; 1152];
    server.poll(&mut buf).unwrap();

    assert!(!sink.lines().iter().any(|(_, line)| line.contains("filled the receive buffer")));
  }

  #[test]
  fn run_serves_until_shutdown() {
    let (server, _) = server(Config { workers: 3,
                                      ..Config::default() });
    let shutdown = AtomicBool::new(false);

    (0..10).for_each(|_| server.socket().send_msg(request(Req::delete("/removeme!"))));

    thread::scope(|s| {
      s.spawn(|| server.run(&shutdown).unwrap());

      let deadline = std::time::Instant::now() + Duration::from_secs(5);
      while server.socket().tx.lock().unwrap().len() < 10 && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
      }

      shutdown.store(true, Ordering::Relaxed);
    });

    let sent = server.socket().sent();
    assert_eq!(sent.len(), 10);
    assert!(sent.iter()
                .all(|m| m.data().code == code::DELETED && m.data().payload_str() == Ok("deleted")));
  }
}
