use std::error::Error;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use croak::config::{Config, Unmatched};
use croak::logging::{Log, Sink};
use croak::net::Socket;
use croak::resp::builder::Builder;
use croak::routes;
use croak::server::Server;
use log::{Level, LevelFilter};
use simple_logger::SimpleLogger;

/// A small CoAP server
#[derive(Debug, Parser)]
#[command(name = "croak", version, about)]
struct Args {
  /// Address to listen on
  #[arg(long, default_value = "0.0.0.0:5683")]
  addr: String,

  /// Number of threads handling requests
  #[arg(long, default_value_t = Config::default().workers)]
  workers: u8,

  /// Answer requests that match no route with 4.04 Not Found
  /// instead of ignoring them
  #[arg(long)]
  not_found: bool,

  /// Most verbose level to log at (`RUST_LOG` takes precedence)
  #[arg(long, default_value = "info")]
  log_level: LevelFilter,
}

fn main() -> Result<(), Box<dyn Error>> {
  let args = Args::parse();

  SimpleLogger::new().with_level(args.log_level)
                     .env()
                     .init()?;

  let config = Config { workers: args.workers,
                        unmatched: if args.not_found {
                          Unmatched::NotFound
                        } else {
                          Unmatched::Ignore
                        },
                        ..Config::default() };

  let sink: Arc<dyn Sink> = Arc::new(Log);
  let socket = <UdpSocket as Socket>::bind(args.addr.as_str())?;
  sink.log(Level::Info,
           &format!("start server on {}", Socket::local_addr(&socket)?));

  let router = routes::router(Builder::new(config.msg), sink.clone());
  let server = Server::new(socket, router, config, sink.clone());

  let shutdown = Arc::new(AtomicBool::new(false));
  let on_ctrlc = shutdown.clone();
  ctrlc::set_handler(move || on_ctrlc.store(true, Ordering::Relaxed))?;

  server.run(&shutdown)?;

  sink.log(Level::Info, "shut down");
  log::logger().flush();
  Ok(())
}
