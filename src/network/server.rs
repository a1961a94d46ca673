//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.
//!
//! One acceptor thread polls a non-blocking listener; accepted streams go
//! through a bounded crossbeam channel to a fixed pool of workers, each of
//! which drives one [`Connection`] at a time. Backpressure is the channel:
//! when every worker is busy and the queue is full, new connections are
//! dropped with a warning instead of piling up.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};
use tracing::{debug, info, warn};

use super::Connection;
use crate::config::Config;
use crate::error::Result;
use crate::service::ReversalService;

/// How long the acceptor sleeps when there is nothing to accept
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for hashdex
pub struct Server {
    /// Server configuration (listen address, pool sizing, timeouts)
    config: Config,

    /// Shared reversal service
    service: Arc<ReversalService>,

    /// Bound listener; bound in `new` so callers can bind port 0 and ask
    /// for the real address before running
    listener: TcpListener,

    /// Set to stop the accept loop
    shutdown: Arc<AtomicBool>,
}

/// Cloneable handle that can stop a running server from another thread
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting and drain its workers
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

impl Server {
    /// Create a new server with the given config and service
    ///
    /// Binds the listener immediately; `run` only starts accepting.
    pub fn new(config: Config, service: Arc<ReversalService>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        Ok(Self {
            config,
            service,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The address the listener is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// A handle that stops this server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Start the server (blocking)
    ///
    /// Returns once a shutdown is signalled and every worker has finished
    /// its in-flight connection.
    pub fn run(&mut self) -> Result<()> {
        let addr = self.local_addr()?;
        info!(
            %addr,
            workers = self.config.worker_threads,
            "server listening"
        );

        // Poll the listener so the accept loop can observe the shutdown flag
        self.listener.set_nonblocking(true)?;

        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_connections);

        let mut workers = Vec::with_capacity(self.config.worker_threads);
        for id in 0..self.config.worker_threads {
            let rx = rx.clone();
            let service = Arc::clone(&self.service);
            let read_ms = self.config.read_timeout_ms;
            let write_ms = self.config.write_timeout_ms;
            let handle = thread::Builder::new()
                .name(format!("hashdex-worker-{}", id))
                .spawn(move || worker_loop(rx, service, read_ms, write_ms))?;
            workers.push(handle);
        }
        drop(rx);

        while !self.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    debug!("Accepted connection from {}", peer);
                    match tx.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(stream)) => {
                            warn!(
                                "Connection queue full, dropping connection from {}",
                                peer
                            );
                            drop(stream);
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            // All workers died; nothing left to serve with
                            warn!("All workers exited, stopping accept loop");
                            break;
                        }
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        // Closing the channel lets workers drain queued streams and exit
        drop(tx);
        for handle in workers {
            if handle.join().is_err() {
                warn!("Worker thread panicked");
            }
        }

        info!("server stopped");
        Ok(())
    }
}

/// Worker body: serve one connection at a time until the channel closes
fn worker_loop(
    rx: Receiver<TcpStream>,
    service: Arc<ReversalService>,
    read_ms: u64,
    write_ms: u64,
) {
    while let Ok(stream) = rx.recv() {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let result = Connection::new(stream, Arc::clone(&service)).and_then(|mut conn| {
            conn.set_timeouts(read_ms, write_ms)?;
            conn.handle()
        });

        if let Err(e) = result {
            warn!("Connection from {} ended with error: {}", peer, e);
        }
    }
}
