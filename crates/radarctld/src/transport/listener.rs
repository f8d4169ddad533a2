//! Listener implementation for control sockets.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use radarctl_config::SocketEndpoint;

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

/// Pause between polls when no connection is pending.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
/// Pause after a failed accept.
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Listener bound to a control endpoint but not yet accepting.
#[derive(Debug)]
pub struct SocketListener {
    endpoint: SocketEndpoint,
    socket: TcpListener,
}

impl SocketListener {
    /// Binds `endpoint`.
    ///
    /// The host is resolved and each address is tried in order until one
    /// binds.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when resolution fails or no address binds.
    pub fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let socket = bind_tcp(endpoint)?;
        Ok(Self {
            endpoint: endpoint.clone(),
            socket,
        })
    }

    /// The endpoint this listener was bound to.
    #[must_use]
    pub fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }

    /// The bound address, which differs from the endpoint when binding
    /// port 0.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    /// Polls for one pending connection. Accepted streams are switched back
    /// to blocking mode for the session.
    fn poll(&self) -> io::Result<Option<ConnectionStream>> {
        match self.socket.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(false)?;
                debug!(target: LISTENER_TARGET, %peer, "accepted connection");
                Ok(Some(ConnectionStream::new(stream)))
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Starts the accept loop on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::NonBlocking`] when the socket cannot be
    /// switched to non-blocking mode and [`ListenerError::SpawnAcceptLoop`]
    /// when the accept thread cannot be created.
    pub fn start(self, handler: Arc<dyn ConnectionHandler>) -> Result<ListenerHandle, ListenerError> {
        self.socket
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let accept_loop = AcceptLoop {
            listener: self,
            shutdown: Arc::clone(&shutdown),
            handler,
            sessions: 0,
        };
        let handle = thread::Builder::new()
            .name("radarctld-accept".to_owned())
            .spawn(move || accept_loop.run())
            .map_err(|source| ListenerError::SpawnAcceptLoop { source })?;

        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background accept loop.
///
/// Dropping the handle requests shutdown without waiting for the thread.
#[derive(Debug)]
pub struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Stops accepting new connections. Sessions already running finish on
    /// their own threads.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept loop to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] when the accept thread panicked.
    pub fn join(mut self) -> Result<(), ListenerError> {
        self.handle
            .take()
            .map_or(Ok(()), |handle| handle.join().map_err(|_| ListenerError::ThreadPanic))
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// State owned by the accept thread.
struct AcceptLoop {
    listener: SocketListener,
    shutdown: Arc<AtomicBool>,
    handler: Arc<dyn ConnectionHandler>,
    sessions: u64,
}

impl AcceptLoop {
    fn run(mut self) {
        let endpoint = self.listener.endpoint.clone();
        info!(target: LISTENER_TARGET, %endpoint, "socket listener active");

        // Only the first error of each kind in a run is logged.
        let mut last_error: Option<io::ErrorKind> = None;
        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.poll() {
                Ok(Some(stream)) => {
                    last_error = None;
                    self.dispatch(stream);
                }
                Ok(None) => thread::sleep(ACCEPT_BACKOFF),
                Err(error) => {
                    if last_error.replace(error.kind()) != Some(error.kind()) {
                        warn!(target: LISTENER_TARGET, %error, "socket accept error");
                    }
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }

        info!(
            target: LISTENER_TARGET,
            %endpoint,
            sessions = self.sessions,
            "socket listener stopped"
        );
    }

    /// Hands the connection to the handler on a thread of its own.
    fn dispatch(&mut self, stream: ConnectionStream) {
        self.sessions += 1;
        let session = self.sessions;
        let handler = Arc::clone(&self.handler);
        let spawned = thread::Builder::new()
            .name(format!("radarctld-session-{session}"))
            .spawn(move || handler.handle(stream));
        if let Err(error) = spawned {
            warn!(
                target: LISTENER_TARGET,
                session,
                %error,
                "failed to spawn session thread; connection dropped"
            );
        }
    }
}

fn bind_tcp(endpoint: &SocketEndpoint) -> Result<TcpListener, ListenerError> {
    let candidates = (endpoint.host(), endpoint.port())
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            endpoint: endpoint.to_string(),
            source,
        })?;

    let mut last_failure = None;
    for addr in candidates {
        match TcpListener::bind(addr) {
            Ok(listener) => return Ok(listener),
            Err(source) => last_failure = Some(ListenerError::BindTcp { addr, source }),
        }
    }
    Err(last_failure.unwrap_or_else(|| ListenerError::NoAddresses {
        endpoint: endpoint.to_string(),
    }))
}
