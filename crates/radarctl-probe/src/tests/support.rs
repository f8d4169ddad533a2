//! Harness types for probe tests: a fake control service that answers one
//! connection, a static configuration loader, and a world that captures the
//! probe's output.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, ensure};
use camino::Utf8PathBuf;
use radarctl_config::Config;
use tempfile::NamedTempFile;

use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

const ACCEPT_DEADLINE: Duration = Duration::from_secs(2);
const READ_TIMEOUT: Duration = Duration::from_secs(2);

pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Serves a single connection: records the request and writes a canned reply.
pub(super) struct FakeService {
    port: u16,
    request: Arc<Mutex<Option<Vec<u8>>>>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl FakeService {
    pub(super) fn spawn(reply: Vec<u8>) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake service")?;
        listener
            .set_nonblocking(true)
            .context("fake service nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let request = Arc::new(Mutex::new(None));
        let recorded = Arc::clone(&request);
        let handle = thread::spawn(move || Self::serve(&listener, &reply, &recorded));
        Ok(Self {
            port,
            request,
            handle: Some(handle),
        })
    }

    pub(super) fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the service thread and returns the request it read, if a
    /// client connected.
    pub(super) fn take_request(&mut self) -> Result<Option<Vec<u8>>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake service thread panicked"))?
                .context("fake service failed")?;
        }
        let mut guard = self
            .request
            .lock()
            .map_err(|error| anyhow!("lock request: {error}"))?;
        Ok(guard.take())
    }

    fn serve(
        listener: &TcpListener,
        reply: &[u8],
        request: &Arc<Mutex<Option<Vec<u8>>>>,
    ) -> Result<()> {
        let Some(mut stream) = Self::accept(listener)? else {
            return Ok(());
        };
        stream.set_nonblocking(false).context("blocking stream")?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .context("read timeout")?;

        let mut buffer = [0_u8; 1024];
        let read = stream.read(&mut buffer).context("read request")?;
        let received = buffer.get(..read).context("request slice")?.to_vec();
        *request
            .lock()
            .map_err(|error| anyhow!("lock request: {error}"))? = Some(received);

        stream.write_all(reply).context("write reply")?;
        Ok(())
    }

    fn accept(listener: &TcpListener) -> Result<Option<TcpStream>> {
        let deadline = Instant::now() + ACCEPT_DEADLINE;
        loop {
            match listener.accept() {
                Ok((stream, _)) => return Ok(Some(stream)),
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    // The probe may fail before connecting; stop waiting rather
                    // than hang the test.
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    thread::sleep(Duration::from_millis(10));
                }
                Err(error) => return Err(error).context("accept"),
            }
        }
    }
}

pub(super) struct TestWorld {
    pub(super) config: Config,
    pub(super) service: Option<FakeService>,
    pub(super) services_file: Option<NamedTempFile>,
    pub(super) stdout: Vec<u8>,
    pub(super) stderr: Vec<u8>,
    pub(super) exit_code: Option<ExitCode>,
    pub(super) request: Option<Vec<u8>>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            config: Config {
                fallback_port: None,
                ..Config::default()
            },
            service: None,
            services_file: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
            request: None,
        }
    }
}

impl TestWorld {
    pub(super) fn start_service(&mut self, reply: &[u8]) -> Result<()> {
        let service = FakeService::spawn(reply.to_vec())?;
        self.config.service_name = service.port().to_string();
        self.service = Some(service);
        Ok(())
    }

    /// Points the probe at a loopback port nothing listens on.
    pub(super) fn target_closed_port(&mut self) -> Result<()> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind probe port")?;
        let port = listener.local_addr().context("local addr")?.port();
        drop(listener);
        self.config.service_name = port.to_string();
        Ok(())
    }

    /// Uses a services database that lists `name` on `port`.
    pub(super) fn use_services_database(&mut self, contents: &str) -> Result<()> {
        let mut file = NamedTempFile::new().context("services file")?;
        file.write_all(contents.as_bytes())
            .context("write services file")?;
        self.config.services_path = Utf8PathBuf::from_path_buf(file.path().to_path_buf())
            .map_err(|path| anyhow!("services path is not UTF-8: {}", path.display()))?;
        self.services_file = Some(file);
        Ok(())
    }

    pub(super) fn run(&mut self, command_line: &str) -> Result<()> {
        self.stdout.clear();
        self.stderr.clear();
        let args = Self::build_args(command_line);
        let loader = StaticConfigLoader::new(self.config.clone());
        let mut io = IoStreams::new(&mut self.stdout, &mut self.stderr);
        self.exit_code = Some(run_with_loader(args, &mut io, &loader));
        if let Some(mut service) = self.service.take() {
            self.request = service.take_request()?;
        }
        Ok(())
    }

    fn build_args(command_line: &str) -> Vec<OsString> {
        std::iter::once("radarctl-probe")
            .chain(command_line.split_whitespace())
            .map(OsString::from)
            .collect()
    }

    pub(super) fn stdout_text(&self) -> Result<String> {
        String::from_utf8(self.stdout.clone()).context("stdout should be UTF-8")
    }

    pub(super) fn stderr_text(&self) -> Result<String> {
        String::from_utf8(self.stderr.clone()).context("stderr should be UTF-8")
    }

    pub(super) fn assert_exit_code(&self, expected: u8) -> Result<()> {
        let exit = self.exit_code.context("exit code recorded")?;
        ensure!(
            exit == ExitCode::from(expected),
            "expected exit code {expected}, got {exit:?}"
        );
        Ok(())
    }
}
