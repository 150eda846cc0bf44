//! Fake daemon utilities for behavioural tests.
//!
//! Listens on a Unix socket inside a temporary directory, accepts a single
//! connection, records the request and streams a canned response.

use std::io::{self, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

const ACCEPT_DEADLINE: Duration = Duration::from_secs(2);
const HANG_LIMIT: Duration = Duration::from_secs(5);
const CHUNK_PAUSE: Duration = Duration::from_millis(20);

/// What the fake daemon does once it has read a request.
#[derive(Debug, Clone, Default)]
pub(in crate::tests) struct Script {
    /// Response chunks, written with a short pause between them.
    pub chunks: Vec<Vec<u8>>,
    /// Keeps the connection open after the chunks until the client leaves.
    pub hang: bool,
}

impl Script {
    pub fn replying(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|chunk| chunk.as_bytes().to_vec()).collect(),
            hang: false,
        }
    }

    pub fn hanging_after(chunks: &[&str]) -> Self {
        Self {
            hang: true,
            ..Self::replying(chunks)
        }
    }
}

/// A mock daemon serving exactly one exchange.
pub(in crate::tests) struct FakeDaemon {
    _directory: TempDir,
    socket: PathBuf,
    requests: Arc<Mutex<Vec<String>>>,
    result: Arc<Mutex<Option<Result<()>>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeDaemon {
    /// Binds a socket in a fresh temporary directory and serves `script`.
    pub fn spawn(script: Script) -> Result<Self> {
        let directory = tempfile::tempdir().context("create socket directory")?;
        let socket = directory.path().join("taskmaster.sock");
        let listener = UnixListener::bind(&socket).context("bind fake daemon")?;
        listener
            .set_nonblocking(true)
            .context("fake daemon nonblocking")?;

        let requests: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let result: Arc<Mutex<Option<Result<()>>>> = Arc::new(Mutex::new(None));
        let requests_clone = Arc::clone(&requests);
        let result_clone = Arc::clone(&result);
        let handle = thread::spawn(move || {
            let outcome = Self::serve_client(&listener, &script, &requests_clone);
            if let Ok(mut guard) = result_clone.lock() {
                *guard = Some(outcome);
            }
        });

        Ok(Self {
            _directory: directory,
            socket,
            requests,
            result,
            handle: Some(handle),
        })
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Waits for the daemon thread to finish and returns recorded requests.
    pub fn take_requests(&mut self) -> Result<Vec<String>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake daemon thread panicked"))?;
        }
        if let Some(outcome) = self
            .result
            .lock()
            .map_err(|error| anyhow!("lock fake daemon result: {error}"))?
            .take()
        {
            outcome.context("fake daemon failed")?;
        }
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests.clone())
    }

    fn serve_client(
        listener: &UnixListener,
        script: &Script,
        requests: &Arc<Mutex<Vec<String>>>,
    ) -> Result<()> {
        let deadline = Instant::now() + ACCEPT_DEADLINE;
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    stream
                        .set_nonblocking(false)
                        .context("blocking client stream")?;
                    Self::record_request(&stream, requests)?;
                    return Self::play(stream, script);
                }
                Err(ref error)
                    if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline =>
                {
                    thread::sleep(Duration::from_millis(10));
                }
                // The client gave up before connecting, for instance after a
                // usage error.
                Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(error) => return Err(error).context("accept connection"),
            }
        }
    }

    /// Reads until the bytes form one complete JSON value. Requests carry no
    /// framing, so the parse is the only end marker.
    fn record_request(mut stream: &UnixStream, requests: &Arc<Mutex<Vec<String>>>) -> Result<()> {
        stream
            .set_read_timeout(Some(ACCEPT_DEADLINE))
            .context("request read timeout")?;
        let mut received = Vec::new();
        let mut buffer = [0_u8; 256];
        loop {
            let read = stream.read(&mut buffer).context("read request")?;
            if read == 0 {
                break;
            }
            received.extend_from_slice(&buffer[..read]);
            if serde_json::from_slice::<serde_json::Value>(&received).is_ok() {
                break;
            }
        }
        let request = String::from_utf8(received).context("request utf8")?;
        requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?
            .push(request);
        Ok(())
    }

    fn play(mut stream: UnixStream, script: &Script) -> Result<()> {
        for chunk in &script.chunks {
            stream.write_all(chunk).context("write response chunk")?;
            stream.flush().context("flush response chunk")?;
            thread::sleep(CHUNK_PAUSE);
        }
        if script.hang {
            // Block until the client hangs up.
            stream
                .set_read_timeout(Some(HANG_LIMIT))
                .context("hang timeout")?;
            let mut sink = [0_u8; 64];
            while matches!(stream.read(&mut sink), Ok(read) if read > 0) {}
        }
        Ok(())
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
