use std::{
    io,
    net::{SocketAddr, UdpSocket},
    time::{Duration, Instant},
};

/// Observable side of the socket lifecycle:
/// `Unbound -> Bound -> (error -> Unbound)*`.
///
/// An I/O error on the socket drops it back to `Unbound` immediately; the
/// next public call on the owning endpoint retries the bind, gated by a
/// fixed (non-exponential) backoff after a failed attempt. The state is
/// exposed so the application can pause upstream production instead of
/// busy-looping against a dead socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Unbound,
    Bound,
}

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("socket create/bind failed: {0}")]
    Io(#[source] io::Error),
    #[error("bind backoff in effect")]
    Backoff,
}

/// A UDP socket that recreates itself after failures.
///
/// Both endpoints share this lifecycle; the sender leaves `bind_addr` unset
/// and takes an OS-assigned ephemeral port, the receiver binds a configured
/// address. Buffer-size hints are applied best-effort at creation.
pub struct LinkSocket {
    bind_addr: Option<SocketAddr>,
    snd_buf_size: Option<usize>,
    rcv_buf_size: Option<usize>,
    backoff: Duration,
    last_failure: Option<Instant>,
    sock: Option<UdpSocket>,
}

pub struct LinkSocketBuilder {
    pub bind_addr: Option<SocketAddr>,
    pub snd_buf_size: Option<usize>,
    pub rcv_buf_size: Option<usize>,
    pub backoff: Duration,
}

impl LinkSocketBuilder {
    #[must_use]
    pub fn build(self) -> LinkSocket {
        LinkSocket {
            bind_addr: self.bind_addr,
            snd_buf_size: self.snd_buf_size,
            rcv_buf_size: self.rcv_buf_size,
            backoff: self.backoff,
            last_failure: None,
            sock: None,
        }
    }
}

impl LinkSocket {
    #[must_use]
    pub fn state(&self) -> SocketState {
        match self.sock {
            Some(_) => SocketState::Bound,
            None => SocketState::Unbound,
        }
    }

    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.sock.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Returns the bound socket, creating it first if necessary.
    ///
    /// A creation attempt inside the backoff window after a failed one is
    /// refused with `BindError::Backoff` without touching the OS.
    pub fn ensure(&mut self) -> Result<&UdpSocket, BindError> {
        if self.sock.is_none() {
            if let Some(at) = self.last_failure {
                if at.elapsed() < self.backoff {
                    return Err(BindError::Backoff);
                }
            }
            match self.create() {
                Ok(sock) => {
                    self.last_failure = None;
                    log::debug!("socket bound on {:?}", sock.local_addr().ok());
                    self.sock = Some(sock);
                }
                Err(e) => {
                    self.last_failure = Some(Instant::now());
                    log::warn!("socket create/bind failed: {}", e);
                    return Err(BindError::Io(e));
                }
            }
        }
        Ok(self.sock.as_ref().unwrap())
    }

    fn create(&self) -> io::Result<UdpSocket> {
        let bind_addr = match self.bind_addr {
            Some(addr) => addr,
            None => "0.0.0.0:0".parse().unwrap(),
        };
        let sock = UdpSocket::bind(bind_addr)?;
        // hint failures downgrade to warnings; the socket itself is fine
        if let Some(bytes) = self.snd_buf_size {
            if let Err(e) = set_buf_size(&sock, BufDirection::Send, bytes) {
                log::warn!("failed to set send buffer size to {}: {}", bytes, e);
            }
        }
        if let Some(bytes) = self.rcv_buf_size {
            if let Err(e) = set_buf_size(&sock, BufDirection::Recv, bytes) {
                log::warn!("failed to set receive buffer size to {}: {}", bytes, e);
            }
        }
        Ok(sock)
    }

    /// Drops the current socket after an I/O error. The next `ensure` call
    /// recreates it.
    pub fn invalidate(&mut self) {
        if self.sock.take().is_some() {
            log::warn!("socket invalidated after I/O error");
        }
    }

    /// Idempotent; safe to call at any time.
    pub fn close(&mut self) {
        self.sock = None;
        self.last_failure = None;
    }
}

enum BufDirection {
    Send,
    Recv,
}

#[cfg(unix)]
fn set_buf_size(sock: &UdpSocket, dir: BufDirection, bytes: usize) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let opt = match dir {
        BufDirection::Send => libc::SO_SNDBUF,
        BufDirection::Recv => libc::SO_RCVBUF,
    };
    let val = bytes as libc::c_int;
    let rc = unsafe {
        libc::setsockopt(
            sock.as_raw_fd(),
            libc::SOL_SOCKET,
            opt,
            &val as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    match rc {
        0 => Ok(()),
        _ => Err(io::Error::last_os_error()),
    }
}

#[cfg(not(unix))]
fn set_buf_size(sock: &UdpSocket, dir: BufDirection, bytes: usize) -> io::Result<()> {
    let _ = (sock, dir, bytes);
    log::debug!("socket buffer-size hints unsupported on this platform");
    Ok(())
}
