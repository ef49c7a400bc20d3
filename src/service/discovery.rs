//! UDP discovery responder: a client broadcasts its receive port, and the
//! server reports its own address back over a fresh TCP connection to that
//! port — the discovery socket itself only ever receives, never replies.

use std::io::Write;
use std::net::{IpAddr, TcpStream, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Prefix clients broadcast, followed by `:<client_port>`.
const DISCOVERY_REQUEST_CODE: &str = "RequestServerForGesture";

pub struct DiscoveryResponder {
    socket: UdpSocket,
    decoder_port: u16,
}

impl DiscoveryResponder {
    pub fn bind(discovery_port: u16, decoder_port: u16) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", discovery_port))?;
        socket.set_read_timeout(Some(Duration::from_secs(5)))?;
        Ok(Self { socket, decoder_port })
    }

    /// Serve discovery requests until `shutdown` is set. Blocks the calling
    /// thread; spawn it to run in the background.
    pub fn serve(&self, shutdown: Arc<AtomicBool>) {
        let mut buf = [0u8; 256];
        while !shutdown.load(Ordering::Relaxed) {
            let (len, src) = match self.socket.recv_from(&mut buf) {
                Ok(v) => v,
                Err(e)
                    if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) =>
                {
                    continue;
                }
                Err(e) => {
                    tracing::warn!(%e, "discovery socket recv failed");
                    continue;
                }
            };
            let Ok(text) = std::str::from_utf8(&buf[..len]) else {
                continue;
            };
            let Some(client_port) = parse_request(text.trim()) else {
                continue;
            };
            self.answer(src.ip(), client_port);
        }
    }

    /// Open a new TCP connection to `(client_ip, client_port)` and report
    /// this host's outbound address and decoder port.
    fn answer(&self, client_ip: IpAddr, client_port: u16) {
        let server_ip = match local_outbound_address() {
            Ok(ip) => ip,
            Err(e) => {
                tracing::warn!(%e, "could not determine local address for discovery reply");
                return;
            }
        };
        let reply = format!("{server_ip}:{}", self.decoder_port);
        match TcpStream::connect((client_ip, client_port)) {
            Ok(mut callback) => {
                if let Err(e) = callback.write_all(reply.as_bytes()) {
                    tracing::debug!(%e, %client_ip, client_port, "discovery callback write failed");
                }
            }
            Err(e) => tracing::debug!(%e, %client_ip, client_port, "discovery callback connect failed"),
        }
    }
}

/// Parse `"RequestServerForGesture:<port>"`, returning the client's receive
/// port if the code matches.
fn parse_request(text: &str) -> Option<u16> {
    let (code, port) = text.split_once(':')?;
    if code != DISCOVERY_REQUEST_CODE {
        return None;
    }
    port.parse().ok()
}

/// The address this host would use to reach the outside world, found by
/// connecting a UDP socket (no packet is actually sent) and reading back
/// the local endpoint it bound to.
fn local_outbound_address() -> std::io::Result<IpAddr> {
    let probe = UdpSocket::bind("0.0.0.0:0")?;
    probe.connect(("8.8.8.8", 80))?;
    Ok(probe.local_addr()?.ip())
}
