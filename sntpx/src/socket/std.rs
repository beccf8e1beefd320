use crate::{net::SocketAddr, Error, NtpUdpSocket, Result};

use std::net::UdpSocket;

// Blocking socket behind the async trait. A read timeout set by the caller
// on the socket bounds how long a single exchange attempt can block.
impl NtpUdpSocket for UdpSocket {
    async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> Result<usize> {
        UdpSocket::send_to(self, buf, addr).map_err(|_| Error::Network)
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).map_err(|_| Error::Network)
    }
}
