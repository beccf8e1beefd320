use crate::{net::SocketAddr, Error, NtpUdpSocket, Result};

use tokio::net::UdpSocket;

impl NtpUdpSocket for UdpSocket {
    async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> Result<usize> {
        UdpSocket::send_to(self, buf, addr)
            .await
            .map_err(|_| Error::Network)
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf)
            .await
            .map_err(|_| Error::Network)
    }
}
