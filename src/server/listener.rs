// Listener module
// Creates the TCP listener the accept loop runs on

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

use crate::error::{RegistryError, Result};

/// Pending-connection queue length passed to `listen(2)`
const BACKLOG: i32 = 1024;

/// Create a non-blocking `TcpListener` bound to `addr` with `SO_REUSEADDR`.
///
/// `SO_REUSEADDR` lets a restarted process bind while old sockets sit in
/// `TIME_WAIT`. Any failure is reported as `RegistryError::Listen` naming
/// the address.
pub fn create_listener(addr: std::net::SocketAddr) -> Result<TcpListener> {
    bind(addr).map_err(|e| RegistryError::Listen(format!("{addr}: {e}")))
}

fn bind(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    // socket2::Socket -> std listener -> tokio listener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_listen_error() {
        let first = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let taken = first.local_addr().unwrap();
        // SO_REUSEADDR does not allow two active listeners on one port
        let second = create_listener(taken);
        assert!(matches!(second, Err(RegistryError::Listen(_))));
    }
}
