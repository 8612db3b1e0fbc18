use std::io;
use tokio::net::TcpListener;

/// Binds `host:start_port`, stepping to the next port while the address is in use.
/// Gives up after port 65535 or on any other bind error.
pub async fn bind_with_retry(host: &str, start_port: u16) -> io::Result<TcpListener> {
    let mut port = start_port;
    loop {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                tracing::warn!(port, "port in use, trying next");
                port = port.checked_add(1).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::AddrInUse,
                        format!("no free port between {start_port} and {}", u16::MAX),
                    )
                })?;
            }
            Err(e) => return Err(e),
        }
    }
}
