//! Export of winning trees to an external viewer.
//!
//! The viewer listens on a local TCP port and expects one JSON array of
//! bracketed tree strings per connection. Exporting is best effort: the first
//! failed connection disables the exporter for the rest of its lifetime.

use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 62236);

#[derive(Debug, Clone)]
pub struct TreeExporter {
    addr: SocketAddr,
    timeout: Duration,
    disabled: bool,
}

impl Default for TreeExporter {
    fn default() -> Self {
        TreeExporter::new(SocketAddr::from(DEFAULT_ADDR))
    }
}

impl TreeExporter {
    pub fn new(addr: SocketAddr) -> Self {
        TreeExporter { addr, timeout: Duration::from_millis(500), disabled: false }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Send `trees` as one JSON array. Returns whether anything was sent.
    ///
    /// Nothing is sent for an empty list. A connection or write failure is
    /// logged and turns the exporter off.
    pub fn send(&mut self, trees: &[String]) -> bool {
        if self.disabled || trees.is_empty() {
            return false;
        }
        match self.try_send(trees) {
            Ok(()) => {
                tracing::info!(addr = %self.addr, trees = trees.len(), "exported trees");
                true
            }
            Err(err) => {
                if err.kind() == io::ErrorKind::ConnectionRefused {
                    tracing::info!(addr = %self.addr, "no tree viewer listening; export disabled");
                } else {
                    tracing::warn!(addr = %self.addr, error = %err, "tree export failed; export disabled");
                }
                self.disabled = true;
                false
            }
        }
    }

    fn try_send(&self, trees: &[String]) -> io::Result<()> {
        let payload = serde_json::to_vec(trees).map_err(io::Error::other)?;
        let mut stream = TcpStream::connect_timeout(&self.addr, self.timeout)?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.write_all(&payload)?;
        stream.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn sends_a_json_array() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut body = String::new();
            conn.read_to_string(&mut body).unwrap();
            body
        });

        let mut exporter = TreeExporter::new(addr);
        let trees = vec!["[.admires Pekka admires]".to_string(), "[.näki' ketä näki']".to_string()];
        assert!(exporter.send(&trees));

        let body = server.join().unwrap();
        let received: Vec<String> = serde_json::from_str(&body).unwrap();
        assert_eq!(received, trees);
    }

    #[test]
    fn empty_results_are_not_sent() {
        let mut exporter = TreeExporter::new(SocketAddr::from(([127, 0, 0, 1], 9)));
        assert!(!exporter.send(&[]));
        assert!(!exporter.is_disabled());
    }

    #[test]
    fn refusal_disables_the_exporter() {
        // Bind then drop to get a port nobody listens on.
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let mut exporter = TreeExporter::new(addr).with_timeout(Duration::from_millis(200));

        assert!(!exporter.send(&["[.x x]".to_string()]));
        assert!(exporter.is_disabled());
        assert!(!exporter.send(&["[.x x]".to_string()]));
    }
}
