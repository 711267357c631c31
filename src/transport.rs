//! TCP and TLS byte streams to the IRC server.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tracing::warn;

use crate::config::IrcConfig;
use crate::error::ConnectionError;

/// A connected socket, plain or TLS.
#[allow(clippy::large_enum_variant)]
pub enum Transport {
    Tcp(TcpStream),
    #[cfg(feature = "tls")]
    Tls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
}

impl Transport {
    /// Dial the configured server, with TCP keepalive on, and run the TLS
    /// handshake when `use_tls` is set.
    pub async fn connect(config: &IrcConfig) -> Result<Self, ConnectionError> {
        let (host, port) = config.host_port()?;
        let stream = TcpStream::connect((host, port)).await?;
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }

        if !config.use_tls {
            return Ok(Self::tcp(stream));
        }

        #[cfg(feature = "tls")]
        {
            let tls = tls::handshake(stream, host, config.root_ca.as_deref()).await?;
            tracing::debug!(host = %host, "TLS handshake completed");
            Ok(Transport::Tls(Box::new(tls)))
        }
        #[cfg(not(feature = "tls"))]
        {
            Err(crate::error::ConfigError::TlsUnavailable.into())
        }
    }

    pub fn tcp(stream: TcpStream) -> Self {
        Transport::Tcp(stream)
    }

    fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)
    }

    pub fn is_tls(&self) -> bool {
        match self {
            Transport::Tcp(_) => false,
            #[cfg(feature = "tls")]
            Transport::Tls(_) => true,
        }
    }
}

impl AsyncRead for Transport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            #[cfg(feature = "tls")]
            Transport::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Transport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Transport::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            #[cfg(feature = "tls")]
            Transport::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Tcp(s) => Pin::new(s).poll_flush(cx),
            #[cfg(feature = "tls")]
            Transport::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            #[cfg(feature = "tls")]
            Transport::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

#[cfg(feature = "tls")]
mod tls {
    use std::fs::File;
    use std::io::{self, BufReader};
    use std::path::Path;
    use std::sync::Arc;

    use tokio::net::TcpStream;
    use tokio_rustls::client::TlsStream;
    use tokio_rustls::rustls::pki_types::ServerName;
    use tokio_rustls::rustls::{ClientConfig, RootCertStore};
    use tokio_rustls::TlsConnector;
    use tracing::warn;

    use crate::error::{ConfigError, ConnectionError};

    /// System roots plus any certificates in `root_ca`.
    fn root_store(root_ca: Option<&Path>) -> Result<RootCertStore, ConfigError> {
        let mut roots = RootCertStore::empty();
        let native = rustls_native_certs::load_native_certs();
        for cert in native.certs {
            if let Err(e) = roots.add(cert) {
                warn!("failed to add root cert: {}", e);
            }
        }
        for e in &native.errors {
            warn!("error loading native certs: {}", e);
        }

        if let Some(path) = root_ca {
            let certificate_error =
                |e: io::Error| ConfigError::Certificate(format!("{}: {}", path.display(), e));
            let mut reader = BufReader::new(File::open(path).map_err(certificate_error)?);
            let certs = rustls_pemfile::certs(&mut reader)
                .collect::<Result<Vec<_>, _>>()
                .map_err(certificate_error)?;
            if certs.is_empty() {
                return Err(ConfigError::Certificate(format!(
                    "no certificates found in {}",
                    path.display()
                )));
            }
            for cert in certs {
                roots
                    .add(cert)
                    .map_err(|e| ConfigError::Certificate(e.to_string()))?;
            }
        }

        Ok(roots)
    }

    pub(super) async fn handshake(
        stream: TcpStream,
        host: &str,
        root_ca: Option<&Path>,
    ) -> Result<TlsStream<TcpStream>, ConnectionError> {
        let config = ClientConfig::builder()
            .with_root_certificates(root_store(root_ca)?)
            .with_no_client_auth();
        let connector = TlsConnector::from(Arc::new(config));
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        Ok(connector.connect(server_name, stream).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 6];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(b"PONG\r\n").await.unwrap();
            buf
        });

        let config = IrcConfig {
            server: addr.to_string(),
            ..IrcConfig::default()
        };
        let mut transport = Transport::connect(&config).await.unwrap();
        assert!(!transport.is_tls());

        transport.write_all(b"PING\r\n").await.unwrap();
        let mut buf = [0u8; 6];
        transport.read_exact(&mut buf).await.unwrap();

        assert_eq!(&buf, b"PONG\r\n");
        assert_eq!(&server.await.unwrap(), b"PING\r\n");
    }

    #[tokio::test]
    async fn test_connect_refused_is_io_error() {
        // Bind then drop to get a port nobody listens on.
        let addr = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();
        let config = IrcConfig {
            server: addr.to_string(),
            ..IrcConfig::default()
        };
        let err = Transport::connect(&config).await.err().unwrap();
        assert!(matches!(err, ConnectionError::Io(_)));
    }
}
