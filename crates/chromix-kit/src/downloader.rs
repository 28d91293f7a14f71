//! Fetching remote resources.
//!
//! Everything in `chromix-kit` that touches the network goes through the
//! [`Downloader`] trait, so that callers can swap in their own client or a
//! canned one. [`SystemDownloader`] is the implementation used by the CLI.

use std::any::Any;
use std::io::{self, Read};
use std::sync::Arc;

#[cfg(feature = "system-downloader")]
use {
    chromix::diag::EcoString,
    native_tls::{Certificate, TlsConnector},
    once_cell::sync::OnceCell,
    std::fmt::{self, Debug, Formatter},
    std::path::PathBuf,
};

/// Downloads resources from the network.
///
/// If the remote does not have the resource (status `404`), implementations
/// should fail with [`io::ErrorKind::NotFound`].
///
/// Each request carries a dynamic `key` identifying what is being fetched.
/// Functionality in this crate documents the keys it uses.
pub trait Downloader: Send + Sync + 'static {
    /// Fetches the given URL, returning an optional size hint and a reader for
    /// the body.
    fn stream(
        &self,
        key: &dyn Any,
        url: &str,
    ) -> io::Result<(Option<usize>, Box<dyn Read>)>;

    /// Fetches the given URL into memory.
    fn download(&self, key: &dyn Any, url: &str) -> io::Result<Vec<u8>> {
        let (hint, mut reader) = self.stream(key, url)?;
        let mut buf = Vec::with_capacity(hint.unwrap_or(0));
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl<T: Downloader + ?Sized> Downloader for Box<T> {
    fn stream(
        &self,
        key: &dyn Any,
        url: &str,
    ) -> io::Result<(Option<usize>, Box<dyn Read>)> {
        (**self).stream(key, url)
    }

    fn download(&self, key: &dyn Any, url: &str) -> io::Result<Vec<u8>> {
        (**self).download(key, url)
    }
}

impl<T: Downloader + ?Sized> Downloader for Arc<T> {
    fn stream(
        &self,
        key: &dyn Any,
        url: &str,
    ) -> io::Result<(Option<usize>, Box<dyn Read>)> {
        (**self).stream(key, url)
    }

    fn download(&self, key: &dyn Any, url: &str) -> io::Result<Vec<u8>> {
        (**self).download(key, url)
    }
}

/// A blocking HTTPS client.
///
/// Uses the platform's TLS implementation and honors the usual proxy
/// environment variables.
#[cfg(feature = "system-downloader")]
pub struct SystemDownloader {
    user_agent: EcoString,
    cert_path: Option<PathBuf>,
    cert: OnceCell<Certificate>,
}

#[cfg(feature = "system-downloader")]
impl SystemDownloader {
    /// Creates a downloader that trusts the system's root certificates.
    pub fn new(user_agent: impl Into<EcoString>) -> Self {
        Self {
            user_agent: user_agent.into(),
            cert_path: None,
            cert: OnceCell::new(),
        }
    }

    /// Creates a downloader that additionally trusts the PEM certificate at
    /// `cert_path`. The file is read on the first request.
    pub fn with_cert_path(user_agent: impl Into<EcoString>, cert_path: PathBuf) -> Self {
        Self { cert_path: Some(cert_path), ..Self::new(user_agent) }
    }

    /// The extra root certificate, loading it if necessary.
    fn cert(&self) -> Option<io::Result<&Certificate>> {
        let path = self.cert_path.as_ref()?;
        Some(self.cert.get_or_try_init(|| {
            let pem = std::fs::read(path)?;
            Certificate::from_pem(&pem).map_err(io::Error::other)
        }))
    }
}

#[cfg(feature = "system-downloader")]
impl Downloader for SystemDownloader {
    fn stream(
        &self,
        _: &dyn Any,
        url: &str,
    ) -> io::Result<(Option<usize>, Box<dyn Read>)> {
        let mut builder = ureq::AgentBuilder::new().user_agent(&self.user_agent);

        if let Some(proxy) = env_proxy::for_url_str(url)
            .to_url()
            .and_then(|url| ureq::Proxy::new(url).ok())
        {
            builder = builder.proxy(proxy);
        }

        let mut tls = TlsConnector::builder();
        if let Some(cert) = self.cert() {
            tls.add_root_certificate(cert?.clone());
        }
        let connector = tls.build().map_err(io::Error::other)?;
        builder = builder.tls_connector(Arc::new(connector));

        tracing::debug!(url, "sending request");
        let response = builder.build().get(url).call().map_err(|err| match err {
            ureq::Error::Status(404, _) => io::Error::new(io::ErrorKind::NotFound, err),
            err => io::Error::other(err),
        })?;

        let len = response
            .header("Content-Length")
            .and_then(|header| header.parse().ok());

        Ok((len, response.into_reader()))
    }
}

#[cfg(feature = "system-downloader")]
impl Debug for SystemDownloader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemDownloader")
            .field("user_agent", &self.user_agent)
            .field("cert_path", &self.cert_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Downloader for Echo {
        fn stream(
            &self,
            _: &dyn Any,
            url: &str,
        ) -> io::Result<(Option<usize>, Box<dyn Read>)> {
            let body = url.as_bytes().to_vec();
            Ok((Some(body.len()), Box::new(io::Cursor::new(body))))
        }
    }

    #[test]
    fn test_download_reads_stream() {
        assert_eq!(Echo.download(&(), "abc").unwrap(), b"abc");
        let boxed: Box<dyn Downloader> = Box::new(Echo);
        assert_eq!(boxed.download(&(), "def").unwrap(), b"def");
        assert_eq!(Arc::new(Echo).download(&(), "").unwrap(), b"");
    }
}
