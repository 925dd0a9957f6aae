//! Host name and addresses.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{Body, Client, StatusCode, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use sysinfo::Networks;
use tracing::debug;

use crate::codec::Identity;
use crate::core::{
    EXTERNAL_ADDRESS_TIMEOUT, EXTERNAL_ADDRESS_UNAVAILABLE, EXTERNAL_ADDRESS_URL,
    IdentitySource, UNKNOWN_HOSTNAME, UNKNOWN_LAN_ADDRESS,
};

/// Interface name prefixes of container and bridge networks.
const VIRTUAL_INTERFACE_PREFIXES: [&str; 3] = ["docker", "br-", "veth"];

/// Resolves the host's identity from the OS and a public echo service.
///
/// Every lookup degrades to a placeholder string instead of failing.
#[derive(Debug, Clone)]
pub struct SystemIdentity {
    client: Client<HttpsConnector<HttpConnector>>,
    external_url: Uri,
    timeout: Duration,
}

impl SystemIdentity {
    /// Create a resolver using the default external address service.
    pub fn new() -> Self {
        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        Self {
            client: Client::builder().build::<_, Body>(https),
            external_url: Uri::from_static(EXTERNAL_ADDRESS_URL),
            timeout: EXTERNAL_ADDRESS_TIMEOUT,
        }
    }

    /// Query a different external address service.
    pub fn with_external_url(mut self, url: Uri) -> Self {
        self.external_url = url;
        self
    }

    /// Set the external address lookup timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Host name, or `"unknown"`.
    pub fn hostname() -> String {
        hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_HOSTNAME.to_string())
    }

    /// First usable IPv4 address on a physical interface, or `"0.0.0.0"`.
    pub fn local_lan_address() -> String {
        let networks = Networks::new_with_refreshed_list();
        let mut interfaces: Vec<(&str, IpAddr)> = networks
            .iter()
            .flat_map(|(name, data)| {
                data.ip_networks()
                    .iter()
                    .map(move |network| (name.as_str(), network.addr))
            })
            .collect();
        // Interface order from the OS is not stable.
        interfaces.sort_by(|a, b| a.0.cmp(b.0));

        pick_lan_address(interfaces)
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| UNKNOWN_LAN_ADDRESS.to_string())
    }

    /// Public address as reported by the echo service, or a placeholder.
    pub async fn external_address(&self) -> String {
        match tokio::time::timeout(self.timeout, self.fetch_external_address()).await {
            Ok(Ok(address)) if !address.is_empty() => address,
            Ok(Ok(_)) => {
                debug!("external address service returned an empty body");
                EXTERNAL_ADDRESS_UNAVAILABLE.to_string()
            }
            Ok(Err(e)) => {
                debug!(error = %e, "external address lookup failed");
                EXTERNAL_ADDRESS_UNAVAILABLE.to_string()
            }
            Err(_) => {
                debug!(timeout_ms = self.timeout.as_millis() as u64, "external address lookup timed out");
                EXTERNAL_ADDRESS_UNAVAILABLE.to_string()
            }
        }
    }

    async fn fetch_external_address(&self) -> Result<String, hyper::Error> {
        let response = self.client.get(self.external_url.clone()).await?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;
        if status != StatusCode::OK {
            debug!(%status, "external address service refused");
            return Ok(String::new());
        }
        Ok(body
            .iter()
            .filter(|b| b.is_ascii())
            .map(|&b| char::from(b))
            .collect::<String>()
            .trim()
            .to_string())
    }
}

impl Default for SystemIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentitySource for SystemIdentity {
    async fn identity(&mut self) -> Identity {
        Identity::new(
            Self::hostname(),
            Self::local_lan_address(),
            self.external_address().await,
        )
    }

    async fn lan_address(&mut self) -> String {
        Self::local_lan_address()
    }
}

/// First non-loopback IPv4 address not on a container or bridge interface.
pub fn pick_lan_address<'a>(interfaces: impl IntoIterator<Item = (&'a str, IpAddr)>) -> Option<Ipv4Addr> {
    interfaces.into_iter().find_map(|(name, addr)| {
        let name = name.to_ascii_lowercase();
        if VIRTUAL_INTERFACE_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
        {
            return None;
        }
        match addr {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4),
            _ => None,
        }
    })
}
