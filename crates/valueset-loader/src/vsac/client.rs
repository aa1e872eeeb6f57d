//! VSAC terminology service client.
//!
//! Value sets are retrieved in three steps:
//!
//! 1. POST the UMLS credentials to the ticket endpoint to obtain a
//!    ticket-granting ticket (TGT). The TGT is kept for the client's lifetime.
//! 2. POST to `<ticket_url>/<TGT>` to obtain a single-use service ticket.
//! 3. GET `<api_url>?id=<oid>&ticket=<service ticket>` for the SVS payload.

use std::collections::HashMap;

use reqwest::blocking::{Client, Response};
use reqwest::Proxy;
use tracing::debug;
use valueset_types::well_known;

use crate::types::{LoaderError, LoaderResult, VsacConfig, VsacCredentials};

/// A source of raw SVS value set payloads.
pub trait ValueSetSource {
    /// Retrieves the SVS response for `oid` as UTF-8 text.
    fn retrieve_value_set(&mut self, oid: &str) -> LoaderResult<String>;
}

/// Blocking HTTP client for the VSAC SVS API.
pub struct VsacClient {
    client: Client,
    config: VsacConfig,
    credentials: VsacCredentials,
    ticket_granting_ticket: Option<String>,
}

impl std::fmt::Debug for VsacClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VsacClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("has_ticket", &self.ticket_granting_ticket.is_some())
            .finish()
    }
}

impl VsacClient {
    /// Creates a client. The proxy in `config` is the only one used.
    pub fn new(config: VsacConfig, credentials: VsacCredentials) -> LoaderResult<Self> {
        let mut builder = Client::builder().timeout(config.timeout);
        builder = match &config.proxy {
            Some(url) => builder.proxy(Proxy::all(url.as_str())?),
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build()?,
            config,
            credentials,
            ticket_granting_ticket: None,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &VsacConfig {
        &self.config
    }

    fn ticket_granting_ticket(&mut self) -> LoaderResult<String> {
        if let Some(tgt) = &self.ticket_granting_ticket {
            return Ok(tgt.clone());
        }

        debug!(url = %self.config.ticket_url, "requesting ticket-granting ticket");
        let response = self
            .client
            .post(&self.config.ticket_url)
            .form(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()?;
        let tgt = ticket_from(checked(response, &self.config.ticket_url)?)?;

        self.ticket_granting_ticket = Some(tgt.clone());
        Ok(tgt)
    }

    fn service_ticket(&mut self) -> LoaderResult<String> {
        let tgt = self.ticket_granting_ticket()?;
        let url = format!("{}/{}", self.config.ticket_url.trim_end_matches('/'), tgt);

        let response = self
            .client
            .post(&url)
            .form(&[("service", well_known::UMLS_SERVICE)])
            .send()?;
        ticket_from(checked(response, &self.config.ticket_url)?)
    }
}

impl ValueSetSource for VsacClient {
    fn retrieve_value_set(&mut self, oid: &str) -> LoaderResult<String> {
        let ticket = self.service_ticket()?;

        debug!(%oid, "retrieving value set");
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[("id", oid), ("ticket", ticket.as_str())])
            .send()?;
        let bytes = checked(response, &self.config.api_url)?.bytes()?;

        Ok(decode_utf8(&bytes))
    }
}

/// Fails with `HttpStatus` on non-success responses.
fn checked(response: Response, url: &str) -> LoaderResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(LoaderError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

fn ticket_from(response: Response) -> LoaderResult<String> {
    let ticket = response.text()?.trim().to_string();
    if ticket.is_empty() {
        return Err(LoaderError::Ticket("empty ticket in response".to_string()));
    }
    Ok(ticket)
}

/// Decodes a payload as UTF-8, replacing invalid sequences.
pub fn decode_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// In-memory payload source for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct MockValueSetSource {
    payloads: HashMap<String, String>,
    requests: Vec<String>,
}

impl MockValueSetSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the payload returned for `oid`.
    pub fn add_payload(&mut self, oid: impl Into<String>, payload: impl Into<String>) {
        self.payloads.insert(oid.into(), payload.into());
    }

    /// OIDs requested so far, in order.
    pub fn requests(&self) -> &[String] {
        &self.requests
    }
}

impl ValueSetSource for MockValueSetSource {
    fn retrieve_value_set(&mut self, oid: &str) -> LoaderResult<String> {
        self.requests.push(oid.to_string());
        self.payloads
            .get(oid)
            .cloned()
            .ok_or_else(|| LoaderError::HttpStatus {
                status: 404,
                url: format!("mock://{}", oid),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_replaces_invalid_bytes() {
        let bytes = b"<Concept displayName=\"caf\xe9\"/>";
        let decoded = decode_utf8(bytes);
        assert!(decoded.starts_with("<Concept displayName=\"caf"));
        assert!(decoded.contains('\u{fffd}'));
    }

    #[test]
    fn test_client_builds_without_proxy() {
        let client = VsacClient::new(VsacConfig::default(), VsacCredentials::new("u", "p")).unwrap();
        assert!(client.config().proxy.is_none());
        assert!(!format!("{:?}", client).contains("\"p\""));
    }

    #[test]
    fn test_client_builds_with_proxy() {
        let config = VsacConfig {
            proxy: Some("http://proxy.example.org:3128".to_string()),
            ..Default::default()
        };
        let client = VsacClient::new(config, VsacCredentials::new("u", "p")).unwrap();
        assert_eq!(
            client.config().proxy.as_deref(),
            Some("http://proxy.example.org:3128")
        );
    }

    #[test]
    fn test_mock_source_records_requests() {
        let mut source = MockValueSetSource::new();
        source.add_payload("1.2.3", "<xml/>");

        assert_eq!(source.retrieve_value_set("1.2.3").unwrap(), "<xml/>");
        assert!(source.retrieve_value_set("4.5.6").is_err());
        assert_eq!(source.requests(), &["1.2.3".to_string(), "4.5.6".to_string()]);
    }
}
