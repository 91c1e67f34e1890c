use crate::{config::Config, error::ImportError, parse::ProvisioningRequest, record::CsvRecord};
use log::debug;
use reqwest::{blocking::Client, header::CONTENT_TYPE, Url};
use serde_json::Value;

/// Obtains an authorization token for a user record.
pub trait Provisioner {
    fn provision(&self, record: &CsvRecord) -> Result<String, ImportError>;
}

#[cfg(test)]
impl<F> Provisioner for F
where
    F: Fn(&CsvRecord) -> Result<String, ImportError>,
{
    fn provision(&self, record: &CsvRecord) -> Result<String, ImportError> {
        self(record)
    }
}

/// Blocking HTTP client for the identity provisioning service.
pub struct ProvisioningClient {
    http: Client,
    endpoint: Url,
    client_id: String,
    client_secret: String,
    token_pointer: String,
    log_payloads: bool,
}

impl ProvisioningClient {
    pub fn new(config: &Config) -> Result<Self, ImportError> {
        let http = Client::builder().build()?;

        Ok(ProvisioningClient {
            http,
            endpoint: config.endpoint.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_pointer: config.token_pointer.clone(),
            log_payloads: config.log_payloads,
        })
    }
}

impl Provisioner for ProvisioningClient {
    /// POST the record to the users endpoint and return the token from the
    /// response. The status code is not interpreted; the body decides.
    fn provision(&self, record: &CsvRecord) -> Result<String, ImportError> {
        let request = ProvisioningRequest::new(record, &self.client_id, &self.client_secret);
        let body = serde_json::to_vec(&request).map_err(ImportError::EncodeError)?;

        if self.log_payloads {
            debug!("request body: {}", String::from_utf8_lossy(&body));
        } else {
            debug!("request body: {}", request.redacted());
        }

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = response.status();
        let contents = response.bytes()?;

        if self.log_payloads {
            debug!("RAW ({status}): {}", String::from_utf8_lossy(&contents));
        } else {
            debug!("response {status}, {} bytes", contents.len());
        }

        extract_token(&contents, &self.token_pointer)
    }
}

/// Parse a response body and read the string at `pointer`.
pub fn extract_token(contents: &[u8], pointer: &str) -> Result<String, ImportError> {
    let value: Value = serde_json::from_slice(contents).map_err(ImportError::DecodeError)?;

    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ImportError::MissingField(field_name(pointer)))
}

/// Last segment of a JSON pointer, for error messages.
fn field_name(pointer: &str) -> String {
    pointer
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .replace("~1", "/")
        .replace("~0", "~")
}
