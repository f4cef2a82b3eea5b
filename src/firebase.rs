use anyhow::{anyhow, Context};
use embedded_svc::{
    http::{client::Client as HttpClient, Method, Status},
    io::{Read, Write},
};
use esp_idf_svc::http::client::{Configuration as HttpClientConfiguration, EspHttpConnection};
use log::info;
use serde_json::Value;

const SIGN_UP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signUp";

const MAX_RESPONSE_BODY: usize = 2048;

/// Session against a Firebase realtime database. Authentication is
/// attempted once at boot; a failed sign-up leaves the session
/// permanently not ready and every subsequent upload is skipped.
pub struct FirebaseSession {
    api_key: &'static str,
    database_url: &'static str,
    id_token: Option<String>,
}

impl FirebaseSession {
    pub fn new(api_key: &'static str, database_url: &'static str) -> Self {
        Self {
            api_key,
            database_url: database_url.trim_end_matches('/'),
            id_token: None,
        }
    }

    /// Anonymous sign-up against the project API key. On success the
    /// returned ID token authorizes all subsequent database writes.
    pub fn authenticate(&mut self) -> anyhow::Result<()> {
        let url = format!("{}?key={}", SIGN_UP_URL, self.api_key);
        let (status, body) = http_request(Method::Post, &url, b"{\"returnSecureToken\":true}")?;

        let response: Value =
            serde_json::from_str(&body).context("malformed sign-up response")?;

        if !(200..300).contains(&status) {
            return Err(anyhow!(
                "{}",
                response["error"]["message"]
                    .as_str()
                    .unwrap_or("sign-up rejected")
            ));
        }

        let token = response["idToken"]
            .as_str()
            .context("sign-up response has no idToken")?;

        info!(
            "Authentication successful with UID {}",
            response["localId"].as_str().unwrap_or("<unknown>")
        );

        self.id_token = Some(token.to_string());
        Ok(())
    }
}

impl crate::uploader::CloudStore for FirebaseSession {
    fn ready(&self) -> bool {
        self.id_token.is_some()
    }

    fn write_record(&mut self, path: &str, record: &Value) -> anyhow::Result<()> {
        let token = self.id_token.as_ref().context("no session token")?;
        let url = format!("{}/{}.json?auth={}", self.database_url, path, token);

        let (status, body) = http_request(Method::Put, &url, record.to_string().as_bytes())?;

        if !(200..300).contains(&status) {
            let reason = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["error"].as_str().map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(anyhow!("{reason}"));
        }

        Ok(())
    }
}

/// One request over a fresh TLS connection, body drained into a string.
fn http_request(method: Method, url: &str, body: &[u8]) -> anyhow::Result<(u16, String)> {
    let connection = EspHttpConnection::new(&HttpClientConfiguration {
        crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
        ..Default::default()
    })?;
    let mut client = HttpClient::wrap(connection);

    let content_length = body.len().to_string();
    let headers = [
        ("content-type", "application/json"),
        ("content-length", content_length.as_str()),
    ];

    let mut request = client.request(method, url, &headers)?;
    request.write_all(body)?;
    request.flush()?;

    let mut response = request.submit().map_err(|e| anyhow!("{e:?}"))?;
    let status = response.status();

    let mut text = Vec::new();
    let mut chunk = [0_u8; 256];
    loop {
        let read = response.read(&mut chunk).map_err(|e| anyhow!("{e:?}"))?;
        if read == 0 || text.len() + read > MAX_RESPONSE_BODY {
            break;
        }
        text.extend_from_slice(&chunk[..read]);
    }

    Ok((status, String::from_utf8_lossy(&text).into_owned()))
}
