//! W3C WebDriver wire-protocol client.
//!
//! Speaks plain JSON-over-HTTP to a local driver endpoint (geckodriver,
//! chromedriver). Only the handful of commands the navigator needs are
//! implemented; the session is created on construction and must be torn down
//! with [`WebDriverClient::quit`] on every exit path.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::driver::json::decode_with_path;
use crate::driver::{DriverError, ElementHandle, Locator, Strategy, UiDriver};

/// W3C element identifier key in wire responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

pub struct WebDriverClient {
    http: reqwest::Client,
    base: String,
    session: String,
}

impl WebDriverClient {
    /// Create a new browser session against `webdriver_url`.
    pub async fn start(webdriver_url: &str, headless: bool) -> Result<Self, DriverError> {
        // Validate early so a bad endpoint fails here, not on the first command.
        let base = Url::parse(webdriver_url)
            .map_err(|e| DriverError::Decode(anyhow::anyhow!("bad webdriver url: {e}")))?
            .to_string();
        let base = base.trim_end_matches('/').to_string();

        let mut firefox_args: Vec<&str> = Vec::new();
        if headless {
            firefox_args.push("-headless");
        }
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "firefox",
                    "moz:firefoxOptions": { "args": firefox_args }
                }
            }
        });

        let http = reqwest::Client::new();
        let value = raw_command(
            &http,
            Method::POST,
            &format!("{base}/session"),
            Some(capabilities),
        )
        .await?;
        let session: NewSession = decode_with_path(value).map_err(DriverError::Decode)?;

        debug!(session_id = %session.session_id, "webdriver session created");
        Ok(Self {
            http,
            base,
            session: session.session_id,
        })
    }

    /// Tear the session down. Safe to call exactly once per session; the
    /// browser process is released even if the run failed.
    pub async fn quit(&self) -> Result<(), DriverError> {
        let path = format!("{}/session/{}", self.base, self.session);
        raw_command(&self.http, Method::DELETE, &path, None).await?;
        debug!(session_id = %self.session, "webdriver session closed");
        Ok(())
    }

    async fn command(
        &self,
        method: Method,
        suffix: &str,
        body: Option<Value>,
    ) -> Result<Value, DriverError> {
        let path = format!("{}/session/{}/{}", self.base, self.session, suffix);
        raw_command(&self.http, method, &path, body).await
    }

    fn element_path(element: &ElementHandle, suffix: &str) -> String {
        if suffix.is_empty() {
            format!("element/{}", element.0)
        } else {
            format!("element/{}/{}", element.0, suffix)
        }
    }
}

fn locator_body(locator: &Locator) -> Value {
    let using = match locator.strategy {
        Strategy::Css => "css selector",
        Strategy::XPath => "xpath",
    };
    json!({ "using": using, "value": locator.value })
}

fn element_ref(element: &ElementHandle) -> Value {
    json!({ ELEMENT_KEY: element.0 })
}

fn decode_element(value: Value, locator: &Locator) -> Result<ElementHandle, DriverError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|id| ElementHandle(id.to_string()))
        .ok_or_else(|| {
            DriverError::Decode(anyhow::anyhow!(
                "element response for '{locator}' carries no element id"
            ))
        })
}

fn decode_elements(value: Value, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError> {
    let items = value.as_array().ok_or_else(|| {
        DriverError::Decode(anyhow::anyhow!(
            "elements response for '{locator}' is not an array"
        ))
    })?;
    items
        .iter()
        .map(|item| decode_element(item.clone(), locator))
        .collect()
}

/// Issue one wire command and unwrap the `{"value": ...}` envelope, mapping
/// protocol error codes onto [`DriverError`] variants.
async fn raw_command(
    http: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<Value, DriverError> {
    let mut request = http.request(method.clone(), url);
    request = match body {
        Some(body) => request.json(&body),
        // W3C requires a JSON body on every POST.
        None if method == Method::POST => request.json(&json!({})),
        None => request,
    };

    let response = request.send().await?;
    let status = response.status();
    let envelope: Value = response.json().await?;
    let value = envelope.get("value").cloned().unwrap_or(Value::Null);

    if !status.is_success() {
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(match error.as_str() {
            "no such element" => DriverError::NoSuchElement(message),
            "stale element reference" => DriverError::StaleElement(message),
            "timeout" | "script timeout" => DriverError::Timeout(message),
            _ => DriverError::Protocol { error, message },
        });
    }

    Ok(value)
}

#[async_trait]
impl UiDriver for WebDriverClient {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.command(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn enter_frame(&self, locator: &Locator) -> Result<(), DriverError> {
        let frame = self.find_one(locator).await?;
        self.command(
            Method::POST,
            "frame",
            Some(json!({ "id": element_ref(&frame) })),
        )
        .await?;
        Ok(())
    }

    async fn find_one(&self, locator: &Locator) -> Result<ElementHandle, DriverError> {
        let value = self
            .command(Method::POST, "element", Some(locator_body(locator)))
            .await?;
        decode_element(value, locator)
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError> {
        let value = self
            .command(Method::POST, "elements", Some(locator_body(locator)))
            .await?;
        decode_elements(value, locator)
    }

    async fn find_one_in(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<ElementHandle, DriverError> {
        let value = self
            .command(
                Method::POST,
                &Self::element_path(parent, "element"),
                Some(locator_body(locator)),
            )
            .await?;
        decode_element(value, locator)
    }

    async fn find_all_in(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        let value = self
            .command(
                Method::POST,
                &Self::element_path(parent, "elements"),
                Some(locator_body(locator)),
            )
            .await?;
        decode_elements(value, locator)
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.command(Method::POST, &Self::element_path(element, "click"), None)
            .await?;
        Ok(())
    }

    async fn read_text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let value = self
            .command(Method::GET, &Self::element_path(element, "text"), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn read_property(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<String, DriverError> {
        let value = self
            .command(
                Method::GET,
                &Self::element_path(element, &format!("property/{name}")),
                None,
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.command(
            Method::POST,
            "execute/sync",
            Some(json!({
                "script": "arguments[0].scrollIntoView();",
                "args": [element_ref(element)]
            })),
        )
        .await?;
        Ok(())
    }
}
