//! Wire-level WebDriver client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use tracing::debug;

use super::session::{BrowserSession, SessionCookie, SessionProvider};
use crate::error::{Result, SiteError};

/// W3C element identifier key in find-element responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Poll interval for visibility waits.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// WebDriver endpoint configuration.
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Remote endpoint, e.g. "http://127.0.0.1:4444".
    pub endpoint: String,
    /// Browser name sent in the session capabilities.
    pub browser: String,
    /// Launch the browser headless.
    pub headless: bool,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:4444".to_string(),
            browser: "chrome".to_string(),
            headless: true,
            timeout_secs: 60,
        }
    }
}

/// Client for one WebDriver remote end; opens [`WebDriverSession`]s.
pub struct WebDriverClient {
    http: Client,
    config: WebDriverConfig,
}

impl WebDriverClient {
    pub fn new(config: WebDriverConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn capabilities(&self) -> Value {
        let mut always_match = json!({ "browserName": self.config.browser });
        if self.config.headless {
            match self.config.browser.as_str() {
                "firefox" => {
                    always_match["moz:firefoxOptions"] = json!({ "args": ["-headless"] });
                }
                _ => {
                    always_match["goog:chromeOptions"] =
                        json!({ "args": ["--headless=new", "--window-size=1400,900"] });
                }
            }
        }
        json!({ "capabilities": { "alwaysMatch": always_match } })
    }

    /// Open a new browser session.
    pub async fn new_session(&self) -> Result<WebDriverSession> {
        let endpoint = self.config.endpoint.trim_end_matches('/');
        let response = self
            .http
            .post(format!("{endpoint}/session"))
            .json(&self.capabilities())
            .send()
            .await?;
        let value = unwrap_value(response.status(), response.json().await?)?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| SiteError::webdriver("session not created", "missing sessionId"))?
            .to_string();

        debug!(session_id = %session_id, browser = %self.config.browser, "WebDriver session opened");

        Ok(WebDriverSession {
            http: self.http.clone(),
            base: format!("{endpoint}/session/{session_id}"),
            session_id,
        })
    }
}

#[async_trait]
impl SessionProvider for WebDriverClient {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        Ok(Box::new(self.new_session().await?))
    }
}

/// One live browser session.
pub struct WebDriverSession {
    http: Client,
    base: String,
    session_id: String,
}

impl WebDriverSession {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let mut request = self.http.request(method, format!("{}{}", self.base, path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        unwrap_value(response.status(), response.json().await?)
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.execute(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.execute(Method::POST, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.execute(Method::DELETE, path, None).await
    }

    /// Find the first element matching a CSS selector, returning its
    /// wire-protocol id.
    async fn find(&self, selector: &str) -> Result<String> {
        let value = self
            .post(
                "/element",
                json!({ "using": "css selector", "value": selector }),
            )
            .await
            .map_err(|e| match e {
                SiteError::WebDriver { ref error, .. } if error == "no such element" => {
                    SiteError::ElementNotFound(selector.to_string())
                }
                other => other,
            })?;

        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SiteError::ElementNotFound(selector.to_string()))
    }

    async fn displayed(&self, element_id: &str) -> Result<bool> {
        let value = self.get(&format!("/element/{element_id}/displayed")).await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        let value = self.get("/title").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn current_url(&self) -> Result<String> {
        let value = self.get("/url").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let id = self.find(selector).await?;
        self.post(&format!("/element/{id}/click"), json!({})).await?;
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        let id = self.find(selector).await?;
        self.post(&format!("/element/{id}/clear"), json!({})).await?;
        self.post(&format!("/element/{id}/value"), json!({ "text": text }))
            .await?;
        Ok(())
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.find(selector).await {
                Ok(id) => {
                    if self.displayed(&id).await.unwrap_or(false) {
                        return Ok(true);
                    }
                }
                Err(SiteError::ElementNotFound(_)) => {}
                // The DOM can churn mid-poll while the page settles.
                Err(SiteError::WebDriver { ref error, .. })
                    if error == "stale element reference" => {}
                Err(e) => return Err(e),
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let id = self.find(selector).await?;
        let value = self.get(&format!("/element/{id}/attribute/{name}")).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn cookies(&self) -> Result<Vec<SessionCookie>> {
        let value = self.get("/cookie").await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn delete_all_cookies(&self) -> Result<()> {
        self.delete("/cookie").await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        debug!(session_id = %self.session_id, "closing WebDriver session");
        self.delete("").await?;
        Ok(())
    }
}

/// Unwrap the `value` envelope every WebDriver response carries, turning
/// error payloads into [`SiteError::WebDriver`].
fn unwrap_value(status: StatusCode, body: Value) -> Result<Value> {
    let value = body.get("value").cloned().unwrap_or(Value::Null);
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
        return Err(SiteError::WebDriver { error, message });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_value_success() {
        let body = json!({ "value": { "sessionId": "abc" } });
        let value = unwrap_value(StatusCode::OK, body).unwrap();
        assert_eq!(value["sessionId"], "abc");
    }

    #[test]
    fn test_unwrap_value_error_payload() {
        let body = json!({
            "value": { "error": "no such element", "message": "not found" }
        });
        let err = unwrap_value(StatusCode::NOT_FOUND, body).unwrap_err();
        match err {
            SiteError::WebDriver { error, message } => {
                assert_eq!(error, "no such element");
                assert_eq!(message, "not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_capabilities_headless_chrome() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        let client = WebDriverClient::new(WebDriverConfig::default()).unwrap();
        let caps = client.capabilities();
        let args = &caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"];
        assert!(args.as_array().unwrap().iter().any(|a| a == "--headless=new"));
    }

    #[test]
    fn test_cookie_deserialization_ignores_extras() {
        let raw = json!([
            { "name": "sid", "value": "123", "domain": ".weibo.cn", "path": "/", "httpOnly": true }
        ]);
        let cookies: Vec<SessionCookie> = serde_json::from_value(raw).unwrap();
        assert_eq!(cookies[0].name, "sid");
        assert_eq!(cookies[0].value, "123");
    }
}
