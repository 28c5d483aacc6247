//! Site drivers, one module per supported site.

pub mod mweibo;
pub mod weibo;

use reqwest::Client;
use reqwest::header::{COOKIE, REFERER, USER_AGENT};
use serde_json::Value;

use crate::DEFAULT_UA;
use crate::error::Result;
use crate::types::CookieEntry;

/// Login-state probe endpoint on the Weibo mobile gateway; answers
/// `{"data": {"login": bool}}` for any cookie set.
const MOBILE_CONFIG_URL: &str = "https://m.weibo.cn/api/config";

/// One authenticated GET against the mobile config endpoint.
pub(crate) async fn mobile_login_state(client: &Client, entry: &CookieEntry) -> Result<bool> {
    let response = client
        .get(MOBILE_CONFIG_URL)
        .header(COOKIE, entry.cookie_header())
        .header(USER_AGENT, DEFAULT_UA)
        .header(REFERER, "https://m.weibo.cn/")
        .send()
        .await?;

    let body: Value = response.json().await?;
    Ok(body
        .pointer("/data/login")
        .and_then(Value::as_bool)
        .unwrap_or(false))
}
