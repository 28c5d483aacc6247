//! Mobile Weibo: same Sina login form as the desktop flow, confirmed
//! against the mobile home page instead.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::mobile_login_state;
use crate::engine::{
    ChallengeSelectors, DEFAULT_ELEMENT_TIMEOUT, DEFAULT_OUTCOME_TIMEOUT, SiteProfile,
};
use crate::types::{CookieEntry, TokenStatus};
use crate::validator::TokenValidator;

pub fn profile() -> SiteProfile {
    SiteProfile {
        site: "mweibo",
        entry_url: "https://my.sina.com.cn/profile/unlogin",
        reveal_selector: Some("#hd_login"),
        username_selector: ".loginformlist input[name=\"loginname\"]",
        password_selector: ".loginformlist input[name=\"password\"]",
        submit_selector: ".login_btn",
        success_selector: ".me_portrait_w",
        confirm_url: "https://m.weibo.cn/",
        confirm_title_contains: "微博",
        challenge: Some(ChallengeSelectors {
            image_selector: ".loginform_yzm .yzm",
            input_selector: ".loginform_yzm input[name=\"door\"]",
        }),
        element_timeout: DEFAULT_ELEMENT_TIMEOUT,
        outcome_timeout: DEFAULT_OUTCOME_TIMEOUT,
    }
}

pub struct MWeiboValidator {
    client: Client,
}

impl MWeiboValidator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenValidator for MWeiboValidator {
    fn site_name(&self) -> &'static str {
        "mweibo"
    }

    async fn validate(&self, entry: &CookieEntry) -> TokenStatus {
        match mobile_login_state(&self.client, entry).await {
            Ok(true) => TokenStatus::Valid,
            Ok(false) => TokenStatus::Invalid,
            Err(e) => {
                debug!(username = %entry.username, error = %e, "mweibo probe unreachable");
                TokenStatus::Unreachable
            }
        }
    }
}
