//! Desktop Weibo: login via the Sina profile page, probe via the mobile
//! config endpoint.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::mobile_login_state;
use crate::engine::{
    ChallengeSelectors, DEFAULT_ELEMENT_TIMEOUT, DEFAULT_OUTCOME_TIMEOUT, SiteProfile,
};
use crate::types::{CookieEntry, TokenStatus};
use crate::validator::TokenValidator;

/// Login flow for the desktop site.
///
/// The Sina profile page hides the form behind a header login toggle; a
/// successful submit shows the portrait block, confirmed by loading the
/// classic home page and checking its title.
pub fn profile() -> SiteProfile {
    SiteProfile {
        site: "weibo",
        entry_url: "https://my.sina.com.cn/profile/unlogin",
        reveal_selector: Some("#hd_login"),
        username_selector: ".loginformlist input[name=\"loginname\"]",
        password_selector: ".loginformlist input[name=\"password\"]",
        submit_selector: ".login_btn",
        success_selector: ".me_portrait_w",
        confirm_url: "https://weibo.cn/",
        confirm_title_contains: "我的首页",
        challenge: Some(ChallengeSelectors {
            image_selector: ".loginform_yzm .yzm",
            input_selector: ".loginform_yzm input[name=\"door\"]",
        }),
        element_timeout: DEFAULT_ELEMENT_TIMEOUT,
        outcome_timeout: DEFAULT_OUTCOME_TIMEOUT,
    }
}

pub struct WeiboValidator {
    client: Client,
}

impl WeiboValidator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenValidator for WeiboValidator {
    fn site_name(&self) -> &'static str {
        "weibo"
    }

    async fn validate(&self, entry: &CookieEntry) -> TokenStatus {
        match mobile_login_state(&self.client, entry).await {
            Ok(true) => TokenStatus::Valid,
            Ok(false) => TokenStatus::Invalid,
            Err(e) => {
                debug!(username = %entry.username, error = %e, "weibo probe unreachable");
                TokenStatus::Unreachable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_selectors() {
        let profile = profile();
        assert_eq!(profile.site, "weibo");
        assert_eq!(profile.reveal_selector, Some("#hd_login"));
        assert!(profile.challenge.is_some());
        assert_eq!(profile.confirm_title_contains, "我的首页");
    }
}
