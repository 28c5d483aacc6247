//! The shared login state machine.
//!
//! One engine drives every site: Reset, FormEntry, Outcome, an optional
//! single ChallengeSolving detour, then Done or Failed. A [`SiteProfile`]
//! supplies the URLs, selectors and markers; the engine supplies the flow.

pub mod profile;

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use reqwest::header::{COOKIE, USER_AGENT};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use profile::{
    ChallengeSelectors, DEFAULT_ELEMENT_TIMEOUT, DEFAULT_OUTCOME_TIMEOUT, SiteProfile,
};

use crate::DEFAULT_UA;
use crate::acquirer::Acquirer;
use crate::browser::{BrowserSession, SessionCookie};
use crate::challenge::ChallengeResolver;
use crate::error::{Result, SiteError};
use crate::types::{AcquireOutcome, CookiePayload};

/// Login engine for one site, parameterized by its profile.
pub struct LoginEngine {
    profile: SiteProfile,
    resolver: Arc<dyn ChallengeResolver>,
    http: Client,
}

impl LoginEngine {
    pub fn new(profile: SiteProfile, resolver: Arc<dyn ChallengeResolver>, http: Client) -> Self {
        Self {
            profile,
            resolver,
            http,
        }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// One full login attempt. `Ok(None)` is an ordinary failed attempt
    /// (timeout, unsolved challenge, confirmation mismatch); `Err` is a
    /// transport or automation fault. Both collapse to `Absent` at the
    /// [`Acquirer`] boundary.
    async fn run_login(
        &self,
        session: &dyn BrowserSession,
        username: &str,
        password: &str,
    ) -> Result<Option<CookiePayload>> {
        // Reset: drop prior session state, start from the entry point.
        session.delete_all_cookies().await?;
        session.navigate(self.profile.entry_url).await?;

        // FormEntry.
        if let Some(reveal) = self.profile.reveal_selector {
            self.require_visible(session, reveal).await?;
            session.click(reveal).await?;
        }
        self.require_visible(session, self.profile.username_selector)
            .await?;
        session
            .fill(self.profile.username_selector, username)
            .await?;
        self.require_visible(session, self.profile.password_selector)
            .await?;
        session
            .fill(self.profile.password_selector, password)
            .await?;
        self.require_visible(session, self.profile.submit_selector)
            .await?;
        session.click(self.profile.submit_selector).await?;

        // Outcome: success marker, challenge, or neither.
        if self.outcome_succeeded(session).await? {
            return self.confirm_and_extract(session).await;
        }

        let Some(challenge) = self.profile.challenge.clone() else {
            debug!(site = self.profile.site, "no success marker and no challenge configured");
            return Ok(None);
        };
        if !session
            .wait_visible(challenge.image_selector, self.profile.element_timeout)
            .await?
        {
            debug!(site = self.profile.site, "neither success marker nor challenge appeared");
            return Ok(None);
        }

        // ChallengeSolving: one bounded detour, never repeated.
        info!(site = self.profile.site, "challenge detected, invoking resolver");
        let image = self
            .fetch_challenge_image(session, challenge.image_selector)
            .await?;
        let Some(answer) = self.resolver.resolve(&image).await else {
            info!(site = self.profile.site, "challenge not recognized, giving up this attempt");
            return Ok(None);
        };

        self.require_visible(session, challenge.input_selector)
            .await?;
        session.fill(challenge.input_selector, &answer).await?;
        session.click(self.profile.submit_selector).await?;

        if self.outcome_succeeded(session).await? {
            return self.confirm_and_extract(session).await;
        }
        Ok(None)
    }

    async fn outcome_succeeded(&self, session: &dyn BrowserSession) -> Result<bool> {
        session
            .wait_visible(self.profile.success_selector, self.profile.outcome_timeout)
            .await
    }

    /// Confirm the login sticks on the real site, then pull the session
    /// cookies as the token payload.
    async fn confirm_and_extract(
        &self,
        session: &dyn BrowserSession,
    ) -> Result<Option<CookiePayload>> {
        session.navigate(self.profile.confirm_url).await?;
        let title = session.title().await?;
        if !title.contains(self.profile.confirm_title_contains) {
            debug!(site = self.profile.site, title = %title, "confirmation title mismatch");
            return Ok(None);
        }

        let cookies = session.cookies().await?;
        if cookies.is_empty() {
            debug!(site = self.profile.site, "no session cookies after login");
            return Ok(None);
        }
        let mut payload = CookiePayload::with_capacity(cookies.len());
        for cookie in cookies {
            payload.insert(cookie.name, cookie.value);
        }
        Ok(Some(payload))
    }

    async fn require_visible(&self, session: &dyn BrowserSession, selector: &str) -> Result<()> {
        if session
            .wait_visible(selector, self.profile.element_timeout)
            .await?
        {
            Ok(())
        } else {
            Err(SiteError::WaitTimeout(selector.to_string()))
        }
    }

    /// Fetch the challenge image, authenticated with the live session's
    /// cookies. Inline `data:` sources are decoded without a request.
    async fn fetch_challenge_image(
        &self,
        session: &dyn BrowserSession,
        image_selector: &str,
    ) -> Result<Vec<u8>> {
        let src = session
            .attribute(image_selector, "src")
            .await?
            .ok_or_else(|| SiteError::Challenge("challenge image has no src".to_string()))?;

        if let Some(data) = src.strip_prefix("data:") {
            let encoded = data
                .split_once("base64,")
                .map(|(_, tail)| tail)
                .ok_or_else(|| SiteError::Challenge("unsupported data url encoding".to_string()))?;
            return BASE64
                .decode(encoded)
                .map_err(|e| SiteError::Challenge(e.to_string()));
        }

        let url = self.absolute_url(session, &src).await?;
        let cookie_header = cookie_header_of(&session.cookies().await?);
        let mut request = self.http.get(url).header(USER_AGENT, DEFAULT_UA);
        if !cookie_header.is_empty() {
            request = request.header(COOKIE, cookie_header);
        }
        let bytes = request.send().await?.error_for_status()?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn absolute_url(&self, session: &dyn BrowserSession, src: &str) -> Result<Url> {
        if let Ok(url) = Url::parse(src) {
            return Ok(url);
        }
        let page = session.current_url().await?;
        let base = Url::parse(&page).map_err(|_| SiteError::InvalidUrl(page.clone()))?;
        base.join(src)
            .map_err(|_| SiteError::InvalidUrl(src.to_string()))
    }
}

#[async_trait]
impl Acquirer for LoginEngine {
    fn site_name(&self) -> &'static str {
        self.profile.site
    }

    #[instrument(skip(self, session, password), fields(site = self.profile.site))]
    async fn acquire(
        &self,
        session: &dyn BrowserSession,
        username: &str,
        password: &str,
    ) -> AcquireOutcome {
        match self.run_login(session, username, password).await {
            Ok(Some(payload)) => {
                info!(cookie_count = payload.len(), "login succeeded");
                AcquireOutcome::Token(payload)
            }
            Ok(None) => {
                info!("login did not complete, retrying next cycle");
                AcquireOutcome::Absent
            }
            Err(e) => {
                warn!(error = %e, "login attempt failed");
                AcquireOutcome::Absent
            }
        }
    }
}

/// Render browser cookies as a `Cookie` request-header value.
fn cookie_header_of(cookies: &[SessionCookie]) -> String {
    let mut header = String::new();
    for cookie in cookies {
        if !header.is_empty() {
            header.push_str("; ");
        }
        header.push_str(&cookie.name);
        header.push('=');
        header.push_str(&cookie.value);
    }
    header
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    fn test_profile() -> SiteProfile {
        SiteProfile {
            site: "testsite",
            entry_url: "https://login.example.com/entry",
            reveal_selector: Some("#login-toggle"),
            username_selector: "input[name=\"user\"]",
            password_selector: "input[name=\"pass\"]",
            submit_selector: ".submit",
            success_selector: ".avatar",
            confirm_url: "https://example.com/home",
            confirm_title_contains: "Home",
            challenge: Some(ChallengeSelectors {
                image_selector: ".captcha img",
                input_selector: "input[name=\"captcha\"]",
            }),
            element_timeout: Duration::from_millis(10),
            outcome_timeout: Duration::from_millis(10),
        }
    }

    #[derive(Default)]
    struct FakeState {
        visible: HashSet<String>,
        /// Visibility flips applied per click of a selector, in order.
        on_click: HashMap<String, VecDeque<Vec<(String, bool)>>>,
        attributes: HashMap<String, String>,
        titles: HashMap<String, String>,
        cookies: Vec<(String, String)>,
        current_url: String,
        clicks: Vec<String>,
        fills: Vec<(String, String)>,
        fail_navigation: bool,
    }

    #[derive(Default)]
    struct FakeSession {
        state: Mutex<FakeState>,
    }

    impl FakeSession {
        fn with(f: impl FnOnce(&mut FakeState)) -> Self {
            let session = Self::default();
            f(&mut session.state.lock().unwrap());
            session
        }

        fn clicks(&self) -> Vec<String> {
            self.state.lock().unwrap().clicks.clone()
        }

        fn fills(&self) -> Vec<(String, String)> {
            self.state.lock().unwrap().fills.clone()
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn navigate(&self, url: &str) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            if state.fail_navigation {
                return Err(SiteError::webdriver("invalid session id", "gone"));
            }
            state.current_url = url.to_string();
            Ok(())
        }

        async fn title(&self) -> Result<String> {
            let state = self.state.lock().unwrap();
            Ok(state
                .titles
                .get(&state.current_url)
                .cloned()
                .unwrap_or_default())
        }

        async fn current_url(&self) -> Result<String> {
            Ok(self.state.lock().unwrap().current_url.clone())
        }

        async fn click(&self, selector: &str) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.clicks.push(selector.to_string());
            let batch = state
                .on_click
                .get_mut(selector)
                .and_then(|batches| batches.pop_front());
            if let Some(batch) = batch {
                for (sel, shown) in batch {
                    if shown {
                        state.visible.insert(sel);
                    } else {
                        state.visible.remove(&sel);
                    }
                }
            }
            Ok(())
        }

        async fn fill(&self, selector: &str, text: &str) -> Result<()> {
            self.state
                .lock()
                .unwrap()
                .fills
                .push((selector.to_string(), text.to_string()));
            Ok(())
        }

        async fn wait_visible(&self, selector: &str, _timeout: Duration) -> Result<bool> {
            Ok(self.state.lock().unwrap().visible.contains(selector))
        }

        async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
            let key = format!("{selector}@{name}");
            Ok(self.state.lock().unwrap().attributes.get(&key).cloned())
        }

        async fn cookies(&self) -> Result<Vec<SessionCookie>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .cookies
                .iter()
                .map(|(name, value)| SessionCookie {
                    name: name.clone(),
                    value: value.clone(),
                    domain: None,
                    path: None,
                })
                .collect())
        }

        async fn delete_all_cookies(&self) -> Result<()> {
            Ok(())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    struct CountingResolver {
        answer: Option<String>,
        calls: AtomicUsize,
    }

    impl CountingResolver {
        fn new(answer: Option<&str>) -> Self {
            Self {
                answer: answer.map(str::to_string),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChallengeResolver for CountingResolver {
        async fn resolve(&self, _image: &[u8]) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn engine_with(resolver: Arc<CountingResolver>) -> LoginEngine {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        LoginEngine::new(test_profile(), resolver, Client::new())
    }

    fn form_visible(state: &mut FakeState) {
        for sel in [
            "#login-toggle",
            "input[name=\"user\"]",
            "input[name=\"pass\"]",
            ".submit",
        ] {
            state.visible.insert(sel.to_string());
        }
    }

    #[tokio::test]
    async fn test_plain_success_extracts_cookies() {
        let resolver = Arc::new(CountingResolver::new(None));
        let engine = engine_with(resolver.clone());

        let session = FakeSession::with(|state| {
            form_visible(state);
            state.on_click.insert(
                ".submit".to_string(),
                VecDeque::from([vec![(".avatar".to_string(), true)]]),
            );
            state
                .titles
                .insert("https://example.com/home".to_string(), "Home - test".to_string());
            state.cookies = vec![("sid".to_string(), "123".to_string())];
        });

        let outcome = engine.acquire(&session, "alice", "secret").await;
        match outcome {
            AcquireOutcome::Token(payload) => assert_eq!(payload["sid"], "123"),
            other => panic!("expected token, got {other:?}"),
        }
        assert_eq!(resolver.calls(), 0);
        assert!(
            session
                .fills()
                .contains(&("input[name=\"user\"]".to_string(), "alice".to_string()))
        );
    }

    #[tokio::test]
    async fn test_timeout_with_no_indicators_is_absent() {
        let resolver = Arc::new(CountingResolver::new(Some("abcd")));
        let engine = engine_with(resolver.clone());

        let session = FakeSession::with(form_visible);

        let outcome = engine.acquire(&session, "alice", "secret").await;
        assert_eq!(outcome, AcquireOutcome::Absent);
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_challenge_solved_then_success() {
        let resolver = Arc::new(CountingResolver::new(Some("abcd")));
        let engine = engine_with(resolver.clone());

        let session = FakeSession::with(|state| {
            form_visible(state);
            state.visible.insert("input[name=\"captcha\"]".to_string());
            // First submit reveals the challenge, second reveals success.
            state.on_click.insert(
                ".submit".to_string(),
                VecDeque::from([
                    vec![(".captcha img".to_string(), true)],
                    vec![(".avatar".to_string(), true)],
                ]),
            );
            state.attributes.insert(
                ".captcha img@src".to_string(),
                format!("data:image/png;base64,{}", BASE64.encode(b"imagebytes")),
            );
            state
                .titles
                .insert("https://example.com/home".to_string(), "Home - test".to_string());
            state.cookies = vec![("sid".to_string(), "456".to_string())];
        });

        let outcome = engine.acquire(&session, "alice", "secret").await;
        assert!(outcome.is_token());
        assert_eq!(resolver.calls(), 1);
        assert_eq!(
            session.clicks().iter().filter(|c| *c == ".submit").count(),
            2
        );
        assert!(
            session
                .fills()
                .contains(&("input[name=\"captcha\"]".to_string(), "abcd".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unrecognized_challenge_is_absent() {
        let resolver = Arc::new(CountingResolver::new(None));
        let engine = engine_with(resolver.clone());

        let session = FakeSession::with(|state| {
            form_visible(state);
            state.on_click.insert(
                ".submit".to_string(),
                VecDeque::from([vec![(".captcha img".to_string(), true)]]),
            );
            state.attributes.insert(
                ".captcha img@src".to_string(),
                format!("data:image/png;base64,{}", BASE64.encode(b"imagebytes")),
            );
        });

        let outcome = engine.acquire(&session, "alice", "secret").await;
        assert_eq!(outcome, AcquireOutcome::Absent);
        assert_eq!(resolver.calls(), 1);
        // The answer field is never filled on resolver failure.
        assert!(
            !session
                .fills()
                .iter()
                .any(|(sel, _)| sel == "input[name=\"captcha\"]")
        );
    }

    #[tokio::test]
    async fn test_resolver_invoked_at_most_once_per_acquire() {
        let resolver = Arc::new(CountingResolver::new(Some("abcd")));
        let engine = engine_with(resolver.clone());

        // Challenge appears, answer accepted, but success never shows:
        // the engine must not re-enter the challenge detour.
        let session = FakeSession::with(|state| {
            form_visible(state);
            state.visible.insert("input[name=\"captcha\"]".to_string());
            state.on_click.insert(
                ".submit".to_string(),
                VecDeque::from([vec![(".captcha img".to_string(), true)]]),
            );
            state.attributes.insert(
                ".captcha img@src".to_string(),
                format!("data:image/png;base64,{}", BASE64.encode(b"imagebytes")),
            );
        });

        let outcome = engine.acquire(&session, "alice", "secret").await;
        assert_eq!(outcome, AcquireOutcome::Absent);
        assert_eq!(resolver.calls(), 1);
        assert_eq!(
            session.clicks().iter().filter(|c| *c == ".submit").count(),
            2
        );
    }

    #[tokio::test]
    async fn test_confirmation_mismatch_is_absent() {
        let resolver = Arc::new(CountingResolver::new(None));
        let engine = engine_with(resolver.clone());

        let session = FakeSession::with(|state| {
            form_visible(state);
            state.on_click.insert(
                ".submit".to_string(),
                VecDeque::from([vec![(".avatar".to_string(), true)]]),
            );
            // Confirmation page answers with a login page title.
            state
                .titles
                .insert("https://example.com/home".to_string(), "Sign in".to_string());
            state.cookies = vec![("sid".to_string(), "123".to_string())];
        });

        let outcome = engine.acquire(&session, "alice", "secret").await;
        assert_eq!(outcome, AcquireOutcome::Absent);
    }

    #[tokio::test]
    async fn test_session_fault_maps_to_absent() {
        let resolver = Arc::new(CountingResolver::new(None));
        let engine = engine_with(resolver.clone());

        let session = FakeSession::with(|state| {
            state.fail_navigation = true;
        });

        let outcome = engine.acquire(&session, "alice", "secret").await;
        assert_eq!(outcome, AcquireOutcome::Absent);
    }

    #[tokio::test]
    async fn test_challenge_image_src_resolution() {
        let engine = engine_with(Arc::new(CountingResolver::new(None)));

        let session = FakeSession::with(|state| {
            state.current_url = "https://login.example.com/entry".to_string();
        });

        // A relative src resolves against the page the session is on.
        let resolved = engine
            .absolute_url(&session, "/cgi/captcha.png")
            .await
            .unwrap();
        assert_eq!(
            resolved.as_str(),
            "https://login.example.com/cgi/captcha.png"
        );

        // An absolute src passes through untouched.
        let resolved = engine
            .absolute_url(&session, "https://img.example.com/c.png")
            .await
            .unwrap();
        assert_eq!(resolved.as_str(), "https://img.example.com/c.png");
    }

    #[tokio::test]
    async fn test_relative_src_without_parsable_page_is_an_error() {
        let engine = engine_with(Arc::new(CountingResolver::new(None)));

        // current_url stays empty, so there is no base to join against.
        let session = FakeSession::default();

        let err = engine
            .absolute_url(&session, "/cgi/captcha.png")
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::InvalidUrl(_)));
    }

    #[test]
    fn test_cookie_header_of() {
        let cookies = vec![
            SessionCookie {
                name: "a".to_string(),
                value: "1".to_string(),
                domain: None,
                path: None,
            },
            SessionCookie {
                name: "b".to_string(),
                value: "2".to_string(),
                domain: None,
                path: None,
            },
        ];
        assert_eq!(cookie_header_of(&cookies), "a=1; b=2");
        assert_eq!(cookie_header_of(&[]), "");
    }
}
