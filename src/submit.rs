//! Fire-and-forget score submission
//!
//! At the end of a run the final score is posted to the hosting service.
//! The request runs on its own; the only thing gameplay ever sees is the
//! `SubmissionStatus` flag.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::{API_BASE_URL_KEY, CAMPAIGN_ID_KEY, GAME_ID_KEY, KeyValueStore};

/// Request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub score: u64,
    pub campaign_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Pending,
    ScoreAdded,
    Failed,
}

impl SubmissionStatus {
    /// Value mirrored to the `game_state` key for the hosting page
    pub fn storage_value(self) -> Option<&'static str> {
        match self {
            SubmissionStatus::ScoreAdded => Some("score-added"),
            SubmissionStatus::Failed => Some("error-score"),
            SubmissionStatus::Idle | SubmissionStatus::Pending => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("could not encode submission: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no browser window")]
    NoWindow,
    #[error("request failed: {0}")]
    Request(String),
    #[error("server answered {0}")]
    Status(u16),
}

/// Where scores go, as configured by the hosting page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitTarget {
    pub base_url: String,
    pub game_id: String,
    pub campaign_id: Option<String>,
}

impl SubmitTarget {
    /// Read the page-provided keys; missing values become empty strings
    pub fn from_store<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let get = |key: &str| store.get(key).ok().flatten();
        Self {
            base_url: get(API_BASE_URL_KEY).unwrap_or_default(),
            game_id: get(GAME_ID_KEY).unwrap_or_default(),
            campaign_id: get(CAMPAIGN_ID_KEY),
        }
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/api/gameservice/{}/score-reg",
            self.base_url.trim_end_matches('/'),
            self.game_id
        )
    }

    pub fn submission(&self, score: u64) -> ScoreSubmission {
        ScoreSubmission {
            score,
            campaign_id: self.campaign_id.clone(),
        }
    }
}

/// Find a cookie's raw value in a `document.cookie` string
pub fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies
        .split("; ")
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}

/// Hands a final score to the outside world without blocking
pub trait ScoreSubmitter {
    fn submit(&mut self, target: &SubmitTarget, submission: ScoreSubmission);
    fn status(&self) -> SubmissionStatus;
}

/// Native submitter: logs the request it would send
#[derive(Debug, Default)]
pub struct LogSubmitter {
    pub sent: Vec<(String, ScoreSubmission)>,
    status: Rc<Cell<SubmissionStatus>>,
}

impl LogSubmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreSubmitter for LogSubmitter {
    fn submit(&mut self, target: &SubmitTarget, submission: ScoreSubmission) {
        let url = target.endpoint();
        match serde_json::to_string(&submission) {
            Ok(body) => {
                log::info!("POST {url} {body}");
                self.status.set(SubmissionStatus::ScoreAdded);
            }
            Err(e) => {
                log::error!("Error adding score: {e}");
                self.status.set(SubmissionStatus::Failed);
            }
        }
        self.sent.push((url, submission));
    }

    fn status(&self) -> SubmissionStatus {
        self.status.get()
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::FetchSubmitter;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::Cell;
    use std::rc::Rc;

    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Headers, HtmlDocument, Request, RequestInit, Response};

    use super::{ScoreSubmission, ScoreSubmitter, SubmissionStatus, SubmitError, SubmitTarget};
    use crate::persistence::{GAME_STATE_KEY, KeyValueStore, LocalStorage};

    impl From<JsValue> for SubmitError {
        fn from(value: JsValue) -> Self {
            SubmitError::Request(format!("{value:?}"))
        }
    }

    /// Browser submitter: POSTs with the page's bearer token
    #[derive(Debug, Default)]
    pub struct FetchSubmitter {
        status: Rc<Cell<SubmissionStatus>>,
    }

    impl FetchSubmitter {
        pub fn new() -> Self {
            Self::default()
        }
    }

    fn access_token() -> Option<String> {
        let document: HtmlDocument = web_sys::window()?.document()?.dyn_into().ok()?;
        let cookies = document.cookie().ok()?;
        let raw = super::cookie_value(&cookies, "accessToken")?;
        js_sys::decode_uri_component(raw).ok().map(String::from)
    }

    async fn post_score(
        url: &str,
        token: Option<&str>,
        submission: &ScoreSubmission,
    ) -> Result<(), SubmitError> {
        let body = serde_json::to_string(submission)?;

        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        headers.set("Authorization", &format!("Bearer {}", token.unwrap_or("null")))?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_headers(&headers);
        opts.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(url, &opts)?;
        let window = web_sys::window().ok_or(SubmitError::NoWindow)?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await?
            .dyn_into()?;

        if !response.ok() {
            return Err(SubmitError::Status(response.status()));
        }
        Ok(())
    }

    impl ScoreSubmitter for FetchSubmitter {
        fn submit(&mut self, target: &SubmitTarget, submission: ScoreSubmission) {
            self.status.set(SubmissionStatus::Pending);
            let status = self.status.clone();
            let url = target.endpoint();
            let token = access_token();

            wasm_bindgen_futures::spawn_local(async move {
                let next = match post_score(&url, token.as_deref(), &submission).await {
                    Ok(()) => {
                        log::info!("Score {} submitted", submission.score);
                        SubmissionStatus::ScoreAdded
                    }
                    Err(e) => {
                        log::error!("Error adding score: {e}");
                        SubmissionStatus::Failed
                    }
                };
                status.set(next);

                if let (Some(value), Ok(mut storage)) = (next.storage_value(), LocalStorage::open()) {
                    if let Err(e) = storage.set(GAME_STATE_KEY, value) {
                        log::warn!("Could not record submission state: {e}");
                    }
                }
            });
        }

        fn status(&self) -> SubmissionStatus {
            self.status.get()
        }
    }
}
