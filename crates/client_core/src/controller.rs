//! Submission workflow for the translation form: validate, dispatch, render.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use shared::{
    domain::{text_units, OutputFormat, MAX_TEXT_UNITS},
    protocol::{TranslationRequest, TranslationResponse},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::ClientSettings,
    error::{ConfigError, SubmissionError},
    events::{Disposer, FormEvents, SubmitEvent},
    messages::{Locale, MessageKey},
    resolve_document_url,
    view::FormView,
    TranslationApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    pub as_word: bool,
    pub include_vocabulary: bool,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            as_word: false,
            include_vocabulary: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Result(TranslationResponse),
    Error(SubmissionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Translated(TranslationResponse),
    Failed(SubmissionError),
    /// A newer submission was attempted before this one settled; nothing was rendered.
    Superseded { token: u64 },
}

pub struct FormSubmissionController {
    api: Arc<dyn TranslationApi>,
    view: FormView,
    locale: Locale,
    max_input_units: usize,
    document_base: Option<Url>,
    latest_token: AtomicU64,
    state: Mutex<UiState>,
}

/// Leaves the loading state when dropped, unless a newer submission owns it.
struct LoadingGuard<'a> {
    controller: &'a FormSubmissionController,
    token: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.controller.is_latest(self.token) {
            self.controller.end_loading();
        }
    }
}

impl FormSubmissionController {
    pub fn new(api: Arc<dyn TranslationApi>, view: FormView) -> Self {
        let controller = Self {
            api,
            view,
            locale: Locale::default(),
            max_input_units: MAX_TEXT_UNITS,
            document_base: None,
            latest_token: AtomicU64::new(0),
            state: Mutex::new(UiState::Idle),
        };
        controller.end_loading();
        controller
    }

    pub fn from_settings(
        api: Arc<dyn TranslationApi>,
        view: FormView,
        settings: &ClientSettings,
    ) -> Result<Self, ConfigError> {
        let base = settings.server_base()?;
        Ok(Self::new(api, view)
            .with_locale(settings.locale)
            .with_max_input_units(settings.max_input_chars)
            .with_document_base(base))
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self.view
            .trigger
            .set_label(self.locale.text(MessageKey::TriggerIdle));
        self
    }

    pub fn with_max_input_units(mut self, max_input_units: usize) -> Self {
        self.max_input_units = max_input_units;
        self
    }

    /// Relative document links in responses are resolved against this base.
    pub fn with_document_base(mut self, base: Url) -> Self {
        self.document_base = Some(base);
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn state(&self) -> UiState {
        self.lock_state().clone()
    }

    /// Token of the most recent submission attempt; 0 before the first one.
    pub fn latest_token(&self) -> u64 {
        self.latest_token.load(Ordering::SeqCst)
    }

    pub async fn submit(&self, raw_text: &str, options: SubmitOptions) -> SubmissionOutcome {
        // Every attempt supersedes whatever is still in flight, valid or not.
        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        let output_format = OutputFormat::from_word_flag(options.as_word);
        let request = match TranslationRequest::new(
            raw_text,
            output_format,
            options.include_vocabulary,
            self.max_input_units,
        ) {
            Ok(request) => request,
            Err(err) => {
                let err = SubmissionError::from(err);
                warn!(token, error = %err, "submission rejected before dispatch");
                self.end_loading();
                self.view.result.set_visible(false);
                self.fail(err.clone());
                return SubmissionOutcome::Failed(err);
            }
        };

        self.begin_loading();
        let _loading = LoadingGuard {
            controller: self,
            token,
        };

        info!(
            token,
            output_format = output_format.as_str(),
            include_vocabulary = request.include_vocabulary,
            text_units = text_units(&request.text),
            "dispatching translation request"
        );
        let result = self.api.translate(&request).await;

        if !self.is_latest(token) {
            debug!(
                token,
                latest = self.latest_token(),
                "discarding response from superseded submission"
            );
            return SubmissionOutcome::Superseded { token };
        }

        match result {
            Err(err) => {
                warn!(token, error = %err, "translation request failed in transport");
                let err = SubmissionError::NetworkFailure(err.to_string());
                self.fail(err.clone());
                SubmissionOutcome::Failed(err)
            }
            Ok(response) if response.success => {
                info!(
                    token,
                    vocabulary = response.vocabulary().len(),
                    has_document = response.word_document_url.is_some(),
                    "translation succeeded"
                );
                self.render_result(&response);
                self.set_state(UiState::Result(response.clone()));
                SubmissionOutcome::Translated(response)
            }
            Ok(response) => {
                let message = response
                    .error
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| self.locale.text(MessageKey::TranslationFailed).to_string());
                warn!(token, error = %message, "translation service reported failure");
                let err = SubmissionError::ApiFailure(message);
                self.fail(err.clone());
                SubmissionOutcome::Failed(err)
            }
        }
    }

    pub fn render_result(&self, response: &TranslationResponse) {
        self.view
            .output
            .set_text(response.translation.as_deref().unwrap_or_default());

        if let Some(vocabulary) = &self.view.vocabulary {
            vocabulary.table.clear();
            let entries = response.vocabulary();
            for entry in entries {
                vocabulary.table.append_row(entry);
            }
            vocabulary.section.set_visible(!entries.is_empty());
        }

        if let Some(download) = &self.view.download {
            match response.word_document_url.as_deref() {
                Some(raw) => {
                    download.link.set_href(&self.document_href(raw));
                    download.section.set_visible(true);
                }
                None => download.section.set_visible(false),
            }
        }

        self.view.result.set_visible(true);
    }

    pub fn render_error(&self, message: &str) {
        self.view.error.set_text(message);
        self.view.error.set_visible(true);
    }

    /// Registers this controller's [`submit`](Self::submit) on `events`.
    pub fn attach(self: &Arc<Self>, events: &FormEvents) -> Disposer {
        let controller = Arc::clone(self);
        events.on_submit(move |event: SubmitEvent| {
            let controller = Arc::clone(&controller);
            async move {
                controller.submit(&event.text, event.options).await;
            }
        })
    }

    fn document_href(&self, raw: &str) -> String {
        let Some(base) = &self.document_base else {
            return raw.to_string();
        };
        match resolve_document_url(base, raw) {
            Ok(url) => url.to_string(),
            Err(err) => {
                warn!(url = raw, error = %err, "could not resolve document url");
                raw.to_string()
            }
        }
    }

    fn fail(&self, err: SubmissionError) {
        self.render_error(&self.locale.describe(&err));
        self.set_state(UiState::Error(err));
    }

    fn begin_loading(&self) {
        self.view.trigger.set_enabled(false);
        self.view
            .trigger
            .set_label(self.locale.text(MessageKey::TriggerBusy));
        self.view.loading.set_visible(true);
        self.view.result.set_visible(false);
        self.view.error.set_visible(false);
        self.set_state(UiState::Loading);
    }

    fn end_loading(&self) {
        self.view.loading.set_visible(false);
        self.view.trigger.set_enabled(true);
        self.view
            .trigger
            .set_label(self.locale.text(MessageKey::TriggerIdle));
        let mut state = self.lock_state();
        if *state == UiState::Loading {
            *state = UiState::Idle;
        }
    }

    fn is_latest(&self, token: u64) -> bool {
        self.latest_token.load(Ordering::SeqCst) == token
    }

    fn set_state(&self, state: UiState) {
        *self.lock_state() = state;
    }

    fn lock_state(&self) -> MutexGuard<'_, UiState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
