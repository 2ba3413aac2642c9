use super::*;
use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use shared::{domain::VocabularyEntry, protocol::HealthStatus};
use tokio::sync::oneshot;

use crate::{error::TransportError, view::memory::MemoryForm};

type Scripted = Result<TranslationResponse, TransportError>;

#[derive(Default)]
struct ScriptedApi {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<TranslationRequest>>,
}

impl ScriptedApi {
    fn with(responses: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<TranslationRequest> {
        self.calls.lock().expect("calls").clone()
    }
}

#[async_trait]
impl TranslationApi for ScriptedApi {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, TransportError> {
        self.calls.lock().expect("calls").push(request.clone());
        self.responses
            .lock()
            .expect("responses")
            .pop_front()
            .expect("unscripted translate call")
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        unreachable!("controller never checks health")
    }

    async fn download_document(&self, _url: &str) -> Result<Vec<u8>, TransportError> {
        unreachable!("controller never downloads")
    }
}

/// Each call parks until the test releases the matching gate.
#[derive(Default)]
struct GatedApi {
    gates: tokio::sync::Mutex<VecDeque<oneshot::Receiver<Scripted>>>,
    calls: Mutex<Vec<TranslationRequest>>,
}

impl GatedApi {
    fn new(count: usize) -> (Arc<Self>, Vec<oneshot::Sender<Scripted>>) {
        let mut senders = Vec::new();
        let mut receivers = VecDeque::new();
        for _ in 0..count {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        let api = Arc::new(Self {
            gates: tokio::sync::Mutex::new(receivers),
            calls: Mutex::new(Vec::new()),
        });
        (api, senders)
    }

    fn call_count(&self) -> usize {
        self.calls.lock().expect("calls").len()
    }

    async fn wait_for_calls(&self, n: usize) {
        for _ in 0..200 {
            if self.call_count() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {n} translate calls, saw {}", self.call_count());
    }
}

#[async_trait]
impl TranslationApi for GatedApi {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, TransportError> {
        let gate = self.gates.lock().await.pop_front().expect("gate");
        self.calls.lock().expect("calls").push(request.clone());
        gate.await.expect("gate released")
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        unreachable!("controller never checks health")
    }

    async fn download_document(&self, _url: &str) -> Result<Vec<u8>, TransportError> {
        unreachable!("controller never downloads")
    }
}

fn success(translation: &str, vocabulary: Vec<VocabularyEntry>) -> TranslationResponse {
    TranslationResponse {
        success: true,
        translation: Some(translation.to_string()),
        vocabulary: Some(vocabulary),
        ..Default::default()
    }
}

fn api_failure(error: Option<&str>) -> TranslationResponse {
    TranslationResponse {
        success: false,
        error: error.map(str::to_string),
        ..Default::default()
    }
}

fn transport_failure() -> TransportError {
    TransportError::Status {
        status: 502,
        message: "connection reset by peer".to_string(),
    }
}

fn controller_for(api: Arc<dyn TranslationApi>, form: &MemoryForm) -> FormSubmissionController {
    FormSubmissionController::new(api, form.view())
}

fn assert_settled(form: &MemoryForm) {
    assert!(!form.loading.is_visible(), "loading indicator still shown");
    assert!(form.trigger.is_enabled(), "submit trigger still disabled");
    assert_eq!(form.trigger.label(), "Translate");
}

#[tokio::test]
async fn empty_input_fails_without_network_call() {
    let api = ScriptedApi::with(Vec::new());
    let form = MemoryForm::new();
    let controller = controller_for(api.clone(), &form);

    let outcome = controller.submit("   \n\t ", SubmitOptions::default()).await;

    assert_eq!(outcome, SubmissionOutcome::Failed(SubmissionError::EmptyInput));
    assert!(api.calls().is_empty());
    assert!(form.error.is_visible());
    assert_eq!(form.error.text(), "empty input");
    assert!(!form.result.is_visible());
    assert_eq!(controller.state(), UiState::Error(SubmissionError::EmptyInput));
    assert_eq!(controller.latest_token(), 1);
    assert_settled(&form);
}

#[tokio::test]
async fn oversized_input_fails_without_network_call() {
    let api = ScriptedApi::with(Vec::new());
    let form = MemoryForm::new();
    let controller = controller_for(api.clone(), &form);

    let outcome = controller
        .submit(&"a".repeat(8001), SubmitOptions::default())
        .await;

    assert_eq!(
        outcome,
        SubmissionOutcome::Failed(SubmissionError::InputTooLong {
            len: 8001,
            max: 8000
        })
    );
    assert!(api.calls().is_empty());
    assert_eq!(form.error.text(), "input too long (max 8000 characters)");
    assert!(form.error.is_visible());
}

#[tokio::test]
async fn sends_trimmed_text_with_selected_options() {
    let api = ScriptedApi::with(vec![
        Ok(success("一", Vec::new())),
        Ok(success("二", Vec::new())),
    ]);
    let form = MemoryForm::new();
    let controller = controller_for(api.clone(), &form);

    controller
        .submit(
            "  Machine learning \n",
            SubmitOptions {
                as_word: true,
                include_vocabulary: false,
            },
        )
        .await;
    controller
        .submit("Neural network", SubmitOptions::default())
        .await;

    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].text, "Machine learning");
    assert_eq!(calls[0].output_format, OutputFormat::Word);
    assert!(!calls[0].include_vocabulary);
    assert_eq!(calls[1].output_format, OutputFormat::Json);
    assert!(calls[1].include_vocabulary);
    assert_eq!(controller.latest_token(), 2);
}

#[tokio::test]
async fn hello_world_renders_translation_and_hides_optional_sections() {
    let api = ScriptedApi::with(vec![Ok(success("你好世界", Vec::new()))]);
    let form = MemoryForm::new();
    let controller = controller_for(api, &form);

    let outcome = controller
        .submit("Hello world", SubmitOptions::default())
        .await;

    assert!(matches!(outcome, SubmissionOutcome::Translated(_)));
    assert_eq!(form.output.text(), "你好世界");
    assert!(form.result.is_visible());
    assert!(!form.vocabulary_section.is_visible());
    assert!(!form.download_section.is_visible());
    assert!(!form.error.is_visible());
    assert!(matches!(controller.state(), UiState::Result(_)));
    assert_settled(&form);
}

#[tokio::test]
async fn vocabulary_rows_follow_response_order() {
    let entries = vec![
        VocabularyEntry::new("machine learning", "机器学习", "learning from data"),
        VocabularyEntry::new("artificial intelligence", "人工智能", "machines that reason"),
        VocabularyEntry::new("subset", "子集", "part of a larger set"),
    ];
    let api = ScriptedApi::with(vec![Ok(success("机器学习是人工智能的一个子集。", entries.clone()))]);
    let form = MemoryForm::new();
    let controller = controller_for(api, &form);

    controller
        .submit(
            "Machine learning is a subset of artificial intelligence.",
            SubmitOptions::default(),
        )
        .await;

    assert_eq!(form.vocabulary_table.rows(), entries);
    assert!(form.vocabulary_section.is_visible());
}

#[tokio::test]
async fn table_is_rebuilt_on_each_result() {
    let first = vec![
        VocabularyEntry::new("a", "甲", "x"),
        VocabularyEntry::new("b", "乙", "y"),
    ];
    let api = ScriptedApi::with(vec![
        Ok(success("一", first)),
        Ok(TranslationResponse {
            success: true,
            translation: Some("二".into()),
            ..Default::default()
        }),
    ]);
    let form = MemoryForm::new();
    let controller = controller_for(api, &form);

    controller.submit("one", SubmitOptions::default()).await;
    assert_eq!(form.vocabulary_table.rows().len(), 2);

    controller.submit("two", SubmitOptions::default()).await;
    assert!(form.vocabulary_table.rows().is_empty());
    assert!(!form.vocabulary_section.is_visible());
}

#[tokio::test]
async fn document_link_is_resolved_against_server_base() {
    let mut response = success("文档", Vec::new());
    response.word_document_url = Some("downloads/translation_20240501_102030_ab12cd34.docx".into());
    let api = ScriptedApi::with(vec![Ok(response)]);
    let form = MemoryForm::new();
    let controller = FormSubmissionController::from_settings(
        api,
        form.view(),
        &ClientSettings::default(),
    )
    .expect("controller");

    controller
        .submit(
            "Document please",
            SubmitOptions {
                as_word: true,
                include_vocabulary: true,
            },
        )
        .await;

    assert!(form.download_section.is_visible());
    assert_eq!(
        form.download_link.href().as_deref(),
        Some("http://127.0.0.1:5000/downloads/translation_20240501_102030_ab12cd34.docx")
    );
}

#[tokio::test]
async fn api_failure_shows_server_message_or_default() {
    let api = ScriptedApi::with(vec![
        Ok(api_failure(Some("处理失败: upstream unavailable"))),
        Ok(api_failure(None)),
        Ok(api_failure(Some(""))),
    ]);
    let form = MemoryForm::new();
    let controller = controller_for(api, &form);

    controller.submit("first", SubmitOptions::default()).await;
    assert_eq!(form.error.text(), "处理失败: upstream unavailable");
    assert!(form.error.is_visible());
    assert!(!form.result.is_visible());

    let outcome = controller.submit("second", SubmitOptions::default()).await;
    assert_eq!(
        outcome,
        SubmissionOutcome::Failed(SubmissionError::ApiFailure("translation failed".into()))
    );
    assert_eq!(form.error.text(), "translation failed");

    controller.submit("third", SubmitOptions::default()).await;
    assert_eq!(form.error.text(), "translation failed");
    assert!(!form.result.is_visible());
}

#[tokio::test]
async fn transport_failure_is_reported_as_network_error() {
    let api = ScriptedApi::with(vec![Err(transport_failure())]);
    let form = MemoryForm::new();
    let controller = controller_for(api, &form);

    let outcome = controller.submit("Hello", SubmitOptions::default()).await;

    let err = match outcome {
        SubmissionOutcome::Failed(err) => err,
        other => panic!("expected failure, got {other:?}"),
    };
    assert_eq!(err.category(), crate::ErrorCategory::Transport);
    assert_eq!(
        form.error.text(),
        "network error: server returned 502: connection reset by peer"
    );
    assert!(!form.result.is_visible());
}

#[tokio::test]
async fn loading_settles_after_every_outcome() {
    let api = ScriptedApi::with(vec![
        Ok(success("好", Vec::new())),
        Ok(api_failure(Some("bad"))),
        Err(transport_failure()),
    ]);
    let form = MemoryForm::new();
    let controller = controller_for(api, &form);

    for text in ["success", "api failure", "transport failure"] {
        controller.submit(text, SubmitOptions::default()).await;
        assert_settled(&form);
    }
}

#[tokio::test]
async fn failure_after_success_hides_previous_result() {
    let api = ScriptedApi::with(vec![
        Ok(success("好", Vec::new())),
        Ok(api_failure(Some("bad"))),
    ]);
    let form = MemoryForm::new();
    let controller = controller_for(api, &form);

    controller.submit("ok", SubmitOptions::default()).await;
    assert!(form.result.is_visible());

    controller.submit("not ok", SubmitOptions::default()).await;
    assert!(!form.result.is_visible());
    assert!(form.error.is_visible());
}

#[tokio::test]
async fn validation_error_after_success_hides_previous_result() {
    let api = ScriptedApi::with(vec![Ok(success("好", Vec::new()))]);
    let form = MemoryForm::new();
    let controller = controller_for(api, &form);

    controller.submit("ok", SubmitOptions::default()).await;
    controller.submit("", SubmitOptions::default()).await;

    assert!(!form.result.is_visible());
    assert!(form.error.is_visible());
}

#[tokio::test]
async fn success_after_failure_hides_error() {
    let api = ScriptedApi::with(vec![
        Err(transport_failure()),
        Ok(success("好", Vec::new())),
    ]);
    let form = MemoryForm::new();
    let controller = controller_for(api, &form);

    controller.submit("first", SubmitOptions::default()).await;
    assert!(form.error.is_visible());

    controller.submit("second", SubmitOptions::default()).await;
    assert!(!form.error.is_visible());
    assert!(form.result.is_visible());
}

#[tokio::test]
async fn renders_without_optional_regions() {
    let mut response = success("好", vec![VocabularyEntry::new("good", "好", "fine")]);
    response.word_document_url = Some("downloads/file.docx".into());
    let api = ScriptedApi::with(vec![Ok(response)]);
    let form = MemoryForm::new();
    let controller = FormSubmissionController::new(api, form.minimal_view());

    controller.submit("good", SubmitOptions::default()).await;

    assert_eq!(form.output.text(), "好");
    assert!(form.result.is_visible());
    assert!(form.vocabulary_table.rows().is_empty());
    assert!(form.download_link.href().is_none());
}

#[tokio::test]
async fn trigger_is_disabled_while_request_is_in_flight() {
    let (api, mut gates) = GatedApi::new(1);
    let form = MemoryForm::new();
    let controller = Arc::new(controller_for(api.clone(), &form));

    let task = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit("Hello", SubmitOptions::default()).await })
    };
    api.wait_for_calls(1).await;

    assert!(form.loading.is_visible());
    assert!(!form.trigger.is_enabled());
    assert_eq!(form.trigger.label(), "Translating...");
    assert!(!form.result.is_visible());
    assert!(!form.error.is_visible());
    assert_eq!(controller.state(), UiState::Loading);

    gates
        .remove(0)
        .send(Ok(success("你好", Vec::new())))
        .expect("release");
    task.await.expect("join");
    assert_settled(&form);
}

#[tokio::test]
async fn stale_response_is_discarded() {
    let (api, mut gates) = GatedApi::new(2);
    let form = MemoryForm::new();
    let controller = Arc::new(controller_for(api.clone(), &form));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit("first", SubmitOptions::default()).await })
    };
    api.wait_for_calls(1).await;
    let second = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit("second", SubmitOptions::default()).await })
    };
    api.wait_for_calls(2).await;

    let second_gate = gates.remove(1);
    let first_gate = gates.remove(0);

    second_gate
        .send(Ok(success("第二", Vec::new())))
        .expect("release second");
    let second_outcome = second.await.expect("join second");
    assert!(matches!(second_outcome, SubmissionOutcome::Translated(_)));

    first_gate
        .send(Ok(success("第一", Vec::new())))
        .expect("release first");
    let first_outcome = first.await.expect("join first");

    assert_eq!(first_outcome, SubmissionOutcome::Superseded { token: 1 });
    assert_eq!(form.output.text(), "第二");
    assert_settled(&form);
}

#[tokio::test]
async fn stale_completion_leaves_newer_request_loading() {
    let (api, mut gates) = GatedApi::new(2);
    let form = MemoryForm::new();
    let controller = Arc::new(controller_for(api.clone(), &form));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit("first", SubmitOptions::default()).await })
    };
    api.wait_for_calls(1).await;
    let second = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit("second", SubmitOptions::default()).await })
    };
    api.wait_for_calls(2).await;

    let second_gate = gates.remove(1);
    let first_gate = gates.remove(0);

    first_gate
        .send(Err(transport_failure()))
        .expect("release first");
    assert_eq!(
        first.await.expect("join first"),
        SubmissionOutcome::Superseded { token: 1 }
    );
    assert!(form.loading.is_visible());
    assert!(!form.trigger.is_enabled());
    assert!(!form.error.is_visible());

    second_gate
        .send(Ok(success("第二", Vec::new())))
        .expect("release second");
    second.await.expect("join second");
    assert_eq!(form.output.text(), "第二");
    assert_settled(&form);
}

#[tokio::test]
async fn validation_failure_supersedes_in_flight_request() {
    let (api, mut gates) = GatedApi::new(1);
    let form = MemoryForm::new();
    let controller = Arc::new(controller_for(api.clone(), &form));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit("first", SubmitOptions::default()).await })
    };
    api.wait_for_calls(1).await;

    let outcome = controller.submit("   ", SubmitOptions::default()).await;
    assert_eq!(outcome, SubmissionOutcome::Failed(SubmissionError::EmptyInput));
    assert!(form.error.is_visible());
    assert!(!form.result.is_visible());
    assert_settled(&form);

    gates
        .remove(0)
        .send(Ok(success("第一", Vec::new())))
        .expect("release first");
    assert_eq!(
        first.await.expect("join first"),
        SubmissionOutcome::Superseded { token: 1 }
    );
    assert!(!form.result.is_visible());
    assert!(form.error.is_visible());
    assert_eq!(form.error.text(), "empty input");
    assert_eq!(controller.state(), UiState::Error(SubmissionError::EmptyInput));
    assert_settled(&form);
}

#[tokio::test]
async fn cancelled_submission_returns_to_idle() {
    let (api, _gates) = GatedApi::new(1);
    let form = MemoryForm::new();
    let controller = Arc::new(controller_for(api.clone(), &form));

    let task = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit("Hello", SubmitOptions::default()).await })
    };
    api.wait_for_calls(1).await;
    assert_eq!(controller.state(), UiState::Loading);

    task.abort();
    assert!(task.await.is_err());

    assert_eq!(controller.state(), UiState::Idle);
    assert!(!form.result.is_visible());
    assert!(!form.error.is_visible());
    assert_settled(&form);
}

#[tokio::test]
async fn attached_controller_handles_submit_events_until_disposed() {
    let api = ScriptedApi::with(vec![Ok(success("你好", Vec::new()))]);
    let form = MemoryForm::new();
    let controller = Arc::new(controller_for(api.clone(), &form));
    let events = FormEvents::new();

    let disposer = controller.attach(&events);
    let ran = events
        .emit_submit(SubmitEvent::new("Hello", SubmitOptions::default()))
        .await;
    assert_eq!(ran, 1);
    assert_eq!(form.output.text(), "你好");

    assert!(disposer.dispose());
    let ran = events
        .emit_submit(SubmitEvent::new("Hello again", SubmitOptions::default()))
        .await;
    assert_eq!(ran, 0);
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn chinese_locale_localizes_messages_and_labels() {
    let api = ScriptedApi::with(vec![Ok(api_failure(None))]);
    let form = MemoryForm::new();
    let controller = controller_for(api, &form).with_locale(Locale::ZhCn);
    assert_eq!(form.trigger.label(), "开始翻译");

    controller.submit("", SubmitOptions::default()).await;
    assert_eq!(form.error.text(), "请输入要翻译的文本");

    controller.submit("text", SubmitOptions::default()).await;
    assert_eq!(form.error.text(), "翻译失败");
    assert_eq!(form.trigger.label(), "开始翻译");
}

#[tokio::test]
async fn custom_limit_is_enforced() {
    let api = ScriptedApi::with(Vec::new());
    let form = MemoryForm::new();
    let controller = controller_for(api.clone(), &form).with_max_input_units(5);

    controller.submit("toolong", SubmitOptions::default()).await;

    assert!(api.calls().is_empty());
    assert_eq!(form.error.text(), "input too long (max 5 characters)");
}
