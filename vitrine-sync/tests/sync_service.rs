//! Integration tests for the sync service (vitrine-sync).
//!
//! Tests retry budgets under paused time, fail-fast validation, per-attempt
//! timeouts, and the full HTTP path against a mock template store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use vitrine_core::{
    codec, Document, GraphicObject, ObjectKind, RecordId, Shape, TemplateRecord, TextAlign,
    TextStyle, Visibility,
};
use vitrine_sync::{
    ApiError, HttpTemplateApi, NewTemplate, ProductRef, RetryConfig, SyncConfig, SyncError,
    SyncService, TemplateApi, TemplateUpdate,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ==========================================================================
// Scripted store
// ==========================================================================

#[derive(Clone, Copy)]
enum Behavior {
    Ok,
    TransportDown,
    Reject(u16),
    Hang,
    /// Fail with a transport error this many times, then succeed.
    FlakyFor(usize),
}

struct ScriptedApi {
    behavior: Behavior,
    calls: AtomicUsize,
    created: Mutex<Vec<NewTemplate>>,
    updated: Mutex<Vec<(RecordId, TemplateUpdate)>>,
}

impl ScriptedApi {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn step(&self) -> Result<(), ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Ok => Ok(()),
            Behavior::TransportDown => Err(ApiError::Transport("connection refused".into())),
            Behavior::Reject(status) => Err(ApiError::Status {
                status,
                body: "rejected".into(),
            }),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            Behavior::FlakyFor(n) if call < n => Err(ApiError::Transport("reset".into())),
            Behavior::FlakyFor(_) => Ok(()),
        }
    }
}

fn record(id: RecordId, template_data: serde_json::Value, is_active: bool) -> TemplateRecord {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("time");
    TemplateRecord {
        id,
        name: "Maison ABC123".to_string(),
        description: String::new(),
        product_id: 5,
        brand_id: 9,
        template_data,
        visibility: Visibility::Brand,
        tags: Vec::new(),
        usage_count: 0,
        is_active,
        created_at: at,
        updated_at: at,
    }
}

#[async_trait]
impl TemplateApi for ScriptedApi {
    async fn create(&self, template: &NewTemplate) -> Result<TemplateRecord, ApiError> {
        self.step().await?;
        self.created.lock().expect("lock").push(template.clone());
        Ok(record(100, template.template_data.clone(), true))
    }

    async fn update(
        &self,
        id: RecordId,
        update: &TemplateUpdate,
    ) -> Result<TemplateRecord, ApiError> {
        self.step().await?;
        self.updated.lock().expect("lock").push((id, update.clone()));
        let data = update.template_data.clone().unwrap_or_else(|| json!({}));
        Ok(record(id, data, update.is_active.unwrap_or(true)))
    }

    async fn get(&self, id: RecordId) -> Result<TemplateRecord, ApiError> {
        self.step().await?;
        Ok(record(id, json!([{ "type": "circle", "radius": 4 }]), true))
    }

    async fn list_by_product(&self, product_id: RecordId) -> Result<Vec<TemplateRecord>, ApiError> {
        self.step().await?;
        Ok(vec![record(product_id, json!({}), true)])
    }

    async fn list_by_brand(&self, _brand_id: RecordId) -> Result<Vec<TemplateRecord>, ApiError> {
        self.step().await?;
        Ok(Vec::new())
    }

    async fn export_raster(
        &self,
        _id: RecordId,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ApiError> {
        self.step().await?;
        Ok(format!("{width}x{height}").into_bytes())
    }
}

fn service(api: Arc<ScriptedApi>) -> SyncService {
    SyncService::new(api, SyncConfig::default())
}

fn product_ref() -> ProductRef {
    ProductRef {
        product_id: 5,
        brand_id: 9,
        name: "Maison ABC123".to_string(),
        tags: vec!["bags".to_string()],
    }
}

fn document() -> Document {
    let mut doc = Document::new(700.0, 900.0);
    doc.push(
        GraphicObject::new(ObjectKind::Text(TextStyle {
            content: "ABC123".to_string(),
            font_family: "Inter".to_string(),
            font_size: 48.0,
            font_weight: "bold".to_string(),
            fill: "#111111".to_string(),
            align: TextAlign::Center,
            width: 300.0,
            height: 60.0,
        }))
        .at(20.0, 20.0),
    );
    doc.push(GraphicObject::new(ObjectKind::Shape(Shape::rect(50.0, 50.0, "#ff0000"))));
    doc
}

// ==========================================================================
// Retry budget
// ==========================================================================

#[tokio::test(start_paused = true)]
async fn test_always_failing_transport_makes_exactly_three_calls() {
    let api = ScriptedApi::new(Behavior::TransportDown);
    let started = tokio::time::Instant::now();

    let err = service(api.clone())
        .sync(&document(), &product_ref(), None)
        .await
        .expect_err("transport is down");

    assert_eq!(api.calls(), 3);
    match err {
        SyncError::ExhaustedRetries { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, SyncError::Network(ApiError::Transport(_))));
        }
        other => panic!("expected ExhaustedRetries, got {other:?}"),
    }
    // Backoff of 1s then 2s between the three attempts.
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_recovers_from_transient_failures() {
    let api = ScriptedApi::new(Behavior::FlakyFor(2));

    let record = service(api.clone())
        .sync(&document(), &product_ref(), Some(42))
        .await
        .expect("third attempt succeeds");

    assert_eq!(api.calls(), 3);
    assert_eq!(record.id, 42);
}

#[tokio::test(start_paused = true)]
async fn test_rejection_is_not_retried() {
    let api = ScriptedApi::new(Behavior::Reject(422));

    let err = service(api.clone())
        .sync(&document(), &product_ref(), None)
        .await
        .expect_err("rejected");

    assert_eq!(api.calls(), 1);
    assert!(matches!(err, SyncError::Api(ApiError::Status { status: 422, .. })));
}

#[tokio::test(start_paused = true)]
async fn test_hung_attempts_time_out_and_count_against_budget() {
    let api = ScriptedApi::new(Behavior::Hang);
    let started = tokio::time::Instant::now();

    let err = service(api.clone())
        .list_for_brand(9)
        .await
        .expect_err("every attempt hangs");

    assert_eq!(api.calls(), 3);
    match err {
        SyncError::ExhaustedRetries { attempts: 3, last } => {
            assert!(matches!(*last, SyncError::Timeout(t) if t == Duration::from_secs(30)));
        }
        other => panic!("expected ExhaustedRetries, got {other:?}"),
    }
    // Three 30s timeouts plus 1s and 2s of backoff.
    assert_eq!(started.elapsed(), Duration::from_secs(93));
}

#[tokio::test(start_paused = true)]
async fn test_custom_attempt_budget() {
    let api = ScriptedApi::new(Behavior::TransportDown);
    let config = SyncConfig {
        retry: RetryConfig::new(5, 10, 1_000, 2.0),
        ..SyncConfig::default()
    };

    let err = SyncService::new(api.clone(), config)
        .export_raster(1, 10, 10)
        .await
        .expect_err("down");

    assert_eq!(api.calls(), 5);
    assert!(matches!(err, SyncError::ExhaustedRetries { attempts: 5, .. }));
}

// ==========================================================================
// Validation before network
// ==========================================================================

#[tokio::test]
async fn test_missing_kind_fails_fast_without_network() {
    let api = ScriptedApi::new(Behavior::Ok);
    let payload = json!({
        "version": "2.0",
        "canvas": {
            "objects": [
                { "type": "rect", "left": 0, "top": 0, "width": 5, "height": 5 },
                { "left": 10, "top": 10, "width": 5, "height": 5 }
            ]
        }
    });

    let err = service(api.clone())
        .sync_raw(payload, &product_ref(), None)
        .await
        .expect_err("invalid payload");

    assert!(err.is_validation());
    match err {
        SyncError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field(), "type");
            assert_eq!(errors[0].index(), Some(1));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_legacy_payload_is_normalized_before_create() {
    let api = ScriptedApi::new(Behavior::Ok);
    let legacy = json!([{ "type": "rect", "left": 1, "top": 2, "width": 5, "height": 5, "fill": "#000" }]);

    let record = service(api.clone())
        .sync_raw(legacy, &product_ref(), None)
        .await
        .expect("create");

    assert_eq!(record.id, 100);
    let created = api.created.lock().expect("lock");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].template_data["version"], "2.0");
    assert_eq!(created[0].template_data["canvas"]["objects"][0]["left"], 1.0);
    assert_eq!(created[0].name, "Maison ABC123");
    assert_eq!(created[0].tags, vec!["bags".to_string()]);
    assert_eq!(created[0].visibility, Visibility::Brand);
}

// ==========================================================================
// Read paths and soft delete
// ==========================================================================

#[tokio::test]
async fn test_pull_migrates_stored_document() {
    let api = ScriptedApi::new(Behavior::Ok);

    let pulled = service(api).pull(7).await.expect("pull");

    assert_eq!(pulled.record.id, 7);
    assert_eq!(pulled.document.len(), 1);
    assert_eq!(pulled.document.objects()[0].kind.tag(), "circle");
}

#[tokio::test]
async fn test_deactivate_sends_flag_only() {
    let api = ScriptedApi::new(Behavior::Ok);

    let record = service(api.clone()).deactivate(8).await.expect("deactivate");

    assert!(!record.is_active);
    let updated = api.updated.lock().expect("lock");
    assert_eq!(updated.as_slice(), &[(8, TemplateUpdate::deactivate())]);
}

#[tokio::test]
async fn test_list_and_export_pass_through() {
    let api = ScriptedApi::new(Behavior::Ok);
    let svc = service(api);

    assert_eq!(svc.list_for_product(5).await.expect("list").len(), 1);
    assert_eq!(svc.export_raster(1, 1080, 1920).await.expect("export"), b"1080x1920");
}

// ==========================================================================
// HTTP end to end
// ==========================================================================

#[tokio::test]
async fn test_http_store_outage_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/templates"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let api = HttpTemplateApi::new(server.uri(), None).expect("client");
    let config = SyncConfig {
        retry: RetryConfig::new(3, 1, 5, 2.0),
        ..SyncConfig::default()
    };

    let err = SyncService::new(Arc::new(api), config)
        .sync(&document(), &product_ref(), None)
        .await
        .expect_err("store unavailable");

    assert!(matches!(
        err,
        SyncError::ExhaustedRetries { attempts: 3, .. }
    ));
}

#[tokio::test]
async fn test_http_update_round_trips_document() {
    let server = MockServer::start().await;
    let doc = document();
    let stored = codec::to_value(&doc).expect("encode");
    Mock::given(method("PATCH"))
        .and(path("/templates/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record(42, stored, true)))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpTemplateApi::new(server.uri(), Some("token".into())).expect("client");
    let record = SyncService::new(Arc::new(api), SyncConfig::default())
        .sync(&doc, &product_ref(), Some(42))
        .await
        .expect("update");

    assert_eq!(record.document().expect("decode"), doc);
}
