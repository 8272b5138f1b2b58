//! Admin API tests driven through the router with `oneshot`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;

use syllabusdb_auth::{AdminEmailPolicy, MockIdTokenValidator};
use syllabusdb_core::{CollegeId, CourseId, SyllabusId, SyllabusRef, Uid};
use syllabusdb_gateway::{create_router, GatewayConfig, GatewayState};
use syllabusdb_moderation::{
    AbortReason, AdminGate, AdminSession, ControlError, Moderation, ModerationConfig,
    ModerationService, NoopNotifier, NoopScanner, OutboundQueue, Outcome, PendingItems, Prompt,
    RetryPolicy, ScanResult, Syllabus,
};
use syllabusdb_store::{College, Course, DocumentStore, FsBlobStore, RocksStore};
use tempfile::TempDir;

const ADMIN_TOKEN: &str = "Bearer test-token:admin-uid:admin@syllabusdb.com";
const SYLLABUS: &str = "/v1/admin/colleges/baruch/courses/MATH%20241/syllabi/s2";

/// Records which operations ran and answers like the real workflow would.
#[derive(Default)]
struct StubModeration {
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    fail_saga: bool,
}

impl StubModeration {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self, entry: String) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(entry);
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

fn record_for(reference: &SyllabusRef) -> Syllabus {
    Syllabus {
        college_id: reference.college_id.clone(),
        course_id: reference.course_id.clone(),
        id: reference.syllabus_id.clone(),
        professor: "Lee".to_string(),
        term: "Spring".to_string(),
        year: 2025,
        pdf_url: String::new(),
        file_path: "syllabi/s2.pdf".to_string(),
        approved: false,
        owner: Uid::new("u2").unwrap(),
        created_at: None,
        experience_text: None,
    }
}

#[async_trait]
impl Moderation for StubModeration {
    async fn load_pending(&self, _session: &AdminSession) -> syllabusdb_moderation::Result<PendingItems> {
        self.record("load_pending".to_string());
        Ok(PendingItems::default())
    }

    async fn get_syllabus(
        &self,
        _session: &AdminSession,
        syllabus: &SyllabusRef,
    ) -> syllabusdb_moderation::Result<Syllabus> {
        self.record(format!("get_syllabus {syllabus}"));
        if syllabus.syllabus_id.as_str() == "missing" {
            return Err(ControlError::NotFound(syllabus.to_string()));
        }
        Ok(record_for(syllabus))
    }

    async fn approve_syllabus(
        &self,
        _session: &AdminSession,
        syllabus: &SyllabusRef,
        owner: &Uid,
        prompt: &dyn Prompt,
    ) -> syllabusdb_moderation::Result<Outcome> {
        self.record(format!("approve_syllabus {syllabus} owner={owner}"));
        if !prompt.confirm("approve?").await {
            return Ok(Outcome::Aborted(AbortReason::Declined));
        }
        if self.fail_saga {
            return Err(ControlError::SagaFailed {
                saga: "approve-syllabus",
                step: "college-total",
                source: Box::new(ControlError::Internal("disk full".to_string())),
                rolled_back: vec!["course-approval", "syllabus-approved"],
                unrepaired: vec![],
            });
        }
        Ok(Outcome::Applied)
    }

    async fn disapprove_syllabus(
        &self,
        _session: &AdminSession,
        syllabus: &Syllabus,
        prompt: &dyn Prompt,
    ) -> syllabusdb_moderation::Result<Outcome> {
        self.record(format!("disapprove_syllabus {}", syllabus.reference()));
        let Some(reason) = prompt.reason("why?").await.filter(|r| !r.trim().is_empty()) else {
            return Ok(Outcome::Aborted(AbortReason::MissingReason));
        };
        if !prompt.confirm("delete?").await {
            return Ok(Outcome::Aborted(AbortReason::Declined));
        }
        self.record(format!("reason {reason}"));
        Ok(Outcome::Applied)
    }

    async fn approve_college(
        &self,
        _session: &AdminSession,
        college_id: &CollegeId,
        _prompt: &dyn Prompt,
    ) -> syllabusdb_moderation::Result<Outcome> {
        self.record(format!("approve_college {college_id}"));
        Ok(Outcome::Applied)
    }

    async fn disapprove_college(
        &self,
        _session: &AdminSession,
        college_id: &CollegeId,
        _prompt: &dyn Prompt,
    ) -> syllabusdb_moderation::Result<Outcome> {
        self.record(format!("disapprove_college {college_id}"));
        Ok(Outcome::Applied)
    }

    async fn request_scan(
        &self,
        _session: &AdminSession,
        syllabus: &SyllabusRef,
    ) -> syllabusdb_moderation::Result<()> {
        self.record(format!("request_scan {syllabus}"));
        Ok(())
    }

    fn scan_result(&self, _session: &AdminSession, syllabus_id: &SyllabusId) -> Option<ScanResult> {
        self.record(format!("scan_result {syllabus_id}"));
        (syllabus_id.as_str() == "s2").then_some(ScanResult::Pending)
    }
}

fn app(moderation: Arc<StubModeration>) -> Router {
    router_for(moderation)
}

fn router_for<M: Moderation + 'static>(moderation: Arc<M>) -> Router {
    let config = GatewayConfig {
        redirect_url: "https://syllabusdb.com".to_string(),
        ..GatewayConfig::default()
    };
    let gate = AdminGate::new(AdminEmailPolicy::new("admin@syllabusdb.com"));
    create_router(GatewayState::new(
        moderation,
        Arc::new(MockIdTokenValidator),
        gate,
        config,
    ))
}

fn post(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, token);
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let response = app(Arc::default()).oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn non_admin_is_redirected_without_calls() {
    let moderation = Arc::new(StubModeration::default());
    let router = app(moderation.clone());

    let requests = [
        get("/v1/admin/pending", Some("Bearer test-token:u9:random@example.com")),
        get("/v1/admin/pending", None),
        get("/v1/admin/pending", Some("Bearer not-a-token")),
        post(
            &format!("{SYLLABUS}/approve"),
            Some("Bearer test-token:u9:random@example.com"),
            &json!({ "confirm": true }),
        ),
        post(
            "/v1/admin/colleges/baruch/disapprove",
            Some("Bearer test-token:u9"),
            &json!({ "confirm": true, "reason": "spam" }),
        ),
    ];

    for request in requests {
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "https://syllabusdb.com"
        );
    }
    assert_eq!(moderation.calls(), 0);
}

#[tokio::test]
async fn admin_lists_pending() {
    let moderation = Arc::new(StubModeration::default());
    let response = app(moderation.clone())
        .oneshot(get("/v1/admin/pending", Some(ADMIN_TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["syllabi"].as_array().unwrap().is_empty());
    assert!(body["groups"].as_array().unwrap().is_empty());
    assert!(body["colleges"].as_array().unwrap().is_empty());
    assert_eq!(moderation.seen(), vec!["load_pending"]);
}

#[tokio::test]
async fn approve_uses_owner_from_body() {
    let moderation = Arc::new(StubModeration::default());
    let response = app(moderation.clone())
        .oneshot(post(
            &format!("{SYLLABUS}/approve"),
            Some(ADMIN_TOKEN),
            &json!({ "owner": "u7", "confirm": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "outcome": "applied" }));
    assert_eq!(
        moderation.seen(),
        vec!["approve_syllabus colleges/baruch/courses/MATH 241/syllabi/s2 owner=u7"]
    );
}

#[tokio::test]
async fn approve_without_owner_reads_the_record() {
    let moderation = Arc::new(StubModeration::default());
    let response = app(moderation.clone())
        .oneshot(post(
            &format!("{SYLLABUS}/approve"),
            Some(ADMIN_TOKEN),
            &json!({ "confirm": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let seen = moderation.seen();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].starts_with("get_syllabus"));
    assert!(seen[1].ends_with("owner=u2"));
}

#[tokio::test]
async fn declined_action_reports_abort() {
    let response = app(Arc::default())
        .oneshot(post(
            &format!("{SYLLABUS}/approve"),
            Some(ADMIN_TOKEN),
            &json!({ "owner": "u2", "confirm": false }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "outcome": "aborted", "reason": "declined" })
    );
}

#[tokio::test]
async fn disapprove_reads_record_then_passes_reason() {
    let moderation = Arc::new(StubModeration::default());
    let response = app(moderation.clone())
        .oneshot(post(
            &format!("{SYLLABUS}/disapprove"),
            Some(ADMIN_TOKEN),
            &json!({ "reason": "wrong document", "confirm": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        moderation.seen(),
        vec![
            "get_syllabus colleges/baruch/courses/MATH 241/syllabi/s2",
            "disapprove_syllabus colleges/baruch/courses/MATH 241/syllabi/s2",
            "reason wrong document",
        ]
    );
}

#[tokio::test]
async fn disapprove_without_reason_aborts() {
    let response = app(Arc::default())
        .oneshot(post(
            &format!("{SYLLABUS}/disapprove"),
            Some(ADMIN_TOKEN),
            &json!({ "reason": "   ", "confirm": true }),
        ))
        .await
        .unwrap();

    assert_eq!(
        json_body(response).await,
        json!({ "outcome": "aborted", "reason": "missing_reason" })
    );
}

#[tokio::test]
async fn missing_syllabus_is_not_found() {
    let response = app(Arc::default())
        .oneshot(post(
            "/v1/admin/colleges/baruch/courses/MATH%20241/syllabi/missing/disapprove",
            Some(ADMIN_TOKEN),
            &json!({ "reason": "spam", "confirm": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn saga_failure_is_a_generic_500() {
    let moderation = Arc::new(StubModeration {
        fail_saga: true,
        ..StubModeration::default()
    });
    let response = app(moderation)
        .oneshot(post(
            &format!("{SYLLABUS}/approve"),
            Some(ADMIN_TOKEN),
            &json!({ "owner": "u2", "confirm": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "internal_error");
    assert!(!body["error"]["message"].as_str().unwrap().contains("disk full"));
}

#[tokio::test]
async fn college_routes_reach_the_workflow() {
    let moderation = Arc::new(StubModeration::default());
    let router = app(moderation.clone());

    let approve = router
        .clone()
        .oneshot(post(
            "/v1/admin/colleges/brooklyn/approve",
            Some(ADMIN_TOKEN),
            &json!({ "confirm": true }),
        ))
        .await
        .unwrap();
    assert_eq!(approve.status(), StatusCode::OK);

    let disapprove = router
        .oneshot(post(
            "/v1/admin/colleges/queens/disapprove",
            Some(ADMIN_TOKEN),
            &json!({ "confirm": true, "reason": "duplicate" }),
        ))
        .await
        .unwrap();
    assert_eq!(disapprove.status(), StatusCode::OK);

    assert_eq!(
        moderation.seen(),
        vec!["approve_college brooklyn", "disapprove_college queens"]
    );
}

#[tokio::test]
async fn scan_is_queued_then_readable() {
    let moderation = Arc::new(StubModeration::default());
    let router = app(moderation.clone());

    let queued = router
        .clone()
        .oneshot(post(&format!("{SYLLABUS}/scan"), Some(ADMIN_TOKEN), &json!({})))
        .await
        .unwrap();
    assert_eq!(queued.status(), StatusCode::ACCEPTED);
    assert_eq!(json_body(queued).await, json!({ "status": "pending" }));

    let result = router
        .clone()
        .oneshot(get("/v1/admin/syllabi/s2/scan", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(result.status(), StatusCode::OK);

    let unknown = router
        .oneshot(get("/v1/admin/syllabi/other/scan", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[test]
fn syllabus_path_ids_are_plain_segments() {
    let reference = SyllabusRef::new(
        CollegeId::new("baruch").unwrap(),
        CourseId::new("MATH 241").unwrap(),
        SyllabusId::new("s2").unwrap(),
    );
    assert_eq!(
        reference.to_string(),
        "colleges/baruch/courses/MATH 241/syllabi/s2"
    );
}

// =============================================================================
// Against the real workflow
// =============================================================================

type RealService = ModerationService<RocksStore, FsBlobStore>;

const HUNTER_SYLLABUS: &str = "/v1/admin/colleges/hunter/courses/CSCI%20135/syllabi/s1";

/// A service over a fresh store holding one pending CSCI 135 syllabus.
async fn seeded_service(dir: &TempDir) -> Arc<RealService> {
    let store = RocksStore::open(dir.path().join("db")).unwrap();
    let (outbound, _worker) = OutboundQueue::spawn(
        Arc::new(NoopNotifier),
        Arc::new(NoopScanner),
        RetryPolicy::default(),
    );
    let service = ModerationService::new(
        Arc::new(store),
        Arc::new(FsBlobStore::new(dir.path().join("blobs"))),
        outbound,
        ModerationConfig::default(),
    );

    let hunter = CollegeId::new("hunter").unwrap();
    let csci = CourseId::new("CSCI 135").unwrap();
    let store = service.store();
    store
        .put_college(&College {
            id: hunter.clone(),
            name: "Hunter College".to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            approved: true,
            approved_syllabi_total: 0,
            owner: Uid::new("college-owner").unwrap(),
            created_at: None,
        })
        .await
        .unwrap();
    store
        .put_course(&Course {
            college_id: hunter.clone(),
            id: csci.clone(),
            code: "CSCI 135".to_string(),
            title: "Software Design".to_string(),
            approved: false,
            approved_syllabi_count: 0,
        })
        .await
        .unwrap();
    let mut syllabus = record_for(&SyllabusRef::new(hunter, csci, SyllabusId::new("s1").unwrap()));
    syllabus.owner = Uid::new("u1").unwrap();
    store.put_syllabus(&syllabus).await.unwrap();

    Arc::new(service)
}

#[tokio::test]
async fn repeated_approve_changes_no_counter() {
    let dir = TempDir::new().unwrap();
    let service = seeded_service(&dir).await;
    let router = router_for(service.clone());

    let first = router
        .clone()
        .oneshot(post(
            &format!("{HUNTER_SYLLABUS}/approve"),
            Some(ADMIN_TOKEN),
            &json!({ "confirm": true }),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(first).await, json!({ "outcome": "applied" }));

    let second = router
        .oneshot(post(
            &format!("{HUNTER_SYLLABUS}/approve"),
            Some(ADMIN_TOKEN),
            &json!({ "owner": "u1", "confirm": true }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(
        json_body(second).await,
        json!({ "outcome": "aborted", "reason": "already_approved" })
    );

    let store = service.store();
    let reference: SyllabusRef = "colleges/hunter/courses/CSCI 135/syllabi/s1".parse().unwrap();
    let course = store.get_course(&reference.course()).await.unwrap().unwrap();
    assert_eq!(course.approved_syllabi_count, 1);
    let college = store.get_college(&reference.college_id).await.unwrap().unwrap();
    assert_eq!(college.approved_syllabi_total, 1);
    assert_eq!(store.get_global_stats().await.unwrap().unwrap().total_syllabi, 1);
}

#[tokio::test]
async fn approving_an_unknown_syllabus_with_owner_is_not_found() {
    let dir = TempDir::new().unwrap();
    let service = seeded_service(&dir).await;

    let response = router_for(service.clone())
        .oneshot(post(
            "/v1/admin/colleges/hunter/courses/CSCI%20135/syllabi/s9/approve",
            Some(ADMIN_TOKEN),
            &json!({ "owner": "u1", "confirm": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(service.store().get_global_stats().await.unwrap().is_none());
}
