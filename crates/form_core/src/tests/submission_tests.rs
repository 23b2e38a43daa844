use super::*;
use crate::{
    signature::{Point, SignatureError, StrokeCanvas, PNG_DATA_URI_PREFIX},
    transport::TransportError,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use shared::{
    domain::{SignatureRole, TextField},
    protocol::SubmitFormResponse,
};
use tokio::sync::{Mutex, Notify};

struct TestTransport {
    form_numbers: Mutex<Vec<Option<&'static str>>>,
    sent: Mutex<Vec<SubmitFormRequest>>,
    entered: Arc<Notify>,
    release: Option<Arc<Notify>>,
}

impl TestTransport {
    /// Each call pops the next scripted reply; `None` means the call fails.
    fn scripted(replies: &[Option<&'static str>]) -> Self {
        let mut form_numbers = replies.to_vec();
        form_numbers.reverse();
        Self {
            form_numbers: Mutex::new(form_numbers),
            sent: Mutex::new(Vec::new()),
            entered: Arc::new(Notify::new()),
            release: None,
        }
    }

    fn gated(reply: &'static str, release: Arc<Notify>) -> Self {
        let mut transport = Self::scripted(&[Some(reply)]);
        transport.release = Some(release);
        transport
    }
}

#[async_trait]
impl FormTransport for TestTransport {
    async fn submit_form(
        &self,
        payload: &SubmitFormRequest,
    ) -> Result<SubmitFormResponse, TransportError> {
        self.sent.lock().await.push(payload.clone());
        self.entered.notify_one();
        if let Some(release) = &self.release {
            release.notified().await;
        }
        match self.form_numbers.lock().await.pop().flatten() {
            Some(number) => Ok(SubmitFormResponse {
                form_number: FormNumber(number.to_string()),
            }),
            None => Err(TransportError::Status {
                status: StatusCode::BAD_GATEWAY,
                body: "upstream down".to_string(),
            }),
        }
    }

    async fn health_check(&self) -> Result<String, TransportError> {
        Ok("ok".to_string())
    }
}

struct BrokenPad;

impl SignaturePad for BrokenPad {
    fn is_blank(&self) -> bool {
        false
    }

    fn clear(&mut self) {}

    fn export_png(&self) -> Result<String, SignatureError> {
        Err(SignatureError::NoVisibleInk)
    }
}

fn acme_form() -> SelectionModel {
    let mut form = SelectionModel::new(Arc::new(HazardCatalog::site_default()));
    form.set_field(TextField::Company, "Acme");
    form.set_field(TextField::JobDescription, "Pipeline Inspection");
    form.toggle_hazard("Electrical");
    form.toggle_control("Electrical", "PPE");
    form.toggle_ppe("Hard Hat");
    form
}

#[tokio::test]
async fn blank_signatures_submit_and_succeed() {
    let transport = Arc::new(TestTransport::scripted(&[Some("HZ-1001")]));
    let coordinator = SubmissionCoordinator::new(SessionId::new(), transport.clone());
    let form = acme_form();

    let status = coordinator
        .submit(&form, &SignatureBoard::blank())
        .await
        .expect("not rejected");

    assert_eq!(status, SubmissionStatus::Succeeded(FormNumber("HZ-1001".into())));
    assert_eq!(coordinator.status(), status);

    let sent = transport.sent.lock().await;
    assert_eq!(sent.len(), 1);
    let payload = &sent[0];
    assert_eq!(payload.company, "Acme");
    assert_eq!(payload.job_description, "Pipeline Inspection");
    assert_eq!(payload.hazards, vec!["Electrical".to_string()]);
    assert_eq!(payload.hazard_controls["Electrical"], vec!["PPE".to_string()]);
    assert_eq!(payload.ppe, vec!["Hard Hat".to_string()]);
    assert_eq!(payload.worker_signature, "");
    assert_eq!(payload.client_signature, "");
    assert_eq!(payload.supervisor_signature, "");
}

#[tokio::test]
async fn transport_failure_ends_failed_without_form_number() {
    let transport = Arc::new(TestTransport::scripted(&[None]));
    let coordinator = SubmissionCoordinator::new(SessionId::new(), transport);

    let status = coordinator
        .submit(&acme_form(), &SignatureBoard::blank())
        .await
        .expect("not rejected");

    assert_eq!(status, SubmissionStatus::Failed);
    assert!(coordinator.status().form_number().is_none());
    assert_eq!(coordinator.status().to_string(), "Submission failed.");
}

#[tokio::test]
async fn resubmission_after_failure_can_succeed() {
    let transport = Arc::new(TestTransport::scripted(&[None, Some("HZ-1002")]));
    let coordinator = SubmissionCoordinator::new(SessionId::new(), transport.clone());
    let form = acme_form();
    let board = SignatureBoard::blank();

    let first = coordinator.submit(&form, &board).await.expect("first");
    assert_eq!(first, SubmissionStatus::Failed);

    let mut updates = coordinator.subscribe();
    let second = coordinator.submit(&form, &board).await.expect("second");
    assert_eq!(second, SubmissionStatus::Succeeded(FormNumber("HZ-1002".into())));

    assert!(updates.has_changed().expect("sender alive"));
    assert_eq!(*updates.borrow_and_update(), second);
    assert_eq!(transport.sent.lock().await.len(), 2);
}

#[tokio::test]
async fn status_reads_submitting_while_request_is_pending() {
    let release = Arc::new(Notify::new());
    let transport = Arc::new(TestTransport::gated("HZ-1003", release.clone()));
    let entered = transport.entered.clone();
    let coordinator = SubmissionCoordinator::new(SessionId::new(), transport.clone());
    let form = acme_form();
    let board = SignatureBoard::blank();

    let (first, second) = tokio::join!(coordinator.submit(&form, &board), async {
        entered.notified().await;
        let observed = coordinator.status();
        let rejected = coordinator.submit(&form, &board).await;
        release.notify_one();
        (observed, rejected)
    });

    let (observed, rejected) = second;
    assert_eq!(observed, SubmissionStatus::Submitting);
    assert_eq!(
        rejected,
        Err(SubmitRejected::InFlight(coordinator.session_id()))
    );
    assert_eq!(
        first.expect("first"),
        SubmissionStatus::Succeeded(FormNumber("HZ-1003".into()))
    );
    assert_eq!(transport.sent.lock().await.len(), 1);
}

#[tokio::test]
async fn abandoned_submit_fails_and_allows_resubmission() {
    let release = Arc::new(Notify::new());
    let transport = Arc::new(TestTransport::gated("HZ-1006", release.clone()));
    let entered = transport.entered.clone();
    let coordinator = SubmissionCoordinator::new(SessionId::new(), transport.clone());
    let form = acme_form();
    let board = SignatureBoard::blank();

    tokio::select! {
        _ = coordinator.submit(&form, &board) => panic!("request should still be pending"),
        _ = entered.notified() => {}
    }

    assert_eq!(coordinator.status(), SubmissionStatus::Failed);

    release.notify_one();
    let status = coordinator
        .submit(&form, &board)
        .await
        .expect("not rejected after cancellation");
    assert_eq!(status, SubmissionStatus::Succeeded(FormNumber("HZ-1006".into())));
    assert_eq!(transport.sent.lock().await.len(), 2);
}

#[tokio::test]
async fn drawn_signature_is_sent_as_png_data_uri() {
    let transport = Arc::new(TestTransport::scripted(&[Some("HZ-1004")]));
    let coordinator = SubmissionCoordinator::new(SessionId::new(), transport.clone());
    let mut board = SignatureBoard::blank();
    board
        .pad_mut(SignatureRole::Supervisor)
        .draw_stroke(&[Point::new(30.0, 30.0), Point::new(90.0, 60.0)]);

    coordinator
        .submit(&acme_form(), &board)
        .await
        .expect("not rejected");

    let sent = transport.sent.lock().await;
    assert!(sent[0].supervisor_signature.starts_with(PNG_DATA_URI_PREFIX));
    assert_eq!(sent[0].worker_signature, "");
}

#[tokio::test]
async fn signature_export_failure_fails_without_calling_transport() {
    let transport = Arc::new(TestTransport::scripted(&[Some("HZ-1005")]));
    let coordinator = SubmissionCoordinator::new(SessionId::new(), transport.clone());
    let board = SignatureBoard::new(BrokenPad, BrokenPad, BrokenPad);

    let status = coordinator
        .submit(&acme_form(), &board)
        .await
        .expect("not rejected");

    assert_eq!(status, SubmissionStatus::Failed);
    assert!(transport.sent.lock().await.is_empty());
}

#[test]
fn payload_excludes_controls_of_deselected_hazards() {
    let mut form = acme_form();
    form.toggle_hazard("Wildlife");
    form.toggle_control("Wildlife", "Bear Spray");
    form.toggle_hazard("Driving");
    form.toggle_hazard("Wildlife");

    let payload = build_payload(form.state(), form.catalog(), EncodedSignatures::default());

    assert_eq!(
        payload.hazards,
        vec!["Driving".to_string(), "Electrical".to_string()]
    );
    assert!(!payload.hazard_controls.contains_key("Wildlife"));
    assert!(payload.hazard_controls["Driving"].is_empty());
    assert_eq!(payload.representatives.len(), 6);
}

#[test]
fn payload_lists_ppe_in_catalog_order() {
    let mut form = SelectionModel::new(Arc::new(HazardCatalog::site_default()));
    form.toggle_ppe("Face Shield");
    form.toggle_ppe("Gloves");
    form.toggle_ppe("Safety Glasses/Goggles");

    let payload = build_payload(form.state(), form.catalog(), EncodedSignatures::default());

    assert_eq!(
        payload.ppe,
        vec![
            "Safety Glasses/Goggles".to_string(),
            "Gloves".to_string(),
            "Face Shield".to_string()
        ]
    );
}

#[test]
fn status_text_matches_form_footer() {
    assert_eq!(SubmissionStatus::Idle.to_string(), "");
    assert_eq!(SubmissionStatus::Submitting.to_string(), "Submitting...");
    assert_eq!(
        SubmissionStatus::Succeeded(FormNumber("77".into())).to_string(),
        "Submitted ✔ Form #: 77"
    );
}

#[test]
fn stroke_canvas_board_is_default_for_sessions() {
    let board: SignatureBoard<StrokeCanvas> = SignatureBoard::blank();
    for role in SignatureRole::ALL {
        assert!(board.pad(role).is_blank());
    }
}
