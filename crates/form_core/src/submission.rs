use std::{collections::BTreeMap, fmt, sync::Arc};

use shared::{
    catalog::HazardCatalog,
    domain::SessionId,
    protocol::{FormNumber, SubmitFormRequest},
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{
    selection::{active_controls, FormState, SelectionModel},
    signature::{EncodedSignatures, SignatureBoard, SignaturePad},
    transport::FormTransport,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded(FormNumber),
    Failed,
}

impl SubmissionStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting)
    }

    pub fn form_number(&self) -> Option<&FormNumber> {
        match self {
            SubmissionStatus::Succeeded(number) => Some(number),
            _ => None,
        }
    }
}

/// The status line shown under the submit button.
impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Idle => Ok(()),
            SubmissionStatus::Submitting => f.write_str("Submitting..."),
            SubmissionStatus::Succeeded(number) => write!(f, "Submitted ✔ Form #: {number}"),
            SubmissionStatus::Failed => f.write_str("Submission failed."),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("a submission is already in flight for session {0}")]
    InFlight(SessionId),
}

/// Builds the wire payload. Hazards, PPE and controls are listed in catalog
/// order; controls of deselected hazards are left out.
pub fn build_payload(
    state: &FormState,
    catalog: &HazardCatalog,
    signatures: EncodedSignatures,
) -> SubmitFormRequest {
    let hazards: Vec<String> = catalog
        .hazards()
        .filter(|hazard| state.is_hazard_selected(hazard))
        .map(str::to_string)
        .collect();
    let hazard_controls: BTreeMap<String, Vec<String>> = hazards
        .iter()
        .map(|hazard| {
            let controls = active_controls(catalog, state, hazard)
                .into_iter()
                .map(str::to_string)
                .collect();
            (hazard.clone(), controls)
        })
        .collect();
    let ppe = catalog
        .ppe_options()
        .iter()
        .filter(|item| state.ppe.contains(item.as_str()))
        .cloned()
        .collect();
    let [worker_signature, client_signature, supervisor_signature] = signatures.into_parts();

    SubmitFormRequest {
        company: state.company.clone(),
        job_description: state.job_description.clone(),
        location: state.location.clone(),
        date: state.date.clone(),
        hazards,
        hazard_controls,
        ppe,
        additional_hazards: state.additional_hazards.clone(),
        additional_controls: state.additional_controls.clone(),
        tailgate_meeting: state.tailgate_meeting.clone(),
        representatives: state.representatives.clone(),
        representative_company: state.representative_company.clone(),
        representative_emergency_contact: state.representative_emergency_contact.clone(),
        client_emergency_contact: state.client_emergency_contact.clone(),
        worker_signature,
        client_name: state.client_name.clone(),
        client_signature,
        client_contact_number: state.client_contact_number.clone(),
        supervisor_name: state.supervisor_name.clone(),
        supervisor_signature,
        supervisor_contact_number: state.supervisor_contact_number.clone(),
    }
}

/// Drives `Idle -> Submitting -> Succeeded | Failed` for one form session and
/// publishes every transition on a watch channel.
pub struct SubmissionCoordinator {
    session_id: SessionId,
    transport: Arc<dyn FormTransport>,
    status: watch::Sender<SubmissionStatus>,
}

impl SubmissionCoordinator {
    pub fn new(session_id: SessionId, transport: Arc<dyn FormTransport>) -> Self {
        let (status, _) = watch::channel(SubmissionStatus::Idle);
        Self {
            session_id,
            transport,
            status,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
        self.status.subscribe()
    }

    /// Exports signatures, sends the form and folds the outcome into the
    /// status. Transport failures end in [`SubmissionStatus::Failed`] and
    /// are only logged; the sole error is a rejected concurrent call.
    pub async fn submit<P: SignaturePad>(
        &self,
        form: &SelectionModel,
        signatures: &SignatureBoard<P>,
    ) -> Result<SubmissionStatus, SubmitRejected> {
        if self.status.borrow().is_submitting() {
            warn!(session = %self.session_id, "submit ignored: request already in flight");
            return Err(SubmitRejected::InFlight(self.session_id));
        }

        let prepared = signatures
            .export_all()
            .map(|encoded| build_payload(form.state(), form.catalog(), encoded));

        let claimed = self.status.send_if_modified(|status| {
            if status.is_submitting() {
                return false;
            }
            *status = SubmissionStatus::Submitting;
            true
        });
        if !claimed {
            return Err(SubmitRejected::InFlight(self.session_id));
        }
        let in_flight = InFlight {
            session_id: self.session_id,
            status: &self.status,
            settled: false,
        };

        let payload = match prepared {
            Ok(payload) => payload,
            Err(err) => {
                error!(session = %self.session_id, error = ?err, "failed to prepare hazard form");
                return Ok(in_flight.settle(SubmissionStatus::Failed));
            }
        };

        info!(
            session = %self.session_id,
            hazards = payload.hazards.len(),
            ppe = payload.ppe.len(),
            "submitting hazard form"
        );

        let outcome = match self.transport.submit_form(&payload).await {
            Ok(response) => {
                info!(
                    session = %self.session_id,
                    form_number = %response.form_number,
                    "hazard form accepted"
                );
                SubmissionStatus::Succeeded(response.form_number)
            }
            Err(err) => {
                error!(session = %self.session_id, error = %err, "error submitting hazard form");
                SubmissionStatus::Failed
            }
        };
        Ok(in_flight.settle(outcome))
    }
}

/// Holds the `Submitting` claim. Dropping it unsettled (the submit future
/// was cancelled mid-request) moves the session to `Failed`.
struct InFlight<'a> {
    session_id: SessionId,
    status: &'a watch::Sender<SubmissionStatus>,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, status: SubmissionStatus) -> SubmissionStatus {
        self.settled = true;
        self.status.send_replace(status.clone());
        status
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            error!(session = %self.session_id, "hazard form submission abandoned before a response");
            self.status.send_replace(SubmissionStatus::Failed);
        }
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
