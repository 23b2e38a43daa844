use std::sync::Arc;

use shared::{catalog::HazardCatalog, domain::SessionId};
use tokio::sync::watch;

use crate::{
    selection::SelectionModel,
    signature::{SignatureBoard, SignaturePad, StrokeCanvas},
    submission::{SubmissionCoordinator, SubmissionStatus, SubmitRejected},
    transport::FormTransport,
};

/// Everything one person filling out one assessment owns. Nothing here is
/// shared with other sessions apart from the read-only catalog.
pub struct FormSession<P = StrokeCanvas> {
    pub selection: SelectionModel,
    pub signatures: SignatureBoard<P>,
    coordinator: SubmissionCoordinator,
}

impl FormSession<StrokeCanvas> {
    pub fn new(catalog: Arc<HazardCatalog>, transport: Arc<dyn FormTransport>) -> Self {
        Self::with_signatures(catalog, transport, SignatureBoard::blank())
    }
}

impl<P: SignaturePad> FormSession<P> {
    pub fn with_signatures(
        catalog: Arc<HazardCatalog>,
        transport: Arc<dyn FormTransport>,
        signatures: SignatureBoard<P>,
    ) -> Self {
        Self {
            selection: SelectionModel::new(catalog),
            signatures,
            coordinator: SubmissionCoordinator::new(SessionId::new(), transport),
        }
    }

    pub fn id(&self) -> SessionId {
        self.coordinator.session_id()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.coordinator.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SubmissionStatus> {
        self.coordinator.subscribe()
    }

    pub async fn submit(&self) -> Result<SubmissionStatus, SubmitRejected> {
        self.coordinator
            .submit(&self.selection, &self.signatures)
            .await
    }
}
