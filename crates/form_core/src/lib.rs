//! Form state and submission engine for the site specific hazard assessment.

pub mod selection;
pub mod session;
pub mod settings;
pub mod signature;
pub mod submission;
pub mod transport;

pub use selection::{FormState, SelectionModel, ToggleOutcome};
pub use session::FormSession;
pub use settings::{load_settings, ClientSettings, SettingsError};
pub use signature::{
    EncodedSignatures, Point, SignatureBoard, SignatureError, SignaturePad, StrokeCanvas,
};
pub use submission::{build_payload, SubmissionCoordinator, SubmissionStatus, SubmitRejected};
pub use transport::{FormTransport, HttpTransport, TransportError};
