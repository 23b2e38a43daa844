use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FieldNameError;

/// Number of print lines in the representatives roster.
pub const REPRESENTATIVE_SLOTS: usize = 6;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(SessionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureRole {
    Worker,
    Client,
    Supervisor,
}

impl SignatureRole {
    pub const ALL: [SignatureRole; 3] = [
        SignatureRole::Worker,
        SignatureRole::Client,
        SignatureRole::Supervisor,
    ];

    pub fn index(self) -> usize {
        match self {
            SignatureRole::Worker => 0,
            SignatureRole::Client => 1,
            SignatureRole::Supervisor => 2,
        }
    }

    /// Name of the payload field carrying this role's encoded signature.
    pub fn payload_field(self) -> &'static str {
        match self {
            SignatureRole::Worker => "workerSignature",
            SignatureRole::Client => "clientSignature",
            SignatureRole::Supervisor => "supervisorSignature",
        }
    }
}

impl fmt::Display for SignatureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignatureRole::Worker => "worker",
            SignatureRole::Client => "client",
            SignatureRole::Supervisor => "supervisor",
        };
        f.write_str(label)
    }
}

/// Every free-text field on the assessment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    Company,
    JobDescription,
    Location,
    Date,
    AdditionalHazards,
    AdditionalControls,
    TailgateMeeting,
    RepresentativeCompany,
    RepresentativeEmergencyContact,
    ClientEmergencyContact,
    ClientName,
    ClientContactNumber,
    SupervisorName,
    SupervisorContactNumber,
}

impl TextField {
    pub const ALL: [TextField; 14] = [
        TextField::Company,
        TextField::JobDescription,
        TextField::Location,
        TextField::Date,
        TextField::AdditionalHazards,
        TextField::AdditionalControls,
        TextField::TailgateMeeting,
        TextField::RepresentativeCompany,
        TextField::RepresentativeEmergencyContact,
        TextField::ClientEmergencyContact,
        TextField::ClientName,
        TextField::ClientContactNumber,
        TextField::SupervisorName,
        TextField::SupervisorContactNumber,
    ];

    /// Wire name used in the submission payload.
    pub fn wire_name(self) -> &'static str {
        match self {
            TextField::Company => "company",
            TextField::JobDescription => "jobDescription",
            TextField::Location => "location",
            TextField::Date => "date",
            TextField::AdditionalHazards => "additionalHazards",
            TextField::AdditionalControls => "additionalControls",
            TextField::TailgateMeeting => "tailgateMeeting",
            TextField::RepresentativeCompany => "representativeCompany",
            TextField::RepresentativeEmergencyContact => "representativeEmergencyContact",
            TextField::ClientEmergencyContact => "clientEmergencyContact",
            TextField::ClientName => "clientName",
            TextField::ClientContactNumber => "clientContactNumber",
            TextField::SupervisorName => "supervisorName",
            TextField::SupervisorContactNumber => "supervisorContactNumber",
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for TextField {
    type Err = FieldNameError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        TextField::ALL
            .into_iter()
            .find(|field| field.wire_name() == raw)
            .ok_or_else(|| FieldNameError::Unknown(raw.to_string()))
    }
}
