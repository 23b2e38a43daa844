use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::REPRESENTATIVE_SLOTS;

/// Body of `POST /submit-form`. Every field is always present, blank or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormRequest {
    pub company: String,
    pub job_description: String,
    pub location: String,
    pub date: String,
    pub hazards: Vec<String>,
    pub hazard_controls: BTreeMap<String, Vec<String>>,
    pub ppe: Vec<String>,
    pub additional_hazards: String,
    pub additional_controls: String,
    pub tailgate_meeting: String,
    pub representatives: [String; REPRESENTATIVE_SLOTS],
    pub representative_company: String,
    pub representative_emergency_contact: String,
    pub client_emergency_contact: String,
    pub worker_signature: String,
    pub client_name: String,
    pub client_signature: String,
    pub client_contact_number: String,
    pub supervisor_name: String,
    pub supervisor_signature: String,
    pub supervisor_contact_number: String,
}

/// Server-assigned identifier echoed back to the user. The backend may send
/// it as a JSON string or number; either way it is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FormNumber(pub String);

impl FormNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FormNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => FormNumber(text),
            Raw::Number(number) => FormNumber(number.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormResponse {
    pub form_number: FormNumber,
}
