//! Hazard, control and PPE selection state with copy-on-write snapshots.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use shared::{
    catalog::HazardCatalog,
    domain::{TextField, REPRESENTATIVE_SLOTS},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The target is not eligible in the catalog (or its hazard is not
    /// selected); state was left untouched.
    Ignored,
}

/// One immutable version of the assessment form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub company: String,
    pub job_description: String,
    pub location: String,
    pub date: String,
    pub hazards: BTreeSet<String>,
    /// Controls keyed by hazard. Entries for a deselected hazard are kept so
    /// they come back on reselection, but they are inert until then.
    pub hazard_controls: BTreeMap<String, BTreeSet<String>>,
    pub ppe: BTreeSet<String>,
    pub additional_hazards: String,
    pub additional_controls: String,
    pub tailgate_meeting: String,
    pub representatives: [String; REPRESENTATIVE_SLOTS],
    pub representative_company: String,
    pub representative_emergency_contact: String,
    pub client_emergency_contact: String,
    pub client_name: String,
    pub client_contact_number: String,
    pub supervisor_name: String,
    pub supervisor_contact_number: String,
}

impl FormState {
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Company => &self.company,
            TextField::JobDescription => &self.job_description,
            TextField::Location => &self.location,
            TextField::Date => &self.date,
            TextField::AdditionalHazards => &self.additional_hazards,
            TextField::AdditionalControls => &self.additional_controls,
            TextField::TailgateMeeting => &self.tailgate_meeting,
            TextField::RepresentativeCompany => &self.representative_company,
            TextField::RepresentativeEmergencyContact => &self.representative_emergency_contact,
            TextField::ClientEmergencyContact => &self.client_emergency_contact,
            TextField::ClientName => &self.client_name,
            TextField::ClientContactNumber => &self.client_contact_number,
            TextField::SupervisorName => &self.supervisor_name,
            TextField::SupervisorContactNumber => &self.supervisor_contact_number,
        }
    }

    fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Company => &mut self.company,
            TextField::JobDescription => &mut self.job_description,
            TextField::Location => &mut self.location,
            TextField::Date => &mut self.date,
            TextField::AdditionalHazards => &mut self.additional_hazards,
            TextField::AdditionalControls => &mut self.additional_controls,
            TextField::TailgateMeeting => &mut self.tailgate_meeting,
            TextField::RepresentativeCompany => &mut self.representative_company,
            TextField::RepresentativeEmergencyContact => {
                &mut self.representative_emergency_contact
            }
            TextField::ClientEmergencyContact => &mut self.client_emergency_contact,
            TextField::ClientName => &mut self.client_name,
            TextField::ClientContactNumber => &mut self.client_contact_number,
            TextField::SupervisorName => &mut self.supervisor_name,
            TextField::SupervisorContactNumber => &mut self.supervisor_contact_number,
        }
    }

    pub fn is_hazard_selected(&self, hazard: &str) -> bool {
        self.hazards.contains(hazard)
    }

    /// Controls recorded for `hazard`, including inert ones left over from a
    /// deselection.
    pub fn stored_controls(&self, hazard: &str) -> Option<&BTreeSet<String>> {
        self.hazard_controls.get(hazard)
    }
}

fn flip(set: &mut BTreeSet<String>, value: &str) -> ToggleOutcome {
    if set.remove(value) {
        ToggleOutcome::Removed
    } else {
        set.insert(value.to_string());
        ToggleOutcome::Added
    }
}

/// Owns the current form snapshot and the catalog it is validated against.
///
/// Every mutation goes through [`Arc::make_mut`], so a snapshot handed out
/// by [`SelectionModel::snapshot`] is never changed underneath its holder.
#[derive(Debug, Clone)]
pub struct SelectionModel {
    catalog: Arc<HazardCatalog>,
    state: Arc<FormState>,
}

impl SelectionModel {
    pub fn new(catalog: Arc<HazardCatalog>) -> Self {
        Self {
            catalog,
            state: Arc::new(FormState::default()),
        }
    }

    pub fn catalog(&self) -> &Arc<HazardCatalog> {
        &self.catalog
    }

    pub fn snapshot(&self) -> Arc<FormState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn toggle_hazard(&mut self, hazard: &str) -> ToggleOutcome {
        if !self.catalog.is_hazard(hazard) {
            debug!(hazard, "ignoring toggle of hazard missing from catalog");
            return ToggleOutcome::Ignored;
        }
        flip(&mut Arc::make_mut(&mut self.state).hazards, hazard)
    }

    pub fn toggle_control(&mut self, hazard: &str, control: &str) -> ToggleOutcome {
        if !self.state.is_hazard_selected(hazard) {
            debug!(hazard, control, "ignoring control toggle for unselected hazard");
            return ToggleOutcome::Ignored;
        }
        if !self.catalog.allows_control(hazard, control) {
            debug!(hazard, control, "ignoring control not listed under hazard");
            return ToggleOutcome::Ignored;
        }
        let controls = Arc::make_mut(&mut self.state)
            .hazard_controls
            .entry(hazard.to_string())
            .or_default();
        flip(controls, control)
    }

    pub fn toggle_ppe(&mut self, item: &str) -> ToggleOutcome {
        if !self.catalog.is_ppe(item) {
            debug!(item, "ignoring toggle of PPE item missing from catalog");
            return ToggleOutcome::Ignored;
        }
        flip(&mut Arc::make_mut(&mut self.state).ppe, item)
    }

    /// Replaces the roster line at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`REPRESENTATIVE_SLOTS`].
    pub fn set_representative(&mut self, index: usize, value: impl Into<String>) {
        assert!(
            index < REPRESENTATIVE_SLOTS,
            "representative index {index} out of range (0..{REPRESENTATIVE_SLOTS})"
        );
        Arc::make_mut(&mut self.state).representatives[index] = value.into();
    }

    pub fn set_field(&mut self, field: TextField, value: impl Into<String>) {
        *Arc::make_mut(&mut self.state).text_mut(field) = value.into();
    }

    /// Selected hazards in catalog order.
    pub fn selected_hazards(&self) -> Vec<&str> {
        self.catalog
            .hazards()
            .filter(|hazard| self.state.is_hazard_selected(hazard))
            .collect()
    }

    /// Whether the controls of `hazard` accept input right now.
    pub fn controls_enabled(&self, hazard: &str) -> bool {
        self.state.is_hazard_selected(hazard)
    }

    /// Effective controls for `hazard` in catalog order. Empty while the
    /// hazard is deselected, even if controls are still stored for it.
    pub fn selected_controls(&self, hazard: &str) -> Vec<&str> {
        active_controls(&self.catalog, &self.state, hazard)
    }

    /// Selected PPE items in catalog order.
    pub fn selected_ppe(&self) -> Vec<&str> {
        self.catalog
            .ppe_options()
            .iter()
            .map(String::as_str)
            .filter(|item| self.state.ppe.contains(*item))
            .collect()
    }
}

pub(crate) fn active_controls<'a>(
    catalog: &'a HazardCatalog,
    state: &FormState,
    hazard: &str,
) -> Vec<&'a str> {
    if !state.is_hazard_selected(hazard) {
        return Vec::new();
    }
    let (Some(allowed), Some(chosen)) = (catalog.controls_for(hazard), state.stored_controls(hazard))
    else {
        return Vec::new();
    };
    allowed
        .iter()
        .map(String::as_str)
        .filter(|control| chosen.contains(*control))
        .collect()
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
