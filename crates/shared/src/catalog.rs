//! Static hazard, control and PPE vocabulary the form engine selects from.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardCatalogEntry {
    #[serde(rename = "name")]
    pub hazard: String,
    pub controls: Vec<String>,
}

impl HazardCatalogEntry {
    pub fn new(hazard: impl Into<String>, controls: &[&str]) -> Self {
        Self {
            hazard: hazard.into(),
            controls: controls.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    pub fn allows(&self, control: &str) -> bool {
        self.controls.iter().any(|c| c == control)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    ppe: Vec<String>,
    #[serde(default)]
    hazards: Vec<HazardCatalogEntry>,
}

/// Immutable catalog. Ordering of hazards, controls and PPE items is the
/// insertion order and is what payload serialization follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardCatalog {
    entries: Vec<HazardCatalogEntry>,
    ppe: Vec<String>,
}

impl HazardCatalog {
    pub fn new(entries: Vec<HazardCatalogEntry>, ppe: Vec<String>) -> Result<Self, CatalogError> {
        let mut seen_hazards = HashSet::new();
        for entry in &entries {
            if entry.hazard.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !seen_hazards.insert(entry.hazard.as_str()) {
                return Err(CatalogError::DuplicateHazard(entry.hazard.clone()));
            }
            let mut seen_controls = HashSet::new();
            for control in &entry.controls {
                if control.trim().is_empty() {
                    return Err(CatalogError::EmptyName);
                }
                if !seen_controls.insert(control.as_str()) {
                    return Err(CatalogError::DuplicateControl {
                        hazard: entry.hazard.clone(),
                        control: control.clone(),
                    });
                }
            }
        }

        let mut seen_ppe = HashSet::new();
        for item in &ppe {
            if item.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !seen_ppe.insert(item.as_str()) {
                return Err(CatalogError::DuplicatePpe(item.clone()));
            }
        }

        Ok(Self { entries, ppe })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = toml::from_str(raw)?;
        Self::new(doc.hazards, doc.ppe)
    }

    pub fn entries(&self) -> &[HazardCatalogEntry] {
        &self.entries
    }

    pub fn hazards(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.hazard.as_str())
    }

    pub fn ppe_options(&self) -> &[String] {
        &self.ppe
    }

    pub fn entry(&self, hazard: &str) -> Option<&HazardCatalogEntry> {
        self.entries.iter().find(|e| e.hazard == hazard)
    }

    pub fn controls_for(&self, hazard: &str) -> Option<&[String]> {
        self.entry(hazard).map(|e| e.controls.as_slice())
    }

    pub fn is_hazard(&self, hazard: &str) -> bool {
        self.entry(hazard).is_some()
    }

    pub fn allows_control(&self, hazard: &str, control: &str) -> bool {
        self.entry(hazard).is_some_and(|e| e.allows(control))
    }

    pub fn is_ppe(&self, item: &str) -> bool {
        self.ppe.iter().any(|p| p == item)
    }

    /// The catalog printed on the company's paper assessment form.
    pub fn site_default() -> Self {
        let entries = vec![
            HazardCatalogEntry::new(
                "Auto Starting Equipment",
                &["Auto Start Signage", "Guards", "SWP-009 Lockout/Tag Out", "PPE"],
            ),
            HazardCatalogEntry::new(
                "Biohazards",
                &["SWP-002 Chemical & Biological Hazards", "MSDS", "PPE"],
            ),
            HazardCatalogEntry::new(
                "Compressed Gases",
                &["SWP-020 Compressed Gas Cylinders", "MSDS", "Isolation"],
            ),
            HazardCatalogEntry::new(
                "Driving",
                &["Adhere to Posted Speed Limits", "Road Conditions", "Defensive Driving"],
            ),
            HazardCatalogEntry::new(
                "Electrical",
                &["SWP-009 Lockout/Tag Out", "Grounding & Bonding", "PPE"],
            ),
            HazardCatalogEntry::new(
                "Explosive/Flammable Gas",
                &["Gas Monitor", "Ventilation", "Ignition Control", "MSDS"],
            ),
            HazardCatalogEntry::new(
                "Extreme Heat",
                &["Hydration", "Rest Breaks", "Protective Clothing"],
            ),
            HazardCatalogEntry::new(
                "Flying Debris/Dust",
                &["Safety Glasses/Goggles", "Face Shield", "Dust Mask/Respirator"],
            ),
            HazardCatalogEntry::new(
                "Fuelling Equipment",
                &["No Smoking", "Spill Kit", "Fire Extinguisher"],
            ),
            HazardCatalogEntry::new("Hazardous Materials", &["MSDS", "Proper Storage", "PPE"]),
            HazardCatalogEntry::new(
                "Hot Fluids",
                &["Insulated Gloves", "Face Shield", "SWP-009 Lockout/Tag Out"],
            ),
            HazardCatalogEntry::new(
                "Housekeeping/Inspections",
                &["Daily Inspection", "Clean Work Area", "Remove Trip Hazards"],
            ),
            HazardCatalogEntry::new(
                "Ignition Source",
                &["No Smoking", "Fire Watch", "Fire Extinguisher"],
            ),
            HazardCatalogEntry::new(
                "Illumination",
                &["Adequate Lighting", "Portable Lights", "Flashlights"],
            ),
            HazardCatalogEntry::new(
                "Inhalation Vapour",
                &["Respiratory Protection", "Ventilation", "MSDS"],
            ),
            HazardCatalogEntry::new(
                "Manual Lifting",
                &["SWP-010 Manual Lifting", "Buddy System", "Proper Technique"],
            ),
            HazardCatalogEntry::new(
                "Mechanical Lifting",
                &["SWP-011 Mechanical Lifting", "Certified Equipment", "Spotter"],
            ),
            HazardCatalogEntry::new(
                "Noise Levels",
                &["Hearing Protection", "Double Hearing Protection", "Noise Monitoring"],
            ),
            HazardCatalogEntry::new(
                "Open Flame",
                &["Hot Work Permit", "Fire Watch", "Fire Extinguisher"],
            ),
            HazardCatalogEntry::new(
                "Pinch Points/Crushing",
                &["Guards", "SWP-009 Lockout/Tag Out", "Awareness Training"],
            ),
            HazardCatalogEntry::new(
                "Rigging/Ropes/Slings",
                &["SWP-012 Rigging", "Certified Slings", "Inspection Before Use"],
            ),
            HazardCatalogEntry::new(
                "Rotating Equipment",
                &["Guards", "SWP-009 Lockout/Tag Out", "PPE"],
            ),
            HazardCatalogEntry::new(
                "Slips/Trips/Falls",
                &["Housekeeping", "Slip Resistant Boots", "Fall Protection"],
            ),
            HazardCatalogEntry::new(
                "Weather",
                &["Weather Monitoring", "Protective Clothing", "Work Suspension if Unsafe"],
            ),
            HazardCatalogEntry::new(
                "Wildlife",
                &["Awareness Training", "Bear Spray", "Avoidance Procedures"],
            ),
            HazardCatalogEntry::new(
                "Working Alone",
                &["Check-In Procedure", "Communication Device", "Emergency Plan"],
            ),
        ];
        let ppe = [
            "Safety Glasses/Goggles",
            "Gloves",
            "Hard Hat",
            "Respiratory Protection",
            "Fire Retardant Coveralls",
            "Double Hearing Protection",
            "Safety Boots",
            "Gas Monitor",
            "Face Shield",
        ]
        .iter()
        .map(|p| (*p).to_string())
        .collect();

        Self { entries, ppe }
    }
}
