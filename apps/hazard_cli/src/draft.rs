//! TOML drafts of a filled-in assessment, replayed through the selection
//! model the same way a person clicking through the form would.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use form_core::{FormSession, Point, SelectionModel, ToggleOutcome};
use serde::Deserialize;
use shared::domain::{SignatureRole, TextField, REPRESENTATIVE_SLOTS};
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub hazards: Vec<String>,
    #[serde(default)]
    pub ppe: Vec<String>,
    #[serde(default)]
    pub representatives: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub controls: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub signatures: Vec<DraftSignature>,
}

#[derive(Debug, Deserialize)]
pub struct DraftSignature {
    pub role: SignatureRole,
    pub strokes: Vec<Vec<[f32; 2]>>,
}

impl Draft {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("failed to parse draft")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read draft '{}'", path.display()))?;
        Self::from_toml_str(&raw)
    }

    /// Replays the draft into `session`. Entries the catalog does not know
    /// are skipped with a warning; unknown field names and an overlong
    /// roster are errors.
    pub fn apply(&self, session: &mut FormSession) -> Result<()> {
        if self.representatives.len() > REPRESENTATIVE_SLOTS {
            bail!(
                "draft lists {} representatives; the form has {REPRESENTATIVE_SLOTS} lines",
                self.representatives.len()
            );
        }

        let form = &mut session.selection;
        for (name, value) in &self.fields {
            let field: TextField = name
                .parse()
                .with_context(|| format!("draft field '{name}'"))?;
            form.set_field(field, value.as_str());
        }

        for hazard in &self.hazards {
            if form.toggle_hazard(hazard) == ToggleOutcome::Ignored {
                warn!(%hazard, "draft hazard is not in the catalog; skipped");
            }
        }
        for (hazard, controls) in &self.controls {
            for control in controls {
                if form.toggle_control(hazard, control) == ToggleOutcome::Ignored {
                    warn!(%hazard, %control, "draft control does not apply; skipped");
                }
            }
        }
        for item in &self.ppe {
            if form.toggle_ppe(item) == ToggleOutcome::Ignored {
                warn!(%item, "draft PPE item is not in the catalog; skipped");
            }
        }
        for (index, name) in self.representatives.iter().enumerate() {
            form.set_representative(index, name.as_str());
        }

        for signature in &self.signatures {
            let pad = session.signatures.pad_mut(signature.role);
            for stroke in &signature.strokes {
                let points: Vec<Point> = stroke.iter().map(|[x, y]| Point::new(*x, *y)).collect();
                pad.draw_stroke(&points);
            }
        }

        Ok(())
    }
}

/// Writes `today` as `YYYY-MM-DD` into an empty date field. Returns whether
/// the field was filled.
pub fn fill_missing_date(form: &mut SelectionModel, today: NaiveDate) -> bool {
    if !form.state().date.is_empty() {
        return false;
    }
    form.set_field(TextField::Date, today.format("%Y-%m-%d").to_string());
    true
}
