//! Static recipient directory.
//!
//! Maps equipment to the users who should hear about its alerts: every
//! policy maker, plus the managers and trainers of the lab that owns it.
//! Seeded from a JSON file at startup.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::foundation::{DomainError, EquipmentId, ErrorCode, LabId, UserId};
use crate::ports::RecipientDirectory;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySeed {
    #[serde(default)]
    pub policy_makers: Vec<UserId>,
    #[serde(default)]
    pub labs: Vec<LabSeed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabSeed {
    pub lab_id: LabId,
    #[serde(default)]
    pub managers: Vec<UserId>,
    #[serde(default)]
    pub trainers: Vec<UserId>,
    #[serde(default)]
    pub equipment: Vec<EquipmentId>,
}

#[derive(Debug, Default)]
pub struct StaticRecipientDirectory {
    policy_makers: Vec<UserId>,
    staff_by_lab: HashMap<LabId, Vec<UserId>>,
    lab_by_equipment: HashMap<EquipmentId, LabId>,
}

impl StaticRecipientDirectory {
    pub fn new(seed: DirectorySeed) -> Self {
        let mut directory = Self {
            policy_makers: seed.policy_makers,
            ..Default::default()
        };
        for lab in seed.labs {
            for equipment_id in lab.equipment {
                directory.lab_by_equipment.insert(equipment_id, lab.lab_id.clone());
            }
            let staff = directory.staff_by_lab.entry(lab.lab_id).or_default();
            staff.extend(lab.managers);
            staff.extend(lab.trainers);
        }
        directory
    }

    /// An empty directory notifies nobody.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let seed: DirectorySeed = serde_json::from_str(json).map_err(|e| {
            DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Invalid recipient directory: {}", e),
            )
        })?;
        Ok(Self::new(seed))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to read recipient directory {}: {}", path.display(), e),
            )
        })?;
        Self::from_json(&json)
    }
}

#[async_trait]
impl RecipientDirectory for StaticRecipientDirectory {
    async fn recipients_for(&self, equipment_id: &EquipmentId) -> Result<Vec<UserId>, DomainError> {
        let mut recipients = self.policy_makers.clone();
        if let Some(staff) = self
            .lab_by_equipment
            .get(equipment_id)
            .and_then(|lab| self.staff_by_lab.get(lab))
        {
            recipients.extend(staff.iter().cloned());
        }
        recipients.sort();
        recipients.dedup();
        Ok(recipients)
    }
}
