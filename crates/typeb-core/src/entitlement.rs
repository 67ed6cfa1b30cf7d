//! Entitlements: subscription tier per user, driven by billing webhooks.
//!
//! Layout:
//!   .typeb/entitlements.yaml   map of user id to entitlement
//!
//! A family's effective plan is Premium iff any of its parents holds a
//! Premium entitlement; that is what gates the member limit at join time.

use crate::error::{Result, TypebError};
use crate::family::Family;
use crate::io;
use crate::paths;
use crate::types::Plan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    pub user_id: String,
    pub plan: Plan,
    pub updated_at: DateTime<Utc>,
    /// Id of the billing event that last touched this record.
    pub last_event_id: String,
    /// Every event id ever applied to this record. Replays of any of them,
    /// not just the latest, are no-ops.
    #[serde(default)]
    pub applied_event_ids: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingEventType {
    InitialPurchase,
    Renewal,
    Cancellation,
    Expiration,
}

impl BillingEventType {
    pub fn grants_premium(self) -> bool {
        matches!(
            self,
            BillingEventType::InitialPurchase | BillingEventType::Renewal
        )
    }
}

impl fmt::Display for BillingEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BillingEventType::InitialPurchase => "initial_purchase",
            BillingEventType::Renewal => "renewal",
            BillingEventType::Cancellation => "cancellation",
            BillingEventType::Expiration => "expiration",
        };
        f.write_str(s)
    }
}

/// The JSON payload the billing service posts to the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: BillingEventType,
    pub app_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

fn load_all(root: &Path) -> Result<BTreeMap<String, Entitlement>> {
    Ok(io::load_yaml(&paths::entitlements_path(root))?.unwrap_or_default())
}

fn save_all(root: &Path, entitlements: &BTreeMap<String, Entitlement>) -> Result<()> {
    io::save_yaml(&paths::entitlements_path(root), entitlements)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Apply a billing event, updating the user's tier. Idempotent by event id:
/// replaying any event already applied to the record changes nothing, even
/// if newer events have landed since.
pub fn apply_event(root: &Path, event: &BillingEvent) -> Result<Entitlement> {
    paths::validate_id(&event.app_user_id)
        .map_err(|_| TypebError::InvalidId(event.app_user_id.clone()))?;

    let mut entitlements = load_all(root)?;
    let mut applied_event_ids = BTreeSet::new();
    if let Some(existing) = entitlements.get(&event.app_user_id) {
        if existing.last_event_id == event.id || existing.applied_event_ids.contains(&event.id) {
            return Ok(existing.clone());
        }
        applied_event_ids = existing.applied_event_ids.clone();
        applied_event_ids.insert(existing.last_event_id.clone());
    }
    applied_event_ids.insert(event.id.clone());

    let plan = if event.event_type.grants_premium() {
        Plan::Premium
    } else {
        Plan::Free
    };
    let entitlement = Entitlement {
        user_id: event.app_user_id.clone(),
        plan,
        updated_at: Utc::now(),
        last_event_id: event.id.clone(),
        applied_event_ids,
    };
    entitlements.insert(event.app_user_id.clone(), entitlement.clone());
    save_all(root, &entitlements)?;

    tracing::info!(
        user = %entitlement.user_id,
        plan = %entitlement.plan,
        event = %event.event_type,
        "entitlement updated"
    );
    Ok(entitlement)
}

/// A user's current tier; Free when no entitlement is on file.
pub fn plan_for(root: &Path, user_id: &str) -> Result<Plan> {
    Ok(load_all(root)?
        .get(user_id)
        .map(|e| e.plan)
        .unwrap_or(Plan::Free))
}

/// Premium iff any parent of the family holds a Premium entitlement.
pub fn effective_plan(root: &Path, family: &Family) -> Result<Plan> {
    let entitlements = load_all(root)?;
    let premium = family.parents().iter().any(|p| {
        entitlements
            .get(&p.id)
            .is_some_and(|e| e.plan == Plan::Premium)
    });
    Ok(if premium { Plan::Premium } else { Plan::Free })
}

pub fn list(root: &Path) -> Result<Vec<Entitlement>> {
    Ok(load_all(root)?.into_values().collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
