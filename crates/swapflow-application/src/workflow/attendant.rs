//! Attendant-side battery swap workflow.
//!
//! Six steps: identify the customer, take back the depleted battery, issue
//! a charged one, review the computed cost, confirm payment, done. The
//! session engine stores each step's payload as opaque JSON; this module
//! owns the concrete schemas and drives a [`SessionContext`] through them.

use anyhow::{Result, anyhow};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swapflow_core::session::{Session, SessionContext, WorkflowKind};

use super::CompletionMark;

/// Usable capacity of a swap battery in kWh.
pub const BATTERY_CAPACITY_KWH: f64 = 2.5;

/// Energy tariff in XOF per kWh.
pub const ENERGY_RATE_XOF: u32 = 120;

/// Customer identity captured at step 1 (QR scan or manual lookup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub id: String,
    pub subscription_id: String,
    pub name: String,
    pub initials: String,
    pub plan: String,
}

/// A scanned battery: id plus charge percentage.
///
/// `verified` is present only for the returned battery, where ownership
/// is checked against the subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryReading {
    pub id: String,
    pub charge: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// Cost of the energy delta between the returned and issued batteries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapCost {
    /// Energy delivered in kWh, rounded to two decimals.
    pub energy_diff: f64,
    /// Tariff applied, XOF per kWh.
    pub rate: u32,
    /// Amount due in XOF, rounded to the nearest franc.
    pub total: u32,
}

impl SwapCost {
    /// Prices the charge difference between two readings.
    ///
    /// An issued battery at or below the returned charge prices as zero.
    pub fn calculate(old_charge: u8, new_charge: u8) -> Self {
        let delta = new_charge.saturating_sub(old_charge) as f64;
        let energy = (delta / 100.0 * BATTERY_CAPACITY_KWH * 100.0).round() / 100.0;
        let total = (energy * ENERGY_RATE_XOF as f64).round() as u32;
        Self {
            energy_diff: energy,
            rate: ENERGY_RATE_XOF,
            total,
        }
    }
}

/// How a payment was confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Customer payment QR scanned at the counter.
    #[default]
    Scan,
    /// Transaction reference typed in by the attendant.
    Manual,
}

/// Payment confirmation recorded at step 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub confirmed: bool,
    pub txn_id: String,
    #[serde(default)]
    pub method: PaymentMethod,
    /// Quick-scan confirmations historically stored this under `time`.
    #[serde(default, alias = "time")]
    pub timestamp: String,
}

/// Typed view of one attendant-swap step payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AttendantStepData {
    Customer(CustomerDetails),
    OldBattery(BatteryReading),
    NewBattery(BatteryReading),
    Cost(SwapCost),
    Payment(PaymentReceipt),
    Completion(CompletionMark),
}

impl AttendantStepData {
    /// Step number this payload belongs to, in [1, 6].
    pub fn step(&self) -> u8 {
        match self {
            Self::Customer(_) => 1,
            Self::OldBattery(_) => 2,
            Self::NewBattery(_) => 3,
            Self::Cost(_) => 4,
            Self::Payment(_) => 5,
            Self::Completion(_) => 6,
        }
    }

    /// Serializes into the stored payload shape. No tag is written; the
    /// step number determines the schema.
    pub fn into_value(self) -> Result<Value> {
        let value = match self {
            Self::Customer(v) => serde_json::to_value(v)?,
            Self::OldBattery(v) => serde_json::to_value(v)?,
            Self::NewBattery(v) => serde_json::to_value(v)?,
            Self::Cost(v) => serde_json::to_value(v)?,
            Self::Payment(v) => serde_json::to_value(v)?,
            Self::Completion(v) => serde_json::to_value(v)?,
        };
        Ok(value)
    }

    /// Parses a stored payload back into its typed form.
    /// `None` for unknown steps or payloads that do not match the schema.
    pub fn from_step(step: u8, payload: &Value) -> Option<Self> {
        let parsed = match step {
            1 => Self::Customer(serde_json::from_value(payload.clone()).ok()?),
            2 => Self::OldBattery(serde_json::from_value(payload.clone()).ok()?),
            3 => Self::NewBattery(serde_json::from_value(payload.clone()).ok()?),
            4 => Self::Cost(serde_json::from_value(payload.clone()).ok()?),
            5 => Self::Payment(serde_json::from_value(payload.clone()).ok()?),
            6 => Self::Completion(serde_json::from_value(payload.clone()).ok()?),
            _ => return None,
        };
        Some(parsed)
    }
}

/// Drives an attendant-swap session through its six steps.
///
/// The flow wraps a [`SessionContext`] and records typed payloads in step
/// order. Review-mode contexts pass through unchanged: recorders return
/// their computed values but persist nothing.
pub struct AttendantFlow {
    context: SessionContext,
}

impl AttendantFlow {
    /// Wraps a context, rejecting sessions of the wrong workflow kind.
    pub fn new(context: SessionContext) -> Result<Self> {
        if context.session().kind != WorkflowKind::AttendantSwap {
            return Err(anyhow!(
                "Session {} is not an attendant swap",
                context.id()
            ));
        }
        Ok(Self { context })
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Releases the underlying context, e.g. to hand it back to recovery.
    pub fn into_context(self) -> SessionContext {
        self.context
    }

    /// Step 1: record the identified customer.
    pub async fn record_customer(&mut self, customer: CustomerDetails) -> Result<()> {
        self.record(AttendantStepData::Customer(customer)).await
    }

    /// Step 2: record the returned battery.
    pub async fn record_old_battery(&mut self, reading: BatteryReading) -> Result<()> {
        self.record(AttendantStepData::OldBattery(reading)).await
    }

    /// Step 3: record the issued battery and price the swap.
    ///
    /// The cost is derived from the charge delta against the returned
    /// battery and recorded as the step 4 payload.
    ///
    /// # Errors
    ///
    /// Fails when no returned battery has been recorded yet.
    pub async fn record_new_battery(&mut self, reading: BatteryReading) -> Result<SwapCost> {
        let old = self
            .stored_step(2)
            .and_then(|data| match data {
                AttendantStepData::OldBattery(reading) => Some(reading),
                _ => None,
            })
            .ok_or_else(|| anyhow!("Returned battery must be scanned before issuing a new one"))?;

        let cost = SwapCost::calculate(old.charge, reading.charge);
        self.record(AttendantStepData::NewBattery(reading)).await?;
        self.record(AttendantStepData::Cost(cost.clone())).await?;
        Ok(cost)
    }

    /// Step 5: confirm payment from a scanned payment QR.
    ///
    /// Generates a transaction reference and marks the swap complete
    /// (step 6); the caller then calls [`AttendantFlow::finish`].
    pub async fn confirm_payment_scanned(&mut self) -> Result<PaymentReceipt> {
        let txn_id = format!("TXN-{}", rand::thread_rng().gen_range(100_000..1_000_000));
        self.confirm_payment(txn_id, PaymentMethod::Scan).await
    }

    /// Step 5: confirm payment from a manually entered reference.
    pub async fn confirm_payment_manual(&mut self, reference: &str) -> Result<PaymentReceipt> {
        let txn_id = reference.trim().to_uppercase();
        if txn_id.is_empty() {
            return Err(anyhow!("Payment reference must not be empty"));
        }
        self.confirm_payment(txn_id, PaymentMethod::Manual).await
    }

    async fn confirm_payment(
        &mut self,
        txn_id: String,
        method: PaymentMethod,
    ) -> Result<PaymentReceipt> {
        let receipt = PaymentReceipt {
            confirmed: true,
            txn_id,
            method,
            timestamp: Utc::now().to_rfc3339(),
        };
        self.record(AttendantStepData::Payment(receipt.clone()))
            .await?;
        self.record(AttendantStepData::Completion(CompletionMark::now()))
            .await?;
        Ok(receipt)
    }

    /// Moves the workflow UI to an already reached step.
    pub async fn navigate(&mut self, step: u8) -> Result<()> {
        self.context.update_current_step(step).await
    }

    /// Completes the session and releases it.
    pub async fn finish(self) -> Session {
        self.context.complete().await
    }

    /// Parks the session for later and releases it. The session stays
    /// bound, so re-entering the workflow offers to recover it.
    pub async fn pause(self) -> Session {
        self.context.pause().await
    }

    /// Leaves the workflow screen: parks the session and unbinds it.
    pub async fn exit(self) -> Session {
        self.context.exit().await
    }

    async fn record(&mut self, data: AttendantStepData) -> Result<()> {
        let step = data.step();
        self.context.update_step_data(step, data.into_value()?).await
    }

    fn stored_step(&self, step: u8) -> Option<AttendantStepData> {
        let payload = self.context.session().data.get(&step)?;
        AttendantStepData::from_step(step, payload)
    }
}

/// One entry of a customer's service plan state.
///
/// Field names mirror the subscription backend wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    pub service_id: String,
    pub used: i64,
    pub quota: i64,
    #[serde(default)]
    pub current_asset: Option<String>,
}

/// Snapshot of a customer's service plan, shown beside the swap steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePlanSnapshot {
    pub service_plan_id: String,
    pub customer_id: String,
    pub status: String,
    pub service_state: String,
    pub payment_state: String,
    pub template_id: String,
    pub service_states: Vec<ServiceState>,
}

impl ServicePlanSnapshot {
    /// Consumption-based services worth displaying.
    ///
    /// Access-style services carry huge or absent quotas; only metered
    /// electricity and swap-count entries are meaningful to an attendant.
    pub fn displayable_services(&self) -> Vec<&ServiceState> {
        self.service_states
            .iter()
            .filter(|service| {
                if service.quota >= 1_000_000 || service.quota <= 0 {
                    return false;
                }
                let id = service.service_id.to_lowercase();
                id.contains("electricity") || id.contains("swap-count")
            })
            .collect()
    }

    /// The battery-fleet service currently holding an issued asset.
    pub fn issued_battery(&self) -> Option<&str> {
        self.service_states
            .iter()
            .find(|service| {
                service.service_id.to_lowercase().contains("battery-fleet")
                    && service.current_asset.is_some()
            })
            .and_then(|service| service.current_asset.as_deref())
    }

    /// Short plan name derived from the template identifier.
    pub fn plan_display_name(&self) -> &'static str {
        let template = self.template_id.to_lowercase();
        if template.contains("7day") {
            "7-Day Lux"
        } else if template.contains("30day") || template.contains("month") {
            "30-Day Plan"
        } else if template.contains("pay-per") || template.contains("payper") {
            "Pay-Per-Swap"
        } else {
            "7-Day Plan"
        }
    }
}

/// Severity of a quota's consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaLevel {
    Good,
    Warning,
    Critical,
}

/// Classifies usage against a quota: 90% used is critical, 70% warning.
pub fn quota_level(used: i64, quota: i64) -> QuotaLevel {
    let used_percent = used as f64 / quota as f64 * 100.0;
    if used_percent >= 90.0 {
        QuotaLevel::Critical
    } else if used_percent >= 70.0 {
        QuotaLevel::Warning
    } else {
        QuotaLevel::Good
    }
}

/// Short display id for an issued battery asset.
///
/// Asset ids from the fleet service are long; the panel shows `BAT_`
/// plus the final underscore segment (or the last six characters).
pub fn battery_display_id(asset_id: &str) -> String {
    let short: String = match asset_id.rsplit_once('_') {
        Some((_, tail)) => tail.to_string(),
        None => {
            // Last six characters, not bytes: asset ids are operator input
            // and must not split a multibyte character.
            let skip = asset_id.chars().count().saturating_sub(6);
            asset_id.chars().skip(skip).collect()
        }
    };
    format!("BAT_{}", short)
}

/// Service plan snapshot used until the subscription backend is wired in.
pub fn demo_service_plan() -> ServicePlanSnapshot {
    ServicePlanSnapshot {
        service_plan_id: "bss-plan-togo-7day-lux-plan3".to_string(),
        customer_id: "customer-togo-002".to_string(),
        status: "ACTIVE".to_string(),
        service_state: "BATTERY_ISSUED".to_string(),
        payment_state: "CURRENT".to_string(),
        template_id: "template-togo-lome-7day-lux-v2".to_string(),
        service_states: vec![
            ServiceState {
                service_id: "service-swap-station-network-togo-lux".to_string(),
                used: 0,
                quota: 10_000_000,
                current_asset: None,
            },
            ServiceState {
                service_id: "service-battery-fleet-togo-lux".to_string(),
                used: 0,
                quota: 10_000_000,
                current_asset: Some("BAT_NEW_004".to_string()),
            },
            ServiceState {
                service_id: "service-electricity-togo-lux".to_string(),
                used: 8,
                quota: 70,
                current_asset: None,
            },
            ServiceState {
                service_id: "service-swap-count-togo-lux".to_string(),
                used: 3,
                quota: 21,
                current_asset: None,
            },
        ],
    }
}
