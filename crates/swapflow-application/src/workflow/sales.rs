//! Sales-side registration workflow.
//!
//! Six steps: capture the customer's details, pick a vehicle, pick a
//! subscription plan, take payment, assign the first battery, done.
//! Vehicle and plan catalogs are fixed station-side price lists.

use anyhow::{Result, anyhow};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swapflow_core::session::{Session, SessionContext, WorkflowKind};

use super::CompletionMark;

/// A vehicle on the showroom price list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleModel {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    /// Sticker price in XOF.
    pub price: u32,
}

pub const VEHICLE_CATALOG: [VehicleModel; 4] = [
    VehicleModel {
        id: "tuktuk2",
        name: "Oves Tuk-Tuk",
        category: "Electric Tuk-Tuk",
        price: 1_175_000,
    },
    VehicleModel {
        id: "etrike",
        name: "E-Trike 3X",
        category: "Electric Tricycle",
        price: 565_000,
    },
    VehicleModel {
        id: "etrike-cargo",
        name: "E-Trike Cargo",
        category: "Cargo Tricycle",
        price: 680_000,
    },
    VehicleModel {
        id: "tuktuk",
        name: "Oves Tuk-Tuk",
        category: "Passenger Vehicle",
        price: 1_315_000,
    },
];

/// A battery subscription plan sold alongside the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionPlan {
    pub id: &'static str,
    pub name: &'static str,
    /// Upfront price in XOF. Pay-per-swap has no upfront cost.
    pub price: u32,
}

pub const PLAN_CATALOG: [SubscriptionPlan; 4] = [
    SubscriptionPlan {
        id: "daily",
        name: "Daily Pass",
        price: 705,
    },
    SubscriptionPlan {
        id: "weekly",
        name: "Weekly Plan",
        price: 3_760,
    },
    SubscriptionPlan {
        id: "monthly",
        name: "Monthly Plan",
        price: 11_750,
    },
    SubscriptionPlan {
        id: "payperswap",
        name: "Pay-Per-Swap",
        price: 0,
    },
];

pub fn find_vehicle(id: &str) -> Option<&'static VehicleModel> {
    VEHICLE_CATALOG.iter().find(|vehicle| vehicle.id == id)
}

pub fn find_plan(id: &str) -> Option<&'static SubscriptionPlan> {
    PLAN_CATALOG.iter().find(|plan| plan.id == id)
}

/// Amount due at registration: vehicle price plus plan upfront.
pub fn registration_total(vehicle_id: &str, plan_id: &str) -> Option<u32> {
    Some(find_vehicle(vehicle_id)?.price + find_plan(plan_id)?.price)
}

/// Customer details captured at step 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub zip: String,
}

impl RegistrationForm {
    /// Two-letter initials for the customer avatar.
    pub fn initials(&self) -> String {
        let mut words = self.name.split_whitespace();
        match (words.next(), words.next()) {
            (Some(first), Some(second)) => first
                .chars()
                .take(1)
                .chain(second.chars().take(1))
                .collect::<String>()
                .to_uppercase(),
            _ => self
                .name
                .trim()
                .chars()
                .take(2)
                .collect::<String>()
                .to_uppercase(),
        }
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
            ("zip", &self.zip),
        ];
        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(anyhow!("Registration field '{}' is required", label));
            }
        }
        Ok(())
    }
}

/// Payment taken at step 4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPayment {
    pub confirmed: bool,
    pub txn_id: String,
    /// Amount charged in XOF.
    pub amount: u32,
    pub timestamp: String,
}

/// First battery hand-off at step 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryAssignment {
    pub battery_id: String,
    pub assigned_at: String,
}

/// Typed view of one sales-registration step payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SalesStepData {
    Registration(RegistrationForm),
    Vehicle { vehicle: String },
    Plan { plan: String },
    Payment(SalesPayment),
    Battery(BatteryAssignment),
    Completion(CompletionMark),
}

impl SalesStepData {
    pub fn step(&self) -> u8 {
        match self {
            Self::Registration(_) => 1,
            Self::Vehicle { .. } => 2,
            Self::Plan { .. } => 3,
            Self::Payment(_) => 4,
            Self::Battery(_) => 5,
            Self::Completion(_) => 6,
        }
    }

    pub fn into_value(self) -> Result<Value> {
        let value = match self {
            Self::Registration(form) => serde_json::to_value(form)?,
            Self::Vehicle { vehicle } => serde_json::json!({ "vehicle": vehicle }),
            Self::Plan { plan } => serde_json::json!({ "plan": plan }),
            Self::Payment(payment) => serde_json::to_value(payment)?,
            Self::Battery(assignment) => serde_json::to_value(assignment)?,
            Self::Completion(mark) => serde_json::to_value(mark)?,
        };
        Ok(value)
    }

    pub fn from_step(step: u8, payload: &Value) -> Option<Self> {
        let parsed = match step {
            1 => Self::Registration(serde_json::from_value(payload.clone()).ok()?),
            2 => Self::Vehicle {
                vehicle: payload.get("vehicle")?.as_str()?.to_string(),
            },
            3 => Self::Plan {
                plan: payload.get("plan")?.as_str()?.to_string(),
            },
            4 => Self::Payment(serde_json::from_value(payload.clone()).ok()?),
            5 => Self::Battery(serde_json::from_value(payload.clone()).ok()?),
            6 => Self::Completion(serde_json::from_value(payload.clone()).ok()?),
            _ => return None,
        };
        Some(parsed)
    }
}

/// Drives a sales-registration session through its six steps.
pub struct SalesFlow {
    context: SessionContext,
}

impl SalesFlow {
    /// Wraps a context, rejecting sessions of the wrong workflow kind.
    pub fn new(context: SessionContext) -> Result<Self> {
        if context.session().kind != WorkflowKind::SalesRegistration {
            return Err(anyhow!(
                "Session {} is not a sales registration",
                context.id()
            ));
        }
        Ok(Self { context })
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn into_context(self) -> SessionContext {
        self.context
    }

    /// Step 1: record the registration form. All fields are required.
    pub async fn record_registration(&mut self, form: RegistrationForm) -> Result<()> {
        form.validate()?;
        self.record(SalesStepData::Registration(form)).await
    }

    /// Step 2: record the chosen vehicle, validated against the catalog.
    pub async fn record_vehicle(&mut self, vehicle_id: &str) -> Result<&'static VehicleModel> {
        let vehicle =
            find_vehicle(vehicle_id).ok_or_else(|| anyhow!("Unknown vehicle '{}'", vehicle_id))?;
        self.record(SalesStepData::Vehicle {
            vehicle: vehicle.id.to_string(),
        })
        .await?;
        Ok(vehicle)
    }

    /// Step 3: record the chosen subscription plan.
    pub async fn record_plan(&mut self, plan_id: &str) -> Result<&'static SubscriptionPlan> {
        let plan = find_plan(plan_id).ok_or_else(|| anyhow!("Unknown plan '{}'", plan_id))?;
        self.record(SalesStepData::Plan {
            plan: plan.id.to_string(),
        })
        .await?;
        Ok(plan)
    }

    /// Step 4: take payment for the recorded vehicle and plan.
    ///
    /// # Errors
    ///
    /// Fails when the vehicle or plan step has not been recorded, or
    /// names a catalog entry that no longer exists.
    pub async fn confirm_payment(&mut self) -> Result<SalesPayment> {
        let vehicle_id = self
            .stored_step(2)
            .and_then(|data| match data {
                SalesStepData::Vehicle { vehicle } => Some(vehicle),
                _ => None,
            })
            .ok_or_else(|| anyhow!("A vehicle must be selected before payment"))?;
        let plan_id = self
            .stored_step(3)
            .and_then(|data| match data {
                SalesStepData::Plan { plan } => Some(plan),
                _ => None,
            })
            .ok_or_else(|| anyhow!("A plan must be selected before payment"))?;
        let amount = registration_total(&vehicle_id, &plan_id)
            .ok_or_else(|| anyhow!("Recorded selection is no longer in the catalog"))?;

        let payment = SalesPayment {
            confirmed: true,
            txn_id: format!("TXN-{}", rand::thread_rng().gen_range(100_000..1_000_000)),
            amount,
            timestamp: Utc::now().to_rfc3339(),
        };
        self.record(SalesStepData::Payment(payment.clone())).await?;
        Ok(payment)
    }

    /// Step 5: assign the first battery and mark the registration done.
    pub async fn record_battery(&mut self, battery_id: &str) -> Result<BatteryAssignment> {
        let battery_id = battery_id.trim();
        if battery_id.is_empty() {
            return Err(anyhow!("Battery id must not be empty"));
        }
        let assignment = BatteryAssignment {
            battery_id: battery_id.to_uppercase(),
            assigned_at: Utc::now().to_rfc3339(),
        };
        self.record(SalesStepData::Battery(assignment.clone()))
            .await?;
        self.record(SalesStepData::Completion(CompletionMark::now()))
            .await?;
        Ok(assignment)
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

    async fn record(&mut self, data: SalesStepData) -> Result<()> {
        let step = data.step();
        self.context.update_step_data(step, data.into_value()?).await
    }

    fn stored_step(&self, step: u8) -> Option<SalesStepData> {
        let payload = self.context.session().data.get(&step)?;
        SalesStepData::from_step(step, payload)
    }
}
