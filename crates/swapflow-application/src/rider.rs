//! Rider self-service data: account, balance top-ups, station directory.
//!
//! The rider screens run against fixture data until the customer backend
//! is wired in; only the top-up balance actually mutates.

use anyhow::{Result, anyhow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiderProfile {
    pub name: String,
    pub initials: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiderVehicle {
    pub model: String,
    pub vehicle_id: String,
    pub last_swap: String,
    pub total_swaps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiderBalance {
    /// Prepaid balance in XOF.
    pub money_balance: u32,
    pub swaps_remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiderSubscription {
    pub plan: String,
    pub valid_until: String,
}

/// Everything the rider home and profile screens show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiderAccount {
    pub profile: RiderProfile,
    pub vehicle: RiderVehicle,
    pub balance: RiderBalance,
    pub subscription: RiderSubscription,
}

impl RiderAccount {
    /// Fixture account shown until rider login exists.
    pub fn demo() -> Self {
        Self {
            profile: RiderProfile {
                name: "James Mwangi".to_string(),
                initials: "JM".to_string(),
                phone: "+228 91 234 567".to_string(),
            },
            vehicle: RiderVehicle {
                model: "E-Trike 3X".to_string(),
                vehicle_id: "VEH-2024-8847".to_string(),
                last_swap: "2h ago".to_string(),
                total_swaps: 47,
            },
            balance: RiderBalance {
                money_balance: 3_100,
                swaps_remaining: 18,
            },
            subscription: RiderSubscription {
                plan: "7-Day Lux Plan".to_string(),
                valid_until: "Dec 9, 2025".to_string(),
            },
        }
    }

    /// Credits a verified mobile-money top-up to the balance.
    ///
    /// # Errors
    ///
    /// Fails on a zero amount or a missing transaction id or payment
    /// method; the balance is untouched on failure.
    pub fn top_up(&mut self, request: &TopUpRequest) -> Result<TopUpReceipt> {
        if request.amount == 0 {
            return Err(anyhow!("Top-up amount must be greater than zero"));
        }
        let transaction_id = request.transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(anyhow!("Transaction id is required"));
        }
        if request.payment_method.trim().is_empty() {
            return Err(anyhow!("Payment method is required"));
        }

        self.balance.money_balance += request.amount;
        Ok(TopUpReceipt {
            amount: request.amount,
            new_balance: self.balance.money_balance,
            transaction_id: transaction_id.to_string(),
        })
    }
}

/// A top-up the rider claims to have paid via mobile money.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUpRequest {
    /// Amount in XOF.
    pub amount: u32,
    pub transaction_id: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUpReceipt {
    pub amount: u32,
    pub new_balance: u32,
    pub transaction_id: String,
}

/// Gauge color band for the current battery charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeLevel {
    Good,
    Low,
    Critical,
}

impl ChargeLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Low => "Low",
            Self::Critical => "Critical",
        }
    }
}

/// Classifies a charge percentage: 50% and up is good, 20% low.
pub fn charge_level(percent: u8) -> ChargeLevel {
    if percent >= 50 {
        ChargeLevel::Good
    } else if percent >= 20 {
        ChargeLevel::Low
    } else {
        ChargeLevel::Critical
    }
}

/// A nearby swap station on the rider map.
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    pub name: &'static str,
    pub address: &'static str,
    pub distance_km: f64,
    /// Charged batteries currently in the cabinet.
    pub batteries: u32,
    pub wait_minutes: u32,
}

impl StationInfo {
    pub fn distance_label(&self) -> String {
        format!("{} km", self.distance_km)
    }

    pub fn wait_label(&self) -> String {
        format!("~{} min", self.wait_minutes)
    }
}

/// Stations around Lome, nearest first.
pub const STATION_DIRECTORY: [StationInfo; 5] = [
    StationInfo {
        name: "Lome Central Station",
        address: "Rue du Commerce, Lome",
        distance_km: 0.8,
        batteries: 12,
        wait_minutes: 3,
    },
    StationInfo {
        name: "Tokoin Market Station",
        address: "Avenue Tokoin, Lome",
        distance_km: 1.4,
        batteries: 3,
        wait_minutes: 8,
    },
    StationInfo {
        name: "Agoe Station",
        address: "Route d'Agoe, Lome",
        distance_km: 2.1,
        batteries: 8,
        wait_minutes: 5,
    },
    StationInfo {
        name: "Be Station",
        address: "Quartier Be, Lome",
        distance_km: 2.8,
        batteries: 15,
        wait_minutes: 2,
    },
    StationInfo {
        name: "Adidogome Station",
        address: "Adidogome, Lome",
        distance_km: 3.5,
        batteries: 6,
        wait_minutes: 6,
    },
];

/// `XOF 1,175,000` style amount formatting.
pub fn format_xof(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("XOF {}", grouped)
}

/// Home screen greeting for an hour of day in [0, 23].
pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else if hour < 17 {
        "Good afternoon"
    } else {
        "Good evening"
    }
}
