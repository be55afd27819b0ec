use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinates;
use crate::error::{invalid_state_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Porter,
    Dunzo,
    Rapido,
    SwiggyGenie,
    SelfService,
}

impl DeliveryMethod {
    pub const ALL: [DeliveryMethod; 5] = [
        DeliveryMethod::Porter,
        DeliveryMethod::Dunzo,
        DeliveryMethod::Rapido,
        DeliveryMethod::SwiggyGenie,
        DeliveryMethod::SelfService,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Porter => "porter",
            Self::Dunzo => "dunzo",
            Self::Rapido => "rapido",
            Self::SwiggyGenie => "swiggy_genie",
            Self::SelfService => "self_service",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.id() == id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Booked,
    InProgress,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Booked => "booked".into(),
            Self::InProgress => "in_progress".into(),
            Self::Delivered => "delivered".into(),
            Self::Cancelled => "cancelled".into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    pub fn badge(&self) -> StatusBadge {
        let (color, label, icon) = match self {
            Self::Pending => ("gray", "Pending", "⏱️"),
            Self::Booked => ("blue", "Booked", "✓"),
            Self::InProgress => ("orange", "On the way", "🚚"),
            Self::Delivered => ("green", "Delivered", "✓✓"),
            Self::Cancelled => ("red", "Cancelled", "✗"),
        };

        StatusBadge {
            color: color.into(),
            label: label.into(),
            icon: icon.into(),
        }
    }

    /// The happy-path steps shown to donors and NGOs.
    pub fn timeline() -> Vec<TimelineStep> {
        [
            (Self::Pending, "Pending"),
            (Self::Booked, "Booked"),
            (Self::InProgress, "In Transit"),
            (Self::Delivered, "Delivered"),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (status, label))| TimelineStep {
            step: i as u32 + 1,
            status,
            label: label.into(),
        })
        .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub color: String,
    pub label: String,
    pub icon: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub step: u32,
    pub status: DeliveryStatus,
    pub label: String,
}

/// A courier pickup requested for a donation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOrder {
    pub id: Uuid,
    pub donation_id: String,
    pub pickup: Option<Coordinates>,
    pub dropoff: Option<Coordinates>,
    pub ngo_id: Option<String>,
    pub ngo_name: String,
    pub ngo_phone: String,
    pub donor_name: String,
    pub donor_phone: String,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to open a delivery order for a donation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub donation_id: String,
    pub pickup: Option<Coordinates>,
    pub dropoff: Option<Coordinates>,
    pub ngo_id: Option<String>,
    pub ngo_name: String,
    pub ngo_phone: String,
    pub donor_name: String,
    pub donor_phone: String,
}

impl DeliveryOrder {
    pub fn new(request: OrderRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            donation_id: request.donation_id,
            pickup: request.pickup,
            dropoff: request.dropoff,
            ngo_id: request.ngo_id,
            ngo_name: request.ngo_name,
            ngo_phone: request.ngo_phone,
            donor_name: request.donor_name,
            donor_phone: request.donor_phone,
            status: DeliveryStatus::Pending,
            created_at: now,
        }
    }
}

/// A booking the donor confirmed on an external courier app.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub donation_id: String,
    pub provider: String,
    pub estimated_price: f64,
    pub distance_km: f64,
    pub estimated_duration_minutes: Option<u32>,
}

/// Delivery state attached to a donation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub donation_id: String,
    pub method: Option<DeliveryMethod>,
    pub status: DeliveryStatus,
    pub order_id: Option<Uuid>,
    pub estimated_price: Option<f64>,
    pub distance_km: Option<f64>,
    pub estimated_duration_minutes: Option<u32>,
    pub booked_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl DeliveryRecord {
    pub fn new(donation_id: String) -> Self {
        Self {
            donation_id,
            method: None,
            status: DeliveryStatus::Pending,
            order_id: None,
            estimated_price: None,
            distance_km: None,
            estimated_duration_minutes: None,
            booked_at: None,
            delivered_at: None,
        }
    }

    /// Attaches a new order and starts the record over as pending.
    pub fn reopen(&mut self, order_id: Uuid) {
        *self = Self {
            order_id: Some(order_id),
            ..Self::new(std::mem::take(&mut self.donation_id))
        };
    }

    #[tracing::instrument]
    pub fn book(
        &mut self,
        method: DeliveryMethod,
        estimated_price: f64,
        distance_km: f64,
        estimated_duration_minutes: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        match self.status {
            DeliveryStatus::Pending | DeliveryStatus::Booked => {
                self.method = Some(method);
                self.status = DeliveryStatus::Booked;
                self.estimated_price = Some(estimated_price);
                self.distance_km = Some(distance_km);
                self.estimated_duration_minutes = estimated_duration_minutes;
                self.booked_at = Some(now);
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }

    /// Moves the record along `booked -> in_progress -> delivered`; any
    /// non-terminal state may be cancelled. Repeating the current status is a
    /// no-op.
    #[tracing::instrument]
    pub fn transition(&mut self, next: DeliveryStatus, now: DateTime<Utc>) -> Result<(), Error> {
        if self.status == next {
            return Ok(());
        }

        let allowed = match (self.status, next) {
            (from, DeliveryStatus::Cancelled) => !from.is_terminal(),
            (DeliveryStatus::Booked, DeliveryStatus::InProgress) => true,
            (DeliveryStatus::InProgress, DeliveryStatus::Delivered) => true,
            _ => false,
        };

        if !allowed {
            return Err(invalid_state_error());
        }

        if next == DeliveryStatus::Delivered {
            self.delivered_at = Some(now);
        }
        self.status = next;

        Ok(())
    }

    pub fn estimated_arrival(&self) -> Option<DateTime<Utc>> {
        let booked_at = self.booked_at?;
        let minutes = self.estimated_duration_minutes?;

        Some(booked_at + Duration::minutes(i64::from(minutes)))
    }
}

/// Status page payload for a donation's delivery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatusView {
    pub donation_id: String,
    pub method: Option<DeliveryMethod>,
    pub status: DeliveryStatus,
    pub estimated_price: Option<f64>,
    pub distance: Option<f64>,
    pub status_badge: StatusBadge,
    pub timeline: Vec<TimelineStep>,
    pub booked_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub estimated_arrival: Option<DateTime<Utc>>,
}

impl From<DeliveryRecord> for DeliveryStatusView {
    fn from(record: DeliveryRecord) -> Self {
        let estimated_arrival = record.estimated_arrival();

        Self {
            status_badge: record.status.badge(),
            timeline: DeliveryStatus::timeline(),
            donation_id: record.donation_id,
            method: record.method,
            status: record.status,
            estimated_price: record.estimated_price,
            distance: record.distance_km,
            booked_at: record.booked_at,
            delivered_at: record.delivered_at,
            estimated_arrival,
        }
    }
}

#[test]
fn method_ids_round_trip() {
    for method in DeliveryMethod::ALL {
        assert_eq!(DeliveryMethod::from_id(method.id()), Some(method));
    }
    assert_eq!(DeliveryMethod::from_id("uber"), None);
}

#[test]
fn booking_then_delivery_lifecycle() {
    let now = Utc::now();
    let mut record = DeliveryRecord::new("donation-1".into());

    let err = record
        .transition(DeliveryStatus::InProgress, now)
        .unwrap_err();
    assert_eq!(err.code, 100);

    record
        .book(DeliveryMethod::Porter, 90.0, 5.0, Some(25), now)
        .unwrap();
    assert_eq!(record.status, DeliveryStatus::Booked);
    assert_eq!(record.estimated_arrival(), Some(now + Duration::minutes(25)));

    record.transition(DeliveryStatus::InProgress, now).unwrap();
    record.transition(DeliveryStatus::InProgress, now).unwrap();
    record.transition(DeliveryStatus::Delivered, now).unwrap();
    assert_eq!(record.delivered_at, Some(now));

    assert!(record.transition(DeliveryStatus::Cancelled, now).is_err());
    assert!(record
        .book(DeliveryMethod::Dunzo, 50.0, 2.0, None, now)
        .is_err());
}

#[test]
fn pending_delivery_can_be_cancelled() {
    let mut record = DeliveryRecord::new("donation-2".into());
    record
        .transition(DeliveryStatus::Cancelled, Utc::now())
        .unwrap();

    assert_eq!(record.status.badge().color, "red");
    assert_eq!(record.estimated_arrival(), None);
}

#[test]
fn timeline_has_four_steps() {
    let timeline = DeliveryStatus::timeline();

    assert_eq!(timeline.len(), 4);
    assert_eq!(timeline[0].status, DeliveryStatus::Pending);
    assert_eq!(timeline[2].label, "In Transit");
    assert_eq!(timeline[3].step, 4);
}

#[test]
fn reopening_clears_previous_delivery() {
    let now = Utc::now();
    let mut record = DeliveryRecord::new("donation-3".into());
    record
        .book(DeliveryMethod::Porter, 90.0, 5.0, Some(25), now)
        .unwrap();
    record.transition(DeliveryStatus::InProgress, now).unwrap();
    record.transition(DeliveryStatus::Delivered, now).unwrap();

    let order_id = Uuid::new_v4();
    record.reopen(order_id);

    assert_eq!(record.donation_id, "donation-3");
    assert_eq!(record.status, DeliveryStatus::Pending);
    assert_eq!(record.order_id, Some(order_id));
    assert_eq!(record.method, None);
    assert_eq!(record.delivered_at, None);
}
