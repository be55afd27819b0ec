use super::Engine;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    api::DeliveryAPI,
    entities::{
        BookingRequest, DeliveryMethod, DeliveryOrder, DeliveryRecord, DeliveryStatus,
        DeliveryStatusView, OrderRequest,
    },
    error::{invalid_input_error_with, not_found_error, Error},
};

fn require_donation_id(donation_id: &str) -> Result<(), Error> {
    if donation_id.trim().is_empty() {
        return Err(invalid_input_error_with("donation_id required"));
    }

    Ok(())
}

#[async_trait]
impl DeliveryAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_order(&self, request: OrderRequest) -> Result<DeliveryOrder, Error> {
        require_donation_id(&request.donation_id)?;

        let order = DeliveryOrder::new(request, Utc::now());
        self.store.insert_order(&order).await?;

        let order_id = order.id;
        let donation_id = order.donation_id.clone();

        self.store
            .update_record(
                &order.donation_id,
                Box::new(move |current: Option<DeliveryRecord>| {
                    let mut record = current.unwrap_or_else(|| DeliveryRecord::new(donation_id));
                    record.reopen(order_id);
                    Ok(record)
                }),
            )
            .await?;

        tracing::info!(
            order_id = %order.id,
            donation_id = %order.donation_id,
            "delivery order created"
        );

        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn record_booking(&self, request: BookingRequest) -> Result<DeliveryRecord, Error> {
        require_donation_id(&request.donation_id)?;

        let method = DeliveryMethod::from_id(&request.provider).ok_or_else(|| {
            invalid_input_error_with(format!("Unknown provider: {}", request.provider))
        })?;

        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !non_negative(request.estimated_price) || !non_negative(request.distance_km) {
            return Err(invalid_input_error_with(
                "estimatedPrice and distance must be non-negative numbers",
            ));
        }

        let donation_id = request.donation_id.clone();
        let now = Utc::now();

        self.store
            .update_record(
                &request.donation_id,
                Box::new(move |current: Option<DeliveryRecord>| {
                    let mut record = current.unwrap_or_else(|| DeliveryRecord::new(donation_id));
                    record.book(
                        method,
                        request.estimated_price,
                        request.distance_km,
                        request.estimated_duration_minutes,
                        now,
                    )?;
                    Ok(record)
                }),
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn update_status(
        &self,
        donation_id: &str,
        status: DeliveryStatus,
    ) -> Result<DeliveryRecord, Error> {
        require_donation_id(donation_id)?;

        let now = Utc::now();

        self.store
            .update_record(
                donation_id,
                Box::new(move |current: Option<DeliveryRecord>| {
                    let mut record = current.ok_or_else(|| not_found_error("Donation not found"))?;
                    record.transition(status, now)?;
                    Ok(record)
                }),
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn find_status(&self, donation_id: &str) -> Result<DeliveryStatusView, Error> {
        let record = self
            .store
            .find_record(donation_id)
            .await?
            .ok_or_else(|| not_found_error("Donation not found"))?;

        Ok(record.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn booking(donation_id: &str, provider: &str) -> BookingRequest {
        BookingRequest {
            donation_id: donation_id.into(),
            provider: provider.into(),
            estimated_price: 90.0,
            distance_km: 5.0,
            estimated_duration_minutes: Some(25),
        }
    }

    #[test]
    fn order_opens_pending_record() {
        let engine = Engine::in_memory();

        let order = block_on(engine.create_order(OrderRequest {
            donation_id: "donation-1".into(),
            ngo_name: "Hope Shelter".into(),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(order.status, DeliveryStatus::Pending);

        let record = block_on(engine.store.find_record("donation-1"))
            .unwrap()
            .unwrap();
        assert_eq!(record.order_id, Some(order.id));

        let view = block_on(engine.find_status("donation-1")).unwrap();
        assert_eq!(view.status, DeliveryStatus::Pending);
        assert_eq!(view.status_badge.label, "Pending");
        assert_eq!(view.timeline.len(), 4);
    }

    #[test]
    fn new_order_resets_booked_record_to_pending() {
        let engine = Engine::in_memory();
        block_on(engine.record_booking(booking("donation-5", "dunzo"))).unwrap();

        let order = block_on(engine.create_order(OrderRequest {
            donation_id: "donation-5".into(),
            ..Default::default()
        }))
        .unwrap();

        let record = block_on(engine.store.find_record("donation-5"))
            .unwrap()
            .unwrap();
        assert_eq!(record.status, DeliveryStatus::Pending);
        assert_eq!(record.order_id, Some(order.id));
        assert_eq!(record.method, None);

        let view = block_on(engine.find_status("donation-5")).unwrap();
        assert_eq!(view.estimated_price, None);
        assert_eq!(view.status_badge.label, "Pending");
    }

    #[test]
    fn order_requires_donation_id() {
        let engine = Engine::in_memory();
        let err = block_on(engine.create_order(OrderRequest::default())).unwrap_err();

        assert!(err.is_invalid_input_error());
        assert_eq!(err.message, "donation_id required");
    }

    #[test]
    fn booking_then_tracking() {
        let engine = Engine::in_memory();

        let record = block_on(engine.record_booking(booking("donation-2", "porter"))).unwrap();
        assert_eq!(record.status, DeliveryStatus::Booked);
        assert_eq!(record.method, Some(DeliveryMethod::Porter));

        block_on(engine.update_status("donation-2", DeliveryStatus::InProgress)).unwrap();
        let delivered =
            block_on(engine.update_status("donation-2", DeliveryStatus::Delivered)).unwrap();
        assert!(delivered.delivered_at.is_some());

        let view = block_on(engine.find_status("donation-2")).unwrap();
        assert_eq!(view.status_badge.color, "green");
        assert_eq!(view.estimated_price, Some(90.0));
        assert_eq!(view.distance, Some(5.0));
        assert!(view.estimated_arrival.is_some());
    }

    #[test]
    fn booking_rejects_unknown_provider() {
        let engine = Engine::in_memory();
        let err = block_on(engine.record_booking(booking("donation-3", "uber"))).unwrap_err();

        assert!(err.is_invalid_input_error());
        assert!(block_on(engine.find_status("donation-3"))
            .unwrap_err()
            .is_not_found_error());
    }

    #[test]
    fn illegal_transition_is_invalid_state() {
        let engine = Engine::in_memory();
        block_on(engine.record_booking(booking("donation-4", "rapido"))).unwrap();

        let err =
            block_on(engine.update_status("donation-4", DeliveryStatus::Delivered)).unwrap_err();
        assert_eq!(err.code, 100);

        let view = block_on(engine.find_status("donation-4")).unwrap();
        assert_eq!(view.status, DeliveryStatus::Booked);
    }

    #[test]
    fn status_of_unknown_donation_is_not_found() {
        let engine = Engine::in_memory();

        assert!(block_on(engine.find_status("missing"))
            .unwrap_err()
            .is_not_found_error());
        assert!(block_on(engine.update_status("missing", DeliveryStatus::Cancelled))
            .unwrap_err()
            .is_not_found_error());
    }
}
