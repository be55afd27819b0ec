use super::Engine;

use crate::{
    api::BookingAPI,
    entities::{BookingPreparation, ClipboardPayload, DeliveryMethod, LocationData, RedirectTarget},
};

impl BookingAPI for Engine {
    #[tracing::instrument(skip(self, pickup, drop))]
    fn prepare_booking(
        &self,
        provider: &str,
        pickup: &LocationData,
        drop: &LocationData,
        is_mobile: bool,
    ) -> BookingPreparation {
        let target = DeliveryMethod::from_id(provider).map(RedirectTarget::for_method);

        if target.is_none() {
            tracing::warn!(provider, "unknown provider, no redirect available");
        }

        BookingPreparation {
            redirect_url: target
                .and_then(|target| target.url(is_mobile))
                .map(String::from),
            addresses: ClipboardPayload::new(pickup, drop),
            description: target
                .map(|target| target.description.to_string())
                .unwrap_or_default(),
        }
    }
}
