mod booking;
mod coordinates;
mod delivery;
mod distance;
mod option;
mod pricing;
mod quote;

pub use booking::{
    format_address, BookingPreparation, ClipboardPayload, LocationData, RedirectTarget,
};
pub use coordinates::Coordinates;
pub use delivery::{
    BookingRequest, DeliveryMethod, DeliveryOrder, DeliveryRecord, DeliveryStatus,
    DeliveryStatusView, OrderRequest, StatusBadge, TimelineStep,
};
pub use distance::{DistanceEstimate, DistanceSource};
pub use option::DeliveryOption;
pub use pricing::{PricingProfile, PricingTable};
pub use quote::{FareComparison, FareQuote};
