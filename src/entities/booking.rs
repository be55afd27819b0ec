use serde::{Deserialize, Serialize};

use crate::entities::DeliveryMethod;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
}

impl LocationData {
    /// Address line for pasting into a courier app.
    pub fn formatted_address(&self) -> String {
        format_address(&self.address, &self.city, &self.postal_code)
    }
}

/// Joins the non-empty parts with ", " and collapses whitespace runs.
pub fn format_address(address: &str, city: &str, postal_code: &str) -> String {
    let joined = [address, city, postal_code]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedirectTarget {
    pub web: Option<&'static str>,
    pub deep_link: Option<&'static str>,
    pub description: &'static str,
}

impl RedirectTarget {
    pub fn for_method(method: DeliveryMethod) -> Self {
        let (web, deep_link, description) = match method {
            DeliveryMethod::Porter => (
                Some("https://www.porter.in/app"),
                Some("porter://"),
                "Open Porter app to book delivery",
            ),
            DeliveryMethod::Dunzo => (
                Some("https://dunzohub.com"),
                Some("dunzo://"),
                "Open Dunzo app to book delivery",
            ),
            DeliveryMethod::Rapido => (
                Some("https://www.rapido.app"),
                Some("rapido://"),
                "Open Rapido app to book delivery",
            ),
            DeliveryMethod::SwiggyGenie => (
                Some("https://www.swiggy.com/genie"),
                Some("swiggy://"),
                "Open Swiggy Genie to book delivery",
            ),
            DeliveryMethod::SelfService => (None, None, "Handle delivery yourself"),
        };

        Self {
            web,
            deep_link,
            description,
        }
    }

    /// Self-service has no external app to open.
    pub fn url(&self, is_mobile: bool) -> Option<&'static str> {
        if is_mobile && self.deep_link.is_some() {
            return self.deep_link;
        }

        self.web
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardPayload {
    pub pickup_address: String,
    pub drop_address: String,
    pub full_text: String,
}

impl ClipboardPayload {
    pub fn new(pickup: &LocationData, drop: &LocationData) -> Self {
        let pickup_address = pickup.formatted_address();
        let drop_address = drop.formatted_address();
        let full_text = format!("PICKUP: {}\n\nDROP: {}", pickup_address, drop_address);

        Self {
            pickup_address,
            drop_address,
            full_text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPreparation {
    pub redirect_url: Option<String>,
    pub addresses: ClipboardPayload,
    pub description: String,
}

#[test]
fn format_address_skips_empty_parts() {
    assert_eq!(
        format_address("  12  MG Road ", "Bengaluru", ""),
        "12 MG Road, Bengaluru"
    );
    assert_eq!(format_address("", "", "560001"), "560001");
    assert_eq!(format_address("", "", ""), "");
}

#[test]
fn mobile_prefers_deep_link() {
    let porter = RedirectTarget::for_method(DeliveryMethod::Porter);
    assert_eq!(porter.url(true), Some("porter://"));
    assert_eq!(porter.url(false), Some("https://www.porter.in/app"));

    let own = RedirectTarget::for_method(DeliveryMethod::SelfService);
    assert_eq!(own.url(true), None);
    assert_eq!(own.url(false), None);
}

#[test]
fn clipboard_text_lists_both_addresses() {
    let pickup = LocationData {
        address: "Hall 3, Palace Grounds".into(),
        city: "Bengaluru".into(),
        ..Default::default()
    };
    let drop = LocationData {
        address: "Asha Shelter".into(),
        postal_code: "560034".into(),
        ..Default::default()
    };

    let payload = ClipboardPayload::new(&pickup, &drop);
    assert_eq!(
        payload.full_text,
        "PICKUP: Hall 3, Palace Grounds, Bengaluru\n\nDROP: Asha Shelter, 560034"
    );
}
