use serde::{Deserialize, Serialize};

use crate::entities::DeliveryMethod;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOption {
    pub id: String,
    pub name: String,
    pub icon_url: String,
    pub description: String,
    pub website: String,
    pub is_available: bool,
}

impl DeliveryOption {
    pub fn for_method(method: DeliveryMethod) -> Self {
        let (name, description, website) = match method {
            DeliveryMethod::Porter => (
                "Porter",
                "Fast food delivery service",
                "https://www.porter.in/app",
            ),
            DeliveryMethod::Dunzo => (
                "Dunzo",
                "Quick delivery in your city",
                "https://dunzohub.com",
            ),
            DeliveryMethod::Rapido => ("Rapido", "Bike delivery service", "https://www.rapido.app"),
            DeliveryMethod::SwiggyGenie => (
                "Swiggy Genie",
                "Multi-category delivery",
                "https://www.swiggy.com/genie",
            ),
            DeliveryMethod::SelfService => (
                "Self-Service Delivery",
                "Donor or NGO handles delivery",
                "",
            ),
        };

        Self {
            id: method.id().into(),
            name: name.into(),
            icon_url: format!("/static/images/delivery_icons/{}.png", method.id()),
            description: description.into(),
            website: website.into(),
            is_available: true,
        }
    }
}
