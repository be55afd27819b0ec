use super::Engine;

use std::collections::BTreeMap;

use crate::{
    api::OptionAPI,
    entities::{DeliveryMethod, DeliveryOption},
    error::{not_found_error, Error},
};

impl OptionAPI for Engine {
    fn list_options(&self) -> BTreeMap<String, DeliveryOption> {
        DeliveryMethod::ALL
            .into_iter()
            .map(|method| (method.id().to_string(), DeliveryOption::for_method(method)))
            .collect()
    }

    fn find_option(&self, id: &str) -> Result<DeliveryOption, Error> {
        DeliveryMethod::from_id(id)
            .map(DeliveryOption::for_method)
            .ok_or_else(|| not_found_error(format!("Delivery option {} not found", id)))
    }
}

#[test]
fn lists_every_method() {
    let engine = Engine::in_memory();
    let options = engine.list_options();

    assert_eq!(options.len(), 5);
    assert_eq!(options["swiggy_genie"].name, "Swiggy Genie");
    assert_eq!(
        options["porter"].icon_url,
        "/static/images/delivery_icons/porter.png"
    );
    assert!(options.values().all(|option| option.is_available));
}

#[test]
fn unknown_option_is_not_found() {
    let engine = Engine::in_memory();

    assert_eq!(engine.find_option("rapido").unwrap().website, "https://www.rapido.app");
    assert!(engine.find_option("ola").unwrap_err().is_not_found_error());
}
