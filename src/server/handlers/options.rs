use axum::extract::{Extension, Path};
use std::collections::BTreeMap;

use crate::api::DynAPI;
use crate::entities::DeliveryOption;
use crate::server::{success, Reply};

pub async fn list(Extension(api): Extension<DynAPI>) -> Reply<BTreeMap<String, DeliveryOption>> {
    Ok(success(api.list_options()))
}

pub async fn find(Extension(api): Extension<DynAPI>, Path(id): Path<String>) -> Reply<DeliveryOption> {
    let option = api.find_option(&id)?;

    Ok(success(option))
}
