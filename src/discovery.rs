use crate::mqtt::homeassistant::Configuration;
use crate::mqtt::topics::Topics;
use crate::mqtt::{publish_all, Bus, Publication};

/// Ordered discovery plan: three retained JSON documents, one per entity, to
/// the respective config topics.
pub fn publications(topics: &Topics) -> serde_json::Result<Vec<Publication>> {
    Ok(vec![
        Publication::retained(
            &topics.printer_config,
            serde_json::to_string(&Configuration::printer_switch(topics))?,
        ),
        Publication::retained(
            &topics.paper_config,
            serde_json::to_string(&Configuration::paper_sensor(topics))?,
        ),
        Publication::retained(
            &topics.error_config,
            serde_json::to_string(&Configuration::error_sensor(topics))?,
        ),
    ])
}

/// Lets Home Assistant know about this device's entities.
///
/// Idempotent: republishing simply overwrites the platform's prior
/// registration, so it is safe to call on every (re)connect.
pub async fn announce<B: Bus>(bus: &B, topics: &Topics) -> anyhow::Result<()> {
    log::info!("Republishing Home Assistant autodiscovery data");
    let publications = publications(topics)?;
    publish_all(bus, &publications).await;
    Ok(())
}
