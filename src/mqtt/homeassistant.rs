use serde::{Deserialize, Serialize};

use crate::mqtt::topics::Topics;
use crate::mqtt::{PAYLOAD_OFF, PAYLOAD_OFFLINE, PAYLOAD_ON, PAYLOAD_ONLINE};

/// Seconds without an update after which Home Assistant marks a problem
/// sensor as stale.
const PROBLEM_EXPIRY_SECS: u32 = 86_400;

/// A Home Assistant MQTT discovery document.
///
/// Published retained to an entity's config topic so the platform
/// (re)registers the entity. Refer to the official docs for the allowed keys:
/// https://www.home-assistant.io/docs/mqtt/discovery/#examples
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct Configuration {
    name: String,
    unique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expire_after: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    force_update: Option<bool>,
    state_topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command_topic: Option<String>,
    payload_on: String,
    payload_off: String,
    availability_topic: String,
    payload_available: String,
    payload_not_available: String,
}

impl Configuration {
    fn entity(topics: &Topics, name: &str, object_id: &str, state_topic: &str) -> Configuration {
        Configuration {
            name: String::from(name),
            unique_id: topics.identity.unique_id(object_id),
            icon: None,
            device_class: None,
            expire_after: None,
            force_update: None,
            state_topic: String::from(state_topic),
            command_topic: None,
            payload_on: String::from(PAYLOAD_ON),
            payload_off: String::from(PAYLOAD_OFF),
            availability_topic: topics.printer_availability.clone(),
            payload_available: String::from(PAYLOAD_ONLINE),
            payload_not_available: String::from(PAYLOAD_OFFLINE),
        }
    }

    /// The printer itself, exposed as a commandable switch.
    pub fn printer_switch(topics: &Topics) -> Configuration {
        let mut config = Self::entity(
            topics,
            "Morning News",
            &topics.identity.printer_id,
            &topics.printer_state,
        );
        config.icon = Some(String::from("mdi:printer"));
        config.command_topic = Some(topics.printer_command.clone());
        config
    }

    /// Out-of-paper problem sensor.
    pub fn paper_sensor(topics: &Topics) -> Configuration {
        let mut config = Self::entity(
            topics,
            "Morning News (out of paper)",
            &topics.identity.paper_id,
            &topics.paper_state,
        );
        config.device_class = Some(String::from("problem"));
        config.expire_after = Some(PROBLEM_EXPIRY_SECS);
        config
    }

    /// Generic error problem sensor. `force_update` makes the platform treat
    /// every publish as a change even when the value repeats.
    pub fn error_sensor(topics: &Topics) -> Configuration {
        let mut config = Self::entity(
            topics,
            "Morning News (error)",
            &topics.identity.error_id,
            &topics.error_state,
        );
        config.device_class = Some(String::from("problem"));
        config.expire_after = Some(PROBLEM_EXPIRY_SECS);
        config.force_update = Some(true);
        config
    }
}
