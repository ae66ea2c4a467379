use rumqttc::{LastWill, QoS};

use crate::mqtt::topics::Topics;
use crate::mqtt::{publish_all, Bus, Publication, PAYLOAD_OFF, PAYLOAD_OFFLINE, PAYLOAD_ONLINE};

/// The retained "offline" message the broker publishes on our behalf if the
/// session drops without an orderly disconnect. Must be registered on the
/// client options before connecting; MQTT allows exactly one, re-registering
/// replaces it.
pub fn last_will(topics: &Topics) -> LastWill {
    LastWill::new(
        &topics.printer_availability,
        PAYLOAD_OFFLINE,
        QoS::AtLeastOnce,
        true,
    )
}

pub fn availability_publication(topics: &Topics) -> Publication {
    Publication::retained(&topics.printer_availability, PAYLOAD_ONLINE)
}

/// State resets issued after availability: printer idle, no paper problem,
/// no error. Not retained.
pub fn state_reset_publications(topics: &Topics) -> Vec<Publication> {
    vec![
        Publication::transient(&topics.printer_state, PAYLOAD_OFF),
        Publication::transient(&topics.paper_state, PAYLOAD_OFF),
        Publication::transient(&topics.error_state, PAYLOAD_OFF),
    ]
}

/// The full birth plan in publish order: availability first, then the three
/// state resets.
pub fn birth_publications(topics: &Topics) -> Vec<Publication> {
    let mut publications = vec![availability_publication(topics)];
    publications.extend(state_reset_publications(topics));
    publications
}

/// Marks the device as available (user interactions enabled) in Home
/// Assistant. Must run only after a successful connect.
pub async fn send_available<B: Bus>(bus: &B, topics: &Topics) {
    log::info!("Setting availability to (online)");
    publish_all(bus, &[availability_publication(topics)]).await;
}

/// Resets the device's state in Home Assistant at (re)connection.
///
/// After every reconnect, including ones following an uncontrolled restart,
/// the platform's view of "printing / out of paper / erroring" returns to a
/// known-safe baseline instead of replaying stale state.
pub async fn send_birth<B: Bus>(bus: &B, topics: &Topics) {
    send_available(bus, topics).await;
    log::info!("Resetting initial state to (off)");
    publish_all(bus, &state_reset_publications(topics)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mqtt::topics::DeviceIdentity;

    #[test]
    fn last_will_targets_availability_topic_retained() {
        let topics = Topics::new(DeviceIdentity::default());
        let will = last_will(&topics);

        assert_eq!(will.topic, topics.printer_availability);
        assert_eq!(will.message.as_ref(), b"offline".as_slice());
        assert!(will.retain);
    }

    #[test]
    fn birth_publishes_online_before_any_state_reset() {
        let topics = Topics::new(DeviceIdentity::default());
        let plan = birth_publications(&topics);

        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0].topic, topics.printer_availability);
        assert_eq!(plan[0].payload, "online");
        assert!(plan[0].retain);

        for publication in &plan[1..] {
            assert_eq!(publication.payload, "off");
            assert!(!publication.retain);
        }
        assert_eq!(plan[1].topic, topics.printer_state);
        assert_eq!(plan[2].topic, topics.paper_state);
        assert_eq!(plan[3].topic, topics.error_state);
    }
}
