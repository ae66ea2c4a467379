/// Fixed identity of the single bridged device. Immutable for the process
/// lifetime; used solely to derive the topic set below.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    /// Home Assistant MQTT autodiscovery prefix
    /// (https://www.home-assistant.io/docs/mqtt/discovery/#discovery_prefix)
    pub discovery_prefix: String,
    /// Device-specific identifier, doubles as the MQTT client id. Change it
    /// to run multiple printers against the same broker.
    pub node_id: String,
    pub printer_id: String,
    pub paper_id: String,
    pub error_id: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            discovery_prefix: String::from("homeassistant"),
            node_id: String::from("morning_news_printer"),
            printer_id: String::from("printer"),
            paper_id: String::from("paper"),
            error_id: String::from("error"),
        }
    }
}

impl DeviceIdentity {
    /// Globally-unique entity id as Home Assistant expects it.
    pub fn unique_id(&self, object_id: &str) -> String {
        format!("{}_{}", self.node_id, object_id)
    }
}

/// The complete set of bus topics, derived once at startup and shared
/// read-only. Every component must use the same instance: subscribe/match is
/// done by string identity.
#[derive(Debug)]
pub struct Topics {
    pub identity: DeviceIdentity,
    pub printer_config: String,
    pub printer_state: String,
    pub printer_availability: String,
    pub printer_command: String,
    pub paper_config: String,
    pub paper_state: String,
    pub error_config: String,
    pub error_state: String,
}

impl Topics {
    pub fn new(identity: DeviceIdentity) -> Self {
        let switch = |object_id: &str, leaf: &str| {
            format!(
                "{}/switch/{}/{}/{}",
                identity.discovery_prefix, identity.node_id, object_id, leaf
            )
        };
        let binary_sensor = |object_id: &str, leaf: &str| {
            format!(
                "{}/binary_sensor/{}/{}/{}",
                identity.discovery_prefix, identity.node_id, object_id, leaf
            )
        };

        Self {
            printer_config: switch(&identity.printer_id, "config"),
            printer_state: switch(&identity.printer_id, "state"),
            printer_availability: switch(&identity.printer_id, "availability"),
            printer_command: switch(&identity.printer_id, "set"),
            paper_config: binary_sensor(&identity.paper_id, "config"),
            paper_state: binary_sensor(&identity.paper_id, "state"),
            error_config: binary_sensor(&identity.error_id, "config"),
            error_state: binary_sensor(&identity.error_id, "state"),
            identity,
        }
    }
}
