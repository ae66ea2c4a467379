use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Packet, Publish};

use crate::config::MqttConfig;
use crate::discovery;
use crate::mqtt::topics::Topics;
use crate::mqtt::{publish_all, Bus, Publication, PAYLOAD_OFF, PAYLOAD_ON};
use crate::presence;
use crate::print_job::{self, JobSlot, PrintScript};

/// Fixed pause before another connection attempt. Transient network faults
/// and misconfiguration are retried alike; only the startup config check
/// fails fast.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

const KEEP_ALIVE: Duration = Duration::from_secs(60);

// Outgoing request queue; must hold the discovery + birth burst until the
// event loop drains it.
const REQUEST_QUEUE_SIZE: usize = 64;

/// Source of session events consumed by the supervisor's dispatch loop.
pub trait EventSource: Send {
    fn next_event(&mut self) -> impl Future<Output = Result<Event, ConnectionError>> + Send;
}

impl EventSource for EventLoop {
    async fn next_event(&mut self) -> Result<Event, ConnectionError> {
        self.poll().await
    }
}

/// Owns the MQTT session for the life of the process: connect, announce,
/// dispatch commands, reconnect. Other components only ever get a
/// publish/subscribe capability, never the session lifecycle.
pub struct MqttService {
    mqtt: MqttConfig,
    topics: Arc<Topics>,
    script: PrintScript,
    jobs: JobSlot,
}

impl MqttService {
    pub fn new(mqtt: MqttConfig, topics: Topics, script: PrintScript) -> Self {
        Self {
            mqtt,
            topics: Arc::new(topics),
            script,
            jobs: JobSlot::new(),
        }
    }

    /// Runs forever; only external process termination stops it.
    pub async fn run(self) {
        let mut options = MqttOptions::new(
            &self.topics.identity.node_id,
            &self.mqtt.host,
            self.mqtt.port,
        );
        options.set_credentials(&self.mqtt.username, &self.mqtt.password);
        options.set_keep_alive(KEEP_ALIVE);
        // Registered before the first connect; the broker publishes it on any
        // unclean drop.
        options.set_last_will(presence::last_will(&self.topics));

        log::info!(
            "Connecting to MQTT broker at {}:{}",
            self.mqtt.host,
            self.mqtt.port
        );
        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_QUEUE_SIZE);
        self.drive(&client, &mut event_loop).await
    }

    /// Dispatches session events sequentially; each accepted print command
    /// runs on its own task so this loop is never blocked by the script.
    pub async fn drive<B: Bus, S: EventSource>(&self, bus: &B, events: &mut S) {
        loop {
            match events.next_event().await {
                Ok(event) => self.handle_event(bus, event).await,
                Err(err) => {
                    log::error!(
                        "MQTT connection error: {} (retrying in {:?})",
                        err,
                        RECONNECT_DELAY
                    );
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    async fn handle_event<B: Bus>(&self, bus: &B, event: Event) {
        match event {
            Event::Incoming(Packet::ConnAck(ack)) => {
                log::info!("Connected with result code {:?}", ack.code);
                if let Err(err) = discovery::announce(bus, &self.topics).await {
                    log::error!("Failed to publish autodiscovery data: {}", err);
                }
                presence::send_birth(bus, &self.topics).await;
                if let Err(err) = bus.subscribe(&self.topics.printer_command).await {
                    log::error!(
                        "Failed to subscribe to {}: {}",
                        self.topics.printer_command,
                        err
                    );
                }
            }
            Event::Incoming(Packet::Publish(message)) => self.handle_message(bus, &message).await,
            Event::Incoming(Packet::Disconnect) => {
                log::warn!("Disconnected by the broker");
            }
            _ => {}
        }
    }

    async fn handle_message<B: Bus>(&self, bus: &B, message: &Publish) {
        let payload = match std::str::from_utf8(&message.payload) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("Ignoring non-UTF-8 payload on {}: {}", message.topic, err);
                return;
            }
        };
        log::info!("{} {}", message.topic, payload);

        if message.topic != self.topics.printer_command {
            return;
        }

        match payload {
            PAYLOAD_ON => self.start_print_job(bus),
            PAYLOAD_OFF => {
                // Best-effort UI feedback; a running job is not preemptible.
                log::info!("Updating printer state with (off)");
                publish_all(
                    bus,
                    &[Publication::transient(&self.topics.printer_state, PAYLOAD_OFF)],
                )
                .await;
            }
            // Anything else is not a recognized command.
            _ => {}
        }
    }

    fn start_print_job<B: Bus>(&self, bus: &B) {
        match self.jobs.try_start() {
            Some(permit) => {
                tokio::spawn(print_job::run_print_job(
                    bus.clone(),
                    Arc::clone(&self.topics),
                    self.script.clone(),
                    permit,
                ));
            }
            None => log::warn!("A print job is already running, ignoring start command"),
        }
    }
}
