//! Per-device decode actors.
//!
//! Every connected device gets one tokio task that owns its `DeviceDecoder`
//! and drains a bounded command queue in arrival order. Devices never share
//! decode state, so their tasks run in parallel.

use biosignal_decoder::{DeviceDecoder, SinkEvent};
use biosignal_types::{ConfigError, DeviceId, SignalType, StreamConfig};
use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::HubConfig;
use crate::error::HubError;
use crate::event::DeliveryEvent;

/// Work queued for a device actor.
#[derive(Debug)]
pub enum DeviceCommand {
    Configure {
        signal: SignalType,
        config: StreamConfig,
        reply: oneshot::Sender<Result<(), ConfigError>>,
    },
    Packet(Bytes),
}

struct DeviceHandle {
    commands: flume::Sender<DeviceCommand>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Routes device callbacks to per-device actors.
pub struct DeviceHub {
    devices: DashMap<DeviceId, DeviceHandle>,
    config: HubConfig,
    events_tx: flume::Sender<DeliveryEvent>,
}

impl DeviceHub {
    /// Creates a hub and the receiver its delivery events arrive on.
    ///
    /// Must be called from within a tokio runtime. The receiver holds at most
    /// `event_capacity` events; actors wait for it to be drained.
    pub fn new(config: HubConfig) -> (Self, flume::Receiver<DeliveryEvent>) {
        let (events_tx, events_rx) = flume::bounded(config.event_capacity.max(1));
        let hub = Self {
            devices: DashMap::new(),
            config,
            events_tx,
        };
        (hub, events_rx)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_connected(&self, device: &DeviceId) -> bool {
        self.devices.contains_key(device)
    }

    /// Returns the command queue of `device`, spawning its actor on first use.
    fn commands_for(&self, device: &DeviceId) -> flume::Sender<DeviceCommand> {
        self.devices
            .entry(device.clone())
            .or_insert_with(|| self.spawn_actor(device))
            .commands
            .clone()
    }

    fn spawn_actor(&self, device: &DeviceId) -> DeviceHandle {
        let (commands, commands_rx) = flume::bounded(self.config.queue_capacity.max(1));
        let cancel = CancellationToken::new();
        let actor = DeviceActor {
            decoder: DeviceDecoder::new(device.clone(), self.config.decoder.clone()),
            commands: commands_rx,
            events: self.events_tx.clone(),
            cancel: cancel.clone(),
        };
        debug!(device = %device, "Spawning device actor");
        let task = tokio::spawn(actor.run());
        DeviceHandle { commands, cancel, task }
    }

    /// Install or replace the stream configuration of one signal type.
    ///
    /// Resolves once the actor has applied it; packets sent afterwards decode
    /// against the new configuration.
    pub async fn on_configured(
        &self,
        device: &DeviceId,
        signal: SignalType,
        config: StreamConfig,
    ) -> Result<(), HubError> {
        let (reply, reply_rx) = oneshot::channel();
        self.commands_for(device)
            .send_async(DeviceCommand::Configure { signal, config, reply })
            .await
            .map_err(|_| HubError::DeviceClosed(device.clone()))?;
        reply_rx
            .await
            .map_err(|_| HubError::DeviceClosed(device.clone()))??;
        Ok(())
    }

    /// Queue one raw notification. Waits while the device's queue is full.
    pub async fn on_packet(&self, device: &DeviceId, bytes: impl Into<Bytes>) -> Result<(), HubError> {
        self.commands_for(device)
            .send_async(DeviceCommand::Packet(bytes.into()))
            .await
            .map_err(|_| HubError::DeviceClosed(device.clone()))
    }

    /// Tear down the device's actor and everything it had decoded but not yet
    /// delivered. Returns false if the device was not connected.
    ///
    /// Nothing from the old actor is delivered once this returns.
    pub async fn on_disconnect(&self, device: &DeviceId) -> bool {
        let Some((_, handle)) = self.devices.remove(device) else {
            return false;
        };
        handle.cancel.cancel();
        drop(handle.commands);
        if let Err(e) = handle.task.await {
            warn!(device = %device, error = %e, "Device actor ended abnormally");
        }
        info!(device = %device, "Device disconnected");
        true
    }

    /// Let every actor drain its queue, then stop them.
    ///
    /// Output beyond the event capacity must be consumed concurrently.
    pub async fn shutdown(self) {
        let handles: Vec<(DeviceId, DeviceHandle)> = self
            .devices
            .into_iter()
            .collect();
        for (device, handle) in handles {
            drop(handle.commands);
            if let Err(e) = handle.task.await {
                warn!(device = %device, error = %e, "Device actor ended abnormally");
            }
        }
        debug!("Device hub shut down");
    }
}

struct DeviceActor {
    decoder: DeviceDecoder,
    commands: flume::Receiver<DeviceCommand>,
    events: flume::Sender<DeliveryEvent>,
    cancel: CancellationToken,
}

impl DeviceActor {
    async fn run(mut self) {
        loop {
            let command = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                command = self.commands.recv_async() => match command {
                    Ok(command) => command,
                    Err(_) => break,
                },
            };

            match command {
                DeviceCommand::Configure { signal, config, reply } => {
                    let result = self.decoder.on_configured(signal, config);
                    let _ = reply.send(result);
                }
                DeviceCommand::Packet(bytes) => {
                    let mut pending: Vec<SinkEvent> = Vec::new();
                    self.decoder.on_packet(&bytes, &mut pending);
                    self.deliver(pending).await;
                }
            }
        }

        self.decoder.on_disconnect();
        debug!(device = %self.decoder.device(), "Device actor stopped");
    }

    async fn deliver(&self, pending: Vec<SinkEvent>) {
        for event in pending {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!(device = %self.decoder.device(), "Dropping output of a disconnected device");
                    return;
                }
                sent = self.events.send_async(DeliveryEvent::from(event)) => {
                    if sent.is_err() {
                        // No subscriber left; keep decoding so sequence state stays current.
                        return;
                    }
                }
            }
        }
    }
}
