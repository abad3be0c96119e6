//! btleplug central backend
//!
//! Scans with an open filter and picks the first peripheral whose local name
//! matches the prefix or that advertises one of the wanted services. The
//! service list is only a hint: the bridge verifies it after connecting.

use std::time::{Duration, Instant};

use btleplug::api::{
    Central, CentralEvent, CharPropFlags, Characteristic, Manager as _, Peripheral as _,
    PeripheralProperties, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::ble::transport::{Device, DeviceFilter, LinkEvent, Transport, WriteMode};
use crate::config::ble::SCAN_POLL_MS;
use crate::error::TransportError;

impl From<btleplug::Error> for TransportError {
    fn from(error: btleplug::Error) -> Self {
        match error {
            btleplug::Error::DeviceNotFound => TransportError::DeviceNotFound,
            btleplug::Error::NotConnected => TransportError::NotConnected,
            btleplug::Error::NotSupported(what) => TransportError::NotSupported(what),
            other => TransportError::Backend(other.to_string()),
        }
    }
}

/// Host Bluetooth adapter driven through btleplug
pub struct BtleTransport {
    // Kept alive for as long as the adapter is in use
    _manager: Option<Manager>,
    adapter: Option<Adapter>,
    scan_timeout: Duration,
}

impl BtleTransport {
    /// Take the first adapter on the host.
    ///
    /// A host without an adapter still yields a transport; it reports itself
    /// as unavailable so connect can fail cleanly.
    pub async fn new(scan_timeout: Duration) -> Self {
        match Self::first_adapter().await {
            Ok((manager, adapter)) => Self {
                _manager: Some(manager),
                adapter: Some(adapter),
                scan_timeout,
            },
            Err(e) => {
                warn!("Bluetooth adapter unavailable: {}", e);
                Self {
                    _manager: None,
                    adapter: None,
                    scan_timeout,
                }
            }
        }
    }

    async fn first_adapter() -> Result<(Manager, Adapter), TransportError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(TransportError::NoAdapter)?;
        Ok((manager, adapter))
    }

    /// Poll the discovered peripherals until one matches or the timeout passes.
    async fn find_device(
        &self,
        adapter: &Adapter,
        filter: &DeviceFilter,
    ) -> Result<Peripheral, TransportError> {
        let start = Instant::now();

        while start.elapsed() < self.scan_timeout {
            let mut candidates = Vec::new();
            for peripheral in adapter.peripherals().await? {
                let props = peripheral.properties().await;
                candidates.push((peripheral, props));
            }

            if let Some((peripheral, props)) = first_match(candidates, filter) {
                info!(
                    "found {} ({:?})",
                    props.local_name.as_deref().unwrap_or("unnamed"),
                    peripheral.id()
                );
                return Ok(peripheral);
            }

            tokio::time::sleep(Duration::from_millis(SCAN_POLL_MS)).await;
        }

        Err(TransportError::DeviceNotFound)
    }
}

/// First candidate whose properties pass the filter. A candidate whose
/// properties could not be read is skipped, not fatal to the scan.
fn first_match<P>(
    candidates: impl IntoIterator<Item = (P, Result<Option<PeripheralProperties>, btleplug::Error>)>,
    filter: &DeviceFilter,
) -> Option<(P, PeripheralProperties)> {
    candidates.into_iter().find_map(|(peripheral, props)| match props {
        Ok(Some(props)) if matches_filter(&props, filter) => Some((peripheral, props)),
        Ok(_) => None,
        Err(e) => {
            debug!("skipping peripheral: {}", e);
            None
        }
    })
}

fn matches_filter(props: &PeripheralProperties, filter: &DeviceFilter) -> bool {
    if filter.services.is_empty() && filter.name_prefix.is_none() {
        return true;
    }

    let named = match (&filter.name_prefix, &props.local_name) {
        (Some(prefix), Some(name)) => name.starts_with(prefix.as_str()),
        _ => false,
    };
    named || props.services.iter().any(|s| filter.services.contains(s))
}

impl Transport for BtleTransport {
    type Device = BtleDevice;

    async fn is_available(&self) -> bool {
        self.adapter.is_some()
    }

    async fn request_device(&self, filter: &DeviceFilter) -> Result<BtleDevice, TransportError> {
        let adapter = self.adapter.as_ref().ok_or(TransportError::NoAdapter)?;

        adapter.start_scan(ScanFilter::default()).await?;
        let found = self.find_device(adapter, filter).await;
        if let Err(e) = adapter.stop_scan().await {
            debug!("stop scan failed: {}", e);
        }

        Ok(BtleDevice {
            adapter: adapter.clone(),
            peripheral: found?,
        })
    }
}

/// A peripheral selected by [`BtleTransport`]
#[derive(Clone)]
pub struct BtleDevice {
    adapter: Adapter,
    peripheral: Peripheral,
}

impl Device for BtleDevice {
    type Characteristic = Characteristic;
    type Events = BoxStream<'static, LinkEvent>;

    fn id(&self) -> String {
        format!("{:?}", self.peripheral.id())
    }

    async fn open(&self) -> Result<(), TransportError> {
        self.peripheral.connect().await?;
        self.peripheral.discover_services().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.peripheral.disconnect().await?;
        Ok(())
    }

    async fn has_service(&self, service: Uuid) -> Result<bool, TransportError> {
        if !self.peripheral.is_connected().await? {
            return Err(TransportError::NotConnected);
        }
        Ok(self.peripheral.services().iter().any(|s| s.uuid == service))
    }

    async fn characteristic(
        &self,
        service: Uuid,
        uuid: Uuid,
    ) -> Result<Characteristic, TransportError> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.service_uuid == service && c.uuid == uuid)
            .ok_or(TransportError::CharacteristicNotFound(uuid))
    }

    fn supports_write_without_response(&self, characteristic: &Characteristic) -> bool {
        characteristic
            .properties
            .contains(CharPropFlags::WRITE_WITHOUT_RESPONSE)
    }

    async fn write(
        &self,
        characteristic: &Characteristic,
        data: &[u8],
        mode: WriteMode,
    ) -> Result<(), TransportError> {
        let write_type = match mode {
            WriteMode::WithResponse => WriteType::WithResponse,
            WriteMode::WithoutResponse => WriteType::WithoutResponse,
        };
        self.peripheral
            .write(characteristic, data, write_type)
            .await
            .map_err(|e| TransportError::WriteRejected(e.to_string()))
    }

    async fn subscribe(&self, characteristic: &Characteristic) -> Result<(), TransportError> {
        let notifiable = characteristic
            .properties
            .intersects(CharPropFlags::NOTIFY | CharPropFlags::INDICATE);
        if !notifiable {
            return Err(TransportError::NotSupported(format!(
                "{} does not notify",
                characteristic.uuid
            )));
        }
        self.peripheral.subscribe(characteristic).await?;
        Ok(())
    }

    async fn unsubscribe(&self, characteristic: &Characteristic) -> Result<(), TransportError> {
        self.peripheral.unsubscribe(characteristic).await?;
        Ok(())
    }

    async fn events(&self) -> Result<BoxStream<'static, LinkEvent>, TransportError> {
        let notifications = self
            .peripheral
            .notifications()
            .await?
            .map(|n| LinkEvent::Notification {
                characteristic: n.uuid,
                value: n.value,
            });

        let target = self.peripheral.id();
        let disconnects = self.adapter.events().await?.filter_map(move |event| {
            let event = match event {
                CentralEvent::DeviceDisconnected(id) if id == target => {
                    Some(LinkEvent::Disconnected)
                }
                _ => None,
            };
            future::ready(event)
        });

        Ok(stream::select(notifications, disconnects).boxed())
    }
}
