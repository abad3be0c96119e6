//! UART bridge: connection state and host-facing surface
//!
//! The bridge owns at most one session. Connect, send and notification
//! delivery all run on the caller's event loop; the state lock is never held
//! across an `.await`, so a send can be in flight while a notification is
//! being delivered.

pub mod receiver;
pub mod sender;

use core::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};

use crate::ble::profile::{ConnectionProfile, ProfileSelection};
use crate::ble::transport::{Device, DeviceFilter, Transport, WriteMode};
use crate::error::{BridgeError, ConnectStage, TransportError};

pub use receiver::{InboundDecoder, InboundMode};
pub use sender::SendOutcome;

type Hook = Arc<dyn Fn() + Send + Sync>;
type TextHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Runtime bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgeConfig {
    /// Profiles a connect attempt may bind
    pub selection: ProfileSelection,
    /// How inbound notifications are turned into observer calls
    pub inbound_mode: InboundMode,
    /// Advertised name prefix passed to device selection
    pub name_prefix: Option<String>,
}

/// Observable link status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// One open link and its bound characteristics
pub(crate) struct Session<D: Device> {
    pub(crate) id: u64,
    pub(crate) device: D,
    pub(crate) profile: ConnectionProfile,
    pub(crate) outbound: D::Characteristic,
    pub(crate) inbound: D::Characteristic,
    pub(crate) write_mode: WriteMode,
    pub(crate) notifications: bool,
    /// Parked until `run_events` takes it
    pub(crate) events: Option<D::Events>,
}

pub(crate) enum ConnectionState<D: Device> {
    Disconnected,
    Connecting,
    Connected(Session<D>),
}

#[derive(Default)]
struct Observers {
    connected: Option<Hook>,
    disconnected: Option<Hook>,
    data: Option<TextHook>,
    alert: Option<TextHook>,
}

/// Serial-over-BLE link to one device
pub struct UartBridge<T: Transport> {
    transport: T,
    config: BridgeConfig,
    state: Mutex<ConnectionState<T::Device>>,
    inbound: Mutex<InboundDecoder>,
    observers: Mutex<Observers>,
    sessions: AtomicU64,
    /// Link left open by a dropped connect, closed on the next connect or disconnect
    orphan: Mutex<Option<T::Device>>,
}

pub(crate) fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Puts the state back to `Disconnected` if a connect attempt is dropped
/// before it finishes. A device the attempt had open is parked in `orphan`;
/// closing needs an `.await`, which `Drop` cannot do.
struct ConnectingGuard<'a, D: Device> {
    state: &'a Mutex<ConnectionState<D>>,
    orphan: &'a Mutex<Option<D>>,
    device: Option<D>,
    armed: bool,
}

impl<D: Device> ConnectingGuard<'_, D> {
    fn finish(mut self, session: Option<Session<D>>) {
        self.armed = false;
        self.device = None;
        *lock(self.state) = match session {
            Some(session) => ConnectionState::Connected(session),
            None => ConnectionState::Disconnected,
        };
    }
}

impl<D: Device> Drop for ConnectingGuard<'_, D> {
    fn drop(&mut self) {
        if self.armed {
            *lock(self.state) = ConnectionState::Disconnected;
            if let Some(device) = self.device.take() {
                warn!("connect to {} abandoned, link closes on next connect", device.id());
                *lock(self.orphan) = Some(device);
            }
        }
    }
}

impl<T: Transport> UartBridge<T> {
    /// Create a bridge over a transport
    pub fn new(transport: T, config: BridgeConfig) -> Self {
        let inbound = InboundDecoder::new(config.inbound_mode);
        Self {
            transport,
            config,
            state: Mutex::new(ConnectionState::Disconnected),
            inbound: Mutex::new(inbound),
            observers: Mutex::new(Observers::default()),
            sessions: AtomicU64::new(0),
            orphan: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Called after every successful connect
    pub fn on_connected<F: Fn() + Send + Sync + 'static>(&self, f: F) {
        lock(&self.observers).connected = Some(Arc::new(f));
    }

    /// Called when the session is lost or closed
    pub fn on_disconnected<F: Fn() + Send + Sync + 'static>(&self, f: F) {
        lock(&self.observers).disconnected = Some(Arc::new(f));
    }

    /// Called with each decoded inbound unit
    pub fn on_data_received<F: Fn(&str) + Send + Sync + 'static>(&self, f: F) {
        lock(&self.observers).data = Some(Arc::new(f));
    }

    /// Called with a user-facing message when connect fails
    pub fn on_alert<F: Fn(&str) + Send + Sync + 'static>(&self, f: F) {
        lock(&self.observers).alert = Some(Arc::new(f));
    }

    pub fn status(&self) -> LinkStatus {
        match &*lock(&self.state) {
            ConnectionState::Disconnected => LinkStatus::Disconnected,
            ConnectionState::Connecting => LinkStatus::Connecting,
            ConnectionState::Connected(_) => LinkStatus::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status() == LinkStatus::Connected
    }

    /// Profile bound by the current session
    pub fn profile(&self) -> Option<ConnectionProfile> {
        match &*lock(&self.state) {
            ConnectionState::Connected(session) => Some(session.profile),
            _ => None,
        }
    }

    /// Whether the current session delivers inbound notifications
    pub fn notifications_enabled(&self) -> bool {
        match &*lock(&self.state) {
            ConnectionState::Connected(session) => session.notifications,
            _ => false,
        }
    }

    /// Select a device, open a session and bind the UART characteristics.
    ///
    /// Failures are logged, reported to the alert observer and returned.
    /// A connect while another is in flight is rejected; a connect while
    /// connected closes the old session first.
    pub async fn connect(&self) -> Result<(), BridgeError> {
        match self.try_connect().await {
            Ok(profile) => {
                info!("connected ({} profile)", profile.name);
                let hook = lock(&self.observers).connected.clone();
                if let Some(hook) = hook {
                    hook();
                }
                Ok(())
            }
            Err(BridgeError::ConnectInProgress) => {
                warn!("connect ignored: another attempt is in progress");
                Err(BridgeError::ConnectInProgress)
            }
            Err(err) => {
                error!("connect failed: {}", err);
                let message = match err {
                    BridgeError::CapabilityUnavailable => err.to_string(),
                    _ => format!("Bluetooth connect failed: {}", err),
                };
                let hook = lock(&self.observers).alert.clone();
                if let Some(hook) = hook {
                    hook(&message);
                }
                Err(err)
            }
        }
    }

    async fn try_connect(&self) -> Result<ConnectionProfile, BridgeError> {
        if !self.transport.is_available().await {
            return Err(BridgeError::CapabilityUnavailable);
        }

        let previous = {
            let mut state = lock(&self.state);
            if matches!(*state, ConnectionState::Connecting) {
                return Err(BridgeError::ConnectInProgress);
            }
            match mem::replace(&mut *state, ConnectionState::Connecting) {
                ConnectionState::Connected(session) => Some(session),
                _ => None,
            }
        };
        let mut guard = ConnectingGuard {
            state: &self.state,
            orphan: &self.orphan,
            device: None,
            armed: true,
        };

        if let Some(old) = previous {
            info!("closing previous session to {}", old.device.id());
            lock(&self.inbound).reset();
            self.notify_disconnected();
            guard.device = Some(old.device.clone());
            if let Err(e) = old.device.close().await {
                warn!("failed to close previous session: {}", e);
            }
            guard.device = None;
        }
        self.close_orphan().await;

        let established = self.establish(&mut guard).await;
        match established {
            Ok(session) => {
                let profile = session.profile;
                lock(&self.inbound).bind(session.id);
                guard.finish(Some(session));
                Ok(profile)
            }
            Err(err) => {
                guard.finish(None);
                Err(err)
            }
        }
    }

    async fn establish(
        &self,
        guard: &mut ConnectingGuard<'_, T::Device>,
    ) -> Result<Session<T::Device>, BridgeError> {
        let filter = DeviceFilter {
            services: self.config.selection.services(),
            name_prefix: self.config.name_prefix.clone(),
        };

        let device = self
            .transport
            .request_device(&filter)
            .await
            .map_err(BridgeError::connect(ConnectStage::SelectDevice))?;
        info!("selected device {}", device.id());

        // Held from before open: a link may come up even if open is cancelled
        guard.device = Some(device.clone());
        device
            .open()
            .await
            .map_err(BridgeError::connect(ConnectStage::OpenSession))?;

        match self.bind(&device).await {
            Ok(session) => Ok(session),
            Err(err) => {
                if let Err(e) = device.close().await {
                    debug!("close after failed bind: {}", e);
                }
                guard.device = None;
                Err(err)
            }
        }
    }

    async fn bind(&self, device: &T::Device) -> Result<Session<T::Device>, BridgeError> {
        let profile = self.resolve_profile(device).await?;

        let outbound = device
            .characteristic(profile.service, profile.outbound)
            .await
            .map_err(BridgeError::connect(ConnectStage::ResolveCharacteristic))?;
        let inbound = device
            .characteristic(profile.service, profile.inbound)
            .await
            .map_err(BridgeError::connect(ConnectStage::ResolveCharacteristic))?;

        let write_mode = if device.supports_write_without_response(&outbound) {
            WriteMode::WithoutResponse
        } else {
            WriteMode::WithResponse
        };

        // Take the stream before subscribing so no early notification is lost
        let events = device
            .events()
            .await
            .map_err(BridgeError::connect(ConnectStage::SubscribeEvents))?;

        let notifications = match device.subscribe(&inbound).await {
            Ok(()) => true,
            Err(e) => {
                warn!("{} (ok to ignore)", BridgeError::NotificationUnavailable(e));
                false
            }
        };

        let id = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            "session {} bound: service {}, write mode {:?}",
            id, profile.service, write_mode
        );

        Ok(Session {
            id,
            device: device.clone(),
            profile,
            outbound,
            inbound,
            write_mode,
            notifications,
            events: Some(events),
        })
    }

    async fn resolve_profile(&self, device: &T::Device) -> Result<ConnectionProfile, BridgeError> {
        let candidates = self.config.selection.candidates();

        for profile in candidates {
            let present = device
                .has_service(profile.service)
                .await
                .map_err(BridgeError::connect(ConnectStage::ResolveService))?;
            if present {
                return Ok(*profile);
            }
            debug!("{} service {} not present", profile.name, profile.service);
        }

        let missing = candidates.first().map(|p| p.service).unwrap_or_default();
        Err(BridgeError::ConnectionFailure {
            stage: ConnectStage::ResolveService,
            source: TransportError::ServiceNotFound(missing),
        })
    }

    async fn close_orphan(&self) {
        let orphan = lock(&self.orphan).take();
        if let Some(device) = orphan {
            info!("closing abandoned link to {}", device.id());
            if let Err(e) = device.close().await {
                debug!("close of abandoned link failed: {}", e);
            }
        }
    }

    /// Close the current session, if any.
    pub async fn disconnect(&self) {
        self.close_orphan().await;
        let session = {
            let mut state = lock(&self.state);
            match mem::replace(&mut *state, ConnectionState::Disconnected) {
                ConnectionState::Connected(session) => Some(session),
                ConnectionState::Connecting => {
                    // Leave an in-flight connect alone
                    *state = ConnectionState::Connecting;
                    None
                }
                ConnectionState::Disconnected => None,
            }
        };

        let Some(session) = session else {
            return;
        };

        if session.notifications {
            if let Err(e) = session.device.unsubscribe(&session.inbound).await {
                debug!("unsubscribe failed: {}", e);
            }
        }
        if let Err(e) = session.device.close().await {
            warn!("disconnect from {} failed: {}", session.device.id(), e);
        }
        lock(&self.inbound).reset();
        info!("disconnected");
        self.notify_disconnected();
    }

    /// Reflect a transport-level disconnection of `device_id`.
    ///
    /// Events for a device other than the current one are ignored.
    pub fn handle_disconnect(&self, device_id: &str) {
        self.drop_session(|session| session.device.id() == device_id);
    }

    pub(crate) fn drop_session<F>(&self, is_target: F)
    where
        F: Fn(&Session<T::Device>) -> bool,
    {
        {
            let mut state = lock(&self.state);
            let current = matches!(&*state, ConnectionState::Connected(session) if is_target(session));
            if !current {
                debug!("ignoring disconnect for a stale session");
                return;
            }
            *state = ConnectionState::Disconnected;
        }

        lock(&self.inbound).reset();
        info!("disconnected");
        self.notify_disconnected();
    }

    fn notify_disconnected(&self) {
        let hook = lock(&self.observers).disconnected.clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::profile::{MICROBIT_UART, NORDIC_UART};
    use crate::ble::transport::mock::MockTransport;
    use std::sync::atomic::AtomicUsize;

    fn bridge_for(transport: &MockTransport, selection: ProfileSelection) -> UartBridge<MockTransport> {
        let config = BridgeConfig {
            selection,
            ..BridgeConfig::default()
        };
        UartBridge::new(transport.clone(), config)
    }

    #[test]
    fn test_connect_binds_profile() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        let connected = Arc::new(AtomicUsize::new(0));
        let counter = connected.clone();
        bridge.on_connected(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        futures::executor::block_on(async {
            bridge.connect().await.unwrap();
        });

        assert!(bridge.is_connected());
        assert_eq!(bridge.profile(), Some(MICROBIT_UART));
        assert!(bridge.notifications_enabled());
        assert!(transport.state().subscribed);
        assert_eq!(connected.load(Ordering::SeqCst), 1);

        let filter = transport.state().last_filter.clone().unwrap();
        assert_eq!(filter.services, vec![MICROBIT_UART.service]);
    }

    #[test]
    fn test_connect_without_capability() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        transport.state().available = false;
        let bridge = bridge_for(&transport, ProfileSelection::default());

        let alerts = Arc::new(Mutex::new(Vec::new()));
        let sink = alerts.clone();
        bridge.on_alert(move |msg| sink.lock().unwrap().push(msg.to_string()));

        let result = futures::executor::block_on(bridge.connect());

        assert_eq!(result, Err(BridgeError::CapabilityUnavailable));
        // No device prompt was shown
        assert_eq!(transport.state().requests, 0);
        assert_eq!(bridge.status(), LinkStatus::Disconnected);
        assert_eq!(
            alerts.lock().unwrap().as_slice(),
            &["Bluetooth is not supported on this host".to_string()]
        );
    }

    #[test]
    fn test_connect_selection_failure() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        transport.state().select_error = Some(TransportError::DeviceNotFound);
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        let alerts = Arc::new(Mutex::new(Vec::new()));
        let sink = alerts.clone();
        bridge.on_alert(move |msg| sink.lock().unwrap().push(msg.to_string()));

        let result = futures::executor::block_on(bridge.connect());

        assert_eq!(
            result,
            Err(BridgeError::ConnectionFailure {
                stage: ConnectStage::SelectDevice,
                source: TransportError::DeviceNotFound,
            })
        );
        assert_eq!(bridge.status(), LinkStatus::Disconnected);
        assert_eq!(
            alerts.lock().unwrap().as_slice(),
            &["Bluetooth connect failed: device selection failed: no matching device found".to_string()]
        );
    }

    #[test]
    fn test_connect_missing_service_closes_session() {
        let transport = MockTransport::with_profile(&NORDIC_UART);
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        let result = futures::executor::block_on(bridge.connect());

        match result {
            Err(BridgeError::ConnectionFailure { stage, source }) => {
                assert_eq!(stage, ConnectStage::ResolveService);
                assert_eq!(source, TransportError::ServiceNotFound(MICROBIT_UART.service));
            }
            other => panic!("Expected ConnectionFailure, got {:?}", other),
        }
        assert!(!bridge.is_connected());
        let state = transport.state();
        assert_eq!(state.opens, 1);
        assert_eq!(state.closes, 1);
    }

    #[test]
    fn test_connect_missing_characteristic_closes_session() {
        let transport = MockTransport::new();
        transport.state().services.push((MICROBIT_UART.service, vec![]));
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        let result = futures::executor::block_on(bridge.connect());

        match result {
            Err(BridgeError::ConnectionFailure { stage, source }) => {
                assert_eq!(stage, ConnectStage::ResolveCharacteristic);
                assert_eq!(
                    source,
                    TransportError::CharacteristicNotFound(MICROBIT_UART.outbound)
                );
            }
            other => panic!("Expected ConnectionFailure, got {:?}", other),
        }
        assert_eq!(bridge.status(), LinkStatus::Disconnected);
        let state = transport.state();
        assert_eq!(state.opens, 1);
        assert_eq!(state.closes, 1);
    }

    #[test]
    fn test_connect_event_stream_failure_closes_session() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        transport.state().events_error = Some(TransportError::Backend("no adapter events".to_string()));
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        let result = futures::executor::block_on(bridge.connect());

        assert!(matches!(
            result,
            Err(BridgeError::ConnectionFailure {
                stage: ConnectStage::SubscribeEvents,
                ..
            })
        ));
        assert_eq!(bridge.status(), LinkStatus::Disconnected);
        let state = transport.state();
        assert_eq!(state.closes, 1);
        assert!(!state.subscribed);
    }

    #[test]
    fn test_connect_open_failure() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        transport.state().open_error = Some(TransportError::Backend("gatt busy".to_string()));
        let bridge = bridge_for(&transport, ProfileSelection::default());

        let result = futures::executor::block_on(bridge.connect());

        assert!(matches!(
            result,
            Err(BridgeError::ConnectionFailure {
                stage: ConnectStage::OpenSession,
                ..
            })
        ));
        assert_eq!(bridge.status(), LinkStatus::Disconnected);
    }

    #[test]
    fn test_probe_falls_back_to_second_profile() {
        let transport = MockTransport::with_profile(&NORDIC_UART);
        let bridge = bridge_for(&transport, ProfileSelection::default());

        futures::executor::block_on(async {
            bridge.connect().await.unwrap();
        });

        assert_eq!(bridge.profile(), Some(NORDIC_UART));
        let filter = transport.state().last_filter.clone().unwrap();
        assert_eq!(filter.services, vec![MICROBIT_UART.service, NORDIC_UART.service]);
    }

    #[test]
    fn test_notification_failure_is_not_fatal() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        transport.state().subscribe_error =
            Some(TransportError::NotSupported("notify".to_string()));
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        futures::executor::block_on(async {
            bridge.connect().await.unwrap();
        });

        assert!(bridge.is_connected());
        assert!(!bridge.notifications_enabled());
    }

    #[test]
    fn test_concurrent_connect_rejected() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        let (first, second) = futures::executor::block_on(async {
            futures::join!(bridge.connect(), bridge.connect())
        });

        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(BridgeError::ConnectInProgress));
        assert_eq!(transport.state().requests, 1);
        assert!(bridge.is_connected());
    }

    #[test]
    fn test_reconnect_closes_previous_session() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        // Close count seen by each disconnect notification
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observed = transport.clone();
        bridge.on_disconnected(move || {
            let closes = observed.state().closes;
            sink.lock().unwrap().push(closes);
        });

        futures::executor::block_on(async {
            bridge.connect().await.unwrap();
            bridge.connect().await.unwrap();
        });

        let state = transport.state();
        assert_eq!(state.opens, 2);
        assert_eq!(state.closes, 1);
        // Observers hear about the old session before its close is awaited
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn test_disconnect_event_clears_session() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        futures::executor::block_on(async {
            bridge.connect().await.unwrap();
        });

        // Stale device id is ignored
        bridge.handle_disconnect("some-other-device");
        assert!(bridge.is_connected());

        bridge.handle_disconnect(transport.device_id());
        assert_eq!(bridge.status(), LinkStatus::Disconnected);
        assert_eq!(bridge.profile(), None);
    }

    #[test]
    fn test_explicit_disconnect() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        futures::executor::block_on(async {
            bridge.connect().await.unwrap();
            bridge.disconnect().await;
            // Second call is a no-op
            bridge.disconnect().await;
        });

        assert!(!bridge.is_connected());
        let state = transport.state();
        assert_eq!(state.closes, 1);
        assert!(!state.subscribed);
    }

    #[test]
    fn test_dropped_connect_resets_state() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        futures::executor::block_on(async {
            let mut attempt = Box::pin(bridge.connect());
            // Poll once so the attempt parks inside device selection
            let _ = futures::poll!(attempt.as_mut());
            assert_eq!(bridge.status(), LinkStatus::Connecting);
            drop(attempt);
        });

        assert_eq!(bridge.status(), LinkStatus::Disconnected);
    }

    /// Start a connect and drop it while it waits on the service lookup
    fn abandon_after_open(bridge: &UartBridge<MockTransport>, transport: &MockTransport) {
        transport.state().stall_service_lookup = true;
        futures::executor::block_on(async {
            let mut attempt = Box::pin(bridge.connect());
            // First poll parks in device selection, second in the service lookup
            let _ = futures::poll!(attempt.as_mut());
            let _ = futures::poll!(attempt.as_mut());
            assert_eq!(transport.state().opens, 1);
            drop(attempt);
        });
        transport.state().stall_service_lookup = false;
    }

    #[test]
    fn test_abandoned_link_closed_on_next_connect() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        abandon_after_open(&bridge, &transport);
        assert_eq!(bridge.status(), LinkStatus::Disconnected);
        assert_eq!(transport.state().closes, 0);

        futures::executor::block_on(bridge.connect()).unwrap();

        let state = transport.state();
        assert_eq!(state.closes, 1);
        assert_eq!(state.opens, 2);
        assert!(state.open);
    }

    #[test]
    fn test_abandoned_link_closed_on_disconnect() {
        let transport = MockTransport::with_profile(&MICROBIT_UART);
        let bridge = bridge_for(&transport, ProfileSelection::Fixed(MICROBIT_UART));

        abandon_after_open(&bridge, &transport);
        futures::executor::block_on(bridge.disconnect());

        let state = transport.state();
        assert_eq!(state.closes, 1);
        assert!(!state.open);
    }
}
