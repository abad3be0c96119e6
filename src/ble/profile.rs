//! UART-over-GATT connection profiles
//!
//! A profile names the service a device exposes and the two characteristics
//! used for the serial link:
//! - outbound: the host writes line chunks here
//! - inbound: the device notifies text here

use uuid::Uuid;

use crate::config::{ble, profiles};

/// Static description of one device protocol variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionProfile {
    /// Human readable profile name
    pub name: &'static str,
    /// Primary service UUID
    pub service: Uuid,
    /// Characteristic the host writes to
    pub outbound: Uuid,
    /// Characteristic the device notifies on
    pub inbound: Uuid,
    /// Largest payload of a single write
    pub max_chunk_size: usize,
}

/// BBC micro:bit UART service
pub const MICROBIT_UART: ConnectionProfile = ConnectionProfile {
    name: "microbit",
    service: Uuid::from_u128(profiles::microbit::SERVICE),
    outbound: Uuid::from_u128(profiles::microbit::RX),
    inbound: Uuid::from_u128(profiles::microbit::TX),
    max_chunk_size: ble::DEFAULT_CHUNK_SIZE,
};

/// Nordic UART Service
pub const NORDIC_UART: ConnectionProfile = ConnectionProfile {
    name: "nordic",
    service: Uuid::from_u128(profiles::nordic::SERVICE),
    outbound: Uuid::from_u128(profiles::nordic::RX),
    inbound: Uuid::from_u128(profiles::nordic::TX),
    max_chunk_size: ble::DEFAULT_CHUNK_SIZE,
};

impl ConnectionProfile {
    /// Build a custom profile. Returns `None` for a zero chunk size.
    pub fn new(
        name: &'static str,
        service: Uuid,
        outbound: Uuid,
        inbound: Uuid,
        max_chunk_size: usize,
    ) -> Option<Self> {
        if max_chunk_size == 0 {
            return None;
        }
        Some(Self {
            name,
            service,
            outbound,
            inbound,
            max_chunk_size,
        })
    }

    /// Look up a known profile by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "microbit" => Some(MICROBIT_UART),
            "nordic" => Some(NORDIC_UART),
            _ => None,
        }
    }
}

/// Which profile(s) a connect attempt may bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSelection {
    /// Bind exactly this profile
    Fixed(ConnectionProfile),
    /// Try each profile in order, bind the first whose service resolves
    Probe(Vec<ConnectionProfile>),
}

impl ProfileSelection {
    /// Profiles to try, in order
    pub fn candidates(&self) -> &[ConnectionProfile] {
        match self {
            ProfileSelection::Fixed(profile) => core::slice::from_ref(profile),
            ProfileSelection::Probe(profiles) => profiles,
        }
    }

    /// Service UUIDs used as the device selection hint
    pub fn services(&self) -> Vec<Uuid> {
        let mut services: Vec<Uuid> = Vec::new();
        for profile in self.candidates() {
            if !services.contains(&profile.service) {
                services.push(profile.service);
            }
        }
        services
    }
}

impl Default for ProfileSelection {
    fn default() -> Self {
        ProfileSelection::Probe(vec![MICROBIT_UART, NORDIC_UART])
    }
}
