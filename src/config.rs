//! Link configuration constants for the micro:bit UART bridge

/// Known UART-over-GATT device profiles
pub mod profiles {
    /// BBC micro:bit UART service (not Nordic NUS)
    pub mod microbit {
        pub const SERVICE: u128 = 0xe95d93af_251d_470a_a062_fa1922dfa9a8;
        /// Notify FROM the micro:bit
        pub const TX: u128 = 0xe95d93b0_251d_470a_a062_fa1922dfa9a8;
        /// Write TO the micro:bit
        pub const RX: u128 = 0xe95d93b1_251d_470a_a062_fa1922dfa9a8;
    }

    /// Nordic UART Service
    pub mod nordic {
        pub const SERVICE: u128 = 0x6e400001_b5a3_f393_e0a9_e50e24dcca9e;
        /// Write TO the device
        pub const RX: u128 = 0x6e400002_b5a3_f393_e0a9_e50e24dcca9e;
        /// Notify FROM the device
        pub const TX: u128 = 0x6e400003_b5a3_f393_e0a9_e50e24dcca9e;
    }
}

/// BLE link configuration
pub mod ble {
    /// Default ATT write payload (23 byte MTU minus 3 byte header)
    pub const DEFAULT_CHUNK_SIZE: usize = 20;

    /// Local name prefix advertised by micro:bit firmware
    pub const DEFAULT_NAME_PREFIX: &str = "BBC micro:bit";

    /// How long to scan before giving up on device selection
    pub const SCAN_TIMEOUT_MS: u64 = 10_000;

    /// Interval between peripheral list polls while scanning
    pub const SCAN_POLL_MS: u64 = 100;
}

/// Inbound data configuration
pub mod inbound {
    /// Line terminator used in both directions
    pub const LINE_TERMINATOR: u8 = b'\n';

    /// Longest line the reassembly buffer will hold
    pub const MAX_LINE_LEN: usize = 512;
}

/// Diagnostic output
pub mod logging {
    /// Prefix for every diagnostic line
    pub const PREFIX: &str = "[microbit-ble]";
}
