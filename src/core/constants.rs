//! Protocol constants shared with the CPUMonitorJr display firmware.
//!
//! Values in the FRAME and DISCOVERY sections are fixed by the device side and
//! MUST NOT be changed.

use std::time::Duration;

// =============================================================================
// FRAME TYPES
// =============================================================================

/// Time frame (date, weekday and wall clock).
pub const FRAME_TYPE_TIME: u8 = 0x00;

/// Identity frame (host name, LAN address, external address).
pub const FRAME_TYPE_IDENTITY: u8 = 0x01;

/// Stats frame (memory, temperatures, per-core utilisation).
pub const FRAME_TYPE_STATS: u8 = 0x02;

// =============================================================================
// FRAME SIZES
// =============================================================================

/// Time frame size (type + year + month + day + weekday + h + m + s).
pub const TIME_FRAME_SIZE: usize = 8;

/// Stats frame header size (type + 3 packed decimals + core count).
pub const STATS_HEADER_SIZE: usize = 8;

/// Maximum number of cores a stats frame can carry.
pub const MAX_CORES: usize = u8::MAX as usize;

/// Year encoded as zero in the time frame.
pub const YEAR_BASE: i32 = 2000;

/// Separator between identity fields.
pub const IDENTITY_SEPARATOR: char = ';';

// =============================================================================
// DISCOVERY
// =============================================================================

/// Default UDP port shared with the device (`UDP_PORT` on the firmware side).
pub const DEFAULT_UDP_PORT: u16 = 44447;

/// Tag that opens every device announcement: `CPUMonitorJr;<ip>;<port>`.
pub const DEVICE_TAG: &str = "CPUMonitorJr";

/// Tag that opens host announcements: `CPUMonitorJr-PC;<ip>`.
pub const HOST_TAG: &str = "CPUMonitorJr-PC";

/// Interval between active discovery broadcasts.
pub const BROADCAST_INTERVAL: Duration = Duration::from_secs(5);

// =============================================================================
// CONNECTION
// =============================================================================

/// Path prefix of the device endpoint; the UDP port is appended to it.
pub const ENDPOINT_PATH_PREFIX: &str = "cpumonitorjr";

/// Upper bound on opening the persistent connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on closing the persistent connection.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

// =============================================================================
// SCHEDULING
// =============================================================================

/// Default interval between scheduler ticks.
pub const DEFAULT_SEND_INTERVAL: Duration = Duration::from_secs(1);

/// Smallest tick interval accepted; lower values are raised to this.
pub const MIN_SEND_INTERVAL: Duration = Duration::from_millis(200);

/// The time frame is re-sent at least this often on a live connection.
pub const TIME_RESYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

// =============================================================================
// HOST IDENTITY
// =============================================================================

/// Host name used when the OS does not report one.
pub const UNKNOWN_HOSTNAME: &str = "unknown";

/// LAN address used when no usable interface is found.
pub const UNKNOWN_LAN_ADDRESS: &str = "0.0.0.0";

/// External address placeholder when the lookup fails.
pub const EXTERNAL_ADDRESS_UNAVAILABLE: &str = "External address not available";

/// Plain-text service that echoes the caller's public address.
pub const EXTERNAL_ADDRESS_URL: &str = "https://api.ipify.org";

/// Upper bound on the external address lookup.
pub const EXTERNAL_ADDRESS_TIMEOUT: Duration = Duration::from_millis(2500);
