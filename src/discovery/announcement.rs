//! Discovery announcement payloads.
//!
//! The display broadcasts `CPUMonitorJr;<ip>;<port>` as plain ASCII. The host
//! may optionally broadcast `CPUMonitorJr-PC;<lan-ip>` to prompt it.

use crate::core::{DEVICE_TAG, HOST_TAG};

/// Decode a datagram as ASCII, dropping any non-ASCII bytes, and trim it.
fn decode_ascii(data: &[u8]) -> String {
    let text: String = data
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| char::from(b))
        .collect();
    text.trim().to_string()
}

/// Extract the candidate display address from a discovery datagram.
///
/// Returns `None` for anything that is not an announcement with a non-empty
/// address field. The port field is not checked.
pub fn parse_announcement(data: &[u8]) -> Option<String> {
    let text = decode_ascii(data);
    if !text.starts_with(DEVICE_TAG) {
        return None;
    }

    let address = text.split(';').nth(1)?.trim();
    if address.is_empty() {
        return None;
    }
    Some(address.to_string())
}

/// Whether a datagram is a host announcement (ours or another host's).
pub fn is_host_announcement(data: &[u8]) -> bool {
    decode_ascii(data).starts_with(HOST_TAG)
}

/// Build the host announcement payload for the given LAN address.
pub fn build_pc_announcement(lan_address: &str) -> Vec<u8> {
    let mut payload = format!("{HOST_TAG};{lan_address}");
    payload.retain(|c| c.is_ascii());
    payload.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_announcement() {
        assert_eq!(
            parse_announcement(b"CPUMonitorJr;192.168.1.50;44447").as_deref(),
            Some("192.168.1.50")
        );
        // Surrounding whitespace and a padded field.
        assert_eq!(
            parse_announcement(b"  CPUMonitorJr; 10.0.0.7 ;44447\r\n").as_deref(),
            Some("10.0.0.7")
        );
        // Port field is optional.
        assert_eq!(
            parse_announcement(b"CPUMonitorJr;10.0.0.7").as_deref(),
            Some("10.0.0.7")
        );
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert_eq!(parse_announcement(b""), None);
        assert_eq!(parse_announcement(b"CPUMonitorJr"), None);
        assert_eq!(parse_announcement(b"CPUMonitorJr;;44447"), None);
        assert_eq!(parse_announcement(b"CPUMonitorJr;   ;1"), None);
        assert_eq!(parse_announcement(b"SomethingElse;10.0.0.7;1"), None);
        assert_eq!(parse_announcement(b"xCPUMonitorJr;10.0.0.7;1"), None);
    }

    #[test]
    fn test_parse_drops_non_ascii_bytes() {
        let mut data = b"CPUMonitorJr;192.168".to_vec();
        data.push(0xFF);
        data.extend_from_slice(b".1.50;44447");
        assert_eq!(parse_announcement(&data).as_deref(), Some("192.168.1.50"));
    }

    #[test]
    fn test_host_announcement_matches_prefix() {
        // A host announcement still carries the device tag as a prefix.
        let payload = build_pc_announcement("192.168.1.10");
        assert_eq!(payload, b"CPUMonitorJr-PC;192.168.1.10");
        assert!(is_host_announcement(&payload));
        assert_eq!(parse_announcement(&payload).as_deref(), Some("192.168.1.10"));

        assert!(!is_host_announcement(b"CPUMonitorJr;192.168.1.50;44447"));
    }
}
