//! Message statistics for a `vjson` run
//!
//! Lock-free counters: totals per message kind, per decode and encode
//! error kind, and bytes in/out.

use crate::error::{DecodeError, EncodeError};
use crate::message::MessageKind;
use std::sync::atomic::{AtomicU64, Ordering};

const MESSAGE_KINDS: [MessageKind; 6] = [
    MessageKind::Simple,
    MessageKind::Raw,
    MessageKind::DiagnosticRequest,
    MessageKind::DiagnosticResponse,
    MessageKind::CommandResponse,
    MessageKind::Command,
];

const DECODE_ERROR_KINDS: [&str; 5] = [
    "malformed_json",
    "type_mismatch",
    "invalid_hex_payload",
    "unknown_command",
    "incomplete_message",
];

const ENCODE_ERROR_KINDS: [&str; 3] = ["buffer_too_small", "non_finite_number", "unrepresentable"];

/// Codec traffic counters
pub struct Stats {
    /// Decoded messages, indexed like `MESSAGE_KINDS`
    decoded: [AtomicU64; 6],
    /// Rejected payloads, indexed like `DECODE_ERROR_KINDS`
    rejected: [AtomicU64; 5],
    /// Messages that failed to encode, indexed like `ENCODE_ERROR_KINDS`
    encode_failures: [AtomicU64; 3],
    /// Payload bytes fed to the decoder
    rx_bytes: AtomicU64,
    /// Bytes produced by the encoder
    tx_bytes: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub decoded: Vec<(MessageKind, u64)>,
    pub rejected: Vec<(&'static str, u64)>,
    pub encode_failures: Vec<(&'static str, u64)>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

impl Snapshot {
    pub fn total_decoded(&self) -> u64 {
        self.decoded.iter().map(|(_, n)| n).sum()
    }

    pub fn total_rejected(&self) -> u64 {
        self.rejected.iter().map(|(_, n)| n).sum()
    }

    pub fn total_encode_failures(&self) -> u64 {
        self.encode_failures.iter().map(|(_, n)| n).sum()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            decoded: Default::default(),
            rejected: Default::default(),
            encode_failures: Default::default(),
            rx_bytes: AtomicU64::new(0),
            tx_bytes: AtomicU64::new(0),
        }
    }

    /// Count a successful decode of `size` payload bytes
    #[inline]
    pub fn record_decoded(&self, kind: MessageKind, size: usize) {
        if let Some(i) = MESSAGE_KINDS.iter().position(|k| *k == kind) {
            self.decoded[i].fetch_add(1, Ordering::Relaxed);
        }
        self.rx_bytes.fetch_add(size as u64, Ordering::Relaxed);
    }

    /// Count a rejected payload of `size` bytes
    #[inline]
    pub fn record_rejected(&self, error: &DecodeError, size: usize) {
        if let Some(i) = DECODE_ERROR_KINDS.iter().position(|k| *k == error.kind_str()) {
            self.rejected[i].fetch_add(1, Ordering::Relaxed);
        }
        self.rx_bytes.fetch_add(size as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_encoded(&self, size: usize) {
        self.tx_bytes.fetch_add(size as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_encode_failure(&self, error: &EncodeError) {
        if let Some(i) = ENCODE_ERROR_KINDS.iter().position(|k| *k == error.kind_str()) {
            self.encode_failures[i].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Copy the counters, skipping kinds that never occurred
    pub fn snapshot(&self) -> Snapshot {
        let decoded = MESSAGE_KINDS
            .iter()
            .zip(&self.decoded)
            .map(|(kind, n)| (*kind, n.load(Ordering::Relaxed)))
            .filter(|(_, n)| *n > 0)
            .collect();
        let rejected = DECODE_ERROR_KINDS
            .iter()
            .zip(&self.rejected)
            .map(|(kind, n)| (*kind, n.load(Ordering::Relaxed)))
            .filter(|(_, n)| *n > 0)
            .collect();
        let encode_failures = ENCODE_ERROR_KINDS
            .iter()
            .zip(&self.encode_failures)
            .map(|(kind, n)| (*kind, n.load(Ordering::Relaxed)))
            .filter(|(_, n)| *n > 0)
            .collect();

        Snapshot {
            decoded,
            rejected,
            encode_failures,
            rx_bytes: self.rx_bytes.load(Ordering::Relaxed),
            tx_bytes: self.tx_bytes.load(Ordering::Relaxed),
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let stats = Stats::new();
        assert_eq!(stats.snapshot(), Snapshot::default());
    }

    #[test]
    fn test_record_decoded_and_rejected() {
        let stats = Stats::new();
        stats.record_decoded(MessageKind::Raw, 40);
        stats.record_decoded(MessageKind::Raw, 40);
        stats.record_decoded(MessageKind::Simple, 30);
        stats.record_rejected(&DecodeError::MalformedJson, 10);

        let snapshot = stats.snapshot();
        assert_eq!(
            snapshot.decoded,
            vec![(MessageKind::Simple, 1), (MessageKind::Raw, 2)]
        );
        assert_eq!(snapshot.rejected, vec![("malformed_json", 1)]);
        assert_eq!(snapshot.total_decoded(), 3);
        assert_eq!(snapshot.total_rejected(), 1);
        assert_eq!(snapshot.rx_bytes, 120);
    }

    #[test]
    fn test_every_decode_error_kind_is_counted() {
        let errors = [
            DecodeError::MalformedJson,
            DecodeError::TypeMismatch { field: "bus" },
            DecodeError::InvalidHexPayload { field: "data" },
            DecodeError::UnknownCommand("x".into()),
            DecodeError::IncompleteMessage,
        ];
        let stats = Stats::new();
        for error in &errors {
            stats.record_rejected(error, 1);
        }
        assert_eq!(stats.snapshot().total_rejected(), errors.len() as u64);
    }

    #[test]
    fn test_encode_counters() {
        let stats = Stats::new();
        stats.record_encoded(64);
        stats.record_encode_failure(&EncodeError::BufferTooSmall { capacity: 8 });
        stats.record_encode_failure(&EncodeError::BufferTooSmall { capacity: 16 });
        stats.record_encode_failure(&EncodeError::NonFiniteNumber { field: "value" });

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.tx_bytes, 64);
        assert_eq!(
            snapshot.encode_failures,
            vec![("buffer_too_small", 2), ("non_finite_number", 1)]
        );
        assert_eq!(snapshot.total_encode_failures(), 3);
    }
}
