//! Statistics reported by processors and broadcast to subscribers

use crate::registry::ProcessorKey;

/// Counters for one packet type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketCounter {
    /// Qualified packet name
    pub packet_name: String,
    /// Packets received since the processor started
    pub received_packets: u64,
    /// Wall-clock time of the last reception (milliseconds)
    pub last_received: i64,
    /// Generation time of the last packet (milliseconds)
    pub last_packet_time: i64,
}

impl PacketCounter {
    pub fn new(packet_name: impl Into<String>) -> Self {
        Self {
            packet_name: packet_name.into(),
            ..Default::default()
        }
    }
}

/// Raw counters as kept by a running processor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStatistics {
    /// When any counter last changed (milliseconds)
    pub last_updated: i64,
    /// Per-packet counters
    pub packets: Vec<PacketCounter>,
}

impl ProcessingStatistics {
    /// Total packets across all counters
    pub fn total_packets(&self) -> u64 {
        self.packets.iter().map(|p| p.received_packets).sum()
    }
}

/// Statistics broadcast to subscribers for one processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub instance: String,
    pub processor_name: String,
    /// Timestamp of the underlying counters
    pub last_updated: i64,
    pub counters: Vec<PacketCounter>,
}

impl StatisticsSnapshot {
    /// Build a snapshot from a processor's raw counters
    pub fn capture(key: &ProcessorKey, stats: ProcessingStatistics) -> Self {
        Self {
            instance: key.instance.clone(),
            processor_name: key.name.clone(),
            last_updated: stats.last_updated,
            counters: stats.packets,
        }
    }

    /// Key of the processor this snapshot belongs to
    pub fn key(&self) -> ProcessorKey {
        ProcessorKey::new(&self.instance, &self.processor_name)
    }
}
