//! Network condition simulation for testing

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Network condition simulator
///
/// Applies loss, duplication and reordering to a batch of datagrams. Seeded,
/// so a given profile and seed always produce the same impairments.
#[derive(Clone, Debug)]
pub struct NetworkSimulator {
    /// Packet loss probability (0.0 to 1.0)
    pub loss_rate: f64,
    /// Probability that a packet is delivered twice
    pub duplicate_rate: f64,
    /// Probability of swapping a packet with its successor
    pub reorder_rate: f64,
    rng: StdRng,
}

impl NetworkSimulator {
    /// Simulator with the given rates
    #[must_use]
    pub fn new(loss_rate: f64, duplicate_rate: f64, reorder_rate: f64, seed: u64) -> Self {
        Self {
            loss_rate: loss_rate.clamp(0.0, 1.0),
            duplicate_rate: duplicate_rate.clamp(0.0, 1.0),
            reorder_rate: reorder_rate.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Perfect network (no issues)
    #[must_use]
    pub fn perfect() -> Self {
        Self::new(0.0, 0.0, 0.0, 0)
    }

    /// Good `WiFi` conditions
    #[must_use]
    pub fn good_wifi(seed: u64) -> Self {
        Self::new(0.001, 0.001, 0.001, seed)
    }

    /// Poor `WiFi` conditions
    #[must_use]
    pub fn poor_wifi(seed: u64) -> Self {
        Self::new(0.05, 0.02, 0.05, seed)
    }

    /// Very poor conditions (stress test)
    #[must_use]
    pub fn stress_test(seed: u64) -> Self {
        Self::new(0.10, 0.05, 0.10, seed)
    }

    /// Should this packet be dropped?
    pub fn should_drop(&mut self) -> bool {
        self.loss_rate > 0.0 && self.rng.gen_bool(self.loss_rate)
    }

    /// Should this packet be delivered twice?
    pub fn should_duplicate(&mut self) -> bool {
        self.duplicate_rate > 0.0 && self.rng.gen_bool(self.duplicate_rate)
    }

    /// Should this packet be reordered?
    pub fn should_reorder(&mut self) -> bool {
        self.reorder_rate > 0.0 && self.rng.gen_bool(self.reorder_rate)
    }

    /// Pass a batch through the simulated network
    pub fn transmit<T: Clone>(&mut self, packets: Vec<T>) -> Vec<T> {
        let mut delivered = Vec::with_capacity(packets.len());
        for packet in packets {
            if self.should_drop() {
                continue;
            }
            if self.should_duplicate() {
                delivered.push(packet.clone());
            }
            delivered.push(packet);
        }

        let mut i = 0;
        while i + 1 < delivered.len() {
            if self.should_reorder() {
                delivered.swap(i, i + 1);
                i += 2;
            } else {
                i += 1;
            }
        }

        delivered
    }
}
