//! Permission bitmask granted by the store for a resource path

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Capabilities granted on a store resource.
    ///
    /// Values outside the five known bits are kept as-is (see
    /// [`Permission::from_bits_retain`]) so that a value read from the store can
    /// be sent back unchanged, but they are never rendered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permission: u32 {
        const INFO   = 0b0_0001;
        const READ   = 0b0_0010;
        const WRITE  = 0b0_0100;
        const DELETE = 0b0_1000;
        const ADMIN  = 0b1_0000;
        const ALL    = 0b1_1111;
    }
}

/// Rendering order is fixed and independent of bit position lookups.
const LABELS: [(Permission, &str); 5] = [
    (Permission::INFO, "Info"),
    (Permission::READ, "Read"),
    (Permission::WRITE, "Write"),
    (Permission::DELETE, "Delete"),
    (Permission::ADMIN, "Admin"),
];

impl Permission {
    /// Human readable labels for the granted bits.
    ///
    /// A value that is exactly [`Permission::ALL`] collapses to the single label `All`.
    pub fn labels(&self) -> Vec<&'static str> {
        if self.bits() == Self::ALL.bits() {
            return vec!["All"];
        }

        LABELS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, label)| *label)
            .collect()
    }

    /// Labels joined with `/`, e.g. `Info/Read`; empty for no permissions
    pub fn render(&self) -> String {
        self.labels().join("/")
    }
}

impl Default for Permission {
    fn default() -> Self {
        Permission::empty()
    }
}

impl From<u32> for Permission {
    fn from(bits: u32) -> Self {
        Permission::from_bits_retain(bits)
    }
}

impl Permission {
    /// Decode an integer as sent by the store; only the low 32 bits are kept.
    pub fn from_wire(value: i64) -> Self {
        Permission::from_bits_retain(value as u32)
    }

    /// The bits as the signed integer the store expects
    pub fn wire_value(&self) -> i32 {
        self.bits() as i32
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// The store speaks signed 32-bit integers, so (de)serialize the raw bits.
impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.wire_value())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Permission::from_wire)
    }
}
