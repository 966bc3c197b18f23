//! Room naming for the broadcast layer
//!
//! A room is an in-memory, non-durable group of connected viewer sessions
//! used purely to scope event delivery. Role rooms carry every viewer of a
//! role; station/table/order rooms scope down to one work area or one
//! party's order tracking.

use serde::{Deserialize, Serialize};

/// Delivery target for published events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Room {
    Chef,
    Staff,
    Manager,
    Customer,
    /// All viewers of one station's display
    Station(i64),
    /// The table a party is seated at
    Table(i64),
    /// A single order's tracking view (customer session)
    Order(String),
}

impl Room {
    /// Stable string key used by the broadcast registry
    pub fn as_key(&self) -> String {
        match self {
            Room::Chef => "chef_room".to_string(),
            Room::Staff => "staff_room".to_string(),
            Room::Manager => "manager_room".to_string(),
            Room::Customer => "customer_room".to_string(),
            Room::Station(id) => format!("station:{}", id),
            Room::Table(id) => format!("table:{}", id),
            Room::Order(id) => format!("order:{}", id),
        }
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_keys() {
        assert_eq!(Room::Chef.as_key(), "chef_room");
        assert_eq!(Room::Station(3).as_key(), "station:3");
        assert_eq!(Room::Table(12).as_key(), "table:12");
        assert_eq!(Room::Order("abc".into()).as_key(), "order:abc");
    }

    #[test]
    fn test_distinct_scopes_never_collide() {
        assert_ne!(Room::Station(1).as_key(), Room::Table(1).as_key());
    }
}
