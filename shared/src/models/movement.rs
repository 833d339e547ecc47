//! Stock movement ledger models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods received; increases stock
    Purchase,
    /// Goods sold; decreases stock
    Sale,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Purchase => "purchase",
            MovementKind::Sale => "sale",
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementKind::Purchase => write!(f, "Purchase"),
            MovementKind::Sale => write!(f, "Sale"),
        }
    }
}

impl std::str::FromStr for MovementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(MovementKind::Purchase),
            "sale" => Ok(MovementKind::Sale),
            other => Err(format!("unknown movement kind: {}", other)),
        }
    }
}

/// An append-only ledger entry against a single product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: MovementKind,
    pub quantity: i32,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
    /// When the entry was written to the ledger
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Signed effect of this movement on the product's stock
    pub fn stock_delta(&self) -> i64 {
        match self.kind {
            MovementKind::Purchase => i64::from(self.quantity),
            MovementKind::Sale => -i64::from(self.quantity),
        }
    }
}

/// A proposed movement, as submitted by a caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct NewMovement {
    pub product_id: Uuid,
    pub kind: MovementKind,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,

    /// Defaults to the time the movement is recorded
    pub occurred_at: Option<DateTime<Utc>>,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

impl NewMovement {
    /// Turn the proposal into a ledger entry recorded at `now`
    pub fn into_movement(self, id: Uuid, now: DateTime<Utc>) -> StockMovement {
        StockMovement {
            id,
            product_id: self.product_id,
            kind: self.kind,
            quantity: self.quantity,
            occurred_at: self.occurred_at.unwrap_or(now),
            notes: self.notes,
            created_at: now,
        }
    }
}

/// Newest first: by occurrence time, then by recording time
pub fn sort_newest_first(movements: &mut [StockMovement]) {
    movements.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_movement_kind_round_trips_through_str() {
        for kind in [MovementKind::Purchase, MovementKind::Sale] {
            assert_eq!(kind.as_str().parse::<MovementKind>().unwrap(), kind);
        }
        assert!("transfer".parse::<MovementKind>().is_err());
    }

    #[test]
    fn test_movement_kind_serializes_snake_case() {
        let json = serde_json::to_string(&MovementKind::Sale).unwrap();
        assert_eq!(json, "\"sale\"");
    }

    #[test]
    fn test_occurred_at_defaults_to_recording_time() {
        let now = Utc::now();
        let input = NewMovement {
            product_id: Uuid::new_v4(),
            kind: MovementKind::Purchase,
            quantity: 4,
            occurred_at: None,
            notes: None,
        };

        let movement = input.into_movement(Uuid::new_v4(), now);
        assert_eq!(movement.occurred_at, now);
        assert_eq!(movement.created_at, now);
    }

    #[test]
    fn test_explicit_occurred_at_is_kept() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        let input = NewMovement {
            product_id: Uuid::new_v4(),
            kind: MovementKind::Sale,
            quantity: 1,
            occurred_at: Some(yesterday),
            notes: Some("counter sale".to_string()),
        };

        let movement = input.into_movement(Uuid::new_v4(), now);
        assert_eq!(movement.occurred_at, yesterday);
        assert_eq!(movement.stock_delta(), -1);
    }

    #[test]
    fn test_sort_newest_first() {
        let now = Utc::now();
        let product_id = Uuid::new_v4();
        let make = |offset: i64| StockMovement {
            id: Uuid::new_v4(),
            product_id,
            kind: MovementKind::Purchase,
            quantity: 1,
            occurred_at: now + Duration::minutes(offset),
            notes: None,
            created_at: now,
        };
        let mut movements = vec![make(0), make(10), make(-5)];

        sort_newest_first(&mut movements);
        let offsets: Vec<_> = movements.iter().map(|m| m.occurred_at - now).collect();
        assert_eq!(
            offsets,
            vec![Duration::minutes(10), Duration::zero(), Duration::minutes(-5)]
        );
    }
}
