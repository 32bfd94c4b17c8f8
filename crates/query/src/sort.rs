//! Sort specifications.

use serde::{Deserialize, Serialize};

/// Ordering for one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Property to order by.
    pub property: String,
    /// Ascending (`ASC`) or descending (`DESC`).
    pub ascending: bool,
    /// Case-insensitive comparison request. The statement dialect cannot
    /// render this; the builder rejects it at render time.
    pub ignore_case: bool,
}

impl Order {
    /// Ascending order on `property`.
    pub fn asc(property: impl Into<String>) -> Self {
        Order {
            property: property.into(),
            ascending: true,
            ignore_case: false,
        }
    }

    /// Descending order on `property`.
    pub fn desc(property: impl Into<String>) -> Self {
        Order {
            property: property.into(),
            ascending: false,
            ignore_case: false,
        }
    }

    /// Request case-insensitive comparison.
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

/// An ordered list of [`Order`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    /// The unsorted spec.
    pub fn unsorted() -> Self {
        Sort::default()
    }

    /// A spec from the given orders.
    pub fn by(orders: impl IntoIterator<Item = Order>) -> Self {
        Sort {
            orders: orders.into_iter().collect(),
        }
    }

    /// Concatenate two specs, keeping order.
    pub fn and(mut self, other: Sort) -> Self {
        self.orders.extend(other.orders);
        self
    }

    /// True if no ordering is requested.
    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    /// The entries.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}
