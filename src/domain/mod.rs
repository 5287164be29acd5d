//! Domain types for the storefront with strong typing.
//!
//! Newtype identifiers keep user, product and order ids from being mixed up,
//! [`Price`] owns the integer scaling convention for money, and [`Principal`]
//! is the explicit caller identity handed to every operation that needs one.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Returns the underlying i32 value.
            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                i32::deserialize(deserializer).map(Self::new)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a registered user.
    ///
    /// ```rust
    /// use solestore::domain::UserId;
    ///
    /// let id = UserId::new(7);
    /// assert_eq!(id.value(), 7);
    /// assert_eq!(id.to_string(), "7");
    /// ```
    UserId
);

entity_id!(
    /// Unique identifier for a catalog product.
    ProductId
);

entity_id!(
    /// Unique identifier for a placed order.
    OrderId
);

/// Number of stored currency units per unit typed into the admin forms.
///
/// Prices are entered in thousands of VNĐ and stored as whole VNĐ.
pub const PRICE_SCALE: i64 = 1000;

/// An amount of money in stored (integer-scaled) units.
///
/// All arithmetic on money happens on the stored integer. Conversion to and
/// from the human-facing input unit, and the display format, live here and
/// nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Self = Self(0);

    /// Wraps an already-scaled stored amount.
    #[must_use]
    pub const fn from_stored(stored: i64) -> Self {
        Self(stored)
    }

    /// Converts a form/input amount (thousands) into stored units.
    ///
    /// Returns `None` for negative, non-finite, or out-of-range input.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_input(input: f64) -> Option<Self> {
        if !input.is_finite() || input < 0.0 {
            return None;
        }
        let scaled = (input * PRICE_SCALE as f64).round();
        if scaled > i64::MAX as f64 {
            return None;
        }
        Some(Self(scaled as i64))
    }

    #[must_use]
    pub const fn stored(&self) -> i64 {
        self.0
    }

    /// The amount expressed in input units, for pre-filling edit forms.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_input(&self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    /// Line total for `quantity` units at this price.
    #[must_use]
    pub const fn times(&self, quantity: i32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Display string such as `2,500VNĐ` (input units, grouped, no decimals).
    ///
    /// Halves round to the even unit, so 2.5 shows as `2VNĐ` and 3.5 as `4VNĐ`.
    #[must_use]
    pub fn formatted(&self) -> String {
        let units = self.0.abs() / PRICE_SCALE;
        let twice_rem = (self.0.abs() % PRICE_SCALE) * 2;
        let round_up = twice_rem > PRICE_SCALE || (twice_rem == PRICE_SCALE && units % 2 == 1);
        let rounded = if round_up { units + 1 } else { units };
        let sign = if self.0 < 0 && rounded > 0 { "-" } else { "" };
        format!("{sign}{}VNĐ", group_thousands(rounded))
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// The authenticated caller of an operation.
///
/// Issued by the access gate on login/registration and rebuilt from the user
/// row on every request, so a revoked privilege takes effect immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub is_admin: bool,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }
}
