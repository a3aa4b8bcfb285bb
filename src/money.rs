//! A fixed-point amount of money with cent precision.
//!
//! Amounts are held as a [Decimal] in memory and stored as an integer number
//! of cents in the database so that SQL can add and subtract them exactly.

use std::{
    fmt::Display,
    ops::{Add, Neg, Sub},
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};

/// The number of decimal places an amount may have.
pub const MONEY_SCALE: u32 = 2;

/// The largest absolute amount that can be stored, ten significant digits.
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Errors for amounts that cannot be represented as [Money].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MoneyError {
    /// The amount has more than two decimal places.
    #[error("{0} has more than two decimal places")]
    TooPrecise(Decimal),

    /// The amount is larger than [MAX_MONEY].
    #[error("{0} exceeds the largest supported amount of {MAX_MONEY}")]
    OutOfRange(Decimal),
}

/// An amount of money, e.g. an expense amount or a budget limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create a new amount, checking the precision and range.
    ///
    /// # Errors
    ///
    /// Returns a [MoneyError] if `amount` has more than two decimal places or
    /// its absolute value exceeds [MAX_MONEY].
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        let normalized = amount.normalize();

        if normalized.scale() > MONEY_SCALE {
            return Err(MoneyError::TooPrecise(amount));
        }

        if normalized.abs() > MAX_MONEY {
            return Err(MoneyError::OutOfRange(amount));
        }

        Ok(Self(normalized))
    }

    /// Create an amount from a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, MONEY_SCALE).normalize())
    }

    /// The amount as a whole number of cents.
    pub fn cents(&self) -> i64 {
        // Always in range: `new` rejects anything beyond ten digits and the
        // arithmetic impls only combine a handful of such values.
        (self.0 * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or_default()
    }

    /// The underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = self
            .0
            .to_f64()
            .ok_or_else(|| ser::Error::custom(format!("{} cannot be represented as f64", self.0)))?;

        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;

        Money::new(amount).map_err(de::Error::custom)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.cents()))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_i64().map(Money::from_cents)
    }
}
