//! The fixed set of spending categories shared by budgets and expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

/// A spending category.
///
/// Every user gets one budget per category when they register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Groceries, restaurants and takeaways.
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    /// Fuel, fares and vehicle costs.
    #[serde(rename = "Transportation")]
    Transportation,
    /// Rent, mortgage and repairs.
    #[serde(rename = "Housing")]
    Housing,
    /// Power, water, internet and phone bills.
    #[serde(rename = "Utilities")]
    Utilities,
    /// Movies, games and subscriptions.
    #[serde(rename = "Entertainment")]
    Entertainment,
    /// Clothing and household goods.
    #[serde(rename = "Shopping")]
    Shopping,
    /// Doctor visits and prescriptions.
    #[serde(rename = "Healthcare")]
    Healthcare,
    /// Haircuts and toiletries.
    #[serde(rename = "Personal Care")]
    PersonalCare,
    /// Courses and books.
    #[serde(rename = "Education")]
    Education,
    /// Flights and accommodation.
    #[serde(rename = "Travel")]
    Travel,
    /// Presents and charity.
    #[serde(rename = "Gifts & Donations")]
    GiftsAndDonations,
    /// Anything else. Older clients call this `Miscellaneous`.
    #[serde(rename = "Other", alias = "Miscellaneous", alias = "Miscellenous")]
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 12] = [
        Category::FoodAndDining,
        Category::Transportation,
        Category::Housing,
        Category::Utilities,
        Category::Entertainment,
        Category::Shopping,
        Category::Healthcare,
        Category::PersonalCare,
        Category::Education,
        Category::Travel,
        Category::GiftsAndDonations,
        Category::Other,
    ];

    /// The human readable name, which is also the stored and serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Housing => "Housing",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Healthcare => "Healthcare",
            Category::PersonalCare => "Personal Care",
            Category::Education => "Education",
            Category::Travel => "Travel",
            Category::GiftsAndDonations => "Gifts & Donations",
            Category::Other => "Other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string did not name a known category.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("\"{0}\" is not a valid category")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Miscellaneous" | "Miscellenous" => Ok(Category::Other),
            _ => Category::ALL
                .into_iter()
                .find(|category| category.as_str() == s)
                .ok_or_else(|| ParseCategoryError(s.to_owned())),
        }
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
