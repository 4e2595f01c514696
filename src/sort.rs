use crate::types::Asset;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Rank,
    Price,
    Change24h,
    MarketCap,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Column-header click: the active field flips direction, any other
    /// field becomes active in ascending order.
    pub fn clicked(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Rank,
        SortField::Price,
        SortField::Change24h,
        SortField::MarketCap,
        SortField::Volume,
    ];

    pub fn code(self) -> &'static str {
        match self {
            SortField::Rank => "rank",
            SortField::Price => "price",
            SortField::Change24h => "change_24h",
            SortField::MarketCap => "market_cap",
            SortField::Volume => "volume",
        }
    }

    fn compare(self, a: &Asset, b: &Asset) -> Ordering {
        match self {
            SortField::Rank => absent_last(a.market_cap_rank, b.market_cap_rank, |x, y| x.cmp(&y)),
            SortField::Price => a.current_price.total_cmp(&b.current_price),
            SortField::Change24h => absent_last(
                a.price_change_percentage_24h,
                b.price_change_percentage_24h,
                |x, y| x.total_cmp(&y),
            ),
            SortField::MarketCap => absent_last(a.market_cap, b.market_cap, |x, y| x.total_cmp(&y)),
            SortField::Volume => a.total_volume.total_cmp(&b.total_volume),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase().replace('-', "_");
        SortField::ALL
            .into_iter()
            .find(|f| f.code() == s)
            .ok_or_else(|| {
                format!(
                    "unknown sort field '{}' (expected rank, price, change_24h, market_cap or volume)",
                    s
                )
            })
    }
}

/// An absent value is greater than every present one.
fn absent_last<T: Copy>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable ordering of a listing snapshot. Equal keys keep their input order,
/// so sorting an already sorted slice returns it unchanged.
pub fn sort_assets(assets: &[Asset], spec: SortSpec) -> Vec<Asset> {
    let mut sorted = assets.to_vec();
    match spec.direction {
        SortDirection::Asc => sorted.sort_by(|a, b| spec.field.compare(a, b)),
        SortDirection::Desc => sorted.sort_by(|a, b| spec.field.compare(b, a)),
    }
    sorted
}
