//! Popularity tiers.
//!
//! A column's tier depends only on the cell in the table's final row. A column
//! whose final cell is undefined, or at or below the lowest threshold, lands in
//! no tier at all.

use serde::{Deserialize, Serialize};

use crate::series::AlignedTable;

/// Strict lower bounds, evaluated top-down; first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub top: f64,
    pub second: f64,
    pub third: f64,
    pub fourth: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            top: 100_000.0,
            second: 10_000.0,
            third: 1_000.0,
            fourth: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Top,
    Second,
    Third,
    Fourth,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Top, Tier::Second, Tier::Third, Tier::Fourth];

    pub fn label(self) -> &'static str {
        match self {
            Tier::Top => "top",
            Tier::Second => "second",
            Tier::Third => "third",
            Tier::Fourth => "fourth",
        }
    }

    /// Chart title, naming the range the tier covers.
    pub fn title(self, thresholds: &TierThresholds) -> String {
        let (low, high) = match self {
            Tier::Top => (thresholds.top, None),
            Tier::Second => (thresholds.second, Some(thresholds.top)),
            Tier::Third => (thresholds.third, Some(thresholds.second)),
            Tier::Fourth => (thresholds.fourth, Some(thresholds.third)),
        };
        match high {
            Some(high) => format!("Players {low:.0} - {high:.0}"),
            None => format!("Players > {low:.0}"),
        }
    }

    pub fn classify(value: f64, thresholds: &TierThresholds) -> Option<Tier> {
        if value > thresholds.top {
            Some(Tier::Top)
        } else if value > thresholds.second {
            Some(Tier::Second)
        } else if value > thresholds.third {
            Some(Tier::Third)
        } else if value > thresholds.fourth {
            Some(Tier::Fourth)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Four disjoint sub-tables, all sharing the input table's axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TierTables {
    pub top: AlignedTable,
    pub second: AlignedTable,
    pub third: AlignedTable,
    pub fourth: AlignedTable,
}

impl TierTables {
    pub fn get(&self, tier: Tier) -> &AlignedTable {
        match tier {
            Tier::Top => &self.top,
            Tier::Second => &self.second,
            Tier::Third => &self.third,
            Tier::Fourth => &self.fourth,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, &AlignedTable)> {
        Tier::ALL.into_iter().map(move |tier| (tier, self.get(tier)))
    }

    pub fn total_columns(&self) -> usize {
        self.iter().map(|(_, t)| t.column_count()).sum()
    }

    /// Tier holding the given column, if any.
    pub fn tier_of(&self, label: &str) -> Option<Tier> {
        self.iter()
            .find(|(_, table)| table.column(label).is_some())
            .map(|(tier, _)| tier)
    }
}

/// Partition columns by their final-row value.
pub fn classify(table: &AlignedTable, thresholds: &TierThresholds) -> TierTables {
    let mut tiers = TierTables {
        top: table.empty_like(),
        second: table.empty_like(),
        third: table.empty_like(),
        fourth: table.empty_like(),
    };

    for column in table.columns() {
        let Some(last) = column.values.last().copied().flatten() else {
            continue;
        };
        let Some(tier) = Tier::classify(last, thresholds) else {
            continue;
        };
        let target = match tier {
            Tier::Top => &mut tiers.top,
            Tier::Second => &mut tiers.second,
            Tier::Third => &mut tiers.third,
            Tier::Fourth => &mut tiers.fourth,
        };
        target.columns.push(column.clone());
    }

    tiers
}
