//! BMI percentile reference data and classification.

pub mod table;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::intake::Sex;

pub use table::{JsonFileTableProvider, StaticTableProvider, TableProvider};

/// BMI thresholds for one sex/age cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub p5: f64,
    pub p85: f64,
    pub p95: f64,
}

impl Thresholds {
    fn is_ascending(&self) -> bool {
        [self.p5, self.p85, self.p95].iter().all(|v| v.is_finite())
            && self.p5 < self.p85
            && self.p85 < self.p95
    }
}

/// Percentile reference table: sex key → age (as string) → thresholds.
///
/// The JSON form is `{"niño": {"1": {"p5": .., "p85": .., "p95": ..}, ..}, "niña": {..}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PercentileTable {
    series: HashMap<String, HashMap<String, Thresholds>>,
}

impl PercentileTable {
    /// Insert or replace the thresholds for one sex/age cell.
    pub fn insert(&mut self, sex: Sex, age: u8, thresholds: Thresholds) {
        self.series
            .entry(sex.table_key().to_string())
            .or_default()
            .insert(age.to_string(), thresholds);
    }

    /// Thresholds for a sex/age pair, if the table covers it.
    pub fn lookup(&self, sex: Sex, age: u8) -> Option<&Thresholds> {
        self.series.get(sex.table_key())?.get(&age.to_string())
    }

    /// All numeric ages covered for `sex`, ascending, with their thresholds.
    ///
    /// Non-numeric age keys are skipped.
    pub fn series(&self, sex: Sex) -> Option<Vec<(u8, Thresholds)>> {
        let by_age = self.series.get(sex.table_key())?;
        let mut rows: Vec<(u8, Thresholds)> = by_age
            .iter()
            .filter_map(|(age, t)| age.parse::<u8>().ok().map(|a| (a, *t)))
            .collect();
        rows.sort_by_key(|(age, _)| *age);
        Some(rows)
    }

    /// Check that every cell has finite, strictly ascending thresholds.
    pub fn validate(&self) -> Result<(), String> {
        for (sex, by_age) in &self.series {
            for (age, t) in by_age {
                if !t.is_ascending() {
                    return Err(format!(
                        "thresholds for {sex}/{age} must satisfy p5 < p85 < p95 (got {}, {}, {})",
                        t.p5, t.p85, t.p95
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(|by_age| by_age.is_empty())
    }
}

/// BMI classification band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Underweight,
    NormalWeight,
    OverweightRisk,
    Obesity,
}

impl Category {
    /// User-facing band label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "bajo peso (percentil < 5)",
            Self::NormalWeight => "peso normal (percentil 5-85)",
            Self::OverweightRisk => "riesgo de sobrepeso (percentil 85-95)",
            Self::Obesity => "obesidad (percentil > 95)",
        }
    }

    /// One-line caption shown next to the child's point on the chart.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Underweight => "Recomendación: Bajo peso, evalúe con pediatra.",
            Self::NormalWeight => "Recomendación: Peso saludable, siga con buenos hábitos.",
            Self::OverweightRisk => {
                "Recomendación: Riesgo de sobrepeso, controle dieta y actividad."
            }
            Self::Obesity => "Recomendación: Obesidad, consultar especialista.",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Body-Mass-Index: kilograms over meters squared.
pub fn bmi(weight_kg: f64, height_m: f64) -> f64 {
    weight_kg / height_m.powi(2)
}

/// Place `bmi` in a band. Each lower bound is inclusive.
pub fn classify(bmi: f64, thresholds: &Thresholds) -> Category {
    if bmi < thresholds.p5 {
        Category::Underweight
    } else if bmi < thresholds.p85 {
        Category::NormalWeight
    } else if bmi < thresholds.p95 {
        Category::OverweightRisk
    } else {
        Category::Obesity
    }
}

/// Classify against a full table. `None` when the table lacks the sex/age pair.
pub fn classify_in(bmi: f64, age: u8, sex: Sex, table: &PercentileTable) -> Option<Category> {
    table.lookup(sex, age).map(|t| classify(bmi, t))
}
