//! Visualization collaborator — percentile charts referenced by opaque id.
//!
//! The intake hands over the child's point plus the reference table; the
//! renderer returns an id the transport can later resolve. Pixel rendering is
//! left to clients: what is stored here is a chart description (curves, point,
//! caption) they can draw.

pub mod store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ChartError;
use crate::intake::Sex;
use crate::percentile::{Category, PercentileTable};

pub use store::InMemoryChartStore;

/// Everything a renderer needs for one chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartRequest<'a> {
    pub bmi: f64,
    pub age: u8,
    pub sex: Sex,
    pub table: &'a PercentileTable,
}

/// Produces a chart for a completed intake and returns its reference.
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(&self, request: ChartRequest<'_>) -> Result<String, ChartError>;
}

/// One point of a percentile curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub age: u8,
    pub bmi: f64,
}

/// A labelled percentile curve across ages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub label: String,
    pub points: Vec<CurvePoint>,
}

/// A chart description: the three reference curves and the child's point.
#[derive(Debug, Clone, Serialize)]
pub struct PercentileChart {
    pub id: String,
    pub title: String,
    pub sex: Sex,
    pub curves: Vec<Curve>,
    pub point: CurvePoint,
    pub category: Category,
    pub recommendation: String,
    pub created_at: DateTime<Utc>,
}

impl PercentileChart {
    /// Build the chart description for a request.
    ///
    /// Fails when the table has no series for the requested sex or does not
    /// cover the requested age.
    pub fn build(id: String, request: &ChartRequest<'_>) -> Result<Self, ChartError> {
        let missing = || ChartError::MissingSeries {
            sex: request.sex.to_string(),
        };
        let rows = request.table.series(request.sex).ok_or_else(missing)?;
        let thresholds = request
            .table
            .lookup(request.sex, request.age)
            .ok_or_else(missing)?;
        let category = crate::percentile::classify(request.bmi, thresholds);

        let curve = |label: &str, pick: fn(&crate::percentile::Thresholds) -> f64| Curve {
            label: label.to_string(),
            points: rows
                .iter()
                .map(|(age, t)| CurvePoint {
                    age: *age,
                    bmi: pick(t),
                })
                .collect(),
        };

        let (first, last) = match (rows.first(), rows.last()) {
            (Some((first, _)), Some((last, _))) => (*first, *last),
            _ => return Err(missing()),
        };

        Ok(Self {
            id,
            title: format!("Gráfico de Percentiles de IMC ({first} a {last} años)"),
            sex: request.sex,
            curves: vec![
                curve("Límite mínimo saludable", |t| t.p5),
                curve("Inicio del sobrepeso", |t| t.p85),
                curve("Límite de obesidad", |t| t.p95),
            ],
            point: CurvePoint {
                age: request.age,
                bmi: request.bmi,
            },
            category,
            recommendation: category.recommendation().to_string(),
            created_at: Utc::now(),
        })
    }
}
