//! In-memory chart store keyed by uuid.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ChartRenderer, ChartRequest, PercentileChart};
use crate::error::ChartError;

struct Inner {
    charts: HashMap<String, PercentileChart>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
}

/// Keeps the most recent `capacity` chart descriptions.
pub struct InMemoryChartStore {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl InMemoryChartStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                charts: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Look up a chart by the id returned from `render`.
    pub async fn get(&self, id: &str) -> Option<PercentileChart> {
        self.inner.read().await.charts.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.charts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ChartRenderer for InMemoryChartStore {
    async fn render(&self, request: ChartRequest<'_>) -> Result<String, ChartError> {
        let id = Uuid::new_v4().to_string();
        let chart = PercentileChart::build(id.clone(), &request)?;

        let mut inner = self.inner.write().await;
        while inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.charts.remove(&oldest);
                debug!(chart_id = %oldest, "Evicted oldest chart");
            }
        }
        inner.order.push_back(id.clone());
        inner.charts.insert(id.clone(), chart);

        info!(chart_id = %id, age = request.age, sex = %request.sex, "Chart stored");
        Ok(id)
    }
}
