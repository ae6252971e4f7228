//! State-frequency chart over the visible records.

use std::collections::BTreeMap;

use crate::view::{ChartBar, ChartBody, Compose, NodeBody, ViewNode};

pub const STATE_CHART_VIEW_ID: &str = "state-chart-view";

/// Occurrence counts per state name, shaped for a bar chart. Bars are
/// ordered most-frequent first; ties fall back to the state name so the
/// chart is stable across passes.
#[derive(Debug)]
pub struct StateChartView {
    id: String,
    bars: Vec<ChartBar>,
}

impl StateChartView {
    pub fn new(id: impl Into<String>, counts: BTreeMap<String, u64>) -> Self {
        let mut bars: Vec<ChartBar> = counts
            .into_iter()
            .map(|(state, count)| ChartBar { state, count })
            .collect();
        bars.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.state.cmp(&b.state)));

        Self {
            id: id.into(),
            bars,
        }
    }
}

impl Compose for StateChartView {
    fn compose(&self) -> ViewNode {
        ViewNode::new(
            self.id.clone(),
            NodeBody::StateChart(ChartBody {
                bars: self.bars.clone(),
            }),
        )
    }
}
