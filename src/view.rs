use serde::Serialize;

use crate::record::{Dataset, ServiceRecord};

/// One point of the 3-D scatter plot
///
/// Urgency, resources and regulations position the point; uncertainty drives
/// the colour and the service name is the label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub color: u8,
}

impl From<&ServiceRecord> for ChartPoint {
    fn from(record: &ServiceRecord) -> Self {
        ChartPoint {
            label: record.name.clone(),
            x: record.urgency,
            y: record.resources,
            z: record.regulations,
            color: record.uncertainty,
        }
    }
}

/// Everything the dashboard redraws after a cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct View {
    pub chart: Vec<ChartPoint>,
    /// Names offered by the edit/remove selector, in dataset order.
    pub options: Vec<String>,
}

/// Derives chart data and selector options from the dataset.
pub fn project(dataset: &Dataset) -> View {
    View {
        chart: dataset.records().iter().map(ChartPoint::from).collect(),
        options: dataset.names().map(str::to_string).collect(),
    }
}
