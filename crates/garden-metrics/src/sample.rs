//! Samples, the unit produced by extractors on every scrape.

/// One labeled value of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    /// Label values in descriptor order.
    pub labels: Vec<String>,
    pub value: f64,
}

impl Sample {
    pub fn new(name: &str, labels: &[&str], value: f64) -> Self {
        Self {
            name: name.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            value,
        }
    }

    /// Label values as string slices, as the Prometheus vec types expect.
    pub fn label_refs(&self) -> Vec<&str> {
        self.labels.iter().map(String::as_str).collect()
    }
}

/// Render a boolean label value.
pub(crate) fn bool_label(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
