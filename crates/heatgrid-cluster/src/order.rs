//! Ordering metrics so that each cluster is contiguous.

/// Metrics laid out by ascending cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterOrder {
    /// Position of each ordered metric in the input.
    pub indices: Vec<usize>,
    pub metrics: Vec<String>,
    pub clusters: Vec<usize>,
    /// Display labels, `<metric> (<cluster>)`.
    pub labels: Vec<String>,
}

pub fn display_label(metric: &str, cluster: usize) -> String {
    format!("{metric} ({cluster})")
}

/// Stable sort of `metrics` by their cluster label; metrics sharing a
/// label keep their input order.
///
/// `metrics` and `labels` are paired up to the shorter of the two.
pub fn order_by_cluster(metrics: &[String], labels: &[usize]) -> ClusterOrder {
    let mut indices: Vec<usize> = (0..metrics.len().min(labels.len())).collect();
    indices.sort_by_key(|&i| labels[i]);

    let metrics: Vec<String> = indices.iter().map(|&i| metrics[i].clone()).collect();
    let clusters: Vec<usize> = indices.iter().map(|&i| labels[i]).collect();
    let labels = metrics
        .iter()
        .zip(&clusters)
        .map(|(m, &c)| display_label(m, c))
        .collect();

    ClusterOrder {
        indices,
        metrics,
        clusters,
        labels,
    }
}
