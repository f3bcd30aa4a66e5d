use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
    /// Share of all rows, 0.0 to 100.0.
    pub percentage: f64,
}

/// How often each sentiment label occurs.
///
/// Ordered by descending count; equal counts keep the order in which the labels first
/// appeared.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SentimentDistribution {
    counts: Vec<LabelCount>,
    total: usize,
}

impl SentimentDistribution {
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut order: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for label in labels {
            match index.get(label) {
                Some(&slot) => order[slot].1 += 1,
                None => {
                    index.insert(label, order.len());
                    order.push((label.to_string(), 1));
                }
            }
        }

        // stable sort keeps first-appearance order for ties
        order.sort_by(|a, b| b.1.cmp(&a.1));

        let total = order.iter().map(|(_, count)| count).sum();
        let counts = order
            .into_iter()
            .map(|(label, count)| LabelCount {
                label,
                count,
                percentage: count as f64 * 100.0 / total as f64,
            })
            .collect();

        Self { counts, total }
    }

    pub fn counts(&self) -> &[LabelCount] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&LabelCount> {
        self.counts.iter().find(|entry| entry.label == label)
    }

    pub fn percentage(&self, label: &str) -> f64 {
        self.get(label).map_or(0.0, |entry| entry.percentage)
    }
}

/// `%1.1f%%`-style percentage text, e.g. `70.0%`.
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.1}%")
}
