//! Per-label counts for legends.

use bike_map_accident_models::{AccidentPoint, CategoryKey};
use bike_map_analytics_models::{CategoryBreakdown, CategoryCount};
use bike_map_filter::{CategoryLabel, label_of};

/// Counts accidents per label of `key`.
///
/// Every label of the category appears, in display order, even when its
/// count is zero.
pub fn summarize<'a, I>(points: I, key: CategoryKey) -> CategoryBreakdown
where
    I: IntoIterator<Item = &'a AccidentPoint>,
{
    let labels = CategoryLabel::all_for(key);
    let mut counts = vec![0u64; labels.len()];
    let mut total = 0u64;

    for point in points {
        total += 1;
        let label = label_of(point, key);
        if let Some(i) = labels.iter().position(|l| *l == label) {
            counts[i] += 1;
        }
    }

    CategoryBreakdown {
        category: key,
        total,
        counts: labels
            .into_iter()
            .zip(counts)
            .map(|(label, count)| CategoryCount {
                label: label.as_str().to_string(),
                display: label.display().to_string(),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accident(weather: &str, on_lane: bool) -> AccidentPoint {
        AccidentPoint {
            id: None,
            position: None,
            severity_text: None,
            weather_code: weather.to_string(),
            lighting_code: String::new(),
            on_bike_lane: on_lane,
        }
    }

    #[test]
    fn counts_every_label() {
        let points = vec![
            accident("11", true),
            accident("14", false),
            accident("11", false),
            accident("", false),
        ];

        let weather = summarize(&points, CategoryKey::Weather);
        assert_eq!(weather.total, 4);
        assert_eq!(weather.counts.len(), 11);
        assert_eq!(weather.counts[0].label, "clear");
        assert_eq!(weather.counts[0].count, 2);
        assert_eq!(weather.counts.iter().map(|c| c.count).sum::<u64>(), 4);

        let undefined = weather.counts.iter().find(|c| c.label == "undefined").unwrap();
        assert_eq!(undefined.count, 1);

        let lanes = summarize(&points, CategoryKey::BikeLane);
        assert_eq!(lanes.counts[0].display, "On bike lane");
        assert_eq!(lanes.counts[0].count, 1);
        assert_eq!(lanes.counts[1].count, 3);
    }

    #[test]
    fn empty_input_has_zero_counts() {
        let severity = summarize(&[], CategoryKey::Severity);
        assert_eq!(severity.total, 0);
        assert_eq!(severity.counts.len(), 3);
        assert!(severity.counts.iter().all(|c| c.count == 0));
    }
}
