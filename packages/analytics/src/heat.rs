//! Heat-map weights.

use bike_map_accident_models::AccidentPoint;
use bike_map_analytics_models::HeatPoint;

/// One weighted point per accident with a usable position, in input
/// order.
pub fn heat_points<'a, I, W>(points: I, weight_fn: W) -> Vec<HeatPoint>
where
    I: IntoIterator<Item = &'a AccidentPoint>,
    W: Fn(&AccidentPoint) -> f64,
{
    points
        .into_iter()
        .filter_map(|point| {
            point.valid_position().map(|position| HeatPoint {
                position,
                weight: weight_fn(point),
            })
        })
        .collect()
}

/// The same weight for every accident.
pub fn constant_weight(weight: f64) -> impl Fn(&AccidentPoint) -> f64 {
    move |_| weight
}
