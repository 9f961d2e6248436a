//! Evacuation target selection
//!
//! Pure and synchronous: given the user, the zone and the candidate places it
//! picks the nearest place that clears the buffered hazard boundary, or
//! projects an exit point when none does.

use crate::hazard::HazardZone;
use crate::place::{EvacuationTarget, ExitPoint, SafePlace};
use safepath_core::config::EngineConfig;
use safepath_geo::{distance_meters, project_exit_point, Coordinate};

/// Distances used when choosing a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPolicy {
    /// A place must be farther than `radius + safety_buffer` from the center
    pub safety_buffer_meters: f64,
    /// Exit points are projected to `radius + exit_margin` from the center
    pub exit_margin_meters: f64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            safety_buffer_meters: 100.0,
            exit_margin_meters: 300.0,
        }
    }
}

impl From<&EngineConfig> for SelectionPolicy {
    fn from(config: &EngineConfig) -> Self {
        Self {
            safety_buffer_meters: config.safety_buffer_meters,
            exit_margin_meters: config.exit_margin_meters,
        }
    }
}

/// Select a target with the default 100 m buffer and 300 m exit margin.
pub fn select_target(user: &Coordinate, zone: &HazardZone, candidates: &[SafePlace]) -> EvacuationTarget {
    select_target_with(&SelectionPolicy::default(), user, zone, candidates)
}

/// Select a target with an explicit policy.
///
/// Candidates with invalid coordinates are skipped. Among those farther than
/// `radius + buffer` from the zone center the one nearest the user wins; ties
/// go to the earliest in input order.
pub fn select_target_with(
    policy: &SelectionPolicy,
    user: &Coordinate,
    zone: &HazardZone,
    candidates: &[SafePlace],
) -> EvacuationTarget {
    let threshold = zone.radius_meters + policy.safety_buffer_meters;

    let mut best: Option<(&SafePlace, f64)> = None;
    for place in candidates {
        if !place.location.is_valid() {
            continue;
        }
        if distance_meters(&place.location, &zone.center) <= threshold {
            continue;
        }

        let to_user = distance_meters(user, &place.location);
        if best.is_none_or(|(_, nearest)| to_user < nearest) {
            best = Some((place, to_user));
        }
    }

    match best {
        Some((place, _)) => EvacuationTarget::SafePlace(place.clone()),
        None => EvacuationTarget::ExitPoint(ExitPoint {
            location: project_exit_point(
                user,
                &zone.center,
                zone.radius_meters,
                policy.exit_margin_meters,
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::{PlaceKind, EXIT_POINT_NAME};
    use proptest::prelude::*;
    use safepath_geo::meters_per_degree;

    const CENTER: Coordinate = Coordinate { latitude: 12.9716, longitude: 77.5946 };

    fn zone(radius: f64) -> HazardZone {
        HazardZone {
            center: CENTER,
            radius_meters: radius,
            active: true,
        }
    }

    fn place_at(id: &str, north_m: f64, east_m: f64) -> SafePlace {
        let lat = CENTER.latitude + north_m / meters_per_degree();
        let lon = CENTER.longitude
            + east_m / (meters_per_degree() * CENTER.latitude.to_radians().cos());
        SafePlace::new(id, format!("Place {id}"), Coordinate::new(lat, lon), PlaceKind::Hospital)
    }

    #[test]
    fn test_place_beyond_buffer_is_selected() {
        let candidates = vec![place_at("a", 2500.0, 0.0)];
        let target = select_target(&CENTER, &zone(2000.0), &candidates);
        assert_eq!(target, EvacuationTarget::SafePlace(candidates[0].clone()));
    }

    #[test]
    fn test_place_inside_buffer_falls_back_to_exit() {
        let candidates = vec![place_at("a", 1500.0, 0.0)];
        let target = select_target(&CENTER, &zone(2000.0), &candidates);
        assert!(target.is_exit_point());
        assert_eq!(target.name(), EXIT_POINT_NAME);
        assert!(distance_meters(&target.location(), &CENTER) > 2000.0);
    }

    #[test]
    fn test_place_between_radius_and_buffer_is_excluded() {
        // Outside the radius, but not past radius + 100.
        let candidates = vec![place_at("edge", 2050.0, 0.0)];
        let target = select_target(&CENTER, &zone(2000.0), &candidates);
        assert!(target.is_exit_point());
    }

    #[test]
    fn test_empty_candidates_fall_back_to_exit() {
        let target = select_target(&CENTER, &zone(2000.0), &[]);
        assert!(target.is_exit_point());
        let at = target.location();
        assert!(at.latitude.is_finite() && at.longitude.is_finite());
    }

    #[test]
    fn test_nearest_to_user_wins() {
        let user = Coordinate::new(CENTER.latitude, CENTER.longitude + 1000.0 / meters_per_degree());
        let candidates = vec![
            place_at("west", 0.0, -3000.0),
            place_at("east", 0.0, 3000.0),
            place_at("north", 3000.0, 0.0),
        ];
        let target = select_target(&user, &zone(2000.0), &candidates);
        assert_eq!(target.name(), "Place east");
    }

    #[test]
    fn test_tie_goes_to_first_in_input_order() {
        let a = place_at("a", 3000.0, 0.0);
        let mut b = a.clone();
        b.id = "b".to_string();
        b.name = "Place b".to_string();

        let target = select_target(&CENTER, &zone(2000.0), &[a, b]);
        assert_eq!(target.name(), "Place a");
    }

    #[test]
    fn test_invalid_candidate_is_skipped() {
        let broken = SafePlace::new("x", "Broken", Coordinate::new(f64::NAN, 0.0), PlaceKind::Shelter);
        let good = place_at("good", 4000.0, 0.0);
        let target = select_target(&CENTER, &zone(2000.0), &[broken, good]);
        assert_eq!(target.name(), "Place good");
    }

    #[test]
    fn test_custom_policy_buffer() {
        let policy = SelectionPolicy {
            safety_buffer_meters: 1000.0,
            exit_margin_meters: 500.0,
        };
        let candidates = vec![place_at("a", 2500.0, 0.0)];
        let target = select_target_with(&policy, &CENTER, &zone(2000.0), &candidates);
        assert!(target.is_exit_point());
        let d = distance_meters(&target.location(), &CENTER);
        assert!((d - 2500.0).abs() < 5.0, "distance: {}", d);
    }

    proptest! {
        #[test]
        fn prop_selected_place_clears_buffer(
            offsets in proptest::collection::vec((-6000.0f64..6000.0, -6000.0f64..6000.0), 0..8),
            user_north in -1500.0f64..1500.0,
            user_east in -1500.0f64..1500.0,
        ) {
            let candidates: Vec<SafePlace> = offsets
                .iter()
                .enumerate()
                .map(|(i, (n, e))| place_at(&i.to_string(), *n, *e))
                .collect();
            let user = place_at("user", user_north, user_east).location;
            let zone = zone(2000.0);

            let all_excluded = candidates
                .iter()
                .all(|p| distance_meters(&p.location, &CENTER) <= 2100.0);

            match select_target(&user, &zone, &candidates) {
                EvacuationTarget::SafePlace(place) => {
                    prop_assert!(!all_excluded);
                    prop_assert!(distance_meters(&place.location, &CENTER) > 2100.0);
                }
                EvacuationTarget::ExitPoint(exit) => {
                    prop_assert!(all_excluded);
                    prop_assert!(distance_meters(&exit.location, &CENTER) > 2000.0);
                }
            }
        }
    }
}
