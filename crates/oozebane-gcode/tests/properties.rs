//! Property tests for the ramp profile and the skein

use oozebane_core::Location;
use oozebane_gcode::{RampProfile, Skein};
use oozebane_settings::OozebaneSettings;
use proptest::prelude::*;
use std::fmt::Write;

fn settings_strategy() -> impl Strategy<Value = OozebaneSettings> {
    (0.1f64..5.0, 0.1f64..5.0, 0.1f64..5.0, 1.0f64..60.0, -2i64..20).prop_map(
        |(after, shutdown, maximum, constant, steps)| OozebaneSettings {
            after_startup_distance_over_extrusion_width: after,
            early_shutdown_distance_over_extrusion_width: shutdown,
            early_startup_maximum_distance_over_extrusion_width: maximum,
            early_startup_distance_constant_over_extrusion_width: constant,
            slowdown_startup_steps: steps,
            ..OozebaneSettings::default()
        },
    )
}

/// Threads of extrusion separated by travel, on a coarse grid
fn job_strategy() -> impl Strategy<Value = String> {
    let point = (0i32..40, 0i32..40);
    let thread = (
        prop::collection::vec(point.clone(), 0..3),
        prop::collection::vec(point, 1..6),
    );
    prop::collection::vec(thread, 1..6).prop_map(|threads| {
        let mut job =
            String::from("(<decimalPlacesCarried> 3 )\n(<extrusionWidth> 0.5 )\n(<extrusionStart> )\n");
        for (travel, extrusion) in threads {
            for (x, y) in travel {
                let _ = writeln!(job, "G1 X{} Y{}", x, y);
            }
            job.push_str("M101\n");
            for (x, y) in extrusion {
                let _ = writeln!(job, "G1 X{} Y{}", x, y);
            }
            job.push_str("M103\n");
        }
        job
    })
}

fn count(text: &str, opcode: &str) -> usize {
    text.lines().filter(|line| line.trim() == opcode).count()
}

proptest! {
    #[test]
    fn prop_shutdown_flow_decreases(settings in settings_strategy(), width in 0.1f64..2.0) {
        let profile = RampProfile::new(&settings, width);
        let rates = &profile.shutdown_flow_rates;
        prop_assert_eq!(rates.len(), profile.steps);
        prop_assert!(rates.iter().all(|rate| *rate > 0.0 && *rate <= 1.0));
        prop_assert!(rates.windows(2).all(|pair| pair[0] > pair[1]));
        prop_assert!(profile.shutdown_distances.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn prop_startup_flow_increases_to_full(settings in settings_strategy(), width in 0.1f64..2.0) {
        let profile = RampProfile::new(&settings, width);
        let rates = &profile.startup_flow_rates;
        prop_assert_eq!(rates.len(), profile.steps);
        prop_assert_eq!(rates.last().copied(), Some(1.0));
        prop_assert!(rates.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert!(profile.after_startup_flow_rate > 0.0);
        prop_assert!(profile.after_startup_flow_rate <= rates[0]);
        prop_assert!(profile.startup_distances.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn prop_early_startup_distance_bounded_and_monotonic(
        settings in settings_strategy(),
        first in 0.0f64..1.0,
        second in 0.0f64..1.0,
    ) {
        let profile = RampProfile::new(&settings, 1.0);
        let limit = profile.idle_saturation_distance();
        let (low, high) = if first <= second { (first, second) } else { (second, first) };

        prop_assert_eq!(profile.early_startup_distance(0.0), 0.0);
        let low_distance = profile.early_startup_distance(low * limit);
        let high_distance = profile.early_startup_distance(high * limit);
        prop_assert!(low_distance <= high_distance);
        prop_assert!(high_distance < profile.early_startup_maximum_distance);
    }

    #[test]
    fn prop_waypoints_away_from_endpoints(
        x in -50.0f64..50.0,
        y in -50.0f64..50.0,
        fraction in -0.5f64..1.5,
    ) {
        let profile = RampProfile::new(&OozebaneSettings::default(), 0.5);
        let from = Location::new(1.0, 2.0, 0.3);
        let to = Location::new(x, y, 0.3);
        let length = from.distance(&to);

        if let Some(waypoint) = profile.waypoint(&from, &to, fraction * length) {
            prop_assert!(!profile.is_close(&waypoint, &from));
            prop_assert!(!profile.is_close(&waypoint, &to));
            prop_assert!(waypoint.distance(&from) <= length + 1e-9);
            prop_assert!(waypoint.distance(&to) <= length + 1e-9);
        }
    }

    #[test]
    fn prop_skein_preserves_boundaries(job in job_strategy()) {
        let output = Skein::default().process(&job);
        prop_assert_eq!(count(&output, "M101"), count(&job, "M101"));
        prop_assert_eq!(count(&output, "M103"), count(&job, "M103"));
    }

    #[test]
    fn prop_generated_feedrates_within_base(job in job_strategy()) {
        let output = Skein::default().process(&job);
        for line in output.lines() {
            if let Some(value) = line.split_whitespace().find_map(|word| word.strip_prefix('F')) {
                let feedrate: f64 = value.parse().unwrap();
                prop_assert!(feedrate > 0.0 && feedrate <= 960.0, "{}", line);
            }
        }
    }

    #[test]
    fn prop_skein_is_idempotent(job in job_strategy()) {
        let skein = Skein::default();
        let once = skein.process(&job);
        prop_assert_eq!(skein.process(&once), once);
    }
}
