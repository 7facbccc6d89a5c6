//! End-to-end behaviour of the skein on small hand-checked jobs

use oozebane_gcode::{is_procedure_done, Skein, PROCEDURE_NAME};
use oozebane_settings::OozebaneSettings;

const HEADER: &str = "(<decimalPlacesCarried> 3 )\n(<extrusionWidth> 1.0 )\n(<extrusionStart> )\n";

fn job(body: &str) -> String {
    format!("{HEADER}{body}")
}

fn body_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .skip_while(|line| !line.starts_with("(<extrusionStart>"))
        .skip(1)
        .collect()
}

fn feedrate(line: &str) -> Option<f64> {
    line.split_whitespace()
        .find_map(|word| word.strip_prefix('F'))
        .and_then(|value| value.parse().ok())
}

#[test]
fn test_straight_thread_gets_five_waypoints() {
    let input = job("G1 X0 Y0\nM101\nG1 X10 Y0\nM103\n");
    let (output, report) = Skein::default().process_with_report(&input);
    let lines = body_lines(&output);

    let waypoints: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| line.contains(" F"))
        .collect();
    assert_eq!(waypoints.len(), 5);
    assert_eq!(report.waypoints, 5);

    let feedrates: Vec<f64> = waypoints.iter().filter_map(|line| feedrate(line)).collect();
    assert!(feedrates.windows(2).all(|pair| pair[0] > pair[1]));

    // Exactly one off, emitted right after the first waypoint
    assert_eq!(lines.iter().filter(|line| **line == "M103").count(), 1);
    let off = lines.iter().position(|line| *line == "M103").unwrap();
    assert_eq!(lines[off - 1], "G1 X8 Y0 Z0 F864");
    assert_eq!(lines.last(), Some(&"G1 X10 Y0"));
}

#[test]
fn test_already_processed_is_unchanged() {
    let input = job("G1 X0 Y0\nM101\nG1 X10 Y0\nM103\n");
    let skein = Skein::default();

    let once = skein.process(&input);
    assert!(is_procedure_done(&once, PROCEDURE_NAME));

    let (twice, report) = skein.process_with_report(&once);
    assert_eq!(twice, once);
    assert!(report.already_processed);
    assert_eq!(report.waypoints, 0);
}

#[test]
fn test_zero_idle_gap_keeps_extruder_on_in_place() {
    let input = job("G1 X0 Y0\nM101\nG1 X10 Y0\nM103\nM101\nG1 X20 Y0\nM103\n");
    let (output, report) = Skein::default().process_with_report(&input);

    assert_eq!(report.early_ons, 0);
    assert_eq!(report.early_offs, 2);
    assert!(output.contains("G1 X10 Y0\nM101\n"));
    assert_eq!(output.matches("M101\n").count(), 2);
}

#[test]
fn test_short_segment_waypoints_not_extrapolated() {
    let input = job("G1 X0 Y0\nM101\nG1 X0.6 Y0\nM103\n");
    let (output, report) = Skein::default().process_with_report(&input);

    assert_eq!(
        body_lines(&output),
        vec!["G1 X0 Y0", "M101", "G1 X0.2 Y0 Z0 F96", "M103", "G1 X0.6 Y0"]
    );
    assert_eq!(report.waypoints, 1);
}

#[test]
fn test_early_startup_after_long_travel() {
    let input = job(
        "G1 X0 Y0\nM101\nG1 X10 Y0\nM103\n\
         G1 X10 Y30\nG1 X40 Y30\nM101\nG1 X45 Y30\nG1 X50 Y30\nM103\n",
    );
    let (output, report) = Skein::default().process_with_report(&input);

    assert_eq!(
        body_lines(&output),
        vec![
            "G1 X0 Y0",
            "M101",
            "G1 X8 Y0 Z0 F864",
            "M103",
            "G1 X8.4 Y0 Z0 F672",
            "G1 X8.8 Y0 Z0 F480",
            "G1 X9.2 Y0 Z0 F288",
            "G1 X9.6 Y0 Z0 F96",
            "G1 X10 Y0",
            "G1 X10 Y30",
            "G1 X38.271 Y30 Z0 F960",
            "M101",
            "G1 X40 Y30 Z0 F96",
            "G1 X40.4 Y30 Z0 F288",
            "G1 X40.8 Y30 Z0 F480",
            "G1 X41.2 Y30 Z0 F672",
            "G1 X41.6 Y30 Z0 F864",
            "G1 X42 Y30 Z0 F960",
            "G1 X45 Y30",
            "G1 X48 Y30 Z0 F864",
            "M103",
            "G1 X48.4 Y30 Z0 F672",
            "G1 X48.8 Y30 Z0 F480",
            "G1 X49.2 Y30 Z0 F288",
            "G1 X49.6 Y30 Z0 F96",
            "G1 X50 Y30",
        ]
    );
    assert_eq!(report.early_ons, 1);
    assert_eq!(report.early_offs, 2);
    assert_eq!(report.startup_ramps, 1);
    assert_eq!(report.waypoints, 16);
}

#[test]
fn test_opaque_and_blank_lines_preserved() {
    let input = job("M104 S200\n\nG1 X0 Y0 (start)\n; comment\nM101\nG1 X10 Y0\nM103\nM30\n");
    let output = Skein::default().process(&input);
    let lines = body_lines(&output);

    assert_eq!(&lines[..4], &["M104 S200", "", "G1 X0 Y0 (start)", "; comment"]);
    assert_eq!(lines.last(), Some(&"M30"));
}

#[test]
fn test_header_precision_applies_to_generated_moves() {
    let input = "(<decimalPlacesCarried> 1 )\n(<extrusionWidth> 0.7 )\n(<extrusionStart> )\n\
                 G1 X0 Y0 F1000\nM101\nG1 X10 Y0\nM103\n";
    let output = Skein::default().process(input);
    // 2 * 0.7 back from X10, flow 0.9
    assert!(output.contains("G1 X8.6 Y0 Z0 F900\nM103\n"));
}

#[test]
fn test_single_step_ramp() {
    let settings = OozebaneSettings::default().with_steps(1);
    let input = job("G1 X0 Y0\nM101\nG1 X10 Y0\nM103\n");
    let (output, report) = Skein::new(settings).process_with_report(&input);

    assert_eq!(report.waypoints, 1);
    assert!(output.contains("G1 X8 Y0 Z0 F480\nM103\nG1 X10 Y0\n"));
}

#[test]
fn test_crlf_input_normalized() {
    let input = job("G1 X0 Y0\r\nM101\r\nG1 X10 Y0\r\nM103\r\n");
    let output = Skein::default().process(&input);
    assert!(!output.contains('\r'));
    assert!(output.ends_with("G1 X10 Y0\n"));
}

#[test]
fn test_short_thread_gets_no_startup_ramp() {
    let input = job("G1 X0 Y0\nG1 X1 Y0\nM101\nG1 X3 Y0\nM103\n");
    let (output, report) = Skein::default().process_with_report(&input);
    let lines = body_lines(&output);

    // 2 units of extrusion is shorter than 1.03 * (2 + 2)
    assert_eq!(report.startup_ramps, 0);
    assert_eq!(report.early_ons, 0);
    assert_eq!(&lines[..3], &["G1 X0 Y0", "G1 X1 Y0", "M101"]);
}

#[test]
fn test_long_thread_gets_startup_ramp() {
    let input = job("G1 X0 Y0\nG1 X1 Y0\nM101\nG1 X10 Y0\nM103\n");
    let (output, report) = Skein::default().process_with_report(&input);
    let lines = body_lines(&output);

    assert_eq!(report.startup_ramps, 1);
    assert_eq!(&lines[..3], &["G1 X0 Y0", "G1 X1 Y0 Z0 F96", "M101"]);
}

#[test]
fn test_huge_step_count_is_clamped() {
    let settings = OozebaneSettings::default().with_steps(i64::MAX);
    let input = job("G1 X0 Y0\nM101\nG1 X10 Y0\nM103\n");
    let (output, report) = Skein::new(settings).process_with_report(&input);

    assert_eq!(output.matches("M103\n").count(), 1);
    assert!(report.waypoints > 0);
    assert!(report.waypoints <= 1000);
}
