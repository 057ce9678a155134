// End-to-end coverage runs through the library pipeline, exercising the
// chunking-invariance, idempotence, masking, and sampling guarantees.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use concord::accumulate::OverlapSummary;
use concord::pipeline::{self, OverlapError};
use concord::report::matched_percentage;
use concord::types::RunConfig;
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write input file");
    path
}

fn config(weights: &Path, panel: &Path, window_rows: usize) -> RunConfig {
    RunConfig {
        weights_path: weights.to_path_buf(),
        panel_path: panel.to_path_buf(),
        target_chrom: "22".to_string(),
        example_limit: 5,
        window_rows,
    }
}

fn run(config: &RunConfig) -> (OverlapSummary, String) {
    let mut out = Vec::new();
    let summary = pipeline::run(config, &mut out).expect("pipeline run");
    (summary, String::from_utf8(out).expect("utf8 report"))
}

const SCENARIO_WEIGHTS: &str = "chr,pos,effect_allele,weight,id\n\
                                22,100,A,0.5,v1\n\
                                22,200,C,0.3,v2\n";

const SCENARIO_PANEL: &str = "22\t22:100:A:T\t0\t100\tA\tT\n\
                              22\t22:300:G:C\t0\t300\tG\tC\n";

#[test]
fn half_matched_scenario_reports_fifty_percent() {
    let tmp = TempDir::new().expect("tempdir");
    let weights = write_file(tmp.path(), "weights.csv", SCENARIO_WEIGHTS);
    let panel = write_file(tmp.path(), "panel.bim", SCENARIO_PANEL);

    let (summary, report) = run(&config(&weights, &panel, 1024));

    assert_eq!(summary.matched_count, 1);
    assert_eq!(summary.total_weights, 2);
    assert_eq!(summary.processed_rows, 2);
    assert_abs_diff_eq!(
        matched_percentage(summary.matched_count, summary.total_weights),
        50.0
    );

    assert_eq!(summary.matches.len(), 1);
    assert_eq!(summary.matches[0].weights.pos, 100);
    assert_eq!(summary.non_matches.len(), 1);
    assert_eq!(summary.non_matches[0].pos, 200);

    assert!(report.contains("Total matched positions: 1"));
    assert!(report.contains("50.00%"));
}

#[test]
fn matched_count_is_invariant_to_window_chunking() {
    let tmp = TempDir::new().expect("tempdir");

    let mut weights_rows = String::from("chr,pos,effect_allele,weight,id\n");
    let mut panel_rows = String::new();
    for pos in (100..2100).step_by(100) {
        weights_rows.push_str(&format!("22,{pos},A,0.1,v{pos}\n"));
        // Every other weights position appears in the panel, some twice.
        if pos % 200 == 0 {
            panel_rows.push_str(&format!("22\t22:{pos}:A:T\t0\t{pos}\tA\tT\n"));
            panel_rows.push_str(&format!("22\t22:{pos}:A:T\t0\t{pos}\tA\tT\n"));
        }
    }
    let weights = write_file(tmp.path(), "weights.csv", &weights_rows);
    let panel = write_file(tmp.path(), "panel.bim", &panel_rows);

    let (whole_file, _) = run(&config(&weights, &panel, 1_000_000));
    let (row_at_a_time, _) = run(&config(&weights, &panel, 1));
    let (small_windows, _) = run(&config(&weights, &panel, 3));

    assert_eq!(whole_file.matched_count, 10);
    assert_eq!(row_at_a_time.matched_count, whole_file.matched_count);
    assert_eq!(small_windows.matched_count, whole_file.matched_count);
    assert_eq!(row_at_a_time.processed_rows, whole_file.processed_rows);
    assert_eq!(small_windows.processed_rows, whole_file.processed_rows);
}

#[test]
fn repeated_scans_are_idempotent() {
    let tmp = TempDir::new().expect("tempdir");
    let weights = write_file(tmp.path(), "weights.csv", SCENARIO_WEIGHTS);
    let panel = write_file(tmp.path(), "panel.bim", SCENARIO_PANEL);

    let cfg = config(&weights, &panel, 1024);
    let (first, _) = run(&cfg);
    let (second, _) = run(&cfg);

    assert_eq!(first.matched_count, second.matched_count);
    assert_eq!(first.processed_rows, second.processed_rows);
    assert_eq!(first.skipped_rows, second.skipped_rows);
}

#[test]
fn captured_samples_never_contain_nucleotide_letters() {
    let tmp = TempDir::new().expect("tempdir");
    let weights = write_file(
        tmp.path(),
        "weights.csv",
        "chr,pos,effect_allele,weight,id\n\
         22,100,A,0.5,v1\n\
         22,200,CT,0.3,v2\n\
         22,300,G,0.2,v3\n",
    );
    let panel = write_file(
        tmp.path(),
        "panel.bim",
        "22\t22:100:A:T\t0\t100\tA\tT\n\
         22\t22:200:CT:G\t0\t200\tCT\tG\n",
    );

    let (summary, _) = run(&config(&weights, &panel, 1024));

    assert_eq!(summary.matches.len(), 2);
    for example in &summary.matches {
        for allele in [
            &example.weights.effect_allele,
            &example.panel.allele1,
            &example.panel.allele2,
        ] {
            assert!(
                !allele.to_ascii_uppercase().contains(['A', 'C', 'G', 'T']),
                "unmasked allele in match example: {allele}"
            );
        }
    }
    for record in &summary.non_matches {
        assert!(
            !record
                .effect_allele
                .to_ascii_uppercase()
                .contains(['A', 'C', 'G', 'T']),
            "unmasked allele in non-match example: {}",
            record.effect_allele
        );
    }
}

#[test]
fn example_capture_respects_the_configured_limit() {
    let tmp = TempDir::new().expect("tempdir");

    let mut weights_rows = String::from("chr,pos,effect_allele,weight,id\n");
    let mut panel_rows = String::new();
    for pos in (100..1100).step_by(100) {
        weights_rows.push_str(&format!("22,{pos},A,0.1,v{pos}\n"));
        // Only the first half of the weights positions are on the panel.
        if pos <= 500 {
            panel_rows.push_str(&format!("22\t22:{pos}:A:T\t0\t{pos}\tA\tT\n"));
        }
    }
    let weights = write_file(tmp.path(), "weights.csv", &weights_rows);
    let panel = write_file(tmp.path(), "panel.bim", &panel_rows);

    let mut cfg = config(&weights, &panel, 1024);
    cfg.example_limit = 2;
    let (summary, _) = run(&cfg);

    assert_eq!(summary.matched_count, 5);
    assert_eq!(summary.matches.len(), 2);
    assert_eq!(summary.non_matches.len(), 2);
}

#[test]
fn malformed_panel_rows_are_skipped_without_affecting_matches() {
    let tmp = TempDir::new().expect("tempdir");
    let weights = write_file(tmp.path(), "weights.csv", SCENARIO_WEIGHTS);
    let panel = write_file(
        tmp.path(),
        "panel.bim",
        "22\tno_separator\t0\t100\tA\tT\n\
         22\t22:100:A:T\t0\t100\tA\tT\n",
    );

    let (summary, _) = run(&config(&weights, &panel, 1024));

    assert_eq!(summary.matched_count, 1);
    assert_eq!(summary.processed_rows, 2);
    assert_eq!(summary.skipped_rows, 1);
}

#[test]
fn empty_weights_set_is_fatal_before_the_scan() {
    let tmp = TempDir::new().expect("tempdir");
    // All rows are on chromosome 21, so filtering to 22 leaves nothing.
    let weights = write_file(
        tmp.path(),
        "weights.csv",
        "chr,pos,effect_allele,weight,id\n21,100,A,0.5,v1\n",
    );
    let panel = write_file(tmp.path(), "panel.bim", SCENARIO_PANEL);

    let mut out = Vec::new();
    let err = pipeline::run(&config(&weights, &panel, 1024), &mut out).unwrap_err();

    assert!(matches!(err, OverlapError::EmptyWeightsSet { .. }));
    assert!(out.is_empty(), "no partial report after a fatal error");
}

#[test]
fn missing_panel_file_is_fatal() {
    let tmp = TempDir::new().expect("tempdir");
    let weights = write_file(tmp.path(), "weights.csv", SCENARIO_WEIGHTS);
    let panel = tmp.path().join("absent.bim");

    let mut out = Vec::new();
    let err = pipeline::run(&config(&weights, &panel, 1024), &mut out).unwrap_err();
    assert!(matches!(err, OverlapError::MissingInput { .. }));
}

#[test]
fn gzip_compressed_inputs_are_read_transparently() {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let tmp = TempDir::new().expect("tempdir");

    let weights = tmp.path().join("weights.csv.gz");
    let mut encoder = GzEncoder::new(
        fs::File::create(&weights).expect("create"),
        Compression::default(),
    );
    encoder
        .write_all(SCENARIO_WEIGHTS.as_bytes())
        .expect("write");
    encoder.finish().expect("finish");

    let panel = tmp.path().join("panel.bim.gz");
    let mut encoder = GzEncoder::new(
        fs::File::create(&panel).expect("create"),
        Compression::default(),
    );
    encoder.write_all(SCENARIO_PANEL.as_bytes()).expect("write");
    encoder.finish().expect("finish");

    let (summary, _) = run(&config(&weights, &panel, 1024));
    assert_eq!(summary.matched_count, 1);
    assert_eq!(summary.total_weights, 2);
}
