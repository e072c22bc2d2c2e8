use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;
use std::{error::Error, io::Write, path::PathBuf};

#[derive(Deserialize)]
struct SamplingOutput {
    period_s: f64,
    frequency_hz: f64,
}

#[derive(Deserialize)]
struct SummaryOutput {
    count: usize,
    mean: f64,
    variance: f64,
    deviation: f64,
}

fn data_path(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join("test_data")
        .join(name)
        .to_string_lossy()
        .to_string()
}

fn json_line(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .lines()
        .find(|l| l.starts_with('{'))
        .expect("json line in output")
        .to_string()
}

fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "{a} vs {b} (tol {tol})");
}

#[test]
fn reports_sampling_rate_of_uniform_log() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("accel");
    cmd.args(["-i", &data_path("accel_100hz.csv")])
        .write_stdin("2\nx\n");
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out)?;
    assert!(text.contains("Select an option:"));
    assert!(text.contains("Sampling frequency: 100 Hz"));
    assert!(text.contains("Sampling time period: 0.01 s"));
    Ok(())
}

#[test]
fn recovers_rate_from_millisecond_timestamps() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("accel");
    cmd.args(["--infile", &data_path("accel_300hz_ms.csv"), "--json"])
        .write_stdin("2\nx\n");
    let out = cmd.assert().success().get_output().stdout.clone();
    let report: SamplingOutput = serde_json::from_str(&json_line(&out))?;
    assert_close(report.frequency_hz, 300.0, 1e-9);
    assert_close(report.period_s, 1.0 / 300.0, 1e-12);
    Ok(())
}

#[test]
fn statistics_as_json() -> Result<(), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    for (i, v) in [1.0, 2.0, 2.0, 3.0, 4.0].iter().enumerate() {
        writeln!(file, "2022-01-01 00:00:00.{:06},{v}", i * 5000)?;
    }
    let mut cmd = cargo_bin_cmd!("accel");
    cmd.args(["-i", file.path().to_str().expect("utf8 path"), "--json"])
        .write_stdin("7\nx\n");
    let out = cmd.assert().success().get_output().stdout.clone();
    let summary: SummaryOutput = serde_json::from_str(&json_line(&out))?;
    assert_eq!(summary.count, 5);
    assert_close(summary.mean, 2.4, 1e-12);
    assert_close(summary.variance, 1.04, 1e-12);
    assert_close(summary.deviation, 1.0198039, 1e-6);
    Ok(())
}

#[test]
fn invalid_filter_type_falls_back_with_warning() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("accel");
    cmd.args(["-i", &data_path("accel_100hz.csv"), "-t", "bessel"])
        .write_stdin("x\n");
    let output = cmd.assert().success().get_output().clone();
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("falling back to fir"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn unknown_menu_input_reprompts() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("accel");
    cmd.args(["-i", &data_path("accel_100hz.csv")])
        .write_stdin("q\n42\nx\n");
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out)?;
    assert_eq!(text.matches("Invalid input parameter. Try again!").count(), 2);
    Ok(())
}

#[test]
fn missing_infile_argument_exits_with_one() {
    let mut cmd = cargo_bin_cmd!("accel");
    cmd.assert().code(1);
}

#[test]
fn unreadable_infile_exits_with_one() {
    let mut cmd = cargo_bin_cmd!("accel");
    cmd.args(["-i", "/no/such/accel.csv"]);
    let output = cmd.assert().code(1).get_output().clone();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    assert!(stderr.contains("opening /no/such/accel.csv"), "stderr: {stderr}");
}

#[test]
fn malformed_timestamp_exits_with_one() -> Result<(), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "2022-01-01 00:00:00.000000,1.0")?;
    writeln!(file, "2022/01/01 00:00:00.010000,2.0")?;
    let mut cmd = cargo_bin_cmd!("accel");
    cmd.args(["-i", file.path().to_str().expect("utf8 path")]);
    cmd.assert().code(1);
    Ok(())
}

#[test]
fn help_exits_successfully() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("accel");
    cmd.arg("--help");
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out)?;
    assert!(text.contains("--infile"));
    assert!(text.contains("--type"));
    Ok(())
}

#[test]
fn config_file_selects_iir_filter() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("accel.toml");
    std::fs::write(
        &config,
        "filter = \"iir\"\n[iir]\ntype = \"low_pass\"\npass_hz = 5.0\nstop_hz = 15.0\n",
    )?;
    let mut cmd = cargo_bin_cmd!("accel");
    cmd.args([
        "-i",
        &data_path("accel_100hz.csv"),
        "--config",
        config.to_str().expect("utf8 path"),
        "--out-dir",
        dir.path().to_str().expect("utf8 path"),
    ])
    .write_stdin("8\nx\n");
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out)?;
    assert!(text.contains("Designed IIR filter"), "stdout: {text}");
    Ok(())
}
