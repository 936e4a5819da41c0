use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const DATASET: &str = "\
UNITID,INSTNM,CONTROL,PREDDEG,ADM_RATE,SAT_AVG,ZIP
1,Hudson Public University,1,3,0.8500,1100,10027
2,Brooklyn Public College,1,3,0.9100,NULL,11201-4201
3,Empire Private Institute,2,3,0.3000,1450,10003
4,Remote Public College,1,3,0.8800,1050,99999
5,Capital District Tech,1,2,0.9000,1000,12180
";

const DICTIONARY: &str = "\
NAME OF DATA ELEMENT,dev-category,developer-friendly name,API data type,INDEX,VARIABLE NAME,VALUE,LABEL,SOURCE,NOTES
Institution name,root,name,string,,INSTNM,,,IPEDS,
Control of institution,school,ownership,integer,,CONTROL,1,Public,IPEDS,
,,,,,,2,Private nonprofit,,
,,,,,,3,Private for-profit,,
Predominant degree awarded,school,degrees_awarded.predominant,integer,,PREDDEG,2,Predominantly associate's-degree granting,IPEDS,
,,,,,,3,Predominantly bachelor's-degree granting,,
Admission rate,admissions,admission_rate.overall,float,,ADM_RATE,,,IPEDS,
Average SAT,admissions,sat_scores.average.overall,float,,SAT_AVG,,,IPEDS,
";

const GAZETTEER: &str = "\
GEOID\tALAND\tAWATER\tINTPTLAT\tINTPTLONG
10001\t1604484\t0\t40.750633\t-73.997177
10003\t1485770\t0\t40.731829\t-73.989181
10027\t2159615\t0\t40.811550\t-73.953460
11201\t2451048\t0\t40.694021\t-73.990394
12180\t154128220\t0\t42.751120\t-73.600100
";

struct Fixture {
    _dir: tempfile::TempDir,
    data: PathBuf,
    dictionary: PathBuf,
    gazetteer: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let write = |name: &str, contents: &str| -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    };
    let data = write("Most-Recent-Cohorts-Institution.csv", DATASET);
    let dictionary = write("institution-data-dictionary.csv", DICTIONARY);
    let gazetteer = write("Gaz_zcta_national.txt", GAZETTEER);
    Fixture {
        _dir: dir,
        data,
        dictionary,
        gazetteer,
    }
}

fn run(fixture: &Fixture, extra: &[&str]) -> std::process::Output {
    let arg = |p: &Path| p.to_string_lossy().into_owned();
    Command::new(env!("CARGO_BIN_EXE_cds-query"))
        .arg("--data")
        .arg(arg(&fixture.data))
        .arg("--dictionary")
        .arg(arg(&fixture.dictionary))
        .arg("--gazetteer")
        .arg(arg(&fixture.gazetteer))
        .args(extra)
        .output()
        .expect("run cds-query")
}

fn json_rows(output: &std::process::Output) -> Vec<serde_json::Value> {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json output")
}

fn names(rows: &[serde_json::Value]) -> Vec<&str> {
    rows.iter().map(|r| r["INSTNM"].as_str().unwrap()).collect()
}

#[test]
fn label_filters_select_coded_rows() {
    let fx = fixture();
    let output = run(
        &fx,
        &[
            "--format",
            "json",
            "--filter",
            r#"{"ownership": "Public", "degrees_awarded.predominant": "Predominantly bachelor's-degree granting"}"#,
        ],
    );
    let rows = json_rows(&output);
    assert_eq!(
        names(&rows),
        vec![
            "Hudson Public University",
            "Brooklyn Public College",
            "Remote Public College"
        ]
    );
    assert!(rows.iter().all(|r| r.get("distance_int").is_none()));
}

#[test]
fn radius_query_sorts_by_distance_and_drops_unknown_zips() {
    let fx = fixture();
    let output = run(
        &fx,
        &[
            "--format",
            "json",
            "--filter",
            r#"{"ownership": "Public", "admission_rate.overall": {"op": ">=", "value": 0.85},
                "zip_radius": {"zip": "10001", "radius": 50}}"#,
        ],
    );
    let rows = json_rows(&output);
    assert_eq!(
        names(&rows),
        vec!["Brooklyn Public College", "Hudson Public University"]
    );
    assert_eq!(rows[0]["distance_int"], 4);
    assert_eq!(rows[0]["distance_display"], "4 miles");
    assert_eq!(rows[0]["ZIP"], "11201-4201");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("99999"), "stderr: {stderr}");
}

#[test]
fn table_output_prints_filter_and_columns() {
    let fx = fixture();
    let output = run(
        &fx,
        &[
            "--filter",
            r#"{"sat_scores.average.overall": {"op": ">=", "value": 1400}}"#,
        ],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("filter:"));
    assert!(stdout.contains("Empire Private Institute"));
    assert!(stdout.contains("SAT_AVG"));
    assert!(!stdout.contains("distance_int"));
}

#[test]
fn unknown_keys_warn_and_empty_queries_return_nothing() {
    let fx = fixture();
    let output = run(&fx, &["--format", "json", "--filter", r#"{"mascot": "Owl"}"#]);
    let rows = json_rows(&output);
    assert!(rows.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("mascot"));
    assert!(stderr.contains("query is empty"));
}

#[test]
fn malformed_filters_fail() {
    let fx = fixture();
    let output = run(
        &fx,
        &["--filter", r#"{"ownership": {"op": "like", "value": "Pub%"}}"#],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported operator"));
}
