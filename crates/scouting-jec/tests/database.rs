//! Whole-file parsing and era block lookup.

use std::{fs, path::PathBuf};

use scouting_jec::{prelude::*, veto::pick_veto_map_for_run};
use tempfile::TempDir;

const TWO_ERAS: &str = "\
# JEC inputs for scouting jets
# free commentary before the first header is ignored: really

#---- Year: 2024F:
L1FastJet:  /jec/Run2024F/L1FastJet_AK4PFHLT.txt,
L2Relative: /jec/Run2024F/L2Relative_AK4PFHLT.txt
L3Absolute: /jec/Run2024F/L3Absolute_AK4PFHLT.txt
L2L3Residual: [ -1:382298:/jec/Run2024F/res_a.txt, 382298:-1:/jec/Run2024F/res_b.txt ]
Unc: /jec/Run2024F/Uncertainty_AK4PFHLT.txt

#---- era:  2024G
L1FastJet: /jec/Run2024G/L1FastJet_AK4PFHLT.txt
JetVetoMap: /veto/Run2024G_vetomap.root
this line has no colon and is ignored
";

fn write_config(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).expect("failed to write test config");
    path
}

#[test]
fn two_sections_are_independent() -> JecResult<()> {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "data_jec_list.txt", TWO_ERAS);
    let db = ConfigDatabase::load(&path)?;
    assert_eq!(db.eras().collect::<Vec<_>>(), vec!["Run2024F", "Run2024G"]);

    let f = db.get_era_block("2024F");
    assert_eq!(f.l1_fast_jet(), "/jec/Run2024F/L1FastJet_AK4PFHLT.txt");
    assert_eq!(f.l2_relative(), "/jec/Run2024F/L2Relative_AK4PFHLT.txt");
    assert_eq!(f.l3_absolute(), "/jec/Run2024F/L3Absolute_AK4PFHLT.txt");
    assert_eq!(f.unc(), "/jec/Run2024F/Uncertainty_AK4PFHLT.txt");
    assert_eq!(
        f.residual_map(),
        vec![
            "-1:382298:/jec/Run2024F/res_a.txt",
            "382298:-1:/jec/Run2024F/res_b.txt"
        ]
    );

    let g = db.get_era_block("Run2024G");
    assert_eq!(g.l1_fast_jet(), "/jec/Run2024G/L1FastJet_AK4PFHLT.txt");
    assert_eq!(g.l2_relative(), "");
    assert!(g.l2l3_residual().is_empty());
    assert_eq!(g.unc(), "");
    assert_eq!(g.get("JetVetoMap"), Some("/veto/Run2024G_vetomap.root"));
    assert_eq!(g.jet_veto_map_files(), vec!["/veto/Run2024G_vetomap.root"]);

    assert!(db.get_era_block("2099Z").is_empty());
    assert!(db.get_era_block("").is_empty());
    assert!(db.get("2099Z").is_none());
    Ok(())
}

#[test]
fn missing_file_is_an_empty_database() -> JecResult<()> {
    let dir = TempDir::new().expect("tempdir");
    let db = ConfigDatabase::load(dir.path().join("does_not_exist.txt"))?;
    assert!(db.is_empty());
    assert!(db.get_era_block("2024F").is_empty());

    let db = ConfigDatabase::load(dir.path())?;
    assert!(db.is_empty());
    Ok(())
}

#[test]
fn multi_line_list_matches_single_line() -> JecResult<()> {
    let single = "\
#---- Year: 2024H:
L2L3Residual: [ -1:385000:/a.txt, 385000:386000:/b.txt, 386000:-1:root://eos//c:1.txt ]
";
    let multi = "\
#---- Year: 2024H:
L2L3Residual: [ -1:385000:/a.txt,
    385000:386000:/b.txt,
    386000:-1:root://eos//c:1.txt ]
";
    let a = ConfigDatabase::parse_str(single, "single")?;
    let b = ConfigDatabase::parse_str(multi, "multi")?;
    assert_eq!(a.get_era_block("2024H"), b.get_era_block("2024H"));
    assert_eq!(a.get_era_block("2024H").l2l3_residual().len(), 3);
    Ok(())
}

#[test]
fn list_opened_on_its_own_line() -> JecResult<()> {
    let text = "\
#---- year: 2025C:
L2L3Residual:
[
  -1:-1:/only.txt

]
Unc: /unc.txt
";
    let db = ConfigDatabase::parse_str(text, "bare-open")?;
    let block = db.get_era_block("2025C");
    assert_eq!(block.residual_map(), vec!["-1:-1:/only.txt"]);
    assert_eq!(block.unc(), "/unc.txt");
    Ok(())
}

#[test]
fn new_header_abandons_open_list() -> JecResult<()> {
    let text = "\
#---- Year: 2024F:
L1FastJet: /f/L1.txt
L2L3Residual: [ -1:-1:/f/res.txt,
#---- Year: 2024G:
L2Relative: /g/L2.txt
]
";
    let db = ConfigDatabase::parse_str(text, "abandon")?;
    let f = db.get_era_block("2024F");
    assert_eq!(f.l1_fast_jet(), "/f/L1.txt");
    assert!(f.l2l3_residual().is_empty());

    let g = db.get_era_block("2024G");
    assert_eq!(g.l1_fast_jet(), "");
    assert_eq!(g.l2_relative(), "/g/L2.txt");
    assert!(g.l2l3_residual().is_empty());
    Ok(())
}

#[test]
fn unterminated_list_leaves_residuals_empty() -> JecResult<()> {
    let text = "\
#---- Year: 2024I:
L2L3Residual: [ -1:-1:/i/res.txt,
Unc: /i/unc.txt
";
    let db = ConfigDatabase::parse_str(text, "eof")?;
    let block = db.get_era_block("2024I");
    assert!(block.l2l3_residual().is_empty());
    assert_eq!(block.unc(), "");
    Ok(())
}

#[test]
fn unknown_keys_are_kept_verbatim() -> JecResult<()> {
    let text = "\
#---- Year: 2024E:
Comment: produced by hand: see twiki,
L3Absolute : /e/L3.txt ,,
";
    let db = ConfigDatabase::parse_str(text, "extra")?;
    let block = db.get_era_block("2024E");
    assert_eq!(
        block.extra().get("Comment").map(String::as_str),
        Some("produced by hand: see twiki")
    );
    assert_eq!(block.l3_absolute(), "/e/L3.txt");
    Ok(())
}

#[test]
fn lines_before_first_header_are_ignored() -> JecResult<()> {
    let text = "L1FastJet: /orphan.txt\nL2L3Residual: [badtoken]\n";
    let db = ConfigDatabase::parse_str(text, "preamble")?;
    assert!(db.is_empty());
    Ok(())
}

#[test]
fn redefined_section_starts_fresh() -> JecResult<()> {
    let text = "\
#---- Year: 2024F:
L1FastJet: /first.txt
#---- Year: Run2024F
L2Relative: /second.txt
";
    let db = ConfigDatabase::parse_str(text, "redefined")?;
    assert_eq!(db.len(), 1);
    let block = db.get_era_block("2024F");
    assert_eq!(block.l1_fast_jet(), "");
    assert_eq!(block.l2_relative(), "/second.txt");
    Ok(())
}

#[test]
fn malformed_residual_names_file_era_and_item() {
    let dir = TempDir::new().expect("tempdir");
    let text = "#---- Year: 2024G:\nL2L3Residual: [ -1:-1:/ok.txt, badtoken ]\n";
    let path = write_config(&dir, "broken.txt", text);
    let err = ConfigDatabase::load(&path).unwrap_err();
    match &err {
        JecError::MalformedResidual {
            source_name,
            era,
            item,
        } => {
            assert_eq!(source_name, &path.display().to_string());
            assert_eq!(era, "Run2024G");
            assert_eq!(item, "badtoken");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("badtoken"));
}

#[test]
fn veto_map_list_and_run_picking() -> JecResult<()> {
    let text = "\
#---- Year: 2024C:
JetVetoMap: [ -1:380000:/veto/early.root, 380000:-1:/veto/late.root ]
";
    let db = ConfigDatabase::parse_str(text, "veto")?;
    let files = db.get_era_block("2024C").jet_veto_map_files();
    assert_eq!(files.len(), 2);
    assert_eq!(
        pick_veto_map_for_run(&files, 379_999).as_deref(),
        Some("/veto/early.root")
    );
    assert_eq!(
        pick_veto_map_for_run(&files, 380_000).as_deref(),
        Some("/veto/late.root")
    );
    Ok(())
}

#[test]
fn veto_map_plain_entries_apply_to_all_runs() {
    let entries = ["", "/veto/all.root", "1:2:/veto/never.root"];
    assert_eq!(
        pick_veto_map_for_run(&entries, 5).as_deref(),
        Some("/veto/all.root")
    );
    let entries = ["a:b:/veto/odd.root"];
    assert_eq!(
        pick_veto_map_for_run(&entries, 5).as_deref(),
        Some("a:b:/veto/odd.root")
    );
    let entries = ["10:20:/veto/range.root"];
    assert_eq!(pick_veto_map_for_run(&entries, 25), None);
}

#[test]
fn veto_map_negative_and_wide_bounds() {
    let entries = ["-5:-7:/veto/any.root"];
    assert_eq!(
        pick_veto_map_for_run(&entries, 5).as_deref(),
        Some("/veto/any.root")
    );
    let entries = ["0:9999999999:/veto/wide.root"];
    assert_eq!(
        pick_veto_map_for_run(&entries, 5).as_deref(),
        Some("/veto/wide.root")
    );
    let entries = ["0:99999999999999999999:/veto/overflow.root"];
    assert_eq!(
        pick_veto_map_for_run(&entries, 5).as_deref(),
        Some("0:99999999999999999999:/veto/overflow.root")
    );
}

#[test]
fn unbracketed_veto_map_is_a_single_entry() -> JecResult<()> {
    let text = "\
#---- Year: 2024C:
JetVetoMap: /veto/a.root, /veto/b.root
";
    let db = ConfigDatabase::parse_str(text, "veto")?;
    assert_eq!(
        db.get_era_block("2024C").jet_veto_map_files(),
        vec!["/veto/a.root, /veto/b.root"]
    );
    Ok(())
}

#[test]
fn database_serializes_as_era_map() -> Result<(), Box<dyn std::error::Error>> {
    let db = ConfigDatabase::parse_str(TWO_ERAS, "json")?;
    let value = serde_json::to_value(&db)?;
    assert_eq!(
        value["Run2024F"]["L2L3Residual"][0],
        "-1:382298:/jec/Run2024F/res_a.txt"
    );
    assert_eq!(value["Run2024G"]["JetVetoMap"], "/veto/Run2024G_vetomap.root");
    assert_eq!(value["Run2024G"]["Unc"], "");
    Ok(())
}
