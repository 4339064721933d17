//! Residual list parsing and run-based residual selection.

use scouting_jec::{
    residual::{parse_residual_list, pick_residual_for_run},
    ResidualParseError, ResidualRange,
};

#[test]
fn sentinel_bounds_and_plain_path() -> Result<(), ResidualParseError> {
    let entries = parse_residual_list("-1:-1:/path/a.txt")?;
    assert_eq!(entries, vec![ResidualRange::new("-1", "-1", "/path/a.txt")]);
    Ok(())
}

#[test]
fn colons_inside_path_belong_to_the_path() -> Result<(), ResidualParseError> {
    let entries = parse_residual_list("[100:200:root://host//store/x:y.txt]")?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].low, "100");
    assert_eq!(entries[0].high, "200");
    assert_eq!(entries[0].path, "root://host//store/x:y.txt");
    Ok(())
}

#[test]
fn brackets_parentheses_whitespace_and_empty_items() -> Result<(), ResidualParseError> {
    let entries = parse_residual_list(
        "  [ (-1 : 382298 : /a.txt), , 382298:383247:/b.txt ,\t383247:-1:/c.txt, ]  ",
    )?;
    let rendered: Vec<String> = entries.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "-1:382298:/a.txt",
            "382298:383247:/b.txt",
            "383247:-1:/c.txt"
        ]
    );
    Ok(())
}

#[test]
fn order_and_duplicates_are_kept() -> Result<(), ResidualParseError> {
    let entries = parse_residual_list("[2:3:/b.txt, 1:2:/a.txt, 2:3:/b.txt]")?;
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["/b.txt", "/a.txt", "/b.txt"]);
    Ok(())
}

#[test]
fn reserializing_reproduces_components() -> Result<(), ResidualParseError> {
    let original = ResidualRange::new("382298", "383247", "root://eos//x:1.txt");
    let reparsed = parse_residual_list(&format!("[{original}]"))?;
    assert_eq!(reparsed, vec![original]);
    Ok(())
}

#[test]
fn too_few_colons_is_an_error() {
    let err = parse_residual_list("[-1:-1:/ok.txt, badtoken]").unwrap_err();
    assert_eq!(err.item, "badtoken");

    let err = parse_residual_list("100:/one/colon.txt").unwrap_err();
    assert_eq!(err.item, "100:/one/colon.txt");
    assert!(err.to_string().contains("100:/one/colon.txt"));
}

#[test]
fn empty_list_is_empty() -> Result<(), ResidualParseError> {
    assert!(parse_residual_list("[]")?.is_empty());
    assert!(parse_residual_list("   ")?.is_empty());
    Ok(())
}

#[test]
fn residual_selection_is_half_open() -> Result<(), ResidualParseError> {
    let entries = parse_residual_list("[-1:383000:/a.txt, 383000:-1:/b.txt]")?;
    assert_eq!(
        pick_residual_for_run(&entries, 382_999).map(|e| e.path.as_str()),
        Some("/a.txt")
    );
    assert_eq!(
        pick_residual_for_run(&entries, 383_000).map(|e| e.path.as_str()),
        Some("/b.txt")
    );
    Ok(())
}

#[test]
fn residual_selection_skips_unparseable_bounds() -> Result<(), ResidualParseError> {
    let entries = parse_residual_list("[first:last:/bad.txt, 10:20:/good.txt]")?;
    assert_eq!(
        pick_residual_for_run(&entries, 15).map(|e| e.path.as_str()),
        Some("/good.txt")
    );
    assert!(pick_residual_for_run(&entries, 25).is_none());
    Ok(())
}

#[test]
fn residual_bounds_compare_as_wide_integers() -> Result<(), ResidualParseError> {
    let negative_max = parse_residual_list("[-1:-5:/a.txt]")?;
    assert!(pick_residual_for_run(&negative_max, 5).is_none());
    assert!(pick_residual_for_run(&negative_max, 0).is_none());

    let negative_min = parse_residual_list("[-5:10:/b.txt]")?;
    assert_eq!(
        pick_residual_for_run(&negative_min, 5).map(|e| e.path.as_str()),
        Some("/b.txt")
    );

    let huge_max = parse_residual_list("[-1:9999999999:/c.txt]")?;
    assert_eq!(
        pick_residual_for_run(&huge_max, 5).map(|e| e.path.as_str()),
        Some("/c.txt")
    );
    Ok(())
}

#[test]
fn residual_serializes_as_triple_string() -> Result<(), serde_json::Error> {
    let entry = ResidualRange::new("-1", "-1", "/a.txt");
    assert_eq!(serde_json::to_string(&entry)?, "\"-1:-1:/a.txt\"");
    Ok(())
}
