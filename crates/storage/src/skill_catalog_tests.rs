use super::*;

#[test]
fn missing_file_yields_empty_catalog() {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = SkillCatalog::load(&dir.path().join("skills.json")).expect("load");
    assert!(catalog.is_empty());
}

#[test]
fn loads_and_sorts_by_usage_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("skills.json");
    std::fs::write(
        &path,
        r#"[
            {"name": "crawler", "description": "web crawl", "tags": ["net"], "usage_count": 2},
            {"name": "summarize", "description": "summarize text", "tags": [], "usage_count": 9}
        ]"#,
    )
    .expect("write");

    let catalog = SkillCatalog::load(&path).expect("load");
    assert_eq!(catalog.len(), 2);
    let all = catalog.all();
    assert_eq!(all[0].name, "summarize");
    assert_eq!(all[1].name, "crawler");
}

#[test]
fn get_by_name_finds_existing_skill() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("skills.json");
    std::fs::write(
        &path,
        r#"[{"name": "crawler", "description": "web crawl", "usage_count": 1}]"#,
    )
    .expect("write");

    let catalog = SkillCatalog::load(&path).expect("load");
    assert!(catalog.get("crawler").is_some());
    assert!(catalog.get("missing").is_none());
}
