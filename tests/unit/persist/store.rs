use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("store_unit").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn save_writes_preamble_and_body_under_project_dir() {
    let root = scratch("save");
    let store = ProjectStore::new(ProjectStoreOpts {
        root: root.clone(),
        ..ProjectStoreOpts::default()
    });

    let path = store.save("p1", "<mlt/>").unwrap();
    assert_eq!(path, root.join("p1").join("project.mlt"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<mlt/>\n");
}

#[test]
fn saved_document_loads_back() {
    let root = scratch("roundtrip");
    let store = ProjectStore::new(ProjectStoreOpts {
        root,
        ..ProjectStoreOpts::default()
    });
    let doc = Document::from_xml_str(
        r#"<mlt><producer id="producer0"><property name="length">00:00:05,000</property></producer></mlt>"#,
    )
    .unwrap();

    store.save_document("demo", &doc).unwrap();
    let loaded = store.load("demo").unwrap();
    assert_eq!(loaded.to_xml_string().unwrap(), doc.to_xml_string().unwrap());
}

#[test]
fn project_ids_must_be_one_path_component() {
    let store = ProjectStore::default();
    for bad in ["", "  ", "a/b", "..", "a\\b"] {
        assert!(
            matches!(store.project_path(bad), Err(EditError::Validation(_))),
            "accepted '{bad}'"
        );
    }
    assert_eq!(
        store.project_path("p").unwrap(),
        PathBuf::from("projects").join("p").join("project.mlt")
    );
}

#[test]
fn loading_a_missing_project_is_a_persistence_error() {
    let store = ProjectStore::new(ProjectStoreOpts {
        root: scratch("missing"),
        ..ProjectStoreOpts::default()
    });
    assert!(matches!(
        store.load("nope"),
        Err(EditError::Persistence { .. })
    ));
}

#[test]
fn write_failure_is_reported() {
    let root = scratch("blocked");
    std::fs::create_dir_all(&root).unwrap();
    // A plain file where the project directory should be.
    std::fs::write(root.join("p"), "x").unwrap();
    let store = ProjectStore::new(ProjectStoreOpts {
        root,
        ..ProjectStoreOpts::default()
    });
    assert!(matches!(
        store.save("p", "<mlt/>"),
        Err(EditError::Persistence { .. })
    ));
}

#[test]
fn write_document_uses_the_store_preamble() {
    let path = scratch("explicit").join("nested").join("out.mlt");
    let store = ProjectStore::new(ProjectStoreOpts {
        preamble: "<!-- edited -->\n".to_string(),
        ..ProjectStoreOpts::default()
    });
    let doc = Document::new();

    store.write_document(&path, &doc).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, format!("<!-- edited -->\n{}\n", doc.to_xml_string().unwrap()));
}
