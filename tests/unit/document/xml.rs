use super::*;

const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<mlt id="project">
  <producer id="producer0">
    <property name="length">00:00:05,000</property>
    <property name="resource">clips/a &amp; b.mp4</property>
  </producer>
  <playlist id="playlist0">
    <entry producer="producer0" in="00:00:01,000"/>
  </playlist>
  <custom flag="x &lt; y"/>
</mlt>
"#;

#[test]
fn parses_kinds_attributes_and_property_text() {
    let doc = Document::from_xml_str(SAMPLE).unwrap();
    let root = doc.root();
    assert_eq!(doc.kind(root), &NodeKind::Mlt);
    assert_eq!(doc.find("project"), Some(root));

    let producer = doc.resolve("producer0").unwrap();
    assert_eq!(doc.property(producer, "length"), Some("00:00:05,000"));
    assert_eq!(doc.property(producer, "resource"), Some("clips/a & b.mp4"));

    let playlist = doc.resolve("playlist0").unwrap();
    let entry = doc.first_child(playlist).unwrap();
    assert_eq!(doc.kind(entry), &NodeKind::Entry);
    assert_eq!(doc.attr(entry, "in"), Some("00:00:01,000"));

    let custom = doc.last_child(root).unwrap();
    assert_eq!(doc.kind(custom), &NodeKind::Other("custom".to_string()));
    assert_eq!(doc.attr(custom, "flag"), Some("x < y"));
}

#[test]
fn serialize_then_parse_keeps_structure() {
    let doc = Document::from_xml_str(SAMPLE).unwrap();
    let xml = doc.to_xml_string().unwrap();
    assert!(xml.starts_with("<mlt id=\"project\">"));
    assert!(xml.contains("<entry producer=\"producer0\" in=\"00:00:01,000\"/>"));
    assert!(xml.contains("a &amp; b.mp4"));

    let again = Document::from_xml_str(&xml).unwrap();
    assert_eq!(again.to_xml_string().unwrap(), xml);
}

#[test]
fn subtree_serialization() {
    let doc = Document::from_xml_str(SAMPLE).unwrap();
    let playlist = doc.resolve("playlist0").unwrap();
    let xml = doc.subtree_to_xml(playlist).unwrap();
    assert!(xml.starts_with("<playlist id=\"playlist0\">"));
    assert!(xml.trim_end().ends_with("</playlist>"));
}

#[test]
fn malformed_documents_are_errors() {
    assert!(matches!(
        Document::from_xml_str("<mlt><playlist></mlt>"),
        Err(EditError::Xml(_))
    ));
    assert!(matches!(Document::from_xml_str(""), Err(EditError::Xml(_))));
    assert!(matches!(
        Document::from_xml_str("<mlt/><mlt/>"),
        Err(EditError::Xml(_))
    ));
}

#[test]
fn duplicate_ids_in_input_are_rejected() {
    let xml = r#"<mlt><playlist id="p"/><playlist id="p"/></mlt>"#;
    assert!(matches!(
        Document::from_xml_str(xml),
        Err(EditError::DuplicateId(id)) if id == "p"
    ));
}
