use super::*;

const DOC: &str = r#"<mlt>
  <producer id="producer0"><property name="length">00:00:05,000</property></producer>
  <producer id="producer1"><property name="length">00:00:07,000</property></producer>
  <playlist id="playlist0">
    <entry producer="producer0"/>
    <entry producer="producer1"/>
  </playlist>
  <playlist id="playlist1">
    <blank length="00:00:03,000"/>
    <entry producer="producer1"/>
  </playlist>
  <tractor id="tractor1">
    <multitrack>
      <track id="inner_a" producer="playlist0"/>
      <track id="inner_b" producer="playlist1"/>
    </multitrack>
  </tractor>
  <playlist id="playlist2">
    <entry producer="producer0"/>
    <entry producer="tractor1"/>
    <blank length="00:00:01,000"/>
    <entry producer="producer1"/>
  </playlist>
  <tractor id="tractor0">
    <multitrack>
      <track id="t0" producer="playlist0"/>
      <track id="t1" producer="playlist1"/>
      <track id="t2" producer="playlist2"/>
    </multitrack>
    <transition mlt_service="luma" a_track="0" b_track="1"/>
    <filter mlt_service="volume">
      <property name="track">2</property>
    </filter>
  </tractor>
</mlt>"#;

fn doc() -> Document {
    Document::from_xml_str(DOC).unwrap()
}

#[test]
fn simple_entries_take_one_slot_each() {
    let doc = doc();
    let playlist = doc.resolve("playlist0").unwrap();
    let t0 = doc.resolve("t0").unwrap();
    assert_eq!(logical_item_at(&doc, t0, 0).unwrap(), Some(doc.children(playlist)[0]));
    assert_eq!(logical_item_at(&doc, t0, 1).unwrap(), Some(doc.children(playlist)[1]));
    assert_eq!(logical_item_at(&doc, t0, 2).unwrap(), None);
}

#[test]
fn blanks_take_no_slot() {
    let doc = doc();
    let playlist = doc.resolve("playlist1").unwrap();
    assert_eq!(
        logical_item_at(&doc, playlist, 0).unwrap(),
        Some(doc.children(playlist)[1])
    );
}

#[test]
fn nested_tractor_expands_in_place() {
    let doc = doc();
    let t2 = doc.resolve("t2").unwrap();
    let playlist = doc.resolve("playlist2").unwrap();
    let items: Vec<_> = (0..5)
        .map(|i| logical_item_at(&doc, t2, i).unwrap())
        .collect();
    assert_eq!(
        items,
        vec![
            Some(doc.children(playlist)[0]),
            Some(doc.resolve("inner_a").unwrap()),
            Some(doc.resolve("inner_b").unwrap()),
            Some(doc.children(playlist)[3]),
            None,
        ]
    );
}

#[test]
fn dangling_nested_reference_is_unresolved() {
    let xml = r#"<mlt><playlist id="p"><entry producer="tractor9"/></playlist></mlt>"#;
    let doc = Document::from_xml_str(xml).unwrap();
    let p = doc.resolve("p").unwrap();
    assert!(matches!(
        logical_item_at(&doc, p, 0),
        Err(EditError::UnresolvedReference(_))
    ));
}

#[test]
fn positional_index_counts_preceding_tracks() {
    let doc = doc();
    for (id, expected) in [("t0", 0), ("t1", 1), ("t2", 2), ("inner_b", 1)] {
        let track = doc.resolve(id).unwrap();
        assert_eq!(positional_index(&doc, track), expected, "{id}");
    }
}

#[test]
fn references_come_from_attributes_or_properties() {
    let doc = doc();
    assert!(is_referenced(&doc, doc.resolve("t0").unwrap()));
    assert!(is_referenced(&doc, doc.resolve("t1").unwrap()));
    assert!(is_referenced(&doc, doc.resolve("t2").unwrap()));
    assert!(!is_referenced(&doc, doc.resolve("inner_a").unwrap()));
}

#[test]
fn shifting_updates_indices_at_or_above_the_cut() {
    let mut doc = doc();
    let tractor = doc.resolve("tractor0").unwrap();
    shift_track_references(&mut doc, tractor, 1, 1).unwrap();

    let transition = doc
        .children_of_kind(tractor, &NodeKind::Transition)
        .next()
        .unwrap();
    let filter = doc
        .children_of_kind(tractor, &NodeKind::Filter)
        .next()
        .unwrap();
    assert_eq!(doc.attr(transition, "a_track"), Some("0"));
    assert_eq!(doc.attr(transition, "b_track"), Some("2"));
    assert_eq!(doc.param(filter, "track"), Some("3"));

    shift_track_references(&mut doc, tractor, 2, -1).unwrap();
    assert_eq!(doc.attr(transition, "b_track"), Some("1"));
    assert_eq!(doc.param(filter, "track"), Some("2"));
}

#[test]
fn track_pointing_at_a_tractor_yields_its_tracks() {
    let doc = doc();
    let xml = r#"<mlt>
  <producer id="producer0"><property name="length">00:00:05,000</property></producer>
  <playlist id="playlist0"><entry producer="producer0"/></playlist>
  <tractor id="tractor1">
    <multitrack><track id="inner" producer="playlist0"/></multitrack>
  </tractor>
  <tractor id="tractor0">
    <multitrack><track id="outer" producer="tractor1"/></multitrack>
  </tractor>
</mlt>"#;
    let nested = Document::from_xml_str(xml).unwrap();
    let outer = nested.resolve("outer").unwrap();
    assert_eq!(
        logical_item_at(&nested, outer, 0).unwrap(),
        Some(nested.resolve("inner").unwrap())
    );
    assert_eq!(logical_item_at(&nested, outer, 1).unwrap(), None);

    let tractor = doc.resolve("tractor1").unwrap();
    assert_eq!(
        logical_item_at(&doc, tractor, 1).unwrap(),
        Some(doc.resolve("inner_b").unwrap())
    );
}

#[test]
fn positional_index_ignores_non_track_siblings() {
    let xml = r#"<mlt><tractor><multitrack>
  <property name="note">x</property>
  <track id="a" producer="p"/>
  <property name="note">y</property>
  <track id="b" producer="p"/>
</multitrack></tractor></mlt>"#;
    let doc = Document::from_xml_str(xml).unwrap();
    assert_eq!(positional_index(&doc, doc.resolve("a").unwrap()), 0);
    assert_eq!(positional_index(&doc, doc.resolve("b").unwrap()), 1);
    assert_eq!(positional_index(&doc, doc.root()), 0);
}
