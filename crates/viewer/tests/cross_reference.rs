mod support;

use core_types::ResourceKind;
use support::{click_id, done, fragment_requests, id, is_open, viewer, wired};
use viewer::FetchState;

const RENDERED: &str = r##"<html><body>
<a class="segment-link" id="link-7" data-offset="7" href="#">offset 7</a>
<a class="segment-link" id="link-8" data-offset="8" href="#">offset 8</a>
<section id="segments">
  <div class="toggle-header" id="h-segments"><span class="toggle-indicator">+</span> Segments</div>
  <div class="toggle-content" id="c-segments">
    <div class="segment-list">
      <div class="segment" id="segment-1" data-offset="0">magic</div>
      <div class="segment" id="segment-2" data-offset="4">row group</div>
      <div class="segment" id="segment-3" data-offset="7">page header</div>
      <div class="toggle-header" id="h-footer"><span class="toggle-indicator">+</span> footer</div>
      <div class="toggle-content" id="c-footer">
        <div class="segment" id="segment-9" data-offset="7">column chunk</div>
      </div>
    </div>
  </div>
</section>
</body></html>"##;

const LAZY: &str = r##"<html><body>
<a class="segment-link" id="link-7" data-offset="7" href="#">offset 7</a>
<a class="segment-link" id="link-4" data-offset="4" href="#">offset 4</a>
<section id="schema">
  <div class="toggle-header" id="h-schema" data-src="/sections/schema"><span class="toggle-indicator">+</span> Schema</div>
  <div class="toggle-content" id="c-schema"></div>
</section>
<section id="segments">
  <div class="toggle-header" id="h-segments" data-src="/sections/segments"><span class="toggle-indicator">+</span> Segments</div>
  <div class="toggle-content" id="c-segments"></div>
</section>
</body></html>"##;

const SEGMENTS_FRAGMENT: &str = r#"<div class="segment-list">
  <div class="toggle-header" id="h-list"><span class="toggle-indicator">+</span> All segments</div>
  <div class="toggle-content" id="c-list">
    <div class="segment" id="segment-100" data-offset="4">a</div>
    <div class="segment" id="segment-200" data-offset="7">b</div>
    <div class="toggle-header" id="h-nested"><span class="toggle-indicator">+</span> nested</div>
    <div class="toggle-content" id="c-nested"><div class="segment" id="segment-300" data-offset="7">c</div></div>
  </div>
</div>"#;

#[test]
fn duplicate_offsets_resolve_to_last_in_document_order() {
    let mut v = viewer(RENDERED);
    let outcome = click_id(&mut v, "link-7");

    assert!(outcome.default_prevented);
    assert_eq!(v.location().fragment(), "segment-9");
    assert!(is_open(&v, "h-segments"));
    assert!(is_open(&v, "h-footer"));
    v.tick();
    assert_eq!(v.viewport().last_scroll().unwrap().target, id(&v, "segment-9"));
}

#[test]
fn unknown_offset_aborts_silently() {
    let mut v = viewer(RENDERED);
    let before = v.document().mutation_count();
    let outcome = click_id(&mut v, "link-8");
    assert!(outcome.default_prevented);
    assert_eq!(v.location().fragment(), "");
    assert_eq!(v.document().mutation_count(), before);
}

#[test]
fn same_link_twice_navigates_twice() {
    let mut v = viewer(RENDERED);
    click_id(&mut v, "link-7");
    v.tick();
    click_id(&mut v, "link-7");
    v.tick();
    assert_eq!(v.viewport().scrolls().len(), 2);
}

#[test]
fn missing_segment_list_loads_section_then_resolves() {
    let (mut v, rx) = wired(LAZY);
    let outcome = click_id(&mut v, "link-7");
    assert!(outcome.default_prevented);

    let requests = fragment_requests(&rx);
    assert_eq!(requests.len(), 1);
    let (request_id, url) = &requests[0];
    assert_eq!(url, "http://127.0.0.1:5000/sections/segments");
    assert_eq!(v.fetch_state(id(&v, "h-segments")), FetchState::Loading);
    assert!(is_open(&v, "h-segments"));
    assert_eq!(v.waiting_cross_references(), 1);
    assert_eq!(v.location().fragment(), "");

    let evt = done(&v, *request_id, ResourceKind::Fragment, 200, SEGMENTS_FRAGMENT);
    v.on_core_event(evt);

    assert_eq!(v.fetch_state(id(&v, "h-segments")), FetchState::Loaded);
    assert_eq!(v.waiting_cross_references(), 0);
    assert_eq!(v.location().fragment(), "segment-300");
    assert!(is_open(&v, "h-list"));
    assert!(is_open(&v, "h-nested"));
    v.tick();
    assert_eq!(v.viewport().last_scroll().unwrap().element_id, "segment-300");
}

#[test]
fn second_link_while_loading_does_not_refetch() {
    let (mut v, rx) = wired(LAZY);
    click_id(&mut v, "link-7");
    click_id(&mut v, "link-4");

    let requests = fragment_requests(&rx);
    assert_eq!(requests.len(), 1);
    // Still open: a loading section is not clicked again.
    assert!(is_open(&v, "h-segments"));
    assert_eq!(v.waiting_cross_references(), 2);

    let evt = done(&v, requests[0].0, ResourceKind::Fragment, 200, SEGMENTS_FRAGMENT);
    v.on_core_event(evt);
    assert_eq!(v.waiting_cross_references(), 0);
    // Both resolved, in registration order.
    assert_eq!(v.location().fragment(), "segment-100");
    v.tick();
    let ids: Vec<&str> = v
        .viewport()
        .scrolls()
        .iter()
        .map(|s| s.element_id.as_str())
        .collect();
    assert_eq!(ids, ["segment-300", "segment-100"]);
}

#[test]
fn unrelated_swap_does_not_fire_the_reaction() {
    let (mut v, rx) = wired(LAZY);
    click_id(&mut v, "link-7");
    click_id(&mut v, "h-schema");

    let requests = fragment_requests(&rx);
    assert_eq!(requests.len(), 2);
    let (segments_req, _) = requests
        .iter()
        .find(|(_, url)| url.ends_with("/segments"))
        .unwrap();
    let (schema_req, _) = requests
        .iter()
        .find(|(_, url)| url.ends_with("/schema"))
        .unwrap();

    // The schema fragment happens to contain a matching segment; it must not be used.
    let evt = done(
        &v,
        *schema_req,
        ResourceKind::Fragment,
        200,
        r#"<div class="segment-list"><div class="segment" id="segment-5" data-offset="7"></div></div>"#,
    );
    v.on_core_event(evt);
    assert_eq!(v.waiting_cross_references(), 1);
    assert_eq!(v.location().fragment(), "");

    let evt = done(&v, *segments_req, ResourceKind::Fragment, 200, SEGMENTS_FRAGMENT);
    v.on_core_event(evt);
    assert_eq!(v.waiting_cross_references(), 0);
    assert_eq!(v.location().fragment(), "segment-300");
}

#[test]
fn without_network_the_reference_resolves_against_what_is_there() {
    let mut v = viewer(LAZY);
    click_id(&mut v, "link-7");
    assert_eq!(v.waiting_cross_references(), 0);
    assert_eq!(v.fetch_state(id(&v, "h-segments")), FetchState::Unloaded);
    assert_eq!(v.location().fragment(), "");
}
