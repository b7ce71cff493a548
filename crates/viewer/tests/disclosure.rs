mod support;

use support::{assert_all_consistent, click_id, id, indicator, is_open, viewer};
use viewer::UiEvent;

const REPORT: &str = r#"<!DOCTYPE html>
<html><body>
<div class="toggle-group" id="sections">
  <div class="controls"><button class="expand-all" id="expand">Expand all</button><button class="collapse-all" id="collapse">Collapse all</button></div>
  <div class="toggle-header" id="h-schema"><span class="toggle-indicator">+</span> Schema</div>
  <div class="toggle-content" id="c-schema">
    <div class="toggle-group" id="fields">
      <button class="expand-all" id="fields-expand">Expand</button>
      <div class="toggle-header" id="h-a"><span class="toggle-indicator">+</span> a</div>
      <div class="toggle-content" id="c-a"><p>int64</p></div>
      <div class="toggle-header" id="h-b"><span class="toggle-indicator">+</span> b</div>
      <div class="toggle-content" id="c-b"><p>utf8</p></div>
    </div>
  </div>
  <div class="toggle-header" id="h-meta"><span class="toggle-indicator">+</span> Metadata <button class="collapse-all" id="meta-collapse">x</button></div>
  <div class="toggle-content" id="c-meta"><p>created_by</p></div>
  <div class="toggle-header" id="h-empty"><span class="toggle-indicator">+</span> Nothing below</div>
</div>
</body></html>"#;

#[test]
fn toggle_twice_restores_state() {
    let mut v = viewer(REPORT);
    assert!(!is_open(&v, "h-schema"));
    assert_eq!(indicator(&v, "h-schema"), "+");

    click_id(&mut v, "h-schema");
    assert!(is_open(&v, "h-schema"));
    assert_eq!(indicator(&v, "h-schema"), "−");
    assert_all_consistent(&v);

    click_id(&mut v, "h-schema");
    assert!(!is_open(&v, "h-schema"));
    assert_eq!(indicator(&v, "h-schema"), "+");
    assert_all_consistent(&v);
}

#[test]
fn click_inside_header_toggles_nearest_header_only() {
    let mut v = viewer(REPORT);
    click_id(&mut v, "h-schema");

    // Click lands on the indicator span of a nested header.
    let span = v
        .document()
        .query_selector(id(&v, "h-a"), &v.markup().indicator)
        .unwrap();
    v.click(span);

    assert!(is_open(&v, "h-a"));
    assert!(!is_open(&v, "h-b"));
    assert!(is_open(&v, "h-schema"));
    assert_all_consistent(&v);
}

#[test]
fn header_without_content_is_a_no_op() {
    let mut v = viewer(REPORT);
    let before = v.document().mutation_count();
    click_id(&mut v, "h-empty");
    assert_eq!(v.document().mutation_count(), before);
}

#[test]
fn expand_then_collapse_closes_every_direct_child() {
    let mut v = viewer(REPORT);
    // Arbitrary prior toggles.
    click_id(&mut v, "h-meta");
    click_id(&mut v, "h-schema");
    click_id(&mut v, "h-schema");

    click_id(&mut v, "expand");
    assert!(is_open(&v, "h-schema"));
    assert!(is_open(&v, "h-meta"));
    // Nested group is out of scope.
    assert!(!is_open(&v, "h-a"));
    assert!(!is_open(&v, "h-b"));
    assert_all_consistent(&v);

    click_id(&mut v, "collapse");
    assert!(!is_open(&v, "h-schema"));
    assert!(!is_open(&v, "h-meta"));
    assert_all_consistent(&v);
}

#[test]
fn bulk_commands_are_idempotent() {
    let mut v = viewer(REPORT);
    click_id(&mut v, "expand");
    let after_first = v.document().mutation_count();
    click_id(&mut v, "expand");
    assert_eq!(v.document().mutation_count(), after_first);
}

#[test]
fn nested_group_controls_stay_in_their_group() {
    let mut v = viewer(REPORT);
    click_id(&mut v, "fields-expand");
    assert!(is_open(&v, "h-a"));
    assert!(is_open(&v, "h-b"));
    assert!(!is_open(&v, "h-schema"));
    assert!(!is_open(&v, "h-meta"));
}

#[test]
fn bulk_control_inside_header_does_not_toggle_it() {
    let mut v = viewer(REPORT);
    click_id(&mut v, "expand");
    click_id(&mut v, "meta-collapse");
    // Collapse-all ran; the header's own toggle did not reopen it.
    assert!(!is_open(&v, "h-meta"));
    assert!(!is_open(&v, "h-schema"));
    assert_all_consistent(&v);
}

#[test]
fn clicks_on_dead_or_plain_nodes_do_nothing() {
    let mut v = viewer(REPORT);
    let body = v.document().body().unwrap();
    let before = v.document().mutation_count();
    let outcome = v.handle(UiEvent::Click { target: body });
    assert!(!outcome.default_prevented);
    assert_eq!(v.document().mutation_count(), before);
}
