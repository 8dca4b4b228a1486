// src/arrows/tests.rs

use super::*;
use crate::display::{ElementKind, HeadlessEvent, HeadlessProbe, HeadlessSurface};
use test_log::test;

fn setup() -> (DisplayManager, HeadlessProbe, ArrowManager) {
    let (surface, probe) = HeadlessSurface::new();
    (
        DisplayManager::new(Box::new(surface)),
        probe,
        ArrowManager::new(ArrowGeometry::default()),
    )
}

fn path_updates(probe: &HeadlessProbe) -> usize {
    probe
        .events()
        .iter()
        .filter(|e| matches!(e, HeadlessEvent::PathSet(..)))
        .count()
}

#[test]
fn path_runs_from_right_edge_to_left_edge() {
    let a = Rect {
        left: 0.0,
        top: 0.0,
        width: 100.0,
        height: 40.0,
    };
    let b = Rect {
        left: 300.0,
        top: 100.0,
        width: 50.0,
        height: 20.0,
    };
    assert_eq!(
        arrow_path(a, b, &ArrowGeometry::default()),
        "M101,20 C151,20 235,110 285,110"
    );
}

#[test]
fn add_draws_immediately() {
    let (mut display, probe, mut arrows) = setup();
    let a = display.create_panel("program", "prg").unwrap();
    let b = display.create_panel("shader", "vs").unwrap();
    let id = arrows.add(&mut display, a, b, "red").unwrap();
    assert!(arrows.contains(id));
    let link = &arrows.links()[0];
    let expected = arrow_path(
        display.bounds(a).unwrap(),
        display.bounds(b).unwrap(),
        &ArrowGeometry::default(),
    );
    assert_eq!(probe.text(link.path), Some(expected));
}

#[test]
fn markers_are_cached_per_color() {
    let (mut display, probe, mut arrows) = setup();
    let a = display.create_panel("program", "prg").unwrap();
    let b = display.create_panel("shader", "vs").unwrap();
    let c = display.create_panel("shader", "fs").unwrap();
    arrows.add(&mut display, a, b, "red").unwrap();
    arrows.add(&mut display, a, c, "red").unwrap();
    arrows.add(&mut display, b, c, "blue").unwrap();
    assert_eq!(probe.elements_of_kind(ElementKind::Marker).len(), 2);
}

#[test]
fn update_redraws_only_moved_arrows() {
    let (mut display, probe, mut arrows) = setup();
    let a = display.create_panel("program", "prg").unwrap();
    let b = display.create_panel("shader", "vs").unwrap();
    arrows.add(&mut display, a, b, "red").unwrap();
    let before = path_updates(&probe);
    arrows.update(&mut display).unwrap();
    assert_eq!(path_updates(&probe), before);
    probe.move_element(b, 10.0, 25.0).unwrap();
    arrows.update(&mut display).unwrap();
    assert_eq!(path_updates(&probe), before + 1);
}

#[test]
fn detached_target_is_pruned() {
    let (mut display, probe, mut arrows) = setup();
    let a = display.create_panel("program", "prg").unwrap();
    let b = display.create_panel("shader", "vs").unwrap();
    let id = arrows.add(&mut display, a, b, "red").unwrap();
    let group = arrows.links()[0].group;
    display.remove(b).unwrap();
    assert_eq!(arrows.update(&mut display).unwrap(), 1);
    assert!(!arrows.contains(id));
    assert!(arrows.is_empty());
    assert!(!probe.is_attached(group));
    // Nothing left to redraw.
    let before = path_updates(&probe);
    assert_eq!(arrows.update(&mut display).unwrap(), 0);
    assert_eq!(path_updates(&probe), before);
}

#[test]
fn removing_twice_is_a_no_op() {
    let (mut display, probe, mut arrows) = setup();
    let a = display.create_panel("program", "prg").unwrap();
    let b = display.create_panel("shader", "vs").unwrap();
    let id = arrows.add(&mut display, a, b, "red").unwrap();
    let group = arrows.links()[0].group;
    arrows.remove(&mut display, id).unwrap();
    assert!(!probe.is_attached(group));
    arrows.remove(&mut display, id).unwrap();
    assert_eq!(arrows.len(), 0);
}

#[test]
fn failed_update_keeps_every_link() {
    let (mut display, _screen, mut arrows) = setup();
    let a = display.create_panel("program", "prg").unwrap();
    let b = display.create_panel("shader", "vs").unwrap();
    let c = display.create_panel("shader", "fs").unwrap();
    arrows.add(&mut display, a, b, "red").unwrap();
    let doomed = arrows.add(&mut display, a, c, "red").unwrap();
    // An endpoint the surface never created makes the attachment query fail.
    let mut ghost = arrows.links()[0].clone();
    ghost.id = ArrowId(99);
    ghost.from = ElementId(999);
    ghost.group = display.create_panel("arrow", "ghost").unwrap();
    arrows.links.insert(1, ghost);
    display.remove(c).unwrap();

    let err = arrows.update(&mut display).unwrap_err();
    assert_eq!(err, DisplayError::UnknownElement(ElementId(999)));
    assert_eq!(arrows.len(), 3);
    assert!(arrows.contains(doomed));

    arrows.remove(&mut display, ArrowId(99)).unwrap();
    assert_eq!(arrows.update(&mut display).unwrap(), 1);
    assert!(!arrows.contains(doomed));
    assert_eq!(arrows.len(), 1);
}
