//! Browser smoke tests for the wasm-bindgen surface.
//!
//! Run with `wasm-pack test --headless --chrome packages/wasm`.

#![cfg(target_arch = "wasm32")]

use proximity_cull_wasm::{CullingSceneWasm, ProximityCullWasm, select_closest};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn group_round_trip() {
    let mut group = ProximityCullWasm::new(2, &[2.0, 4.0, 8.0, 16.0, 32.0]).unwrap();
    group
        .set_entities(&[3.0, 0.0, 0.0, 50.0, 0.0, 0.0], &[0.0, 0.0])
        .unwrap();

    assert_eq!(group.query_band(1, true, 0).unwrap(), vec![0]);
    assert_eq!(group.band_of(1), Some(5));
    assert_eq!(group.closest_in_band(1).unwrap(), 0);

    group.set_reference_point(48.0, 0.0, 0.0).unwrap();
    assert_eq!(group.tick().unwrap(), 2);
    assert_eq!(group.band_of(1), Some(1));

    group.destroy().unwrap();
    assert!(group.tick().is_err());
}

#[wasm_bindgen_test]
fn bad_thresholds_throw() {
    assert!(ProximityCullWasm::new(4, &[4.0, 2.0]).is_err());
    assert!(ProximityCullWasm::new(-1, &[1.0]).is_err());
    assert!(ProximityCullWasm::new(i32::MAX, &[1.0]).is_err());
}

#[wasm_bindgen_test]
fn empty_selection_throws() {
    assert!(select_closest(&[], &[], 0.0, 0.0, 0.0).is_err());
    assert_eq!(
        select_closest(&[0, 1], &[5.0, 0.0, 0.0, 1.0, 0.0, 0.0], 0.0, 0.0, 0.0).unwrap(),
        1
    );
    assert!(select_closest(&[0], &[1.0, 2.0, 3.0, 4.0], 0.0, 0.0, 0.0).is_err());
}

#[wasm_bindgen_test]
fn scene_updates() {
    let mut scene = CullingSceneWasm::new(JsValue::UNDEFINED, 3).unwrap();
    for _ in 0..10 {
        scene.update(1.0, 0.0, 0.1).unwrap();
    }
    assert_eq!(scene.positions().length() as usize, 64 * 3);
    assert_eq!(scene.colors().length() as usize, 64 * 4);
}
