//! Settings loaded from YAML and JSON and run through a pipeline.

use rescale_core::PixelFormat;
use rescale_ops::{build_pipeline, resize, Filter, OpsError, ResizeSettings, UnsharpMaskSettings};
use serde::Deserialize;

use crate::sources::pattern;

const THUMBNAIL_YAML: &str = "\
width: 48
height: 32
filter: lanczos
blur: 1.25
unsharp:
  amount: 75
  radius: 0.5
  threshold: 2
";

#[derive(Debug, Deserialize)]
struct Case {
    src: [u32; 2],
    settings: ResizeSettings,
}

const CASES_JSON: &str = r#"[
  { "src": [64, 48], "settings": { "width": 16, "height": 12 } },
  { "src": [64, 48], "settings": { "width": 100, "height": 75, "filter": "catmull_rom" } },
  { "src": [30, 30], "settings": { "width": 30, "height": 30, "filter": "nearest" } },
  { "src": [50, 20], "settings": { "width": 7, "height": 3, "filter": { "gaussian": { "sigma": 0.8 } } } },
  { "src": [40, 40], "settings": { "width": 20, "height": 25, "blur": 0.75,
      "unsharp": { "amount": 100, "radius": 0.6 } } }
]"#;

#[test]
fn test_yaml_file_drives_resize() {
    let settings = ResizeSettings::from_yaml_str(THUMBNAIL_YAML).unwrap();
    assert_eq!(settings.filter, Filter::Lanczos);
    assert_eq!(settings.unsharp, UnsharpMaskSettings::new(75, 0.5, 2));

    let src = pattern(96, 64, PixelFormat::Bgra32).unwrap();
    let out = resize(&src, &settings).unwrap();
    assert_eq!((out.width(), out.height()), (48, 32));
    assert_eq!(out.pixel_format(), PixelFormat::Bgra32);
}

#[test]
fn test_yaml_defaults() {
    let settings = ResizeSettings::from_yaml_str("width: 10\nheight: 20\n").unwrap();
    assert_eq!(settings, ResizeSettings::new(10, 20));
    assert!(!settings.unsharp.is_enabled());
}

#[test]
fn test_yaml_round_trip_preserves_gaussian() {
    let settings = ResizeSettings::new(9, 9).with_filter(Filter::Gaussian { sigma: 0.7 });
    let yaml = settings.to_yaml_string().unwrap();
    assert_eq!(ResizeSettings::from_yaml_str(&yaml).unwrap(), settings);
}

#[test]
fn test_malformed_yaml_is_config_error() {
    assert!(matches!(
        ResizeSettings::from_yaml_str("width: [1, 2]\nheight: 3\n"),
        Err(OpsError::Config(_))
    ));
    assert!(matches!(
        ResizeSettings::from_yaml_str("height: 3\n"),
        Err(OpsError::Config(_))
    ));
}

#[test]
fn test_out_of_range_values_fail_at_build() {
    let src = pattern(8, 8, PixelFormat::Grey8).unwrap();
    for yaml in [
        "width: 0\nheight: 4\n",
        "width: 4\nheight: 4\nblur: 3.0\n",
        "width: 4\nheight: 4\nunsharp: { amount: -5, radius: 1.0 }\n",
    ] {
        let settings = ResizeSettings::from_yaml_str(yaml).unwrap();
        assert!(
            matches!(build_pipeline(src.view(), &settings), Err(OpsError::InvalidParameter(_))),
            "{yaml}"
        );
    }
}

#[test]
fn test_json_round_trip() {
    let settings = ResizeSettings::new(300, 200)
        .with_filter(Filter::Mitchell)
        .with_blur(1.1)
        .with_unsharp(UnsharpMaskSettings::new(30, 0.75, 4));
    let json = serde_json::to_string(&settings).unwrap();
    let back: ResizeSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);
}

#[test]
fn test_json_cases() {
    let cases: Vec<Case> = serde_json::from_str(CASES_JSON).unwrap();
    assert_eq!(cases.len(), 5);
    for case in &cases {
        let [w, h] = case.src;
        let src = pattern(w, h, PixelFormat::Bgr24).unwrap();
        let out = resize(&src, &case.settings).unwrap();
        assert_eq!((out.width(), out.height()), (case.settings.width, case.settings.height), "{case:?}");
        if (w, h) == (case.settings.width, case.settings.height) && !case.settings.unsharp.is_enabled() {
            assert_eq!(out, src, "{case:?}");
        }
    }
}

#[test]
fn test_auto_settings() {
    let settings = ResizeSettings::auto(90, 60, 30, 20);
    assert_eq!(settings.filter, Filter::Spline36);
    assert_eq!(settings.unsharp, UnsharpMaskSettings::new(75, 0.5, 2));

    let src = pattern(90, 60, PixelFormat::Grey8).unwrap();
    let out = resize(&src, &settings).unwrap();
    assert_eq!((out.width(), out.height()), (30, 20));

    let same = ResizeSettings::auto(30, 20, 30, 20);
    assert_eq!(same.filter, Filter::Linear);
    assert!(!same.unsharp.is_enabled());
}
