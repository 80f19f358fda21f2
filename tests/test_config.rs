mod common;

use common::*;
use std::io::Write;

#[test]
fn test_defaults() -> anyhow::Result<()> {
    let config = DetectorConfig::default();
    assert_eq!(config.lower_colour_bound(), [0, 0, 0]);
    assert_eq!(config.upper_colour_bound(), [0, 0, 0]);
    assert_eq!(config.background_subtractor(), BackgroundSubtractorKind::None);
    assert_eq!(config.frames_per_second(), 15);
    assert_eq!(config.canny_threshold_low(), 100);
    assert_eq!(config.canny_threshold_high(), 200);
    assert_eq!(config, DetectorConfig::new());

    Ok(())
}

#[test]
fn test_setters_chain_and_overwrite() -> anyhow::Result<()> {
    let mut config = DetectorConfig::default();
    config
        .set_background_subtractor(BackgroundSubtractorKind::Mog2)
        .set_colour_bounds([10, 20, 30], [40, 50, 60])
        .set_canny_threshold(50, 150)
        .set_frames_per_second(30);

    assert_eq!(config.background_subtractor(), BackgroundSubtractorKind::Mog2);
    assert_eq!(config.lower_colour_bound(), [10, 20, 30]);
    assert_eq!(config.upper_colour_bound(), [40, 50, 60]);
    assert_eq!(config.canny_threshold_low(), 50);
    assert_eq!(config.canny_threshold_high(), 150);
    assert_eq!(config.frames_per_second(), 30);

    // No validation: inverted values are stored as given
    config.set_canny_threshold(300, 10).set_colour_bounds([200, 0, 0], [0, 0, 0]);
    assert_eq!(config.canny_threshold_low(), 300);
    assert_eq!(config.canny_threshold_high(), 10);
    assert_eq!(config.lower_colour_bound(), [200, 0, 0]);

    let built = DetectorConfig::default()
        .with_background_subtractor(BackgroundSubtractorKind::Mog2)
        .with_colour_bounds([10, 20, 30], [40, 50, 60])
        .with_canny_threshold(50, 150)
        .with_frames_per_second(30);
    assert_eq!(built.background_subtractor(), BackgroundSubtractorKind::Mog2);
    assert_eq!(built.frames_per_second(), 30);

    Ok(())
}

#[test]
fn test_parse_full_toml() -> anyhow::Result<()> {
    let config = DetectorConfig::from_toml_str(
        r#"
        lower_colour_bound = [115, 50, 50]
        upper_colour_bound = [116, 255, 255]
        background_subtractor = "cnt"
        frames_per_second = 2
        canny_threshold_low = 100
        canny_threshold_high = 100
        "#,
    )?;

    assert_eq!(config.lower_colour_bound(), [115, 50, 50]);
    assert_eq!(config.upper_colour_bound(), [116, 255, 255]);
    assert_eq!(config.background_subtractor(), BackgroundSubtractorKind::Cnt);
    assert_eq!(config.frames_per_second(), 2);
    assert_eq!(config.canny_threshold_high(), 100);

    Ok(())
}

#[test]
fn test_partial_toml_keeps_defaults() -> anyhow::Result<()> {
    let config = DetectorConfig::from_toml_str("background_subtractor = \"knn\"\n")?;
    assert_eq!(config.background_subtractor(), BackgroundSubtractorKind::Knn);
    assert_eq!(config.frames_per_second(), 15);
    assert_eq!(config.canny_threshold_low(), 100);

    assert_eq!(DetectorConfig::from_toml_str("")?, DetectorConfig::default());

    Ok(())
}

#[test]
fn test_unknown_subtractor_is_rejected() -> anyhow::Result<()> {
    assert!(DetectorConfig::from_toml_str("background_subtractor = \"vibe\"\n").is_err());
    assert!("vibe".parse::<BackgroundSubtractorKind>().is_err());

    assert_eq!("MOG2".parse::<BackgroundSubtractorKind>()?, BackgroundSubtractorKind::Mog2);
    assert_eq!("none".parse::<BackgroundSubtractorKind>()?, BackgroundSubtractorKind::None);
    assert_eq!(BackgroundSubtractorKind::Gmg.to_string(), "gmg");

    Ok(())
}

#[test]
fn test_load_from_file() -> anyhow::Result<()> {
    let saved = blue_config_with(BackgroundSubtractorKind::Gmg, 25);

    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(saved.to_toml_string()?.as_bytes())?;
    file.flush()?;

    let loaded = DetectorConfig::load(file.path())?;
    assert_eq!(loaded, saved);

    Ok(())
}

#[test]
fn test_load_missing_file_fails() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    assert!(DetectorConfig::load(&dir.path().join("absent.toml")).is_err());
    Ok(())
}
