use super::*;

#[test]
fn test_descriptor_defaults() {
    let desc = ProjectedShadowDescriptor::default();
    assert_eq!(desc.transform, Mat4::IDENTITY);
    assert_eq!(desc.near_plane, 0.01);
    assert_eq!(desc.far_plane, 10000.0);
    assert_eq!(desc.shadowmap_max_resolution, ShadowmapSize::Size1024);
    assert_eq!(desc.filter_method, ShadowFilterMethod::None);
    assert_eq!(desc.pcf_method, PcfMethod::BoundarySearch);
    assert_eq!(desc.prediction_sample_count, 4);
    assert_eq!(desc.filtering_sample_count, 16);
    // Defaults are already in range
    assert_eq!(desc.clamped(), desc);
}

#[test]
fn test_shadowmap_size_texels() {
    assert_eq!(ShadowmapSize::None.texels(), 0);
    assert_eq!(ShadowmapSize::Size256.texels(), 256);
    assert_eq!(ShadowmapSize::Size2048.texels(), 2048);
    assert!(ShadowmapSize::Size512 < ShadowmapSize::Size1024);
}

#[test]
fn test_filter_method_uses_esm() {
    assert!(!ShadowFilterMethod::None.uses_esm());
    assert!(!ShadowFilterMethod::Pcf.uses_esm());
    assert!(ShadowFilterMethod::Esm.uses_esm());
    assert!(ShadowFilterMethod::EsmPcf.uses_esm());
}

#[test]
fn test_clamped_fixes_out_of_range_values() {
    let desc = ProjectedShadowDescriptor {
        near_plane: 0.0,
        far_plane: -5.0,
        aspect_ratio: 0.0,
        field_of_view_y: 0.0,
        softening_boundary_width: -1.0,
        prediction_sample_count: 100,
        filtering_sample_count: 100,
        ..Default::default()
    }.clamped();

    assert_eq!(desc.field_of_view_y, MINIMUM_FIELD_OF_VIEW);
    assert_eq!(desc.near_plane, MINIMUM_NEAR_PLANE);
    assert!(desc.far_plane > desc.near_plane);
    assert_eq!(desc.aspect_ratio, 1.0);
    assert_eq!(desc.softening_boundary_width, 0.0);
    assert_eq!(desc.prediction_sample_count, MAX_PREDICTION_SAMPLE_COUNT);
    assert_eq!(desc.filtering_sample_count, MAX_FILTERING_SAMPLE_COUNT);
}

#[test]
fn test_clamp_near_far_keeps_valid_pair() {
    assert_eq!(clamp_near_far(1.0, 50.0), (1.0, 50.0));
    assert_eq!(clamp_near_far(f32::NAN, 50.0), (MINIMUM_NEAR_PLANE, 50.0));
}

#[test]
fn test_shadow_config_defaults() {
    let config = ShadowConfig::default();
    assert_eq!(config.max_shadows, 65535);
    assert!(config.esm_enabled);
    assert_eq!(config.initial_capacity, 16);
}
