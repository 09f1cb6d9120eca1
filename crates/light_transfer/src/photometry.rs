//! Pure photometric and angular conversion functions.
//!
//! Everything here is side-effect free and operates on doubles. The
//! functions encode the closed-form identities used when moving light
//! parameters between the two destination renderers' falloff and
//! normalization conventions, including the empirically derived
//! correction constants. The synthesizer is the only consumer; each
//! function is independently testable.

use crate::error::TransferError;

/// Exposure-space correction between the source renderer's point/distant
/// radiant-power convention and Mantra's (`2^-2.65`).
#[must_use]
pub fn point_factor() -> f64 {
    (-2.65_f64).exp2()
}

/// Intensity ratio applied to line (degenerate cylinder) lights.
pub const LINE_FACTOR: f64 = 0.05;

/// Intensity ratio for area-normalized lights, used when deriving the
/// soft-edge exposure floor.
pub const NORMALIZED_RATIO: f64 = 0.5;

/// Intensity ratio for unnormalized lights.
pub const UNNORMALIZED_RATIO: f64 = 0.8;

/// Linearly remap `value` from `old_range` onto `new_range`.
///
/// `old_range[i]` maps exactly onto `new_range[i]`; the ranges may run
/// in either direction and values outside `old_range` extrapolate.
#[must_use]
pub fn fit(value: f64, old_range: [f64; 2], new_range: [f64; 2]) -> f64 {
    let old_fraction = (value - old_range[0]) / (old_range[1] - old_range[0]);
    (new_range[1] - new_range[0]).mul_add(old_fraction, new_range[0])
}

/// Re-derive an exposure after a renderer conversion factor and a change
/// of scene scale.
///
/// The exposure is expanded to a radiant intensity (`2^exposure`),
/// multiplied by `factor` and by `(new_scale / old_scale)^2` (inverse
/// square law under uniform scaling), then folded back to exposure.
///
/// # Errors
///
/// Returns [`TransferError::NumericDomain`] when the adjusted intensity
/// is not positive; callers must guard zero or negative factors and
/// scales rather than expect a clamped result.
pub fn scaled_exposure(
    exposure: f64,
    factor: f64,
    old_scale: f64,
    new_scale: f64,
) -> Result<f64, TransferError> {
    let intensity = exposure.exp2();
    let scale_factor = new_scale / old_scale;
    let new_intensity = scale_factor * scale_factor * factor * intensity;
    if new_intensity <= 0.0 || !new_intensity.is_finite() {
        return Err(TransferError::NumericDomain {
            function: "scaled_exposure",
            detail: format!("adjusted intensity {new_intensity} is outside log2's domain"),
        });
    }
    Ok(new_intensity.log2())
}

/// Convert an intensity between the two renderers' power conventions.
///
/// A zero `exposure` is a sentinel meaning "use raw intensity scaling":
/// the ratio is applied directly without expanding the exposure. This
/// mirrors the source tool's documented behavior and is deliberately not
/// folded into the general path.
#[must_use]
pub fn scaled_intensity(normalize: bool, intensity: f64, exposure: f64, scale: f64) -> f64 {
    let ratio = if normalize {
        NORMALIZED_RATIO * scale * scale
    } else {
        UNNORMALIZED_RATIO
    };
    if exposure == 0.0 {
        ratio * intensity
    } else {
        ratio * intensity * exposure.exp2()
    }
}

/// Exposure-space counterpart of [`scaled_intensity`].
///
/// # Errors
///
/// Returns [`TransferError::NumericDomain`] when the converted intensity
/// is not positive.
pub fn scaled_intensity_exposure(
    normalize: bool,
    intensity: f64,
    exposure: f64,
    scale: f64,
) -> Result<f64, TransferError> {
    let converted = scaled_intensity(normalize, intensity, exposure, scale);
    if converted <= 0.0 || !converted.is_finite() {
        return Err(TransferError::NumericDomain {
            function: "scaled_intensity_exposure",
            detail: format!("converted intensity {converted} is outside log2's domain"),
        });
    }
    Ok(converted.log2())
}

/// Exposure for a light whose soft-edge fraction is `value`.
///
/// Two endpoints are derived: the light's current exposure (what a
/// fully sharp edge keeps) and the minimum useful exposure at a fully
/// soft edge. The user's fraction interpolates between them via
/// [`fit`], with `value = 1` landing on the fully soft endpoint.
///
/// # Errors
///
/// Propagates [`TransferError::NumericDomain`] from the endpoint
/// derivations.
pub fn soft_edge_exposure(
    normalize: bool,
    exposure: f64,
    scale: f64,
    value: f64,
) -> Result<f64, TransferError> {
    let current = scaled_exposure(exposure, point_factor(), 1.0, scale)?;
    let full_soft = scaled_intensity_exposure(normalize, 1.0, exposure, scale)?;
    Ok(fit(value, [1.0, 0.0], [full_soft, current]))
}

/// Destination cone state produced by [`remap_dropoff`].
#[derive(Debug, Clone, PartialEq)]
pub enum DropoffRemap {
    /// Dropoff 0 or 1: snap to a canonical cone with roll-off 1.
    Snap {
        /// Cone angle to write; `None` leaves the destination default.
        cone: Option<f64>,
        /// Penumbra angle to write.
        penumbra: f64,
    },
    /// Dropoff in (0, 1): only the roll-off changes.
    Gradual {
        /// Remapped roll-off value.
        roll: f64,
    },
    /// Dropoff above 1: redistribute angles in sharp-spot territory.
    Sharp {
        /// Sharp-spot mode flag to write.
        sharp_spot: bool,
        /// Roll-off (the raw dropoff value).
        roll: f64,
        /// Cone angle to write.
        cone: f64,
        /// Penumbra angle to write.
        penumbra: f64,
    },
}

/// Remap a source spot light's dropoff/cone/penumbra triple onto the
/// destination cone model.
///
/// Piecewise over the dropoff domain; the branches are distinct
/// contracts and must not be merged:
///
/// * `{0, 1}` snaps to an open cone (roll-off 1) with a tie-break: both
///   angles ≥ 90° clamp to cone 0 / penumbra 90; only the penumbra ≥ 90°
///   clamps just the penumbra and leaves the cone untouched; otherwise
///   both pass through.
/// * `(0, 1)` becomes `1 - log100(100 - 100 * value)`.
/// * `> 1` switches the destination to its sharp-spot behavior.
///   `point_spot` selects the point-derived spot family, which zeroes
///   the cone and folds the halved angles into the penumbra instead.
#[must_use]
pub fn remap_dropoff(value: f64, cone: f64, penumbra: f64, point_spot: bool) -> DropoffRemap {
    if value == 0.0 || value == 1.0 {
        if penumbra >= 90.0 && cone >= 90.0 {
            DropoffRemap::Snap {
                cone: Some(0.0),
                penumbra: 90.0,
            }
        } else if penumbra >= 90.0 {
            DropoffRemap::Snap {
                cone: None,
                penumbra: 90.0,
            }
        } else {
            DropoffRemap::Snap {
                cone: Some(cone),
                penumbra,
            }
        }
    } else if value > 0.0 && value < 1.0 {
        let roll = 1.0 - (100.0 - value * 100.0).log(100.0);
        DropoffRemap::Gradual { roll }
    } else if point_spot {
        let half_cone = cone / 2.0;
        if penumbra > cone {
            let clamped = if penumbra >= 90.0 {
                90.0
            } else {
                penumbra + half_cone
            };
            DropoffRemap::Sharp {
                sharp_spot: false,
                roll: value,
                cone: 0.0,
                penumbra: clamped,
            }
        } else {
            let half_penumbra = penumbra / 2.0;
            let combined = half_cone + half_penumbra;
            DropoffRemap::Sharp {
                sharp_spot: false,
                roll: value,
                cone: 0.0,
                penumbra: combined.min(90.0),
            }
        }
    } else if penumbra >= 90.0 {
        DropoffRemap::Sharp {
            sharp_spot: true,
            roll: value,
            cone: 0.0,
            penumbra: 90.0,
        }
    } else {
        DropoffRemap::Sharp {
            sharp_spot: true,
            roll: value,
            cone,
            penumbra,
        }
    }
}

/// Which spread band a value fell into; drives the exposure write-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadBand {
    /// `[0.4, 1]`: wide spread, log50 curve, delta applied then routed
    /// through the scale round trip.
    Wide,
    /// `[0.02, 0.4)`: narrow spread, power-of-two curve, delta added
    /// directly.
    Narrow,
    /// `[0, 0.02)`: pinhole spread, fixed triple, delta of +8 stops
    /// rescaled by the pass scale.
    Pinhole,
}

/// Result of remapping a spread (angular softness) value.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadRemap {
    /// Band the value landed in.
    pub band: SpreadBand,
    /// Ordered cone/penumbra/roll-off destination values; consumed
    /// positionally against the catalog's fan-out entry.
    pub cone_values: [f64; 3],
    /// Exposure correction to merge into the destination's exposure.
    pub exposure_delta: f64,
}

/// Remap a spread value onto the destination's cone triple plus an
/// exposure correction.
///
/// Piecewise over three bands with different closed-form curves; the
/// band boundaries (0.4 and 0.02) and the pinhole constants come from
/// matched renders and are not derivable.
#[must_use]
pub fn remap_spread(value: f64) -> SpreadRemap {
    if value >= 0.4 {
        let widened = fit(value, [0.4, 1.0], [1.0, 50.0]);
        let cone_fraction = widened.log(50.0);
        let delta = fit(cone_fraction, [0.0, 1.0], [0.9, 0.0]);
        SpreadRemap {
            band: SpreadBand::Wide,
            cone_values: [cone_fraction * 180.0, 180.0, 10.0],
            exposure_delta: delta,
        }
    } else if value >= 0.02 {
        let unit = fit(value, [0.02, 0.4], [0.0, 1.0]);
        let cone_fraction = unit.exp2() - 1.0;
        let exposure_fraction = (1.0 + unit).log2();
        let delta = fit(exposure_fraction, [0.0, 1.0], [7.0, 0.0]);
        SpreadRemap {
            band: SpreadBand::Narrow,
            cone_values: [0.0, cone_fraction * 180.0, 10.0],
            exposure_delta: delta,
        }
    } else {
        SpreadRemap {
            band: SpreadBand::Pinhole,
            cone_values: [4.5, 0.0, 0.0],
            exposure_delta: 8.0,
        }
    }
}

/// Decide a boolean contribution toggle from a continuous `[0, 1]`
/// weight: enabled only inside `[0.5, 1]`.
#[must_use]
pub fn contribution_enabled(weight: f64) -> bool {
    (0.5..=1.0).contains(&weight)
}

/// Convert a color temperature in Kelvin to linear RGB in `[0, 1]`.
///
/// Curve fit over 100-Kelvin buckets, clamped to the 1000–40000 K
/// range the fit is valid for.
#[must_use]
pub fn kelvin_to_rgb(kelvin: f64) -> [f64; 3] {
    let temp = kelvin.clamp(1000.0, 40_000.0) / 100.0;

    let r = if temp <= 66.0 {
        1.0
    } else {
        (329.698_727_446 * (temp - 60.0).powf(-0.133_204_759_2) / 255.0).clamp(0.0, 1.0)
    };

    let g = if temp <= 66.0 {
        (99.470_802_586_1f64.mul_add(temp.ln(), -161.119_568_166_1) / 255.0).clamp(0.0, 1.0)
    } else {
        (288.122_169_528_3 * (temp - 60.0).powf(-0.075_514_849_2) / 255.0).clamp(0.0, 1.0)
    };

    let b = if temp >= 66.0 {
        1.0
    } else if temp <= 19.0 {
        0.0
    } else {
        (138.517_731_223_1f64.mul_add((temp - 10.0).ln(), -305.044_792_730_7) / 255.0)
            .clamp(0.0, 1.0)
    };

    [r, g, b]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fit_maps_endpoints_exactly() {
        // old_range[i] lands on new_range[i], including reversed ranges.
        assert_relative_eq!(fit(1.0, [1.0, 0.0], [-3.2, 7.5]), -3.2);
        assert_relative_eq!(fit(0.0, [1.0, 0.0], [-3.2, 7.5]), 7.5);
        assert_relative_eq!(fit(0.4, [0.4, 1.0], [1.0, 50.0]), 1.0);
        assert_relative_eq!(fit(1.0, [0.4, 1.0], [1.0, 50.0]), 50.0);
    }

    #[test]
    fn scaled_exposure_round_trips_scale() {
        for exposure in [-3.0, 0.0, 1.25, 6.0] {
            for scale in [0.1, 0.5, 2.0, 10.0] {
                let forward = scaled_exposure(exposure, 1.0, 1.0, scale).unwrap();
                let back = scaled_exposure(forward, 1.0, scale, 1.0).unwrap();
                assert_relative_eq!(back, exposure, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn scaled_exposure_applies_factor_and_inverse_square() {
        // 2^0 * 2^-2.65 at unit scale folds straight back to -2.65.
        let exposure = scaled_exposure(0.0, point_factor(), 1.0, 1.0).unwrap();
        assert_relative_eq!(exposure, -2.65, epsilon = 1e-12);
        // Doubling the scale adds two stops.
        let doubled = scaled_exposure(1.0, 1.0, 1.0, 2.0).unwrap();
        assert_relative_eq!(doubled, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn scaled_exposure_rejects_non_positive_intensity() {
        let err = scaled_exposure(0.0, 0.0, 1.0, 1.0).unwrap_err();
        assert!(matches!(
            err,
            TransferError::NumericDomain {
                function: "scaled_exposure",
                ..
            }
        ));
        assert!(scaled_exposure(0.0, -1.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn zero_exposure_is_a_sentinel_not_a_power() {
        // exposure == 0 takes the raw-intensity path, so a negative
        // intensity passes through without a domain error.
        assert_relative_eq!(scaled_intensity(false, -2.0, 0.0, 1.0), -1.6);
        assert_relative_eq!(scaled_intensity(true, 1.0, 0.0, 2.0), 2.0);
        // Non-zero exposure expands the power term.
        assert_relative_eq!(scaled_intensity(false, 1.0, 2.0, 1.0), 3.2);
    }

    #[test]
    fn soft_edge_interpolates_between_endpoints() {
        let exposure = 1.0;
        let scale = 1.0;
        let sharp = soft_edge_exposure(false, exposure, scale, 0.0).unwrap();
        let soft = soft_edge_exposure(false, exposure, scale, 1.0).unwrap();
        // value = 0 keeps the current (factor-adjusted) exposure.
        let current = scaled_exposure(exposure, point_factor(), 1.0, scale).unwrap();
        assert_relative_eq!(sharp, current, epsilon = 1e-12);
        // value = 1 lands on the unnormalized floor: log2(0.8 * 2^1).
        assert_relative_eq!(soft, (0.8f64 * 2.0).log2(), epsilon = 1e-12);
        // Halfway is the midpoint of the two endpoints.
        let half = soft_edge_exposure(false, exposure, scale, 0.5).unwrap();
        assert_relative_eq!(half, (sharp + soft) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn soft_edge_normalized_floor_scales_with_area() {
        let soft = soft_edge_exposure(true, 2.0, 3.0, 1.0).unwrap();
        assert_relative_eq!(soft, (0.5f64 * 4.0 * 9.0).log2(), epsilon = 1e-12);
    }

    #[test]
    fn dropoff_zero_and_one_snap_identically() {
        for (cone, penumbra) in [(95.0, 100.0), (45.0, 95.0), (40.0, 10.0)] {
            let at_zero = remap_dropoff(0.0, cone, penumbra, false);
            let at_one = remap_dropoff(1.0, cone, penumbra, false);
            assert_eq!(at_zero, at_one);
        }
    }

    #[test]
    fn dropoff_snap_tie_breaks() {
        assert_eq!(
            remap_dropoff(0.0, 95.0, 100.0, false),
            DropoffRemap::Snap {
                cone: Some(0.0),
                penumbra: 90.0
            }
        );
        // Only the penumbra clamps; the cone is left untouched.
        assert_eq!(
            remap_dropoff(1.0, 45.0, 95.0, false),
            DropoffRemap::Snap {
                cone: None,
                penumbra: 90.0
            }
        );
        assert_eq!(
            remap_dropoff(0.0, 40.0, 10.0, false),
            DropoffRemap::Snap {
                cone: Some(40.0),
                penumbra: 10.0
            }
        );
    }

    #[test]
    fn dropoff_gradual_uses_log100() {
        let DropoffRemap::Gradual { roll } = remap_dropoff(0.5, 30.0, 5.0, false) else {
            panic!("expected gradual branch");
        };
        assert_relative_eq!(roll, 1.0 - 50.0f64.log(100.0), epsilon = 1e-12);
    }

    #[test]
    fn dropoff_sharp_point_spot_folds_angles_into_penumbra() {
        // penumbra > cone, penumbra below the ceiling.
        assert_eq!(
            remap_dropoff(2.0, 30.0, 40.0, true),
            DropoffRemap::Sharp {
                sharp_spot: false,
                roll: 2.0,
                cone: 0.0,
                penumbra: 55.0,
            }
        );
        // penumbra <= cone: both halves combine, capped at 90.
        assert_eq!(
            remap_dropoff(3.0, 40.0, 20.0, true),
            DropoffRemap::Sharp {
                sharp_spot: false,
                roll: 3.0,
                cone: 0.0,
                penumbra: 30.0,
            }
        );
        assert_eq!(
            remap_dropoff(3.0, 120.0, 100.0, true),
            DropoffRemap::Sharp {
                sharp_spot: false,
                roll: 3.0,
                cone: 0.0,
                penumbra: 90.0,
            }
        );
    }

    #[test]
    fn dropoff_sharp_sphere_spot_keeps_angles() {
        assert_eq!(
            remap_dropoff(2.0, 40.0, 20.0, false),
            DropoffRemap::Sharp {
                sharp_spot: true,
                roll: 2.0,
                cone: 40.0,
                penumbra: 20.0,
            }
        );
        assert_eq!(
            remap_dropoff(2.0, 40.0, 95.0, false),
            DropoffRemap::Sharp {
                sharp_spot: true,
                roll: 2.0,
                cone: 0.0,
                penumbra: 90.0,
            }
        );
    }

    #[test]
    fn spread_wide_band_endpoints() {
        let at_one = remap_spread(1.0);
        assert_eq!(at_one.band, SpreadBand::Wide);
        assert_relative_eq!(at_one.cone_values[0], 180.0, epsilon = 1e-9);
        assert_relative_eq!(at_one.cone_values[1], 180.0);
        assert_relative_eq!(at_one.cone_values[2], 10.0);
        assert_relative_eq!(at_one.exposure_delta, 0.0, epsilon = 1e-9);

        let at_low = remap_spread(0.4);
        assert_relative_eq!(at_low.cone_values[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(at_low.exposure_delta, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn spread_narrow_band_endpoints() {
        let at_top = remap_spread(0.39999);
        assert_eq!(at_top.band, SpreadBand::Narrow);

        let at_bottom = remap_spread(0.02);
        assert_relative_eq!(at_bottom.cone_values[0], 0.0);
        assert_relative_eq!(at_bottom.cone_values[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(at_bottom.exposure_delta, 7.0, epsilon = 1e-9);

        // Top of the band meets the wide band's bottom exposure-wise:
        // (2^1 - 1) * 180 = 180 at unit fraction.
        let near_top = remap_spread(0.4);
        assert_eq!(near_top.band, SpreadBand::Wide);
    }

    #[test]
    fn spread_pinhole_band_is_constant() {
        for value in [0.0, 0.01, 0.019] {
            let remap = remap_spread(value);
            assert_eq!(remap.band, SpreadBand::Pinhole);
            assert_eq!(remap.cone_values, [4.5, 0.0, 0.0]);
            assert_relative_eq!(remap.exposure_delta, 8.0);
        }
    }

    #[test]
    fn contribution_weight_decision_rule() {
        assert!(!contribution_enabled(0.49));
        assert!(contribution_enabled(0.5));
        assert!(contribution_enabled(1.0));
        assert!(!contribution_enabled(1.1));
        assert!(!contribution_enabled(-1.0));
    }

    #[test]
    fn kelvin_extremes_and_neutral() {
        let warm = kelvin_to_rgb(1900.0);
        assert_relative_eq!(warm[0], 1.0);
        assert!(warm[2] < warm[1] && warm[1] < warm[0]);

        let cool = kelvin_to_rgb(10_000.0);
        assert_relative_eq!(cool[2], 1.0);
        assert!(cool[0] < cool[1] && cool[1] < cool[2]);

        // Out-of-range input clamps instead of extrapolating.
        assert_eq!(kelvin_to_rgb(500.0), kelvin_to_rgb(1000.0));
    }
}
