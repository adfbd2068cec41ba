//! Heat/wetness rectangles and the linear fade used to blend across their edges.

/// Axis-aligned rectangle in heat/wetness space. Bounds are inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateRange {
    /// Minimum heat, in `[0.0, 1.0]`.
    pub min_heat: f64,
    /// Maximum heat, in `[0.0, 1.0]`.
    pub max_heat: f64,
    /// Minimum wetness, in `[0.0, 1.0]`.
    pub min_wetness: f64,
    /// Maximum wetness, in `[0.0, 1.0]`.
    pub max_wetness: f64,
}

impl ClimateRange {
    /// The whole climate square.
    pub const FULL: Self = Self {
        min_heat: 0.0,
        max_heat: 1.0,
        min_wetness: 0.0,
        max_wetness: 1.0,
    };

    /// Whether `(heat, wetness)` lies inside the rectangle.
    pub fn contains(&self, heat: f64, wetness: f64) -> bool {
        heat >= self.min_heat
            && heat <= self.max_heat
            && wetness >= self.min_wetness
            && wetness <= self.max_wetness
    }

    /// Blend weight in `[0, 1]`: the product of the per-axis fades.
    pub fn fade_weight(&self, heat: f64, wetness: f64, margin: f64) -> f64 {
        fade(heat, self.min_heat, self.max_heat, margin)
            * fade(wetness, self.min_wetness, self.max_wetness, margin)
    }

    /// Squared distance from `(heat, wetness)` to the closest point of the
    /// rectangle. Zero when inside.
    pub fn distance_sq(&self, heat: f64, wetness: f64) -> f64 {
        let dh = heat - heat.clamp(self.min_heat, self.max_heat);
        let dw = wetness - wetness.clamp(self.min_wetness, self.max_wetness);
        dh * dh + dw * dw
    }

    /// Whether both axes are finite and ordered.
    pub fn is_valid(&self) -> bool {
        let ordered = |lo: f64, hi: f64| lo.is_finite() && hi.is_finite() && lo <= hi;
        ordered(self.min_heat, self.max_heat) && ordered(self.min_wetness, self.max_wetness)
    }
}

impl Default for ClimateRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// 1 inside `[min, max]`, ramping linearly to 0 across `margin` outside it,
/// 0 beyond.
///
/// A zero (or negative) margin gives a hard step.
pub fn fade(value: f64, min: f64, max: f64, margin: f64) -> f64 {
    if value >= min && value <= max {
        return 1.0;
    }
    if margin <= 0.0 || !margin.is_finite() {
        return 0.0;
    }
    let outside = if value < min { min - value } else { value - max };
    if outside >= margin {
        0.0
    } else {
        1.0 - outside / margin
    }
}
