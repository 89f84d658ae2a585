//! Hysteresis loop geometry: zero-crossing detection, main-branch
//! classification, and enclosed-area integration.
//!
//! A measured B-H loop is a noisy piecewise-linear closed curve. Both
//! coercivity (H at B=0) and remanence (B at H=0) reduce to the same
//! problem: find where one coordinate crosses zero, interpolate the paired
//! coordinate there, and pick the two crossings that belong to the main
//! loop rather than to minor sub-loops or noise wiggles. The routines here
//! are axis-agnostic; callers choose which slice is the crossing axis.

/// A detected zero-crossing of one coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Index of the sample where the sign change starts.
    pub index: usize,
    /// Paired coordinate, linearly interpolated at the exact zero.
    pub value: f64,
    /// Max |paired coordinate| over the look-back window before the
    /// crossing. Main-loop crossings happen after the sweep has been out
    /// at a saturation extreme, so a large value marks a main branch.
    pub salience: f64,
}

/// The two main-loop branch values at a zero-crossing axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchPair {
    /// Branch value on the positive side.
    pub plus: f64,
    /// Branch value on the negative side (expected negative).
    pub minus: f64,
}

impl BranchPair {
    /// Physical estimate: (plus + |minus|) / 2.
    pub fn midpoint(&self) -> f64 {
        (self.plus + self.minus.abs()) / 2.0
    }

    /// Asymmetry between the two branches, reported as the measurement
    /// uncertainty: |plus - |minus|| / 2. Not a statistical confidence
    /// interval.
    pub fn uncertainty(&self) -> f64 {
        (self.plus - self.minus.abs()).abs() / 2.0
    }
}

/// Summary of one hysteresis loop in already-converted units.
#[derive(Debug, Clone, Copy)]
pub struct LoopSummary {
    /// H branch values at B=0, if a main pair was found.
    pub coercivity: Option<BranchPair>,
    /// B branch values at H=0, if a main pair was found.
    pub remanence: Option<BranchPair>,
    /// Enclosed loop area (non-negative, mixed units).
    pub area: f64,
}

/// Find all zero-crossings of `a`, interpolating the paired coordinate `b`.
///
/// A crossing exists between samples i and i+1 when `a[i]` and `a[i+1]`
/// have opposite sign or either is exactly zero, and `a[i] != a[i+1]`
/// (the equal-zero pair would divide by zero). The salience score is the
/// max |b| over the `window` samples up to and including i.
///
/// Both slices must have the same length; the shorter bound is used if not.
pub fn find_zero_crossings(a: &[f64], b: &[f64], window: usize) -> Vec<Crossing> {
    let n = a.len().min(b.len());
    let mut crossings = Vec::new();

    for i in 0..n.saturating_sub(1) {
        if a[i] * a[i + 1] > 0.0 || a[i] == a[i + 1] {
            continue;
        }

        let value = b[i] + (b[i + 1] - b[i]) * (0.0 - a[i]) / (a[i + 1] - a[i]);

        let window_start = i.saturating_sub(window);
        let salience = b[window_start..=i]
            .iter()
            .fold(0.0f64, |acc, v| acc.max(v.abs()));

        crossings.push(Crossing {
            index: i,
            value,
            salience,
        });
    }

    crossings
}

/// Pick the two main-loop branch values from a set of crossings.
///
/// The crossing with the highest salience is the first branch; the second
/// is the most salient remaining crossing whose interpolated value has the
/// opposite sign. Returns `None` when no opposite-sign pair exists (no
/// crossings, a monotonic sweep, or all crossings on one side); callers
/// must report this as "undetermined", not as a physical zero.
pub fn classify_main_branches(crossings: &[Crossing]) -> Option<BranchPair> {
    if crossings.is_empty() {
        return None;
    }

    let mut sorted: Vec<&Crossing> = crossings.iter().collect();
    sorted.sort_by(|a, b| b.salience.total_cmp(&a.salience));

    let first = sorted[0].value;
    let second = sorted[1..]
        .iter()
        .map(|c| c.value)
        .find(|v| v * first < 0.0)?;

    if first > 0.0 {
        Some(BranchPair {
            plus: first,
            minus: second,
        })
    } else {
        Some(BranchPair {
            plus: second,
            minus: first,
        })
    }
}

/// Convenience wrapper: detect crossings of `a` and classify the main pair
/// of interpolated `b` values in one call.
pub fn main_branches(a: &[f64], b: &[f64], window: usize) -> Option<BranchPair> {
    classify_main_branches(&find_zero_crossings(a, b, window))
}

/// Enclosed area of the closed polygon traced by the sweep, via the
/// Shoelace formula. The polygon is implicitly closed (last vertex wraps
/// to the first). Fewer than 3 vertices gives 0.
///
/// For a hysteresis loop this is the energy dissipated per cycle in mixed
/// units (mT·A/m when B is in mT and H in A/m). No winding-number
/// correction is applied for self-intersecting loops; the result is an
/// approximation for noisy data.
pub fn shoelace_area(h: &[f64], b: &[f64]) -> f64 {
    let n = h.len().min(b.len());
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += h[i] * b[j];
        area -= h[j] * b[i];
    }
    area.abs() / 2.0
}

/// Full loop analysis: coercivity (B-crossings interpolating H), remanence
/// (H-crossings interpolating B), and enclosed area.
pub fn analyze_loop(h: &[f64], b: &[f64], window: usize) -> LoopSummary {
    LoopSummary {
        coercivity: main_branches(b, h, window),
        remanence: main_branches(h, b, window),
        area: shoelace_area(h, b),
    }
}
