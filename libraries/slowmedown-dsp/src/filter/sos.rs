/// Second-order section cascades
///
/// Filters are stored as a cascade of biquads in transposed direct form II.
/// Coefficients and state are f64; samples come in and go out as f32.
/// Every filtering call owns its own state, so a `SosFilter` can be shared
/// freely between threads and calls.
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

/// One biquad stage, normalized so that `a0 == 1`
///
/// ```text
///         b0 + b1 z^-1 + b2 z^-2
/// H(z) = ------------------------
///          1 + a1 z^-1 + a2 z^-2
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondOrderSection {
    /// Numerator tap for `z^0`
    pub b0: f64,
    /// Numerator tap for `z^-1`
    pub b1: f64,
    /// Numerator tap for `z^-2`
    pub b2: f64,
    /// Denominator tap for `z^-1`
    pub a1: f64,
    /// Denominator tap for `z^-2`
    pub a2: f64,
}

impl SecondOrderSection {
    /// Create a section from raw numerator/denominator taps, normalizing by `a[0]`
    pub fn new(b: [f64; 3], a: [f64; 3]) -> Self {
        let a0 = a[0];
        Self {
            b0: b[0] / a0,
            b1: b[1] / a0,
            b2: b[2] / a0,
            a1: a[1] / a0,
            a2: a[2] / a0,
        }
    }

    /// Pass-through section
    pub fn identity() -> Self {
        Self::new([1.0, 0.0, 0.0], [1.0, 0.0, 0.0])
    }

    /// Complex response at normalized angular frequency `omega` (radians/sample)
    pub fn response(&self, omega: f64) -> Complex<f64> {
        let z1 = Complex::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = Complex::new(self.b0, 0.0) + z1 * self.b1 + z2 * self.b2;
        let den = Complex::new(1.0, 0.0) + z1 * self.a1 + z2 * self.a2;
        num / den
    }

    /// Both poles strictly inside the unit circle (stability triangle test)
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    fn scale_numerator(&mut self, gain: f64) {
        self.b0 *= gain;
        self.b1 *= gain;
        self.b2 *= gain;
    }

    /// DC gain `H(1)`
    fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// State that makes a unit step input produce a constant output from
    /// the first sample on
    fn step_state(&self) -> [f64; 2] {
        let den = 1.0 + self.a1 + self.a2;
        if den.abs() < f64::EPSILON {
            // Pole at DC: no finite steady state
            return [0.0, 0.0];
        }
        let gain = self.dc_gain();
        let s2 = self.b2 - self.a2 * gain;
        let s1 = self.b1 - self.a1 * gain + s2;
        [s1, s2]
    }

    #[inline]
    fn tick(&self, state: &mut [f64; 2], x: f64) -> f64 {
        let y = self.b0 * x + state[0];
        state[0] = self.b1 * x - self.a1 * y + state[1];
        state[1] = self.b2 * x - self.a2 * y;
        y
    }
}

/// Cascade of second-order sections applied in order
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<SecondOrderSection>,
}

impl SosFilter {
    /// Build a cascade from its sections
    pub fn new(sections: Vec<SecondOrderSection>) -> Self {
        Self { sections }
    }

    /// Sections in application order
    pub fn sections(&self) -> &[SecondOrderSection] {
        &self.sections
    }

    /// Check that every section is stable
    pub fn is_stable(&self) -> bool {
        self.sections.iter().all(SecondOrderSection::is_stable)
    }

    /// Multiply the whole cascade by `gain` (applied to the first section)
    pub(crate) fn scale(&mut self, gain: f64) {
        if let Some(first) = self.sections.first_mut() {
            first.scale_numerator(gain);
        }
    }

    /// Complex response at normalized angular frequency `omega`
    pub fn response(&self, omega: f64) -> Complex<f64> {
        self.sections
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, s| acc * s.response(omega))
    }

    /// Magnitude response at `freq_hz` for a given sample rate
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate: u32) -> f64 {
        let omega = 2.0 * PI * freq_hz / f64::from(sample_rate);
        self.response(omega).norm()
    }

    /// Causal filtering from zeroed state
    pub fn process(&self, input: &[f32]) -> Vec<f32> {
        let mut data: Vec<f64> = input.iter().map(|&s| f64::from(s)).collect();
        let mut state = vec![[0.0; 2]; self.sections.len()];
        self.run(&mut data, &mut state);
        data.into_iter().map(|s| s as f32).collect()
    }

    /// Zero-phase forward-backward filtering
    ///
    /// The input is extended at both ends by odd reflection, each pass starts
    /// from steady-state conditions scaled to its first sample, and the
    /// extension is stripped afterwards. The result has the squared magnitude
    /// response of the cascade and no phase shift.
    pub fn filtfilt(&self, input: &[f32]) -> Vec<f32> {
        let n = input.len();
        if n == 0 {
            return Vec::new();
        }

        let edge = self.pad_len().min(n - 1);
        let mut data = odd_extension(input, edge);
        let zi = self.steady_state();

        let x0 = data[0];
        let mut state: Vec<[f64; 2]> = zi.iter().map(|s| [s[0] * x0, s[1] * x0]).collect();
        self.run(&mut data, &mut state);

        data.reverse();
        let y0 = data[0];
        let mut state: Vec<[f64; 2]> = zi.iter().map(|s| [s[0] * y0, s[1] * y0]).collect();
        self.run(&mut data, &mut state);
        data.reverse();

        data[edge..edge + n].iter().map(|&s| s as f32).collect()
    }

    /// Reflection length used by `filtfilt`: three times the cascade's tap count
    fn pad_len(&self) -> usize {
        let mut taps = 2 * self.sections.len() + 1;
        let zero_b2 = self.sections.iter().filter(|s| s.b2 == 0.0).count();
        let zero_a2 = self.sections.iter().filter(|s| s.a2 == 0.0).count();
        taps -= zero_b2.min(zero_a2);
        3 * taps
    }

    /// Per-section initial state for a unit step through the whole cascade
    fn steady_state(&self) -> Vec<[f64; 2]> {
        let mut scale = 1.0;
        self.sections
            .iter()
            .map(|section| {
                let [s1, s2] = section.step_state();
                let zi = [s1 * scale, s2 * scale];
                scale *= section.dc_gain();
                zi
            })
            .collect()
    }

    fn run(&self, data: &mut [f64], state: &mut [[f64; 2]]) {
        for (section, st) in self.sections.iter().zip(state.iter_mut()) {
            for sample in data.iter_mut() {
                *sample = section.tick(st, *sample);
            }
        }
    }
}

/// Extend `input` by `edge` samples on both sides with odd symmetry about the
/// end points
fn odd_extension(input: &[f32], edge: usize) -> Vec<f64> {
    let n = input.len();
    let first = f64::from(input[0]);
    let last = f64::from(input[n - 1]);

    let mut out = Vec::with_capacity(n + 2 * edge);
    out.extend((1..=edge).rev().map(|i| 2.0 * first - f64::from(input[i])));
    out.extend(input.iter().map(|&s| f64::from(s)));
    out.extend((1..=edge).map(|i| 2.0 * last - f64::from(input[n - 1 - i])));
    out
}
