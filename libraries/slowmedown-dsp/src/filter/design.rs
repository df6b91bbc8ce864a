/// Butterworth filter design as second-order sections
///
/// Analog prototype poles are frequency-transformed (lowpass, highpass or
/// bandpass), mapped to the z-plane with the bilinear transform, paired into
/// conjugate biquads and finally gain-normalized at a reference frequency where
/// the Butterworth response is exactly unity.
use rustfft::num_complex::Complex;
use std::f64::consts::PI;
use tracing::debug;

use super::sos::{SecondOrderSection, SosFilter};
use crate::error::{DspError, Result};

/// Imaginary parts below this are treated as real poles
const REAL_POLE_TOLERANCE: f64 = 1e-10;

/// Bilinear transform constant for a normalized sample rate of 2
/// (so that frequencies are fractions of Nyquist)
const BILINEAR_K: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Response {
    Lowpass,
    Highpass,
    Bandpass,
}

/// Design a Butterworth bandpass filter
///
/// # Arguments
/// * `low_cut_hz` - Lower -3 dB edge in Hz
/// * `high_cut_hz` - Upper -3 dB edge in Hz
/// * `order` - Prototype order; the cascade has `order` sections
/// * `sample_rate` - Sample rate in Hz
///
/// Fails with `InvalidSpec` unless `0 < low < high < nyquist` and `order >= 1`.
pub fn butter_bandpass(
    low_cut_hz: f64,
    high_cut_hz: f64,
    order: usize,
    sample_rate: u32,
) -> Result<SosFilter> {
    check_order(order)?;
    let low = normalized_cutoff(low_cut_hz, sample_rate)?;
    let high = normalized_cutoff(high_cut_hz, sample_rate)?;
    if low >= high {
        return Err(DspError::invalid_spec(format!(
            "low cutoff {} Hz must be below high cutoff {} Hz",
            low_cut_hz, high_cut_hz
        )));
    }

    let wl = prewarp(low);
    let wh = prewarp(high);
    let bandwidth = wh - wl;
    let centre = (wl * wh).sqrt();

    let analog: Vec<Complex<f64>> = prototype_poles(order)
        .into_iter()
        .flat_map(|p| {
            let scaled = p * (bandwidth / 2.0);
            let offset = (scaled * scaled - centre * centre).sqrt();
            [scaled + offset, scaled - offset]
        })
        .collect();

    // Unity gain at the digital image of the analog centre frequency
    let reference = 2.0 * (centre / BILINEAR_K).atan();
    let filter = assemble(&analog, Response::Bandpass, reference);
    debug!(
        "Designed Butterworth bandpass {}-{} Hz, order {} at {} Hz ({} sections)",
        low_cut_hz,
        high_cut_hz,
        order,
        sample_rate,
        filter.sections().len()
    );
    Ok(filter)
}

/// Design a Butterworth lowpass filter with unity DC gain
pub fn butter_lowpass(cutoff_hz: f64, order: usize, sample_rate: u32) -> Result<SosFilter> {
    check_order(order)?;
    let warped = prewarp(normalized_cutoff(cutoff_hz, sample_rate)?);
    let analog: Vec<Complex<f64>> = prototype_poles(order)
        .into_iter()
        .map(|p| p * warped)
        .collect();

    let filter = assemble(&analog, Response::Lowpass, 0.0);
    debug!(
        "Designed Butterworth lowpass {} Hz, order {} at {} Hz",
        cutoff_hz, order, sample_rate
    );
    Ok(filter)
}

/// Design a Butterworth highpass filter with unity gain at Nyquist
pub fn butter_highpass(cutoff_hz: f64, order: usize, sample_rate: u32) -> Result<SosFilter> {
    check_order(order)?;
    let warped = prewarp(normalized_cutoff(cutoff_hz, sample_rate)?);
    let analog: Vec<Complex<f64>> = prototype_poles(order)
        .into_iter()
        .map(|p| Complex::new(warped, 0.0) / p)
        .collect();

    let filter = assemble(&analog, Response::Highpass, PI);
    debug!(
        "Designed Butterworth highpass {} Hz, order {} at {} Hz",
        cutoff_hz, order, sample_rate
    );
    Ok(filter)
}

/// Convert a cutoff in Hz to a fraction of Nyquist, rejecting anything
/// outside the open interval (0, 1)
pub fn normalized_cutoff(freq_hz: f64, sample_rate: u32) -> Result<f64> {
    if sample_rate == 0 {
        return Err(DspError::invalid_spec("sample rate must be positive"));
    }
    let nyquist = f64::from(sample_rate) / 2.0;
    let normalized = freq_hz / nyquist;
    if !normalized.is_finite() || normalized <= 0.0 || normalized >= 1.0 {
        return Err(DspError::invalid_spec(format!(
            "cutoff {} Hz must lie strictly between 0 and Nyquist ({} Hz)",
            freq_hz, nyquist
        )));
    }
    Ok(normalized)
}

fn check_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(DspError::invalid_spec("filter order must be at least 1"));
    }
    Ok(())
}

/// Pre-warp a normalized cutoff for the bilinear transform
fn prewarp(normalized: f64) -> f64 {
    BILINEAR_K * (PI * normalized / 2.0).tan()
}

/// Left-half-plane poles of the unit-cutoff analog Butterworth prototype
fn prototype_poles(order: usize) -> Vec<Complex<f64>> {
    let n = order as f64;
    (0..order)
        .map(|k| {
            let m = 2.0 * k as f64 - n + 1.0;
            -Complex::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect()
}

/// Bilinear-map analog poles, pair them into sections, attach the zeros of
/// the response type and normalize gain at `reference` (radians/sample)
fn assemble(analog: &[Complex<f64>], response: Response, reference: f64) -> SosFilter {
    let k = Complex::new(BILINEAR_K, 0.0);
    let digital: Vec<Complex<f64>> = analog.iter().map(|&p| (k + p) / (k - p)).collect();

    let mut complex_poles: Vec<Complex<f64>> = digital
        .iter()
        .copied()
        .filter(|p| p.im > REAL_POLE_TOLERANCE)
        .collect();
    let mut real_poles: Vec<f64> = digital
        .iter()
        .filter(|p| p.im.abs() <= REAL_POLE_TOLERANCE)
        .map(|p| p.re)
        .collect();
    complex_poles.sort_by(|a, b| a.norm().total_cmp(&b.norm()));
    real_poles.sort_by(|a, b| a.abs().total_cmp(&b.abs()));

    let mut sections = Vec::with_capacity(digital.len().div_ceil(2));
    for chunk in real_poles.chunks(2) {
        match *chunk {
            [r1, r2] => sections.push(SecondOrderSection::new(
                numerator(response, false),
                [1.0, -(r1 + r2), r1 * r2],
            )),
            [r] => sections.push(SecondOrderSection::new(
                numerator(response, true),
                [1.0, -r, 0.0],
            )),
            _ => {}
        }
    }
    // Poles closest to the unit circle go last
    for p in complex_poles {
        sections.push(SecondOrderSection::new(
            numerator(response, false),
            [1.0, -2.0 * p.re, p.norm_sqr()],
        ));
    }

    let mut filter = SosFilter::new(sections);
    let gain = filter.response(reference).norm();
    if gain > 0.0 && gain.is_finite() {
        filter.scale(1.0 / gain);
    }
    filter
}

/// Section numerator: zeros at z = -1 (lowpass), z = +1 (highpass) or one of
/// each (bandpass)
fn numerator(response: Response, first_order: bool) -> [f64; 3] {
    match (response, first_order) {
        (Response::Lowpass, false) => [1.0, 2.0, 1.0],
        (Response::Lowpass, true) => [1.0, 1.0, 0.0],
        (Response::Highpass, false) => [1.0, -2.0, 1.0],
        (Response::Highpass, true) => [1.0, -1.0, 0.0],
        (Response::Bandpass, _) => [1.0, 0.0, -1.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 22_050;

    fn db(mag: f64) -> f64 {
        20.0 * mag.log10()
    }

    #[test]
    fn prototype_poles_lie_on_unit_circle_in_left_half_plane() {
        for order in 1..=6 {
            let poles = prototype_poles(order);
            assert_eq!(poles.len(), order);
            for p in poles {
                assert!((p.norm() - 1.0).abs() < 1e-12);
                assert!(p.re < 0.0);
            }
        }
    }

    #[test]
    fn bandpass_has_order_sections_and_is_stable() {
        let filter = butter_bandpass(60.0, 5000.0, 4, SR).unwrap();
        assert_eq!(filter.sections().len(), 4);
        assert!(filter.is_stable());
        for s in filter.sections() {
            // Zeros at DC and Nyquist
            assert_eq!(s.b1, 0.0);
            assert!((s.b0 + s.b2).abs() < 1e-15);
        }
    }

    #[test]
    fn bandpass_edges_are_minus_3db() {
        let filter = butter_bandpass(60.0, 5000.0, 4, SR).unwrap();
        assert!((db(filter.magnitude_at(60.0, SR)) + 3.0103).abs() < 0.01);
        assert!((db(filter.magnitude_at(5000.0, SR)) + 3.0103).abs() < 0.01);
    }

    #[test]
    fn bandpass_passband_and_stopband() {
        let filter = butter_bandpass(60.0, 5000.0, 4, SR).unwrap();
        for freq in [200.0, 550.0, 1000.0, 2000.0] {
            let mag = filter.magnitude_at(freq, SR);
            assert!(mag > 0.97 && mag < 1.0 + 1e-9, "{} Hz: {}", freq, mag);
        }
        assert!(filter.magnitude_at(10.0, SR) < 0.01);
        assert!(filter.magnitude_at(10_000.0, SR) < 0.01);
        assert!(filter.magnitude_at(0.0, SR) < 1e-9);
    }

    #[test]
    fn odd_order_bandpass() {
        let filter = butter_bandpass(300.0, 3000.0, 3, 44_100).unwrap();
        assert_eq!(filter.sections().len(), 3);
        assert!(filter.is_stable());
        assert!((db(filter.magnitude_at(300.0, 44_100)) + 3.0103).abs() < 0.01);
    }

    #[test]
    fn lowpass_half_nyquist() {
        let filter = butter_lowpass(SR as f64 / 4.0, 2, SR).unwrap();
        assert_eq!(filter.sections().len(), 1);
        let s = filter.sections()[0];
        // Classic 2nd-order Butterworth at 0.5 Nyquist
        assert!((s.b0 - 0.292893).abs() < 1e-5);
        assert!((s.b1 - 0.585786).abs() < 1e-5);
        assert!(s.a1.abs() < 1e-12);
        assert!((s.a2 - 0.171573).abs() < 1e-5);
        assert!((filter.magnitude_at(0.0, SR) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn odd_order_lowpass_uses_first_order_section() {
        let filter = butter_lowpass(1000.0, 3, 48_000).unwrap();
        assert_eq!(filter.sections().len(), 2);
        assert!(filter.is_stable());
        assert_eq!(filter.sections()[0].a2, 0.0);
        assert!((db(filter.magnitude_at(1000.0, 48_000)) + 3.0103).abs() < 0.01);
    }

    #[test]
    fn highpass_response() {
        let filter = butter_highpass(1000.0, 4, 48_000).unwrap();
        assert!(filter.is_stable());
        assert!((filter.magnitude_at(24_000.0, 48_000) - 1.0).abs() < 1e-9);
        assert!((db(filter.magnitude_at(1000.0, 48_000)) + 3.0103).abs() < 0.01);
        assert!(filter.magnitude_at(50.0, 48_000) < 1e-4);
    }

    #[test]
    fn rejects_invalid_bands() {
        let cases = [
            (5000.0, 60.0, 4, SR),     // inverted
            (60.0, 60.0, 4, SR),       // empty
            (0.0, 5000.0, 4, SR),      // zero low edge
            (60.0, 11_025.0, 4, SR),   // at Nyquist
            (60.0, 5000.0, 4, 8_000),  // band above Nyquist
            (60.0, 5000.0, 0, SR),     // zero order
            (f64::NAN, 5000.0, 4, SR), // non-finite
        ];
        for (low, high, order, sr) in cases {
            assert!(
                matches!(
                    butter_bandpass(low, high, order, sr),
                    Err(DspError::InvalidSpec(_))
                ),
                "{} {} {} {}",
                low,
                high,
                order,
                sr
            );
        }
    }

    #[test]
    fn rejects_zero_sample_rate() {
        assert!(matches!(
            normalized_cutoff(100.0, 0),
            Err(DspError::InvalidSpec(_))
        ));
    }
}
