//! Preisach-Inspired Hysteresis Saturation
//!
//! Approximates the magnetic memory of a transformer core with an
//! exponentially weighted moving average over the last few drive-scaled
//! samples, then shapes that average with separate odd- and even-order
//! terms and an asymmetric skew.
//!
//! # Algorithm
//!
//! For every call to [`HysteresisModel::process`]:
//! 1. `x = input * drive` is pushed into a 10-entry history (index 0 = newest)
//! 2. `avg = Σ w_i·h_i / Σ w_i` with `w_i = exp(-i·width)`
//! 3. `odd = tanh(|avg|·odd_harmonics)`, `even = |avg|²·sign·even_harmonics`
//! 4. `out = (odd + even)·(1 + skew·sign)`
//!
//! Larger `width` forgets faster (less lag). `width = 0` is a plain 10-tap
//! moving average.
//!
//! The even term is quadratic and unbounded. With a hot drive it expands
//! instead of compressing; that is part of the character and is left as is.

/// Number of past samples the model remembers
pub const HISTORY_LEN: usize = 10;

/// Default shaping values of a freshly constructed model
const DEFAULT_WIDTH: f32 = 0.2;
const DEFAULT_SKEW: f32 = 0.1;
const DEFAULT_EVEN_HARMONICS: f32 = 0.3;
const DEFAULT_ODD_HARMONICS: f32 = 1.0;

/// One channel's saturation state
///
/// Plain value type: each channel owns one, nothing is shared.
#[derive(Debug, Clone)]
pub struct HysteresisModel {
    /// Ring storage. `head` points at the newest entry and moves backwards,
    /// so lag `i` lives at `(head + i) % HISTORY_LEN`.
    history: [f32; HISTORY_LEN],
    head: usize,

    /// `exp(-i·width)` for each lag, refreshed whenever width changes
    weights: [f32; HISTORY_LEN],
    weight_sum: f32,

    width: f32,
    skew: f32,
    even_harmonics: f32,
    odd_harmonics: f32,
}

impl HysteresisModel {
    pub fn new() -> Self {
        let mut model = Self {
            history: [0.0; HISTORY_LEN],
            head: 0,
            weights: [0.0; HISTORY_LEN],
            weight_sum: 0.0,
            width: DEFAULT_WIDTH,
            skew: DEFAULT_SKEW,
            even_harmonics: DEFAULT_EVEN_HARMONICS,
            odd_harmonics: DEFAULT_ODD_HARMONICS,
        };
        model.refresh_weights();
        model
    }

    /// Clear the history to silence
    pub fn reset(&mut self) {
        self.history = [0.0; HISTORY_LEN];
        self.head = 0;
    }

    /// Set memory decay (`width`) and positive/negative asymmetry (`skew`)
    pub fn set_density_params(&mut self, width: f32, skew: f32) {
        if width != self.width {
            self.width = width;
            self.refresh_weights();
        }
        self.skew = skew;
    }

    /// Set the amount of even (asymmetric) and odd (symmetric) shaping
    pub fn set_harmonics(&mut self, even_harmonics: f32, odd_harmonics: f32) {
        self.even_harmonics = even_harmonics;
        self.odd_harmonics = odd_harmonics;
    }

    /// Saturate one sample
    ///
    /// # Real-time Safety
    /// No allocations, no syscalls, O(1) time.
    #[inline]
    pub fn process(&mut self, input: f32, drive: f32) -> f32 {
        self.push(input * drive);
        self.shape(self.weighted_average())
    }

    /// Weighted mean of the current history, the hysteresis proxy
    #[inline]
    pub fn weighted_average(&self) -> f32 {
        if self.weight_sum <= 0.0 {
            return 0.0;
        }

        let mut weighted = 0.0;
        for (lag, weight) in self.weights.iter().enumerate() {
            weighted += self.history[(self.head + lag) % HISTORY_LEN] * weight;
        }
        weighted / self.weight_sum
    }

    /// Harmonic shaping and skew applied to an averaged value
    #[inline]
    pub fn shape(&self, average: f32) -> f32 {
        let sign = if average >= 0.0 { 1.0 } else { -1.0 };
        let magnitude = average.abs();

        let odd = (magnitude * self.odd_harmonics).tanh();
        let even = magnitude * magnitude * sign * self.even_harmonics;

        (odd + even) * (1.0 + self.skew * sign)
    }

    /// History ordered newest first
    pub fn history(&self) -> [f32; HISTORY_LEN] {
        core::array::from_fn(|lag| self.history[(self.head + lag) % HISTORY_LEN])
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn skew(&self) -> f32 {
        self.skew
    }

    pub fn even_harmonics(&self) -> f32 {
        self.even_harmonics
    }

    pub fn odd_harmonics(&self) -> f32 {
        self.odd_harmonics
    }

    /// Rebuild `exp(-i·width)` and its sum for the current width
    fn refresh_weights(&mut self) {
        let mut sum = 0.0;
        for (i, weight) in self.weights.iter_mut().enumerate() {
            *weight = (-(i as f32) * self.width).exp();
            sum += *weight;
        }
        self.weight_sum = sum;
    }

    #[inline]
    fn push(&mut self, value: f32) {
        // Step back one slot; the oldest entry is overwritten
        self.head = (self.head + HISTORY_LEN - 1) % HISTORY_LEN;
        self.history[self.head] = value;
    }
}

impl Default for HysteresisModel {
    fn default() -> Self {
        Self::new()
    }
}
