//! Offline voice renderer: noise and sine sources, biquad filters and
//! automation curves, mixed into one mono buffer.

use std::f32::consts::TAU;

/// How a control point is approached from the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Set,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub time: f32,
    pub value: f32,
    pub ramp: Ramp,
}

/// A value over time, described by control points in time order.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    points: Vec<ControlPoint>,
}

impl Param {
    /// Starts at `value` at time zero.
    pub fn starting_at(value: f32) -> Self {
        Self {
            points: vec![ControlPoint {
                time: 0.0,
                value,
                ramp: Ramp::Set,
            }],
        }
    }

    pub fn linear_to(mut self, value: f32, time: f32) -> Self {
        self.points.push(ControlPoint {
            time,
            value,
            ramp: Ramp::Linear,
        });
        self
    }

    pub fn exponential_to(mut self, value: f32, time: f32) -> Self {
        self.points.push(ControlPoint {
            time,
            value,
            ramp: Ramp::Exponential,
        });
        self
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn peak(&self) -> f32 {
        self.points.iter().map(|p| p.value).fold(0.0, f32::max)
    }

    pub fn value_at(&self, t: f32) -> f32 {
        let next = self.points.iter().position(|p| p.time > t);
        let Some(next) = next else {
            return self.points.last().map_or(0.0, |p| p.value);
        };
        if next == 0 {
            return self.points[0].value;
        }

        let from = self.points[next - 1];
        let to = self.points[next];
        let progress = (t - from.time) / (to.time - from.time);

        match to.ramp {
            Ramp::Set => from.value,
            Ramp::Linear => from.value + (to.value - from.value) * progress,
            // a ramp can't start from zero or cross it; hold instead
            Ramp::Exponential if from.value * to.value <= 0.0 => from.value,
            Ramp::Exponential => from.value * (to.value / from.value).powf(progress),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Lowpass,
    Highpass,
    Bandpass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub frequency: Param,
    /// Resonance in dB for low/high-pass, bandwidth Q for band-pass.
    pub q: f32,
}

impl FilterSpec {
    pub fn new(kind: FilterKind, frequency: Param, q: f32) -> Self {
        Self { kind, frequency, q }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    WhiteNoise,
    Sine { frequency: Param },
}

/// One sound layer: source, filter chain and gain envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    /// Seconds after the sound's start.
    pub offset: f32,
    pub duration: f32,
    pub source: Source,
    pub filters: Vec<FilterSpec>,
    pub gain: Param,
}

impl Voice {
    pub fn end(&self) -> f32 {
        self.offset + self.duration
    }
}

/// Filter coefficients are refreshed this often while frequencies sweep.
const CONTROL_BLOCK: usize = 64;

#[derive(Default)]
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    fn tune(&mut self, kind: FilterKind, frequency: f32, q: f32, sample_rate: f32) {
        let frequency = frequency.clamp(10.0, sample_rate * 0.49);
        let w0 = TAU * frequency / sample_rate;
        let (sin, cos) = w0.sin_cos();

        let (b0, b1, b2, alpha) = match kind {
            FilterKind::Lowpass => {
                let alpha = sin / (2.0 * 10f32.powf(q / 20.0));
                ((1.0 - cos) / 2.0, 1.0 - cos, (1.0 - cos) / 2.0, alpha)
            }
            FilterKind::Highpass => {
                let alpha = sin / (2.0 * 10f32.powf(q / 20.0));
                ((1.0 + cos) / 2.0, -(1.0 + cos), (1.0 + cos) / 2.0, alpha)
            }
            FilterKind::Bandpass => {
                let alpha = sin / (2.0 * q.max(1e-4));
                (alpha, 0.0, -alpha, alpha)
            }
        };

        let a0 = 1.0 + alpha;
        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = -2.0 * cos / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2 - self.a1 * self.y1 - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Mixes `voices` into one mono buffer, hard-clipped to [-1, 1].
pub fn render(voices: &[Voice], sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate as f32;
    let end = voices.iter().map(Voice::end).fold(0.0, f32::max);
    let mut mix = vec![0.0f32; (end * rate).round() as usize];

    for voice in voices {
        let start = (voice.offset * rate).round() as usize;
        let len = (voice.duration * rate) as usize;
        let mut filters: Vec<Biquad> = voice.filters.iter().map(|_| Biquad::default()).collect();
        let mut phase = 0.0f32;

        for i in 0..len {
            let Some(out) = mix.get_mut(start + i) else {
                break;
            };
            let t = i as f32 / rate;

            if i % CONTROL_BLOCK == 0 {
                for (filter, spec) in filters.iter_mut().zip(&voice.filters) {
                    filter.tune(spec.kind, spec.frequency.value_at(t), spec.q, rate);
                }
            }

            let mut sample = match &voice.source {
                Source::WhiteNoise => fastrand::f32() * 2.0 - 1.0,
                Source::Sine { frequency } => {
                    let s = phase.sin();
                    phase = (phase + TAU * frequency.value_at(t) / rate) % TAU;
                    s
                }
            };
            for filter in &mut filters {
                sample = filter.process(sample);
            }

            *out += sample * voice.gain.value_at(t);
        }
    }

    for sample in &mut mix {
        *sample = sample.clamp(-1.0, 1.0);
    }
    mix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_and_exponential_ramps() {
        let param = Param::starting_at(0.0).linear_to(1.0, 0.1).exponential_to(0.01, 1.1);

        assert_eq!(param.value_at(0.0), 0.0);
        assert!((param.value_at(0.05) - 0.5).abs() < 1e-6);
        assert!((param.value_at(0.1) - 1.0).abs() < 1e-6);
        // halfway through an exponential ramp is the geometric mean
        assert!((param.value_at(0.6) - 0.1).abs() < 1e-4);
        assert_eq!(param.value_at(5.0), 0.01);
    }

    #[test]
    fn exponential_ramp_from_zero_holds() {
        let param = Param::starting_at(0.0).exponential_to(1.0, 1.0);
        assert_eq!(param.value_at(0.5), 0.0);
        assert_eq!(param.value_at(1.0), 1.0);
    }

    #[test]
    fn render_length_covers_every_voice() {
        let voices = [
            Voice {
                offset: 0.0,
                duration: 0.1,
                source: Source::WhiteNoise,
                filters: vec![],
                gain: Param::starting_at(0.5),
            },
            Voice {
                offset: 0.2,
                duration: 0.1,
                source: Source::Sine {
                    frequency: Param::starting_at(440.0),
                },
                filters: vec![],
                gain: Param::starting_at(0.5),
            },
        ];
        let samples = render(&voices, 1000);
        assert_eq!(samples.len(), 300);
        // gap between the two voices stays silent
        assert!(samples[120..190].iter().all(|&s| s == 0.0));
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn lowpass_tames_noise() {
        let noise = |filters: Vec<FilterSpec>| Voice {
            offset: 0.0,
            duration: 1.0,
            source: Source::WhiteNoise,
            filters,
            gain: Param::starting_at(1.0),
        };
        let energy = |samples: Vec<f32>| samples.iter().map(|s| s * s).sum::<f32>();

        let raw = energy(render(&[noise(vec![])], 8000));
        let filtered = energy(render(
            &[noise(vec![FilterSpec::new(FilterKind::Lowpass, Param::starting_at(100.0), 0.0)])],
            8000,
        ));
        assert!(filtered < raw * 0.2);
    }

    #[test]
    fn bandpass_passes_its_center() {
        let tone = |filter: FilterKind, center: f32| Voice {
            offset: 0.0,
            duration: 0.5,
            source: Source::Sine {
                frequency: Param::starting_at(1000.0),
            },
            filters: vec![FilterSpec::new(filter, Param::starting_at(center), 1.0)],
            gain: Param::starting_at(0.5),
        };
        let peak = |samples: Vec<f32>| samples[2000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));

        let on_center = peak(render(&[tone(FilterKind::Bandpass, 1000.0)], 8000));
        let off_center = peak(render(&[tone(FilterKind::Bandpass, 100.0)], 8000));
        assert!(on_center > 0.4);
        assert!(off_center < 0.15);
    }
}
