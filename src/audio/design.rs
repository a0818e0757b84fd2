//! Voice layouts for each sound effect
//!
//! Gains are `volume * level * depth_volume`; every envelope decays to
//! [`DECAY_FLOOR`] rather than zero so the exponential ramps stay defined.

use super::synth::{FilterKind, FilterSpec, Param, Source, Voice};
use crate::depth::MIN_DEPTH;

pub const DECAY_FLOOR: f32 = 0.001;

pub const MIN_LAUNCH_DURATION: f32 = 0.5;
pub const MAX_LAUNCH_DURATION: f32 = 3.0;

pub const EXPLOSION_DURATION: f32 = 1.2;
pub const ECHO_DELAY: f32 = 0.08;
pub const ECHO_DURATION: f32 = 0.8;
pub const BASS_DURATION: f32 = 0.6;

pub const CRACKLE_WINDOW: f32 = 1.2;

fn nearness(depth: f32) -> f32 {
    ((depth - MIN_DEPTH) / (1.0 - MIN_DEPTH)).max(0.0)
}

/// Launch whoosh falls off steeply with distance.
pub fn launch_depth_volume(depth: f32) -> f32 {
    nearness(depth).powf(1.8)
}

pub fn explosion_depth_volume(depth: f32) -> f32 {
    0.02 + (depth - MIN_DEPTH) * (0.9 / 0.7)
}

pub fn crackle_depth_volume(depth: f32) -> f32 {
    nearness(depth).powf(1.5)
}

fn noise(offset: f32, duration: f32, filters: Vec<FilterSpec>, gain: Param) -> Voice {
    Voice {
        offset,
        duration,
        source: Source::WhiteNoise,
        filters,
        gain,
    }
}

fn sweep(from: f32, to: f32, duration: f32) -> Param {
    Param::starting_at(from).exponential_to(to, duration)
}

/// Filtered noise "whoosh" lasting about as long as the flight.
pub fn launch(duration: f32, depth: f32, volume: f32) -> Vec<Voice> {
    let duration = duration.clamp(MIN_LAUNCH_DURATION, MAX_LAUNCH_DURATION);
    let peak = volume * 0.5 * launch_depth_volume(depth);

    vec![noise(
        0.0,
        duration,
        vec![
            FilterSpec::new(FilterKind::Bandpass, sweep(300.0, 150.0, duration), 1.5),
            FilterSpec::new(FilterKind::Lowpass, sweep(800.0, 400.0, duration), 0.5),
        ],
        Param::starting_at(0.0)
            .linear_to(peak, 0.03)
            .exponential_to(DECAY_FLOOR, duration),
    )]
}

/// Bang, delayed echo and a falling bass thump.
pub fn explosion(depth: f32, volume: f32) -> Vec<Voice> {
    let level = volume * explosion_depth_volume(depth);

    let bang = noise(
        0.0,
        EXPLOSION_DURATION,
        vec![FilterSpec::new(
            FilterKind::Bandpass,
            sweep(1000.0, 100.0, EXPLOSION_DURATION),
            1.0,
        )],
        Param::starting_at(0.0)
            .linear_to(level * 5.0, 0.01)
            .exponential_to(level * 1.5, 0.15)
            .exponential_to(DECAY_FLOOR, EXPLOSION_DURATION),
    );

    let echo = noise(
        ECHO_DELAY,
        ECHO_DURATION,
        vec![FilterSpec::new(
            FilterKind::Lowpass,
            sweep(500.0, 80.0, ECHO_DURATION),
            0.5,
        )],
        Param::starting_at(0.0)
            .linear_to(level * 0.8, 0.05)
            .exponential_to(DECAY_FLOOR, ECHO_DURATION),
    );

    let bass = Voice {
        offset: 0.0,
        duration: BASS_DURATION,
        source: Source::Sine {
            frequency: sweep(80.0, 30.0, BASS_DURATION),
        },
        filters: Vec::new(),
        gain: Param::starting_at(0.0)
            .linear_to(level * 4.5, 0.02)
            .linear_to(level * 2.0, 0.15)
            .exponential_to(DECAY_FLOOR, BASS_DURATION),
    };

    vec![bang, echo, bass]
}

/// Scattered bright pops over a soft low rumble.
pub fn crackle(depth: f32, volume: f32) -> Vec<Voice> {
    let level = volume * crackle_depth_volume(depth);
    let pops = 8 + fastrand::usize(0..5);

    let mut voices: Vec<Voice> = (0..pops)
        .map(|_| {
            let offset = fastrand::f32() * CRACKLE_WINDOW * 0.8;
            let duration = 0.05 + fastrand::f32() * 0.08;
            let highpass = 2000.0 + fastrand::f32() * 2000.0;
            let bandpass = 3000.0 + fastrand::f32() * 3000.0;
            let peak = level * (0.3 + fastrand::f32() * 0.4);

            noise(
                offset,
                duration,
                vec![
                    FilterSpec::new(FilterKind::Highpass, Param::starting_at(highpass), 0.5),
                    FilterSpec::new(FilterKind::Bandpass, Param::starting_at(bandpass), 2.0),
                ],
                Param::starting_at(0.0)
                    .linear_to(peak, 0.005)
                    .exponential_to(DECAY_FLOOR, duration),
            )
        })
        .collect();

    let rumble_duration = CRACKLE_WINDOW * 0.8;
    voices.push(noise(
        0.1,
        rumble_duration,
        vec![FilterSpec::new(
            FilterKind::Lowpass,
            sweep(400.0, 100.0, rumble_duration),
            0.5,
        )],
        Param::starting_at(0.0)
            .linear_to(level * 0.15, 0.1)
            .exponential_to(DECAY_FLOOR, rumble_duration),
    ));

    voices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::synth::Ramp;

    #[test]
    fn depth_curves_are_distinct() {
        assert_eq!(launch_depth_volume(0.3), 0.0);
        assert!((launch_depth_volume(1.0) - 1.0).abs() < 1e-6);
        assert!((explosion_depth_volume(0.3) - 0.02).abs() < 1e-6);
        assert!((explosion_depth_volume(1.0) - 0.92).abs() < 1e-5);
        assert!((crackle_depth_volume(1.0) - 1.0).abs() < 1e-6);

        let mid = 0.65;
        assert!(launch_depth_volume(mid) < crackle_depth_volume(mid));
        assert!(crackle_depth_volume(mid) < explosion_depth_volume(mid));
    }

    #[test]
    fn launch_duration_is_clamped() {
        assert_eq!(launch(0.1, 1.0, 1.0)[0].duration, MIN_LAUNCH_DURATION);
        assert_eq!(launch(9.0, 1.0, 1.0)[0].duration, MAX_LAUNCH_DURATION);
        assert_eq!(launch(1.7, 1.0, 1.0)[0].duration, 1.7);
    }

    use Ramp::{Exponential, Linear, Set};

    fn assert_points(param: &Param, expected: &[(f32, f32, Ramp)]) {
        let points = param.points();
        assert_eq!(points.len(), expected.len(), "{points:?}");
        for (point, &(time, value, ramp)) in points.iter().zip(expected) {
            assert!(
                (point.time - time).abs() < 1e-5 && (point.value - value).abs() < 1e-5 && point.ramp == ramp,
                "{point:?} != ({time}, {value}, {ramp:?})"
            );
        }
    }

    fn assert_filter(filter: &FilterSpec, kind: FilterKind, from: f32, to: f32, end: f32, q: f32) {
        assert_eq!(filter.kind, kind);
        assert_points(&filter.frequency, &[(0.0, from, Set), (end, to, Exponential)]);
        assert_eq!(filter.q, q);
    }

    #[test]
    fn launch_envelope_points() {
        let voice = &launch(2.0, 1.0, 0.4)[0];

        assert_eq!((voice.offset, voice.duration), (0.0, 2.0));
        assert_points(
            &voice.gain,
            &[(0.0, 0.0, Set), (0.03, 0.2, Linear), (2.0, DECAY_FLOOR, Exponential)],
        );
        assert_eq!(voice.filters.len(), 2);
        assert_filter(&voice.filters[0], FilterKind::Bandpass, 300.0, 150.0, 2.0, 1.5);
        assert_filter(&voice.filters[1], FilterKind::Lowpass, 800.0, 400.0, 2.0, 0.5);
    }

    #[test]
    fn launch_is_silent_at_the_far_plane() {
        let voice = &launch(1.0, MIN_DEPTH, 1.0)[0];
        assert_eq!(voice.gain.points()[1].value, 0.0);
    }

    #[test]
    fn explosion_has_three_voices() {
        let voices = explosion(1.0, 1.0);
        assert_eq!(voices.len(), 3);

        let [bang, echo, bass] = [&voices[0], &voices[1], &voices[2]];
        assert_eq!(bang.duration, EXPLOSION_DURATION);
        assert_eq!(echo.offset, ECHO_DELAY);
        assert!(echo.gain.peak() < bang.gain.peak());
        assert!(matches!(bass.source, Source::Sine { .. }));

        // attack, plateau, decay
        let ramps: Vec<Ramp> = bass.gain.points().iter().map(|p| p.ramp).collect();
        assert_eq!(ramps, [Set, Linear, Linear, Exponential]);
    }

    #[test]
    fn explosion_voice_shapes() {
        let (depth, volume) = (0.8, 0.5);
        let level = volume * explosion_depth_volume(depth);
        let voices = explosion(depth, volume);
        let [bang, echo, bass] = [&voices[0], &voices[1], &voices[2]];

        assert_eq!(bang.offset, 0.0);
        assert!(matches!(bang.source, Source::WhiteNoise));
        assert_points(
            &bang.gain,
            &[
                (0.0, 0.0, Set),
                (0.01, level * 5.0, Linear),
                (0.15, level * 1.5, Exponential),
                (EXPLOSION_DURATION, DECAY_FLOOR, Exponential),
            ],
        );
        assert_eq!(bang.filters.len(), 1);
        assert_filter(&bang.filters[0], FilterKind::Bandpass, 1000.0, 100.0, EXPLOSION_DURATION, 1.0);

        assert_eq!((echo.offset, echo.duration), (ECHO_DELAY, ECHO_DURATION));
        assert!(matches!(echo.source, Source::WhiteNoise));
        assert_points(
            &echo.gain,
            &[(0.0, 0.0, Set), (0.05, level * 0.8, Linear), (ECHO_DURATION, DECAY_FLOOR, Exponential)],
        );
        assert_eq!(echo.filters.len(), 1);
        assert_filter(&echo.filters[0], FilterKind::Lowpass, 500.0, 80.0, ECHO_DURATION, 0.5);

        assert_eq!((bass.offset, bass.duration), (0.0, BASS_DURATION));
        assert!(bass.filters.is_empty());
        let Source::Sine { frequency } = &bass.source else {
            panic!("bass should be a sine, got {:?}", bass.source);
        };
        assert_points(frequency, &[(0.0, 80.0, Set), (BASS_DURATION, 30.0, Exponential)]);
        assert_points(
            &bass.gain,
            &[
                (0.0, 0.0, Set),
                (0.02, level * 4.5, Linear),
                (0.15, level * 2.0, Linear),
                (BASS_DURATION, DECAY_FLOOR, Exponential),
            ],
        );
    }

    #[test]
    fn envelopes_never_target_zero() {
        let all = [launch(1.0, 0.9, 1.0), explosion(0.9, 1.0), crackle(0.9, 1.0)];
        for voice in all.iter().flatten() {
            let last = voice.gain.points().last().unwrap();
            assert_eq!(last.value, DECAY_FLOOR);
            assert_eq!(last.time, voice.duration);
        }
    }

    #[test]
    fn crackle_layout() {
        for _ in 0..20 {
            let voices = crackle(1.0, 1.0);
            let (pops, rumble) = voices.split_at(voices.len() - 1);

            assert!((8..=12).contains(&pops.len()));
            for pop in pops {
                assert!(pop.offset >= 0.0 && pop.offset < CRACKLE_WINDOW);
                assert!(pop.duration >= 0.05 && pop.duration <= 0.13);
                assert_eq!(pop.filters.len(), 2);
            }
            assert!(rumble[0].duration > 0.5);
            assert_eq!(rumble[0].filters[0].kind, FilterKind::Lowpass);
        }
    }

    #[test]
    fn crackle_voice_shapes() {
        let volume = 0.6;
        let level = volume * crackle_depth_volume(1.0);

        for _ in 0..20 {
            let voices = crackle(1.0, volume);
            let (pops, rumble) = voices.split_at(voices.len() - 1);

            for pop in pops {
                assert!(matches!(pop.source, Source::WhiteNoise));
                let gain = pop.gain.points();
                assert_eq!(gain.len(), 3);
                assert_eq!((gain[0].time, gain[0].value, gain[0].ramp), (0.0, 0.0, Set));
                assert_eq!((gain[1].time, gain[1].ramp), (0.005, Linear));
                assert!(gain[1].value >= level * 0.3 - 1e-6 && gain[1].value <= level * 0.7 + 1e-6);
                assert_eq!((gain[2].time, gain[2].value, gain[2].ramp), (pop.duration, DECAY_FLOOR, Exponential));

                let [highpass, bandpass] = [&pop.filters[0], &pop.filters[1]];
                assert_eq!((highpass.kind, highpass.q), (FilterKind::Highpass, 0.5));
                let cutoff = highpass.frequency.points();
                assert_eq!(cutoff.len(), 1);
                assert!((2000.0..=4000.0).contains(&cutoff[0].value));

                assert_eq!((bandpass.kind, bandpass.q), (FilterKind::Bandpass, 2.0));
                let center = bandpass.frequency.points();
                assert_eq!(center.len(), 1);
                assert!((3000.0..=6000.0).contains(&center[0].value));
            }

            let rumble = &rumble[0];
            let window = CRACKLE_WINDOW * 0.8;
            assert_eq!((rumble.offset, rumble.duration), (0.1, window));
            assert_points(
                &rumble.gain,
                &[(0.0, 0.0, Set), (0.1, level * 0.15, Linear), (window, DECAY_FLOOR, Exponential)],
            );
            assert_eq!(rumble.filters.len(), 1);
            assert_filter(&rumble.filters[0], FilterKind::Lowpass, 400.0, 100.0, window, 0.5);
        }
    }
}
