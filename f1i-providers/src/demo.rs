//! Demo provider that generates synthetic sessions for testing
//!
//! Simulates laps around a circuit with straights, braking zones, corners,
//! and acceleration phases. Every driver has a base pace plus per-segment
//! strengths, so different drivers win different parts of the lap. Output is
//! deterministic for a given session key.
//!
//! Rows carry speed and position but no distance, like raw car data from the
//! timing feed, so consumers have to integrate distance themselves.

use f1i_core::model::{EventId, Lap, RawSample, SessionKey, SessionKind};
use f1i_core::provider::{ProviderError, SessionProvider};
use f1i_core::units::Seconds;
use std::collections::hash_map::DefaultHasher;
use std::f64::consts::TAU;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Telemetry sample interval in seconds (~4 Hz, like the car data stream)
const SAMPLE_INTERVAL: f64 = 0.25;

/// Resolution of the precomputed centerline in meters
const CENTERLINE_STEP: f64 = 5.0;

/// Rounds on the demo calendar
const CALENDAR_ROUNDS: u32 = 24;

/// First season with position data in the timing feed
const FIRST_TELEMETRY_SEASON: u16 = 2018;

/// Session clock at the start of the first lap
const SESSION_START: f64 = 3600.0;

// =============================================================================
// Track definition: a sequence of segments that form a lap
// =============================================================================

#[derive(Clone, Copy)]
enum SegmentKind {
    Straight, // Full throttle, top speed
    Braking,  // Heavy braking into a corner
    Corner,   // Constant-ish speed cornering
    Accel,    // Accelerating out of a corner
}

#[derive(Clone, Copy)]
struct TrackSegment {
    kind: SegmentKind,
    length: f64,       // meters
    target_speed: f64, // m/s at end of segment
    turn: f64,         // heading change in radians (signed: + = left)
}

/// A ~5 km circuit: mix of slow and fast corners and three long straights
fn demo_track() -> Vec<TrackSegment> {
    use SegmentKind::*;
    let seg = |kind, length, target_speed, turn| TrackSegment {
        kind,
        length,
        target_speed,
        turn,
    };

    vec![
        // Start/finish straight
        seg(Straight, 780.0, 88.0, 0.0),
        // T1: heavy braking into slow right-hander
        seg(Braking, 120.0, 30.0, -0.05),
        seg(Corner, 110.0, 27.0, -1.6),
        seg(Accel, 200.0, 60.0, -0.15),
        // Short straight
        seg(Straight, 300.0, 74.0, 0.0),
        // T2: fast left-hander
        seg(Braking, 70.0, 62.0, 0.05),
        seg(Corner, 220.0, 60.0, 1.1),
        seg(Accel, 180.0, 72.0, 0.1),
        // Back straight
        seg(Straight, 900.0, 91.0, 0.0),
        // T3: chicane, quick right-left
        seg(Braking, 110.0, 38.0, -0.05),
        seg(Corner, 70.0, 35.0, -0.9),
        seg(Corner, 70.0, 34.0, 0.8),
        seg(Accel, 180.0, 64.0, 0.0),
        // Medium straight
        seg(Straight, 450.0, 80.0, 0.0),
        // T4: long sweeping right
        seg(Braking, 60.0, 66.0, -0.05),
        seg(Corner, 340.0, 63.0, -2.2),
        seg(Accel, 160.0, 72.0, -0.2),
        // T5: tight hairpin
        seg(Braking, 130.0, 24.0, -0.1),
        seg(Corner, 90.0, 22.0, -3.0),
        seg(Accel, 230.0, 66.0, -0.2),
        // Run to start/finish
        seg(Straight, 400.0, 84.0, -0.25),
    ]
}

// =============================================================================
// Circuit geometry and driving state
// =============================================================================

struct Circuit {
    segments: Vec<TrackSegment>,
    /// Distance at which each segment starts
    starts: Vec<f64>,
    length: f64,
    centerline: Vec<(f64, f64)>,
}

struct DrivingState {
    seg_idx: usize,
    speed: f64,
    throttle: f64,
    brake: bool,
    drs: bool,
}

impl Circuit {
    fn new(segments: Vec<TrackSegment>) -> Self {
        let mut starts = Vec::with_capacity(segments.len());
        let mut length = 0.0;
        for seg in &segments {
            starts.push(length);
            length += seg.length;
        }

        // Scale turns so the heading closes one full revolution
        let total_turn: f64 = segments.iter().map(|s| s.turn).sum();
        let turn_scale = if total_turn.abs() > f64::EPSILON {
            TAU / total_turn.abs()
        } else {
            1.0
        };

        let steps = (length / CENTERLINE_STEP).ceil() as usize;
        let mut centerline = Vec::with_capacity(steps + 1);
        let (mut x, mut y, mut heading) = (0.0_f64, 0.0_f64, 0.0_f64);
        centerline.push((x, y));
        let mut seg_idx = 0;
        for i in 0..steps {
            let d = i as f64 * CENTERLINE_STEP;
            while seg_idx + 1 < segments.len() && d >= starts[seg_idx + 1] {
                seg_idx += 1;
            }
            let seg = segments[seg_idx];
            heading += seg.turn * turn_scale * CENTERLINE_STEP / seg.length;
            x += heading.cos() * CENTERLINE_STEP;
            y += heading.sin() * CENTERLINE_STEP;
            centerline.push((x, y));
        }

        Self {
            segments,
            starts,
            length,
            centerline,
        }
    }

    fn segment_at(&self, distance: f64) -> (usize, f64) {
        let idx = self
            .starts
            .partition_point(|&start| start <= distance)
            .saturating_sub(1);
        let seg = self.segments[idx];
        let t = ((distance - self.starts[idx]) / seg.length).clamp(0.0, 1.0);
        (idx, t)
    }

    fn position_at(&self, distance: f64) -> (f64, f64) {
        let f = (distance / CENTERLINE_STEP).max(0.0);
        let i = (f.floor() as usize).min(self.centerline.len() - 1);
        let j = (i + 1).min(self.centerline.len() - 1);
        let t = f - i as f64;
        let (a, b) = (self.centerline[i], self.centerline[j]);
        (lerp(a.0, b.0, t), lerp(a.1, b.1, t))
    }

    fn state_at(&self, distance: f64) -> DrivingState {
        let (seg_idx, seg_t) = self.segment_at(distance);
        let seg = self.segments[seg_idx];

        // Previous segment's target speed (for interpolation start)
        let prev_target_speed = if seg_idx > 0 {
            self.segments[seg_idx - 1].target_speed
        } else {
            self.segments[self.segments.len() - 1].target_speed
        };

        let smooth_t = smoothstep(seg_t);
        let speed = lerp(prev_target_speed, seg.target_speed, smooth_t);

        let (throttle, brake) = match seg.kind {
            SegmentKind::Straight => (100.0, false),
            SegmentKind::Braking => (0.0, true),
            // Maintenance throttle through the corner, more toward exit
            SegmentKind::Corner => (20.0 + 30.0 * seg_t, false),
            SegmentKind::Accel => (50.0 + 50.0 * smooth_t, false),
        };

        let drs = matches!(seg.kind, SegmentKind::Straight) && seg.length >= 700.0 && seg_t > 0.1;

        DrivingState {
            seg_idx,
            speed,
            throttle,
            brake,
            drs,
        }
    }
}

fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Upper speed of each forward gear in km/h
const GEAR_TOP_SPEEDS: [f64; 8] = [95.0, 130.0, 165.0, 200.0, 235.0, 270.0, 305.0, 350.0];

fn speed_to_gear(kph: f64) -> i8 {
    GEAR_TOP_SPEEDS
        .iter()
        .position(|&top| kph < top)
        .map(|i| i as i8 + 1)
        .unwrap_or(8)
}

fn speed_to_rpm(kph: f64, gear: i8) -> u32 {
    let top = GEAR_TOP_SPEEDS[(gear.clamp(1, 8) - 1) as usize];
    (11_800.0 * kph / top).clamp(4_000.0, 12_500.0) as u32
}

/// Simple deterministic noise from a seed
fn noise(seed: f64) -> f64 {
    let x = (seed * 12.9898 + 78.233).sin() * 43_758.547;
    x - x.floor()
}

/// Small jitter centered around 0
fn jitter(seed: f64, amplitude: f64) -> f64 {
    (noise(seed) - 0.5) * 2.0 * amplitude
}

// =============================================================================
// Drivers and sessions
// =============================================================================

struct DriverProfile {
    code: &'static str,
    /// Speed multiplier relative to the reference pace
    pace: f64,
}

const DRIVERS: &[DriverProfile] = &[
    DriverProfile { code: "VER", pace: 1.000 },
    DriverProfile { code: "NOR", pace: 0.998 },
    DriverProfile { code: "LEC", pace: 0.997 },
    DriverProfile { code: "PIA", pace: 0.996 },
    DriverProfile { code: "HAM", pace: 0.995 },
    DriverProfile { code: "RUS", pace: 0.995 },
    DriverProfile { code: "SAI", pace: 0.994 },
    DriverProfile { code: "ALO", pace: 0.990 },
];

fn lap_count(session: SessionKind) -> u32 {
    match session {
        SessionKind::Race => 22,
        SessionKind::Sprint => 12,
        SessionKind::Qualifying | SessionKind::SprintQualifying => 9,
        SessionKind::Practice1 | SessionKind::Practice2 | SessionKind::Practice3 => 14,
    }
}

struct GeneratedLap {
    lap: Lap,
    samples: Vec<RawSample>,
}

/// Synthetic session data source
pub struct DemoProvider {
    circuit: Circuit,
}

impl DemoProvider {
    pub fn new() -> Self {
        Self {
            circuit: Circuit::new(demo_track()),
        }
    }

    /// Driver codes present in every demo session
    pub fn roster(&self) -> impl Iterator<Item = &'static str> {
        DRIVERS.iter().map(|d| d.code)
    }

    /// Length of the demo circuit in meters
    pub fn circuit_length(&self) -> f64 {
        self.circuit.length
    }

    fn check_session(&self, session: &SessionKey) -> Result<(), ProviderError> {
        let known = session.year >= FIRST_TELEMETRY_SEASON
            && match session.event {
                EventId::Round(round) => (1..=CALENDAR_ROUNDS).contains(&round),
                EventId::Name(ref name) => !name.trim().is_empty(),
            };

        if known {
            Ok(())
        } else {
            Err(ProviderError::SessionNotFound(session.clone()))
        }
    }

    fn session_seed(session: &SessionKey) -> f64 {
        let mut hasher = DefaultHasher::new();
        session.year.hash(&mut hasher);
        session.event.slug().hash(&mut hasher);
        session.session.code().hash(&mut hasher);
        (hasher.finish() % 100_000) as f64
    }

    fn generate_laps(&self, session: &SessionKey, driver: &str) -> Vec<GeneratedLap> {
        let Some((driver_idx, profile)) = DRIVERS
            .iter()
            .enumerate()
            .find(|(_, d)| d.code.eq_ignore_ascii_case(driver))
        else {
            return Vec::new();
        };

        let seed = Self::session_seed(session) + driver_idx as f64 * 31.0;
        let strengths: Vec<f64> = (0..self.circuit.segments.len())
            .map(|i| profile.pace * (1.0 + jitter(seed + i as f64 * 7.0, 0.015)))
            .collect();

        let total_laps = lap_count(session.session);
        let mut laps = Vec::with_capacity(total_laps as usize);
        // Stagger drivers slightly on the session clock
        let mut start_time = SESSION_START + driver_idx as f64 * 1.7;

        for lap_number in 1..=total_laps {
            let in_or_out_lap = lap_number == 1 || lap_number == total_laps;
            let lap_factor = if in_or_out_lap {
                0.8
            } else {
                1.0 + jitter(seed + lap_number as f64 * 13.0, 0.004)
            };

            let (samples, duration) =
                self.drive_lap(&strengths, lap_factor, start_time, seed + lap_number as f64);

            let lap_time = (!in_or_out_lap).then_some(Seconds(duration));
            laps.push(GeneratedLap {
                lap: Lap::new(profile.code, lap_number, lap_time),
                samples,
            });
            start_time += duration;
        }

        debug!(
            "Generated {} demo laps for {} in {}",
            laps.len(),
            profile.code,
            session
        );
        laps
    }

    /// Drive one lap, returning samples and lap duration in seconds
    fn drive_lap(
        &self,
        strengths: &[f64],
        lap_factor: f64,
        start_time: f64,
        seed: f64,
    ) -> (Vec<RawSample>, f64) {
        let length = self.circuit.length;
        let mut samples = Vec::new();
        let mut distance = 0.0;
        let mut time = start_time;
        let mut n = 0.0;

        loop {
            let state = self.circuit.state_at(distance);
            let speed = (state.speed * strengths[state.seg_idx] * lap_factor).max(1.0);
            let kph = speed * 3.6;
            let gear = speed_to_gear(kph);
            let (x, y) = self.circuit.position_at(distance);

            n += 1.0;
            samples.push(RawSample {
                time,
                distance: None,
                x: Some(x * 10.0 + jitter(seed + n * 1.1, 2.0)),
                y: Some(y * 10.0 + jitter(seed + n * 1.2, 2.0)),
                speed: Some(kph + jitter(seed + n * 1.3, 0.5)),
                rpm: Some(speed_to_rpm(kph, gear)),
                n_gear: Some(gear),
                throttle: Some(state.throttle),
                brake: Some(state.brake),
                drs: Some(if state.drs { 12 } else { 0 }),
            });

            if distance >= length {
                break;
            }

            let next = distance + speed * SAMPLE_INTERVAL;
            if next >= length {
                time += (length - distance) / speed;
                distance = length;
            } else {
                time += SAMPLE_INTERVAL;
                distance = next;
            }
        }

        (samples, time - start_time)
    }
}

impl Default for DemoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for DemoProvider {
    fn name(&self) -> &str {
        "Demo"
    }

    fn drivers(&self, session: &SessionKey) -> Result<Vec<String>, ProviderError> {
        self.check_session(session)?;
        Ok(self.roster().map(str::to_string).collect())
    }

    fn laps(&self, session: &SessionKey, driver: &str) -> Result<Vec<Lap>, ProviderError> {
        self.check_session(session)?;
        Ok(self
            .generate_laps(session, driver)
            .into_iter()
            .map(|g| g.lap)
            .collect())
    }

    fn telemetry(&self, session: &SessionKey, lap: &Lap) -> Result<Vec<RawSample>, ProviderError> {
        self.check_session(session)?;
        Ok(self
            .generate_laps(session, &lap.driver)
            .into_iter()
            .find(|g| g.lap.lap_number == lap.lap_number)
            .map(|g| g.samples)
            .unwrap_or_default())
    }
}
