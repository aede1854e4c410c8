use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44_100;

/// Alarm-clock style chime: a tone pulsed on and off a few times, then
/// silence. Mono, finite.
pub struct AlarmTone {
    freq: f32,
    pulse_samples: usize,
    total_samples: usize,
    num_sample: usize,
}

impl AlarmTone {
    pub fn new(freq: f32, pulses: usize, pulse_len: Duration) -> Self {
        let pulse_samples = pulse_len.as_millis() as usize * SAMPLE_RATE as usize / 1000;
        Self {
            freq,
            pulse_samples: pulse_samples.max(1),
            // Each pulse is followed by a gap of the same length.
            total_samples: pulse_samples.max(1) * pulses * 2,
            num_sample: 0,
        }
    }
}

impl Default for AlarmTone {
    fn default() -> Self {
        Self::new(880.0, 4, Duration::from_millis(150))
    }
}

impl Iterator for AlarmTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        let n = self.num_sample;
        self.num_sample += 1;

        let sounding = (n / self.pulse_samples) % 2 == 0;
        if !sounding {
            return Some(0.0);
        }
        let t = n as f32 / SAMPLE_RATE as f32;
        Some((2.0 * PI * self.freq * t).sin() * 0.25)
    }
}

impl Source for AlarmTone {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(
            self.total_samples as f32 / SAMPLE_RATE as f32,
        ))
    }
}
