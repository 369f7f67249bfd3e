use crate::model::{
    SensorSnapshot, CO2_MIN, HUMIDITY_MAX, HUMIDITY_MIN, MQ135_MAX, MQ135_MIN, MQ135_PPM_MIN,
    PM_MIN, TEMP_MAX, TEMP_MIN,
};
use rand::Rng;

/// Step size, rounding and bounds of one field's random walk
#[derive(Debug, Clone, Copy)]
struct Walk {
    step: f64,
    decimals: i32,
    min: f64,
    max: f64,
}

impl Walk {
    const fn new(step: f64, decimals: i32, min: f64, max: f64) -> Self {
        Self {
            step,
            decimals,
            min,
            max,
        }
    }

    fn next(&self, rng: &mut impl Rng, prev: f64, fallback: f64) -> f64 {
        let start = if prev.is_finite() { prev } else { fallback };
        let scale = 10f64.powi(self.decimals);
        let raw = start + rng.gen_range(-self.step..=self.step);
        ((raw * scale).round() / scale).clamp(self.min, self.max)
    }
}

const PM10: Walk = Walk::new(2.0, 1, PM_MIN, f64::MAX);
const PM25: Walk = Walk::new(1.5, 1, PM_MIN, f64::MAX);
const CO2: Walk = Walk::new(10.0, 0, CO2_MIN, f64::MAX);
const HUMIDITY: Walk = Walk::new(1.0, 1, HUMIDITY_MIN, HUMIDITY_MAX);
const TEMPERATURE: Walk = Walk::new(0.25, 1, TEMP_MIN, TEMP_MAX);
const MQ135: Walk = Walk::new(10.0, 0, MQ135_MIN, MQ135_MAX);
const MQ135_PPM: Walk = Walk::new(0.1, 2, MQ135_PPM_MIN, f64::MAX);

/// Next snapshot of the local random walk.
///
/// Every field moves independently from `prev` by a small step and is
/// clamped to its domain. An absent `mq135_ppm` stays absent.
pub fn synthesize(rng: &mut impl Rng, prev: &SensorSnapshot) -> SensorSnapshot {
    let seed = SensorSnapshot::default();

    SensorSnapshot {
        pm10: PM10.next(rng, prev.pm10, seed.pm10),
        pm25: PM25.next(rng, prev.pm25, seed.pm25),
        co2: CO2.next(rng, prev.co2, seed.co2),
        humidity: HUMIDITY.next(rng, prev.humidity, seed.humidity),
        temperature: TEMPERATURE.next(rng, prev.temperature, seed.temperature),
        mq135: MQ135.next(rng, prev.mq135, seed.mq135),
        mq135_ppm: prev
            .mq135_ppm
            .map(|ppm| MQ135_PPM.next(rng, ppm, seed.mq135_ppm.unwrap_or(1.2))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_in_bounds(s: &SensorSnapshot) {
        assert!(s.pm10 >= PM_MIN && s.pm10.is_finite(), "pm10 {}", s.pm10);
        assert!(s.pm25 >= PM_MIN && s.pm25.is_finite(), "pm25 {}", s.pm25);
        assert!(s.co2 >= CO2_MIN && s.co2.is_finite(), "co2 {}", s.co2);
        assert!((HUMIDITY_MIN..=HUMIDITY_MAX).contains(&s.humidity), "humidity {}", s.humidity);
        assert!((TEMP_MIN..=TEMP_MAX).contains(&s.temperature), "temperature {}", s.temperature);
        assert!((MQ135_MIN..=MQ135_MAX).contains(&s.mq135), "mq135 {}", s.mq135);
        if let Some(ppm) = s.mq135_ppm {
            assert!(ppm >= MQ135_PPM_MIN && ppm.is_finite(), "mq135_ppm {}", ppm);
        }
    }

    #[test]
    fn test_steps_are_small() {
        let mut rng = StdRng::seed_from_u64(7);
        let prev = SensorSnapshot::default();

        for _ in 0..500 {
            let next = synthesize(&mut rng, &prev);
            assert!((next.pm10 - prev.pm10).abs() <= 2.05);
            assert!((next.pm25 - prev.pm25).abs() <= 1.55);
            assert!((next.co2 - prev.co2).abs() <= 10.0);
            assert!((next.humidity - prev.humidity).abs() <= 1.05);
            assert!((next.temperature - prev.temperature).abs() <= 0.31);
            assert!((next.mq135 - prev.mq135).abs() <= 10.0);
            assert_eq!(next.co2.fract(), 0.0);
            assert_eq!(next.mq135.fract(), 0.0);
        }
    }

    #[test]
    fn test_clamped_at_lower_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut s = SensorSnapshot {
            pm10: 0.0,
            pm25: 0.0,
            co2: 400.0,
            humidity: 0.0,
            temperature: 0.0,
            mq135: 0.0,
            mq135_ppm: Some(0.1),
        };

        for _ in 0..1000 {
            s = synthesize(&mut rng, &s);
            assert_in_bounds(&s);
        }
    }

    #[test]
    fn test_clamped_at_upper_bounds() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut s = SensorSnapshot {
            humidity: 100.0,
            temperature: 50.0,
            mq135: 1000.0,
            ..Default::default()
        };

        for _ in 0..1000 {
            s = synthesize(&mut rng, &s);
            assert_in_bounds(&s);
        }
    }

    #[test]
    fn test_out_of_range_prev_pulled_into_bounds() {
        let mut rng = StdRng::seed_from_u64(17);
        let prev = SensorSnapshot {
            pm10: -30.0,
            co2: 120.0,
            humidity: 180.0,
            temperature: -12.0,
            mq135: 4000.0,
            mq135_ppm: Some(-1.0),
            ..Default::default()
        };

        let next = synthesize(&mut rng, &prev);

        assert_in_bounds(&next);
        assert_eq!(next.humidity, HUMIDITY_MAX);
        assert_eq!(next.mq135, MQ135_MAX);
        assert_eq!(next.co2, CO2_MIN);
    }

    #[test]
    fn test_non_finite_prev_restarts_from_default() {
        let mut rng = StdRng::seed_from_u64(19);
        let prev = SensorSnapshot {
            pm10: f64::NAN,
            co2: f64::INFINITY,
            ..Default::default()
        };

        let next = synthesize(&mut rng, &prev);

        assert_in_bounds(&next);
        assert!((next.pm10 - 45.0).abs() <= 2.05);
        assert!((next.co2 - 450.0).abs() <= 10.0);
    }

    #[test]
    fn test_absent_ppm_stays_absent() {
        let mut rng = StdRng::seed_from_u64(23);
        let prev = SensorSnapshot {
            mq135_ppm: None,
            ..Default::default()
        };

        assert_eq!(synthesize(&mut rng, &prev).mq135_ppm, None);
    }

    #[test]
    fn test_every_field_evolves() {
        let mut rng = StdRng::seed_from_u64(29);
        let start = SensorSnapshot::default();
        let mut s = start;

        for _ in 0..50 {
            s = synthesize(&mut rng, &s);
        }

        assert_ne!(s, start);
    }
}
