use anyhow::{Context, Result};
use chrono::{Months, NaiveDate};

/// (column, base level, monthly trend, seasonal amplitude, noise)
const SERIES: [(&str, f64, f64, f64, f64); 6] = [
    ("Regular_Imp", 520_000.0, 1_100.0, 45_000.0, 18_000.0),
    ("Superior_Imp", 310_000.0, 900.0, 30_000.0, 12_000.0),
    ("Diesel_Imp", 640_000.0, 1_400.0, 38_000.0, 22_000.0),
    ("Regular_Con", 480_000.0, 1_000.0, 40_000.0, 15_000.0),
    ("Superior_Con", 290_000.0, 850.0, 26_000.0, 10_000.0),
    ("Diesel_Con", 600_000.0, 1_300.0, 35_000.0, 20_000.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Value of one series at month `t`: trend, yearly cycle, noise, a 2020 dip
/// and the occasional spike.
fn value_at(t: usize, date: NaiveDate, shape: (f64, f64, f64, f64), rng: &mut SimpleRng) -> f64 {
    let (level, trend, amplitude, noise) = shape;
    let angle = 2.0 * std::f64::consts::PI * (t % 12) as f64 / 12.0;
    let mut v = level + trend * t as f64 + amplitude * angle.sin() + rng.gauss(0.0, noise);
    if date >= NaiveDate::from_ymd_opt(2020, 3, 1).unwrap_or(date)
        && date < NaiveDate::from_ymd_opt(2020, 9, 1).unwrap_or(date)
    {
        v *= 0.7;
    }
    if rng.next_f64() < 0.02 {
        v += 6.0 * noise;
    }
    v.max(0.0).round()
}

fn main() -> Result<()> {
    let output_path = std::env::args().nth(1).unwrap_or_else(|| "sample_fuel.csv".to_string());
    let months = 15 * 12;
    let start = NaiveDate::from_ymd_opt(2010, 1, 1).context("invalid start date")?;
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("Failed to create {output_path}"))?;
    let mut header = vec!["fecha".to_string()];
    header.extend(SERIES.iter().map(|s| s.0.to_string()));
    writer.write_record(&header)?;

    for t in 0..months {
        let date = start
            .checked_add_months(Months::new(t as u32))
            .context("date out of range")?;
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        for &(_, level, trend, amplitude, noise) in &SERIES {
            // Leave a few cells empty.
            if rng.next_f64() < 0.01 {
                record.push(String::new());
            } else {
                record.push(value_at(t, date, (level, trend, amplitude, noise), &mut rng).to_string());
            }
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Wrote {months} months × {} series to {output_path}", SERIES.len());
    Ok(())
}
