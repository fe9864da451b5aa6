use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

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

/// One bench campaign: the comment lines and the per-point measurements.
struct Campaign {
    sheet: &'static str,
    comment: [&'static str; 2],
    fuels: [&'static str; 2],
    thrust_gain: f64,
    points: usize,
}

/// Write one campaign laid out as the loader expects: comment block, blank
/// separator, then name | unit | one column per point. The block starts at
/// B2 to leave stray empty cells around it.
fn write_campaign(ws: &mut Worksheet, c: &Campaign, rng: &mut SimpleRng) -> Result<(), XlsxError> {
    ws.set_name(c.sheet)?;

    let (row0, col0) = (1u32, 1u16);
    ws.write_string(row0, col0, c.comment[0])?;
    ws.write_string(row0 + 1, col0, c.comment[1])?;

    let data_row = row0 + 3;
    let headers = [
        ("regime", "rpm"),
        ("thrust", "N"),
        ("temperature", "K"),
        ("fuel", "-"),
    ];
    for (i, (name, unit)) in headers.iter().enumerate() {
        ws.write_string(data_row + i as u32, col0, *name)?;
        ws.write_string(data_row + i as u32, col0 + 1, *unit)?;
    }

    for p in 0..c.points {
        let col = col0 + 2 + p as u16;
        let regime = 800.0 + 100.0 * p as f64;
        let thrust = c.thrust_gain * regime + rng.gauss(0.0, 15.0);
        let temperature = 290.0 + 0.4 * regime + rng.gauss(0.0, 5.0);
        let fuel = c.fuels[p % 2];

        ws.write_number(data_row, col, regime)?;
        ws.write_number(data_row + 1, col, (thrust * 10.0).round() / 10.0)?;
        ws.write_number(data_row + 2, col, (temperature * 10.0).round() / 10.0)?;
        ws.write_string(data_row + 3, col, fuel)?;
    }
    Ok(())
}

fn main() -> Result<(), XlsxError> {
    let mut rng = SimpleRng::new(42);

    let campaigns = [
        Campaign {
            sheet: "bench_A",
            comment: ["Campaign A", "operator: Alice"],
            fuels: ["kerosene", "biofuel"],
            thrust_gain: 1.8,
            points: 12,
        },
        Campaign {
            sheet: "bench_B",
            comment: ["Campaign B", "operator: Bob"],
            fuels: ["kerosene", "kerosene"],
            thrust_gain: 2.1,
            points: 8,
        },
    ];

    let mut workbook = Workbook::new();
    let mut total = 0;
    for campaign in &campaigns {
        let ws = workbook.add_worksheet();
        write_campaign(ws, campaign, &mut rng)?;
        total += campaign.points;
    }

    let output_path = "sample_data.xlsx";
    workbook.save(output_path)?;

    println!(
        "Wrote {total} points over {} sheets to {output_path}",
        campaigns.len()
    );
    Ok(())
}
