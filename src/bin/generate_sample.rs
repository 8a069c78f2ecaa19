use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};

const POINTS: usize = 200;
const ENERGY_MIN: f64 = -10.0;
const ENERGY_MAX: f64 = 10.0;

/// Peak as `(centre, spread, amplitude)`: `amplitude * exp(-(e - centre)^2 / spread)`.
type Peak = (f64, f64, f64);

const SAMPLES: [(&str, [Peak; 2]); 3] = [
    ("DOS_clean.dat", [(-3.0, 2.0, 1.0), (2.0, 1.5, 0.5)]),
    ("DOS_h_bridge.dat", [(-1.0, 1.5, 0.8), (3.0, 2.0, 0.6)]),
    ("DOS_o_vacancy.dat", [(-2.0, 1.8, 1.2), (1.0, 1.2, 0.4)]),
];

fn peak(e: f64, (centre, spread, amplitude): Peak) -> f64 {
    amplitude * (-(e - centre).powi(2) / spread).exp()
}

fn energies() -> Vec<f64> {
    let step = (ENERGY_MAX - ENERGY_MIN) / (POINTS - 1) as f64;
    (0..POINTS).map(|i| ENERGY_MIN + i as f64 * step).collect()
}

/// Four columns: energy, total DOS and two equal spin channels.
fn generate_dos(energies: &[f64], peaks: &[Peak]) -> String {
    let mut out = String::from("# Energy Total_DOS Spin_Up Spin_Down\n");
    for &e in energies {
        let total: f64 = peaks.iter().map(|&p| peak(e, p)).sum();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{e:.6} {total:.6} {:.6} {:.6}", total / 2.0, total / 2.0);
    }
    out
}

fn main() -> Result<()> {
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let energies = energies();
    for (name, peaks) in &SAMPLES {
        let path = dir.join(name);
        std::fs::write(&path, generate_dos(&energies, peaks))
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {} ({} points)", path.display(), energies.len());
    }
    Ok(())
}
