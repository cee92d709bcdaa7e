//! Writes small synthetic region CSVs (`AI.csv`, `GMEX.csv`) in the survey
//! export layout, for trying the pipeline without real data.
//!
//! Usage: `generate_sample [out_dir]` (default `sample_data`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// How a synthetic species shows up in the catch.
struct SpeciesPlan {
    spp: &'static str,
    common: &'static str,
    /// Mean WTCPUE when caught.
    biomass: f64,
    /// Years in which the species is never recorded.
    absent_years: &'static [u16],
}

struct RegionPlan {
    code: &'static str,
    name: &'static str,
    years: std::ops::RangeInclusive<u16>,
    hauls_per_year: usize,
    /// (lat, lon) box centre and depth range.
    lat: f64,
    lon: f64,
    depth: (f64, f64),
    species: Vec<SpeciesPlan>,
}

fn plans() -> Vec<RegionPlan> {
    vec![
        RegionPlan {
            code: "AI",
            name: "Aleutian Islands",
            years: 2010..=2014,
            hauls_per_year: 6,
            lat: 52.0,
            lon: -176.0,
            depth: (40.0, 500.0),
            species: vec![
                SpeciesPlan { spp: "Gadus chalcogrammus", common: "walleye pollock", biomass: 45.0, absent_years: &[] },
                SpeciesPlan { spp: "Acesta sphoni", common: "Na", biomass: 0.4, absent_years: &[2011] },
                SpeciesPlan { spp: "Hippoglossus stenolepis", common: "Pacific halibut", biomass: 6.0, absent_years: &[] },
                SpeciesPlan { spp: "Sebastes alutus", common: "Pacific ocean perch", biomass: 22.0, absent_years: &[2013, 2014] },
            ],
        },
        RegionPlan {
            code: "GMEX",
            name: "Gulf of Mexico",
            years: 2015..=2018,
            hauls_per_year: 8,
            lat: 28.5,
            lon: -90.0,
            depth: (10.0, 110.0),
            species: vec![
                SpeciesPlan { spp: "Lutjanus campechanus", common: "red snapper", biomass: 3.5, absent_years: &[] },
                SpeciesPlan { spp: "Micropogonias undulatus", common: "Atlantic croaker", biomass: 12.0, absent_years: &[] },
                SpeciesPlan { spp: "Farfantepenaeus aztecus", common: "brown shrimp", biomass: 2.0, absent_years: &[2016] },
                SpeciesPlan { spp: "Stenotomus caprinus", common: "longspine porgy", biomass: 5.0, absent_years: &[] },
                SpeciesPlan { spp: "Leiostomus xanthurus", common: "spot", biomass: 1.5, absent_years: &[2015, 2018] },
            ],
        },
    ]
}

const HEADER: [&str; 11] = [
    "region", "sampleid", "year", "spp", "wtcpue", "common", "stratum", "stratumarea", "lat",
    "lon", "depth",
];

fn write_region(plan: &RegionPlan, dir: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let path = dir.join(format!("{}.csv", plan.code));
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADER)?;

    let mut rows = 0;
    for year in plan.years.clone() {
        for haul in 0..plan.hauls_per_year {
            let stratum = format!("{}", 10 + haul % 3);
            let area = 1000.0 + 250.0 * (haul % 3) as f64;
            let lat = plan.lat + rng.uniform(-1.0, 1.0);
            let lon = plan.lon + rng.uniform(-2.0, 2.0);
            let depth = rng.uniform(plan.depth.0, plan.depth.1);
            let sample_id = format!("{}-{year}-{haul:03}", plan.code);

            for sp in &plan.species {
                if sp.absent_years.contains(&year) {
                    continue;
                }
                // roughly a third of hauls come up empty for a species
                let roll = rng.next_f64();
                let wtcpue = if rows % 97 == 13 {
                    "inf".to_string()
                } else if roll < 0.33 {
                    "0".to_string()
                } else {
                    format!("{:.4}", sp.biomass * rng.uniform(0.2, 1.8))
                };

                writer.write_record([
                    plan.name.to_string(),
                    sample_id.clone(),
                    year.to_string(),
                    sp.spp.to_string(),
                    wtcpue,
                    sp.common.to_string(),
                    stratum.clone(),
                    format!("{area:.1}"),
                    format!("{lat:.4}"),
                    format!("{lon:.4}"),
                    format!("{depth:.1}"),
                ])?;
                rows += 1;
            }
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn main() -> Result<()> {
    env_logger::init();

    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    for plan in plans() {
        let rows = write_region(&plan, &dir, &mut rng)?;
        println!(
            "Wrote {rows} records for {} ({}) to {}",
            plan.code,
            plan.name,
            dir.join(format!("{}.csv", plan.code)).display()
        );
    }
    Ok(())
}
