#![allow(dead_code, non_snake_case, non_upper_case_globals)]

use std::path::PathBuf;
use ndarray as nd;
use num_complex::Complex64 as C64;
use lightshift_sim::{
    mkdir,
    write_npz,
    dynamics::{ GateParams, NoiseParams },
    hilbert::{ IonState, StateInit },
    sweep::{ detune, SweepGrid },
};

const DIM: usize = 20;
const G_NUMBER: usize = 1;

fn main() -> anyhow::Result<()> {
    let outdir = PathBuf::from("output");
    mkdir!(outdir);

    // both ions prepared in |g⟩, motion in the vacuum state
    let amps: Vec<C64>
        = [1.0, 0.0, 0.0, 0.0].iter().map(|x| C64::from(*x)).collect();
    let mut state = IonState::new(StateInit::Amps(amps), DIM)?;
    let mut params = GateParams::default();

    let sb: nd::Array1<f64> = nd::Array1::linspace(0.90, 1.10, 201);
    let grid = SweepGrid {
        sb: sb.to_vec(),
        g_number: G_NUMBER,
        noise: NoiseParams { spam: 0.005, depol: 0.001 },
        ..SweepGrid::default()
    };
    let total = grid.len();

    let pops = detune(&mut state, &mut params, &grid, |k| {
        if k % 20 == 0 || k == total {
            println!("  {} / {}", k, total);
        }
    });

    write_npz!(
        outdir.join("detuning_scan.npz"),
        arrays: {
            "sb" => &sb,
            "pops" => &pops,
        }
    );

    println!("done");
    Ok(())
}
