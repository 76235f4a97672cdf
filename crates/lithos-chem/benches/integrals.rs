//! Benchmarks for AO integrals and the SCF loop
//!
//! Run with: cargo bench -p lithos-chem

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use lithos_chem::scf::{ScfOptions, run_scf};
use lithos_chem::{AoIntegrals, BasisName, BasisSet, Molecule, Unit};

const LIH: &str = "H 0.0 0.0 0.0; Li 0.0 0.0 1.596";
const WATER: &str = "O 0.0 0.0 0.0; H 0.757 0.586 0.0; H -0.757 0.586 0.0";

fn bench_integrals(c: &mut Criterion) {
    let mut group = c.benchmark_group("ao_integrals");
    for (name, atom) in [("lih", LIH), ("water", WATER)] {
        let mol = Molecule::from_atom_string(atom, Unit::Angstrom, 0, 0).unwrap();
        let basis = BasisSet::build(BasisName::Sto3g, &mol).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| AoIntegrals::compute(black_box(&basis), black_box(&mol)));
        });
    }
    group.finish();
}

fn bench_scf(c: &mut Criterion) {
    let mol = Molecule::from_atom_string(LIH, Unit::Angstrom, 0, 0).unwrap();
    let basis = BasisSet::build(BasisName::Sto3g, &mol).unwrap();
    let ints = AoIntegrals::compute(&basis, &mol);
    let e_nuc = mol.nuclear_repulsion_energy();
    let options = ScfOptions::default();
    c.bench_function("scf_lih", |b| {
        b.iter(|| run_scf(black_box(&ints), e_nuc, 2, 2, &options).unwrap());
    });
}

criterion_group!(benches, bench_integrals, bench_scf);
criterion_main!(benches);
