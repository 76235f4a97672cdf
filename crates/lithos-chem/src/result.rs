//! Ground-state results with frozen-core and nuclear contributions.

use serde::Serialize;
use std::fmt;

/// Atomic units of dipole moment per Debye.
pub const DEBYE_IN_AU: f64 = 0.393_430_307;

fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    let rounded = (value * scale).round() / scale;
    // Avoid printing "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn fmt_vector(v: &[f64; 3]) -> String {
    format!(
        "[{}  {}  {}]",
        round_to(v[0], 8),
        round_to(v[1], 8),
        round_to(v[2], 8)
    )
}

fn norm(v: &[f64; 3]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Dipole moment breakdown in atomic units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DipoleResult {
    /// Active-space expectation values.
    pub computed: [f64; 3],
    /// Frozen-orbital contribution.
    pub frozen: [f64; 3],
    /// Particle-hole contribution (always zero).
    pub particle_hole: [f64; 3],
    /// Electronic dipole (computed + frozen + particle-hole).
    pub electronic: [f64; 3],
    /// Nuclear dipole.
    pub nuclear: [f64; 3],
    /// Total: nuclear minus electronic.
    pub total: [f64; 3],
}

impl DipoleResult {
    /// Total dipole in Debye.
    pub fn total_debye(&self) -> [f64; 3] {
        self.total.map(|x| x / DEBYE_IN_AU)
    }

    /// `|total|` in atomic units.
    pub fn magnitude(&self) -> f64 {
        norm(&self.total)
    }
}

/// A molecular ground-state result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundStateResult {
    /// Eigenvalue of the active-space qubit Hamiltonian.
    pub computed_energy: f64,
    /// Frozen-orbital energy.
    pub frozen_energy: f64,
    /// Particle-hole shift (always zero).
    pub particle_hole_energy: f64,
    /// Nuclear repulsion energy.
    pub nuclear_repulsion: f64,
    /// Measured electrons, frozen ones included.
    pub num_particles: Option<f64>,
    /// Total spin `S`.
    pub spin: Option<f64>,
    /// `⟨S²⟩`.
    pub s_squared: Option<f64>,
    /// `⟨S_z⟩`.
    pub magnetization: Option<f64>,
    /// Dipole breakdown.
    pub dipole: Option<DipoleResult>,
}

impl GroundStateResult {
    /// Electronic energy: computed plus frozen plus particle-hole parts.
    pub fn electronic_energy(&self) -> f64 {
        self.computed_energy + self.frozen_energy + self.particle_hole_energy
    }

    /// Total ground-state energy including nuclear repulsion.
    pub fn energy(&self) -> f64 {
        self.electronic_energy() + self.nuclear_repulsion
    }
}

impl fmt::Display for GroundStateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== GROUND STATE ENERGY ===")?;
        writeln!(f, " ")?;
        writeln!(
            f,
            "* Electronic ground state energy (Hartree): {}",
            round_to(self.electronic_energy(), 12)
        )?;
        writeln!(f, "  - computed part:      {}", round_to(self.computed_energy, 12))?;
        writeln!(f, "  - frozen energy part: {}", round_to(self.frozen_energy, 12))?;
        writeln!(f, "  - particle hole part: {}", round_to(self.particle_hole_energy, 12))?;
        writeln!(
            f,
            "~ Nuclear repulsion energy (Hartree): {}",
            round_to(self.nuclear_repulsion, 12)
        )?;
        write!(
            f,
            "> Total ground state energy (Hartree): {}",
            round_to(self.energy(), 12)
        )?;
        if let (Some(n), Some(s), Some(s2), Some(m)) =
            (self.num_particles, self.spin, self.s_squared, self.magnetization)
        {
            write!(
                f,
                "\n  Measured:: Num particles: {:.3}, S: {:.3}, S^2: {:.3}, M: {:.5}",
                round_to(n, 3),
                round_to(s, 3),
                round_to(s2, 3),
                round_to(m, 5)
            )?;
        }

        if let Some(d) = &self.dipole {
            writeln!(f)?;
            writeln!(f, " ")?;
            writeln!(f, "=== DIPOLE MOMENT ===")?;
            writeln!(f, " ")?;
            writeln!(f, "* Electronic dipole moment (a.u.): {}", fmt_vector(&d.electronic))?;
            writeln!(f, "  - computed part:      {}", fmt_vector(&d.computed))?;
            writeln!(f, "  - frozen energy part: {}", fmt_vector(&d.frozen))?;
            writeln!(f, "  - particle hole part: {}", fmt_vector(&d.particle_hole))?;
            writeln!(f, "~ Nuclear dipole moment (a.u.): {}", fmt_vector(&d.nuclear))?;
            writeln!(
                f,
                "> Dipole moment (a.u.): {}  Total: {}",
                fmt_vector(&d.total),
                round_to(d.magnitude(), 8)
            )?;
            let debye = d.total_debye();
            write!(
                f,
                "               (debye): {}  Total: {}",
                fmt_vector(&debye),
                round_to(norm(&debye), 8)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GroundStateResult {
        GroundStateResult {
            computed_energy: -1.0,
            frozen_energy: -7.5,
            particle_hole_energy: 0.0,
            nuclear_repulsion: 1.0,
            num_particles: Some(4.0),
            spin: Some(0.0),
            s_squared: Some(0.0),
            magnetization: Some(0.0),
            dipole: None,
        }
    }

    #[test]
    fn energies_add_up() {
        let r = sample();
        assert_eq!(r.electronic_energy(), -8.5);
        assert_eq!(r.energy(), -7.5);
    }

    #[test]
    fn display_contains_measured_line() {
        let text = sample().to_string();
        assert!(text.starts_with("=== GROUND STATE ENERGY ==="));
        assert!(text.contains("> Total ground state energy (Hartree): -7.5"));
        assert!(text.contains("Measured:: Num particles: 4.000, S: 0.000, S^2: 0.000, M: 0.00000"));
        assert!(!text.contains("DIPOLE"));
    }

    #[test]
    fn measured_line_has_no_negative_zero() {
        let mut r = sample();
        r.spin = Some(-2e-17);
        r.s_squared = Some(-1e-16);
        r.magnetization = Some(-3e-9);
        let text = r.to_string();
        assert!(text.contains("S: 0.000, S^2: 0.000, M: 0.00000"), "{text}");
    }

    #[test]
    fn dipole_block_in_debye() {
        let mut r = sample();
        r.dipole = Some(DipoleResult {
            computed: [0.0, 0.0, 1.0],
            frozen: [0.0; 3],
            particle_hole: [0.0; 3],
            electronic: [0.0, 0.0, 1.0],
            nuclear: [0.0, 0.0, 2.0],
            total: [0.0, 0.0, 1.0],
        });
        let text = r.to_string();
        assert!(text.contains("> Dipole moment (a.u.): [0  0  1]  Total: 1"));
        assert!(text.contains("(debye): [0  0  2.54174623]  Total: 2.54174623"));
    }
}
