//! Statevector simulation engine.

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use lithos_ir::{Circuit, Instruction, ParameterBindings, StandardGate};

use crate::error::{SimError, SimResult};
use crate::hamiltonian::Hamiltonian;
use crate::pauli::{PauliString, i_pow};

/// Widest register the dense simulator accepts (256 MiB of amplitudes).
pub const MAX_QUBITS: usize = 24;

/// Phase picked up by basis state `index` under the Pauli string with masks
/// `(x, z)`: `P|i⟩ = phase · |i ⊕ x⟩`.
#[inline]
pub fn pauli_phase(index: usize, x: usize, z: usize) -> Complex64 {
    let y_count = (x & z).count_ones();
    let sign = if (index & z).count_ones() % 2 == 0 {
        1.0
    } else {
        -1.0
    };
    i_pow((y_count % 4) as u8) * sign
}

/// A statevector representing a quantum state.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers); bit `q` of the index is
    /// qubit `q`.
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        Self::from_basis_state(num_qubits, 0)
    }

    /// Create the computational basis state `|index⟩`.
    pub fn from_basis_state(num_qubits: usize, index: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[index % size] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Wrap raw amplitudes; the length must be a power of two.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> SimResult<Self> {
        let len = amplitudes.len();
        if len == 0 || !len.is_power_of_two() {
            return Err(SimError::InvalidState(format!(
                "amplitude vector length {len} is not a power of two"
            )));
        }
        Ok(Self {
            num_qubits: len.trailing_zeros() as usize,
            amplitudes,
        })
    }

    /// Simulate `circuit` from |0...0⟩.
    pub fn run(circuit: &Circuit, bindings: &ParameterBindings) -> SimResult<Self> {
        let n = circuit.num_qubits() as usize;
        if n > MAX_QUBITS {
            return Err(SimError::TooManyQubits {
                requested: circuit.num_qubits(),
                max: MAX_QUBITS as u32,
            });
        }
        let mut state = Self::new(n);
        for instruction in circuit.instructions() {
            state.apply(instruction, bindings)?;
        }
        Ok(state)
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Measurement probabilities in the computational basis.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// `⟨self|other⟩`.
    pub fn inner(&self, other: &Statevector) -> SimResult<Complex64> {
        if self.num_qubits != other.num_qubits {
            return Err(SimError::WidthMismatch {
                state: self.num_qubits as u32,
                operator: other.num_qubits as u32,
            });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Apply an instruction to the statevector.
    pub fn apply(
        &mut self,
        instruction: &Instruction,
        bindings: &ParameterBindings,
    ) -> SimResult<()> {
        let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
        if let Some(&q) = qubits.iter().find(|&&q| q >= self.num_qubits) {
            return Err(SimError::QubitOutOfRange {
                qubit: q as u32,
                n_qubits: self.num_qubits as u32,
            });
        }
        match &instruction.gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::Y => self.apply_y(qubits[0]),
            StandardGate::Z => self.apply_z(qubits[0]),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::S => self.apply_phase(qubits[0], Complex64::new(0.0, 1.0)),
            StandardGate::Sdg => self.apply_phase(qubits[0], Complex64::new(0.0, -1.0)),
            StandardGate::Rx(theta) => self.apply_rx(qubits[0], theta.evaluate(bindings)?),
            StandardGate::Ry(theta) => self.apply_ry(qubits[0], theta.evaluate(bindings)?),
            StandardGate::Rz(theta) => self.apply_rz(qubits[0], theta.evaluate(bindings)?),
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
            StandardGate::CZ => self.apply_cz(qubits[0], qubits[1]),
        }
        Ok(())
    }

    // =========================================================================
    // Pauli strings
    // =========================================================================

    /// `P|ψ⟩` as a new state.
    pub fn apply_pauli(&self, pauli: &PauliString) -> SimResult<Statevector> {
        self.check_width(pauli)?;
        let (x, z) = pauli.masks();
        let (x, z) = (x as usize, z as usize);
        let mut out = vec![Complex64::new(0.0, 0.0); self.amplitudes.len()];
        for (i, amp) in self.amplitudes.iter().enumerate() {
            out[i ^ x] = pauli_phase(i, x, z) * amp;
        }
        Ok(Statevector {
            amplitudes: out,
            num_qubits: self.num_qubits,
        })
    }

    /// `exp(-i θ/2 · P)|ψ⟩ = cos(θ/2)|ψ⟩ - i sin(θ/2) P|ψ⟩`, in place.
    pub fn apply_pauli_rotation(&mut self, pauli: &PauliString, theta: f64) -> SimResult<()> {
        let rotated = self.apply_pauli(pauli)?;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for (a, b) in self.amplitudes.iter_mut().zip(rotated.amplitudes) {
            *a = c * *a + neg_i_s * b;
        }
        Ok(())
    }

    /// `⟨ψ|P|ψ⟩` (real for a Hermitian string).
    pub fn expectation(&self, pauli: &PauliString) -> SimResult<f64> {
        self.check_width(pauli)?;
        if pauli.is_identity() {
            return Ok(self.norm().powi(2));
        }
        let (x, z) = pauli.masks();
        let (x, z) = (x as usize, z as usize);
        let mut acc = Complex64::new(0.0, 0.0);
        for (i, amp) in self.amplitudes.iter().enumerate() {
            acc += self.amplitudes[i ^ x].conj() * pauli_phase(i, x, z) * amp;
        }
        Ok(acc.re)
    }

    /// `⟨ψ|H|ψ⟩`.
    pub fn expectation_hamiltonian(&self, hamiltonian: &Hamiltonian) -> SimResult<f64> {
        if hamiltonian.num_qubits() as usize > self.num_qubits {
            return Err(SimError::WidthMismatch {
                state: self.num_qubits as u32,
                operator: hamiltonian.num_qubits(),
            });
        }
        let mut energy = 0.0;
        for term in hamiltonian.terms() {
            energy += term.coeff * self.expectation(&term.pauli)?;
        }
        Ok(energy)
    }

    fn check_width(&self, pauli: &PauliString) -> SimResult<()> {
        match pauli.max_qubit() {
            Some(q) if q as usize >= self.num_qubits => Err(SimError::QubitOutOfRange {
                qubit: q,
                n_qubits: self.num_qubits as u32,
            }),
            _ => Ok(()),
        }
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        self.apply_phase(qubit, Complex64::new(-1.0, 0.0));
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = FRAC_1_SQRT_2 * (a + b);
                self.amplitudes[j] = FRAC_1_SQRT_2 * (a - b);
            }
        }
    }

    fn apply_phase(&mut self, qubit: usize, phase: Complex64) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == 0 {
                *amp *= phase_0;
            } else {
                *amp *= phase_1;
            }
        }
    }

    // =========================================================================
    // Two-qubit gate implementations
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let mask = (1 << control) | (1 << target);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp = -*amp;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lithos_ir::{ParameterExpression, QubitId};

    fn run(circuit: &Circuit) -> Statevector {
        Statevector::run(circuit, &ParameterBindings::new()).unwrap()
    }

    #[test]
    fn bell_state_amplitudes() {
        let mut c = Circuit::new("bell", 2);
        c.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        let sv = run(&c);
        let p = sv.probabilities();
        assert_abs_diff_eq!(p[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p[3], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1] + p[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn x_sets_low_bit_for_qubit_zero() {
        let mut c = Circuit::new("x", 3);
        c.x(QubitId(0)).unwrap();
        let sv = run(&c);
        assert_abs_diff_eq!(sv.amplitudes()[1].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bound_rotation() {
        let mut c = Circuit::new("ry", 1);
        c.ry(ParameterExpression::symbol("t"), QubitId(0)).unwrap();
        let mut b = ParameterBindings::new();
        b.insert("t", std::f64::consts::PI);
        let sv = Statevector::run(&c, &b).unwrap();
        assert_abs_diff_eq!(sv.probabilities()[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn unbound_rotation_is_error() {
        let mut c = Circuit::new("ry", 1);
        c.ry(ParameterExpression::symbol("t"), QubitId(0)).unwrap();
        assert!(Statevector::run(&c, &ParameterBindings::new()).is_err());
    }

    #[test]
    fn expectation_of_z_and_y() {
        let sv = Statevector::from_basis_state(2, 0b01);
        let z0 = PauliString::from_label("IZ").unwrap();
        let z1 = PauliString::from_label("ZI").unwrap();
        assert_abs_diff_eq!(sv.expectation(&z0).unwrap(), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sv.expectation(&z1).unwrap(), 1.0, epsilon = 1e-12);

        // Rx(-π/2)|0⟩ is the +1 eigenstate of Y.
        let mut c = Circuit::new("y", 1);
        c.rx(-std::f64::consts::FRAC_PI_2, QubitId(0)).unwrap();
        let sv = run(&c);
        let y = PauliString::from_label("Y").unwrap();
        assert_abs_diff_eq!(sv.expectation(&y).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pauli_rotation_matches_gate() {
        let theta = 0.37;
        let mut c = Circuit::new("rx", 1);
        c.rx(theta, QubitId(0)).unwrap();
        let by_gate = run(&c);

        let mut by_rotation = Statevector::new(1);
        by_rotation
            .apply_pauli_rotation(&PauliString::from_label("X").unwrap(), theta)
            .unwrap();
        let overlap = by_gate.inner(&by_rotation).unwrap();
        assert_abs_diff_eq!(overlap.norm(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(overlap.re, 1.0, epsilon = 1e-12);
    }
}
