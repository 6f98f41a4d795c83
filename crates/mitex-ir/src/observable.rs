//! Sparse Pauli observables.

use num_complex::Complex64;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::qubit::QubitId;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl Pauli {
    /// Parse a single-letter label.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Self::I),
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }

    /// Single-letter label.
    pub fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }
}

/// One weighted Pauli string, stored sparsely: qubits not listed carry the
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliTerm {
    /// (qubit, operator) pairs, sorted by qubit, identities dropped.
    pub paulis: Vec<(QubitId, Pauli)>,
    /// Weight of the term.
    pub coeff: Complex64,
}

/// A weighted sum of Pauli strings over `num_qubits` qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseObservable {
    num_qubits: u32,
    terms: Vec<PauliTerm>,
}

impl SparseObservable {
    /// Build from `(label, qubits, coeff)` triples, where `label[i]` acts on
    /// `qubits[i]`.
    ///
    /// ```rust
    /// use mitex_ir::SparseObservable;
    ///
    /// let obs = SparseObservable::from_sparse_list([("Z", vec![1], 1.0)], 3).unwrap();
    /// assert_eq!(obs.to_string(), "1 * IZI");
    /// ```
    pub fn from_sparse_list<L, C>(
        terms: impl IntoIterator<Item = (L, Vec<u32>, C)>,
        num_qubits: u32,
    ) -> IrResult<Self>
    where
        L: AsRef<str>,
        C: Into<Complex64>,
    {
        let mut out = Vec::new();
        for (label, qubits, coeff) in terms {
            let label = label.as_ref();
            let ops: Vec<char> = label.chars().collect();
            if ops.len() != qubits.len() {
                return Err(IrError::InvalidObservable(format!(
                    "label '{label}' has {} operators but {} qubits were given",
                    ops.len(),
                    qubits.len()
                )));
            }
            let mut seen = FxHashSet::default();
            let mut paulis = Vec::with_capacity(ops.len());
            for (c, q) in ops.into_iter().zip(qubits) {
                let pauli = Pauli::from_char(c).ok_or_else(|| {
                    IrError::InvalidObservable(format!("unknown Pauli label '{c}'"))
                })?;
                let qubit = QubitId(q);
                if q >= num_qubits {
                    return Err(IrError::ObservableQubitOutOfRange { qubit, num_qubits });
                }
                if !seen.insert(q) {
                    return Err(IrError::InvalidObservable(format!(
                        "qubit {qubit} appears twice in term '{label}'"
                    )));
                }
                if pauli != Pauli::I {
                    paulis.push((qubit, pauli));
                }
            }
            paulis.sort_by_key(|(q, _)| *q);
            out.push(PauliTerm {
                paulis,
                coeff: coeff.into(),
            });
        }
        if out.is_empty() {
            return Err(IrError::InvalidObservable("observable has no terms".into()));
        }
        Ok(Self {
            num_qubits,
            terms: out,
        })
    }

    /// A single Pauli on one qubit with the given weight.
    pub fn single(pauli: Pauli, qubit: u32, coeff: f64, num_qubits: u32) -> IrResult<Self> {
        Self::from_sparse_list([(pauli.as_char().to_string(), vec![qubit], coeff)], num_qubits)
    }

    /// Declared width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Terms, in insertion order.
    pub fn terms(&self) -> &[PauliTerm] {
        &self.terms
    }

    /// Whether every coefficient is real.
    pub fn is_hermitian(&self) -> bool {
        self.terms.iter().all(|t| t.coeff.im.abs() < 1e-12)
    }

    /// Qubits acted on non-trivially by some term.
    pub fn support(&self) -> Vec<QubitId> {
        let mut qs: Vec<QubitId> = self
            .terms
            .iter()
            .flat_map(|t| t.paulis.iter().map(|(q, _)| *q))
            .collect();
        qs.sort_unstable();
        qs.dedup();
        qs
    }

    /// Relabel onto a `num_physical`-qubit register, sending logical qubit
    /// `i` to `layout[i]`.
    pub fn apply_layout(&self, layout: &[QubitId], num_physical: u32) -> IrResult<Self> {
        if layout.len() < self.num_qubits as usize {
            return Err(IrError::IncompleteLayout {
                layout_len: layout.len(),
                needed: self.num_qubits,
            });
        }
        let mut terms = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            let mut paulis = Vec::with_capacity(term.paulis.len());
            for &(q, p) in &term.paulis {
                let phys = layout[q.index()];
                if phys.0 >= num_physical {
                    return Err(IrError::ObservableQubitOutOfRange {
                        qubit: phys,
                        num_qubits: num_physical,
                    });
                }
                paulis.push((phys, p));
            }
            paulis.sort_by_key(|(q, _)| *q);
            terms.push(PauliTerm {
                paulis,
                coeff: term.coeff,
            });
        }
        Ok(Self {
            num_qubits: num_physical,
            terms,
        })
    }

    /// Dense label of one term, qubit 0 rightmost.
    pub fn dense_label(&self, term: &PauliTerm) -> String {
        let mut chars = vec!['I'; self.num_qubits as usize];
        for &(q, p) in &term.paulis {
            chars[q.index()] = p.as_char();
        }
        chars.into_iter().rev().collect()
    }
}

impl fmt::Display for SparseObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if term.coeff.im == 0.0 {
                write!(f, "{} * {}", term.coeff.re, self.dense_label(term))?;
            } else {
                write!(f, "({}) * {}", term.coeff, self.dense_label(term))?;
            }
        }
        Ok(())
    }
}
