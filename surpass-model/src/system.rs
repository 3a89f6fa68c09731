use std::io::Write;

use surpass_pdb::calc::Vec3;

use crate::bead::{bead_atom_name, BEAD_C, BEAD_E, SurpassBead};

const CHAINS_ORDER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The SURPASS bead store: a fixed-size, chain-ordered sequence of beads.
///
/// Beads are allocated once at construction and never reallocated. In this
/// coarse-grained model every residue holds exactly one bead, so residue and
/// bead indexes coincide; the residue-level interface is nevertheless kept so
/// the energy functions stay expressed in residue terms.
///
/// Besides the coordinates the store keeps the secondary structure element
/// index: every maximal run of identically-typed beads within a chain is an
/// element, with all coil runs collapsed into the shared element `0`.
#[derive(Clone, Debug)]
pub struct SurpassSystem {
    beads: Vec<SurpassBead>,
    chain_ranges: Vec<(usize, usize)>,
    chain_names: Vec<String>,
    ss_element_for_atoms: Vec<u16>,
    beta_strand_for_atoms: Vec<Option<usize>>,
    atoms_in_beta: Vec<usize>,
    atoms_in_alfa: Vec<usize>,
    elements_beta: Vec<u16>,
    elements_alfa: Vec<u16>,
    alfa_ranges: Vec<(usize, usize)>,
    pdb_templates: Vec<(String, String)>,
    revision: u64,
    #[cfg(feature = "periodic-box")]
    box_len: f64,
    #[cfg(feature = "periodic-box")]
    box_len_half: f64,
}

#[cfg(feature = "periodic-box")]
macro_rules! closest_image {
    ($delta:expr, $l:expr, $l2:expr) => {{
        let mut d = $delta;
        if d > $l2 { d -= $l } else if d < -$l2 { d += $l }
        d
    }};
}

impl SurpassSystem {
    /// Wraps a bead sequence into a system.
    ///
    /// Beads must come in chain-major, residue-major order; `chain_names`
    /// provides one identifier per chain. The constructor derives chain
    /// ranges, the SS-element index and the PDB line skeleton, and verifies
    /// that the cached chain assignment of every bead agrees with the derived
    /// ranges (an inconsistency here means a bug upstream and aborts).
    pub fn new(beads: Vec<SurpassBead>, chain_names: Vec<String>) -> SurpassSystem {
        let mut system = SurpassSystem {
            beads,
            chain_ranges: Vec::new(),
            chain_names,
            ss_element_for_atoms: Vec::new(),
            beta_strand_for_atoms: Vec::new(),
            atoms_in_beta: Vec::new(),
            atoms_in_alfa: Vec::new(),
            elements_beta: Vec::new(),
            elements_alfa: Vec::new(),
            alfa_ranges: Vec::new(),
            pdb_templates: Vec::new(),
            revision: 0,
            #[cfg(feature = "periodic-box")]
            box_len: 100000.0,
            #[cfg(feature = "periodic-box")]
            box_len_half: 50000.0,
        };
        system.assign_chain_ranges();
        system.assign_ss_elements();
        system.bake_pdb_templates();
        system.check_chain_index();
        system
    }

    /// Counts the beads of this system
    pub fn count_atoms(&self) -> usize { self.beads.len() }

    /// Counts the residues of this system; every residue holds a single bead
    pub fn count_residues(&self) -> usize { self.beads.len() }

    /// Counts the chains of this system
    pub fn count_chains(&self) -> usize { self.chain_ranges.len() }

    /// Provides read-only access to a bead
    pub fn bead(&self, i: usize) -> &SurpassBead { &self.beads[i] }

    /// Position of the `i`-th bead
    pub fn pos(&self, i: usize) -> Vec3 { self.beads[i].pos }

    /// Moves the `i`-th bead to a new position
    pub fn set_pos(&mut self, i: usize, new_pos: &Vec3) {
        self.beads[i].pos = *new_pos;
        self.revision += 1;
    }

    /// Bead type of the `i`-th bead: 0 for H, 1 for E, 2 for C
    pub fn bead_type(&self, i: usize) -> u8 { self.beads[i].bead_type }

    /// Residue type tag of the `i`-th bead
    pub fn residue_type(&self, i: usize) -> u8 { self.beads[i].residue_type }

    /// Monotonically increasing counter bumped at every coordinate change.
    ///
    /// Energy caches (the hydrogen bond analyzer in particular) compare this
    /// value against the revision they were computed at to skip redundant work.
    pub fn revision(&self) -> u64 { self.revision }

    /// Index of the chain a given bead belongs to
    pub fn chain_for_atom(&self, i: usize) -> usize { self.beads[i].chain as usize }

    /// The inclusive `(first, last)` bead range of a given chain
    pub fn atoms_for_chain(&self, chain: usize) -> (usize, usize) { self.chain_ranges[chain] }

    /// The inclusive bead range of a given residue; a single bead in this model
    pub fn atoms_for_residue(&self, residue: usize) -> (usize, usize) { (residue, residue) }

    /// Name of a given chain
    pub fn chain_name(&self, chain: usize) -> &str { &self.chain_names[chain] }

    // --- secondary structure element index

    /// Secondary structure element id of each bead; `0` denotes a loop
    pub fn ss_element_for_atoms(&self) -> &[u16] { &self.ss_element_for_atoms }

    /// Element id of the `i`-th bead
    pub fn ss_element(&self, i: usize) -> u16 { self.ss_element_for_atoms[i] }

    /// Ordinal of the strand a β bead belongs to, among all β elements; `None` for non-β beads.
    ///
    /// This ordinal is the dense key of the strand-level matrices built by the
    /// hydrogen bond analyzer.
    pub fn beta_strand_for_atom(&self, i: usize) -> Option<usize> { self.beta_strand_for_atoms[i] }

    /// Indexes of all β beads, in ascending order
    pub fn atoms_in_beta(&self) -> &[usize] { &self.atoms_in_beta }

    /// Indexes of all helical beads, in ascending order
    pub fn atoms_in_alfa(&self) -> &[usize] { &self.atoms_in_alfa }

    /// Ids of the elements that are β strands
    pub fn elements_beta(&self) -> &[u16] { &self.elements_beta }

    /// Ids of the elements that are helices
    pub fn elements_alfa(&self) -> &[u16] { &self.elements_alfa }

    /// The inclusive `(first, last)` bead range of every helix
    pub fn alfa_ranges(&self) -> &[(usize, usize)] { &self.alfa_ranges }

    // --- geometry

    /// Calculates the squared distance between two beads
    #[cfg(not(feature = "periodic-box"))]
    pub fn distance_squared(&self, i: usize, j: usize) -> f64 {
        let (pi, pj) = (&self.beads[i].pos, &self.beads[j].pos);
        let mut d = pi.x - pj.x;
        let mut d2 = d * d;
        d = pi.y - pj.y;
        d2 += d * d;
        d = pi.z - pj.z;
        d2 += d * d;
        d2
    }

    /// Calculates the squared distance between the closest images of two beads
    #[cfg(feature = "periodic-box")]
    pub fn distance_squared(&self, i: usize, j: usize) -> f64 {
        let (pi, pj) = (&self.beads[i].pos, &self.beads[j].pos);
        let mut d = closest_image!(pi.x - pj.x, self.box_len, self.box_len_half);
        let mut d2 = d * d;
        d = closest_image!(pi.y - pj.y, self.box_len, self.box_len_half);
        d2 += d * d;
        d = closest_image!(pi.z - pj.z, self.box_len, self.box_len_half);
        d2 + d * d
    }

    /// Calculates the distance between two beads
    pub fn distance(&self, i: usize, j: usize) -> f64 { self.distance_squared(i, j).sqrt() }

    /// Squared distance with an early exit: `None` once a partial sum exceeds the cutoff.
    #[cfg(not(feature = "periodic-box"))]
    pub fn distance_squared_within(&self, i: usize, j: usize, cutoff_squared: f64) -> Option<f64> {
        let (pi, pj) = (&self.beads[i].pos, &self.beads[j].pos);
        let mut d = pi.x - pj.x;
        let mut d2 = d * d;
        if d2 > cutoff_squared { return None; }
        d = pi.y - pj.y;
        d2 += d * d;
        if d2 > cutoff_squared { return None; }
        d = pi.z - pj.z;
        d2 += d * d;
        if d2 > cutoff_squared { None } else { Some(d2) }
    }

    /// Squared distance with an early exit: `None` once a partial sum exceeds the cutoff.
    #[cfg(feature = "periodic-box")]
    pub fn distance_squared_within(&self, i: usize, j: usize, cutoff_squared: f64) -> Option<f64> {
        let d2 = self.distance_squared(i, j);
        if d2 > cutoff_squared { None } else { Some(d2) }
    }

    /// Length of the cubic periodic box
    #[cfg(feature = "periodic-box")]
    pub fn box_len(&self) -> f64 { self.box_len }

    /// Sets the length of the cubic periodic box
    #[cfg(feature = "periodic-box")]
    pub fn set_box_len(&mut self, new_len: f64) {
        self.box_len = new_len;
        self.box_len_half = new_len / 2.0;
    }

    /// Calculates the center of mass of all beads
    pub fn center_of_mass(&self) -> Vec3 {
        let mut cm = Vec3::from_float(0.0);
        for b in &self.beads { cm += &b.pos; }
        cm /= self.beads.len() as f64;
        cm
    }

    // --- output

    /// Writes the current conformation in the PDB format.
    ///
    /// Every bead is emitted through its pre-baked line template where only
    /// the x, y and z fields are substituted; a positive `model_id` wraps the
    /// frame in `MODEL`/`ENDMDL` records.
    pub fn write_pdb(&self, out: &mut dyn Write, model_id: usize) -> std::io::Result<()> {
        if model_id > 0 { writeln!(out, "MODEL {:6}", model_id)?; }
        for (b, (prefix, suffix)) in self.beads.iter().zip(self.pdb_templates.iter()) {
            writeln!(out, "{}{:8.3}{:8.3}{:8.3}{}", prefix, b.pos.x, b.pos.y, b.pos.z, suffix)?;
        }
        if model_id > 0 { writeln!(out, "ENDMDL")?; }
        Ok(())
    }

    fn assign_chain_ranges(&mut self) {
        self.chain_ranges.clear();
        let mut first = 0;
        for i in 1..=self.beads.len() {
            if i == self.beads.len() || self.beads[i].chain != self.beads[first].chain {
                self.chain_ranges.push((first, i - 1));
                first = i;
            }
        }
        while self.chain_names.len() < self.chain_ranges.len() {
            let next = CHAINS_ORDER.chars().nth(self.chain_names.len() % CHAINS_ORDER.len()).unwrap();
            self.chain_names.push(next.to_string());
        }
    }

    fn assign_ss_elements(&mut self) {
        let n = self.beads.len();
        self.ss_element_for_atoms = vec![0; n];
        self.beta_strand_for_atoms = vec![None; n];
        let mut last_id: u16 = 0;
        let mut helix_first: Option<usize> = None;

        for i in 0..n {
            let t = self.beads[i].bead_type;
            let run_continues = i > 0
                && self.beads[i - 1].bead_type == t
                && self.beads[i - 1].chain == self.beads[i].chain;
            if t != BEAD_C && !run_continues {
                last_id += 1;
                if t == BEAD_E { self.elements_beta.push(last_id); }
                else { self.elements_alfa.push(last_id); }
            }
            if let Some(first) = helix_first {
                // close a helix run on type change or chain break
                if t == BEAD_E || t == BEAD_C || !run_continues {
                    self.alfa_ranges.push((first, i - 1));
                    helix_first = None;
                }
            }
            match t {
                BEAD_C => { self.ss_element_for_atoms[i] = 0; }
                BEAD_E => {
                    self.ss_element_for_atoms[i] = last_id;
                    self.beta_strand_for_atoms[i] = Some(self.elements_beta.len() - 1);
                    self.atoms_in_beta.push(i);
                }
                _ => {
                    self.ss_element_for_atoms[i] = last_id;
                    self.atoms_in_alfa.push(i);
                    if helix_first.is_none() { helix_first = Some(i); }
                }
            }
        }
        if let Some(first) = helix_first { self.alfa_ranges.push((first, n - 1)); }
    }

    fn bake_pdb_templates(&mut self) {
        self.pdb_templates.clear();
        for (i, b) in self.beads.iter().enumerate() {
            let chain_name = &self.chain_names[b.chain as usize];
            let chain_char = chain_name.chars().next().unwrap_or('A');
            let res_in_chain = i - self.chain_ranges[b.chain as usize].0 + 1;
            let prefix = format!(
                "ATOM  {:5} {} GLY {}{:4}    ",
                (i + 1) % 100000, bead_atom_name(b.bead_type), chain_char, res_in_chain % 10000
            );
            let suffix = format!("  1.00{:6.2}           C", b.b_factor);
            self.pdb_templates.push((prefix, suffix));
        }
    }

    fn check_chain_index(&self) {
        for (i_chain, (first, last)) in self.chain_ranges.iter().enumerate() {
            for i in *first..=*last {
                if self.beads[i].chain as usize != i_chain {
                    panic!(
                        "Inconsistent chain indexing for bead {}: cached {} vs derived {}",
                        i, self.beads[i].chain, i_chain
                    );
                }
            }
        }
        let n_in_chains: usize = self.chain_ranges.iter().map(|(f, l)| l + 1 - f).sum();
        if n_in_chains != self.beads.len() {
            panic!(
                "Chain ranges cover {} beads while the system has {}",
                n_in_chains, self.beads.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bead::{bead_type_from_ss, SurpassBead};
    use surpass_pdb::calc::Vec3;

    pub(crate) fn system_from_ss(ss: &str) -> SurpassSystem {
        let beads: Vec<SurpassBead> = ss.bytes().enumerate()
            .map(|(i, c)| SurpassBead::new(Vec3::new(i as f64 * 3.8, 0.0, 0.0), 0, i, bead_type_from_ss(c)))
            .collect();
        SurpassSystem::new(beads, vec![String::from("A")])
    }

    #[test]
    fn element_index_of_a_mixed_chain() {
        // strand, loop, strand, loop, helix
        let system = system_from_ss("EEECCEEECCHHH");
        assert_eq!(system.ss_element_for_atoms(), &[1, 1, 1, 0, 0, 2, 2, 2, 0, 0, 3, 3, 3]);
        assert_eq!(system.elements_beta(), &[1, 2]);
        assert_eq!(system.elements_alfa(), &[3]);
        assert_eq!(system.atoms_in_beta(), &[0, 1, 2, 5, 6, 7]);
        assert_eq!(system.beta_strand_for_atom(6), Some(1));
        assert_eq!(system.beta_strand_for_atom(3), None);
        assert_eq!(system.alfa_ranges(), &[(10, 12)]);
    }

    #[test]
    fn chain_ranges_and_counts() {
        let mut beads: Vec<SurpassBead> = Vec::new();
        for i in 0..7 { beads.push(SurpassBead::new(Vec3::from_float(i as f64), 0, i, BEAD_C)); }
        for i in 0..5 { beads.push(SurpassBead::new(Vec3::from_float(i as f64), 1, 7 + i, BEAD_C)); }
        let system = SurpassSystem::new(beads, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(system.count_chains(), 2);
        assert_eq!(system.atoms_for_chain(0), (0, 6));
        assert_eq!(system.atoms_for_chain(1), (7, 11));
        assert_eq!(system.chain_for_atom(8), 1);
        let total: usize = (0..system.count_chains())
            .map(|c| { let (f, l) = system.atoms_for_chain(c); l + 1 - f })
            .sum();
        assert_eq!(total, system.count_atoms());
    }

    #[test]
    fn revision_bumps_on_move() {
        let mut system = system_from_ss("CCCC");
        let r0 = system.revision();
        system.set_pos(2, &Vec3::new(1.0, 1.0, 1.0));
        assert!(system.revision() > r0);
    }

    #[test]
    fn distance_with_cutoff() {
        let system = system_from_ss("CC");
        assert!(system.distance_squared_within(0, 1, 100.0).is_some());
        assert!(system.distance_squared_within(0, 1, 1.0).is_none());
        assert!((system.distance(0, 1) - 3.8).abs() < 1e-10);
    }

    #[test]
    fn pdb_frame_has_model_records() {
        let system = system_from_ss("HEC");
        let mut buf: Vec<u8> = Vec::new();
        system.write_pdb(&mut buf, 1).unwrap();
        let txt = String::from_utf8(buf).unwrap();
        assert!(txt.starts_with("MODEL"));
        assert!(txt.contains(" H  "));
        assert!(txt.contains(" S  "));
        assert!(txt.trim_end().ends_with("ENDMDL"));
    }
}
