use std::io::BufRead;

use log::debug;

use surpass_io::open_file;

use crate::ParseError;

/// Secondary structure of a protein sequence in the three-letter `HEC` alphabet.
///
/// Besides the most likely state of each residue, the struct holds the full
/// probability triple `(pH, pE, pC)`; for annotations that come without
/// probabilities (e.g. derived from a structure) the triple is degenerate,
/// with probability one on the assigned state.
#[derive(Clone, Debug)]
pub struct SecondaryStructure {
    header: String,
    sequence: Vec<u8>,
    ss: Vec<u8>,
    fractions: Vec<[f64; 3]>,
}

/// Converts an `HEC` code into the index used by probability triples: 0 for H, 1 for E, 2 for C.
pub fn hec_to_index(code: u8) -> usize {
    match code {
        b'H' => 0,
        b'E' => 1,
        _ => 2,
    }
}

impl SecondaryStructure {
    /// Creates an annotation from a sequence and its secondary structure string.
    ///
    /// Both strings must have the same length; each residue gets a degenerate
    /// probability triple.
    pub fn new(header: &str, sequence: &str, ss: &str) -> SecondaryStructure {
        assert_eq!(sequence.len(), ss.len(), "sequence and secondary structure lengths differ");
        let mut out = SecondaryStructure {
            header: header.to_string(),
            sequence: sequence.bytes().collect(),
            ss: ss.bytes().collect(),
            fractions: vec![[0.0; 3]; ss.len()],
        };
        for i in 0..out.ss.len() {
            out.fractions[i][hec_to_index(out.ss[i])] = 1.0;
        }
        out
    }

    /// Header line describing this annotation
    pub fn header(&self) -> &str { &self.header }

    /// The number of annotated residues
    pub fn len(&self) -> usize { self.ss.len() }

    pub fn is_empty(&self) -> bool { self.ss.is_empty() }

    /// One-letter code of the `i`-th residue
    pub fn aa(&self, i: usize) -> u8 { self.sequence[i] }

    /// The most likely secondary structure state of the `i`-th residue
    pub fn ss(&self, i: usize) -> u8 { self.ss[i] }

    /// The whole secondary structure string
    pub fn ss_string(&self) -> String { String::from_utf8_lossy(&self.ss).to_string() }

    /// The `(pH, pE, pC)` probability triple of the `i`-th residue
    pub fn fractions(&self, i: usize) -> &[f64; 3] { &self.fractions[i] }

    /// Sets the probability triple of the `i`-th residue and re-derives its most likely state
    pub fn set_fractions(&mut self, i: usize, p_h: f64, p_e: f64, p_c: f64) {
        self.fractions[i] = [p_h, p_e, p_c];
        self.ss[i] = if p_h >= p_e && p_h >= p_c { b'H' } else if p_e >= p_c { b'E' } else { b'C' };
    }
}

/// Reads a secondary structure prediction in the PsiPred SS2 format.
///
/// Each data line provides: residue number, amino acid, predicted state and
/// the three probabilities in the `C H E` column order. Lines that don't start
/// with a number (the format header) are skipped.
pub fn read_ss2(fname: &str) -> Result<SecondaryStructure, ParseError> {
    let reader = open_file(fname)?;
    let mut sequence: Vec<u8> = Vec::new();
    let mut ss: Vec<u8> = Vec::new();
    let mut fractions: Vec<[f64; 3]> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() || tokens[0].parse::<usize>().is_err() { continue; }
        if tokens.len() < 6 {
            return Err(ParseError::InvalidSs2Line { line: line.clone() });
        }
        let aa = tokens[1].as_bytes()[0];
        let state = tokens[2].as_bytes()[0];
        let p_c: f64 = tokens[3].parse().map_err(|_| ParseError::InvalidSs2Line { line: line.clone() })?;
        let p_h: f64 = tokens[4].parse().map_err(|_| ParseError::InvalidSs2Line { line: line.clone() })?;
        let p_e: f64 = tokens[5].parse().map_err(|_| ParseError::InvalidSs2Line { line: line.clone() })?;
        sequence.push(aa);
        ss.push(state);
        fractions.push([p_h, p_e, p_c]);
    }

    if ss.is_empty() {
        return Err(ParseError::EmptySs2File { fname: fname.to_string() });
    }
    debug!("{} residues of secondary structure read from {}", ss.len(), fname);

    let mut out = SecondaryStructure::new(
        fname,
        &String::from_utf8_lossy(&sequence),
        &String::from_utf8_lossy(&ss),
    );
    for (i, f) in fractions.into_iter().enumerate() {
        out.set_fractions(i, f[0], f[1], f[2]);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_fractions() {
        let sec = SecondaryStructure::new("t", "GGGG", "HHEC");
        assert_eq!(sec.ss(0), b'H');
        assert_eq!(sec.fractions(0)[0], 1.0);
        assert_eq!(sec.fractions(2)[1], 1.0);
        assert_eq!(sec.fractions(3)[2], 1.0);
    }

    #[test]
    fn fractions_follow_the_max_state() {
        let mut sec = SecondaryStructure::new("t", "GG", "CC");
        sec.set_fractions(0, 0.8, 0.1, 0.1);
        assert_eq!(sec.ss(0), b'H');
        sec.set_fractions(1, 0.1, 0.7, 0.2);
        assert_eq!(sec.ss(1), b'E');
    }
}
