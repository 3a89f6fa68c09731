use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use surpass_io::split_into_strings;
use surpass_model::SurpassSystem;
use surpass_pdb::SecondaryStructure;

use crate::centrosymmetric::SurpassCentrosymmetricEnergy;
use crate::contact::SurpassContactEnergy;
use crate::energy::ByResidueEnergy;
use crate::errors::{ConfigError, EnergySetupError};
use crate::helix_stiffness::SurpassHelixStiffnessEnergy;
use crate::hydrogen_bond::SurpassHydrogenBond;
use crate::local_repulsion::SurpassLocalRepulsionEnergy;
use crate::local_terms::{SurpassA13, SurpassR12, SurpassR13, SurpassR14, SurpassR15};
use crate::total::TotalEnergyByResidue;

/// A single entry of the weighted score config: a term name, its weight and positional arguments.
#[derive(Clone, Debug)]
pub struct ScoreTerm {
    pub name: String,
    pub weight: f64,
    pub arguments: Vec<String>,
}

/// The weighted score configuration parsed from its small text format.
///
/// One component per non-blank, non-`#` line:
/// `<TermName> <weight> [<positional-arg>...]`, whitespace separated.
#[derive(Clone, Debug, Default)]
pub struct ForceFieldConfig {
    terms: Vec<ScoreTerm>,
}

impl ForceFieldConfig {
    /// Parses the config from text; lines shorter than 5 characters are skipped.
    pub fn from_string(cfg: &str) -> Result<ForceFieldConfig, ConfigError> {
        let mut terms: Vec<ScoreTerm> = Vec::new();
        for line in cfg.lines() {
            let trimmed = line.trim();
            if trimmed.len() < 5 || trimmed.starts_with('#') { continue; }
            let tokens = split_into_strings(trimmed);
            if tokens.len() < 2 {
                warn!("skipping a score config line with less than 2 tokens: {}", trimmed);
                continue;
            }
            let weight: f64 = tokens[1].parse()
                .map_err(|_| ConfigError::MalformedScoreLine { line: trimmed.to_string() })?;
            terms.push(ScoreTerm {
                name: tokens[0].clone(),
                weight,
                arguments: tokens[2..].to_vec(),
            });
        }
        Ok(ForceFieldConfig { terms })
    }

    /// The parsed score terms, in file order
    pub fn terms(&self) -> &[ScoreTerm] { &self.terms }
}

fn parameter_file(term: &ScoreTerm, which_arg: usize, data_dir: &Path, default_file: &str) -> String {
    match term.arguments.get(which_arg).map(|s| s.as_str()) {
        None | Some("-") => data_dir.join(default_file).to_string_lossy().to_string(),
        Some(fname) => fname.to_string(),
    }
}

fn float_argument(term: &ScoreTerm, which_arg: usize, default: f64) -> Result<f64, ConfigError> {
    match term.arguments.get(which_arg) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::MalformedArgument {
            term: term.name.clone(),
            value: v.clone(),
        }),
    }
}

/// Builds the SURPASS energy function from a parsed score config.
///
/// The secondary structure must already be at the bead level (one position per
/// bead; see `surpass_secondary_structure()` of the model crate). A single
/// hydrogen bond analyzer instance is shared between the bond term and the
/// contact term; the instance is also returned so topology observers can watch
/// it. Unknown term names fail the whole setup.
pub fn create_surpass_energy(
    system: &SurpassSystem,
    scored_secondary: &SecondaryStructure,
    config: &ForceFieldConfig,
    data_dir: &Path,
) -> Result<(TotalEnergyByResidue, Option<Arc<SurpassHydrogenBond>>), EnergySetupError> {

    let mut total = TotalEnergyByResidue::new();
    let mut shared_hb: Option<Arc<SurpassHydrogenBond>> = None;
    let mut hydrogen_bonds = |system: &SurpassSystem| -> Arc<SurpassHydrogenBond> {
        shared_hb.get_or_insert_with(|| Arc::new(SurpassHydrogenBond::new(system))).clone()
    };

    for term in config.terms() {
        debug!("creating the {} energy term with weight {} and {} argument(s)",
            term.name, term.weight, term.arguments.len());
        let component: Arc<dyn ByResidueEnergy> = match term.name.as_str() {
            "SurpassHydrogenBond" => hydrogen_bonds(system),
            "SurpassContactEnergy" => {
                let high = float_argument(term, 0, 2.0)?;
                let low = float_argument(term, 1, -2.0)?;
                let shift = float_argument(term, 2, 0.2)?;
                Arc::new(SurpassContactEnergy::new(hydrogen_bonds(system), data_dir, high, low, shift)?)
            }
            "SurpassCentrosymmetricEnergy" => {
                let ff_file = parameter_file(term, 0, data_dir, SurpassCentrosymmetricEnergy::default_parameter_file());
                let pseudocounts = float_argument(term, 1, -1.0)?;
                Arc::new(SurpassCentrosymmetricEnergy::new(&ff_file, pseudocounts)?)
            }
            "SurpassLocalRepulsionEnergy" => {
                let penalty = float_argument(term, 0, 4.0)?;
                Arc::new(SurpassLocalRepulsionEnergy::new(data_dir, penalty)?)
            }
            "SurpassHelixStiffnessEnergy" => {
                Arc::new(SurpassHelixStiffnessEnergy::new(data_dir)?)
            }
            "SurpassR12" => {
                let ff_file = parameter_file(term, 0, data_dir, SurpassR12::default_parameter_file());
                Arc::new(SurpassR12::new(scored_secondary, &ff_file, float_argument(term, 1, -1.0)?)?)
            }
            "SurpassR13" => {
                let ff_file = parameter_file(term, 0, data_dir, SurpassR13::default_parameter_file());
                Arc::new(SurpassR13::new(scored_secondary, &ff_file, float_argument(term, 1, -1.0)?)?)
            }
            "SurpassR14" => {
                let ff_file = parameter_file(term, 0, data_dir, SurpassR14::default_parameter_file());
                Arc::new(SurpassR14::new(scored_secondary, &ff_file, float_argument(term, 1, -1.0)?)?)
            }
            "SurpassR15" => {
                let ff_file = parameter_file(term, 0, data_dir, SurpassR15::default_parameter_file());
                Arc::new(SurpassR15::new(scored_secondary, &ff_file, float_argument(term, 1, -1.0)?)?)
            }
            "SurpassA13" => {
                let ff_file = parameter_file(term, 0, data_dir, SurpassA13::default_parameter_file());
                Arc::new(SurpassA13::new(scored_secondary, &ff_file, float_argument(term, 1, -1.0)?)?)
            }
            other => {
                return Err(ConfigError::UnknownTermName { name: other.to_string() }.into());
            }
        };
        total.add_component(component, term.weight);
    }
    info!("energy function assembled from {} component(s)", total.count_components());

    Ok((total, shared_hb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_a_score_config() {
        let cfg = ForceFieldConfig::from_string(
            "# a comment\n\
             SurpassContactEnergy\t0.8 2.0 -2.0 0.2\n\
             \n\
             SurpassHydrogenBond 1.0\n").unwrap();
        assert_eq!(cfg.terms().len(), 2);
        assert_eq!(cfg.terms()[0].name, "SurpassContactEnergy");
        assert!((cfg.terms()[0].weight - 0.8).abs() < 1e-12);
        assert_eq!(cfg.terms()[0].arguments, vec!["2.0", "-2.0", "0.2"]);
        assert!(cfg.terms()[1].arguments.is_empty());
    }

    #[test]
    fn unparsable_weight_is_an_error() {
        assert!(ForceFieldConfig::from_string("SurpassHydrogenBond one_half\n").is_err());
    }
}
