use std::sync::Arc;

use log::info;

use surpass_model::SurpassSystem;

use crate::array2d::Array2D;
use crate::energy::{ByResidueEnergy, REJECTED_ENERGY};

const MIN_COLUMN_WIDTH: usize = 7;

/// Calculates the system energy as a weighted combination of components.
///
/// Besides the weighted sums the struct exposes the unweighted value of every
/// component and the header line of the energy table written by observers.
#[derive(Clone, Default)]
pub struct TotalEnergyByResidue {
    components: Vec<Arc<dyn ByResidueEnergy>>,
    factors: Vec<f64>,
    widths: Vec<usize>,
}

macro_rules! weighted_sum {
    ($self:expr, $call:ident($($args:expr),*)) => {{
        let mut en = 0.0;
        for (component, factor) in $self.components.iter().zip($self.factors.iter()) {
            let value = component.$call($($args),*);
            if value == REJECTED_ENERGY { return REJECTED_ENERGY; }
            en += value * factor;
        }
        en
    }};
}

impl TotalEnergyByResidue {
    pub fn new() -> TotalEnergyByResidue { Default::default() }

    /// Adds an energy component; its value will be scaled by the given factor.
    pub fn add_component(&mut self, component: Arc<dyn ByResidueEnergy>, factor: f64) {
        info!("added a new energy component {} with weight = {}", component.name(), factor);
        self.widths.push(MIN_COLUMN_WIDTH.max(component.name().len()));
        self.components.push(component);
        self.factors.push(factor);
    }

    /// Counts the energy components stored in this container
    pub fn count_components(&self) -> usize { self.components.len() }

    /// Returns a requested energy component
    pub fn get_component(&self, which_component: usize) -> &Arc<dyn ByResidueEnergy> {
        &self.components[which_component]
    }

    /// The unweighted value of a given component
    pub fn calculate_component(&self, system: &SurpassSystem, which_component: usize) -> f64 {
        self.components[which_component].calculate(system)
    }

    /// The weights used to scale energy components
    pub fn get_factors(&self) -> &Vec<f64> { &self.factors }

    /// Text field width of every component column in the energy table
    pub fn get_widths(&self) -> &Vec<usize> { &self.widths }

    /// The header line for the energy table: component names followed by the total
    pub fn header_string(&self) -> String {
        let mut header = String::new();
        for (component, width) in self.components.iter().zip(self.widths.iter()) {
            header.push_str(&format!("{:>width$} ", component.name(), width = width));
        }
        header.push_str(&format!("{:>12}", self.name()));
        header
    }
}

impl ByResidueEnergy for TotalEnergyByResidue {
    fn calculate(&self, system: &SurpassSystem) -> f64 {
        weighted_sum!(self, calculate(system))
    }

    fn calculate_by_residue(&self, system: &SurpassSystem, which_residue: usize) -> f64 {
        weighted_sum!(self, calculate_by_residue(system, which_residue))
    }

    fn calculate_by_chunk(&self, system: &SurpassSystem, chunk_from: usize, chunk_to: usize) -> f64 {
        weighted_sum!(self, calculate_by_chunk(system, chunk_from, chunk_to))
    }

    fn calculate_map(&self, system: &SurpassSystem, energy_map: &mut Array2D<f64>) -> f64 {
        weighted_sum!(self, calculate_map(system, energy_map))
    }

    fn name(&self) -> &str { "TotalEnergy" }
}
