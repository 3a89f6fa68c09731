use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};

use surpass_ff::{create_surpass_energy, ByResidueEnergy, ForceFieldConfig, SurpassHydrogenBond,
                 TotalEnergyByResidue};
use surpass_io::{out_writer, read_to_string};
use surpass_model::{is_surpass_model, surpass_representation, surpass_secondary_structure,
                    SurpassSystem};
use surpass_pdb::{load_pdb_models, read_ss2, SecondaryStructure, Structure};
use surpass_sampling::{annealing_temperatures, CrmsdEvaluator, EndVectorObserver, IsothermalMC,
                       ObserveEnergyComponents, ObserveEvaluators, ObserveMoversAcceptance,
                       ObserveReplicaFlow, ObserveTopologyMatrix, Observer, PdbTrajectory,
                       PerturbChainFragment, PerturbResidue, ReplicaExchangeMC,
                       ReplicaExchangeObservationMode, RgSquare, SimulatedAnnealing, Timer,
                       TriggerLowEnergy};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
/// SURPASS: coarse grained simulations of protein systems
///
/// say surpass --help to see the options
struct Args {
    /// secondary structure prediction of the simulated protein (PsiPred SS2 format)
    #[clap(long = "in:ss2")]
    in_ss2: String,
    /// starting conformation in the PDB format
    #[clap(long = "in:pdb")]
    in_pdb: Option<String>,
    /// reference structure for the cRMSD evaluator
    #[clap(long = "in:pdb:native")]
    in_pdb_native: Option<String>,
    /// trajectory output file
    #[clap(long = "out:pdb", default_value = "tra.pdb")]
    out_pdb: String,
    /// additional trajectory holding only low-energy conformations
    #[clap(long = "out:pdb:min")]
    out_pdb_min: Option<String>,
    /// fraction by which the low-energy threshold relaxes toward the running minimum
    #[clap(long = "out:pdb:min:fraction", default_value_t = 0.1)]
    out_pdb_min_fraction: f64,
    /// starting threshold of the low-energy trajectory; the initial energy when omitted
    #[clap(long = "out:pdb:min:value")]
    out_pdb_min_value: Option<f64>,
    /// the number of outer Monte Carlo cycles
    #[clap(long = "mc:outer", default_value_t = 200)]
    mc_outer: usize,
    /// the number of inner Monte Carlo cycles
    #[clap(long = "mc:inner", default_value_t = 200)]
    mc_inner: usize,
    /// the number of MC sweeps within every inner cycle
    #[clap(long = "mc:cycle", default_value_t = 10)]
    mc_cycle: usize,
    /// maximum range(s) of a single-residue move; a comma-separated list is cycled over replicas
    #[clap(long = "jump:range", default_value = "0.5")]
    jump_range: String,
    /// maximum range(s) of a chain-fragment move; a comma-separated list is cycled over replicas
    #[clap(long = "jump:n:range")]
    jump_n_range: Option<String>,
    /// length of the fragment moved by the chain-fragment mover
    #[clap(long = "jump:n:len")]
    jump_n_len: Option<usize>,
    /// the highest temperature of the annealing schedule
    #[clap(long = "t:begin", default_value_t = 2.0)]
    t_begin: f64,
    /// the lowest temperature of the annealing schedule
    #[clap(long = "t:end", default_value_t = 0.5)]
    t_end: f64,
    /// the number of annealing temperature steps
    #[clap(long = "t:steps", default_value_t = 4)]
    t_steps: usize,
    /// comma-separated replica temperatures; switches to the replica exchange protocol
    #[clap(long = "replicas")]
    replicas: Option<String>,
    /// the number of replica exchange attempts
    #[clap(long = "replicas:exchanges", default_value_t = 10)]
    replicas_exchanges: usize,
    /// replica observation mode: 0 - isothermal files, 1 - isotemporal (per-replica) files
    #[clap(long = "replicas:mode", default_value_t = 0)]
    replicas_mode: u8,
    /// seed of the random number generator
    #[clap(long = "rnd:seed", default_value_t = 637)]
    rnd_seed: u64,
    /// directory holding the SURPASS parameter set
    #[clap(long = "data-dir", default_value = "./data")]
    data_dir: String,
    /// weighted score config; the default surpass.wghts of the parameter set when omitted
    #[clap(long = "ff:weights")]
    ff_weights: Option<String>,
}

fn main() {
    if env::var("RUST_LOG").is_err() { env::set_var("RUST_LOG", "info") }
    env_logger::init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let ss2_aa = read_ss2(&args.in_ss2)?;
    let Some(in_pdb) = args.in_pdb.as_deref() else {
        return Err("SURPASS requires a starting conformation in the PDB format (--in:pdb)".into());
    };

    let forcefield_dir: PathBuf = Path::new(&args.data_dir).join("forcefield");
    let weights_file = match args.ff_weights.as_deref() {
        Some(fname) => fname.to_string(),
        None => forcefield_dir.join("surpass.wghts").to_string_lossy().to_string(),
    };
    let config = ForceFieldConfig::from_string(&read_to_string(&weights_file)?)?;

    let structures = load_pdb_models(in_pdb)?;

    match args.replicas.as_deref() {
        Some(temperatures) => {
            let temperatures = parse_list(temperatures)?;
            if temperatures.len() < 2 {
                return Err("replica exchange requires at least two temperatures (--replicas)".into());
            }
            info!("replica temperatures: {:?}", temperatures);
            run_replicas(structures, &ss2_aa, &config, &forcefield_dir, temperatures, &args)
        }
        None => run_annealing(structures, &ss2_aa, &config, &forcefield_dir, &args),
    }
}

/// Derives the bead-level secondary structure matching a given structure.
fn bead_level_ss(strctr: &Structure, ss2_aa: &SecondaryStructure) -> SecondaryStructure {
    let chain_lengths: Vec<usize> = if is_surpass_model(strctr) {
        // the input already lost three residues per chain
        strctr.chain_ids().iter().map(|c| strctr.chain_residue_ids(c).len() + 3).collect()
    } else {
        strctr.chain_ids().iter()
            .map(|c| strctr.chain_atoms(c).iter().filter(|a| a.is_ca()).count())
            .collect()
    };
    surpass_secondary_structure(ss2_aa, &chain_lengths)
}

fn parse_list(text: &str) -> Result<Vec<f64>, Box<dyn Error>> {
    let mut values = Vec::new();
    for token in text.split(',') {
        values.push(token.trim().parse::<f64>()
            .map_err(|_| format!("can't parse a number from the list: {}", token))?);
    }
    Ok(values)
}

/// Wires the movers requested on the command line into a sampler.
fn add_movers(sampler: &mut IsothermalMC, n_beads: usize, which_replica: usize, args: &Args)
              -> Result<(), Box<dyn Error>> {

    let move_ranges = parse_list(&args.jump_range)?;
    let move_range = move_ranges[which_replica % move_ranges.len()];
    info!("jump range for replica {}: {}", which_replica, move_range);
    sampler.movers_mut().add_mover(Box::new(PerturbResidue::new(move_range)), n_beads as f64);

    if let Some(n) = args.jump_n_len {
        let n_ranges = match args.jump_n_range.as_deref() {
            Some(list) => parse_list(list)?,
            None => vec![0.5],
        };
        let n_range = n_ranges[which_replica % n_ranges.len()];
        sampler.movers_mut().add_mover(
            Box::new(PerturbChainFragment::new(n, n_range, 0.5)),
            n_beads as f64 / n as f64,
        );
    }
    Ok(())
}

/// Builds the cRMSD reference: the native structure when given, the starting conformation otherwise.
fn crmsd_reference(system: &SurpassSystem, ss2_aa: &SecondaryStructure, args: &Args)
                   -> Result<CrmsdEvaluator, Box<dyn Error>> {

    if let Some(native_fname) = args.in_pdb_native.as_deref() {
        let native = load_pdb_models(native_fname)?.swap_remove(0);
        let native_system = surpass_representation(&native, ss2_aa)?;
        if native_system.count_atoms() == system.count_atoms() {
            return Ok(CrmsdEvaluator::new(&native_system));
        }
        warn!("the native structure yields {} beads while the system has {}; \
               using the starting conformation as the cRMSD reference",
            native_system.count_atoms(), system.count_atoms());
    }
    Ok(CrmsdEvaluator::new(system))
}

/// Registers the standard observer roster at a sampler.
///
/// Files are named `<stem><suffix>`, e.g. `energy-1.000.dat` for a replica
/// at temperature 1.0 or plain `energy.dat` for an annealing run.
fn register_observers(sampler: &mut IsothermalMC, energy: &TotalEnergyByResidue,
                      hydrogen_bonds: &Option<Arc<SurpassHydrogenBond>>,
                      rmsd: CrmsdEvaluator, tra_fname: &str, suffix: &str) {

    if let Some(hb) = hydrogen_bonds {
        let topo = ObserveTopologyMatrix::new(hb.clone(), &format!("topology{}.dat", suffix));
        sampler.outer_cycle_observer(Box::new(topo));
    }

    let mut stats = ObserveEvaluators::new(&format!("observers{}.dat", suffix));
    stats.add_evaluator(Box::new(RgSquare));
    stats.add_evaluator(Box::new(Timer::new()));
    stats.add_evaluator(Box::new(rmsd));
    stats.observe_header();
    sampler.outer_cycle_observer(Box::new(stats));

    let mut obs_en = ObserveEnergyComponents::new(&format!("energy{}.dat", suffix));
    obs_en.observe_header_for(energy);
    sampler.outer_cycle_observer(Box::new(obs_en));

    let mut obs_ms = ObserveMoversAcceptance::new(&format!("movers{}.dat", suffix));
    obs_ms.observe_header_for(sampler.movers());
    sampler.outer_cycle_observer(Box::new(obs_ms));

    sampler.outer_cycle_observer(Box::new(EndVectorObserver::new(&format!("r_end{}.dat", suffix))));
    sampler.outer_cycle_observer(Box::new(PdbTrajectory::new(tra_fname, false)));
}

fn run_annealing(structures: Vec<Structure>, ss2_aa: &SecondaryStructure,
                 config: &ForceFieldConfig, forcefield_dir: &Path, args: &Args)
                 -> Result<(), Box<dyn Error>> {

    let starting_structure = &structures[0];
    let mut system = surpass_representation(starting_structure, ss2_aa)?;
    let scored_secondary = bead_level_ss(starting_structure, ss2_aa);
    let (energy, hydrogen_bonds) =
        create_surpass_energy(&system, &scored_secondary, config, forcefield_dir)?;
    info!("Initial energy: {:.3}", energy.calculate(&system));

    let mut sampler = IsothermalMC::new(args.t_begin, args.rnd_seed);
    sampler.cycles(args.mc_inner, args.mc_outer, args.mc_cycle);
    add_movers(&mut sampler, system.count_atoms(), 0, args)?;

    let rmsd = crmsd_reference(&system, ss2_aa, args)?;
    register_observers(&mut sampler, &energy, &hydrogen_bonds, rmsd, &args.out_pdb, "");

    if let Some(min_fname) = args.out_pdb_min.as_deref() {
        let mut min_tra = PdbTrajectory::new(min_fname, false);
        let max_energy = args.out_pdb_min_value.unwrap_or_else(|| energy.calculate(&system));
        min_tra.set_trigger(TriggerLowEnergy::new(max_energy, args.out_pdb_min_fraction));
        sampler.outer_cycle_observer(Box::new(min_tra));
    }

    let temperatures = annealing_temperatures(args.t_begin, args.t_end, args.t_steps);
    let mut annealing = SimulatedAnnealing::new(sampler, temperatures);
    annealing.run(&mut system, &energy);

    let mut final_pdb = out_writer("final.pdb", false);
    system.write_pdb(&mut final_pdb, 0)?;
    info!("Final energy: {:.3}", energy.calculate(&system));

    Ok(())
}

fn run_replicas(structures: Vec<Structure>, ss2_aa: &SecondaryStructure,
                config: &ForceFieldConfig, forcefield_dir: &Path,
                temperatures: Vec<f64>, args: &Args) -> Result<(), Box<dyn Error>> {

    let mut replicas: Vec<(SurpassSystem, IsothermalMC, TotalEnergyByResidue)> = Vec::new();
    for (i_replica, &temperature) in temperatures.iter().enumerate() {
        // when fewer models than replicas were supplied, the last one is repeated
        let strctr = &structures[i_replica.min(structures.len() - 1)];
        let system = surpass_representation(strctr, ss2_aa)?;
        let scored_secondary = bead_level_ss(strctr, ss2_aa);
        let (energy, hydrogen_bonds) =
            create_surpass_energy(&system, &scored_secondary, config, forcefield_dir)?;
        info!("Initial energy for replica {}: {:.3} at temperature {}",
            i_replica, energy.calculate(&system), temperature);

        let mut sampler = IsothermalMC::new(temperature, args.rnd_seed + 1 + i_replica as u64);
        sampler.cycles(args.mc_inner, args.mc_outer, args.mc_cycle);
        add_movers(&mut sampler, system.count_atoms(), i_replica, args)?;

        let rmsd = crmsd_reference(&system, ss2_aa, args)?;
        let suffix = format!("-{:.3}", temperature);
        let tra_fname = format!("tra-{:.3}.pdb", temperature);
        register_observers(&mut sampler, &energy, &hydrogen_bonds, rmsd, &tra_fname, &suffix);

        replicas.push((system, sampler, energy));
    }

    let observation_mode = match args.replicas_mode {
        0 => ReplicaExchangeObservationMode::Isothermal,
        _ => ReplicaExchangeObservationMode::Isotemporal,
    };
    let mut remc = ReplicaExchangeMC::new(replicas, observation_mode, args.rnd_seed);
    remc.exchange_observer(Box::new(ObserveReplicaFlow::new("replica_flow.dat")));
    remc.replica_exchanges(args.replicas_exchanges);
    remc.run();

    let mut final_pdb = out_writer("final.pdb", false);
    for (i_model, task) in remc.replicas().iter().enumerate() {
        task.system.write_pdb(&mut final_pdb, i_model + 1)?;
    }

    Ok(())
}
