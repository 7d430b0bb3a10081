use log::{LevelFilter, error, info};
use rust_lib_reference_genome::reference_genome::ReferenceGenome;
use std::path::Path;
use std::time::Instant;

use vcfdist::cli::core::{Commands, get_cli};
use vcfdist::cli::distance::{DistanceSettings, check_distance_settings};
use vcfdist::cli::realign::{RealignSettings, check_realign_settings};
use vcfdist::data_types::callset::Callset;
use vcfdist::distance_solver::{DistanceConfigBuilder, solve_callsets};
use vcfdist::parsing::noodles_helper::LoadedBed;
use vcfdist::parsing::vcf_loader::{LoadConfig, LoadConfigBuilder, load_callset};
use vcfdist::realigner::{RealignConfigBuilder, realign_callset};
use vcfdist::writers::output_folder::{write_distance_outputs, write_realign_outputs};

fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

fn build_thread_pool(threads: usize) {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
        Ok(()) => {},
        Err(e) => {
            error!("Error while building thread pool: {e}");
            std::process::exit(exitcode::OSERR);
        }
    };
}

fn load_reference(reference_fn: &Path) -> ReferenceGenome {
    info!("Pre-loading reference genome into memory...");
    match ReferenceGenome::from_fasta(reference_fn) {
        Ok(rg) => rg,
        Err(e) => {
            error!("Error while loading reference genome: {e:?}");
            std::process::exit(exitcode::IOERR);
        }
    }
}

fn load_regions(regions: Option<&Path>) -> Option<LoadedBed> {
    regions.map(|bed_fn| {
        info!("Pre-loading regions into memory...");
        match LoadedBed::preload_bed_file(bed_fn) {
            Ok(bed) => {
                info!("Loaded {} bases of regions across {} contigs.", bed.total_bases(), bed.chrom_lookup().len());
                bed
            },
            Err(e) => {
                error!("Error while loading regions: {e:#}");
                std::process::exit(exitcode::IOERR);
            }
        }
    })
}

fn load_or_exit(vcf_fn: &Path, sample: &str, label: &str, regions: Option<&LoadedBed>, config: LoadConfig) -> Callset {
    match load_callset(vcf_fn, sample, label, regions, config) {
        Ok(callset) => callset,
        Err(e) => {
            error!("Error while loading {label} variants: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }
}

fn build_load_config(gap: usize, min_quality: f32, min_size: usize, max_size: usize) -> LoadConfig {
    match LoadConfigBuilder::default()
        .gap(gap)
        .min_quality(min_quality)
        .min_size(min_size)
        .max_size(max_size)
        .build() {
        Ok(lc) => lc,
        Err(e) => {
            error!("Error while building load config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    }
}

fn run_distance(settings: DistanceSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    init_logging(settings.verbosity);

    let settings = match check_distance_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    build_thread_pool(settings.threads);

    let reference_genome = load_reference(&settings.reference_fn);
    let regions = load_regions(settings.regions.as_deref());

    let load_config = build_load_config(settings.gap, settings.min_quality, settings.min_size, settings.max_size);
    let truth_callset = load_or_exit(&settings.truth_vcf_filename, &settings.truth_sample, "truth", regions.as_ref(), load_config);
    let query_callset = load_or_exit(&settings.query_vcf_filename, &settings.query_sample, "query", regions.as_ref(), load_config);

    // build our configuration
    let distance_config = match DistanceConfigBuilder::default()
        .gap(settings.gap)
        .max_edit_distance(settings.max_edit_distance)
        .render_alignments(settings.verbosity >= 2)
        .build() {
        Ok(dc) => dc,
        Err(e) => {
            error!("Error while building distance config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    // everything is solved before any output gets written
    info!("Measuring distance of query from truth...");
    let results = match solve_callsets(&query_callset, &truth_callset, &reference_genome, distance_config) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while measuring distance: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("Total distance: {} across {} superclusters", results.total_distance(), results.num_superclusters());

    // the output folder is only created once every contig has been solved
    if let Err(e) = write_distance_outputs(
        &settings.output_folder, &settings, &results, &settings.query_sample, &settings.truth_sample
    ) {
        error!("Error while saving output files: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Distance completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_realign(settings: RealignSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    init_logging(settings.verbosity);

    let settings = match check_realign_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    build_thread_pool(settings.threads);

    let reference_genome = load_reference(&settings.reference_fn);
    let regions = load_regions(settings.regions.as_deref());

    let load_config = build_load_config(settings.gap, settings.min_quality, settings.min_size, settings.max_size);
    let callset = load_or_exit(&settings.vcf_filename, &settings.sample, "input", regions.as_ref(), load_config);

    let realign_config = match RealignConfigBuilder::default()
        .render_alignments(settings.verbosity >= 2)
        .build() {
        Ok(rc) => rc,
        Err(e) => {
            error!("Error while building realign config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    let results = match realign_callset(&callset, &reference_genome, realign_config) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while realigning clusters: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    if let Err(e) = write_realign_outputs(&settings.output_folder, &settings, &results) {
        error!("Error while saving output files: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Realign completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Distance(settings) => {
            run_distance(*settings);
        },
        Commands::Realign(settings) => {
            run_realign(*settings);
        }
    }

    info!("Process finished successfully.");
}
