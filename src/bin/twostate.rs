use clap::{App, Arg, SubCommand};
use std::io::{BufWriter, Write};
use twostate::config::{ModelConfig, PRESETS};
use twostate::model::HiddenMarkovModel;
use twostate::{io, Error, Result};
#[macro_use]
extern crate log;

fn verbose_arg() -> Arg<'static, 'static> {
    Arg::with_name("verbose")
        .short("v")
        .multiple(true)
        .help("Debug mode")
}

fn model_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name("preset")
            .long("preset")
            .short("p")
            .takes_value(true)
            .default_value("casino")
            .possible_values(&PRESETS)
            .help("Built-in model. casino(1-6 die faces) or poisson(counts)."),
        Arg::with_name("model")
            .long("model")
            .short("m")
            .value_name("JSON")
            .takes_value(true)
            .help("Model configuration file. Overrides --preset."),
    ]
}

fn subcommand_decode() -> App<'static, 'static> {
    SubCommand::with_name("decode")
        .version("0.1")
        .about("Decode the most probable state path of a sequence.")
        .arg(verbose_arg())
        .args(&model_args())
        .arg(
            Arg::with_name("sequence")
                .value_name("SEQUENCE")
                .required(true)
                .help("Observations, one integer per line."),
        )
        .arg(
            Arg::with_name("states")
                .value_name("STATES")
                .help("Known states, one label per line. Printed for comparison."),
        )
        .arg(
            Arg::with_name("width")
                .long("width")
                .short("w")
                .takes_value(true)
                .default_value("60")
                .help("Number of states in a line. 0 for no wrapping."),
        )
}

fn subcommand_simulate() -> App<'static, 'static> {
    SubCommand::with_name("simulate")
        .version("0.1")
        .about("Generate a random sequence, with its states, from a model.")
        .arg(verbose_arg())
        .args(&model_args())
        .arg(
            Arg::with_name("length")
                .long("length")
                .short("l")
                .takes_value(true)
                .default_value("300")
                .help("Length of the sequence."),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("32389")
                .help("Seed"),
        )
        .arg(
            Arg::with_name("sequence")
                .long("sequence")
                .value_name("FILE")
                .takes_value(true)
                .help("Output of the sequence. Standard output if not given."),
        )
        .arg(
            Arg::with_name("states")
                .long("states")
                .value_name("FILE")
                .takes_value(true)
                .help("Output of the states."),
        )
}

fn subcommand_preset() -> App<'static, 'static> {
    SubCommand::with_name("preset")
        .version("0.1")
        .about("Print the configuration of a built-in model in JSON.")
        .arg(verbose_arg())
        .arg(
            Arg::with_name("name")
                .value_name("NAME")
                .required(true)
                .possible_values(&PRESETS),
        )
}

fn parse_arg<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> Result<T> {
    let value = matches.value_of(name).unwrap_or_default();
    value
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("{:?} for --{}", value, name)))
}

fn load_model(matches: &clap::ArgMatches) -> Result<HiddenMarkovModel> {
    let config = match matches.value_of("model") {
        Some(path) => ModelConfig::from_path(path)?,
        None => {
            let name = matches.value_of("preset").unwrap_or("casino");
            ModelConfig::preset(name).ok_or_else(|| Error::InvalidModel(name.to_string()))?
        }
    };
    let model = config.build()?;
    debug!("Model\n{}", model);
    Ok(model)
}

fn decode(matches: &clap::ArgMatches) -> Result<()> {
    let model = load_model(matches)?;
    let width: usize = parse_arg(matches, "width")?;
    let offset = model.emission.input_offset();
    let file = matches.value_of("sequence").unwrap_or_default();
    let observations = io::read_observations(file, offset)?;
    info!("Read {} observations", observations.len());
    let reference = match matches.value_of("states") {
        Some(file) => Some(io::read_states(file, &model.labels)?),
        None => None,
    };
    if let Some(reference) = reference.as_ref() {
        if reference.len() != observations.len() {
            return Err(Error::LengthMismatch {
                expected: observations.len(),
                actual: reference.len(),
            });
        }
    }
    let decoded = model.decode(&observations)?;
    let stdout = std::io::stdout();
    let mut wtr = BufWriter::new(stdout.lock());
    if let Some(reference) = reference.as_ref() {
        writeln!(wtr, "State solution:")?;
        io::write_wrapped(&mut wtr, reference, &model.labels, width)?;
        writeln!(wtr)?;
    }
    writeln!(wtr, "Viterbi output:")?;
    io::write_wrapped(&mut wtr, &decoded.path, &model.labels, width)?;
    if let Some(reference) = reference.as_ref() {
        let agree = decoded.agreement(reference)?;
        let len = decoded.len();
        let pct = 100f64 * agree as f64 / len as f64;
        writeln!(wtr, "Agreement: {}/{} ({:.1}%)", agree, len, pct)?;
        let lk = model.path_log_prob(&observations, reference)?;
        info!("Log probability: Viterbi {:.3}, reference {:.3}", decoded.log_prob, lk);
    } else {
        info!("Log probability: Viterbi {:.3}", decoded.log_prob);
    }
    wtr.flush()?;
    Ok(())
}

fn simulate(matches: &clap::ArgMatches) -> Result<()> {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    let model = load_model(matches)?;
    let length: usize = parse_arg(matches, "length")?;
    let seed: u64 = parse_arg(matches, "seed")?;
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
    let (states, observations) = twostate::gen_seq::simulate(&model, length, &mut rng)?;
    let offset = model.emission.input_offset();
    match matches.value_of("sequence") {
        Some(file) => {
            let mut wtr = std::fs::File::create(file).map(BufWriter::new)?;
            io::write_observations(&mut wtr, &observations, offset)?;
            wtr.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut wtr = BufWriter::new(stdout.lock());
            io::write_observations(&mut wtr, &observations, offset)?;
            wtr.flush()?;
        }
    }
    if let Some(file) = matches.value_of("states") {
        let mut wtr = std::fs::File::create(file).map(BufWriter::new)?;
        io::write_states(&mut wtr, &states, &model.labels)?;
        wtr.flush()?;
    }
    debug!("Simulated {} observations", length);
    Ok(())
}

fn preset(matches: &clap::ArgMatches) -> Result<()> {
    let name = matches.value_of("name").unwrap_or_default();
    let config = ModelConfig::preset(name).ok_or_else(|| Error::InvalidModel(name.to_string()))?;
    let stdout = std::io::stdout();
    let mut wtr = stdout.lock();
    config.to_writer(&mut wtr)?;
    writeln!(wtr)?;
    Ok(())
}

fn main() {
    let matches = App::new("twostate")
        .version("0.1")
        .about("Decode:[SEQUENCE]x[STATES]->[PATH], Simulate:[MODEL]->[SEQUENCE]x[STATES]")
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .subcommand(subcommand_decode())
        .subcommand(subcommand_simulate())
        .subcommand(subcommand_preset())
        .get_matches();
    if let Some(sub_m) = matches.subcommand().1 {
        let level = match sub_m.occurrences_of("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }
    debug!("Start");
    let result = match matches.subcommand() {
        ("decode", Some(sub_m)) => decode(sub_m),
        ("simulate", Some(sub_m)) => simulate(sub_m),
        ("preset", Some(sub_m)) => preset(sub_m),
        _ => unreachable!(),
    };
    if let Err(why) = result {
        eprintln!("error: {}", why);
        std::process::exit(1);
    }
}
