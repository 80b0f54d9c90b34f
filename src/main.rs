use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use pairwise_aligner::{
    fasta, Aligner, AlignerError, AlignerParameters, SubstitutionMatrix, DEFAULT_GAP_PENALTY,
};

#[derive(Parser)]
#[command(name = "pairwise_aligner")]
#[command(about = "Global pairwise alignment of protein sequences with a substitution matrix", long_about = None)]
#[command(version)]
struct Cli {
    /// First sequence (FASTA)
    #[arg(value_name = "SEQ1.FA")]
    seq1: PathBuf,

    /// Second sequence (FASTA)
    #[arg(value_name = "SEQ2.FA")]
    seq2: PathBuf,

    /// Score added for every gap position (usually negative)
    #[arg(short = 'g', long, value_name = "INT", default_value_t = DEFAULT_GAP_PENALTY, allow_negative_numbers = true)]
    gap_penalty: i32,

    /// Substitution matrix file in NCBI format [default: built-in BLOSUM62]
    #[arg(short = 'm', long, value_name = "FILE")]
    matrix: Option<PathBuf>,

    /// Align the first record of SEQ1.FA against every record of SEQ2.FA
    #[arg(long)]
    all: bool,

    /// Worker threads used with --all
    #[arg(short = 't', long, value_name = "INT", default_value_t = 1)]
    threads: usize,
}

fn exit_code(err: &AlignerError) -> u8 {
    match err {
        AlignerError::Io { .. } | AlignerError::InputUnavailable(_) => 2,
        AlignerError::MatrixUnavailable { .. } | AlignerError::MatrixFormat { .. } => 3,
        AlignerError::InvalidResidue(_) => 4,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<(), AlignerError> {
    let params = AlignerParameters::new()
        .with_gap_penalty(cli.gap_penalty)
        .with_threads(cli.threads)?;

    let query = fasta::read_sequence(&cli.seq1)?;
    let targets = if cli.all {
        fasta::read_sequences(&cli.seq2)?
    } else {
        vec![fasta::read_sequence(&cli.seq2)?]
    };

    let scoring = match &cli.matrix {
        Some(path) => SubstitutionMatrix::from_path(path)?,
        None => {
            info!("using built-in BLOSUM62");
            SubstitutionMatrix::blosum62()
        }
    };

    let aligner = Aligner::new(params).with_matrix(scoring);
    let ids: Vec<String> = targets.iter().map(|t| t.id().to_string()).collect();
    let pairs = targets.into_iter().map(|t| (query.clone(), t)).collect();
    let results = aligner.align_batch(pairs)?;

    for (id, result) in ids.iter().zip(&results) {
        if cli.all {
            println!(">{} vs {}", query.id(), id);
        }
        println!("{}", result);
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
