//! Check a `.p7s` signature
//!
//! Prints the signature summary and, when possible, verifies it.
//!
//! Usage:
//!   cargo run --release --bin p7s_check -- contrato.pdf.p7s contrato.pdf
//!   cargo run --release --bin p7s_check -- contrato.pdf.p7s contrato.pdf --signer 1 --json
//!
//! Exit codes: 0 valid, 1 negative outcome, 2 usage or malformed input.

use p7s_oxide::{
    read_input, user_message, InputKind, SignatureSummary, SignatureVerifier, VerificationOutcome,
    VerifyOptions,
};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "Usage: p7s_check <signature.p7s> [content-file] [--signer N] [--json]";

struct CheckConfig {
    signature: PathBuf,
    content: Option<PathBuf>,
    signer_index: usize,
    json: bool,
}

impl CheckConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut positional = Vec::new();
        let mut signer_index = 0;
        let mut json = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--signer" => {
                    i += 1;
                    let value = args.get(i).ok_or("--signer needs a value")?;
                    signer_index = value
                        .parse()
                        .map_err(|_| format!("invalid signer index: {}", value))?;
                },
                "--json" => {
                    json = true;
                },
                "--help" | "-h" => return Err(USAGE.to_string()),
                other if other.starts_with("--") => {
                    return Err(format!("unknown option: {}", other));
                },
                other => positional.push(PathBuf::from(other)),
            }
            i += 1;
        }

        let mut positional = positional.into_iter();
        let signature = positional.next().ok_or_else(|| USAGE.to_string())?;
        let content = positional.next();
        if positional.next().is_some() {
            return Err(USAGE.to_string());
        }

        Ok(Self {
            signature,
            content,
            signer_index,
            json,
        })
    }
}

fn print_summary(summary: &SignatureSummary) {
    println!("SignedData:       {}", summary.is_signed_data);
    if !summary.is_signed_data {
        return;
    }
    println!("Detached:         {}", summary.detached);
    println!(
        "Digest algorithm: {}",
        summary.digest_algorithm_name().unwrap_or_else(|| "-".to_string())
    );
    for (i, signer) in summary.signers.iter().enumerate() {
        println!("Signer {}:", i);
        println!("  Issuer:       {}", signer.issuer_distinguished_name.as_deref().unwrap_or("-"));
        println!("  Serial:       {}", signer.serial_number.as_deref().unwrap_or("-"));
        match &signer.signing_time {
            Some(time) => println!("  Signing time: {}", time.to_rfc3339()),
            None => println!("  Signing time: -"),
        }
    }
}

fn run(config: &CheckConfig) -> Result<VerificationOutcome, p7s_oxide::Error> {
    let p7s = read_input(&config.signature)?;
    if InputKind::detect(&config.signature.to_string_lossy(), &p7s) == InputKind::Pdf {
        log::warn!("{} looks like a PDF, not a signature", config.signature.display());
    }

    let content = config.content.as_ref().map(read_input).transpose()?;
    let options = VerifyOptions::new().with_signer_index(config.signer_index);

    SignatureVerifier::new().verify(&p7s, content.as_deref(), &options)
}

fn main() -> ExitCode {
    env_logger::init();

    let config = match CheckConfig::from_args() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        },
    };

    let outcome = match run(&config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        },
    };

    if config.json {
        match outcome.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(2);
            },
        }
    } else {
        print_summary(&outcome.summary);
        println!();
        println!("{}", user_message(&outcome));
    }

    if outcome.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
