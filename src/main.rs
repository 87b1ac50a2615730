use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rand::rngs::OsRng;

use rsa_filesign::config::{
    SignerConfig, DEFAULT_KEY_BITS, DEFAULT_PRIMALITY_ROUNDS, DEFAULT_PUBLIC_EXPONENT,
    DEFAULT_SIGNATURE_EXTENSION,
};
use rsa_filesign::util::hash_file;
use rsa_filesign::workflow;

/// Exit status when a signature is checked and rejected
const EXIT_REJECTED: i32 = 2;

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rsa-filesign", version, about = "Sign and verify files with RSA over SHA-256")]
struct Cli {
    /// Log debug output (digests, signature previews)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extension appended to a file's name to locate its signature
    #[arg(long, global = true, default_value = DEFAULT_SIGNATURE_EXTENSION, env = "RSA_FILESIGN_SIG_EXT")]
    signature_extension: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a key pair and write the private and public key files
    Keygen(KeygenArgs),
    /// Sign a file, writing <FILE>.sig
    Sign {
        file: PathBuf,
        #[arg(short = 'k', long, default_value = "private.key")]
        private_key: PathBuf,
    },
    /// Verify a file against its signature
    Verify {
        file: PathBuf,
        #[arg(short = 'k', long, default_value = "public.key")]
        public_key: PathBuf,
        /// Signature file (defaults to <FILE>.sig)
        #[arg(short, long)]
        signature: Option<PathBuf>,
    },
    /// Print the SHA-256 digest of a file
    Hash { file: PathBuf },
}

#[derive(Args, Debug)]
struct KeygenArgs {
    /// Modulus size in bits
    #[arg(short, long, default_value_t = DEFAULT_KEY_BITS, env = "RSA_FILESIGN_KEY_BITS")]
    bits: u32,

    /// Starting public exponent
    #[arg(long, default_value_t = DEFAULT_PUBLIC_EXPONENT)]
    public_exponent: u64,

    /// Miller-Rabin rounds per candidate
    #[arg(long, default_value_t = DEFAULT_PRIMALITY_ROUNDS)]
    rounds: u32,

    /// Search for the two primes on separate threads
    #[arg(long)]
    parallel: bool,

    #[arg(long, default_value = "private.key")]
    private_key: PathBuf,

    #[arg(long, default_value = "public.key")]
    public_key: PathBuf,
}

// ── Entry Point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "rsa_filesign=debug"
    } else {
        "rsa_filesign=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(false)
        .init();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = SignerConfig::default().with_signature_extension(cli.signature_extension);

    match cli.command {
        Command::Keygen(args) => {
            let config = config
                .with_key_bits(args.bits)
                .with_public_exponent(args.public_exponent)
                .with_primality_rounds(args.rounds)
                .with_parallel_keygen(args.parallel);

            let public_key =
                workflow::generate_keys(&config, &args.private_key, &args.public_key, &mut OsRng)
                    .context("key generation failed")?;
            println!(
                "Generated {}-bit key pair: {} / {}",
                public_key.bit_length(),
                args.private_key.display(),
                args.public_key.display()
            );
            Ok(0)
        }
        Command::Sign { file, private_key } => {
            let output = workflow::sign_file(&file, &private_key, &config)
                .with_context(|| format!("signing {} failed", file.display()))?;
            println!("Signature saved to {}", output.display());
            Ok(0)
        }
        Command::Verify {
            file,
            public_key,
            signature,
        } => {
            let valid = match signature {
                Some(signature) => workflow::verify_file_with(&file, &signature, &public_key),
                None => workflow::verify_file(&file, &public_key, &config),
            }
            .with_context(|| format!("verifying {} failed", file.display()))?;

            if valid {
                println!("Signature is valid");
                Ok(0)
            } else {
                println!("Signature is NOT valid");
                Ok(EXIT_REJECTED)
            }
        }
        Command::Hash { file } => {
            let digest =
                hash_file(&file).with_context(|| format!("hashing {} failed", file.display()))?;
            println!("{}  {}", digest, file.display());
            Ok(0)
        }
    }
}
