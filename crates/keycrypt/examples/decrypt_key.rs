//! Decrypt a PBES2-encrypted PKCS#8 private key (`ENCRYPTED PRIVATE KEY`).
//!
//! Accepts either PEM armor or raw DER, prints a one-line summary of the key
//! algorithm to stderr, and writes the decrypted key back out as unencrypted
//! PKCS#8 (`PRIVATE KEY` PEM by default, raw DER with `--der`).
//!
//! ## Usage
//!
//! ```bash
//! # Print help
//! cargo run -p keycrypt --example decrypt_key -- --help
//!
//! # Decrypt to a file, prompting for the password on the terminal
//! cargo run -p keycrypt --example decrypt_key -- \
//!   --input key.pem --output plain.pem
//!
//! # Decrypt to stdout with the password on the command line
//! cargo run -p keycrypt --example decrypt_key -- \
//!   --input key.pem --password 'correct horse battery staple' > plain.pem
//!
//! # Emit raw PKCS#8 DER instead of PEM
//! cargo run -p keycrypt --example decrypt_key -- \
//!   --input key.der --password 'pw' --der --output plain.der
//! ```
//!
//! Passing `--password` on the command line exposes it to process listings;
//! omit the flag to be prompted instead.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use keycrypt::{
    decrypt_encrypted_private_key, decrypt_encrypted_private_key_pem, PasswordSource, PrivateKey,
};
use pkcs8::EncodePrivateKey;

fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(ParseOutcome::Help(msg)) => {
            print!("{msg}");
            return;
        }
        Err(ParseOutcome::Error(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let raw = match std::fs::read(&args.input) {
        Ok(b) => b,
        Err(err) => {
            eprintln!("error: failed to read {}: {err}", args.input.display());
            std::process::exit(1);
        }
    };

    let source = match &args.password {
        Some(pw) => PasswordSource::Provided(pw.as_bytes()),
        None => PasswordSource::Prompt,
    };

    let decrypted = if looks_like_pem(&raw) {
        match std::str::from_utf8(&raw) {
            Ok(text) => decrypt_encrypted_private_key_pem(text, &source),
            Err(err) => {
                eprintln!(
                    "error: {} looks like PEM but is not UTF-8: {err}",
                    args.input.display()
                );
                std::process::exit(1);
            }
        }
    } else {
        decrypt_encrypted_private_key(&raw, &source)
    };
    let key = match decrypted {
        Ok(key) => key,
        Err(err) => {
            eprintln!("error: failed to decrypt {}: {err}", args.input.display());
            std::process::exit(1);
        }
    };

    eprintln!("decrypted a {} private key", key.algorithm_name());

    let document = match &key {
        PrivateKey::Rsa(k) => k.to_pkcs8_der(),
        PrivateKey::EcdsaP256(k) => k.to_pkcs8_der(),
        PrivateKey::Ed25519(k) => k.to_pkcs8_der(),
    };
    let document = match document {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("error: failed to re-encode the decrypted key: {err}");
            std::process::exit(1);
        }
    };

    let output = if args.der {
        document.as_bytes().to_vec()
    } else {
        match pem_rfc7468::encode_string(
            "PRIVATE KEY",
            pem_rfc7468::LineEnding::LF,
            document.as_bytes(),
        ) {
            Ok(pem) => pem.into_bytes(),
            Err(err) => {
                eprintln!("error: failed to PEM-encode the decrypted key: {err}");
                std::process::exit(1);
            }
        }
    };

    if let Some(out_path) = &args.output {
        if let Err(err) = std::fs::write(out_path, &output) {
            eprintln!("error: failed to write {}: {err}", out_path.display());
            std::process::exit(1);
        }
    } else {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = stdout.write_all(&output) {
            eprintln!("error: failed to write the decrypted key to stdout: {err}");
            std::process::exit(1);
        }
    }
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(0);
    bytes[start..].starts_with(b"-----BEGIN")
}

struct Args {
    input: PathBuf,
    password: Option<String>,
    der: bool,
    output: Option<PathBuf>,
}

enum ParseOutcome {
    Help(String),
    Error(String),
}

impl Args {
    fn parse() -> Result<Self, ParseOutcome> {
        let mut input: Option<PathBuf> = None;
        let mut password: Option<String> = None;
        let mut der = false;
        let mut output: Option<PathBuf> = None;

        let mut argv = std::env::args_os();
        let exe = argv.next().unwrap_or_else(|| OsString::from("decrypt_key"));

        while let Some(arg) = argv.next() {
            match arg.to_string_lossy().as_ref() {
                "-h" | "--help" => {
                    return Err(ParseOutcome::Help(Self::help(&exe)));
                }
                "--input" => {
                    let Some(v) = argv.next() else {
                        return Err(ParseOutcome::Error(format!(
                            "error: --input requires a value\n\n{}",
                            Self::help(&exe)
                        )));
                    };
                    input = Some(PathBuf::from(v));
                }
                "--password" => {
                    let Some(v) = argv.next() else {
                        return Err(ParseOutcome::Error(format!(
                            "error: --password requires a value\n\n{}",
                            Self::help(&exe)
                        )));
                    };
                    password = Some(v.to_string_lossy().to_string());
                }
                "--der" => {
                    der = true;
                }
                "--output" => {
                    let Some(v) = argv.next() else {
                        return Err(ParseOutcome::Error(format!(
                            "error: --output requires a value\n\n{}",
                            Self::help(&exe)
                        )));
                    };
                    output = Some(PathBuf::from(v));
                }
                other => {
                    return Err(ParseOutcome::Error(format!(
                        "error: unrecognized argument `{other}`\n\n{}",
                        Self::help(&exe)
                    )));
                }
            }
        }

        let input = input.ok_or_else(|| {
            ParseOutcome::Error(format!(
                "error: missing required --input\n\n{}",
                Self::help(&exe)
            ))
        })?;

        Ok(Self {
            input,
            password,
            der,
            output,
        })
    }

    fn help(exe: &OsString) -> String {
        let exe = exe.to_string_lossy();
        format!(
            "Usage: {exe} --input <path> [--password <pw>] [--der] [--output <path>]\n\
             \n\
             Decrypt a PBES2-encrypted PKCS#8 private key (PEM or DER).\n\
             \n\
             Options:\n\
               --input <path>           Path to the encrypted key (PEM or raw DER)\n\
               --password <pw>          Password (omit to be prompted on the terminal)\n\
               --der                    Write raw PKCS#8 DER instead of PEM\n\
               --output <path>          Write the decrypted key to a file (defaults to stdout)\n\
               -h, --help               Print help\n"
        )
    }
}
