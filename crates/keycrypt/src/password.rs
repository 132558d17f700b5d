//! Password acquisition.

use core::fmt;
use std::io::Write;

use zeroize::Zeroizing;

use crate::error::KeycryptError;

/// Fixed interactive prompt text.
const PROMPT: &str = "key password: ";

/// Where the decryption password comes from.
///
/// The source is an explicit argument of every decrypt call; there is no
/// process-wide override state. Acquisition happens only after the envelope
/// has decoded and all algorithms have resolved, so malformed inputs never
/// trigger a prompt.
#[derive(Clone, Copy)]
pub enum PasswordSource<'a> {
    /// Use these bytes verbatim (automation and tests). Embedded whitespace
    /// and non-UTF-8 bytes are preserved; no prompt is shown and no default
    /// is substituted.
    Provided(&'a [u8]),

    /// Prompt on the terminal with echo disabled.
    Prompt,
}

impl PasswordSource<'_> {
    /// Produces the password bytes. Only `Prompt` can fail.
    pub fn acquire(&self) -> Result<Zeroizing<Vec<u8>>, KeycryptError> {
        match self {
            PasswordSource::Provided(bytes) => Ok(Zeroizing::new(bytes.to_vec())),
            PasswordSource::Prompt => prompt_password(),
        }
    }
}

// The provided variant holds the password; keep it out of Debug output.
impl fmt::Debug for PasswordSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordSource::Provided(_) => f.write_str("PasswordSource::Provided(..)"),
            PasswordSource::Prompt => f.write_str("PasswordSource::Prompt"),
        }
    }
}

fn prompt_password() -> Result<Zeroizing<Vec<u8>>, KeycryptError> {
    let mut stderr = std::io::stderr().lock();
    stderr
        .write_all(PROMPT.as_bytes())
        .and_then(|()| stderr.flush())
        .map_err(|err| KeycryptError::PasswordRead {
            reason: err.to_string(),
        })?;
    let entered = rpassword::read_password().map_err(|err| KeycryptError::PasswordRead {
        reason: err.to_string(),
    })?;
    Ok(Zeroizing::new(entered.into_bytes()))
}
