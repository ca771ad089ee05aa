//! Display Name Generation
//!
//! Default display names for peers that do not pick one.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random suffix in generated display names.
const SUFFIX_LEN: usize = 5;

/// Generates a display name of the form `<prefix>-<5 alphanumerics>`.
///
/// Used by the terminal client (`Guest-…`) and the bot (`AI-…`) when no
/// name is given on the command line.
pub fn random_display_name(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();

    format!("{}-{}", prefix, suffix)
}
