//! Configuration and context for result validation.

use {trezoa_account::Account, trezoa_pubkey::Pubkey, trezoa_rent::Rent};

/// How failed checks are reported.
pub struct Config {
    /// Panic on the first failed check.
    pub panic: bool,
    /// When not panicking, print each failed check.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panic: true,
            verbose: false,
        }
    }
}

/// Context the checks are evaluated in.
///
/// `Ledger` implements this with its own rent and program registry. Code
/// validating standalone results may supply its own, e.g. to evaluate
/// lamports against a custom `Rent`.
pub trait CheckContext {
    fn is_rent_exempt(&self, lamports: u64, space: usize, owner: Pubkey) -> bool {
        owner.eq(&Pubkey::default()) && lamports == 0 || Rent::default().is_exempt(lamports, space)
    }

    /// Whether `account` holds initialized program state.
    ///
    /// Without knowledge of the owning program, any account whose first eight
    /// bytes are not all zero counts as initialized.
    fn is_initialized(&self, account: &Account) -> bool {
        account
            .data
            .get(..8)
            .is_some_and(|discriminator| discriminator.iter().any(|byte| *byte != 0))
    }
}

macro_rules! compare {
    ($c:expr, $check:expr, $left:expr, $right:expr $(,)?) => {{
        if $left != $right {
            let msg = format!(
                "CHECK FAILED: {}\n  Expected: `{:?}`,\n Got: `{:?}`",
                $check, $left, $right
            );
            if $c.panic {
                panic!("{}", msg);
            } else {
                if $c.verbose {
                    println!("{}", msg);
                }
                return false;
            }
        }
        true
    }};
}

macro_rules! throw {
    ($c:expr, $($arg:tt)+) => {{
        let msg = format!($($arg)+);
        if $c.panic {
            panic!("{}", msg);
        } else {
            if $c.verbose {
                eprintln!("{}", msg);
            }
        }
        false
    }};
}

pub(crate) use {compare, throw};
