//! Check system for validating instruction results.

use {
    crate::{
        config::{compare, throw, CheckContext, Config},
        types::{InstructionResult, ProgramResult},
    },
    trezoa_account::Account,
    trezoa_program_error::ProgramError,
    trezoa_pubkey::Pubkey,
    trezoa_transaction_error::TransactionError,
};

enum CheckType<'a> {
    /// Check the result code of the program's execution.
    ProgramResult(ProgramResult),
    /// Check a resulting account after executing the instruction.
    ResultingAccount(AccountCheck<'a>),
    /// Check that all accounts are rent exempt
    AllRentExempt,
    /// Check that a program log line contains the given text.
    Log(&'a str),
}

pub struct Check<'a> {
    check: CheckType<'a>,
}

impl<'a> Check<'a> {
    const fn new(check: CheckType<'a>) -> Self {
        Self { check }
    }

    /// Assert that the program executed successfully.
    pub const fn success() -> Self {
        Check::new(CheckType::ProgramResult(ProgramResult::Success))
    }

    /// Assert that the program returned an error.
    pub const fn err(error: ProgramError) -> Self {
        Check::new(CheckType::ProgramResult(ProgramResult::Failure(error)))
    }

    /// Assert that the ledger rejected the transaction.
    pub const fn rejected(error: TransactionError) -> Self {
        Check::new(CheckType::ProgramResult(ProgramResult::Rejected(error)))
    }

    /// Assert that the instruction returned the provided result.
    pub const fn program_result(result: ProgramResult) -> Self {
        Check::new(CheckType::ProgramResult(result))
    }

    /// Check a resulting account after executing the instruction.
    pub const fn account(pubkey: &Pubkey) -> AccountCheckBuilder<'_> {
        AccountCheckBuilder::new(pubkey)
    }

    /// Check that all resulting accounts are rent exempt
    pub const fn all_rent_exempt() -> Self {
        Check::new(CheckType::AllRentExempt)
    }

    /// Check that some program log line contains `text`.
    pub const fn log(text: &'a str) -> Self {
        Check::new(CheckType::Log(text))
    }
}

struct AccountCheck<'a> {
    pubkey: Pubkey,
    check_data: Option<&'a [u8]>,
    check_executable: Option<bool>,
    check_lamports: Option<u64>,
    check_owner: Option<&'a Pubkey>,
    check_space: Option<usize>,
    check_rent_exempt: bool,
    check_initialized: Option<bool>,
    check_data_slice: Option<(usize, &'a [u8])>,
}

impl AccountCheck<'_> {
    const fn new(pubkey: &Pubkey) -> Self {
        Self {
            pubkey: *pubkey,
            check_data: None,
            check_executable: None,
            check_lamports: None,
            check_owner: None,
            check_space: None,
            check_rent_exempt: false,
            check_initialized: None,
            check_data_slice: None,
        }
    }
}

pub struct AccountCheckBuilder<'a> {
    check: AccountCheck<'a>,
}

impl<'a> AccountCheckBuilder<'a> {
    const fn new(pubkey: &Pubkey) -> Self {
        Self {
            check: AccountCheck::new(pubkey),
        }
    }

    pub const fn data(mut self, data: &'a [u8]) -> Self {
        self.check.check_data = Some(data);
        self
    }

    pub const fn executable(mut self, executable: bool) -> Self {
        self.check.check_executable = Some(executable);
        self
    }

    pub const fn lamports(mut self, lamports: u64) -> Self {
        self.check.check_lamports = Some(lamports);
        self
    }

    pub const fn owner(mut self, owner: &'a Pubkey) -> Self {
        self.check.check_owner = Some(owner);
        self
    }

    pub const fn rent_exempt(mut self) -> Self {
        self.check.check_rent_exempt = true;
        self
    }

    /// The account holds initialized program state.
    pub const fn initialized(mut self) -> Self {
        self.check.check_initialized = Some(true);
        self
    }

    /// The account does not hold initialized program state.
    pub const fn uninitialized(mut self) -> Self {
        self.check.check_initialized = Some(false);
        self
    }

    pub const fn space(mut self, space: usize) -> Self {
        self.check.check_space = Some(space);
        self
    }

    pub const fn data_slice(mut self, offset: usize, data: &'a [u8]) -> Self {
        self.check.check_data_slice = Some((offset, data));
        self
    }

    pub const fn build(self) -> Check<'a> {
        Check::new(CheckType::ResultingAccount(self.check))
    }
}

fn check_account<C: CheckContext>(
    c: &Config,
    context: &C,
    account: &AccountCheck,
    resulting_account: &Account,
) -> bool {
    let mut pass = true;
    if let Some(check_data) = account.check_data {
        let actual_data = resulting_account.data.as_slice();
        pass &= compare!(c, "account_data", check_data, actual_data);
    }
    if let Some(check_executable) = account.check_executable {
        let actual_executable = resulting_account.executable;
        pass &= compare!(c, "account_executable", check_executable, actual_executable);
    }
    if let Some(check_lamports) = account.check_lamports {
        let actual_lamports = resulting_account.lamports;
        pass &= compare!(c, "account_lamports", check_lamports, actual_lamports);
    }
    if let Some(check_owner) = account.check_owner {
        let actual_owner = &resulting_account.owner;
        pass &= compare!(c, "account_owner", check_owner, actual_owner);
    }
    if let Some(check_space) = account.check_space {
        let actual_space = resulting_account.data.len();
        pass &= compare!(c, "account_space", check_space, actual_space);
    }
    if account.check_rent_exempt {
        pass &= compare!(
            c,
            "account_rent_exempt",
            true,
            context.is_rent_exempt(
                resulting_account.lamports,
                resulting_account.data.len(),
                resulting_account.owner,
            ),
        );
    }
    if let Some(check_initialized) = account.check_initialized {
        let actual_initialized = context.is_initialized(resulting_account);
        pass &= compare!(c, "account_initialized", check_initialized, actual_initialized);
    }
    if let Some((offset, check_data_slice)) = account.check_data_slice {
        let actual_data = &resulting_account.data;
        if offset + check_data_slice.len() > actual_data.len() {
            return throw!(
                c,
                "Account data slice: offset {} + slice length {} exceeds account data length {}",
                offset,
                check_data_slice.len(),
                actual_data.len(),
            );
        }
        let actual_data_slice = &actual_data[offset..offset + check_data_slice.len()];
        pass &= compare!(c, "account_data_slice", check_data_slice, actual_data_slice);
    }
    pass
}

impl InstructionResult {
    /// Perform checks on the instruction result with a custom context.
    /// See `CheckContext` for more details.
    ///
    /// Note: `Ledger` implements `CheckContext`, in case you don't want to
    /// define a custom context.
    pub fn run_checks<C: CheckContext>(
        &self,
        checks: &[Check],
        config: &Config,
        context: &C,
    ) -> bool {
        let c = config;
        let mut pass = true;
        for check in checks {
            match &check.check {
                CheckType::ProgramResult(check_result) => {
                    let actual_result = &self.program_result;
                    pass &= compare!(c, "program_result", check_result, actual_result);
                }
                CheckType::ResultingAccount(account) => {
                    let Some(resulting_account) = self.get_account(&account.pubkey) else {
                        pass &= throw!(
                            c,
                            "Account not found in resulting accounts: {}",
                            account.pubkey
                        );
                        continue;
                    };
                    pass &= check_account(c, context, account, resulting_account);
                }
                CheckType::AllRentExempt => {
                    for (pubkey, account) in &self.resulting_accounts {
                        if !context.is_rent_exempt(account.lamports, account.data.len(), account.owner)
                        {
                            pass &= throw!(
                                c,
                                "Account {} is not rent exempt after execution (lamports: {}, \
                                 data_len: {})",
                                pubkey,
                                account.lamports,
                                account.data.len()
                            );
                        }
                    }
                }
                CheckType::Log(text) => {
                    if !self.logs.iter().any(|line| line.contains(text)) {
                        pass &= throw!(c, "No program log line contains `{}`", text);
                    }
                }
            }
        }
        pass
    }
}
