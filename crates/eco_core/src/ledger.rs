//! Loan-aware cash movements.

use crate::Wallet;

/// Apply `amount` to the wallet and return how much cash actually changed.
///
/// Positive inflows service the loan first: when the inflow is more than
/// twice the loan the loan is cleared and the remainder credited, otherwise
/// half goes to the loan and half to cash. Spending (`amount <= 0`) never
/// touches the loan.
pub fn impact(wallet: &mut Wallet, amount: f64) -> f64 {
    let before = wallet.cash;
    if amount > 0.0 {
        if amount > 2.0 * wallet.loan {
            wallet.cash += amount - wallet.loan;
            wallet.loan = 0.0;
        } else {
            wallet.cash += amount / 2.0;
            wallet.loan -= amount / 2.0;
        }
    } else {
        wallet.cash += amount;
    }
    wallet.cash - before
}
