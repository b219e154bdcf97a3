//! # Domain Invariants
//!
//! Money rules for the Escrow Ledger.

use super::errors::EscrowError;
use super::value_objects::EscrowState;
use shared_types::Amount;

/// Invariant: conservation of funds.
///
/// Everything paid out (to either party) never exceeds what was captured.
pub fn invariant_conservation(
    held: Amount,
    released: Amount,
    refunded: Amount,
) -> Result<(), EscrowError> {
    match released.checked_add(refunded) {
        Some(total) if total <= held => Ok(()),
        _ => Err(EscrowError::ConservationViolated {
            held,
            released,
            refunded,
        }),
    }
}

/// Invariant: a split must account for the whole held amount.
pub fn invariant_shares_match(
    held: Amount,
    provider_share: Amount,
    creator_share: Amount,
) -> Result<(), EscrowError> {
    if provider_share.checked_add(creator_share) != Some(held) {
        return Err(EscrowError::AmountMismatch {
            held,
            provider_share,
            creator_share,
        });
    }
    Ok(())
}

/// Invariant: state moves forward only.
pub fn invariant_monotonic(from: EscrowState, to: EscrowState) -> bool {
    from.can_transition_to(to)
}
