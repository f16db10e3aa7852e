//! Fulfillment state machine
//!
//! `NotStarted -> Printing -> Printed` are derived purely from printed
//! counts; `Done` is reachable only through the explicit `mark_done`, and
//! `restore` is the explicit edge back from `Done` to `Printed`. Done is
//! sticky: a progress update while the order is Done stores counts but
//! does not re-derive the status.

use std::collections::BTreeMap;

use crate::engine::error::EngineError;
use crate::entities::order::{FulfillmentStatus, Order, Piece};

/// Derive the progress-driven status from counts and quantities.
/// Never yields `Done`.
pub fn derive_status(
    pieces: &[Piece],
    printed_counts: &BTreeMap<usize, u32>,
) -> FulfillmentStatus {
    let any_printed = printed_counts.values().any(|&count| count > 0);
    if !any_printed {
        return FulfillmentStatus::NotStarted;
    }

    let all_printed = pieces.iter().enumerate().all(|(index, piece)| {
        printed_counts.get(&index).copied().unwrap_or(0) == piece.quantity
    });
    if all_printed {
        FulfillmentStatus::Printed
    } else {
        FulfillmentStatus::Printing
    }
}

/// Clamp every stored count into `[0, quantity]` and drop entries for
/// pieces that no longer exist. This is the repair step that restores the
/// count invariant after a quantity shrink.
fn clamp_counts(order: &mut Order) {
    let quantities: Vec<u32> = order.pieces.iter().map(|piece| piece.quantity).collect();
    order.printed_counts = order
        .printed_counts
        .iter()
        .filter_map(|(&index, &count)| {
            quantities.get(index).map(|&quantity| (index, count.min(quantity)))
        })
        .collect();
}

/// Record how many copies of one piece are printed, then re-derive the
/// status from the counts (unless the order is Done, which is sticky).
pub fn set_printed_count(
    order: &mut Order,
    piece_index: usize,
    count: u32,
) -> Result<(), EngineError> {
    let len = order.pieces.len();
    if piece_index >= len {
        return Err(EngineError::IndexOutOfRange {
            index: piece_index,
            len,
        });
    }

    let clamped = count.min(order.pieces[piece_index].quantity);
    order.printed_counts.insert(piece_index, clamped);
    clamp_counts(order);

    if order.status != FulfillmentStatus::Done {
        order.status = derive_status(&order.pieces, &order.printed_counts);
    }
    Ok(())
}

/// Explicit fast-forward: every piece fully printed, status Printed,
/// regardless of the current counts or status.
pub fn mark_printed(order: &mut Order) {
    order.printed_counts = order
        .pieces
        .iter()
        .enumerate()
        .map(|(index, piece)| (index, piece.quantity))
        .collect();
    order.status = FulfillmentStatus::Printed;
}

/// Explicit close-out: status Done, counts untouched. Done with
/// incomplete counts is an intentional override, not a derivation.
pub fn mark_done(order: &mut Order) {
    order.status = FulfillmentStatus::Done;
}

/// The only edge out of Done: back to Printed. From any other state this
/// fails and leaves the order unchanged.
pub fn restore(order: &mut Order) -> Result<(), EngineError> {
    if order.status != FulfillmentStatus::Done {
        return Err(EngineError::InvalidTransition {
            status: order.status,
        });
    }
    order.status = FulfillmentStatus::Printed;
    Ok(())
}
