//! Order composer - builds and edits the piece/part tree of one order
//!
//! Every operation validates, mutates, and then recomputes the order's
//! totals before returning, so callers never observe stale derived fields.
//! Pieces snapshot their product template at add-time; the composer never
//! reads the product catalog again after that copy.

use crate::engine::error::EngineError;
use crate::engine::totals::{self, CostLookup};
use crate::entities::order::{Order, PartSlot, Piece};
use crate::entities::product::Product;

fn check_index(index: usize, len: usize) -> Result<(), EngineError> {
    if index >= len {
        return Err(EngineError::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Append a new piece snapshotting `product`, returning its index.
///
/// The parts list is copied (labels and grams; filament unset) and a
/// single-priced product's price becomes the piece's unit price. A
/// size-priced product is added unpriced: resolving one of its variants is
/// the caller's job, against the product catalog, before or after this
/// call.
pub fn add_piece(
    order: &mut Order,
    product: &Product,
    quantity: u32,
    costs: &impl CostLookup,
) -> Result<usize, EngineError> {
    if quantity == 0 {
        return Err(EngineError::InvalidQuantity);
    }
    if product.parts.is_empty() && !product.prices.has_any() {
        return Err(EngineError::InvalidTemplate {
            title: product.title.clone(),
        });
    }

    order.pieces.push(Piece {
        product_id: product.id.to_string(),
        product_title: product.title.clone(),
        quantity,
        unit_price: product.prices.single(),
        parts: product
            .parts
            .iter()
            .map(|req| PartSlot {
                label: req.label.clone(),
                required_grams: req.grams,
                filament_id: None,
            })
            .collect(),
    });

    totals::apply(order, costs);
    Ok(order.pieces.len() - 1)
}

/// Deep-copy the piece at `index` (including filament selections) and
/// insert the copy immediately after it, returning the copy's index.
///
/// Printed counts stay attached to their pieces: keys past the insertion
/// point shift up by one, and the duplicate starts unprinted.
pub fn duplicate_piece(
    order: &mut Order,
    index: usize,
    costs: &impl CostLookup,
) -> Result<usize, EngineError> {
    check_index(index, order.pieces.len())?;

    let copy = order.pieces[index].clone();
    order.pieces.insert(index + 1, copy);

    order.printed_counts = order
        .printed_counts
        .iter()
        .map(|(&i, &count)| if i > index { (i + 1, count) } else { (i, count) })
        .collect();

    totals::apply(order, costs);
    Ok(index + 1)
}

/// Remove the piece at `index`.
///
/// Its printed-count entry is dropped and every later key shifts down by
/// one, since counts are keyed by position.
pub fn remove_piece(
    order: &mut Order,
    index: usize,
    costs: &impl CostLookup,
) -> Result<(), EngineError> {
    check_index(index, order.pieces.len())?;

    order.pieces.remove(index);
    order.printed_counts = order
        .printed_counts
        .iter()
        .filter(|&(&i, _)| i != index)
        .map(|(&i, &count)| if i > index { (i - 1, count) } else { (i, count) })
        .collect();

    totals::apply(order, costs);
    Ok(())
}

/// Change a piece's quantity.
///
/// An existing printed count larger than the new quantity is left alone
/// here; the next progress update clamps it back into range.
pub fn update_piece_quantity(
    order: &mut Order,
    index: usize,
    quantity: u32,
    costs: &impl CostLookup,
) -> Result<(), EngineError> {
    check_index(index, order.pieces.len())?;
    if quantity == 0 {
        return Err(EngineError::InvalidQuantity);
    }

    order.pieces[index].quantity = quantity;
    totals::apply(order, costs);
    Ok(())
}

/// Set or clear a piece's per-unit price
pub fn set_piece_price(
    order: &mut Order,
    index: usize,
    price: Option<f64>,
    costs: &impl CostLookup,
) -> Result<(), EngineError> {
    check_index(index, order.pieces.len())?;

    order.pieces[index].unit_price = price;
    totals::apply(order, costs);
    Ok(())
}

/// Assign or clear the filament selection of one part
pub fn set_part_material(
    order: &mut Order,
    piece_index: usize,
    part_index: usize,
    filament_id: Option<&str>,
    costs: &impl CostLookup,
) -> Result<(), EngineError> {
    check_index(piece_index, order.pieces.len())?;
    let piece = &mut order.pieces[piece_index];
    check_index(part_index, piece.parts.len())?;

    piece.parts[part_index].filament_id = filament_id.map(str::to_owned);
    totals::apply(order, costs);
    Ok(())
}
