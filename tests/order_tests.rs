//! Order engine tests driven through the CLI - composition, totals,
//! and the fulfillment state machine

mod common;

use common::{
    create_test_filament, create_test_order, create_test_product, printdesk, read_order_file,
    setup_test_project,
};
use predicates::prelude::*;

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_order_new_creates_file() {
    let tmp = setup_test_project();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "new", "--title", "Craft fair batch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created order"));

    let files: Vec<_> = std::fs::read_dir(tmp.path().join("orders"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().to_string_lossy().ends_with(".pd.yaml"))
        .collect();
    assert_eq!(files.len(), 1, "Expected exactly one order file");

    let content = std::fs::read_to_string(files[0].path()).unwrap();
    assert!(content.contains("Craft fair batch"));
    assert!(content.contains("status: not_started"));
}

#[test]
fn test_order_new_rejects_blank_title() {
    let tmp = setup_test_project();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "new", "--title", "   "])
        .assert()
        .failure();
}

#[test]
fn test_order_new_rejects_bad_due_date() {
    let tmp = setup_test_project();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "new", "--title", "Dated", "--due", "someday"])
        .assert()
        .failure();
}

// ============================================================================
// Composition and totals
// ============================================================================

#[test]
fn test_add_piece_aggregates_mass_and_cost() {
    let tmp = setup_test_project();
    let fil = create_test_filament(&tmp, "Galaxy Black", 20.0);
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(5.0));
    let order = create_test_order(&tmp, "Coaster batch");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod, "--qty", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added piece [0]"));

    printdesk()
        .current_dir(tmp.path())
        .args([
            "order", "material", &order, "--piece", "0", "--part", "0", "--filament", &fil,
        ])
        .assert()
        .success();

    // 2 copies x 10 g at $20/kg: 20 g of Galaxy Black costing $0.40
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "show", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("Galaxy Black: 20 g - $0.40"))
        .stdout(predicate::str::contains(
            "Revenue $10.00 - Expenses $0.40 = Profit $9.60",
        ));
}

#[test]
fn test_revenue_sums_priced_pieces() {
    let tmp = setup_test_project();
    let cheap = create_test_product(&tmp, "Keychain", &[("fob", 5.0)], Some(5.0));
    let dear = create_test_product(&tmp, "Vase", &[("body", 80.0)], Some(10.0));
    let order = create_test_order(&tmp, "Mixed batch");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &cheap, "--qty", "1"])
        .assert()
        .success();
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &dear, "--qty", "2"])
        .assert()
        .success();

    // $5 x 1 + $10 x 2 = $25; no filament assigned, so expenses are unknown
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "show", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Revenue $25.00 - Expenses n/a = Profit $25.00",
        ));
}

#[test]
fn test_add_piece_rejects_empty_template() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Nothing", &[], None);
    let order = create_test_order(&tmp, "Empty");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no parts and no declared price"));
}

#[test]
fn test_add_piece_rejects_zero_quantity() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(4.0));
    let order = create_test_order(&tmp, "Zero");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod, "--qty", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quantity must be at least 1"));
}

#[test]
fn test_size_priced_product_resolves_via_flag() {
    let tmp = setup_test_project();
    let order = create_test_order(&tmp, "Planters");

    let output = printdesk()
        .current_dir(tmp.path())
        .args([
            "prod",
            "new",
            "--title",
            "Planter",
            "--part",
            "pot:60",
            "--price-for",
            "small=8",
            "--price-for",
            "large=14",
            "--format",
            "id",
        ])
        .output()
        .unwrap();
    let prod = String::from_utf8_lossy(&output.stdout).trim().to_string();

    printdesk()
        .current_dir(tmp.path())
        .args([
            "order", "add-piece", &order, "--product", &prod, "--qty", "2", "--size", "large",
        ])
        .assert()
        .success();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "show", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("Revenue $28.00"));

    // Unknown size names fail loudly
    printdesk()
        .current_dir(tmp.path())
        .args([
            "order", "add-piece", &order, "--product", &prod, "--size", "medium",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no size 'medium'"));
}

#[test]
fn test_remove_piece_reindexes_printed_counts() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(4.0));
    let order = create_test_order(&tmp, "Reindex");

    for _ in 0..2 {
        printdesk()
            .current_dir(tmp.path())
            .args(["order", "add-piece", &order, "--product", &prod, "--qty", "2"])
            .assert()
            .success();
    }
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "progress", &order, "--piece", "0", "--count", "1"])
        .assert()
        .success();
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "progress", &order, "--piece", "1", "--count", "2"])
        .assert()
        .success();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "rm-piece", &order, "--piece", "0"])
        .assert()
        .success();

    // {0: 1, 1: 2} must become {0: 2}: the surviving piece keeps its count
    let content = read_order_file(&tmp, &order);
    assert!(content.contains("printed_counts:"));
    assert!(content.contains("0: 2"));
    assert!(!content.contains("1: 2"));
}

#[test]
fn test_dup_piece_copies_material_selection() {
    let tmp = setup_test_project();
    let fil = create_test_filament(&tmp, "Matte Red", 18.0);
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(4.0));
    let order = create_test_order(&tmp, "Dup");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod])
        .assert()
        .success();
    printdesk()
        .current_dir(tmp.path())
        .args([
            "order", "material", &order, "--piece", "0", "--part", "0", "--filament", &fil,
        ])
        .assert()
        .success();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "dup-piece", &order, "--piece", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Duplicated piece [0] as [1]"));

    // Both pieces now consume Matte Red: 10 g each
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "show", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("Matte Red: 20 g"));
}

#[test]
fn test_piece_index_out_of_range() {
    let tmp = setup_test_project();
    let order = create_test_order(&tmp, "Empty");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "rm-piece", &order, "--piece", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

// ============================================================================
// Fulfillment state machine
// ============================================================================

#[test]
fn test_progress_drives_status_both_ways() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(4.0));
    let order = create_test_order(&tmp, "Cycle");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod, "--qty", "2"])
        .assert()
        .success();

    // Partial progress: Printing
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "progress", &order, "--piece", "0", "--count", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Printing"));

    // Full progress: Printed
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "progress", &order, "--piece", "0", "--count", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Printed"));

    // Back to zero: Not Started
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "progress", &order, "--piece", "0", "--count", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Not Started"));
}

#[test]
fn test_progress_clamps_to_quantity() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(4.0));
    let order = create_test_order(&tmp, "Clamp");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod, "--qty", "2"])
        .assert()
        .success();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "progress", &order, "--piece", "0", "--count", "99"])
        .assert()
        .success()
        .stdout(predicate::str::contains("printed 2/2"))
        .stdout(predicate::str::contains("Status: Printed"));
}

#[test]
fn test_quantity_shrink_is_repaired_by_next_progress() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(4.0));
    let order = create_test_order(&tmp, "Shrink");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod, "--qty", "3"])
        .assert()
        .success();
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "progress", &order, "--piece", "0", "--count", "3"])
        .assert()
        .success();

    // Shrink the quantity below the stored count; the record is repaired
    // on the next progress update
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "qty", &order, "--piece", "0", "--qty", "2"])
        .assert()
        .success();
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "progress", &order, "--piece", "0", "--count", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("printed 2/2"));
}

#[test]
fn test_mark_printed_fast_forwards() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(4.0));
    let order = create_test_order(&tmp, "Fast forward");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod, "--qty", "5"])
        .assert()
        .success();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "printed", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("marked Printed"));

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "show", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("printed 5/5"));
}

#[test]
fn test_done_and_restore_cycle() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(4.0));
    let order = create_test_order(&tmp, "Lifecycle");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod])
        .assert()
        .success();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "done", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("marked Done"));

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "restore", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("restored to Printed"));
}

#[test]
fn test_restore_fails_unless_done() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(4.0));
    let order = create_test_order(&tmp, "Not done yet");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod, "--qty", "2"])
        .assert()
        .success();
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "progress", &order, "--piece", "0", "--count", "1"])
        .assert()
        .success();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "restore", &order])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only a done order can be restored"));

    // The order is unchanged
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "show", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Printing"));
}

#[test]
fn test_done_is_sticky_under_progress() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(4.0));
    let order = create_test_order(&tmp, "Sticky");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &order, "--product", &prod, "--qty", "2"])
        .assert()
        .success();
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "done", &order])
        .assert()
        .success();

    // A progress update stores counts but does not leave Done
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "progress", &order, "--piece", "0", "--count", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Done"));
}

// ============================================================================
// Listing, soft delete, and stats
// ============================================================================

#[test]
fn test_list_hides_done_by_default() {
    let tmp = setup_test_project();
    let open_order = create_test_order(&tmp, "Open order");
    let done_order = create_test_order(&tmp, "Done order");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "done", &done_order])
        .assert()
        .success();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Open order"))
        .stdout(predicate::str::contains("Done order").not())
        .stdout(predicate::str::contains("1 order(s) found"));

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "list", "--done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Done order"))
        .stdout(predicate::str::contains("2 order(s) found"));

    // Ids only, for pipelines
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "list", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&open_order));
}

#[test]
fn test_soft_deleted_order_leaves_listings_but_stays_addressable() {
    let tmp = setup_test_project();
    let order = create_test_order(&tmp, "Cancelled");

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "rm", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hidden order"));

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "list", "--done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled").not());

    // Still addressable by id
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "show", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hidden: yes"));
}

#[test]
fn test_stats_split_all_and_realized() {
    let tmp = setup_test_project();
    let prod = create_test_product(&tmp, "Coaster", &[("disc", 10.0)], Some(5.0));

    let open_order = create_test_order(&tmp, "Open");
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &open_order, "--product", &prod, "--qty", "2"])
        .assert()
        .success();

    let done_order = create_test_order(&tmp, "Delivered");
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "add-piece", &done_order, "--product", &prod, "--qty", "1"])
        .assert()
        .success();
    printdesk()
        .current_dir(tmp.path())
        .args(["order", "done", &done_order])
        .assert()
        .success();

    printdesk()
        .current_dir(tmp.path())
        .args(["order", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All orders"))
        .stdout(predicate::str::contains("$15.00"))
        .stdout(predicate::str::contains("Realized (done)"))
        .stdout(predicate::str::contains("$5.00"));
}
