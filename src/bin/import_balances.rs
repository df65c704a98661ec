//! CLI tool for importing opening balances from a spreadsheet

use docuflow_extract::{infer_workbook_import, load_workbook, Category};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <workbook> [--json]", args[0]);
        eprintln!();
        eprintln!("Infers account, category, debit and credit columns and prints");
        eprintln!("the opening-balance entries. CSV is always supported; xlsx, xls");
        eprintln!("and ods need the `xlsx` feature.");
        process::exit(1);
    }

    let path = &args[1];
    let json_output = args.get(2).is_some_and(|a| a == "--json");

    let workbook = match load_workbook(path) {
        Ok(workbook) => workbook,
        Err(e) => {
            if json_output {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            } else {
                eprintln!("Error: {}", e);
            }
            process::exit(1);
        }
    };

    let outcome = infer_workbook_import(&workbook);

    if json_output {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("Opening Balance Import");
    println!("======================");
    println!("File: {}", path);
    if let Some(sheet) = &outcome.sheet_name {
        println!("Sheet: {}", sheet);
    }
    match outcome.header_row {
        Some(row) => println!("Header row: {}", row + 1),
        None => println!("Header row: none (columns inferred from content)"),
    }
    println!("Columns: {:?}", outcome.roles);
    println!();

    for category in Category::ALL {
        let entries: Vec<_> = outcome
            .entries
            .iter()
            .filter(|e| e.category == category)
            .collect();
        if entries.is_empty() {
            continue;
        }

        println!("{}", category);
        for entry in &entries {
            println!(
                "  {:<40} {:>14.2} {:>14.2}  {}",
                entry.account.name, entry.account.debit, entry.account.credit, entry.account.sub_category
            );
        }
        let debit: f64 = entries.iter().map(|e| e.account.debit).sum();
        let credit: f64 = entries.iter().map(|e| e.account.credit).sum();
        println!("  {:<40} {:>14.2} {:>14.2}", "", debit, credit);
        println!();
    }

    let total_debit: f64 = outcome.entries.iter().map(|e| e.account.debit).sum();
    let total_credit: f64 = outcome.entries.iter().map(|e| e.account.credit).sum();
    println!("Entries: {}", outcome.entries.len());
    println!("Skipped rows: {}", outcome.skipped);
    println!("Total debit: {:.2}  Total credit: {:.2}", total_debit, total_credit);
    if (total_debit - total_credit).abs() > 0.005 {
        println!("Warning: debits and credits differ by {:.2}", total_debit - total_credit);
    }
}
