//! Debug tool: Print reconstructed lines with their Y positions
//!
//! Usage: debug_lines <pdf_file> [page_number] [y_tolerance]
//!
//! Shows each reconstructed line with the Y that opened it, the gap from the
//! previous line, the Y spread of its fragments (drift) and the fragment
//! count. Useful when tuning the grouping tolerance against real statements.

use docuflow_extract::extract_page_fragments;
use docuflow_extract::lines::{reconstruct_lines_with, LineOptions};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <pdf_file> [page_number] [y_tolerance]", args[0]);
        eprintln!();
        eprintln!("Prints reconstructed lines with Y positions, gaps and drift.");
        eprintln!("If page_number is given, only that page is shown.");
        process::exit(1);
    }

    let pdf_path = &args[1];
    let filter_page: Option<usize> = args.get(2).and_then(|s| s.parse().ok());
    let mut options = LineOptions::default();
    if let Some(tolerance) = args.get(3).and_then(|s| s.parse().ok()) {
        options.y_tolerance = tolerance;
    }

    let pages = match extract_page_fragments(pdf_path) {
        Ok(pages) => pages,
        Err(e) => {
            eprintln!("Error extracting text: {}", e);
            process::exit(1);
        }
    };

    eprintln!("Y tolerance: {:.1}", options.y_tolerance);
    eprintln!();

    for (index, fragments) in pages.into_iter().enumerate() {
        let page = index + 1;
        if filter_page.is_some_and(|fp| fp != page) {
            continue;
        }

        let fragment_count = fragments.len();
        let lines = reconstruct_lines_with(fragments, &options);

        println!(
            "===== PAGE {} ({} fragments, {} lines) =====",
            page,
            fragment_count,
            lines.len()
        );
        println!(
            "{:>8} {:>8} {:>6} {:>5}  {}",
            "Y", "Gap", "Drift", "Frags", "Text (first 80 chars)"
        );
        println!("{}", "-".repeat(110));

        let mut prev_y: Option<f32> = None;
        let mut drifted = 0usize;

        for line in &lines {
            let text: String = line.text(&options.separator).chars().take(80).collect();

            let gap_str = match prev_y {
                Some(py) => format!("{:8.1}", py - line.y),
                None => "     ---".to_string(),
            };

            let lowest = line.fragments.iter().map(|f| f.y).fold(f32::INFINITY, f32::min);
            let drift = line.y - lowest;
            let marker = if drift > options.y_tolerance {
                drifted += 1;
                " <<DRIFT>>"
            } else {
                ""
            };

            println!(
                "{:8.1} {} {:6.1} {:>5}  {}{}",
                line.y,
                gap_str,
                drift,
                line.fragments.len(),
                text,
                marker
            );

            prev_y = Some(line.y);
        }

        println!();
        if drifted > 0 {
            println!(
                "  {} line(s) span more than the tolerance through chained fragments",
                drifted
            );
            println!();
        }
    }
}
