//! CLI tool for converting statement PDFs to page-marked plain text

use docuflow_extract::statement_text;
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <pdf_file> [output_file]", args[0]);
        eprintln!("       {} <pdf_file> --json", args[0]);
        eprintln!();
        eprintln!("Reconstructs reading-ordered text, one block per page.");
        eprintln!("Exits with 2 if no page has a text layer (OCR needed).");
        process::exit(1);
    }

    let pdf_path = &args[1];
    let json_output = args.get(2).is_some_and(|a| a == "--json");
    let output_file = if !json_output { args.get(2) } else { None };

    let result = match statement_text(pdf_path) {
        Ok(result) => result,
        Err(e) => {
            if json_output {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            } else {
                eprintln!("Error: {}", e);
            }
            process::exit(1);
        }
    };

    if json_output {
        println!(
            "{}",
            serde_json::json!({
                "page_count": result.page_count,
                "pages_without_text": result.pages_without_text,
                "scanned": result.is_scanned(),
                "processing_time_ms": result.processing_time_ms,
                "text_length": result.text.len(),
                "text": result.text,
            })
        );
        if result.is_scanned() {
            process::exit(2);
        }
        return;
    }

    println!("Statement to Text Conversion");
    println!("============================");
    println!("File: {}", pdf_path);
    println!("Pages: {}", result.page_count);
    println!("Processing time: {}ms", result.processing_time_ms);

    if result.is_scanned() {
        println!();
        println!("No page has a text layer; this PDF requires OCR.");
        process::exit(2);
    }

    if !result.pages_without_text.is_empty() {
        println!(
            "Note: pages {:?} have no text layer and may need OCR.",
            result.pages_without_text
        );
    }

    println!();
    match output_file {
        Some(output) => {
            if let Err(e) = fs::write(output, &result.text) {
                eprintln!("Error writing {}: {}", output, e);
                process::exit(1);
            }
            println!("Text written to: {}", output);
            println!("Length: {} characters", result.text.len());
        }
        None => {
            println!("--- Text Output ---");
            println!();
            println!("{}", result.text);
        }
    }
}
